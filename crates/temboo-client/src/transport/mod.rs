//! Byte-stream transports.
//!
//! A [`Transport`] is a connection-oriented, byte-at-a-time stream, the kind
//! of interface exposed by network stacks of small devices. The client only
//! relies on the operations of this trait, so it can run on top of any
//! network stack.

mod tcp;

#[cfg(test)]
pub(crate) mod mock;

pub use tcp::TcpTransport;

use std::net::SocketAddr;

/// Destination of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// A host name and a port.
    Host(String, u16),
    /// An explicit socket address.
    Address(SocketAddr),
}

impl Endpoint {
    /// Returns the value of the `Host` header for this endpoint.
    #[must_use]
    pub fn host_header(&self) -> String {
        match self {
            Self::Host(host, _) => host.clone(),
            Self::Address(address) => address.to_string(),
        }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Host(host, port) => write!(f, "{host}:{port}"),
            Self::Address(address) => address.fmt(f),
        }
    }
}

/// A connection-oriented byte stream.
pub trait Transport {
    /// Opens a connection towards `endpoint`.
    ///
    /// Returns `false` when the connection cannot be established.
    fn connect(&mut self, endpoint: &Endpoint) -> bool;

    /// Writes `bytes`, returning how many of them have been accepted.
    fn write(&mut self, bytes: &[u8]) -> usize;

    /// Returns the number of bytes which can be read without waiting.
    fn available(&mut self) -> usize;

    /// Reads a byte.
    ///
    /// If [`None`], no byte arrived in time or the stream is over.
    fn read(&mut self) -> Option<u8>;

    /// Returns the next byte without consuming it.
    fn peek(&mut self) -> Option<u8>;

    /// Checks whether the connection is open or unread data remains.
    fn connected(&mut self) -> bool;

    /// Closes the connection and discards unread data.
    fn stop(&mut self);

    /// Consumes the stream up to and including the first occurrence of
    /// `target`.
    ///
    /// Returns `false` if the stream ends first.
    fn find(&mut self, target: &[u8]) -> bool {
        if target.is_empty() {
            return true;
        }

        let mut matched = 0;
        while let Some(byte) = self.read() {
            matched = advance(target, matched, byte);
            if matched == target.len() {
                return true;
            }
        }
        false
    }

    /// Like [`Transport::find`], but gives up as soon as `terminator` has
    /// been consumed.
    ///
    /// Returns `false` if `terminator` or the end of the stream comes
    /// first.
    fn find_until(&mut self, target: &[u8], terminator: &[u8]) -> bool {
        if target.is_empty() {
            return true;
        }

        let (mut matched, mut terminated) = (0, 0);
        while let Some(byte) = self.read() {
            matched = advance(target, matched, byte);
            if matched == target.len() {
                return true;
            }
            if !terminator.is_empty() {
                terminated = advance(terminator, terminated, byte);
                if terminated == terminator.len() {
                    return false;
                }
            }
        }
        false
    }

    /// Skips every byte up to the first decimal digit, then consumes and
    /// returns the number starting there.
    ///
    /// Returns [`None`] if the stream ends before a digit is found.
    /// Saturates at [`u32::MAX`].
    fn parse_int(&mut self) -> Option<u32> {
        loop {
            match self.peek() {
                Some(byte) if byte.is_ascii_digit() => break,
                Some(_) => {
                    self.read();
                }
                None => return None,
            }
        }

        let mut value: u32 = 0;
        while let Some(byte) = self.peek().filter(u8::is_ascii_digit) {
            self.read();
            value = value
                .saturating_mul(10)
                .saturating_add(u32::from(byte - b'0'));
        }
        Some(value)
    }
}

// Length of the longest prefix of `target` that ends the sequence made of
// the first `matched` bytes of `target` followed by `byte`.
fn advance(target: &[u8], matched: usize, byte: u8) -> usize {
    let mut candidate = matched + 1;
    while candidate > 0 {
        let start = matched + 1 - candidate;
        if target[candidate - 1] == byte && target[start..matched] == target[..candidate - 1] {
            return candidate;
        }
        candidate -= 1;
    }
    0
}
