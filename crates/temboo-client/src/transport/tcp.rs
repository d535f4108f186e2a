use std::io::{ErrorKind as IoErrorKind, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::{Error, ErrorKind, Result};

use super::{Endpoint, Transport};

const RX_BUFFER_LEN: usize = 128;

/// A [`Transport`] over a [`TcpStream`].
///
/// Received bytes are read in chunks into a small fixed buffer.
#[derive(Debug)]
pub struct TcpTransport {
    stream: Option<TcpStream>,
    buffer: [u8; RX_BUFFER_LEN],
    start: usize,
    end: usize,
    eof: bool,
    connect_timeout: Duration,
    read_timeout: Duration,
}

impl Default for TcpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl TcpTransport {
    /// Creates a disconnected [`TcpTransport`].
    #[must_use]
    #[inline]
    pub const fn new() -> Self {
        Self {
            stream: None,
            buffer: [0; RX_BUFFER_LEN],
            start: 0,
            end: 0,
            eof: false,
            connect_timeout: Duration::from_secs(5),
            read_timeout: Duration::from_secs(1),
        }
    }

    /// Sets the maximum time to establish a connection.
    #[must_use]
    pub const fn connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }

    /// Sets the maximum time a read waits for a byte.
    #[must_use]
    pub const fn read_timeout(mut self, read_timeout: Duration) -> Self {
        self.read_timeout = read_timeout;
        self
    }

    fn open(&self, endpoint: &Endpoint) -> Result<TcpStream> {
        let addresses: Vec<SocketAddr> = match endpoint {
            Endpoint::Host(host, port) => (host.as_str(), *port).to_socket_addrs()?.collect(),
            Endpoint::Address(address) => vec![*address],
        };

        let mut last_error = None;
        for address in addresses {
            match TcpStream::connect_timeout(&address, self.connect_timeout) {
                Ok(stream) => {
                    stream.set_read_timeout(Some(self.read_timeout))?;
                    stream.set_nodelay(true)?;
                    debug!("Connected to {address}");
                    return Ok(stream);
                }
                Err(e) => {
                    debug!("Unable to connect to {address}: {e}");
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.map_or_else(
            || Error::new(ErrorKind::Http, format!("No address found for {endpoint}")),
            Error::from,
        ))
    }

    const fn buffered(&self) -> usize {
        self.end - self.start
    }

    // Refills the receive buffer once it has been consumed. When `wait` is
    // false, only data which already arrived is taken.
    fn fill(&mut self, wait: bool) {
        if self.buffered() > 0 || self.eof {
            return;
        }
        let Some(stream) = self.stream.as_mut() else {
            return;
        };

        if !wait && stream.set_nonblocking(true).is_err() {
            return;
        }
        let result = stream.read(&mut self.buffer);
        if !wait && let Err(e) = stream.set_nonblocking(false) {
            warn!("Unable to restore blocking mode: {e}");
        }

        match result {
            Ok(0) => self.eof = true,
            Ok(read) => {
                self.start = 0;
                self.end = read;
            }
            Err(e)
                if matches!(
                    e.kind(),
                    IoErrorKind::WouldBlock | IoErrorKind::TimedOut | IoErrorKind::Interrupted
                ) => {}
            Err(e) => {
                warn!("Receive failed: {e}");
                self.eof = true;
            }
        }
    }
}

impl Transport for TcpTransport {
    fn connect(&mut self, endpoint: &Endpoint) -> bool {
        self.stop();
        match self.open(endpoint) {
            Ok(stream) => {
                self.stream = Some(stream);
                true
            }
            Err(_) => false,
        }
    }

    fn write(&mut self, bytes: &[u8]) -> usize {
        let Some(stream) = self.stream.as_mut() else {
            return 0;
        };

        let mut written = 0;
        while written < bytes.len() {
            match stream.write(&bytes[written..]) {
                Ok(0) => break,
                Ok(count) => written += count,
                Err(e) if e.kind() == IoErrorKind::Interrupted => {}
                Err(e) => {
                    warn!("Send failed: {e}");
                    break;
                }
            }
        }
        written
    }

    fn available(&mut self) -> usize {
        self.fill(false);
        self.buffered()
    }

    fn read(&mut self) -> Option<u8> {
        let byte = self.peek()?;
        self.start += 1;
        Some(byte)
    }

    fn peek(&mut self) -> Option<u8> {
        self.fill(true);
        (self.buffered() > 0).then(|| self.buffer[self.start])
    }

    fn connected(&mut self) -> bool {
        self.stream.is_some() && (self.buffered() > 0 || !self.eof)
    }

    fn stop(&mut self) {
        if let Some(stream) = self.stream.take() {
            // The peer may have closed the connection already.
            let _ = stream.shutdown(Shutdown::Both);
        }
        self.start = 0;
        self.end = 0;
        self.eof = false;
    }
}
