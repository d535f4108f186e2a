use std::fmt;

use crate::error::{Error, ErrorKind, Result};
use crate::transport::Transport;

/// Capacity of the send queue, in bytes.
pub const QUEUE_LEN: usize = 32;

// Collects outgoing bytes and hands them to the transport in chunks of at
// most `N` bytes.
pub(crate) struct SendQueue<'t, T, const N: usize = QUEUE_LEN> {
    transport: &'t mut T,
    buffer: [u8; N],
    len: usize,
    sent: usize,
    failure: Option<Error>,
}

impl<'t, T: Transport, const N: usize> SendQueue<'t, T, N> {
    pub(crate) const fn new(transport: &'t mut T) -> Self {
        Self {
            transport,
            buffer: [0; N],
            len: 0,
            sent: 0,
            failure: None,
        }
    }

    pub(crate) fn push(&mut self, byte: u8) -> Result<()> {
        self.buffer[self.len] = byte;
        self.len += 1;
        if self.len == N {
            self.flush()?;
        }
        Ok(())
    }

    pub(crate) fn push_all(&mut self, bytes: &[u8]) -> Result<()> {
        bytes.iter().try_for_each(|&byte| self.push(byte))
    }

    // Queues a formatted line followed by `CRLF`.
    pub(crate) fn push_line(&mut self, line: fmt::Arguments<'_>) -> Result<()> {
        if fmt::Write::write_fmt(self, line).is_err() {
            return Err(self
                .failure
                .take()
                .unwrap_or_else(|| Error::new(ErrorKind::Http, "Unable to format a header line")));
        }
        self.push_all(b"\r\n")
    }

    pub(crate) fn flush(&mut self) -> Result<()> {
        let queued = self.len;
        self.len = 0;
        if queued == 0 {
            return Ok(());
        }

        let written = self.transport.write(&self.buffer[..queued]);
        self.sent += written;
        if written < queued {
            return Err(Error::new(
                ErrorKind::Http,
                format!("Short write: {written} of {queued} bytes accepted"),
            ));
        }
        Ok(())
    }

    // Bytes accepted by the transport so far.
    pub(crate) const fn sent(&self) -> usize {
        self.sent
    }
}

impl<T: Transport, const N: usize> fmt::Write for SendQueue<'_, T, N> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.push_all(s.as_bytes()).map_err(|e| {
            self.failure = Some(e);
            fmt::Error
        })
    }
}
