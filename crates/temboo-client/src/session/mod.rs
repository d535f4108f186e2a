//! The choreo execution request.
//!
//! A request is sent in two passes over the same [`RequestBody`]. The first
//! pass measures the body and computes its authentication code, the second
//! one transmits it. Outgoing bytes go through a fixed [`QUEUE_LEN`]-byte
//! queue, so the memory used by a request does not depend on its size.

mod queue;

pub use queue::QUEUE_LEN;

use temboo::RequestBody;
use temboo::hmac::{HexDigest, HmacMd5};
use temboo::md5::BLOCK_LEN;

use tracing::{debug, info};

use crate::clock::{Clock, Uptime};
use crate::error::{Error, ErrorKind, Result};
use crate::transport::{Endpoint, Transport};

use queue::SendQueue;

const API_PATH: &str = "/arcturus-web/api-1.0/ar";
const SOURCE_ID: &str = "arduinoSDK1";

/// Length and authentication code of a request body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature {
    /// Body length, in bytes.
    pub content_length: usize,
    /// Hex-encoded `HMAC-MD5` of the body.
    pub digest: HexDigest,
}

/// Measures and authenticates a request body.
///
/// The authentication key is the salt followed by the application key. The
/// body is produced once and fed to the `HMAC` in blocks.
#[must_use]
pub fn sign(body: &RequestBody<'_>, app_key: &str, salt: &str) -> Signature {
    let mut key = String::with_capacity(salt.len() + app_key.len());
    key.push_str(salt);
    key.push_str(app_key);

    let mut hmac = HmacMd5::new(key.as_bytes());
    let mut formatter = body.formatter();
    let mut block = [0; BLOCK_LEN];
    let mut content_length = 0;
    loop {
        let mut filled = 0;
        for (slot, byte) in block.iter_mut().zip(formatter.by_ref()) {
            *slot = byte;
            filled += 1;
        }
        hmac.process(&block[..filled]);
        content_length += filled;
        if filled < BLOCK_LEN {
            break;
        }
    }

    Signature {
        content_length,
        digest: hmac.finish_hex(),
    }
}

/// Identity of a choreo execution request.
#[derive(Debug, Clone, Copy)]
pub struct Request<'a> {
    /// Temboo account name.
    pub account: &'a str,
    /// Application key name.
    pub app_key_name: &'a str,
    /// Application key value.
    pub app_key: &'a str,
    /// Choreo path, starting with `/`.
    pub choreo: &'a str,
    /// Request body.
    pub body: RequestBody<'a>,
}

/// Sends choreo execution requests over a [`Transport`].
pub struct Session<'s, T, U> {
    transport: &'s mut T,
    clock: &'s Clock<U>,
}

impl<'s, T: Transport, U: Uptime> Session<'s, T, U> {
    /// Creates a [`Session`].
    #[must_use]
    #[inline]
    pub const fn new(transport: &'s mut T, clock: &'s Clock<U>) -> Self {
        Self { transport, clock }
    }

    /// Connects to `endpoint` and sends `request`.
    ///
    /// On success, the transport is left connected and ready to receive the
    /// response. If any byte is not accepted by the transport, the
    /// connection is closed and an error is returned.
    ///
    /// # Errors
    ///
    /// Returns an [`ErrorKind::Http`] error when the connection cannot be
    /// established or the request cannot be entirely sent.
    pub fn execute(&mut self, endpoint: &Endpoint, request: &Request<'_>) -> Result<()> {
        let salt = self.clock.time().to_string();
        let signature = sign(&request.body, request.app_key, &salt);

        info!("Connecting to {endpoint}");
        if !self.transport.connect(endpoint) {
            return Err(Error::new(
                ErrorKind::Http,
                format!("Unable to connect to {endpoint}"),
            ));
        }

        debug!(
            "Sending choreo `{}` with a {} byte body",
            request.choreo, signature.content_length
        );
        let result = Self::send(self.transport, endpoint, request, &signature, &salt);
        if result.is_err() {
            self.transport.stop();
        }
        result
    }

    fn send(
        transport: &mut T,
        endpoint: &Endpoint,
        request: &Request<'_>,
        signature: &Signature,
        salt: &str,
    ) -> Result<()> {
        let mut queue: SendQueue<'_, T> = SendQueue::new(transport);

        queue.push_line(format_args!(
            "POST {API_PATH}{}?source_id={SOURCE_ID} HTTP/1.0",
            request.choreo
        ))?;
        queue.push_line(format_args!(
            "x-temboo-authentication: {}:{}",
            request.app_key_name, signature.digest
        ))?;
        queue.push_line(format_args!("Host: {}", endpoint.host_header()))?;
        queue.push_line(format_args!("Accept: application/xml"))?;
        queue.push_line(format_args!("x-temboo-domain: /{}/master", request.account))?;
        queue.push_line(format_args!("Content-Type: text/plain"))?;
        queue.push_line(format_args!("x-temboo-time: {salt}"))?;
        queue.push_line(format_args!("Content-Length: {}", signature.content_length))?;
        queue.push_line(format_args!(""))?;

        for byte in request.body.formatter() {
            queue.push(byte)?;
        }
        queue.flush()?;

        debug!("Request sent, {} bytes", queue.sent());
        Ok(())
    }
}
