//! `temboo-client` runs Temboo choreos over a byte-stream transport.
//!
//! A [`Choreo`] is configured with the account credentials, the choreo
//! path, its inputs and output filters. A run signs the request with the
//! application key and sends it, then exposes the response as a byte
//! stream starting with a `HTTP_CODE` record.
//!
//! The request body is never stored: it is produced twice by the
//! formatters of the `temboo` crate, once to sign it and once to send it,
//! and outgoing bytes go through a small fixed-size queue.
//!
//! Requests are timestamped with a [`Clock`]. When the server rejects a
//! request because the clock is wrong, the clock is corrected with the
//! server time and the request is sent again.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod choreo;
mod response;

/// Wall clock used to timestamp requests.
pub mod clock;
/// Choreo run settings.
pub mod config;
/// Blocking delays.
pub mod delay;
/// Error handling.
pub mod error;
pub mod session;
pub mod transport;

pub use choreo::Choreo;
pub use clock::{Clock, MonotonicUptime, Uptime};
pub use config::ChoreoConfig;
pub use delay::StdDelay;
pub use error::{Error, ErrorKind, Result};
pub use transport::{Endpoint, TcpTransport, Transport};
