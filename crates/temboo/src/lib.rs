//! `temboo` is the platform-independent core of a Temboo choreo client.
//!
//! It contains everything needed to describe and authenticate a choreo
//! execution request without ever holding the complete request body in
//! memory:
//!
//! - The association containers a caller fills before a run: choreo
//!   [`inputs`], [`outputs`] filters and an optional [`preset`].
//! - A set of lazy [`formatter`]s which produce the request body, one byte
//!   at a time, as `JSON`.
//! - An [`md5`] engine and its [`hmac`] construction, used to sign the very
//!   same byte stream the formatters produce.
//!
//! A [`RequestBody`] borrows the containers immutably and acts as a
//! formatter factory. A client drains one formatter to compute the body
//! length and its authentication code, then drains a second one to
//! transmit the body. Since the containers cannot change while a
//! [`RequestBody`] exists, both passes always produce the same bytes.
//!
//! The crate is `no_std` and only needs an allocator for the containers.

#![no_std]
#![deny(unsafe_code)]
#![deny(missing_docs)]

extern crate alloc;

mod macros;

/// The request body snapshot.
pub mod body;
/// Lazy request body formatters.
pub mod formatter;
/// Keyed message authentication over `MD5`.
pub mod hmac;
/// Choreo inputs.
pub mod inputs;
/// The `MD5` message-digest algorithm.
pub mod md5;
/// Choreo output filters.
pub mod outputs;
/// Choreo preset.
pub mod preset;

pub use body::RequestBody;
