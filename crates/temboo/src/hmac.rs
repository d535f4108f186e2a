//! # HMAC-MD5
//!
//! The `RFC 2104` keyed-hash construction over the streaming [`Md5`]
//! engine.
//!
//! Message bytes are handed straight to the inner `MD5` computation, hence
//! the message can be produced lazily and never needs to be stored.

use crate::md5::{self, BLOCK_LEN, DIGEST_LEN, Digest, Md5};

const INNER_PAD: u8 = 0x36;
const OUTER_PAD: u8 = 0x5c;

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

/// Length, in characters, of a hex-encoded authentication code.
pub const HEX_LEN: usize = DIGEST_LEN * 2;

/// A lower-case hex-encoded authentication code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HexDigest([u8; HEX_LEN]);

impl HexDigest {
    fn encode(digest: &Digest) -> Self {
        let mut hex = [0; HEX_LEN];
        for (pair, byte) in hex.chunks_exact_mut(2).zip(digest) {
            pair[0] = HEX_DIGITS[usize::from(byte >> 4)];
            pair[1] = HEX_DIGITS[usize::from(byte & 0x0f)];
        }
        Self(hex)
    }

    /// Returns the hex characters as bytes.
    #[must_use]
    #[inline]
    pub const fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns the hex characters as a string slice.
    #[must_use]
    #[inline]
    pub fn as_str(&self) -> &str {
        // Only ever built from `HEX_DIGITS`.
        core::str::from_utf8(&self.0).unwrap_or_default()
    }
}

impl core::ops::Deref for HexDigest {
    type Target = str;

    fn deref(&self) -> &str {
        self.as_str()
    }
}

impl core::fmt::Display for HexDigest {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A streaming `HMAC-MD5` computation.
#[derive(Debug, Clone)]
pub struct HmacMd5 {
    // Key material, zero-padded to a block. Needed again to build the
    // outer pad when the computation completes.
    key_block: [u8; BLOCK_LEN],
    inner: Md5,
}

impl HmacMd5 {
    /// Creates an [`HmacMd5`] computation keyed with `key`.
    ///
    /// Keys longer than a block are replaced by their `MD5` digest.
    #[must_use]
    pub fn new(key: &[u8]) -> Self {
        let mut key_block = [0; BLOCK_LEN];
        if key.len() > BLOCK_LEN {
            key_block[..DIGEST_LEN].copy_from_slice(&md5::compute(key));
        } else {
            key_block[..key.len()].copy_from_slice(key);
        }

        let mut inner = Md5::new();
        inner.process(&Self::pad(&key_block, INNER_PAD));

        Self { key_block, inner }
    }

    /// Feeds message bytes into the computation.
    #[inline]
    pub fn process(&mut self, bytes: &[u8]) {
        self.inner.process(bytes);
    }

    /// Completes the computation and returns the authentication code.
    #[must_use]
    pub fn finish(self) -> Digest {
        let mut outer = [0; BLOCK_LEN + DIGEST_LEN];
        outer[..BLOCK_LEN].copy_from_slice(&Self::pad(&self.key_block, OUTER_PAD));
        outer[BLOCK_LEN..].copy_from_slice(&self.inner.finish());

        md5::compute(&outer)
    }

    /// Completes the computation and returns the authentication code
    /// encoded as 32 lower-case hex characters.
    #[must_use]
    #[inline]
    pub fn finish_hex(self) -> HexDigest {
        HexDigest::encode(&self.finish())
    }

    fn pad(key_block: &[u8; BLOCK_LEN], pad: u8) -> [u8; BLOCK_LEN] {
        let mut padded = *key_block;
        for byte in &mut padded {
            *byte ^= pad;
        }
        padded
    }
}
