//! # MD5 Message-Digest Algorithm
//!
//! A streaming implementation of `RFC 1321`.
//!
//! The engine only keeps a single 64-byte block in memory, so messages of
//! any length can be hashed with a constant amount of RAM by feeding them
//! through [`Md5::process`] in chunks of arbitrary size.
//!
//! `MD5` is **cryptographically broken** as a collision-resistant hash. It
//! is only used here as the compression function of the `HMAC`
//! construction required by the choreo authentication protocol.

/// Size, in bytes, of an `MD5` block.
pub const BLOCK_LEN: usize = 64;

/// Size, in bytes, of an `MD5` digest.
pub const DIGEST_LEN: usize = 16;

/// An `MD5` digest.
pub type Digest = [u8; DIGEST_LEN];

// Space reserved at the end of the last block for the message bit length.
const LENGTH_LEN: usize = 8;

const INITIAL_STATE: [u32; 4] = [0x6745_2301, 0xefcd_ab89, 0x98ba_dcfe, 0x1032_5476];

// Per-round shift amounts.
const S: [u32; 64] = [
    7, 12, 17, 22, 7, 12, 17, 22, 7, 12, 17, 22, 7, 12, 17, 22, 5, 9, 14, 20, 5, 9, 14, 20, 5, 9,
    14, 20, 5, 9, 14, 20, 4, 11, 16, 23, 4, 11, 16, 23, 4, 11, 16, 23, 4, 11, 16, 23, 6, 10, 15,
    21, 6, 10, 15, 21, 6, 10, 15, 21, 6, 10, 15, 21,
];

// T[i] = floor(2^32 * |sin(i + 1)|)
const K: [u32; 64] = [
    0xd76a_a478, 0xe8c7_b756, 0x2420_70db, 0xc1bd_ceee, 0xf57c_0faf, 0x4787_c62a, 0xa830_4613,
    0xfd46_9501, 0x6980_98d8, 0x8b44_f7af, 0xffff_5bb1, 0x895c_d7be, 0x6b90_1122, 0xfd98_7193,
    0xa679_438e, 0x49b4_0821, 0xf61e_2562, 0xc040_b340, 0x265e_5a51, 0xe9b6_c7aa, 0xd62f_105d,
    0x0244_1453, 0xd8a1_e681, 0xe7d3_fbc8, 0x21e1_cde6, 0xc337_07d6, 0xf4d5_0d87, 0x455a_14ed,
    0xa9e3_e905, 0xfcef_a3f8, 0x676f_02d9, 0x8d2a_4c8a, 0xfffa_3942, 0x8771_f681, 0x6d9d_6122,
    0xfde5_380c, 0xa4be_ea44, 0x4bde_cfa9, 0xf6bb_4b60, 0xbebf_bc70, 0x289b_7ec6, 0xeaa1_27fa,
    0xd4ef_3085, 0x0488_1d05, 0xd9d4_d039, 0xe6db_99e5, 0x1fa2_7cf8, 0xc4ac_5665, 0xf429_2244,
    0x432a_ff97, 0xab94_23a7, 0xfc93_a039, 0x655b_59c3, 0x8f0c_cc92, 0xffef_f47d, 0x8584_5dd1,
    0x6fa8_7e4f, 0xfe2c_e6e0, 0xa301_4314, 0x4e08_11a1, 0xf753_7e82, 0xbd3a_f235, 0x2ad7_d2bb,
    0xeb86_d391,
];

fn compress(state: &mut [u32; 4], block: &[u8; BLOCK_LEN]) {
    let mut m = [0u32; 16];
    for (word, bytes) in m.iter_mut().zip(block.chunks_exact(4)) {
        *word = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    }

    let [mut a, mut b, mut c, mut d] = *state;

    for i in 0..64 {
        let (f, g) = match i {
            0..16 => ((b & c) | (!b & d), i),
            16..32 => ((d & b) | (!d & c), (5 * i + 1) % 16),
            32..48 => (b ^ c ^ d, (3 * i + 5) % 16),
            _ => (c ^ (b | !d), (7 * i) % 16),
        };

        let f = f.wrapping_add(a).wrapping_add(K[i]).wrapping_add(m[g]);
        a = d;
        d = c;
        c = b;
        b = b.wrapping_add(f.rotate_left(S[i]));
    }

    state[0] = state[0].wrapping_add(a);
    state[1] = state[1].wrapping_add(b);
    state[2] = state[2].wrapping_add(c);
    state[3] = state[3].wrapping_add(d);
}

/// A streaming `MD5` computation.
#[derive(Debug, Clone)]
pub struct Md5 {
    state: [u32; 4],
    buffer: [u8; BLOCK_LEN],
    // Always lower than `BLOCK_LEN` between two calls.
    buffered: usize,
    length_bits: u64,
}

impl Default for Md5 {
    fn default() -> Self {
        Self::new()
    }
}

impl Md5 {
    /// Creates an [`Md5`] engine in its initial state.
    #[must_use]
    #[inline]
    pub const fn new() -> Self {
        Self {
            state: INITIAL_STATE,
            buffer: [0; BLOCK_LEN],
            buffered: 0,
            length_bits: 0,
        }
    }

    /// Brings the engine back to its initial state, discarding any data
    /// processed so far.
    #[inline]
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Feeds bytes into the computation.
    ///
    /// It can be called any number of times with inputs of any length:
    /// the digest only depends on the concatenation of all inputs.
    pub fn process(&mut self, mut bytes: &[u8]) {
        self.length_bits = self
            .length_bits
            .wrapping_add((bytes.len() as u64).wrapping_mul(8));

        if self.buffered > 0 {
            let take = (BLOCK_LEN - self.buffered).min(bytes.len());
            self.buffer[self.buffered..self.buffered + take].copy_from_slice(&bytes[..take]);
            self.buffered += take;
            bytes = &bytes[take..];

            if self.buffered < BLOCK_LEN {
                return;
            }

            compress(&mut self.state, &self.buffer);
            self.buffered = 0;
        }

        let mut blocks = bytes.chunks_exact(BLOCK_LEN);
        for block in &mut blocks {
            let mut full = [0; BLOCK_LEN];
            full.copy_from_slice(block);
            compress(&mut self.state, &full);
        }

        let rest = blocks.remainder();
        self.buffer[..rest.len()].copy_from_slice(rest);
        self.buffered = rest.len();
    }

    /// Completes the computation and returns the digest.
    ///
    /// The engine is consumed, a new one is needed to hash another message.
    #[must_use]
    pub fn finish(mut self) -> Digest {
        let length_bits = self.length_bits;

        self.buffer[self.buffered] = 0x80;
        self.buffer[self.buffered + 1..].fill(0);

        // No room left for the length, it goes into an additional block.
        if self.buffered + 1 > BLOCK_LEN - LENGTH_LEN {
            compress(&mut self.state, &self.buffer);
            self.buffer = [0; BLOCK_LEN];
        }

        self.buffer[BLOCK_LEN - LENGTH_LEN..].copy_from_slice(&length_bits.to_le_bytes());
        compress(&mut self.state, &self.buffer);

        let mut digest = [0; DIGEST_LEN];
        for (bytes, word) in digest.chunks_exact_mut(4).zip(self.state) {
            bytes.copy_from_slice(&word.to_le_bytes());
        }
        digest
    }
}

/// Computes the `MD5` digest of `bytes` in one go.
#[must_use]
#[inline]
pub fn compute(bytes: &[u8]) -> Digest {
    let mut md5 = Md5::new();
    md5.process(bytes);
    md5.finish()
}

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::vec::Vec;

    use core::fmt::Write;

    use super::{Md5, compute};

    fn hex(bytes: &[u8]) -> String {
        let mut out = String::new();
        for byte in bytes {
            write!(out, "{byte:02x}").unwrap();
        }
        out
    }

    const VECTORS: [(&[u8], &str); 7] = [
        (b"", "d41d8cd98f00b204e9800998ecf8427e"),
        (b"a", "0cc175b9c0f1b6a831c399e269772661"),
        (b"abc", "900150983cd24fb0d6963f7d28e17f72"),
        (b"message digest", "f96b697d7cb7938d525a2f31aaf161d0"),
        (
            b"abcdefghijklmnopqrstuvwxyz",
            "c3fcd3d76192e4007dfb496cca67e13b",
        ),
        (
            b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789",
            "d174ab98d277d9f5a5611c2c9f419d9f",
        ),
        (
            b"12345678901234567890123456789012345678901234567890123456789012345678901234567890",
            "57edf4a22be3c955ac49da2e2107b67a",
        ),
    ];

    #[test]
    fn rfc1321_test_vectors() {
        for (input, expected) in VECTORS {
            assert_eq!(hex(&compute(input)), expected);
        }
    }

    #[test]
    fn split_at_every_boundary() {
        for (input, expected) in VECTORS {
            for split in 0..=input.len() {
                let mut md5 = Md5::new();
                md5.process(&input[..split]);
                md5.process(&input[split..]);
                assert_eq!(hex(&md5.finish()), expected, "split at {split}");
            }
        }
    }

    #[test]
    fn byte_by_byte() {
        let (input, expected) = VECTORS[6];

        let mut md5 = Md5::new();
        for byte in input {
            md5.process(core::slice::from_ref(byte));
        }
        assert_eq!(hex(&md5.finish()), expected);
    }

    #[test]
    fn padding_boundaries() {
        // Lengths around the point where the bit count no longer fits in
        // the last block.
        let message: Vec<u8> = (0..200u8).collect();
        for len in [55, 56, 57, 63, 64, 65, 119, 120, 128] {
            let mut chunked = Md5::new();
            for chunk in message[..len].chunks(7) {
                chunked.process(chunk);
            }
            assert_eq!(chunked.finish(), compute(&message[..len]), "length {len}");
        }
    }

    #[test]
    fn reset_restarts_computation() {
        let mut md5 = Md5::new();
        md5.process(b"garbage");
        md5.reset();
        md5.process(b"abc");
        assert_eq!(hex(&md5.finish()), "900150983cd24fb0d6963f7d28e17f72");
    }
}
