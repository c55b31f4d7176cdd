//! MD5-based position hashing.
//!
//! Ring positions are unsigned 32-bit integers packed little-endian out of an
//! MD5 digest. Node keys use all four 4-byte groups of their digest; lookup
//! keys use only the first. Both go through [`word_at`], so the byte order can
//! never drift between the two paths.

use md5::{Digest, Md5};

/// Length of an MD5 digest in bytes.
pub const DIGEST_LEN: usize = 16;

/// Number of ring positions carved out of one digest.
pub const POINTS_PER_DIGEST: usize = DIGEST_LEN / 4;

/// Compute the MD5 digest of `bytes`.
pub fn digest(bytes: &[u8]) -> [u8; DIGEST_LEN] {
    Md5::digest(bytes).into()
}

/// Split a digest into its four little-endian 32-bit words.
pub fn extract_all(digest: &[u8; DIGEST_LEN]) -> [u32; POINTS_PER_DIGEST] {
    [
        word_at(digest, 0),
        word_at(digest, 4),
        word_at(digest, 8),
        word_at(digest, 12),
    ]
}

/// Hash `bytes` and return the first little-endian word of the digest.
///
/// This is the position of a lookup key on the ring.
pub fn extract_one(bytes: &[u8]) -> u32 {
    word_at(&digest(bytes), 0)
}

/// `d[o+3] << 24 | d[o+2] << 16 | d[o+1] << 8 | d[o]`.
fn word_at(digest: &[u8; DIGEST_LEN], offset: usize) -> u32 {
    (u32::from(digest[offset + 3]) << 24)
        | (u32::from(digest[offset + 2]) << 16)
        | (u32::from(digest[offset + 1]) << 8)
        | u32::from(digest[offset])
}
