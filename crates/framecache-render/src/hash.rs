#![forbid(unsafe_code)]

//! 32-bit FNV-1a content hashing.
//!
//! The same mixing function is used twice: once to reduce a command record to
//! a 4-byte digest, and again to fold that digest into every cell the command
//! touches. A cell's value therefore depends on both the content and the order
//! of the commands that reached it.

use framecache_core::Rect;

/// FNV-1a offset basis. Also the value of a cell no command has touched.
pub const HASH_INITIAL: u32 = 2_166_136_261;

const FNV_PRIME: u32 = 16_777_619;

/// Mix `bytes` into `hash`.
#[inline]
pub fn fnv1a(hash: &mut u32, bytes: &[u8]) {
    for &b in bytes {
        *hash = (*hash ^ b as u32).wrapping_mul(FNV_PRIME);
    }
}

/// Digest of one command record as it lands on screen.
///
/// `effective` is the command's rectangle after clipping. Folding it in means
/// a clip change that alters the visible part of an unchanged command still
/// changes the digest.
#[inline]
pub fn command_digest(record: &[u8], effective: Rect) -> u32 {
    let mut h = HASH_INITIAL;
    fnv1a(&mut h, record);
    fnv1a(&mut h, &effective.to_le_bytes());
    h
}
