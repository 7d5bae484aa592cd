//! Hash adapter: one 64-bit hash per key, two window anchors derived from it.
//!
//! The second anchor comes from the same hash rotated by 32 bits. A cuckoo
//! table works as well with a derived secondary hash as with two independent
//! hash functions, and computing one hash per operation keeps lookups cheap.

/// Fast alternative to modulo reduction (note: it is not the same as modulo).
///
/// Maps a uniformly distributed 64-bit `word` to `[0, p)` with a 128-bit
/// multiply and shift, avoiding the division. Best used with hashes or PRNG
/// output; low-entropy inputs all land near zero.
///
/// See: https://lemire.me/blog/2016/06/27/a-fast-alternative-to-the-modulo-reduction/
#[inline]
pub fn fast_range(word: u64, p: u64) -> u64 {
    (((word as u128) * (p as u128)) >> 64) as u64
}

/// Hash used for the secondary window anchor.
#[inline]
pub fn secondary(hash: u64) -> u64 {
    hash.rotate_right(32)
}

/// Short-hash tag for the metadata word: the top byte of the hash, positioned
/// in the high byte of the word.
#[inline]
pub fn hash_tag(hash: u64) -> u16 {
    ((hash >> 48) as u16) & 0xFF00
}
