//! Tools used throughout `table-garbling`.
//!
//! Note: all number representations in this library are little-endian.

use scuttlebutt::Block;

////////////////////////////////////////////////////////////////////////////////
// tweak functions

/// Tweak function for a single item.
#[inline]
pub fn tweak(i: u64) -> Block {
    Block::from(i as u128)
}

/// Compute the output tweak for the `i`th decoded output and candidate value `k`.
#[inline]
pub fn output_tweak(i: usize, k: u8) -> Block {
    // The top lane is disjoint from every nonce-derived tweak.
    Block::from((1u128 << 127) | ((i as u128) << 8) | k as u128)
}

/// Tweaks used to expand a tree node into its left and right child.
pub const CHILD_TWEAKS: [Block; 2] = [
    Block((u64::MAX as u128) << 64),
    Block(((u64::MAX as u128) << 64) | 1),
];

////////////////////////////////////////////////////////////////////////////////
// bits

/// Get the low `n` bits of `x`.
pub fn u64_to_bits(x: u64, n: usize) -> Vec<bool> {
    (0..n).map(|i| (x >> i) & 1 == 1).collect()
}

/// Convert little-endian bits into a `u64`.
pub fn u64_from_bits(bs: &[bool]) -> u64 {
    bs.iter()
        .enumerate()
        .fold(0, |acc, (i, &b)| acc | ((b as u64) << i))
}

/// Number of `width`-bit packs needed for `m` bits.
#[inline]
pub fn pack_count(m: usize, width: usize) -> usize {
    (m + width - 1) / width
}
