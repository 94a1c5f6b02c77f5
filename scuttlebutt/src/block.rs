// -*- mode: rust; -*-
//
// This file is part of `scuttlebutt`.
// Copyright © 2019 Galois, Inc.
// See LICENSE for licensing information.

//! Defines a block as a 128-bit value, and implements block-related functions.

use bytemuck::{Pod, Zeroable};
use subtle::{Choice, ConditionallySelectable};

/// A 128-bit chunk.
///
/// The byte view (`AsRef<[u8]>`, `From<[u8; 16]>`) is the in-memory
/// representation of the underlying `u128`.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Pod, Zeroable)]
#[repr(transparent)]
pub struct Block(pub u128);

const ONE: u128 = 1;
const ONES: u128 = u128::MAX;

impl Block {
    /// The all-zero block.
    pub const ZERO: Block = Block(0);

    /// Return the least significant bit.
    #[inline]
    pub fn lsb(&self) -> bool {
        self.0 & ONE == ONE
    }

    /// Set the least significant bit.
    #[inline]
    pub fn set_lsb(&self) -> Block {
        Block(self.0 | ONE)
    }

    /// Flip all bits.
    #[inline]
    pub fn flip(&self) -> Self {
        Block(self.0 ^ ONES)
    }

    /// Return the bytes of the block.
    #[inline]
    pub fn to_bytes(&self) -> [u8; 16] {
        (*self).into()
    }

    /// Apply `f` to every byte of the block.
    #[inline]
    pub fn map_bytes(&self, f: impl Fn(u8) -> u8) -> Block {
        Block::from(self.to_bytes().map(f))
    }

    /// Try to create a `Block` from a slice of bytes. The slice must have exactly 16 bytes.
    #[inline]
    pub fn try_from_slice(bytes_slice: &[u8]) -> Option<Self> {
        let bytes: [u8; 16] = bytes_slice.try_into().ok()?;
        Some(Block::from(bytes))
    }
}

impl AsRef<[u8]> for Block {
    #[inline]
    fn as_ref(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}

impl AsMut<[u8]> for Block {
    #[inline]
    fn as_mut(&mut self) -> &mut [u8] {
        bytemuck::bytes_of_mut(self)
    }
}

impl ConditionallySelectable for Block {
    #[inline]
    fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
        Block(u128::conditional_select(&a.0, &b.0, choice))
    }
}

impl std::ops::BitAnd for Block {
    type Output = Block;
    #[inline]
    fn bitand(self, rhs: Self) -> Self {
        Block(self.0 & rhs.0)
    }
}

impl std::ops::BitAndAssign for Block {
    #[inline]
    fn bitand_assign(&mut self, rhs: Self) {
        self.0 &= rhs.0
    }
}

impl std::ops::BitOr for Block {
    type Output = Block;
    #[inline]
    fn bitor(self, rhs: Self) -> Self {
        Block(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for Block {
    #[inline]
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0
    }
}

impl std::ops::BitXor for Block {
    type Output = Block;
    #[inline]
    fn bitxor(self, rhs: Self) -> Self {
        Block(self.0 ^ rhs.0)
    }
}

impl std::ops::BitXorAssign for Block {
    #[inline]
    fn bitxor_assign(&mut self, rhs: Self) {
        self.0 ^= rhs.0
    }
}

impl std::fmt::Debug for Block {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        for byte in self.to_bytes().iter() {
            write!(f, "{:02X}", byte)?;
        }
        Ok(())
    }
}

impl std::fmt::Display for Block {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}

impl rand::distributions::Distribution<Block> for rand::distributions::Standard {
    #[inline]
    fn sample<R: rand::Rng + ?Sized>(&self, rng: &mut R) -> Block {
        Block(rng.gen::<u128>())
    }
}

impl From<Block> for u128 {
    #[inline]
    fn from(m: Block) -> u128 {
        m.0
    }
}

impl From<u128> for Block {
    #[inline]
    fn from(m: u128) -> Self {
        Block(m)
    }
}

impl From<Block> for [u8; 16] {
    #[inline]
    fn from(m: Block) -> [u8; 16] {
        m.0.to_ne_bytes()
    }
}

impl From<[u8; 16]> for Block {
    #[inline]
    fn from(m: [u8; 16]) -> Self {
        Block(u128::from_ne_bytes(m))
    }
}

impl From<Block> for [u64; 2] {
    #[inline]
    fn from(m: Block) -> Self {
        [m.0 as u64, (m.0 >> 64) as u64]
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Block {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serde::Serialize::serialize(&self.to_bytes(), serializer)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Block {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        <[u8; 16] as serde::Deserialize>::deserialize(deserializer).map(Block::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_and() {
        let x = rand::random::<Block>();
        let y = x & Block(ONES);
        assert_eq!(x, y);
    }

    #[test]
    fn test_or() {
        let x = rand::random::<Block>();
        let y = x | Block(ONES);
        assert_eq!(y, Block(ONES));
        let y = x | x;
        assert_eq!(x, y);
    }

    #[test]
    fn test_xor() {
        let x = rand::random::<Block>();
        let y = rand::random::<Block>();
        let z = x ^ y;
        let z = z ^ y;
        assert_eq!(x, z);
    }

    #[test]
    fn test_lsb() {
        let x = rand::random::<Block>();
        let x = x | Block(ONE);
        assert!(x.lsb());
        let x = x ^ Block(ONE);
        assert!(!x.lsb());
        assert!(Block::ZERO.set_lsb().lsb());
    }

    #[test]
    fn test_flip() {
        let x = rand::random::<Block>();
        let y = x.flip().flip();
        assert_eq!(x, y);
    }

    #[test]
    fn test_conversion() {
        let x = rand::random::<u128>();
        let x_ = u128::from(Block::from(x));
        assert_eq!(x, x_);
        let b = rand::random::<Block>();
        assert_eq!(Block::from(b.to_bytes()), b);
        assert_eq!(Block::try_from_slice(b.as_ref()), Some(b));
        assert_eq!(Block::try_from_slice(&[0u8; 15]), None);
    }

    #[test]
    fn test_map_bytes() {
        let b = Block::from([7u8; 16]);
        assert_eq!(b.map_bytes(|x| x ^ 7), Block::ZERO);
    }

    #[test]
    fn test_conditional_select() {
        let a = rand::random::<Block>();
        let b = rand::random::<Block>();
        assert_eq!(Block::conditional_select(&a, &b, Choice::from(0)), a);
        assert_eq!(Block::conditional_select(&a, &b, Choice::from(1)), b);
    }

    proptest::proptest! {
        #[test]
        fn test_bytes_roundtrip(x in proptest::num::u128::ANY) {
            let b = Block(x);
            proptest::prop_assert_eq!(Block::from(b.to_bytes()), b);
            proptest::prop_assert_eq!(b.flip() ^ b, Block(ONES));
            proptest::prop_assert_eq!(b.set_lsb().lsb(), true);
        }
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serialize() {
        let b = rand::random::<Block>();
        let s = serde_json::to_string(&b).unwrap();
        let b_: Block = serde_json::from_str(&s).unwrap();
        assert_eq!(b, b_);
    }
}
