//! Labels held by the two parties.

use crate::gf256;
use scuttlebutt::Block;
use subtle::{Choice, ConditionallySelectable};

/// One party's label for a secret value.
///
/// For a bit `b` the generator holds `L` and the evaluator holds `L ⊕ b·Δ`.
/// Since `Δ` has its low bit set, `b` is the XOR of the two parties'
/// colors. A packed label for a byte `v` works the same way with `Δ·v`
/// computed bytewise in GF(256).
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Share(Block);

impl Share {
    /// The zero label.
    pub const ZERO: Share = Share(Block::ZERO);

    /// Wrap a block.
    #[inline]
    pub fn new(b: Block) -> Self {
        Share(b)
    }

    /// The underlying block.
    #[inline]
    pub fn as_block(&self) -> Block {
        self.0
    }

    /// The color (low bit) of the label.
    #[inline]
    pub fn color(&self) -> bool {
        self.0.lsb()
    }

    /// Multiply every byte of the label by `c` in GF(256).
    #[inline]
    pub fn scale(&self, c: u8) -> Self {
        Share(gf256::scale_block(self.0, c))
    }
}

impl From<Block> for Share {
    #[inline]
    fn from(b: Block) -> Self {
        Share(b)
    }
}

impl From<Share> for Block {
    #[inline]
    fn from(s: Share) -> Self {
        s.0
    }
}

impl ConditionallySelectable for Share {
    #[inline]
    fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
        Share(Block::conditional_select(&a.0, &b.0, choice))
    }
}

impl std::ops::BitXor for Share {
    type Output = Share;
    #[inline]
    fn bitxor(self, rhs: Self) -> Self {
        Share(self.0 ^ rhs.0)
    }
}

impl std::ops::BitXorAssign for Share {
    #[inline]
    fn bitxor_assign(&mut self, rhs: Self) {
        self.0 ^= rhs.0
    }
}

impl std::fmt::Debug for Share {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "Share({})", self.0)
    }
}

impl std::fmt::Display for Share {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}
