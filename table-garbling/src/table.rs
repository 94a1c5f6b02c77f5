//! Public lookup tables consumed by the unary outer product.

use crate::gf256;

/// A public function from a row index to at most 64 output bits.
pub trait LookupTable {
    /// Number of output bits per row.
    fn output_bits(&self) -> usize;
    /// The outputs of row `i` as little-endian bits.
    fn row(&self, i: usize) -> u64;
}

impl<T: LookupTable + ?Sized> LookupTable for &T {
    fn output_bits(&self) -> usize {
        (**self).output_bits()
    }
    fn row(&self, i: usize) -> u64 {
        (**self).row(i)
    }
}

/// Row `i` is `i` itself. With it, the unary outer product returns the
/// binary expansion of the point.
#[derive(Clone, Copy, Debug)]
pub struct IdentityTable {
    bits: usize,
}

impl IdentityTable {
    /// The identity over `bits`-bit indices.
    pub fn new(bits: usize) -> Self {
        assert!(bits <= 64);
        IdentityTable { bits }
    }
}

impl LookupTable for IdentityTable {
    fn output_bits(&self) -> usize {
        self.bits
    }
    fn row(&self, i: usize) -> u64 {
        i as u64
    }
}

/// `table` with its rows relabelled by `i ↦ i ⊕ offset`.
#[derive(Clone, Copy, Debug)]
pub struct Shifted<T> {
    table: T,
    offset: usize,
}

impl<T: LookupTable> Shifted<T> {
    /// Shift `table` by `offset`.
    pub fn new(table: T, offset: usize) -> Self {
        Shifted { table, offset }
    }
}

impl<T: LookupTable> LookupTable for Shifted<T> {
    fn output_bits(&self) -> usize {
        self.table.output_bits()
    }
    fn row(&self, i: usize) -> u64 {
        self.table.row(i ^ self.offset)
    }
}

/// A table computed by a closure.
#[derive(Clone, Copy)]
pub struct FnTable<F> {
    bits: usize,
    f: F,
}

impl<F: Fn(usize) -> u64> FnTable<F> {
    /// A table with `bits` outputs per row.
    pub fn new(bits: usize, f: F) -> Self {
        assert!(bits <= 64);
        FnTable { bits, f }
    }
}

impl<F: Fn(usize) -> u64> LookupTable for FnTable<F> {
    fn output_bits(&self) -> usize {
        self.bits
    }
    fn row(&self, i: usize) -> u64 {
        (self.f)(i) & mask(self.bits)
    }
}

/// Inversion in GF(256), zero to zero.
#[derive(Clone, Copy, Debug)]
pub struct InverseTable;

impl LookupTable for InverseTable {
    fn output_bits(&self) -> usize {
        8
    }
    fn row(&self, i: usize) -> u64 {
        gf256::invert(i as u8) as u64
    }
}

/// `(i << shift) mod modulus`.
#[derive(Clone, Copy, Debug)]
pub struct ModpTable {
    shift: u32,
    modulus: u64,
}

impl ModpTable {
    /// Reduction table for the byte at bit offset `shift`.
    pub fn new(shift: u32, modulus: u64) -> Self {
        assert!(modulus > 1 && shift < 56);
        ModpTable { shift, modulus }
    }
}

impl LookupTable for ModpTable {
    fn output_bits(&self) -> usize {
        (u64::BITS - (self.modulus - 1).leading_zeros()) as usize
    }
    fn row(&self, i: usize) -> u64 {
        ((i as u64) << self.shift) % self.modulus
    }
}

/// `base^(i << shift) mod 2^32`.
#[derive(Clone, Copy, Debug)]
pub struct ExpTable {
    base: u32,
    shift: u32,
}

impl ExpTable {
    /// Power table for the byte of the exponent at bit offset `shift`.
    pub fn new(base: u32, shift: u32) -> Self {
        assert!(shift < 32);
        ExpTable { base, shift }
    }
}

impl LookupTable for ExpTable {
    fn output_bits(&self) -> usize {
        32
    }
    fn row(&self, i: usize) -> u64 {
        // Exponents wrap at 2^32, as they do for the integer circuits.
        let e = (i as u32).wrapping_shl(self.shift);
        self.base.wrapping_pow(e) as u64
    }
}

#[inline]
fn mask(bits: usize) -> u64 {
    if bits == 64 {
        u64::MAX
    } else {
        (1 << bits) - 1
    }
}
