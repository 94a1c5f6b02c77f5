//! Bit-packed truth tables.

use crate::{share::Share, table::LookupTable};
use rand::{RngCore, SeedableRng};
use scuttlebutt::{AbstractChannel, AesRng, Block};
use std::ops::{BitAnd, BitAndAssign, BitXor, BitXorAssign, Not};

/// A function from `n` input bits to `m` output bits, stored column by
/// column. Each column packs its `2^n` rows into `ceil(2^n / 8)` bytes,
/// row `i` at bit `i % 8` of byte `i / 8`. When `2^n < 8` the unused high
/// bits of a column are kept at zero.
///
/// Row `i` is the output for the input whose `k`th bit is `(i >> k) & 1`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TruthTable {
    n: usize,
    m: usize,
    stride: usize,
    bytes: Vec<u8>,
}

#[inline]
fn stride(n: usize) -> usize {
    ((1usize << n) + 7) / 8
}

// Move bit `t` of `x` to bit `t ^ d`.
#[inline]
fn shuffle_byte(mut x: u8, d: usize) -> u8 {
    if d & 1 != 0 {
        x = ((x & 0x55) << 1) | ((x >> 1) & 0x55);
    }
    if d & 2 != 0 {
        x = ((x & 0x33) << 2) | ((x >> 2) & 0x33);
    }
    if d & 4 != 0 {
        x = x.rotate_left(4);
    }
    x
}

impl TruthTable {
    /// The all-zero table.
    pub fn new(n: usize, m: usize) -> Self {
        assert!(n < usize::BITS as usize - 3, "too many inputs: {}", n);
        let stride = stride(n);
        TruthTable {
            n,
            m,
            stride,
            bytes: vec![0; stride * m],
        }
    }

    /// Build a table from a function of the row index returning the
    /// outputs as little-endian bits.
    pub fn from_fn(n: usize, m: usize, f: impl Fn(usize) -> u64) -> Self {
        assert!(m <= 64);
        let mut t = TruthTable::new(n, m);
        for i in 0..t.size() {
            let y = f(i);
            for j in 0..m {
                if (y >> j) & 1 == 1 {
                    t.bytes[j * t.stride + i / 8] |= 1 << (i % 8);
                }
            }
        }
        t
    }

    /// Tabulate the first `2^n` rows of a lookup table.
    pub fn from_table<T: LookupTable + ?Sized>(table: &T, n: usize) -> Self {
        TruthTable::from_fn(n, table.output_bits(), |i| table.row(i))
    }

    /// Rebuild a table from its byte representation.
    pub fn from_bytes(n: usize, m: usize, bytes: Vec<u8>) -> Self {
        let stride = stride(n);
        assert_eq!(bytes.len(), stride * m, "wrong truth table size");
        let mut t = TruthTable {
            n,
            m,
            stride,
            bytes,
        };
        t.clear_padding();
        t
    }

    /// The table whose every column is input bit `k`.
    pub fn input_column(n: usize, m: usize, k: usize) -> Self {
        assert!(k < n);
        let mut column = vec![0u8; stride(n)];
        for (b, byte) in column.iter_mut().enumerate() {
            for t in 0..8 {
                let i = 8 * b + t;
                if (i >> k) & 1 == 1 {
                    *byte |= 1 << t;
                }
            }
        }
        TruthTable::from_bytes(n, m, column.repeat(m))
    }

    /// A pseudorandom table determined by `seed`.
    pub fn uniform(n: usize, m: usize, seed: Block) -> Self {
        TruthTable::uniform_from_rng(n, m, &mut AesRng::from_seed(seed))
    }

    /// A random table drawn from `rng`.
    pub fn uniform_from_rng<R: RngCore>(n: usize, m: usize, rng: &mut R) -> Self {
        let mut t = TruthTable::new(n, m);
        rng.fill_bytes(&mut t.bytes);
        t.clear_padding();
        t
    }

    fn clear_padding(&mut self) {
        let size = self.size();
        if size < 8 {
            let mask = (1u8 << size) - 1;
            for b in self.bytes.iter_mut() {
                *b &= mask;
            }
        }
    }

    /// Number of inputs.
    #[inline]
    pub fn inputs(&self) -> usize {
        self.n
    }

    /// Number of outputs.
    #[inline]
    pub fn outputs(&self) -> usize {
        self.m
    }

    /// Number of rows, `2^n`.
    #[inline]
    pub fn size(&self) -> usize {
        1 << self.n
    }

    /// The packed bytes, column after column.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Entry `(i, j)`.
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> bool {
        assert!(i < self.size() && j < self.m);
        (self.bytes[j * self.stride + i / 8] >> (i % 8)) & 1 == 1
    }

    /// Assign entry `(i, j)`.
    #[inline]
    pub fn set(&mut self, i: usize, j: usize, b: bool) {
        assert!(i < self.size() && j < self.m);
        let byte = &mut self.bytes[j * self.stride + i / 8];
        *byte = (*byte & !(1 << (i % 8))) | ((b as u8) << (i % 8));
    }

    /// Row `i` as little-endian bits.
    pub fn row(&self, i: usize) -> u64 {
        assert!(self.m <= 64);
        (0..self.m).fold(0, |acc, j| acc | ((self.get(i, j) as u64) << j))
    }

    /// Negate column `j`.
    pub fn flip_column(&mut self, j: usize) {
        assert!(j < self.m);
        for b in self.bytes[j * self.stride..(j + 1) * self.stride].iter_mut() {
            *b = !*b;
        }
        self.clear_padding();
    }

    /// The table with rows permuted by `i ↦ i ⊕ delta`.
    pub fn linear_shuffle(&self, delta: usize) -> Self {
        assert!(delta < self.size());
        let (byte_delta, bit_delta) = (delta >> 3, delta & 7);
        let mut out = TruthTable::new(self.n, self.m);
        for j in 0..self.m {
            let column = &self.bytes[j * self.stride..(j + 1) * self.stride];
            for (b, byte) in out.bytes[j * self.stride..(j + 1) * self.stride]
                .iter_mut()
                .enumerate()
            {
                *byte = shuffle_byte(column[b ^ byte_delta], bit_delta);
            }
        }
        out
    }

    /// `out[j]` is the XOR of every `u[i]` with `self(i, j) = 1`.
    pub fn apply(&self, u: &[Share]) -> Vec<Share> {
        let mut out = vec![Share::ZERO; self.m];
        self.apply_into(u, &mut out);
        out
    }

    /// Like [`TruthTable::apply`], XORing into `out`.
    pub fn apply_into(&self, u: &[Share], out: &mut [Share]) {
        assert_eq!(u.len(), self.size());
        assert_eq!(out.len(), self.m);
        for (j, o) in out.iter_mut().enumerate() {
            let column = &self.bytes[j * self.stride..(j + 1) * self.stride];
            for (b, &byte) in column.iter().enumerate() {
                let mut bits = byte;
                while bits != 0 {
                    let t = bits.trailing_zeros() as usize;
                    *o ^= u[8 * b + t];
                    bits &= bits - 1;
                }
            }
        }
    }

    /// Write the table to a channel.
    pub fn send<C: AbstractChannel>(&self, channel: &mut C) -> std::io::Result<()> {
        channel.write_bytes(&self.bytes)
    }

    /// Read an `n`-input, `m`-output table from a channel.
    pub fn recv<C: AbstractChannel>(channel: &mut C, n: usize, m: usize) -> std::io::Result<Self> {
        let bytes = channel.read_vec(stride(n) * m)?;
        Ok(TruthTable::from_bytes(n, m, bytes))
    }

    fn assert_same_shape(&self, other: &TruthTable) {
        assert_eq!(
            (self.n, self.m),
            (other.n, other.m),
            "truth table shapes differ"
        );
    }
}

impl LookupTable for TruthTable {
    fn output_bits(&self) -> usize {
        self.m
    }

    fn row(&self, i: usize) -> u64 {
        TruthTable::row(self, i)
    }
}

impl BitXorAssign<&TruthTable> for TruthTable {
    fn bitxor_assign(&mut self, rhs: &TruthTable) {
        self.assert_same_shape(rhs);
        for (a, b) in self.bytes.iter_mut().zip(rhs.bytes.iter()) {
            *a ^= *b;
        }
    }
}

impl BitXor<&TruthTable> for &TruthTable {
    type Output = TruthTable;
    fn bitxor(self, rhs: &TruthTable) -> TruthTable {
        let mut out = self.clone();
        out ^= rhs;
        out
    }
}

impl BitAndAssign<&TruthTable> for TruthTable {
    fn bitand_assign(&mut self, rhs: &TruthTable) {
        self.assert_same_shape(rhs);
        for (a, b) in self.bytes.iter_mut().zip(rhs.bytes.iter()) {
            *a &= *b;
        }
    }
}

impl BitAnd<&TruthTable> for &TruthTable {
    type Output = TruthTable;
    fn bitand(self, rhs: &TruthTable) -> TruthTable {
        let mut out = self.clone();
        out &= rhs;
        out
    }
}

impl Not for &TruthTable {
    type Output = TruthTable;
    fn not(self) -> TruthTable {
        let mut out = self.clone();
        for b in out.bytes.iter_mut() {
            *b = !*b;
        }
        out.clear_padding();
        out
    }
}

impl std::fmt::Display for TruthTable {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        for i in 0..self.size() {
            write!(f, "{:0width$b}:", i, width = self.n.max(1))?;
            for j in 0..self.m {
                write!(f, "{}", self.get(i, j) as u8)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
