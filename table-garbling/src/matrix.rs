//! Public bit matrices.

use bitvec::prelude::*;
use std::ops::{BitAnd, BitAndAssign, BitXor, BitXorAssign, Mul};

/// A dense bit matrix over GF(2).
///
/// Bits are stored column-major in the physical shape. Transposing only
/// flips a flag, so the logical shape is the physical one with rows and
/// columns swapped when `transposed` is set.
#[derive(Clone)]
pub struct Matrix {
    nrows: usize,
    ncols: usize,
    transposed: bool,
    bits: BitVec<u8, Lsb0>,
}

impl Matrix {
    /// The all-zero `rows × cols` matrix.
    pub fn new(rows: usize, cols: usize) -> Self {
        Matrix {
            nrows: rows,
            ncols: cols,
            transposed: false,
            bits: bitvec![u8, Lsb0; 0; rows * cols],
        }
    }

    /// The `n × n` identity.
    pub fn identity(n: usize) -> Self {
        Matrix::from_fn(n, n, |i, j| i == j)
    }

    /// Build a matrix entry by entry.
    pub fn from_fn(rows: usize, cols: usize, f: impl Fn(usize, usize) -> bool) -> Self {
        let mut m = Matrix::new(rows, cols);
        for j in 0..cols {
            for i in 0..rows {
                m.set(i, j, f(i, j));
            }
        }
        m
    }

    /// A column vector.
    pub fn from_bits(bits: &[bool]) -> Self {
        Matrix::from_fn(bits.len(), 1, |i, _| bits[i])
    }

    /// The low `n` bits of `x` as a column vector, least significant first.
    pub fn from_u32(x: u32, n: usize) -> Self {
        assert!(n <= 32);
        Matrix::from_fn(n, 1, |i, _| (x >> i) & 1 == 1)
    }

    /// Read a vector of at most 32 entries as a little-endian integer.
    pub fn to_u32(&self) -> u32 {
        let bits = self.to_bits();
        assert!(bits.len() <= 32);
        bits.iter()
            .enumerate()
            .fold(0, |acc, (i, &b)| acc | ((b as u32) << i))
    }

    /// A byte as an `8 × 1` column vector.
    pub fn from_byte(b: u8) -> Self {
        Matrix::from_u32(b as u32, 8)
    }

    /// Read a vector of at most 8 entries as a byte.
    pub fn to_byte(&self) -> u8 {
        let x = self.to_u32();
        assert!(x <= 0xff);
        x as u8
    }

    /// Number of logical rows.
    #[inline]
    pub fn rows(&self) -> usize {
        if self.transposed {
            self.ncols
        } else {
            self.nrows
        }
    }

    /// Number of logical columns.
    #[inline]
    pub fn cols(&self) -> usize {
        if self.transposed {
            self.nrows
        } else {
            self.ncols
        }
    }

    /// Whether the transpose flag is set.
    #[inline]
    pub fn is_transposed(&self) -> bool {
        self.transposed
    }

    #[inline]
    fn offset(&self, i: usize, j: usize) -> usize {
        let (i, j) = if self.transposed { (j, i) } else { (i, j) };
        assert!(
            i < self.nrows && j < self.ncols,
            "index ({}, {}) out of bounds",
            i,
            j
        );
        j * self.nrows + i
    }

    /// Get entry `(i, j)`.
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> bool {
        self.bits[self.offset(i, j)]
    }

    /// Set entry `(i, j)`.
    #[inline]
    pub fn set(&mut self, i: usize, j: usize, v: bool) {
        let k = self.offset(i, j);
        self.bits.set(k, v);
    }

    /// Transpose in place.
    #[inline]
    pub fn transpose(&mut self) {
        self.transposed = !self.transposed;
    }

    /// The transpose.
    #[inline]
    pub fn transposed(mut self) -> Self {
        self.transpose();
        self
    }

    /// All entries in logical column-major order.
    pub fn to_bits(&self) -> Vec<bool> {
        let mut out = Vec::with_capacity(self.rows() * self.cols());
        for j in 0..self.cols() {
            for i in 0..self.rows() {
                out.push(self.get(i, j));
            }
        }
        out
    }

    /// Pack the entries, in logical column-major order, into bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bits: BitVec<u8, Lsb0> = BitVec::with_capacity(self.rows() * self.cols());
        bits.extend(self.to_bits());
        bits.into_vec()
    }

    /// Inverse of [`Matrix::to_bytes`].
    pub fn from_bytes(rows: usize, cols: usize, bytes: &[u8]) -> Self {
        let bits = bytes.view_bits::<Lsb0>();
        assert!(bits.len() >= rows * cols);
        Matrix::from_fn(rows, cols, |i, j| bits[j * rows + i])
    }

    /// The outer product of two vectors: entry `(i, j)` is `x_i ∧ y_j`.
    pub fn outer(x: &Matrix, y: &Matrix) -> Matrix {
        let x = x.to_bits();
        let y = y.to_bits();
        Matrix::from_fn(x.len(), y.len(), |i, j| x[i] & y[j])
    }

    fn same_layout(&self, other: &Matrix) -> bool {
        self.nrows == other.nrows
            && self.ncols == other.ncols
            && self.transposed == other.transposed
    }

    fn zip_with(&mut self, other: &Matrix, f: impl Fn(u8, u8) -> u8, g: impl Fn(bool, bool) -> bool) {
        assert_eq!(
            (self.rows(), self.cols()),
            (other.rows(), other.cols()),
            "matrix shapes differ"
        );
        if self.same_layout(other) {
            for (a, b) in self
                .bits
                .as_raw_mut_slice()
                .iter_mut()
                .zip(other.bits.as_raw_slice().iter())
            {
                *a = f(*a, *b);
            }
        } else {
            for j in 0..self.cols() {
                for i in 0..self.rows() {
                    let v = g(self.get(i, j), other.get(i, j));
                    self.set(i, j, v);
                }
            }
        }
    }
}

impl PartialEq for Matrix {
    fn eq(&self, other: &Matrix) -> bool {
        self.rows() == other.rows()
            && self.cols() == other.cols()
            && (0..self.cols()).all(|j| (0..self.rows()).all(|i| self.get(i, j) == other.get(i, j)))
    }
}

impl Eq for Matrix {}

impl BitXorAssign<&Matrix> for Matrix {
    fn bitxor_assign(&mut self, rhs: &Matrix) {
        self.zip_with(rhs, |a, b| a ^ b, |a, b| a ^ b)
    }
}

impl BitXor<&Matrix> for &Matrix {
    type Output = Matrix;
    fn bitxor(self, rhs: &Matrix) -> Matrix {
        let mut out = self.clone();
        out ^= rhs;
        out
    }
}

impl BitAndAssign<&Matrix> for Matrix {
    fn bitand_assign(&mut self, rhs: &Matrix) {
        self.zip_with(rhs, |a, b| a & b, |a, b| a & b)
    }
}

impl BitAnd<&Matrix> for &Matrix {
    type Output = Matrix;
    fn bitand(self, rhs: &Matrix) -> Matrix {
        let mut out = self.clone();
        out &= rhs;
        out
    }
}

impl Mul<&Matrix> for &Matrix {
    type Output = Matrix;
    fn mul(self, rhs: &Matrix) -> Matrix {
        assert_eq!(self.cols(), rhs.rows(), "matrix shapes do not compose");
        Matrix::from_fn(self.rows(), rhs.cols(), |i, j| {
            (0..self.cols()).fold(false, |acc, t| acc ^ (self.get(i, t) & rhs.get(t, j)))
        })
    }
}

impl std::fmt::Display for Matrix {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        for i in 0..self.rows() {
            for j in 0..self.cols() {
                write!(f, "{}", self.get(i, j) as u8)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for Matrix {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "Matrix {}x{}\n{}", self.rows(), self.cols(), self)
    }
}
