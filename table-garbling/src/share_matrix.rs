//! Matrices of secret bits.

use crate::{
    errors::ProtocolError,
    matrix::Matrix,
    session::{Mode, Session},
    share::Share,
};
use scuttlebutt::AbstractChannel;
use std::ops::{BitXor, BitXorAssign, Index, IndexMut, Mul};

/// A matrix of labels, laid out like [`Matrix`]: column-major in the
/// physical shape, with an O(1) transpose flag.
#[derive(Clone, Debug)]
pub struct ShareMatrix {
    nrows: usize,
    ncols: usize,
    transposed: bool,
    vals: Vec<Share>,
}

impl ShareMatrix {
    /// A `rows × cols` matrix of zero labels. Both parties get a valid
    /// encoding of the zero matrix.
    pub fn new(rows: usize, cols: usize) -> Self {
        ShareMatrix {
            nrows: rows,
            ncols: cols,
            transposed: false,
            vals: vec![Share::ZERO; rows * cols],
        }
    }

    /// Build a matrix from labels in column-major order.
    pub fn from_shares(rows: usize, cols: usize, vals: Vec<Share>) -> Self {
        assert_eq!(vals.len(), rows * cols);
        ShareMatrix {
            nrows: rows,
            ncols: cols,
            transposed: false,
            vals,
        }
    }

    /// A column vector.
    pub fn column_vector(vals: Vec<Share>) -> Self {
        let n = vals.len();
        ShareMatrix::from_shares(n, 1, vals)
    }

    /// Encode a public matrix.
    pub fn constant<C: AbstractChannel, M: Mode>(session: &Session<C, M>, m: &Matrix) -> Self {
        let mut out = ShareMatrix::new(m.rows(), m.cols());
        for j in 0..m.cols() {
            for i in 0..m.rows() {
                out[(i, j)] = session.constant(m.get(i, j));
            }
        }
        out
    }

    /// A random matrix known to the generator only.
    pub fn uniform<C: AbstractChannel, M: Mode>(
        session: &mut Session<C, M>,
        rows: usize,
        cols: usize,
    ) -> Self {
        let vals = (0..rows * cols).map(|_| session.uniform()).collect();
        ShareMatrix::from_shares(rows, cols, vals)
    }

    /// Generator inputs. The evaluator's `m` only fixes the shape.
    pub fn ginput<C: AbstractChannel, M: Mode>(
        session: &mut Session<C, M>,
        m: &Matrix,
    ) -> Result<Self, ProtocolError> {
        let vals = session.ginput_many(&m.to_bits())?;
        Ok(ShareMatrix::from_shares(m.rows(), m.cols(), vals))
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
    pub fn get(&self, i: usize, j: usize) -> Share {
        self.vals[self.offset(i, j)]
    }

    /// Set entry `(i, j)`.
    #[inline]
    pub fn set(&mut self, i: usize, j: usize, s: Share) {
        let k = self.offset(i, j);
        self.vals[k] = s;
    }

    /// Entry `(i, j)`, mutably.
    #[inline]
    pub fn get_mut(&mut self, i: usize, j: usize) -> &mut Share {
        let k = self.offset(i, j);
        &mut self.vals[k]
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

    /// The colors of every label.
    pub fn colors(&self) -> Matrix {
        Matrix::from_fn(self.rows(), self.cols(), |i, j| self.get(i, j).color())
    }

    /// Column `j`.
    pub fn column(&self, j: usize) -> Vec<Share> {
        (0..self.rows()).map(|i| self.get(i, j)).collect()
    }

    /// Row `i`.
    pub fn row(&self, i: usize) -> Vec<Share> {
        (0..self.cols()).map(|j| self.get(i, j)).collect()
    }

    /// All entries in logical column-major order.
    pub fn to_vec(&self) -> Vec<Share> {
        (0..self.cols()).flat_map(|j| self.column(j)).collect()
    }

    /// Multiply every entry by `c` in GF(256).
    pub fn scale(&self, c: u8) -> Self {
        let mut out = self.clone();
        for s in out.vals.iter_mut() {
            *s = s.scale(c);
        }
        out
    }

    /// XOR a public matrix into this one.
    pub fn xor_public<C: AbstractChannel, M: Mode>(&mut self, session: &Session<C, M>, m: &Matrix) {
        *self ^= &ShareMatrix::constant(session, m);
    }

    /// Decode every entry for the evaluator. The generator returns `None`.
    pub fn output<C: AbstractChannel, M: Mode>(
        &self,
        session: &mut Session<C, M>,
    ) -> Result<Option<Matrix>, ProtocolError> {
        let bits = session.outputs(&self.to_vec())?;
        Ok(bits.map(|bits| {
            let rows = self.rows();
            Matrix::from_fn(rows, self.cols(), |i, j| bits[j * rows + i])
        }))
    }

    /// Reveal every entry to both parties.
    pub fn reveal<C: AbstractChannel, M: Mode>(
        &self,
        session: &mut Session<C, M>,
    ) -> Result<Matrix, ProtocolError> {
        let bits = session.reveal_many(&self.to_vec())?;
        let rows = self.rows();
        Ok(Matrix::from_fn(rows, self.cols(), |i, j| bits[j * rows + i]))
    }
}

impl Index<(usize, usize)> for ShareMatrix {
    type Output = Share;
    #[inline]
    fn index(&self, (i, j): (usize, usize)) -> &Share {
        &self.vals[self.offset(i, j)]
    }
}

impl IndexMut<(usize, usize)> for ShareMatrix {
    #[inline]
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut Share {
        self.get_mut(i, j)
    }
}

impl BitXorAssign<&ShareMatrix> for ShareMatrix {
    fn bitxor_assign(&mut self, rhs: &ShareMatrix) {
        assert_eq!(
            (self.rows(), self.cols()),
            (rhs.rows(), rhs.cols()),
            "matrix shapes differ"
        );
        if self.transposed == rhs.transposed && self.nrows == rhs.nrows {
            for (a, b) in self.vals.iter_mut().zip(rhs.vals.iter()) {
                *a ^= *b;
            }
        } else {
            for j in 0..self.cols() {
                for i in 0..self.rows() {
                    self[(i, j)] ^= rhs[(i, j)];
                }
            }
        }
    }
}

impl BitXor<&ShareMatrix> for &ShareMatrix {
    type Output = ShareMatrix;
    fn bitxor(self, rhs: &ShareMatrix) -> ShareMatrix {
        let mut out = self.clone();
        out ^= rhs;
        out
    }
}

impl Mul<&ShareMatrix> for &Matrix {
    type Output = ShareMatrix;
    fn mul(self, rhs: &ShareMatrix) -> ShareMatrix {
        assert_eq!(self.cols(), rhs.rows(), "matrix shapes do not compose");
        let mut out = ShareMatrix::new(self.rows(), rhs.cols());
        for j in 0..rhs.cols() {
            for t in 0..self.cols() {
                let s = rhs[(t, j)];
                for i in 0..self.rows() {
                    if self.get(i, t) {
                        out[(i, j)] ^= s;
                    }
                }
            }
        }
        out
    }
}

impl Mul<&Matrix> for &ShareMatrix {
    type Output = ShareMatrix;
    fn mul(self, rhs: &Matrix) -> ShareMatrix {
        assert_eq!(self.cols(), rhs.rows(), "matrix shapes do not compose");
        let mut out = ShareMatrix::new(self.rows(), rhs.cols());
        for j in 0..rhs.cols() {
            for t in 0..self.cols() {
                if rhs.get(t, j) {
                    for i in 0..self.rows() {
                        out[(i, j)] ^= self[(i, t)];
                    }
                }
            }
        }
        out
    }
}
