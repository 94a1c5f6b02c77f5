//! GF(256) arithmetic on secret `8 × 1` vectors, where entry `k` is the
//! coefficient of `x^k`.

use crate::{
    errors::ProtocolError,
    gf256,
    matrix::Matrix,
    outer::{and, half_outer_product},
    point::unary_outer_product,
    session::{Mode, Session},
    share::Share,
    share_matrix::ShareMatrix,
    table::{InverseTable, Shifted},
};
use scuttlebutt::AbstractChannel;

/// Row `i` holds the coefficients of `x^i mod p(x)`, for `i < 15`.
pub fn reduction_matrix() -> Matrix {
    let rows: Vec<u8> = (0..15)
        .map(|i| {
            if i < 8 {
                1 << i
            } else {
                gf256::mul(1 << (i - 7), 0x80)
            }
        })
        .collect();
    Matrix::from_fn(15, 8, |i, j| (rows[i] >> j) & 1 == 1)
}

/// The linear part of the AES S-box.
pub fn aes_linear_matrix() -> Matrix {
    Matrix::from_fn(8, 8, |i, j| [0, 4, 5, 6, 7].contains(&((j + 8 - i) % 8)))
}

fn check_vector(x: &ShareMatrix) {
    assert_eq!((x.rows(), x.cols()), (8, 1), "expected an 8 × 1 vector");
}

// Sum the antidiagonals of an `8 × 8` outer product into the 15
// coefficients of the unreduced polynomial product, then reduce.
fn fold_and_reduce(p: &ShareMatrix) -> ShareMatrix {
    let mut unreduced = ShareMatrix::new(15, 1);
    for j in 0..p.cols() {
        for i in 0..p.rows() {
            unreduced[(i + j, 0)] ^= p[(i, j)];
        }
    }
    &reduction_matrix().transposed() * &unreduced
}

/// `e_x · y`, where `e_x` is the evaluator's view of `x`.
pub fn half_mul_gf256<C: AbstractChannel, M: Mode>(
    session: &mut Session<C, M>,
    x: &ShareMatrix,
    y: &ShareMatrix,
) -> Result<ShareMatrix, ProtocolError> {
    check_vector(x);
    check_vector(y);
    let p = half_outer_product(session, &x.column(0), &y.column(0))?;
    Ok(fold_and_reduce(&p))
}

/// `x · y`.
pub fn mul_gf256<C: AbstractChannel, M: Mode>(
    session: &mut Session<C, M>,
    x: &ShareMatrix,
    y: &ShareMatrix,
) -> Result<ShareMatrix, ProtocolError> {
    let gamma_x = x.colors();
    let public_x = ShareMatrix::constant(session, &gamma_x);
    let mut out = half_mul_gf256(session, x, y)?;
    out ^= &half_mul_gf256(session, y, &public_x)?;
    let gamma = gf256::mul(gamma_x.to_byte(), y.colors().to_byte());
    out.xor_public(session, &Matrix::from_byte(gamma));
    Ok(out)
}

/// `x⁻¹`, for nonzero `x`.
///
/// The generator masks `x` with a random nonzero `y`, the evaluator learns
/// `x · y` in the clear and looks up its inverse against `y`, giving
/// `y · (x · y)⁻¹`. A zero `x` yields zero, but reveals that it was zero.
pub fn gf256_invert<C: AbstractChannel, M: Mode>(
    session: &mut Session<C, M>,
    x: &ShareMatrix,
) -> Result<ShareMatrix, ProtocolError> {
    check_vector(x);
    let mut y = ShareMatrix::uniform(session, 8, 1);
    while M::GENERATOR && y.colors().to_byte() == 0 {
        y = ShareMatrix::uniform(session, 8, 1);
    }
    // y is known to the generator, so γ_x · y is public to it.
    let mut xy = half_mul_gf256(session, x, &y)?;
    let public = gf256::mul(x.colors().to_byte(), y.colors().to_byte());
    xy.xor_public(session, &Matrix::from_byte(public));

    let gamma = session.reveal_colors(&xy)?;
    let table = Shifted::new(InverseTable, gamma.to_byte() as usize);
    let mut p = ShareMatrix::new(8, 8);
    unary_outer_product(session, &table, &xy.column(0), &y.column(0), &mut p)?;
    Ok(fold_and_reduce(&p))
}

/// The AES S-box.
pub fn aes_sbox<C: AbstractChannel, M: Mode>(
    session: &mut Session<C, M>,
    x: &ShareMatrix,
) -> Result<ShareMatrix, ProtocolError> {
    check_vector(x);
    // z = [x == 0], added to the constant term so the inverse never sees
    // zero.
    let mut z = session.negate(x[(0, 0)]);
    for i in 1..8 {
        let not_xi = session.negate(x[(i, 0)]);
        z = and(session, z, not_xi)?;
    }
    let mut shifted = x.clone();
    shifted[(0, 0)] ^= z;
    let mut b = gf256_invert(session, &shifted)?;
    b[(0, 0)] ^= z;

    let mut out = &aes_linear_matrix() * &b;
    out.xor_public(session, &Matrix::from_byte(0x63));
    Ok(out)
}

/// Decode a vector produced by this module.
pub fn output_byte<C: AbstractChannel, M: Mode>(
    session: &mut Session<C, M>,
    x: &ShareMatrix,
) -> Result<Option<u8>, ProtocolError> {
    check_vector(x);
    let bits: Vec<Share> = x.column(0);
    Ok(session.outputs(&bits)?.map(|bits| Matrix::from_bits(&bits).to_byte()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::run_2pc;

    #[rustfmt::skip]
    const SBOX: [u8; 256] = [
        0x63, 0x7c, 0x77, 0x7b, 0xf2, 0x6b, 0x6f, 0xc5, 0x30, 0x01, 0x67, 0x2b, 0xfe, 0xd7, 0xab, 0x76,
        0xca, 0x82, 0xc9, 0x7d, 0xfa, 0x59, 0x47, 0xf0, 0xad, 0xd4, 0xa2, 0xaf, 0x9c, 0xa4, 0x72, 0xc0,
        0xb7, 0xfd, 0x93, 0x26, 0x36, 0x3f, 0xf7, 0xcc, 0x34, 0xa5, 0xe5, 0xf1, 0x71, 0xd8, 0x31, 0x15,
        0x04, 0xc7, 0x23, 0xc3, 0x18, 0x96, 0x05, 0x9a, 0x07, 0x12, 0x80, 0xe2, 0xeb, 0x27, 0xb2, 0x75,
        0x09, 0x83, 0x2c, 0x1a, 0x1b, 0x6e, 0x5a, 0xa0, 0x52, 0x3b, 0xd6, 0xb3, 0x29, 0xe3, 0x2f, 0x84,
        0x53, 0xd1, 0x00, 0xed, 0x20, 0xfc, 0xb1, 0x5b, 0x6a, 0xcb, 0xbe, 0x39, 0x4a, 0x4c, 0x58, 0xcf,
        0xd0, 0xef, 0xaa, 0xfb, 0x43, 0x4d, 0x33, 0x85, 0x45, 0xf9, 0x02, 0x7f, 0x50, 0x3c, 0x9f, 0xa8,
        0x51, 0xa3, 0x40, 0x8f, 0x92, 0x9d, 0x38, 0xf5, 0xbc, 0xb6, 0xda, 0x21, 0x10, 0xff, 0xf3, 0xd2,
        0xcd, 0x0c, 0x13, 0xec, 0x5f, 0x97, 0x44, 0x17, 0xc4, 0xa7, 0x7e, 0x3d, 0x64, 0x5d, 0x19, 0x73,
        0x60, 0x81, 0x4f, 0xdc, 0x22, 0x2a, 0x90, 0x88, 0x46, 0xee, 0xb8, 0x14, 0xde, 0x5e, 0x0b, 0xdb,
        0xe0, 0x32, 0x3a, 0x0a, 0x49, 0x06, 0x24, 0x5c, 0xc2, 0xd3, 0xac, 0x62, 0x91, 0x95, 0xe4, 0x79,
        0xe7, 0xc8, 0x37, 0x6d, 0x8d, 0xd5, 0x4e, 0xa9, 0x6c, 0x56, 0xf4, 0xea, 0x65, 0x7a, 0xae, 0x08,
        0xba, 0x78, 0x25, 0x2e, 0x1c, 0xa6, 0xb4, 0xc6, 0xe8, 0xdd, 0x74, 0x1f, 0x4b, 0xbd, 0x8b, 0x8a,
        0x70, 0x3e, 0xb5, 0x66, 0x48, 0x03, 0xf6, 0x0e, 0x61, 0x35, 0x57, 0xb9, 0x86, 0xc1, 0x1d, 0x9e,
        0xe1, 0xf8, 0x98, 0x11, 0x69, 0xd9, 0x8e, 0x94, 0x9b, 0x1e, 0x87, 0xe9, 0xce, 0x55, 0x28, 0xdf,
        0x8c, 0xa1, 0x89, 0x0d, 0xbf, 0xe6, 0x42, 0x68, 0x41, 0x99, 0x2d, 0x0f, 0xb0, 0x54, 0xbb, 0x16,
    ];

    #[test]
    fn test_reduction_matrix() {
        let r = reduction_matrix();
        let row = |i: usize| -> Vec<usize> { (0..8).filter(|&j| r.get(i, j)).collect() };
        for i in 0..8 {
            assert_eq!(row(i), vec![i]);
        }
        assert_eq!(row(8), vec![0, 1, 3, 4]);
        assert_eq!(row(9), vec![1, 2, 4, 5]);
        assert_eq!(row(10), vec![2, 3, 5, 6]);
        assert_eq!(row(11), vec![3, 4, 6, 7]);
        assert_eq!(row(12), vec![0, 1, 3, 5, 7]);
        assert_eq!(row(13), vec![0, 2, 3, 6]);
        assert_eq!(row(14), vec![1, 3, 4, 7]);
    }

    #[test]
    fn test_sbox_in_the_clear() {
        let a = aes_linear_matrix();
        for x in 0..=255u8 {
            let b = Matrix::from_byte(gf256::invert(x));
            let y = (&a * &b).to_byte() ^ 0x63;
            assert_eq!(y, SBOX[x as usize]);
        }
    }

    fn arithmetic<C: AbstractChannel, M: Mode>(
        session: &mut Session<C, M>,
        pairs: &[(u8, u8)],
    ) -> Vec<Option<(u8, u8)>> {
        pairs
            .iter()
            .map(|&(a, b)| {
                let x = ShareMatrix::ginput(session, &Matrix::from_byte(a)).unwrap();
                let y = ShareMatrix::ginput(session, &Matrix::from_byte(b)).unwrap();
                let xy = mul_gf256(session, &x, &y).unwrap();
                let inv = gf256_invert(session, &x).unwrap();
                let xy = output_byte(session, &xy).unwrap();
                let inv = output_byte(session, &inv).unwrap();
                xy.zip(inv)
            })
            .collect()
    }

    #[test]
    fn test_mul_and_invert() {
        let pairs = [(0x57, 0x83), (0x01, 0xff), (0xca, 0x53), (0x80, 0x02), (0x35, 0x00)];
        let (g, e) = run_2pc(move |s| arithmetic(s, &pairs), move |s| arithmetic(s, &pairs));
        assert!(g.iter().all(Option::is_none));
        for (&(a, b), r) in pairs.iter().zip(e) {
            assert_eq!(r, Some((gf256::mul(a, b), gf256::invert(a))));
        }
    }

    fn inverse_products<C: AbstractChannel, M: Mode>(session: &mut Session<C, M>) -> Vec<Option<u8>> {
        (1..=255u8)
            .map(|v| {
                let x = ShareMatrix::ginput(session, &Matrix::from_byte(v)).unwrap();
                let inv = gf256_invert(session, &x).unwrap();
                let one = mul_gf256(session, &x, &inv).unwrap();
                output_byte(session, &one).unwrap()
            })
            .collect()
    }

    #[test]
    fn test_inverse_products() {
        let (_, e) = run_2pc(inverse_products, inverse_products);
        assert!(e.into_iter().all(|v| v == Some(1)));
    }

    fn associativity<C: AbstractChannel, M: Mode>(
        session: &mut Session<C, M>,
        triples: &[[u8; 3]],
    ) -> Vec<Option<(u8, u8)>> {
        triples
            .iter()
            .map(|t| {
                let [a, b, c] = t.map(|v| ShareMatrix::ginput(session, &Matrix::from_byte(v)).unwrap());
                let ab = mul_gf256(session, &a, &b).unwrap();
                let ab_c = mul_gf256(session, &ab, &c).unwrap();
                let bc = mul_gf256(session, &b, &c).unwrap();
                let a_bc = mul_gf256(session, &a, &bc).unwrap();
                let l = output_byte(session, &ab_c).unwrap();
                let r = output_byte(session, &a_bc).unwrap();
                l.zip(r)
            })
            .collect()
    }

    #[test]
    fn test_associativity() {
        let triples = [[0x57, 0x83, 0x13], [0xff, 0xfe, 0x02], [0x00, 0x35, 0x9a], [0x01, 0x01, 0xc3]];
        let (_, e) = run_2pc(move |s| associativity(s, &triples), move |s| associativity(s, &triples));
        for ([a, b, c], r) in triples.into_iter().zip(e) {
            let expected = gf256::mul(gf256::mul(a, b), c);
            assert_eq!(r, Some((expected, expected)));
        }
    }

    fn sboxes<C: AbstractChannel, M: Mode>(session: &mut Session<C, M>) -> Vec<Option<u8>> {
        (0..=255u8)
            .map(|v| {
                let x = ShareMatrix::ginput(session, &Matrix::from_byte(v)).unwrap();
                let y = aes_sbox(session, &x).unwrap();
                output_byte(session, &y).unwrap()
            })
            .collect()
    }

    #[test]
    fn test_aes_sbox() {
        let (_, e) = run_2pc(sboxes, sboxes);
        let e: Vec<u8> = e.into_iter().map(Option::unwrap).collect();
        assert_eq!(e, SBOX.to_vec());
    }
}
