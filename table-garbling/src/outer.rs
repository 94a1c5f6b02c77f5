//! Outer products and the gates built from them.

use crate::{
    errors::ProtocolError,
    point::unary_outer_product,
    session::{Mode, Session},
    share::Share,
    share_matrix::ShareMatrix,
    table::IdentityTable,
};
use scuttlebutt::AbstractChannel;

/// `out(i, j) = e_i · y_j`, where `e = x ⊕ γ_x` is the evaluator's view of
/// `x`. The rows are handled in slices of `outer_product_slice_size`, one
/// point function per slice.
pub fn half_outer_product<C: AbstractChannel, M: Mode>(
    session: &mut Session<C, M>,
    x: &[Share],
    y: &[Share],
) -> Result<ShareMatrix, ProtocolError> {
    let (n, m) = (x.len(), y.len());
    let mut out = ShareMatrix::new(n, m);
    if n == 0 || m == 0 {
        return Ok(out);
    }
    let slice = session.config().outer_product_slice_size;
    for start in (0..n).step_by(slice) {
        let len = slice.min(n - start);
        let mut part = ShareMatrix::new(len, m);
        unary_outer_product(
            session,
            &IdentityTable::new(len),
            &x[start..start + len],
            y,
            &mut part,
        )?;
        for j in 0..m {
            for k in 0..len {
                out[(start + k, j)] = part[(k, j)];
            }
        }
    }
    Ok(out)
}

/// The outer product `out(i, j) = x_i ∧ y_j`.
///
/// Two half products: `e_x ⊗ y` and `e_y ⊗ γ_x`, plus the public term
/// `γ_x ⊗ γ_y` known to the generator.
pub fn outer_product<C: AbstractChannel, M: Mode>(
    session: &mut Session<C, M>,
    x: &[Share],
    y: &[Share],
) -> Result<ShareMatrix, ProtocolError> {
    let mut out = half_outer_product(session, x, y)?;
    let gamma_x: Vec<Share> = x.iter().map(|s| session.constant(s.color())).collect();
    let other = half_outer_product(session, y, &gamma_x)?;
    out ^= &other.transposed();
    for (j, b) in y.iter().enumerate() {
        for (i, a) in x.iter().enumerate() {
            out[(i, j)] ^= session.constant(a.color() & b.color());
        }
    }
    Ok(out)
}

/// Logical AND.
pub fn and<C: AbstractChannel, M: Mode>(
    session: &mut Session<C, M>,
    a: Share,
    b: Share,
) -> Result<Share, ProtocolError> {
    Ok(outer_product(session, &[a], &[b])?[(0, 0)])
}

/// Entrywise AND of two matrices of the same shape.
pub fn and_elementwise<C: AbstractChannel, M: Mode>(
    session: &mut Session<C, M>,
    x: &ShareMatrix,
    y: &ShareMatrix,
) -> Result<ShareMatrix, ProtocolError> {
    assert_eq!((x.rows(), x.cols()), (y.rows(), y.cols()), "matrix shapes differ");
    let mut out = ShareMatrix::new(x.rows(), x.cols());
    for j in 0..x.cols() {
        for i in 0..x.rows() {
            out[(i, j)] = and(session, x[(i, j)], y[(i, j)])?;
        }
    }
    Ok(out)
}

/// The product of an `n × k` and a `k × m` secret matrix, as a sum of `k`
/// outer products.
pub fn matrix_multiply<C: AbstractChannel, M: Mode>(
    session: &mut Session<C, M>,
    x: &ShareMatrix,
    y: &ShareMatrix,
) -> Result<ShareMatrix, ProtocolError> {
    assert_eq!(x.cols(), y.rows(), "matrix shapes do not compose");
    let mut out = ShareMatrix::new(x.rows(), y.cols());
    for t in 0..x.cols() {
        out ^= &outer_product(session, &x.column(t), &y.row(t))?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::SessionConfig, matrix::Matrix, test_utils::*};

    fn sample(rows: usize, cols: usize, seed: usize) -> Matrix {
        Matrix::from_fn(rows, cols, |i, j| (i * 5 + j * 11 + seed) % 7 < 3)
    }

    fn products<C: AbstractChannel, M: Mode>(session: &mut Session<C, M>) -> Option<Vec<Matrix>> {
        let a = ShareMatrix::ginput(session, &sample(11, 1, 0)).unwrap();
        let b = ShareMatrix::ginput(session, &sample(6, 1, 1)).unwrap();
        let x = ShareMatrix::ginput(session, &sample(3, 4, 2)).unwrap();
        let y = ShareMatrix::ginput(session, &sample(4, 5, 3)).unwrap();
        let z = ShareMatrix::ginput(session, &sample(3, 4, 4)).unwrap();
        let results = [
            outer_product(session, &a.column(0), &b.column(0)).unwrap(),
            matrix_multiply(session, &x, &y).unwrap(),
            and_elementwise(session, &x, &z).unwrap(),
        ];
        let decoded: Vec<Option<Matrix>> = results
            .iter()
            .map(|r| r.output(session).unwrap())
            .collect();
        decoded.into_iter().collect()
    }

    #[test]
    fn test_products() {
        // A slice size of 4 splits the 11-row outer product unevenly.
        let config = SessionConfig::default().with_outer_product_slice_size(4);
        let (g, e) = run_2pc_with_config(config, products, products);
        assert!(g.is_none());
        let e = e.unwrap();
        assert_eq!(e[0], Matrix::outer(&sample(11, 1, 0), &sample(6, 1, 1)));
        assert_eq!(e[1], &sample(3, 4, 2) * &sample(4, 5, 3));
        assert_eq!(e[2], &sample(3, 4, 2) & &sample(3, 4, 4));
    }

    fn truth_table_of_and<C: AbstractChannel, M: Mode>(
        session: &mut Session<C, M>,
    ) -> Option<Vec<bool>> {
        let mut outs = Vec::new();
        for (a, b) in [(false, false), (false, true), (true, false), (true, true)] {
            let a = session.ginput(a).unwrap();
            let b = session.ginput(b).unwrap();
            let c = and(session, a, b).unwrap();
            outs.push(session.output(c).unwrap());
        }
        outs.into_iter().collect()
    }

    #[test]
    fn test_and() {
        let (_, e) = run_2pc(truth_table_of_and, truth_table_of_and);
        assert_eq!(e, Some(vec![false, false, false, true]));
    }

    #[test]
    fn test_and_communication() {
        let (sender, receiver) = scuttlebutt::track_unix_channel_pair();
        let handle = std::thread::spawn(move || {
            let mut session = Session::<_, crate::Generator>::new(sender, FIXED_KEY, SEED);
            let a = session.uniform();
            let b = session.uniform();
            and(&mut session, a, b).unwrap();
            session.into_channel().bytes_written()
        });
        let mut session = Session::<_, crate::Evaluator>::new(receiver, FIXED_KEY, SEED);
        and(&mut session, Share::ZERO, Share::ZERO).unwrap();
        assert_eq!(handle.join().unwrap(), 2 * 16);
    }
}
