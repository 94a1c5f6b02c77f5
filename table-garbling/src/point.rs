//! Privacy-free point functions.
//!
//! From `n` labels `x`, both parties expand a binary tree of seeds. The
//! generator knows every seed; the evaluator knows every seed except the
//! ones on the path to the point `e = x ⊕ γ`, where `γ` collects the
//! generator's colors. Each level costs two blocks: one XOR-sum of the left
//! children and one of the right children, each masked by a hash of the
//! input label of the opposite color. The evaluator can open exactly the
//! sum that lets it recover the sibling of its missing node.
//!
//! Leaves are turned either into a one-hot vector (`privacy_free_point`) or
//! into the product of a public table row at `e` with secret bits
//! (`unary_outer_product`).

use crate::{
    errors::ProtocolError,
    session::{hash_share, Mode, Session},
    share::Share,
    share_matrix::ShareMatrix,
    table::LookupTable,
    util::{tweak, CHILD_TWEAKS},
};
use rayon::prelude::*;
use scuttlebutt::{AbstractChannel, AesHash, Block};

fn check_width<C: AbstractChannel, M: Mode>(
    session: &Session<C, M>,
    n: usize,
) -> Result<(), ProtocolError> {
    let max = session.config().max_unary_outer_product_size;
    if n > max {
        return Err(ProtocolError::OuterProductTooWide { got: n, max });
    }
    Ok(())
}

/// Expand parents `0..width` into `seeds[0..2 * width]`, skipping `skip`.
/// Returns the XOR of the left children and of the right children.
fn expand_level(
    hash: &AesHash,
    seeds: &mut [Share],
    width: usize,
    skip: Option<usize>,
) -> (Share, Share) {
    let mut evens = Share::ZERO;
    let mut odds = Share::ZERO;
    // Descending, so that no parent is overwritten before it is expanded.
    for j in (0..width).rev() {
        if Some(j) == skip {
            continue;
        }
        let seed = seeds[j];
        let left = hash_share(hash, seed, CHILD_TWEAKS[0]);
        let right = hash_share(hash, seed, CHILD_TWEAKS[1]);
        seeds[2 * j] = left;
        seeds[2 * j + 1] = right;
        evens ^= left;
        odds ^= right;
    }
    (evens, odds)
}

/// Build the seed tree for `x`. Returns the point (the generator's colors
/// for the generator, `e` for the evaluator) and the `2^n` leaf seeds. The
/// evaluator's seed at the point is garbage.
fn expand_tree<C: AbstractChannel, M: Mode>(
    session: &mut Session<C, M>,
    x: &[Share],
) -> Result<(usize, Vec<Share>), ProtocolError> {
    let n = x.len();
    debug_assert!(n > 0);
    let mut seeds = vec![Share::ZERO; 1 << n];

    let top = x[n - 1];
    let t = tweak(session.next_nonce());
    let mut point = top.color() as usize;
    if M::GENERATOR {
        let a0 = session.color_label(top, false);
        let a1 = session.color_label(top, true);
        seeds[0] = session.hash(a1, t);
        seeds[1] = session.hash(a0, t);
    } else {
        seeds[point ^ 1] = session.hash(top, t);
    }

    for k in (0..n - 1).rev() {
        let width = 1 << (n - 1 - k);
        let label = x[k];
        let c = label.color();
        let t = tweak(session.next_nonce());
        let skip = (!M::GENERATOR).then_some(point);
        let (evens, odds) = expand_level(session.hasher(), &mut seeds, width, skip);
        if M::GENERATOR {
            let a0 = session.color_label(label, false);
            let a1 = session.color_label(label, true);
            let row0 = evens ^ session.hash(a1, t);
            let row1 = odds ^ session.hash(a0, t);
            session.send_share(row0)?;
            session.send_share(row1)?;
        } else {
            let row0 = session.recv_share()?;
            let row1 = session.recv_share()?;
            let pad = session.hash(label, t);
            // Our label opens the sum of the children on the other side.
            let sibling = if c { row0 ^ pad ^ evens } else { row1 ^ pad ^ odds };
            seeds[(2 * point + c as usize) ^ 1] = sibling;
        }
        point = 2 * point + c as usize;
        log::trace!("{}: tree level {} expanded to width {}", M::NAME, k, 2 * width);
    }
    Ok((point, seeds))
}

/// Leaves hashed per call to `tccr_hash_many`.
const HASH_BATCH: usize = 8;

/// Hash `seeds[i]` into `out[i]` with nonce `base + i`, leaving `out[skip]`
/// zero. Returns the XOR of the hashed leaves.
fn hash_leaves(
    hash: &AesHash,
    seeds: &[Share],
    base: u64,
    skip: Option<usize>,
    out: &mut [Share],
) -> Share {
    let mut sum = Share::ZERO;
    let batches = out.chunks_mut(HASH_BATCH).zip(seeds.chunks(HASH_BATCH));
    for (k, (out, seeds)) in batches.enumerate() {
        let first = base + (k * HASH_BATCH) as u64;
        if out.len() == HASH_BATCH {
            let tweaks: [Block; HASH_BATCH] = std::array::from_fn(|j| tweak(first + j as u64));
            let blocks: [Block; HASH_BATCH] = std::array::from_fn(|j| seeds[j].as_block());
            for (o, h) in out.iter_mut().zip(hash.tccr_hash_many(tweaks, blocks)) {
                *o = Share::new(h);
            }
        } else {
            for (j, (o, s)) in out.iter_mut().zip(seeds).enumerate() {
                *o = hash_share(hash, *s, tweak(first + j as u64));
            }
        }
        sum = out.iter().fold(sum, |acc, &o| acc ^ o);
    }
    // The evaluator's seed at its own point is garbage.
    if let Some(p) = skip {
        sum ^= out[p];
        out[p] = Share::ZERO;
    }
    sum
}

fn map_columns<T, F>(parallel: bool, m: usize, f: F) -> Vec<T>
where
    T: Send,
    F: Fn(usize) -> T + Sync + Send,
{
    if parallel {
        (0..m).into_par_iter().map(f).collect()
    } else {
        (0..m).map(f).collect()
    }
}

/// Compute a one-hot vector at the point `e = x ⊕ γ`.
///
/// Returns `(point, U)` with `U` of length `2^n`. The two parties' `U`
/// agree everywhere except at `e`, where they differ by `Δ`. The generator
/// gets `γ` as its point and the evaluator gets `e`.
pub fn privacy_free_point<C: AbstractChannel, M: Mode>(
    session: &mut Session<C, M>,
    x: &[Share],
) -> Result<(usize, Vec<Share>), ProtocolError> {
    let n = x.len();
    check_width(session, n)?;
    if n == 0 {
        return Ok((0, vec![session.constant(true)]));
    }
    let (point, seeds) = expand_tree(session, x)?;
    let size = seeds.len();
    let base = session.reserve_nonces(size as u64);
    let skip = (!M::GENERATOR).then_some(point);
    let parallel = session.config().parallel;

    let mut u = vec![Share::ZERO; size];
    let hash = session.hasher();
    let sum = if parallel && size > 1 {
        let chunk = (size / rayon::current_num_threads()).max(64);
        u.par_chunks_mut(chunk)
            .zip(seeds.par_chunks(chunk))
            .enumerate()
            .map(|(c, (out, seeds))| {
                let start = c * chunk;
                let skip = skip
                    .filter(|p| (start..start + out.len()).contains(p))
                    .map(|p| p - start);
                hash_leaves(hash, seeds, base + start as u64, skip, out)
            })
            .reduce(|| Share::ZERO, |a, b| a ^ b)
    } else {
        hash_leaves(hash, &seeds, base, skip, &mut u)
    };

    if M::GENERATOR {
        session.send_share(sum ^ session.delta())?;
        session.flush()?;
    } else {
        let total = session.recv_share()?;
        u[point] = total ^ sum;
    }
    log::debug!("{}: point function over {} inputs", M::NAME, n);
    Ok((point, u))
}

/// Compute `out(k, j) ^= table.row(e)_k · y_j` where `e = x ⊕ γ` is the
/// evaluator's point.
///
/// `out` must have `table.output_bits()` rows and `y.len()` columns. The
/// generator sends `2(n - 1) + m` blocks. Returns the party's point.
pub fn unary_outer_product<C, M, T>(
    session: &mut Session<C, M>,
    table: &T,
    x: &[Share],
    y: &[Share],
    out: &mut ShareMatrix,
) -> Result<usize, ProtocolError>
where
    C: AbstractChannel,
    M: Mode,
    T: LookupTable + Sync + ?Sized,
{
    let n = x.len();
    let m = y.len();
    let l = table.output_bits();
    assert_eq!((out.rows(), out.cols()), (l, m), "output shape mismatch");
    check_width(session, n)?;
    if m == 0 {
        return Ok(0);
    }
    if n == 0 {
        let row = table.row(0);
        for k in (0..l).filter(|k| (row >> k) & 1 == 1) {
            for (j, &yj) in y.iter().enumerate() {
                out[(k, j)] ^= yj;
            }
        }
        return Ok(0);
    }

    let (point, seeds) = expand_tree(session, x)?;
    let size = seeds.len();
    let base = session.reserve_nonces((m * size) as u64);
    let skip = (!M::GENERATOR).then_some(point);
    let parallel = session.config().parallel;

    let hash = session.hasher();
    let mut columns = map_columns(parallel, m, |j| {
        let mut leaves = vec![Share::ZERO; size];
        let sum = hash_leaves(hash, &seeds, base + (j * size) as u64, skip, &mut leaves);
        (sum, leaves)
    });

    for (j, (sum, leaves)) in columns.iter_mut().enumerate() {
        if M::GENERATOR {
            session.send_share(*sum ^ y[j])?;
        } else {
            let total = session.recv_share()?;
            leaves[point] = total ^ *sum ^ y[j];
        }
    }
    if M::GENERATOR {
        session.flush()?;
    }

    let products = map_columns(parallel, m, |j| {
        let mut acc = vec![Share::ZERO; l];
        for (i, leaf) in columns[j].1.iter().enumerate() {
            let mut row = table.row(i);
            while row != 0 {
                acc[row.trailing_zeros() as usize] ^= *leaf;
                row &= row - 1;
            }
        }
        acc
    });
    for (j, acc) in products.iter().enumerate() {
        for (k, s) in acc.iter().enumerate() {
            out[(k, j)] ^= *s;
        }
    }
    log::debug!(
        "{}: unary outer product of {} inputs by {} columns",
        M::NAME,
        n,
        m
    );
    Ok(point)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::SessionConfig,
        matrix::Matrix,
        table::{FnTable, IdentityTable, Shifted},
        test_utils::{run_2pc, run_2pc_with_config, FIXED_KEY, SEED},
        util::u64_to_bits,
    };
    use scuttlebutt::{track_unix_channel_pair, unix_channel_pair, UnixChannel};

    fn point<C: AbstractChannel, M: Mode>(
        session: &mut Session<C, M>,
        x: u64,
        n: usize,
    ) -> (usize, Vec<Share>, Share) {
        let x = session.ginput_many(&u64_to_bits(x, n)).unwrap();
        let (p, u) = privacy_free_point(session, &x).unwrap();
        (p, u, session.delta())
    }

    #[test]
    fn test_point_function() {
        for n in 0..=8 {
            for x in 0..1u64 << n {
                let ((pg, ug, delta), (pe, ue, _)) =
                    run_2pc(move |s| point(s, x, n), move |s| point(s, x, n));
                assert_eq!((pg ^ pe) as u64, x, "n = {}", n);
                assert_eq!(ug.len(), 1 << n);
                for i in 0..1 << n {
                    let expected = if i == pe { delta } else { Share::ZERO };
                    assert_eq!(ug[i] ^ ue[i], expected, "n = {}, i = {}", n, i);
                }
            }
        }
    }

    #[test]
    fn test_hash_leaves_batches() {
        let hash = AesHash::new(FIXED_KEY);
        for size in [1, 7, 8, 13, 64] {
            let seeds: Vec<Share> = (0..size).map(|i| Share::new(Block(i as u128 * 0x9e37))).collect();
            for skip in [None, Some(0), Some(size - 1)] {
                let mut out = vec![Share::ZERO; size];
                let sum = hash_leaves(&hash, &seeds, 100, skip, &mut out);
                let mut expected = Share::ZERO;
                for (i, (o, s)) in out.iter().zip(&seeds).enumerate() {
                    if Some(i) == skip {
                        assert_eq!(*o, Share::ZERO);
                        continue;
                    }
                    assert_eq!(*o, hash_share(&hash, *s, tweak(100 + i as u64)));
                    expected ^= *o;
                }
                assert_eq!(sum, expected, "size = {}, skip = {:?}", size, skip);
            }
        }
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let run = |parallel: bool| {
            let config = SessionConfig::default().with_parallel(parallel);
            run_2pc_with_config(config, |s| point(s, 0b1011001, 7), |s| point(s, 0, 7))
        };
        let ((pg, ug, _), (pe, ue, _)) = run(true);
        let ((pg_, ug_, _), (pe_, ue_, _)) = run(false);
        assert_eq!((pg, pe), (pg_, pe_));
        assert_eq!(ug, ug_);
        assert_eq!(ue, ue_);
    }

    #[test]
    fn test_point_communication() {
        for n in 1..6 {
            let (sender, receiver) = track_unix_channel_pair();
            let handle = std::thread::spawn(move || {
                let mut session = Session::<_, crate::Generator>::new(sender, FIXED_KEY, SEED);
                let x = session.constants(&vec![false; n]);
                privacy_free_point(&mut session, &x).unwrap();
                session.into_channel().bytes_written()
            });
            let mut session = Session::<_, crate::Evaluator>::new(receiver, FIXED_KEY, SEED);
            let x = vec![Share::ZERO; n];
            privacy_free_point(&mut session, &x).unwrap();
            let written = handle.join().unwrap();
            assert_eq!(written, (2 * (n - 1) + 1) * 16);
            assert_eq!(session.into_channel().bytes_read(), written);
        }
    }

    #[test]
    fn test_too_wide() {
        let (a, _b) = unix_channel_pair();
        let mut session = Session::<UnixChannel, crate::Generator>::new(a, FIXED_KEY, SEED);
        let x = vec![Share::ZERO; 17];
        assert!(matches!(
            privacy_free_point(&mut session, &x),
            Err(ProtocolError::OuterProductTooWide { got: 17, max: 16 })
        ));
        let mut out = ShareMatrix::new(17, 1);
        assert!(matches!(
            unary_outer_product(&mut session, &IdentityTable::new(17), &x, &x[..1], &mut out),
            Err(ProtocolError::OuterProductTooWide { got: 17, max: 16 })
        ));
    }

    fn unary<C: AbstractChannel, M: Mode>(
        session: &mut Session<C, M>,
        x: u64,
        n: usize,
        y: u64,
        m: usize,
    ) -> (usize, Option<Matrix>) {
        let x = session.ginput_many(&u64_to_bits(x, n)).unwrap();
        let y = session.ginput_many(&u64_to_bits(y, m)).unwrap();
        let table = Shifted::new(FnTable::new(5, |i| (i as u64 * 13 + 7) % 32), 3);
        let mut out = ShareMatrix::new(5, m);
        let p = unary_outer_product(session, &table, &x, &y, &mut out).unwrap();
        (p, out.output(session).unwrap())
    }

    #[test]
    fn test_unary_outer_product() {
        for (x, n, y, m) in [(0, 1, 0b101, 3), (6, 3, 0b1, 1), (13, 4, 0b110110, 6), (0, 0, 0b11, 2)] {
            let ((pg, g), (pe, e)) =
                run_2pc(move |s| unary(s, x, n, y, m), move |s| unary(s, x, n, y, m));
            assert!(g.is_none());
            assert_eq!((pg ^ pe) as u64, x);
            // The table is indexed by the evaluator's point.
            let row = ((pe ^ 3) as u64 * 13 + 7) % 32;
            let expected = Matrix::from_fn(5, m, |k, j| (row >> k) & 1 == 1 && (y >> j) & 1 == 1);
            assert_eq!(e.unwrap(), expected);
        }
    }
}
