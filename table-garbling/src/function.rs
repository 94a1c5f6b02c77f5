//! Oblivious application of private truth tables.
//!
//! After a point function on `x`, both parties hold vectors `U` that differ
//! only at the evaluator's point `e = x ⊕ γ`. Applying any public table `T`
//! to `U` then yields labels of `T(e)`. A private function `f` is evaluated
//! by publishing `f(· ⊕ γ) ⊕ r` for a random table `r`, and separately
//! computing labels of `r(e)` with one garbled row per packed output for
//! every input bit.

use crate::{
    config::MAX_PACK_WIDTH,
    errors::ProtocolError,
    pack::pack_all,
    point::privacy_free_point,
    session::{Mode, Session},
    share::Share,
    share_matrix::ShareMatrix,
    table::LookupTable,
    truth_table::TruthTable,
    util::{pack_count, tweak},
};
use scuttlebutt::AbstractChannel;

/// The share of the random table `r` controlled by input bit `k`.
///
/// The generator adds to `r` a fresh table that is pseudorandom on the rows
/// where bit `k` is set, keyed by the `1`-label of `x[k]`, and on the other
/// rows keyed by the `0`-label. The evaluator can rebuild exactly the half
/// its label opens, which is the half holding its point. `out` receives
/// labels of that half's row at `e`, packed `width` bits per label.
pub fn half_uniform_function<C: AbstractChannel, M: Mode>(
    session: &mut Session<C, M>,
    k: usize,
    x: &[Share],
    u: &[Share],
    width: usize,
    r: &mut TruthTable,
    out: &mut [Share],
) -> Result<(), ProtocolError> {
    let n = x.len();
    let m = r.outputs();
    assert!(k < n);
    assert_eq!(r.inputs(), n);
    assert_eq!(u.len(), 1 << n);
    assert_eq!(out.len(), pack_count(m, width));

    let mask = TruthTable::input_column(n, m, k);
    let seed_tweak = tweak(session.next_nonce());
    let label = x[k];

    if M::GENERATOR {
        let a0 = session.color_label(label, false);
        let a1 = session.color_label(label, true);
        let table0 =
            &TruthTable::uniform(n, m, session.hash(a0, seed_tweak).as_block()) & &!&mask;
        let table1 = &TruthTable::uniform(n, m, session.hash(a1, seed_tweak).as_block()) & &mask;
        *r ^= &table0;
        *r ^= &table1;
        let p0 = pack_all(&table0.apply(u), width);
        let p1 = pack_all(&table1.apply(u), width);
        for (p, o) in out.iter_mut().enumerate() {
            let t = tweak(session.next_nonce());
            let x_ = session.hash(a0, t) ^ p1[p];
            session.send_share(session.hash(a1, t) ^ p0[p] ^ x_)?;
            *o ^= p0[p] ^ p1[p] ^ x_;
        }
        session.flush()?;
    } else {
        let c = label.color();
        let mut table = TruthTable::uniform(n, m, session.hash(label, seed_tweak).as_block());
        if c {
            table &= &mask;
        } else {
            table &= &!&mask;
        }
        let pc = pack_all(&table.apply(u), width);
        for (p, o) in out.iter_mut().enumerate() {
            let t = tweak(session.next_nonce());
            let row = session.recv_share()?;
            *o ^= pc[p] ^ session.hash(label, t);
            if c {
                *o ^= row;
            }
        }
    }
    log::trace!("{}: half uniform function for input {}", M::NAME, k);
    Ok(())
}

/// Build a random table `r` known to the generator, with `out` receiving
/// labels of `r(e)`.
pub fn uniform_function<C: AbstractChannel, M: Mode>(
    session: &mut Session<C, M>,
    x: &[Share],
    u: &[Share],
    width: usize,
    r: &mut TruthTable,
    out: &mut [Share],
) -> Result<(), ProtocolError> {
    for k in 0..x.len() {
        half_uniform_function(session, k, x, u, width, r, out)?;
    }
    // Output masks, so that rows of r are uniform and not just a sum of
    // halves.
    let masks: Vec<Share> = (0..r.outputs()).map(|_| session.uniform()).collect();
    if M::GENERATOR {
        for (j, mask) in masks.iter().enumerate() {
            if mask.color() {
                r.flip_column(j);
            }
        }
    }
    for (o, p) in out.iter_mut().zip(pack_all(&masks, width)) {
        *o ^= p;
    }
    Ok(())
}

/// A fresh random table with `m` outputs, and packed labels of its row at
/// the evaluator's point. The evaluator's table is all zeros.
pub fn random_function<C: AbstractChannel, M: Mode>(
    session: &mut Session<C, M>,
    x: &[Share],
    u: &[Share],
    m: usize,
) -> Result<(TruthTable, Vec<Share>), ProtocolError> {
    let width = session.config().pack_width;
    let mut r = TruthTable::new(x.len(), m);
    let mut out = vec![Share::ZERO; pack_count(m, width)];
    uniform_function(session, x, u, width, &mut r, &mut out)?;
    Ok((r, out))
}

/// Evaluate the generator's private table `f` on `x`, returning packed
/// labels of `f(x)` with the session's packing width. The evaluator's `f`
/// only provides the shape.
pub fn private_function<C: AbstractChannel, M: Mode>(
    session: &mut Session<C, M>,
    f: &TruthTable,
    x: &[Share],
) -> Result<Vec<Share>, ProtocolError> {
    let width = session.config().pack_width;
    private_function_with_width(session, f, x, width)
}

/// Like [`private_function`], with one label per output bit.
pub fn private_function_bits<C: AbstractChannel, M: Mode>(
    session: &mut Session<C, M>,
    f: &TruthTable,
    x: &[Share],
) -> Result<Vec<Share>, ProtocolError> {
    private_function_with_width(session, f, x, 1)
}

/// Like [`private_function`], packing `width` output bits per label.
pub fn private_function_with_width<C: AbstractChannel, M: Mode>(
    session: &mut Session<C, M>,
    f: &TruthTable,
    x: &[Share],
    width: usize,
) -> Result<Vec<Share>, ProtocolError> {
    if width > MAX_PACK_WIDTH {
        return Err(ProtocolError::PackTooWide {
            got: width,
            max: MAX_PACK_WIDTH,
        });
    }
    if width == 0 {
        return Err(ProtocolError::InvalidArg("packing width 0".to_string()));
    }
    let n = x.len();
    let m = f.outputs();
    assert_eq!(f.inputs(), n, "table has {} inputs, got {}", f.inputs(), n);

    let (point, u) = privacy_free_point(session, x)?;
    let mut r = TruthTable::new(n, m);
    let mut out = vec![Share::ZERO; pack_count(m, width)];
    uniform_function(session, x, &u, width, &mut r, &mut out)?;

    let masked = if M::GENERATOR {
        let masked = &f.linear_shuffle(point) ^ &r;
        session.send_table(&masked)?;
        session.flush()?;
        masked
    } else {
        session.recv_table(n, m)?
    };
    for (o, p) in out.iter_mut().zip(pack_all(&masked.apply(&u), width)) {
        *o ^= p;
    }
    log::debug!(
        "{}: private function with {} inputs and {} outputs",
        M::NAME,
        n,
        m
    );
    Ok(out)
}

/// Look up the secret index `x` in a public table. Returns a column of
/// `table.output_bits()` labels.
pub fn table_lookup<C, M, T>(
    session: &mut Session<C, M>,
    table: &T,
    x: &[Share],
) -> Result<ShareMatrix, ProtocolError>
where
    C: AbstractChannel,
    M: Mode,
    T: LookupTable + ?Sized,
{
    let f = TruthTable::from_table(table, x.len());
    let out = private_function_bits(session, &f, x)?;
    Ok(ShareMatrix::column_vector(out))
}
