//! Integer arithmetic on little-endian vectors of bit labels.

use crate::{
    errors::ProtocolError,
    function::table_lookup,
    outer::{and, outer_product},
    session::{Mode, Session},
    share::Share,
    table::{ExpTable, ModpTable},
    util::u64_to_bits,
};
use scuttlebutt::AbstractChannel;

/// The modulus of [`mod_p`], the largest prime below `2^16`.
pub const P: u64 = 65521;

/// The public integer `v` on `n` bits.
pub fn integer_constant<C: AbstractChannel, M: Mode>(
    session: &Session<C, M>,
    v: u64,
    n: usize,
) -> Vec<Share> {
    session.constants(&u64_to_bits(v, n))
}

fn xor_all(x: &[Share], y: &[Share]) -> Vec<Share> {
    x.iter().zip(y).map(|(&a, &b)| a ^ b).collect()
}

/// `x + y mod 2^n`.
pub fn integer_add<C: AbstractChannel, M: Mode>(
    session: &mut Session<C, M>,
    x: &[Share],
    y: &[Share],
) -> Result<Vec<Share>, ProtocolError> {
    assert_eq!(x.len(), y.len());
    let n = x.len();
    let mut out = Vec::with_capacity(n);
    let mut c = Share::ZERO;
    for i in 0..n {
        out.push(x[i] ^ y[i] ^ c);
        if i + 1 < n {
            c ^= and(session, x[i] ^ c, y[i] ^ c)?;
        }
    }
    Ok(out)
}

/// `x - y mod 2^n` and the final borrow, set when `x < y`.
pub fn integer_sub_borrow<C: AbstractChannel, M: Mode>(
    session: &mut Session<C, M>,
    x: &[Share],
    y: &[Share],
) -> Result<(Vec<Share>, Share), ProtocolError> {
    assert_eq!(x.len(), y.len());
    let mut out = Vec::with_capacity(x.len());
    let mut b = Share::ZERO;
    for (&xi, &yi) in x.iter().zip(y) {
        out.push(xi ^ yi ^ b);
        b ^= and(session, xi ^ yi, yi ^ b)?;
    }
    Ok((out, b))
}

/// `x - y mod 2^n`.
pub fn integer_sub<C: AbstractChannel, M: Mode>(
    session: &mut Session<C, M>,
    x: &[Share],
    y: &[Share],
) -> Result<Vec<Share>, ProtocolError> {
    assert_eq!(x.len(), y.len());
    let n = x.len();
    let mut out = Vec::with_capacity(n);
    let mut b = Share::ZERO;
    for i in 0..n {
        out.push(x[i] ^ y[i] ^ b);
        if i + 1 < n {
            b ^= and(session, x[i] ^ y[i], y[i] ^ b)?;
        }
    }
    Ok(out)
}

/// `x · y mod 2^n`. All partial products come from a single outer product.
pub fn integer_multiply<C: AbstractChannel, M: Mode>(
    session: &mut Session<C, M>,
    x: &[Share],
    y: &[Share],
) -> Result<Vec<Share>, ProtocolError> {
    assert_eq!(x.len(), y.len());
    let n = x.len();
    let p = outer_product(session, x, y)?;
    let mut acc = p.row(0);
    for i in 1..n {
        let partial: Vec<Share> = (0..n - i).map(|j| p[(i, j)]).collect();
        let sum = integer_add(session, &acc[i..], &partial)?;
        acc[i..].copy_from_slice(&sum);
    }
    Ok(acc)
}

/// `s ? a : b`, bitwise.
pub fn select<C: AbstractChannel, M: Mode>(
    session: &mut Session<C, M>,
    s: Share,
    a: &[Share],
    b: &[Share],
) -> Result<Vec<Share>, ProtocolError> {
    assert_eq!(a.len(), b.len());
    let d = outer_product(session, &[s], &xor_all(a, b))?;
    Ok(xor_all(b, &d.row(0)))
}

/// `(b, a)` if `s` is set, else `(a, b)`.
pub fn swap<C: AbstractChannel, M: Mode>(
    session: &mut Session<C, M>,
    s: Share,
    a: &[Share],
    b: &[Share],
) -> Result<(Vec<Share>, Vec<Share>), ProtocolError> {
    assert_eq!(a.len(), b.len());
    let d = outer_product(session, &[s], &xor_all(a, b))?.row(0);
    Ok((xor_all(a, &d), xor_all(b, &d)))
}

/// `x - c` if `x ≥ c`, else `x`.
pub fn sub_if_greater<C: AbstractChannel, M: Mode>(
    session: &mut Session<C, M>,
    x: &[Share],
    c: u64,
) -> Result<Vec<Share>, ProtocolError> {
    let c = integer_constant(session, c, x.len());
    let (d, borrow) = integer_sub_borrow(session, x, &c)?;
    select(session, borrow, x, &d)
}

/// `x mod P` for a 32-bit `x`. The two high bytes are reduced by public
/// table lookups.
pub fn mod_p<C: AbstractChannel, M: Mode>(
    session: &mut Session<C, M>,
    x: &[Share],
) -> Result<Vec<Share>, ProtocolError> {
    assert_eq!(x.len(), 32);
    let pad = |mut v: Vec<Share>| {
        v.resize(32, Share::ZERO);
        v
    };
    let lo = pad(x[..16].to_vec());
    let t16 = pad(table_lookup(session, &ModpTable::new(16, P), &x[16..24])?.column(0));
    let t24 = pad(table_lookup(session, &ModpTable::new(24, P), &x[24..32])?.column(0));
    let sum = integer_add(session, &lo, &t16)?;
    let sum = integer_add(session, &sum, &t24)?;
    let sum = sub_if_greater(session, &sum, 2 * P)?;
    sub_if_greater(session, &sum, P)
}

/// `x mod P` by repeated conditional subtraction of `P · 2^k`.
pub fn naive_mod_p<C: AbstractChannel, M: Mode>(
    session: &mut Session<C, M>,
    x: &[Share],
) -> Result<Vec<Share>, ProtocolError> {
    assert_eq!(x.len(), 32);
    let mut x = x.to_vec();
    for k in (0..=16).rev() {
        x = sub_if_greater(session, &x, P << k)?;
    }
    Ok(x)
}

/// `base^y mod 2^32` for a secret 32-bit exponent `y`.
pub fn exponent<C: AbstractChannel, M: Mode>(
    session: &mut Session<C, M>,
    base: u32,
    y: &[Share],
) -> Result<Vec<Share>, ProtocolError> {
    assert_eq!(y.len(), 32);
    let mut acc: Option<Vec<Share>> = None;
    for (c, chunk) in y.chunks(8).enumerate() {
        let power = table_lookup(session, &ExpTable::new(base, 8 * c as u32), chunk)?.column(0);
        acc = Some(match acc {
            None => power,
            Some(acc) => integer_multiply(session, &acc, &power)?,
        });
    }
    log::debug!("{}: exponent with base {}", M::NAME, base);
    Ok(acc.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{test_utils::run_2pc, util::u64_from_bits};
    use rand::{Rng, SeedableRng};
    use scuttlebutt::{AesRng, Block};

    fn decode<C: AbstractChannel, M: Mode>(session: &mut Session<C, M>, x: &[Share]) -> Option<u64> {
        session.outputs(x).unwrap().map(|bits| u64_from_bits(&bits))
    }

    fn input<C: AbstractChannel, M: Mode>(session: &mut Session<C, M>, v: u64, n: usize) -> Vec<Share> {
        session.ginput_many(&u64_to_bits(v, n)).unwrap()
    }

    fn arithmetic<C: AbstractChannel, M: Mode>(
        session: &mut Session<C, M>,
        a: u64,
        b: u64,
    ) -> Option<Vec<u64>> {
        let x = input(session, a, 16);
        let y = input(session, b, 16);
        let s = input(session, 1, 1)[0];
        let results = [
            integer_add(session, &x, &y).unwrap(),
            integer_sub(session, &x, &y).unwrap(),
            integer_sub_borrow(session, &x, &y).unwrap().0,
            vec![integer_sub_borrow(session, &x, &y).unwrap().1],
            integer_multiply(session, &x, &y).unwrap(),
            select(session, s, &x, &y).unwrap(),
            swap(session, s, &x, &y).unwrap().0,
            sub_if_greater(session, &x, b).unwrap(),
        ];
        let decoded: Vec<Option<u64>> = results.iter().map(|r| decode(session, r)).collect();
        decoded.into_iter().collect()
    }

    #[test]
    fn test_arithmetic() {
        for (a, b) in [(1234u64, 567u64), (567, 1234), (0xffff, 1), (0, 0), (0xbeef, 0xbeef)] {
            let (_, e) = run_2pc(move |s| arithmetic(s, a, b), move |s| arithmetic(s, a, b));
            let e = e.unwrap();
            let mask = 0xffff;
            assert_eq!(e[0], (a + b) & mask);
            assert_eq!(e[1], a.wrapping_sub(b) & mask);
            assert_eq!(e[2], a.wrapping_sub(b) & mask);
            assert_eq!(e[3], (a < b) as u64);
            assert_eq!(e[4], (a * b) & mask);
            assert_eq!(e[5], a);
            assert_eq!(e[6], b);
            assert_eq!(e[7], if a >= b { a - b } else { a });
        }
    }

    fn words<C: AbstractChannel, M: Mode>(
        session: &mut Session<C, M>,
        a: u64,
        b: u64,
    ) -> Option<(u64, u64, u64)> {
        let x = input(session, a, 32);
        let y = input(session, b, 32);
        let sum = integer_add(session, &x, &y).unwrap();
        let product = integer_multiply(session, &x, &y).unwrap();
        let reduced = mod_p(session, &x).unwrap();
        let sum = decode(session, &sum);
        let product = decode(session, &product);
        let reduced = decode(session, &reduced);
        Some((sum?, product?, reduced?))
    }

    #[test]
    fn test_random_words() {
        let mut rng = AesRng::from_seed(Block(5));
        for _ in 0..4 {
            let (a, b) = (rng.gen::<u32>(), rng.gen::<u32>());
            let (_, e) = run_2pc(
                move |s| words(s, a as u64, b as u64),
                move |s| words(s, a as u64, b as u64),
            );
            assert_eq!(
                e,
                Some((
                    a.wrapping_add(b) as u64,
                    a.wrapping_mul(b) as u64,
                    a as u64 % P
                ))
            );
        }
    }

    fn reductions<C: AbstractChannel, M: Mode>(
        session: &mut Session<C, M>,
        v: u64,
    ) -> Option<(u64, u64)> {
        let x = input(session, v, 32);
        let fast = mod_p(session, &x).unwrap();
        let naive = naive_mod_p(session, &x).unwrap();
        let fast = decode(session, &fast);
        let naive = decode(session, &naive);
        fast.zip(naive)
    }

    #[test]
    fn test_mod_p() {
        for v in [0u64, P - 1, P, 0xffff, 0x1_0000, 0xdead_beef, 0xffff_ffff, 3 * P + 5] {
            let (_, e) = run_2pc(move |s| reductions(s, v), move |s| reductions(s, v));
            assert_eq!(e, Some((v % P, v % P)), "v = {:#x}", v);
        }
    }

    fn power<C: AbstractChannel, M: Mode>(session: &mut Session<C, M>, base: u32, y: u64) -> Option<u64> {
        let y = input(session, y, 32);
        let z = exponent(session, base, &y).unwrap();
        decode(session, &z)
    }

    #[test]
    fn test_exponent() {
        for (base, y) in [(3u32, 0u32), (3, 1), (7, 0x1234_5678), (0xfffffffb, 0xdead_beef), (2, 31)] {
            let (_, e) = run_2pc(
                move |s| power(s, base, y as u64),
                move |s| power(s, base, y as u64),
            );
            assert_eq!(e, Some(base.wrapping_pow(y) as u64));
        }
    }
}
