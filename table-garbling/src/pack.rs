//! Packing several bits into one label.
//!
//! Bit `j` is scaled by `2^j` in GF(256), so a packed label of width `k`
//! encodes the byte `v = Σ_j b_j 2^j` as `E = G ⊕ Δ·v`. Packing is free;
//! unpacking costs one garbled row per possible value of `v`.

use crate::{
    config::MAX_PACK_WIDTH,
    errors::ProtocolError,
    session::{Mode, Session},
    share::Share,
    util::tweak,
};
use rand::Rng;
use scuttlebutt::{AbstractChannel, Block};

/// Pack up to eight bits, least significant first.
pub fn pack(bits: &[Share]) -> Share {
    assert!(bits.len() <= MAX_PACK_WIDTH, "too many bits to pack");
    bits.iter()
        .enumerate()
        .fold(Share::ZERO, |acc, (j, b)| acc ^ b.scale(1 << j))
}

/// Pack a slice of bits in chunks of `width`.
pub fn pack_all(bits: &[Share], width: usize) -> Vec<Share> {
    bits.chunks(width).map(pack).collect()
}

fn check_width(width: usize) -> Result<(), ProtocolError> {
    if width > MAX_PACK_WIDTH {
        return Err(ProtocolError::PackTooWide {
            got: width,
            max: MAX_PACK_WIDTH,
        });
    }
    Ok(())
}

/// Split a packed label of `width` bits back into bit labels.
///
/// The generator sends a table of `2^width` rows, each holding a tag and
/// the encrypted bit labels for one value of the packed byte. Row `v` is
/// stored at position `v ⊕ ρ` for a random `ρ`, so the position the
/// evaluator opens is independent of `v`. The tag and the `width` pads
/// each take their own nonce.
pub fn unpack<C: AbstractChannel, M: Mode>(
    session: &mut Session<C, M>,
    packed: Share,
    width: usize,
) -> Result<Vec<Share>, ProtocolError> {
    check_width(width)?;
    match width {
        0 => return Ok(Vec::new()),
        1 => return Ok(vec![packed]),
        _ => {}
    }
    let base = session.reserve_nonces(width as u64 + 1);
    let rows = 1usize << width;
    let stride = width + 1;

    if M::GENERATOR {
        let labels: Vec<Share> = (0..width)
            .map(|_| Share::new(session.rng().gen::<Block>()))
            .collect();
        let offset = session.rng().gen_range(0..rows);
        let mut table = vec![Block::ZERO; rows * stride];
        for v in 0..rows {
            let key = packed ^ session.delta_multiple(v as u8);
            let pos = v ^ offset;
            let row = &mut table[pos * stride..(pos + 1) * stride];
            row[0] = session.hash(key, tweak(base)).as_block();
            for (j, label) in labels.iter().enumerate() {
                let bit = (v >> j) & 1 == 1;
                let pad = session.hash(key, tweak(base + j as u64 + 1));
                row[j + 1] = (*label ^ session.constant(bit) ^ pad).as_block();
            }
        }
        session.channel_mut().write_blocks(&table)?;
        session.flush()?;
        Ok(labels)
    } else {
        let table = session.channel_mut().read_blocks(rows * stride)?;
        let tag = session.hash(packed, tweak(base)).as_block();
        let row = table
            .chunks_exact(stride)
            .find(|row| row[0] == tag)
            .ok_or_else(|| {
                log::error!("{}: no row matches packed label {}", M::NAME, packed);
                ProtocolError::DecodingFailed {
                    index: base as usize,
                    label: packed.as_block(),
                }
            })?;
        Ok((0..width)
            .map(|j| Share::new(row[j + 1]) ^ session.hash(packed, tweak(base + j as u64 + 1)))
            .collect())
    }
}

/// Unpack `count` bits stored in labels of `width` bits each.
pub fn unpack_all<C: AbstractChannel, M: Mode>(
    session: &mut Session<C, M>,
    packed: &[Share],
    width: usize,
    count: usize,
) -> Result<Vec<Share>, ProtocolError> {
    check_width(width)?;
    assert_eq!(packed.len(), crate::util::pack_count(count, width));
    let mut out = Vec::with_capacity(count);
    for (p, &s) in packed.iter().enumerate() {
        let w = width.min(count - p * width);
        out.extend(unpack(session, s, w)?);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{test_utils::run_2pc, util::u64_to_bits};

    fn roundtrip<C: AbstractChannel, M: Mode>(
        session: &mut Session<C, M>,
        x: u64,
        n: usize,
        width: usize,
    ) -> (Option<Vec<u8>>, Option<Vec<bool>>) {
        let bits = session.ginput_many(&u64_to_bits(x, n)).unwrap();
        let packed = pack_all(&bits, width);
        let mut bytes = Vec::new();
        for (p, &s) in packed.iter().enumerate() {
            let w = width.min(n - p * width);
            bytes.push(session.output_packed(s, w).unwrap());
        }
        let unpacked = unpack_all(session, &packed, width, n).unwrap();
        let bytes: Option<Vec<u8>> = bytes.into_iter().collect();
        (bytes, session.outputs(&unpacked).unwrap())
    }

    fn check_roundtrip(x: u64, n: usize, width: usize) {
        let (_, (bytes, bits)) = run_2pc(
            move |s| roundtrip(s, x, n, width),
            move |s| roundtrip(s, x, n, width),
        );
        let expected: Vec<u8> = (0..crate::util::pack_count(n, width))
            .map(|p| ((x >> (p * width)) & ((1 << width) - 1)) as u8)
            .collect();
        assert_eq!(bytes.unwrap(), expected, "x = {:#x}, width = {}", x, width);
        assert_eq!(bits.unwrap(), u64_to_bits(x, n), "x = {:#x}, width = {}", x, width);
    }

    #[test]
    fn test_pack_unpack() {
        for width in 1..=MAX_PACK_WIDTH {
            for x in 0..1u64 << width {
                check_roundtrip(x, width, width);
            }
        }
    }

    #[test]
    fn test_pack_unpack_many() {
        for (x, n, width) in [(0x1_2345, 17, 8), (0b1011, 4, 3), (0b10, 2, 1), (0x3ff, 10, 4)] {
            check_roundtrip(x, n, width);
        }
    }

    #[test]
    fn test_unpack_nonces() {
        let (g, e) = run_2pc(
            |s| {
                let x = s.ginput_many(&[true, false, true]).unwrap();
                let start = s.nonce();
                unpack(s, pack(&x), 3).unwrap();
                (start, s.nonce())
            },
            |s| {
                let x = s.ginput_many(&[true, false, true]).unwrap();
                let start = s.nonce();
                unpack(s, pack(&x), 3).unwrap();
                (start, s.nonce())
            },
        );
        assert_eq!(g, e);
        assert_eq!(g.1 - g.0, 4);
    }

    #[test]
    fn test_unpack_rejects_wide_labels() {
        let (a, _b) = scuttlebutt::unix_channel_pair();
        let mut session = Session::<_, crate::Generator>::new(
            a,
            crate::test_utils::FIXED_KEY,
            crate::test_utils::SEED,
        );
        assert!(matches!(
            unpack(&mut session, Share::ZERO, 9),
            Err(ProtocolError::PackTooWide { got: 9, max: 8 })
        ));
    }

    #[test]
    fn test_unpack_detects_tampering() {
        let (_, e) = run_2pc(
            |s| {
                let x = s.ginput_many(&[true, false, true]).unwrap();
                unpack(s, pack(&x), 3).is_ok()
            },
            |s| {
                let x = s.ginput_many(&[false; 3]).unwrap();
                let bogus = pack(&x) ^ Share::new(Block(1 << 40));
                matches!(
                    unpack(s, bogus, 3),
                    Err(ProtocolError::DecodingFailed { .. })
                )
            },
        );
        assert!(e);
    }
}
