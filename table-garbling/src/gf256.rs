//! Arithmetic in GF(2^8) = GF(2)\[x\] / (x^8 + x^4 + x^3 + x + 1).
//!
//! Bit `k` of a byte is the coefficient of `x^k`. Multiplication goes through
//! log/antilog tables over the generator `0x03`.

use scuttlebutt::Block;

/// The reduction polynomial.
pub const POLYNOMIAL: u16 = 0x11B;

const GENERATOR: u8 = 0x03;

/// `EXP_TABLE[i] = 3^i`, repeated once so that sums of two logarithms can
/// index it without a reduction mod 255.
pub const EXP_TABLE: [u8; 512] = build_exp_table();
/// `LOG_TABLE[a]` is the discrete logarithm of `a` to base 3. Entry 0 is
/// unused.
pub const LOG_TABLE: [u8; 256] = build_log_table();
/// `INVERSE_TABLE[a] = a^-1`, with `INVERSE_TABLE[0] = 0`.
pub const INVERSE_TABLE: [u8; 256] = build_inverse_table();

const fn mul_slow(a: u8, b: u8) -> u8 {
    let mut a = a as u16;
    let mut b = b;
    let mut acc = 0u16;
    while b != 0 {
        if b & 1 == 1 {
            acc ^= a;
        }
        a <<= 1;
        if a & 0x100 != 0 {
            a ^= POLYNOMIAL;
        }
        b >>= 1;
    }
    acc as u8
}

const fn build_exp_table() -> [u8; 512] {
    let mut table = [0u8; 512];
    let mut x = 1u8;
    let mut i = 0;
    while i < 255 {
        table[i] = x;
        table[i + 255] = x;
        x = mul_slow(x, GENERATOR);
        i += 1;
    }
    table[510] = table[0];
    table[511] = table[1];
    table
}

const fn build_log_table() -> [u8; 256] {
    let exp = build_exp_table();
    let mut table = [0u8; 256];
    let mut i = 0;
    while i < 255 {
        table[exp[i] as usize] = i as u8;
        i += 1;
    }
    table
}

const fn build_inverse_table() -> [u8; 256] {
    let exp = build_exp_table();
    let log = build_log_table();
    let mut table = [0u8; 256];
    let mut a = 1;
    while a < 256 {
        table[a] = exp[(255 - log[a] as usize) % 255];
        a += 1;
    }
    table
}

/// Multiply two field elements.
#[inline]
pub fn mul(a: u8, b: u8) -> u8 {
    if a == 0 || b == 0 {
        return 0;
    }
    EXP_TABLE[LOG_TABLE[a as usize] as usize + LOG_TABLE[b as usize] as usize]
}

/// Invert a field element. Zero maps to zero.
#[inline]
pub fn invert(a: u8) -> u8 {
    INVERSE_TABLE[a as usize]
}

/// Multiply every byte of `b` by `c`.
#[inline]
pub fn scale_block(b: Block, c: u8) -> Block {
    match c {
        0 => Block::ZERO,
        1 => b,
        _ => {
            let lc = LOG_TABLE[c as usize] as usize;
            b.map_bytes(|x| {
                if x == 0 {
                    0
                } else {
                    EXP_TABLE[LOG_TABLE[x as usize] as usize + lc]
                }
            })
        }
    }
}
