//! Implementations of correlation-robust hash functions (and their variants)
//! based on fixed-key AES.

use crate::{Aes128, Block};

/// AES-based correlation-robust hash function.
///
/// This hash function supports the correlation-robust variants given in
/// <https://eprint.iacr.org/2019/074>.
#[derive(Clone, Debug)]
pub struct AesHash {
    aes: Aes128,
}

impl AesHash {
    /// Initialize the hash function using `key`.
    #[inline]
    pub fn new(key: Block) -> Self {
        let aes = Aes128::new(key);
        AesHash { aes }
    }

    /// Tweakable circular correlation robust hash function (cf.
    /// <https://eprint.iacr.org/2019/074>, §7.4).
    ///
    /// The function computes `π(π(x) ⊕ i) ⊕ π(x)`.
    #[inline]
    pub fn tccr_hash(&self, i: Block, x: Block) -> Block {
        let y = self.aes.encrypt(x);
        let t = y ^ i;
        let z = self.aes.encrypt(t);
        y ^ z
    }

    /// Batch tweakable circular correlation robust hash function, one tweak
    /// per input.
    pub fn tccr_hash_many<const Q: usize>(&self, is: [Block; Q], xs: [Block; Q]) -> [Block; Q] {
        let y = self.aes.encrypt_blocks(xs);
        let mut t = y;
        for (t, i) in t.iter_mut().zip(is.iter()) {
            *t ^= *i;
        }
        let z = self.aes.encrypt_blocks(t);
        let mut out = y;
        for (o, z) in out.iter_mut().zip(z.iter()) {
            *o ^= *z;
        }
        out
    }
}
