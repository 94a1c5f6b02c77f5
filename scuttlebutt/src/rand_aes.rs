//! Fixed-key AES random number generator.

use crate::{Aes128, Block};
use rand::{CryptoRng, Error, RngCore, SeedableRng};
use rand_core::block::{BlockRng64, BlockRngCore};

/// Number of blocks encrypted per refill of the output buffer.
const BLOCK_COUNT: usize = 8;

/// Implementation of a random number generator based on fixed-key AES.
///
/// This uses AES in a counter-mode-esque way, but with the counter always
/// starting at zero. The output stream is a deterministic function of the
/// seed, so two parties seeded identically see identical streams.
#[derive(Clone, Debug)]
pub struct AesRng(BlockRng64<AesRngCore>);

impl RngCore for AesRng {
    #[inline]
    fn next_u32(&mut self) -> u32 {
        self.0.next_u32()
    }
    #[inline]
    fn next_u64(&mut self) -> u64 {
        self.0.next_u64()
    }
    #[inline]
    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.0.fill_bytes(dest)
    }
    #[inline]
    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), Error> {
        self.0.try_fill_bytes(dest)
    }
}

impl SeedableRng for AesRng {
    type Seed = <AesRngCore as SeedableRng>::Seed;

    #[inline]
    fn from_seed(seed: Self::Seed) -> Self {
        AesRng(BlockRng64::<AesRngCore>::from_seed(seed))
    }
    #[inline]
    fn from_rng<R: RngCore>(rng: R) -> Result<Self, Error> {
        BlockRng64::<AesRngCore>::from_rng(rng).map(AesRng)
    }
}

impl CryptoRng for AesRng {}

impl AesRng {
    /// Create a new random number generator using a random seed from
    /// `rand::random`.
    #[inline]
    pub fn new() -> Self {
        let seed = rand::random::<Block>();
        AesRng::from_seed(seed)
    }
}

impl Default for AesRng {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

/// The core of `AesRng`, used with `BlockRng`.
#[derive(Clone, Debug)]
pub struct AesRngCore {
    aes: Aes128,
    // Overflowing a u64 would take well over 2^64 nanoseconds, which is over 500 years!
    counter: u64,
}

impl BlockRngCore for AesRngCore {
    type Item = u64;
    type Results = [u64; BLOCK_COUNT * 2];

    // Compute `E(state)` eight times, where `state` is a counter.
    #[inline]
    fn generate(&mut self, results: &mut Self::Results) {
        let blocks = std::array::from_fn::<Block, BLOCK_COUNT, _>(|_| {
            let x = self.counter;
            self.counter += 1;
            Block::from(x as u128)
        });
        let blocks = self.aes.encrypt_blocks(blocks);
        for (chunk, block) in results.chunks_exact_mut(2).zip(blocks.iter()) {
            chunk.copy_from_slice(&<[u64; 2]>::from(*block));
        }
    }
}

impl SeedableRng for AesRngCore {
    type Seed = Block;

    #[inline]
    fn from_seed(seed: Self::Seed) -> Self {
        AesRngCore {
            aes: Aes128::new(seed),
            counter: 0,
        }
    }
}

impl CryptoRng for AesRngCore {}

impl From<AesRngCore> for AesRng {
    #[inline]
    fn from(core: AesRngCore) -> Self {
        AesRng(BlockRng64::new(core))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_generate() {
        let mut rng = AesRng::new();
        let a = rng.gen::<[Block; 8]>();
        let b = rng.gen::<[Block; 8]>();
        assert_ne!(a, b);
    }

    #[test]
    fn test_deterministic() {
        let seed = rand::random::<Block>();
        let mut r1 = AesRng::from_seed(seed);
        let mut r2 = AesRng::from_seed(seed);
        let a = r1.gen::<[Block; 20]>();
        let b = r2.gen::<[Block; 20]>();
        assert_eq!(a, b);
    }
}
