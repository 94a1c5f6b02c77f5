// -*- mode: rust; -*-
//
// This file is part of `scuttlebutt`.
// Copyright © 2019 Galois, Inc.
// See LICENSE for licensing information.

use crate::Block;
use aes::cipher::{generic_array::GenericArray, BlockEncrypt, KeyInit};

/// AES-128, encryption only.
#[derive(Clone)]
pub struct Aes128 {
    cipher: aes::Aes128,
}

impl Aes128 {
    /// Create a new `Aes128` object, using `key` as the AES key.
    #[inline]
    pub fn new(key: Block) -> Self {
        let key: [u8; 16] = key.into();
        let cipher = aes::Aes128::new(GenericArray::from_slice(&key));
        Aes128 { cipher }
    }

    /// Encrypt a block, outputting the ciphertext.
    #[inline(always)]
    pub fn encrypt(&self, m: Block) -> Block {
        let mut block = GenericArray::from(<[u8; 16]>::from(m));
        self.cipher.encrypt_block(&mut block);
        let bytes: [u8; 16] = block.into();
        Block::from(bytes)
    }

    /// Encrypt `N` blocks at once, outputting the ciphertexts.
    #[inline]
    pub fn encrypt_blocks<const N: usize>(&self, blocks: [Block; N]) -> [Block; N] {
        let mut buf = blocks.map(|b| GenericArray::from(<[u8; 16]>::from(b)));
        self.cipher.encrypt_blocks(&mut buf);
        buf.map(|b| {
            let bytes: [u8; 16] = b.into();
            Block::from(bytes)
        })
    }
}

impl std::fmt::Debug for Aes128 {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str("Aes128 { .. }")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(s: &str) -> Block {
        let bytes: [u8; 16] = hex::decode(s).unwrap().try_into().unwrap();
        Block::from(bytes)
    }

    #[test]
    fn test_aes_128() {
        // FIPS-197, Appendix C.1.
        let cipher = Aes128::new(block("000102030405060708090a0b0c0d0e0f"));
        let pt = block("00112233445566778899aabbccddeeff");
        let ct = block("69c4e0d86a7b0430d8cdb78070b4c55a");
        assert_eq!(cipher.encrypt(pt), ct);
    }

    #[test]
    fn test_encrypt_blocks() {
        let cipher = Aes128::new(rand::random::<Block>());
        let xs = rand::random::<[Block; 8]>();
        let ys = cipher.encrypt_blocks(xs);
        for (x, y) in xs.iter().zip(ys.iter()) {
            assert_eq!(cipher.encrypt(*x), *y);
        }
    }
}
