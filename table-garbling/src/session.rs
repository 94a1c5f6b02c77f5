// -*- mode: rust; -*-
//
// This file is part of `table-garbling`.
// Copyright © 2023 Galois, Inc.
// See LICENSE for licensing information.

//! Per-party protocol state.
//!
//! Every protocol routine in this crate takes a `&mut Session<C, M>` and is
//! written once for both parties; the role marker `M` selects the
//! generator or evaluator branch at compile time.

use crate::{
    config::{SessionConfig, MAX_PACK_WIDTH},
    errors::ProtocolError,
    matrix::Matrix,
    share::Share,
    share_matrix::ShareMatrix,
    truth_table::TruthTable,
    util::output_tweak,
};
use rand::{Rng, SeedableRng};
use scuttlebutt::{AbstractChannel, AesHash, AesRng, Block, SemiHonest};
use std::marker::PhantomData;
use subtle::{Choice, ConditionallySelectable};

/// A protocol role.
pub trait Mode: Send + Sync + 'static {
    /// Whether this role holds `Δ` and produces the tables.
    const GENERATOR: bool;
    /// Name used in log messages.
    const NAME: &'static str;
}

/// The party that knows `Δ`. It sends every table and only ever reads
/// when an output is revealed to it.
#[derive(Debug)]
pub enum Generator {}

/// The party that evaluates with the labels it receives.
#[derive(Debug)]
pub enum Evaluator {}

impl Mode for Generator {
    const GENERATOR: bool = true;
    const NAME: &'static str = "generator";
}

impl Mode for Evaluator {
    const GENERATOR: bool = false;
    const NAME: &'static str = "evaluator";
}

/// Hash a label under `tweak`. Both parties derive every pseudorandom
/// value from this function.
#[inline]
pub(crate) fn hash_share(hash: &AesHash, s: Share, tweak: Block) -> Share {
    Share::new(hash.tccr_hash(tweak, s.as_block()))
}

/// The protocol context of one party.
pub struct Session<C, M> {
    channel: C,
    hash: AesHash,
    rng: AesRng,
    nonce: u64,
    delta: Share,
    // `deltas[c] = Δ·c` in GF(256).
    deltas: Vec<Share>,
    config: SessionConfig,
    current_output: usize,
    mode: PhantomData<M>,
}

impl<C: AbstractChannel, M: Mode> Session<C, M> {
    /// Create a session with the default configuration.
    ///
    /// Both parties must use the same `fixed_key`. The generator draws `Δ`
    /// from its PRG seeded with `seed`.
    pub fn new(channel: C, fixed_key: Block, seed: Block) -> Self {
        Self::build(channel, fixed_key, seed, SessionConfig::default())
    }

    /// Create a session with a custom configuration, which must be equal on
    /// both sides.
    pub fn with_config(
        channel: C,
        fixed_key: Block,
        seed: Block,
        config: SessionConfig,
    ) -> Result<Self, ProtocolError> {
        config.validate()?;
        Ok(Self::build(channel, fixed_key, seed, config))
    }

    fn build(channel: C, fixed_key: Block, seed: Block, config: SessionConfig) -> Self {
        let mut rng = AesRng::from_seed(seed);
        let delta = if M::GENERATOR {
            Share::new(rng.gen::<Block>().set_lsb())
        } else {
            Share::ZERO
        };
        let deltas = (0..=255u8).map(|c| delta.scale(c)).collect();
        log::debug!("{} session started with {:?}", M::NAME, config);
        Session {
            channel,
            hash: AesHash::new(fixed_key),
            rng,
            nonce: 0,
            delta,
            deltas,
            config,
            current_output: 0,
            mode: PhantomData,
        }
    }

    /// Whether this session plays the generator.
    #[inline]
    pub fn is_generator(&self) -> bool {
        M::GENERATOR
    }

    /// The session configuration.
    #[inline]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The underlying channel.
    pub fn channel(&self) -> &C {
        &self.channel
    }

    /// The underlying channel, mutably.
    pub fn channel_mut(&mut self) -> &mut C {
        &mut self.channel
    }

    /// Tear down the session, returning its channel.
    pub fn into_channel(self) -> C {
        self.channel
    }

    /// `Δ` for the generator, zero for the evaluator.
    #[inline]
    pub fn delta(&self) -> Share {
        self.delta
    }

    /// `Δ·c` for the generator, zero for the evaluator.
    #[inline]
    pub fn delta_multiple(&self, c: u8) -> Share {
        self.deltas[c as usize]
    }

    /// The next unused nonce.
    #[inline]
    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    /// Return the current nonce and advance it.
    #[inline]
    pub fn next_nonce(&mut self) -> u64 {
        let current = self.nonce;
        self.nonce += 1;
        current
    }

    /// Reserve `k` consecutive nonces, returning the first.
    #[inline]
    pub fn reserve_nonces(&mut self, k: u64) -> u64 {
        let base = self.nonce;
        self.nonce += k;
        base
    }

    #[inline]
    pub(crate) fn hasher(&self) -> &AesHash {
        &self.hash
    }

    pub(crate) fn rng(&mut self) -> &mut AesRng {
        &mut self.rng
    }

    /// Hash a label under `tweak`.
    #[inline]
    pub fn hash(&self, s: Share, tweak: Block) -> Share {
        hash_share(&self.hash, s, tweak)
    }

    fn current_output(&mut self) -> usize {
        let current = self.current_output;
        self.current_output += 1;
        current
    }

    ////////////////////////////////////////////////////////////////////////////
    // labels

    /// A public bit: `b·Δ` for the generator, zero for the evaluator.
    #[inline]
    pub fn constant(&self, b: bool) -> Share {
        Share::conditional_select(&Share::ZERO, &self.delta, Choice::from(b as u8))
    }

    /// Alias of [`Session::constant`].
    #[inline]
    pub fn bit(&self, b: bool) -> Share {
        self.constant(b)
    }

    /// Public bits as labels.
    pub fn constants(&self, bits: &[bool]) -> Vec<Share> {
        bits.iter().map(|&b| self.constant(b)).collect()
    }

    /// A public byte as a packed label.
    #[inline]
    pub fn constant_packed(&self, v: u8) -> Share {
        self.deltas[v as usize]
    }

    /// Logical negation.
    #[inline]
    pub fn negate(&self, s: Share) -> Share {
        s ^ self.delta
    }

    /// A random bit known to the generator only. No communication.
    pub fn uniform(&mut self) -> Share {
        if M::GENERATOR {
            let b = self.rng.gen::<bool>();
            self.constant(b)
        } else {
            Share::ZERO
        }
    }

    /// Alias of [`Session::uniform`].
    pub fn random(&mut self) -> Share {
        self.uniform()
    }

    /// The generator's label of color `c` for the same secret as `s`. The
    /// evaluator only has one label and gets `s` back.
    #[inline]
    pub(crate) fn color_label(&self, s: Share, c: bool) -> Share {
        let flip = Choice::from((s.color() ^ c) as u8);
        Share::conditional_select(&s, &(s ^ self.delta), flip)
    }

    /// A generator input. The generator sends its encoding of `b`; the
    /// evaluator ignores `b` and takes the received label.
    pub fn ginput(&mut self, b: bool) -> Result<Share, ProtocolError> {
        Ok(self.ginput_many(&[b])?[0])
    }

    /// Generator inputs for a slice of bits.
    pub fn ginput_many(&mut self, bits: &[bool]) -> Result<Vec<Share>, ProtocolError> {
        if M::GENERATOR {
            let mut out = Vec::with_capacity(bits.len());
            for &b in bits.iter() {
                let l = Share::new(self.rng.gen::<Block>());
                self.send_share(l ^ self.constant(b))?;
                out.push(l);
            }
            self.flush()?;
            Ok(out)
        } else {
            self.recv_shares(bits.len())
        }
    }

    ////////////////////////////////////////////////////////////////////////////
    // communication

    /// Send a label over the channel.
    #[inline]
    pub fn send_share(&mut self, s: Share) -> Result<(), ProtocolError> {
        self.channel.write_block(&s.as_block())?;
        Ok(())
    }

    /// Send a slice of labels over the channel.
    pub fn send_shares(&mut self, s: &[Share]) -> Result<(), ProtocolError> {
        let blocks: Vec<Block> = s.iter().map(|s| s.as_block()).collect();
        self.channel.write_blocks(&blocks)?;
        Ok(())
    }

    /// Receive a label from the channel.
    #[inline]
    pub fn recv_share(&mut self) -> Result<Share, ProtocolError> {
        Ok(Share::new(self.channel.read_block()?))
    }

    /// Receive `n` labels from the channel.
    pub fn recv_shares(&mut self, n: usize) -> Result<Vec<Share>, ProtocolError> {
        let blocks = self.channel.read_blocks(n)?;
        Ok(blocks.into_iter().map(Share::new).collect())
    }

    /// Send a truth table over the channel.
    pub fn send_table(&mut self, table: &TruthTable) -> Result<(), ProtocolError> {
        table.send(&mut self.channel)?;
        Ok(())
    }

    /// Receive an `n`-input, `m`-output truth table from the channel.
    pub fn recv_table(&mut self, n: usize, m: usize) -> Result<TruthTable, ProtocolError> {
        Ok(TruthTable::recv(&mut self.channel, n, m)?)
    }

    /// Flush the channel.
    #[inline]
    pub fn flush(&mut self) -> Result<(), ProtocolError> {
        self.channel.flush()?;
        Ok(())
    }

    ////////////////////////////////////////////////////////////////////////////
    // outputs

    /// Decode a bit for the evaluator. The generator returns `None`.
    pub fn output(&mut self, s: Share) -> Result<Option<bool>, ProtocolError> {
        Ok(self.output_packed(s, 1)?.map(|v| v == 1))
    }

    /// Decode several bits for the evaluator. The generator returns `None`.
    pub fn outputs(&mut self, s: &[Share]) -> Result<Option<Vec<bool>>, ProtocolError> {
        let mut out = Vec::with_capacity(s.len());
        for &s in s.iter() {
            out.push(self.output(s)?);
        }
        Ok(out.into_iter().collect())
    }

    /// Decode a label packing `width` bits for the evaluator. The generator
    /// returns `None`.
    pub fn output_packed(&mut self, s: Share, width: usize) -> Result<Option<u8>, ProtocolError> {
        if width > MAX_PACK_WIDTH {
            return Err(ProtocolError::PackTooWide {
                got: width,
                max: MAX_PACK_WIDTH,
            });
        }
        if M::GENERATOR {
            self.publish(s, width)?;
            Ok(None)
        } else {
            self.decode(s, width).map(Some)
        }
    }

    /// Send the hashes of every candidate label of `s`.
    fn publish(&mut self, s: Share, width: usize) -> Result<(), ProtocolError> {
        let i = self.current_output();
        let hashes: Vec<Block> = (0..1usize << width)
            .map(|v| {
                let label = s ^ self.deltas[v];
                self.hash.tccr_hash(output_tweak(i, v as u8), label.as_block())
            })
            .collect();
        self.channel.write_blocks(&hashes)?;
        self.channel.flush()?;
        Ok(())
    }

    /// Match our label against the candidates the generator published.
    fn decode(&mut self, s: Share, width: usize) -> Result<u8, ProtocolError> {
        let i = self.current_output();
        let hashes = self.channel.read_blocks(1 << width)?;
        for (v, h) in hashes.iter().enumerate() {
            if self.hash.tccr_hash(output_tweak(i, v as u8), s.as_block()) == *h {
                return Ok(v as u8);
            }
        }
        log::error!("{}: output {} does not decode (label {})", M::NAME, i, s);
        Err(ProtocolError::DecodingFailed {
            index: i,
            label: s.as_block(),
        })
    }

    /// Reveal a bit to both parties.
    pub fn reveal(&mut self, s: Share) -> Result<bool, ProtocolError> {
        if M::GENERATOR {
            // The evaluator needs our cooperation in order to see the output.
            self.publish(s, 1)?;
            Ok(self.channel.read_bool()?)
        } else {
            let b = self.decode(s, 1)? == 1;
            self.channel.write_bool(b)?;
            self.channel.flush()?;
            Ok(b)
        }
    }

    /// Reveal several bits to both parties.
    pub fn reveal_many(&mut self, s: &[Share]) -> Result<Vec<bool>, ProtocolError> {
        s.iter().map(|&s| self.reveal(s)).collect()
    }

    /// Send the generator's colors of `x` to the evaluator. Both parties
    /// return them. Since the evaluator knows its own colors, it learns
    /// the plaintext of `x`.
    pub fn reveal_colors(&mut self, x: &ShareMatrix) -> Result<Matrix, ProtocolError> {
        if M::GENERATOR {
            let colors = x.colors();
            self.channel.write_bytes(&colors.to_bytes())?;
            self.channel.flush()?;
            Ok(colors)
        } else {
            let nbytes = (x.rows() * x.cols() + 7) / 8;
            let bytes = self.channel.read_vec(nbytes)?;
            Ok(Matrix::from_bytes(x.rows(), x.cols(), &bytes))
        }
    }
}

impl<C: AbstractChannel, M: Mode> SemiHonest for Session<C, M> {}

impl<C, M: Mode> std::fmt::Debug for Session<C, M> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("mode", &M::NAME)
            .field("nonce", &self.nonce)
            .field("config", &self.config)
            .finish()
    }
}
