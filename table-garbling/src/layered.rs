//! Pseudorandom functions built from layers of private tables.

use crate::{
    config::SessionConfig,
    errors::ProtocolError,
    function::{private_function, private_function_bits},
    pack::unpack_all,
    session::{Mode, Session},
    share::Share,
    truth_table::TruthTable,
    util::{u64_from_bits, u64_to_bits},
};
use itertools::Itertools;
use rand::RngCore;
use scuttlebutt::AbstractChannel;

const SECOND_LAYER_INPUTS: usize = 8;
const SECOND_LAYER_OUTPUTS: usize = 4;

/// A function of `n` inputs and `m` outputs held privately by the
/// generator.
///
/// Up to `one_layer_bound` inputs this is a single table. Beyond that the
/// inputs are split in two halves, each half goes through a table with `m`
/// outputs, and the `2m` intermediate bits are interleaved and fed through
/// `m / 4` tables of 8 inputs and 4 outputs.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LayeredFunction {
    inputs: usize,
    outputs: usize,
    first: Vec<TruthTable>,
    second: Vec<TruthTable>,
}

impl LayeredFunction {
    /// Sample every table from `rng`.
    pub fn random<R: RngCore>(
        n: usize,
        m: usize,
        config: &SessionConfig,
        rng: &mut R,
    ) -> Result<Self, ProtocolError> {
        Self::build(n, m, config, |n, m| TruthTable::uniform_from_rng(n, m, rng))
    }

    /// All-zero tables of the right shapes, for the evaluator.
    pub fn shape(n: usize, m: usize, config: &SessionConfig) -> Result<Self, ProtocolError> {
        Self::build(n, m, config, TruthTable::new)
    }

    fn build(
        n: usize,
        m: usize,
        config: &SessionConfig,
        mut table: impl FnMut(usize, usize) -> TruthTable,
    ) -> Result<Self, ProtocolError> {
        let bound = config.one_layer_bound;
        if m > 64 {
            return Err(ProtocolError::InvalidArg(format!(
                "at most 64 outputs, got {}",
                m
            )));
        }
        if n <= bound {
            return Ok(LayeredFunction {
                inputs: n,
                outputs: m,
                first: vec![table(n, m)],
                second: Vec::new(),
            });
        }
        if n > 2 * bound {
            return Err(ProtocolError::InvalidArg(format!(
                "{} inputs exceeds two layers of {}",
                n, bound
            )));
        }
        if m % SECOND_LAYER_OUTPUTS != 0 {
            return Err(ProtocolError::InvalidArg(format!(
                "two-layer functions need a multiple of {} outputs, got {}",
                SECOND_LAYER_OUTPUTS, m
            )));
        }
        let h0 = n / 2;
        let first = vec![table(h0, m), table(n - h0, m)];
        let second = (0..m / SECOND_LAYER_OUTPUTS)
            .map(|_| table(SECOND_LAYER_INPUTS, SECOND_LAYER_OUTPUTS))
            .collect();
        Ok(LayeredFunction {
            inputs: n,
            outputs: m,
            first,
            second,
        })
    }

    /// Number of input bits.
    pub fn inputs(&self) -> usize {
        self.inputs
    }

    /// Number of output bits.
    pub fn outputs(&self) -> usize {
        self.outputs
    }

    /// Whether the inputs are split over two first-layer tables.
    pub fn is_two_layer(&self) -> bool {
        !self.second.is_empty()
    }

    /// Evaluate in the clear.
    pub fn eval_plain(&self, x: u64) -> u64 {
        if !self.is_two_layer() {
            return self.first[0].row(x as usize);
        }
        let h0 = self.first[0].inputs();
        let l0 = u64_to_bits(self.first[0].row((x & ((1 << h0) - 1)) as usize), self.outputs);
        let l1 = u64_to_bits(self.first[1].row((x >> h0) as usize), self.outputs);
        let mid: Vec<bool> = l0.into_iter().interleave(l1).collect();
        mid.chunks(SECOND_LAYER_INPUTS)
            .zip(&self.second)
            .enumerate()
            .fold(0, |acc, (b, (bits, t))| {
                acc | t.row(u64_from_bits(bits) as usize) << (b * SECOND_LAYER_OUTPUTS)
            })
    }

    /// Evaluate on secret inputs, returning one label per output bit.
    pub fn eval<C: AbstractChannel, M: Mode>(
        &self,
        session: &mut Session<C, M>,
        x: &[Share],
    ) -> Result<Vec<Share>, ProtocolError> {
        assert_eq!(x.len(), self.inputs);
        if !self.is_two_layer() {
            return private_function_bits(session, &self.first[0], x);
        }
        let (x0, x1) = x.split_at(self.first[0].inputs());
        let width = session.config().pack_width;
        let p0 = private_function(session, &self.first[0], x0)?;
        let l0 = unpack_all(session, &p0, width, self.outputs)?;
        let p1 = private_function(session, &self.first[1], x1)?;
        let l1 = unpack_all(session, &p1, width, self.outputs)?;
        let mid: Vec<Share> = l0.into_iter().interleave(l1).collect();

        let mut out = Vec::with_capacity(self.outputs);
        for (bits, t) in mid.chunks(SECOND_LAYER_INPUTS).zip(&self.second) {
            out.extend(private_function_bits(session, t, bits)?);
        }
        log::debug!(
            "{}: layered function with {} second-layer tables",
            M::NAME,
            self.second.len()
        );
        Ok(out)
    }
}
