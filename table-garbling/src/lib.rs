// -*- mode: rust; -*-
//
// This file is part of `table-garbling`.
// Copyright © 2023 Galois, Inc.
// See LICENSE for licensing information.

//! `table-garbling` evaluates private functions between two parties.
//!
//! The generator holds a function as a truth table; the evaluator holds
//! labels for its input. A privacy-free point function turns the input
//! labels into a one-hot vector, against which any public table can be
//! applied for free. Private tables are then evaluated by one-time padding
//! them with a random table whose evaluation costs one garbled row per
//! input bit. On top of that sit outer products, GF(256) arithmetic, the
//! AES S-box and integer arithmetic.

#![deny(clippy::all)]
#![allow(
    clippy::needless_range_loop,
    clippy::many_single_char_names,
    clippy::new_without_default
)]

pub mod config;
pub mod errors;
pub mod field;
pub mod function;
pub mod gf256;
pub mod integer;
pub mod layered;
mod matrix;
pub mod outer;
pub mod pack;
pub mod point;
mod session;
mod share;
mod share_matrix;
pub mod table;
#[cfg(test)]
mod test_utils;
mod truth_table;
pub mod util;

pub use crate::{
    config::SessionConfig,
    errors::ProtocolError,
    field::{aes_sbox, gf256_invert, mul_gf256},
    function::{private_function, private_function_bits, table_lookup},
    layered::LayeredFunction,
    matrix::Matrix,
    outer::{and, matrix_multiply, outer_product},
    point::{privacy_free_point, unary_outer_product},
    session::{Evaluator, Generator, Mode, Session},
    share::Share,
    share_matrix::ShareMatrix,
    table::LookupTable,
    truth_table::TruthTable,
};
