// -*- mode: rust; -*-
//
// This file is part of `scuttlebutt`.
// Copyright © 2019 Galois, Inc.
// See LICENSE for licensing information.

#![allow(clippy::many_single_char_names)]

//! `scuttlebutt` provides the plumbing shared by both parties of a garbling
//! session: 128-bit blocks, fixed-key AES hashing, an AES-based PRG, and
//! byte-stream channels.

mod aes;
mod block;
/// Module for encapsulating communication channels.
pub mod channel;
mod hash_aes;
mod rand_aes;

pub use crate::{
    aes::aes128::Aes128,
    block::Block,
    channel::{AbstractChannel, Channel, TrackChannel},
    hash_aes::AesHash,
    rand_aes::AesRng,
};

#[cfg(unix)]
pub use crate::channel::{
    track_unix_channel_pair, unix_channel_pair, TrackUnixChannel, UnixChannel,
};

/// A marker trait denoting that the given scheme is semi-honest secure.
pub trait SemiHonest {}
