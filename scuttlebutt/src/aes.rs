// -*- mode: rust; -*-
//
// This file is part of `scuttlebutt`.
// Copyright © 2019 Galois, Inc.
// See LICENSE for licensing information.

//! AES-128, encryption only, backed by the RustCrypto `aes` crate (which
//! dispatches to AES-NI at run time when the CPU supports it).

pub mod aes128;
