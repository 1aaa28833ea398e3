// File:    lib.rs
// Author:  apezoo
// Date:    2025-11-03
//
// Description: The main library crate for keystream-core, tying together the LFSR engine, the FSM combiners and the key search.
//
// License:
// This project is licensed under the terms of the GNU AGPLv3 license.
// See the LICENSE.md file in the project root for full license information.

//! # Keystream Core Library
//!
//! This library simulates classical stream-cipher building blocks: linear-feedback
//! shift registers, FSM combiners merging their output streams into a keystream,
//! and a dictionary-scored search over candidate keys for a ciphertext.
//!
//! It is meant for teaching and experimentation. Nothing here is constant-time
//! or suitable for protecting real data.

/// Bit sequence primitives: validation, XOR, key expansion and letter decoding.
pub mod bits;
/// FSM combiner rules merging several output streams into one keystream.
pub mod combiner;
/// Built-in search defaults and loading overrides from disk.
pub mod config;
/// Word list scoring of decoded text.
pub mod dictionary;
/// Error types shared by every module.
pub mod error;
/// Single-register LFSR engine with period detection.
pub mod lfsr;
/// LFSRs chained into a combiner, with built-in presets.
pub mod pipeline;
/// Candidate-key search over a ciphertext.
pub mod search;
/// Request and response payloads for every operation.
pub mod service;

pub use error::{InvalidInput, KeystreamError, Result};
