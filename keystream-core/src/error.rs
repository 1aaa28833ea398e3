// File:    error.rs
// Author:  apezoo
// Date:    2025-11-03
//
// Description: Error types shared by the LFSR engine, the FSM combiners and the key search.
//
// License:
// This project is licensed under the terms of the GNU AGPLv3 license.
// See the LICENSE.md file in the project root for full license information.

//! Error types for the keystream core library.
//!
//! Only malformed input is an error. A register that never cycles within its
//! step budget is reported as `period: None`, and a 5-bit group that does not
//! map to a letter is decoded as `'?'`; neither aborts a computation.

use thiserror::Error;

/// Malformed input rejected before any computation starts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidInput {
    /// A sequence that must hold at least one bit is empty.
    #[error("`{name}` must not be empty")]
    EmptySequence {
        /// Name of the offending field.
        name: &'static str,
    },
    /// A sequence element is neither 0 nor 1.
    #[error("`{name}[{index}]` is {value}, expected 0 or 1")]
    InvalidBit {
        /// Name of the offending field.
        name: &'static str,
        /// Position of the element in the sequence.
        index: usize,
        /// The value that was found.
        value: u8,
    },
    /// A feedback tap points outside the register.
    #[error("tap index {tap} is out of range for a {width}-bit register")]
    TapOutOfRange {
        /// The offending tap index.
        tap: usize,
        /// Width of the register.
        width: usize,
    },
    /// A combiner rule received the wrong number of input streams.
    #[error("combiner rule expects {expected} streams, got {found}")]
    StreamCount {
        /// Number of streams the rule consumes.
        expected: usize,
        /// Number of streams supplied.
        found: usize,
    },
    /// The default step count of a combiner does not fit in a `usize`.
    #[error("default step count overflows; pass an explicit step count")]
    StepCountOverflow,
    /// A combiner step count above the supported maximum.
    #[error("step count {steps} exceeds the maximum of {max}")]
    StepCountTooLarge {
        /// The requested or default step count.
        steps: usize,
        /// Largest step count a combiner accepts.
        max: usize,
    },
    /// A textual bit string contains something other than 0, 1 or a separator.
    #[error("invalid character {found:?} at position {position} in bit string")]
    InvalidBitString {
        /// The character that could not be parsed.
        found: char,
        /// Character position in the input string.
        position: usize,
    },
    /// A preset name that is not known.
    #[error("unknown preset `{0}`")]
    UnknownPreset(String),
}

/// Top-level error type of the core library.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeystreamError {
    /// The call was rejected because its input is malformed.
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInput),
}

/// Result alias used throughout the core library.
pub type Result<T> = std::result::Result<T, KeystreamError>;
