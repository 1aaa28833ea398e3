// File:    service.rs
// Author:  apezoo
// Date:    2025-11-03
//
// Description: Request and response payloads for the LFSR, combiner and decryption operations.
//
// License:
// This project is licensed under the terms of the GNU AGPLv3 license.
// See the LICENSE.md file in the project root for full license information.

//! Request/response boundary shared by the CLI and the web server.
//!
//! Every payload uses plain bit arrays and integers so it serialises to the
//! same JSON shape regardless of the transport.

use serde::{Deserialize, Serialize};

use crate::combiner::{self, AlternatingStats, ClockedStats};
use crate::config::SearchDefaults;
use crate::dictionary::Dictionary;
use crate::error::Result;
use crate::lfsr::{self, DEFAULT_MAX_STEPS};
use crate::search::{self, SearchOutcome};

/// Input of [`generate_lfsr`].
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateLfsrRequest {
    /// Initial register content.
    pub init_state: Vec<u8>,
    /// Feedback tap indices.
    #[serde(default)]
    pub taps: Vec<usize>,
    /// Step budget, [`DEFAULT_MAX_STEPS`] when omitted.
    #[serde(default)]
    pub max_steps: Option<usize>,
}

/// Output of [`generate_lfsr`].
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct GenerateLfsrResponse {
    /// Emitted bits, one per visited state.
    pub outputs: Vec<u8>,
    /// Detected period, `null` if the step budget ran out first.
    pub period: Option<usize>,
    /// Visited states in order.
    pub states: Vec<Vec<u8>>,
    /// `2^W - 1`, `null` if it does not fit in 64 bits.
    pub theoretical_period: Option<u64>,
}

/// Input of [`run_fsm_3`].
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct RunFsm3Request {
    /// Control stream.
    pub r1: Vec<u8>,
    /// Stream feeding the `b` carry.
    pub r2: Vec<u8>,
    /// Stream feeding the `c` carry.
    pub r3: Vec<u8>,
    /// Initial `b` carry, 0 when omitted.
    #[serde(default)]
    pub b_minus1: u8,
    /// Initial `c` carry, 0 when omitted.
    #[serde(default)]
    pub c_minus1: u8,
    /// Step count, `len(r1) * len(r2) * len(r3)` when omitted.
    #[serde(default)]
    pub steps: Option<usize>,
}

/// Output of [`run_fsm_3`].
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RunFsm3Response {
    /// Combined keystream.
    pub fsm: Vec<u8>,
    /// Run statistics.
    pub stats: ClockedStats,
}

/// Which two-register rule [`run_fsm_2`] applies.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TwoRegisterVariant {
    /// One output bit per step; R2's pointer moves forward or backward.
    #[default]
    Dense,
    /// Output only on steps where R1 emits 1.
    Sparse,
}

/// Input of [`run_fsm_2`].
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct RunFsm2Request {
    /// Control stream.
    pub r1: Vec<u8>,
    /// Data stream.
    pub r2: Vec<u8>,
    /// Step count, `len(r1) * len(r2)` when omitted.
    #[serde(default)]
    pub steps: Option<usize>,
    /// Combination rule, dense when omitted.
    #[serde(default)]
    pub variant: TwoRegisterVariant,
}

/// Output of [`run_fsm_2`].
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RunFsm2Response {
    /// Combined keystream.
    pub fsm: Vec<u8>,
    /// Run statistics.
    pub stats: AlternatingStats,
}

/// Input of [`decrypt`]. Omitted fields take the configured defaults.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct DecryptRequest {
    /// Ciphertext bits.
    #[serde(default)]
    pub cipher_bits: Option<Vec<u8>>,
    /// Candidate keys.
    #[serde(default)]
    pub keys: Option<Vec<Vec<u8>>>,
    /// Scoring words.
    #[serde(default)]
    pub dictionary: Option<Vec<String>>,
}

/// Output of [`decrypt`].
pub type DecryptResponse = SearchOutcome;

/// Runs one LFSR until its first repeated state.
///
/// # Errors
///
/// Fails on an empty or non-bit state, or an out-of-range tap.
pub fn generate_lfsr(request: &GenerateLfsrRequest) -> Result<GenerateLfsrResponse> {
    let run = lfsr::generate(
        &request.init_state,
        &request.taps,
        request.max_steps.unwrap_or(DEFAULT_MAX_STEPS),
    )?;
    Ok(GenerateLfsrResponse {
        outputs: run.outputs,
        period: run.period,
        states: run.states,
        theoretical_period: lfsr::theoretical_period(request.init_state.len()),
    })
}

/// Runs the three-register clock-controlled combiner.
///
/// # Errors
///
/// See [`combiner::clock_controlled`].
pub fn run_fsm_3(request: &RunFsm3Request) -> Result<RunFsm3Response> {
    let combined = combiner::clock_controlled(
        &request.r1,
        &request.r2,
        &request.r3,
        request.b_minus1,
        request.c_minus1,
        request.steps,
    )?;
    Ok(RunFsm3Response {
        fsm: combined.keystream,
        stats: combined.stats,
    })
}

/// Runs one of the two-register combiners.
///
/// # Errors
///
/// See [`combiner::alternating_dense`] and [`combiner::alternating_sparse`].
pub fn run_fsm_2(request: &RunFsm2Request) -> Result<RunFsm2Response> {
    let combined = match request.variant {
        TwoRegisterVariant::Dense => {
            combiner::alternating_dense(&request.r1, &request.r2, request.steps)?
        }
        TwoRegisterVariant::Sparse => {
            combiner::alternating_sparse(&request.r1, &request.r2, request.steps)?
        }
    };
    Ok(RunFsm2Response {
        fsm: combined.keystream,
        stats: combined.stats,
    })
}

/// Tries every candidate key, filling omitted request fields from `defaults`.
///
/// # Errors
///
/// Fails on an empty ciphertext or key, or a non-bit value.
pub fn decrypt(request: &DecryptRequest, defaults: &SearchDefaults) -> Result<DecryptResponse> {
    let cipher_bits = request
        .cipher_bits
        .as_deref()
        .unwrap_or(&defaults.cipher_bits);
    let keys = request.keys.as_deref().unwrap_or(&defaults.keys);
    let dictionary = request
        .dictionary
        .as_ref()
        .map_or_else(|| defaults.dictionary(), Dictionary::new);
    search::search(cipher_bits, keys, &dictionary)
}
