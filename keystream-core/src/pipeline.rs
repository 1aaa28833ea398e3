// File:    pipeline.rs
// Author:  apezoo
// Date:    2025-11-03
//
// Description: Runs a set of LFSRs and feeds their output streams straight into a combiner.
//
// License:
// This project is licensed under the terms of the GNU AGPLv3 license.
// See the LICENSE.md file in the project root for full license information.

//! Register-to-keystream pipeline and the built-in register presets.

use log::info;
use serde::{Deserialize, Serialize};

use crate::combiner::{self, CombinerRule, CombinerStats};
use crate::error::{InvalidInput, Result};
use crate::lfsr::DEFAULT_MAX_STEPS;
use crate::service::{self, GenerateLfsrRequest, GenerateLfsrResponse};

/// One register of a pipeline.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RegisterSpec {
    /// Initial register content.
    pub init_state: Vec<u8>,
    /// Feedback tap indices.
    #[serde(default)]
    pub taps: Vec<usize>,
}

impl RegisterSpec {
    fn new(init_state: &[u8], taps: &[usize]) -> Self {
        Self {
            init_state: init_state.to_vec(),
            taps: taps.to_vec(),
        }
    }
}

/// Input of [`run_pipeline`].
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PipelineRequest {
    /// Registers in combiner order (R1 first).
    pub registers: Vec<RegisterSpec>,
    /// How the register outputs are combined.
    #[serde(flatten)]
    pub rule: CombinerRule,
    /// Combiner step count, the rule's default when omitted.
    #[serde(default)]
    pub steps: Option<usize>,
    /// Step budget for each register, [`DEFAULT_MAX_STEPS`] when omitted.
    #[serde(default)]
    pub max_steps: Option<usize>,
}

/// Output of [`run_pipeline`].
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PipelineResponse {
    /// Per-register runs, in input order.
    pub registers: Vec<GenerateLfsrResponse>,
    /// Combined keystream.
    pub keystream: Vec<u8>,
    /// Combiner statistics.
    pub stats: CombinerStats,
}

/// Names accepted by [`preset`].
pub const PRESET_NAMES: [&str; 2] = ["three-register", "two-register"];

/// Looks up a built-in pipeline by name.
///
/// `three-register` clocks 3-, 4- and 5-bit registers through the
/// clock-controlled rule; `two-register` feeds a 3-bit and a 5-bit register
/// into the sparse alternating-step rule.
///
/// # Errors
///
/// Returns [`InvalidInput::UnknownPreset`] for any other name.
pub fn preset(name: &str) -> Result<PipelineRequest> {
    let (registers, rule) = match name {
        "three-register" => (
            vec![
                RegisterSpec::new(&[0, 0, 1], &[0, 2]),
                RegisterSpec::new(&[1, 0, 1, 1], &[0, 1]),
                RegisterSpec::new(&[0, 1, 0, 0, 1], &[0, 1, 2, 4]),
            ],
            CombinerRule::ThreeRegisterClocked {
                b_minus1: 0,
                c_minus1: 0,
            },
        ),
        "two-register" => (
            vec![
                RegisterSpec::new(&[0, 0, 1], &[0, 2]),
                RegisterSpec::new(&[0, 0, 1, 0, 1], &[2, 4]),
            ],
            CombinerRule::TwoRegisterSparse,
        ),
        other => return Err(InvalidInput::UnknownPreset(other.to_string()).into()),
    };
    Ok(PipelineRequest {
        registers,
        rule,
        steps: None,
        max_steps: None,
    })
}

/// Generates every register's output stream and combines them.
///
/// # Errors
///
/// Fails if any register is invalid, if the register count does not match
/// the rule, or if the combiner rejects its inputs.
pub fn run_pipeline(request: &PipelineRequest) -> Result<PipelineResponse> {
    let max_steps = request.max_steps.unwrap_or(DEFAULT_MAX_STEPS);
    let registers = request
        .registers
        .iter()
        .map(|spec| {
            service::generate_lfsr(&GenerateLfsrRequest {
                init_state: spec.init_state.clone(),
                taps: spec.taps.clone(),
                max_steps: Some(max_steps),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let streams: Vec<&[u8]> = registers.iter().map(|r| r.outputs.as_slice()).collect();
    let combined = combiner::combine(request.rule, &streams, request.steps)?;
    info!(
        "pipeline of {} registers produced {} keystream bits",
        registers.len(),
        combined.keystream.len()
    );

    Ok(PipelineResponse {
        registers,
        keystream: combined.keystream,
        stats: combined.stats,
    })
}
