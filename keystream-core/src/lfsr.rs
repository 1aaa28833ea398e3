// File:    lfsr.rs
// Author:  apezoo
// Date:    2025-11-03
//
// Description: Linear-feedback shift register engine with first-repeat period detection.
//
// License:
// This project is licensed under the terms of the GNU AGPLv3 license.
// See the LICENSE.md file in the project root for full license information.

//! A single LFSR evolved from an initial state and a tap list.
//!
//! Convention: index `W - 1` is the output end. Each step emits the rightmost
//! bit, computes the feedback as the XOR of the tapped cells, and shifts right
//! with the feedback bit entering at index 0.

use std::collections::HashMap;

use log::{debug, warn};
use serde::Serialize;

use crate::bits;
use crate::error::{InvalidInput, Result};

/// Step budget used when the caller does not supply one.
pub const DEFAULT_MAX_STEPS: usize = 1 << 20;

/// Outcome of evolving a register until its first repeated state.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct LfsrRun {
    /// One output bit per recorded state.
    pub outputs: Vec<u8>,
    /// Distance between the repeated state and its first occurrence.
    ///
    /// `None` when the step budget ran out before any state repeated; the
    /// run is then unbounded as far as this engine can tell.
    pub period: Option<usize>,
    /// Every distinct state visited, in order, starting with the initial state.
    pub states: Vec<Vec<u8>>,
}

/// A shift register together with its feedback taps.
#[derive(Debug, Clone)]
pub struct Lfsr {
    state: Vec<u8>,
    taps: Vec<usize>,
}

impl Lfsr {
    /// Creates a register from an initial state and a list of tap indices.
    ///
    /// Taps are used in the order given; a repeated index is XORed once per
    /// occurrence.
    ///
    /// # Errors
    ///
    /// Fails if the state is empty or not made of bits, or if a tap is not a
    /// valid cell index.
    pub fn new(initial_state: &[u8], taps: &[usize]) -> Result<Self> {
        bits::ensure_non_empty("init_state", initial_state)?;
        let width = initial_state.len();
        if let Some(&tap) = taps.iter().find(|&&t| t >= width) {
            return Err(InvalidInput::TapOutOfRange { tap, width }.into());
        }
        Ok(Self {
            state: initial_state.to_vec(),
            taps: taps.to_vec(),
        })
    }

    /// The current register content.
    #[must_use]
    pub fn state(&self) -> &[u8] {
        &self.state
    }

    /// Register width in bits.
    #[must_use]
    pub fn width(&self) -> usize {
        self.state.len()
    }

    /// XOR of the tapped cells of the current state.
    #[must_use]
    pub fn feedback(&self) -> u8 {
        self.taps.iter().fold(0, |acc, &t| acc ^ self.state[t])
    }

    /// Advances the register by one step and returns the emitted bit.
    pub fn step(&mut self) -> u8 {
        let feedback = self.feedback();
        // Non-empty by construction.
        let out = self.state.pop().unwrap_or_default();
        self.state.insert(0, feedback);
        out
    }

    /// Evolves the register for at most `max_steps` steps, stopping at the
    /// first state that was already seen.
    ///
    /// The repeated state is not recorded a second time. If the budget is
    /// exhausted first, `period` is `None`.
    #[must_use]
    pub fn run(mut self, max_steps: usize) -> LfsrRun {
        let mut seen: HashMap<Vec<u8>, usize> = HashMap::new();
        let mut outputs = Vec::new();
        let mut states = Vec::new();

        for step in 0..max_steps {
            if let Some(&first) = seen.get(&self.state) {
                let period = step - first;
                debug!(
                    "{}-bit register repeated state {} at step {step}, period {period}",
                    self.width(),
                    bits::format_bits(&self.state)
                );
                return LfsrRun {
                    outputs,
                    period: Some(period),
                    states,
                };
            }
            seen.insert(self.state.clone(), step);
            states.push(self.state.clone());
            outputs.push(self.step());
        }

        warn!(
            "{}-bit register did not repeat within {max_steps} steps",
            self.width()
        );
        LfsrRun {
            outputs,
            period: None,
            states,
        }
    }
}

/// Runs a register built from `initial_state` and `taps`.
///
/// # Errors
///
/// See [`Lfsr::new`].
pub fn generate(initial_state: &[u8], taps: &[usize], max_steps: usize) -> Result<LfsrRun> {
    Ok(Lfsr::new(initial_state, taps)?.run(max_steps))
}

/// Maximum period `2^W - 1` of a `width`-bit register, if it fits in a `u64`.
#[must_use]
pub fn theoretical_period(width: usize) -> Option<u64> {
    let width = u32::try_from(width).ok()?;
    1u64.checked_shl(width).map(|p| p - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::KeystreamError;

    #[test]
    fn test_step_shifts_feedback_in_front() {
        let mut lfsr = Lfsr::new(&[1, 0, 1, 1], &[0, 1]).unwrap();
        assert_eq!(lfsr.feedback(), 1);
        assert_eq!(lfsr.step(), 1);
        assert_eq!(lfsr.state(), &[1, 1, 0, 1]);
    }

    #[test]
    fn test_three_bit_maximal_period() {
        let run = generate(&[0, 0, 1], &[0, 2], DEFAULT_MAX_STEPS).unwrap();
        assert_eq!(run.period, Some(7));
        assert_eq!(run.outputs, vec![1, 0, 0, 1, 1, 1, 0]);
        assert_eq!(run.states.len(), 7);
        assert_eq!(run.states[0], vec![0, 0, 1]);
    }

    #[test]
    fn test_short_cycle() {
        let run = generate(&[1, 0, 1, 1], &[0, 1], DEFAULT_MAX_STEPS).unwrap();
        assert_eq!(run.period, Some(3));
        assert_eq!(run.outputs, vec![1, 1, 0]);
        assert_eq!(
            run.states,
            vec![vec![1, 0, 1, 1], vec![1, 1, 0, 1], vec![0, 1, 1, 0]]
        );
    }

    #[test]
    fn test_exhausted_budget_reports_no_period() {
        let run = generate(&[1, 0, 1, 1], &[0, 1], 3).unwrap();
        assert_eq!(run.period, None);
        assert_eq!(run.outputs, vec![1, 1, 0]);

        let run = generate(&[1, 0, 1, 1], &[0, 1], 4).unwrap();
        assert_eq!(run.period, Some(3));
    }

    #[test]
    fn test_zero_budget() {
        let run = generate(&[1, 0], &[0], 0).unwrap();
        assert!(run.outputs.is_empty());
        assert!(run.states.is_empty());
        assert_eq!(run.period, None);
    }

    #[test]
    fn test_all_zero_state_is_trivial_cycle() {
        let run = generate(&[0, 0, 0], &[0, 2], DEFAULT_MAX_STEPS).unwrap();
        assert_eq!(run.period, Some(1));
        assert_eq!(run.outputs, vec![0]);
    }

    #[test]
    fn test_empty_taps_shift_in_zeros() {
        let run = generate(&[1, 1], &[], DEFAULT_MAX_STEPS).unwrap();
        assert_eq!(run.outputs, vec![1, 1, 0]);
        assert_eq!(run.period, Some(1));
    }

    #[test]
    fn test_duplicate_tap_cancels() {
        let lfsr = Lfsr::new(&[1, 0], &[0, 0]).unwrap();
        assert_eq!(lfsr.feedback(), 0);
    }

    #[test]
    fn test_rejects_bad_input() {
        assert_eq!(
            Lfsr::new(&[1, 0, 1], &[0, 3]).unwrap_err(),
            KeystreamError::InvalidInput(InvalidInput::TapOutOfRange { tap: 3, width: 3 })
        );
        assert!(matches!(
            Lfsr::new(&[], &[]),
            Err(KeystreamError::InvalidInput(InvalidInput::EmptySequence { .. }))
        ));
        assert!(matches!(
            Lfsr::new(&[1, 2], &[0]),
            Err(KeystreamError::InvalidInput(InvalidInput::InvalidBit { .. }))
        ));
    }

    #[test]
    fn test_theoretical_period() {
        assert_eq!(theoretical_period(1), Some(1));
        assert_eq!(theoretical_period(5), Some(31));
        assert_eq!(theoretical_period(63), Some((1 << 63) - 1));
        assert_eq!(theoretical_period(64), None);
    }
}
