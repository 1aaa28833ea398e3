// File:    combiner.rs
// Author:  apezoo
// Date:    2025-11-03
//
// Description: FSM combiners merging two or three LFSR output streams into one keystream.
//
// License:
// This project is licensed under the terms of the GNU AGPLv3 license.
// See the LICENSE.md file in the project root for full license information.

//! FSM combiner rules.
//!
//! All rules work on pre-computed output streams, read through cyclic
//! pointers, and never touch a register state directly.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::bits;
use crate::error::{InvalidInput, Result};

/// Largest step count any combiner runs, explicit or default.
///
/// Every rule keeps its keystream in memory, so this also bounds the output.
pub const MAX_COMBINER_STEPS: usize = 1 << 24;

/// Selects how streams are merged.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "rule")]
pub enum CombinerRule {
    /// Three registers, R1 decides whether R2 or R3 is clocked; output is `b XOR c`.
    ThreeRegisterClocked {
        /// Initial value of the R2 carry bit.
        #[serde(default)]
        b_minus1: u8,
        /// Initial value of the R3 carry bit.
        #[serde(default)]
        c_minus1: u8,
    },
    /// Two registers clocked together; R2's bit is kept only when R1 emits 1.
    TwoRegisterSparse,
    /// Two registers; R1 moves R2's pointer forward or backward, one bit per step.
    TwoRegisterDense,
}

impl CombinerRule {
    /// Number of input streams the rule consumes.
    #[must_use]
    pub const fn arity(self) -> usize {
        match self {
            Self::ThreeRegisterClocked { .. } => 3,
            Self::TwoRegisterSparse | Self::TwoRegisterDense => 2,
        }
    }
}

/// Statistics of a three-register clock-controlled run.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ClockedStats {
    /// Number of steps executed, equal to the keystream length.
    pub steps: usize,
    /// Period reported for the keystream; the step count that was run.
    pub real_period: usize,
    /// `len(R1) * len(R2) * len(R3)`, if it fits in a `usize`.
    pub theoretical_period: Option<usize>,
    /// Final R1 pointer.
    pub r1_index: usize,
    /// Final R2 pointer, `-1` if R2 was never clocked.
    pub r2_index: isize,
    /// Final R3 pointer, `-1` if R3 was never clocked.
    pub r3_index: isize,
    /// Number of 1 bits emitted.
    pub ones: usize,
    /// Number of 0 bits emitted.
    pub zeros: usize,
}

/// Statistics of a two-register run.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AlternatingStats {
    /// Number of bits emitted.
    pub output_length: usize,
    /// `len(R1) * len(R2)`, if it fits in a `usize`.
    pub theoretical_period: Option<usize>,
}

/// Statistics of any combiner rule.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum CombinerStats {
    /// Produced by [`CombinerRule::ThreeRegisterClocked`].
    Clocked(ClockedStats),
    /// Produced by the two-register rules.
    Alternating(AlternatingStats),
}

/// Keystream and statistics produced by a combiner.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Combined<S = CombinerStats> {
    /// The combined keystream.
    pub keystream: Vec<u8>,
    /// Rule-specific statistics.
    pub stats: S,
}

impl<S: Into<CombinerStats>> Combined<S> {
    /// Erases the rule-specific statistics type.
    pub fn into_any(self) -> Combined {
        Combined {
            keystream: self.keystream,
            stats: self.stats.into(),
        }
    }
}

impl From<ClockedStats> for CombinerStats {
    fn from(stats: ClockedStats) -> Self {
        Self::Clocked(stats)
    }
}

impl From<AlternatingStats> for CombinerStats {
    fn from(stats: AlternatingStats) -> Self {
        Self::Alternating(stats)
    }
}

/// Read pointer wrapping modulo the length of its stream.
struct Cursor<'a> {
    stream: &'a [u8],
    position: usize,
}

impl<'a> Cursor<'a> {
    const fn new(stream: &'a [u8]) -> Self {
        Self {
            stream,
            position: 0,
        }
    }

    fn current(&self) -> u8 {
        self.stream[self.position]
    }

    fn advance(&mut self) {
        self.position = (self.position + 1) % self.stream.len();
    }
}

/// Cursor that starts before the first bit; the first advance lands on index 0.
struct LazyCursor<'a> {
    stream: &'a [u8],
    position: Option<usize>,
}

impl<'a> LazyCursor<'a> {
    const fn new(stream: &'a [u8]) -> Self {
        Self {
            stream,
            position: None,
        }
    }

    fn advance(&mut self) -> u8 {
        let next = self.position.map_or(0, |p| (p + 1) % self.stream.len());
        self.position = Some(next);
        self.stream[next]
    }

    /// Position on the wire: `-1` before the first advance.
    fn index(&self) -> isize {
        // A position is below the slice length, which never exceeds isize::MAX.
        self.position
            .map_or(-1, |p| isize::try_from(p).unwrap_or(isize::MAX))
    }
}

fn ensure_stream(name: &'static str, stream: &[u8]) -> Result<()> {
    bits::ensure_non_empty(name, stream)
}

fn ensure_carry(name: &'static str, bit: u8) -> Result<()> {
    bits::ensure_bits(name, &[bit])
}

fn product(lengths: &[usize]) -> Option<usize> {
    lengths.iter().try_fold(1usize, |acc, &l| acc.checked_mul(l))
}

fn resolve_steps(steps: Option<usize>, period: Option<usize>) -> Result<usize> {
    let steps = match steps {
        Some(steps) => steps,
        None => period.ok_or(InvalidInput::StepCountOverflow)?,
    };
    if steps > MAX_COMBINER_STEPS {
        return Err(InvalidInput::StepCountTooLarge {
            steps,
            max: MAX_COMBINER_STEPS,
        }
        .into());
    }
    Ok(steps)
}

/// Rule A: three-register clock-controlled combiner.
///
/// At each step the R1 bit selects which of R2 or R3 is clocked. Clocking R2
/// loads its next bit into `b`, clocking R3 loads its next bit into `c`, and
/// `b XOR c` is emitted. The R1 pointer advances on every step. The default
/// step count is `len(R1) * len(R2) * len(R3)`.
///
/// # Errors
///
/// Fails if a stream is empty or not made of bits, if a carry bit is not 0 or
/// 1, or if the step count overflows or exceeds [`MAX_COMBINER_STEPS`].
pub fn clock_controlled(
    r1: &[u8],
    r2: &[u8],
    r3: &[u8],
    b_minus1: u8,
    c_minus1: u8,
    steps: Option<usize>,
) -> Result<Combined<ClockedStats>> {
    ensure_stream("r1", r1)?;
    ensure_stream("r2", r2)?;
    ensure_stream("r3", r3)?;
    ensure_carry("b_minus1", b_minus1)?;
    ensure_carry("c_minus1", c_minus1)?;

    let theoretical_period = product(&[r1.len(), r2.len(), r3.len()]);
    let steps = resolve_steps(steps, theoretical_period)?;

    let mut control = Cursor::new(r1);
    let mut second = LazyCursor::new(r2);
    let mut third = LazyCursor::new(r3);
    let mut b = b_minus1;
    let mut c = c_minus1;
    let mut keystream = Vec::with_capacity(steps);

    for _ in 0..steps {
        if control.current() == 1 {
            b = second.advance();
        } else {
            c = third.advance();
        }
        keystream.push(b ^ c);
        control.advance();
    }

    let ones = keystream.iter().filter(|&&bit| bit == 1).count();
    debug!("clock-controlled combiner ran {steps} steps, {ones} ones");

    Ok(Combined {
        stats: ClockedStats {
            steps,
            real_period: steps,
            theoretical_period,
            r1_index: control.position,
            r2_index: second.index(),
            r3_index: third.index(),
            ones,
            zeros: steps - ones,
        },
        keystream,
    })
}

/// Rule B: two-register alternating-step combiner, sparse variant.
///
/// Both pointers advance on every step; R2's current bit is emitted only when
/// R1's bit is 1, so the keystream is at most `steps` long. The default step
/// count is `len(R1) * len(R2)`.
///
/// # Errors
///
/// Fails if a stream is empty or not made of bits, or if the step count
/// overflows or exceeds [`MAX_COMBINER_STEPS`].
pub fn alternating_sparse(
    r1: &[u8],
    r2: &[u8],
    steps: Option<usize>,
) -> Result<Combined<AlternatingStats>> {
    ensure_stream("r1", r1)?;
    ensure_stream("r2", r2)?;

    let theoretical_period = product(&[r1.len(), r2.len()]);
    let steps = resolve_steps(steps, theoretical_period)?;

    let mut control = Cursor::new(r1);
    let mut data = Cursor::new(r2);
    let mut keystream = Vec::new();

    for _ in 0..steps {
        if control.current() == 1 {
            keystream.push(data.current());
        }
        control.advance();
        data.advance();
    }

    debug!("sparse combiner kept {} of {steps} steps", keystream.len());
    Ok(Combined {
        stats: AlternatingStats {
            output_length: keystream.len(),
            theoretical_period,
        },
        keystream,
    })
}

/// Rule C: two-register alternating-step combiner, dense variant.
///
/// When R1 emits 1, R2 is read at its pointer which then moves forward; when
/// R1 emits 0, R2's pointer first moves backward and is then read. The R2
/// pointer is unbounded and read modulo `len(R2)`. Each step emits
/// `r2_bit XOR r1_bit`, so the keystream is exactly `steps` long.
///
/// # Errors
///
/// Fails if a stream is empty or not made of bits, or if the step count
/// overflows or exceeds [`MAX_COMBINER_STEPS`].
pub fn alternating_dense(
    r1: &[u8],
    r2: &[u8],
    steps: Option<usize>,
) -> Result<Combined<AlternatingStats>> {
    ensure_stream("r1", r1)?;
    ensure_stream("r2", r2)?;

    let theoretical_period = product(&[r1.len(), r2.len()]);
    let steps = resolve_steps(steps, theoretical_period)?;

    let mut control = Cursor::new(r1);
    let mut pointer: i128 = 0;
    // Slice lengths never exceed isize::MAX, so this is lossless.
    let len2 = r2.len() as i128;
    let read = |p: i128| {
        // rem_euclid keeps the index in [0, len2).
        r2[usize::try_from(p.rem_euclid(len2)).unwrap_or_default()]
    };
    let mut keystream = Vec::with_capacity(steps);

    for _ in 0..steps {
        let a = control.current();
        let r2_bit = if a == 1 {
            let bit = read(pointer);
            pointer += 1;
            bit
        } else {
            pointer -= 1;
            read(pointer)
        };
        keystream.push(r2_bit ^ (a & 1));
        control.advance();
    }

    debug!("dense combiner ran {steps} steps");
    Ok(Combined {
        stats: AlternatingStats {
            output_length: keystream.len(),
            theoretical_period,
        },
        keystream,
    })
}

/// Applies `rule` to `streams`.
///
/// # Errors
///
/// Fails if the number of streams does not match the rule, or for any reason
/// the selected rule function fails.
pub fn combine(rule: CombinerRule, streams: &[&[u8]], steps: Option<usize>) -> Result<Combined> {
    if streams.len() != rule.arity() {
        return Err(InvalidInput::StreamCount {
            expected: rule.arity(),
            found: streams.len(),
        }
        .into());
    }
    match rule {
        CombinerRule::ThreeRegisterClocked { b_minus1, c_minus1 } => {
            clock_controlled(streams[0], streams[1], streams[2], b_minus1, c_minus1, steps)
                .map(Combined::into_any)
        }
        CombinerRule::TwoRegisterSparse => {
            alternating_sparse(streams[0], streams[1], steps).map(Combined::into_any)
        }
        CombinerRule::TwoRegisterDense => {
            alternating_dense(streams[0], streams[1], steps).map(Combined::into_any)
        }
    }
}
