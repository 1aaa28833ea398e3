// File:    search.rs
// Author:  apezoo
// Date:    2025-11-03
//
// Description: Candidate-key search scoring XOR-decoded text against a dictionary.
//
// License:
// This project is licensed under the terms of the GNU AGPLv3 license.
// See the LICENSE.md file in the project root for full license information.

//! Tries every candidate key against a ciphertext and ranks the decodings.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::bits;
use crate::dictionary::Dictionary;
use crate::error::Result;

/// Result of decoding the ciphertext with one key.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// 1-based position of the key in the input list.
    pub key_index: usize,
    /// The key as supplied, before expansion.
    pub key: Vec<u8>,
    /// Letters decoded from the plaintext bits.
    pub decoded_text: String,
    /// Sum of the lengths of the dictionary words found in the text.
    pub score: usize,
}

/// The highest-scoring candidate of a search.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct BestCandidate {
    /// 1-based key position, `None` when no key was tried.
    pub key_index: Option<usize>,
    /// Decoded text of the winning key, empty when no key was tried.
    pub decoded_text: String,
    /// Winning score, or `-1` when no key was tried.
    pub score: i64,
}

impl BestCandidate {
    /// The "no result" value: ranks below every real candidate.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            key_index: None,
            decoded_text: String::new(),
            score: -1,
        }
    }
}

impl From<&Candidate> for BestCandidate {
    fn from(candidate: &Candidate) -> Self {
        Self {
            key_index: Some(candidate.key_index),
            decoded_text: candidate.decoded_text.clone(),
            score: i64::try_from(candidate.score).unwrap_or(i64::MAX),
        }
    }
}

/// Per-key results in input order plus the best of them.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SearchOutcome {
    /// One entry per key, in the order the keys were given.
    pub per_key: Vec<Candidate>,
    /// Strictly greatest score; the earliest key wins ties.
    pub best: BestCandidate,
}

/// Decodes `ciphertext` with a single key and scores the text.
///
/// The key is repeated to the ciphertext length, XORed in, and the plaintext
/// bits are decoded five at a time.
///
/// # Errors
///
/// Fails if the key is empty or not made of bits.
pub fn trial(
    ciphertext: &[u8],
    key: &[u8],
    key_index: usize,
    dictionary: &Dictionary,
) -> Result<Candidate> {
    bits::ensure_non_empty("key", key)?;
    let expanded = bits::repeat_to_length(key, ciphertext.len())?;
    let plain = bits::xor(ciphertext, &expanded);
    let decoded_text = bits::bits_to_text(&plain);
    let score = dictionary.score(&decoded_text);
    Ok(Candidate {
        key_index,
        key: key.to_vec(),
        decoded_text,
        score,
    })
}

/// Tries every key against `ciphertext`.
///
/// # Errors
///
/// Fails if the ciphertext is empty, or if any key is empty or any sequence
/// holds something other than bits.
pub fn search<K>(ciphertext: &[u8], keys: &[K], dictionary: &Dictionary) -> Result<SearchOutcome>
where
    K: AsRef<[u8]>,
{
    bits::ensure_non_empty("cipher_bits", ciphertext)?;

    let per_key = keys
        .iter()
        .enumerate()
        .map(|(i, key)| trial(ciphertext, key.as_ref(), i + 1, dictionary))
        .collect::<Result<Vec<_>>>()?;

    let mut best = BestCandidate::none();
    for candidate in &per_key {
        debug!(
            "key {}: {} (score={})",
            candidate.key_index, candidate.decoded_text, candidate.score
        );
        if i64::try_from(candidate.score).unwrap_or(i64::MAX) > best.score {
            best = BestCandidate::from(candidate);
        }
    }

    Ok(SearchOutcome { per_key, best })
}
