// File:    config.rs
// Author:  apezoo
// Date:    2025-11-03
//
// Description: Built-in search defaults and loading overrides from a JSON file.
//
// License:
// This project is licensed under the terms of the GNU AGPLv3 license.
// See the LICENSE.md file in the project root for full license information.

//! Default ciphertext, candidate keys and dictionary for the key search.
//!
//! The defaults are loaded once at startup and passed explicitly to
//! [`crate::service::decrypt`].

use std::fs;
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bits;
use crate::dictionary::{Dictionary, FRENCH_WORDS};
use crate::error::KeystreamError;

/// The built-in 70-bit ciphertext.
pub const DEFAULT_CIPHER_BITS: [u8; 70] = [
    1, 1, 0, 1, 1, 0, 1, 1, 0, 0, 1, 0, 1, 1, 1, 1, 1, 1, 0, 1, 0, 0, 0, 0, 0, 1, 0, 0, 0, 1, 1, 1,
    0, 1, 0, 1, 0, 0, 1, 1, 1, 1, 1, 1, 0, 0, 1, 1, 1, 1, 0, 0, 1, 1, 0, 1, 0, 0, 1, 0, 1, 1, 1, 0,
    0, 0, 0, 0, 0, 0,
];

/// The five built-in 15-bit candidate keys.
pub const DEFAULT_KEYS: [[u8; 15]; 5] = [
    [1, 0, 1, 0, 1, 1, 1, 1, 0, 0, 0, 1, 0, 0, 1],
    [0, 1, 0, 1, 1, 1, 1, 0, 0, 0, 1, 0, 0, 1, 1],
    [1, 0, 1, 1, 1, 1, 0, 0, 0, 1, 0, 0, 1, 1, 0],
    [0, 1, 1, 1, 1, 0, 0, 0, 1, 0, 0, 1, 1, 0, 1],
    [1, 1, 1, 1, 0, 0, 0, 1, 0, 0, 1, 1, 0, 1, 0],
];

/// Errors raised while loading a defaults file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read defaults file: {0}")]
    Io(#[from] std::io::Error),
    /// The file is not valid JSON for [`SearchDefaults`].
    #[error("failed to parse defaults file: {0}")]
    Json(#[from] serde_json::Error),
    /// The file parsed but holds values the search would reject.
    #[error("invalid defaults: {0}")]
    Invalid(#[from] KeystreamError),
}

/// Values substituted when a decrypt request omits a field.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct SearchDefaults {
    /// Ciphertext used when the request has none.
    pub cipher_bits: Vec<u8>,
    /// Candidate keys used when the request has none.
    pub keys: Vec<Vec<u8>>,
    /// Dictionary words used when the request has none.
    pub dictionary: Vec<String>,
}

impl Default for SearchDefaults {
    fn default() -> Self {
        Self::builtin()
    }
}

impl SearchDefaults {
    /// The compiled-in defaults.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            cipher_bits: DEFAULT_CIPHER_BITS.to_vec(),
            keys: DEFAULT_KEYS.iter().map(|k| k.to_vec()).collect(),
            dictionary: FRENCH_WORDS.iter().map(|w| (*w).to_string()).collect(),
        }
    }

    /// Loads defaults from a JSON file. Fields missing from the file keep
    /// their built-in value.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or parsed, or holds an empty
    /// ciphertext, an empty key or a non-bit value.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        let defaults: Self = serde_json::from_str(&text)?;
        defaults.validate()?;
        info!("Loaded search defaults from '{}'", path.display());
        Ok(defaults)
    }

    /// Checks the defaults the same way a request would be checked.
    ///
    /// # Errors
    ///
    /// Fails on an empty ciphertext or key, or a non-bit value.
    pub fn validate(&self) -> Result<(), KeystreamError> {
        bits::ensure_non_empty("cipher_bits", &self.cipher_bits)?;
        for key in &self.keys {
            bits::ensure_non_empty("keys", key)?;
        }
        Ok(())
    }

    /// The default words as a [`Dictionary`].
    #[must_use]
    pub fn dictionary(&self) -> Dictionary {
        Dictionary::new(&self.dictionary)
    }
}
