// File:    bits.rs
// Author:  apezoo
// Date:    2025-11-03
//
// Description: Bit sequence primitives: validation, XOR, key expansion and 5-bit letter decoding.
//
// License:
// This project is licensed under the terms of the GNU AGPLv3 license.
// See the LICENSE.md file in the project root for full license information.

//! Bit sequences are plain `u8` slices whose elements are 0 or 1.

use crate::error::{InvalidInput, Result};

/// Number of bits decoded into one letter.
pub const GROUP_WIDTH: usize = 5;

/// Character emitted for a 5-bit group whose value is 26 or more.
pub const UNREPRESENTABLE: char = '?';

/// Checks that every element of `bits` is 0 or 1.
///
/// # Errors
///
/// Returns [`InvalidInput::InvalidBit`] for the first element that is not a bit.
pub fn ensure_bits(name: &'static str, bits: &[u8]) -> Result<()> {
    match bits.iter().position(|&b| b > 1) {
        Some(index) => Err(InvalidInput::InvalidBit {
            name,
            index,
            value: bits[index],
        }
        .into()),
        None => Ok(()),
    }
}

/// Checks that `bits` is non-empty and holds only 0 or 1.
///
/// # Errors
///
/// Returns [`InvalidInput::EmptySequence`] or [`InvalidInput::InvalidBit`].
pub fn ensure_non_empty(name: &'static str, bits: &[u8]) -> Result<()> {
    if bits.is_empty() {
        return Err(InvalidInput::EmptySequence { name }.into());
    }
    ensure_bits(name, bits)
}

/// Performs a bitwise XOR between two bit sequences.
///
/// # Panics
///
/// Panics if the slices are not of equal length.
#[must_use]
pub fn xor(a: &[u8], b: &[u8]) -> Vec<u8> {
    assert_eq!(
        a.len(),
        b.len(),
        "Input sequences must have the same length for XOR operation."
    );
    a.iter().zip(b.iter()).map(|(x, y)| x ^ y).collect()
}

/// Repeats `seq` end-to-end and truncates the tail so the result is exactly `len` bits.
///
/// # Errors
///
/// Returns [`InvalidInput::EmptySequence`] if `seq` is empty.
pub fn repeat_to_length(seq: &[u8], len: usize) -> Result<Vec<u8>> {
    if seq.is_empty() {
        return Err(InvalidInput::EmptySequence { name: "key" }.into());
    }
    Ok(seq.iter().copied().cycle().take(len).collect())
}

/// Maps one group of up to five bits (most significant first) to a letter.
///
/// Groups shorter than five bits are right-padded with zeros.
#[must_use]
pub fn bits5_to_letter(group: &[u8]) -> char {
    let value = (0..GROUP_WIDTH).fold(0u8, |acc, i| {
        (acc << 1) | group.get(i).copied().unwrap_or(0)
    });
    if value < 26 {
        char::from(b'A' + value)
    } else {
        UNREPRESENTABLE
    }
}

/// Decodes a bit stream into text, five bits per letter.
///
/// The result holds `ceil(bits.len() / 5)` characters.
#[must_use]
pub fn bits_to_text(bits: &[u8]) -> String {
    bits.chunks(GROUP_WIDTH).map(bits5_to_letter).collect()
}

/// Parses a human-written bit string such as `"1011"`, `"1,0,1,1"` or `"1 0 1 1"`.
///
/// # Errors
///
/// Returns [`InvalidInput::InvalidBitString`] on any character other than
/// `0`, `1`, a comma or whitespace.
pub fn parse_bits(text: &str) -> Result<Vec<u8>> {
    let mut bits = Vec::with_capacity(text.len());
    for (position, c) in text.chars().enumerate() {
        match c {
            '0' => bits.push(0),
            '1' => bits.push(1),
            ',' | '_' => {}
            c if c.is_whitespace() => {}
            found => return Err(InvalidInput::InvalidBitString { found, position }.into()),
        }
    }
    Ok(bits)
}

/// Renders a bit sequence as a compact string of `0` and `1` characters.
#[must_use]
pub fn format_bits(bits: &[u8]) -> String {
    bits.iter().map(|&b| if b == 0 { '0' } else { '1' }).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::KeystreamError;

    #[test]
    fn test_letter_mapping() {
        assert_eq!(bits5_to_letter(&[0, 0, 0, 0, 0]), 'A');
        assert_eq!(bits5_to_letter(&[0, 1, 1, 0, 1]), 'N');
        assert_eq!(bits5_to_letter(&[1, 1, 0, 0, 1]), 'Z');
        assert_eq!(bits5_to_letter(&[1, 1, 0, 1, 0]), UNREPRESENTABLE);
        assert_eq!(bits5_to_letter(&[1, 1, 1, 1, 1]), UNREPRESENTABLE);
    }

    #[test]
    fn test_short_trailing_group_is_zero_padded() {
        // 11111 -> 31, 00000 -> A, 1 padded to 10000 -> 16 -> Q
        assert_eq!(bits_to_text(&[1, 1, 1, 1, 1, 0, 0, 0, 0, 0, 1]), "?AQ");
    }

    #[test]
    fn test_text_length_is_ceil_of_groups() {
        assert_eq!(bits_to_text(&[]).len(), 0);
        assert_eq!(bits_to_text(&[0; 5]).len(), 1);
        assert_eq!(bits_to_text(&[0; 6]).len(), 2);
        assert_eq!(bits_to_text(&[0; 70]).len(), 14);
    }

    #[test]
    fn test_repeat_to_length_truncates_tail() {
        assert_eq!(
            repeat_to_length(&[1, 0], 5).unwrap(),
            vec![1, 0, 1, 0, 1]
        );
        assert_eq!(repeat_to_length(&[1, 1, 0], 2).unwrap(), vec![1, 1]);
        assert!(matches!(
            repeat_to_length(&[], 5),
            Err(KeystreamError::InvalidInput(InvalidInput::EmptySequence { .. }))
        ));
    }

    #[test]
    fn test_ensure_bits_reports_first_offender() {
        let err = ensure_bits("taps", &[0, 1, 2, 3]).unwrap_err();
        assert_eq!(
            err,
            KeystreamError::InvalidInput(InvalidInput::InvalidBit {
                name: "taps",
                index: 2,
                value: 2,
            })
        );
        assert!(ensure_non_empty("key", &[]).is_err());
        assert!(ensure_non_empty("key", &[1]).is_ok());
    }

    #[test]
    fn test_parse_bits_accepts_separators() {
        assert_eq!(parse_bits("1011").unwrap(), vec![1, 0, 1, 1]);
        assert_eq!(parse_bits("1, 0,1 1").unwrap(), vec![1, 0, 1, 1]);
        assert_eq!(parse_bits("1010_1111").unwrap().len(), 8);
        assert_eq!(
            parse_bits("10x1").unwrap_err(),
            KeystreamError::InvalidInput(InvalidInput::InvalidBitString {
                found: 'x',
                position: 2,
            })
        );
    }

    #[test]
    fn test_format_bits() {
        assert_eq!(format_bits(&[1, 0, 0, 1]), "1001");
    }
}
