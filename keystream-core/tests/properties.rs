#![allow(missing_docs)]
use keystream_core::{bits, lfsr, search};
use keystream_core::dictionary::Dictionary;
use rand::Rng;

/// Tap sets giving a maximal period for widths 2 through 10.
const MAXIMAL_TAPS: [(usize, &[usize]); 9] = [
    (2, &[0, 1]),
    (3, &[0, 2]),
    (4, &[0, 3]),
    (5, &[1, 4]),
    (6, &[0, 5]),
    (7, &[0, 6]),
    (8, &[0, 1, 6, 7]),
    (9, &[3, 8]),
    (10, &[2, 9]),
];

fn random_bits(rng: &mut impl Rng, len: usize) -> Vec<u8> {
    (0..len).map(|_| u8::from(rng.random::<bool>())).collect()
}

#[test]
fn test_all_zero_state_terminates_immediately() {
    let mut rng = rand::rng();
    for width in 1..=16 {
        let taps: Vec<usize> = (0..rng.random_range(1..=width))
            .map(|_| rng.random_range(0..width))
            .collect();
        let run = lfsr::generate(&vec![0; width], &taps, 8).unwrap();
        assert_eq!(run.period, Some(1), "width {width}, taps {taps:?}");
        assert_eq!(run.outputs, vec![0]);
        assert_eq!(run.states.len(), 1);
    }
}

#[test]
fn test_maximal_taps_reach_full_period() {
    let mut rng = rand::rng();
    for (width, taps) in MAXIMAL_TAPS {
        let mut state = random_bits(&mut rng, width);
        if state.iter().all(|&b| b == 0) {
            state[0] = 1;
        }
        let run = lfsr::generate(&state, taps, lfsr::DEFAULT_MAX_STEPS).unwrap();
        let expected = usize::try_from(lfsr::theoretical_period(width).unwrap()).unwrap();
        assert_eq!(run.period, Some(expected), "width {width}");
        assert_eq!(run.outputs.len(), expected);
        assert_eq!(run.states.len(), expected);
    }
}

#[test]
fn test_step_budget_is_never_exceeded() {
    let mut rng = rand::rng();
    for _ in 0..32 {
        let budget = rng.random_range(0..40);
        let run = lfsr::generate(&[0, 0, 0, 0, 0, 0, 0, 0, 0, 1], &[2, 9], budget).unwrap();
        assert!(run.outputs.len() <= budget);
        assert_eq!(run.period, None);
    }
}

#[test]
fn test_xor_with_expanded_key_is_self_inverse() {
    let mut rng = rand::rng();
    for _ in 0..64 {
        let plain_len = rng.random_range(1..200);
        let key_len = rng.random_range(1..20);
        let plain = random_bits(&mut rng, plain_len);
        let key = random_bits(&mut rng, key_len);
        let expanded = bits::repeat_to_length(&key, plain.len()).unwrap();
        let cipher = bits::xor(&plain, &expanded);
        assert_eq!(bits::xor(&cipher, &expanded), plain);
    }
}

#[test]
fn test_bits_to_text_is_deterministic() {
    let mut rng = rand::rng();
    let stream = random_bits(&mut rng, 73);
    let first = bits::bits_to_text(&stream);
    assert_eq!(first, bits::bits_to_text(&stream));
    assert_eq!(first.chars().count(), 15);
}

#[test]
fn test_search_recovers_encrypting_key() {
    // "BONJOUR" as 5-bit letters, encrypted with a 7-bit key.
    let plain: Vec<u8> = "BONJOUR"
        .bytes()
        .flat_map(|c| {
            let v = c - b'A';
            (0..5).rev().map(move |i| (v >> i) & 1)
        })
        .collect();
    let key = vec![1, 0, 1, 1, 0, 0, 1];
    let cipher = bits::xor(&plain, &bits::repeat_to_length(&key, plain.len()).unwrap());

    let keys = vec![vec![0, 1, 1], key.clone(), vec![1, 1, 1, 1]];
    let outcome = search::search(&cipher, &keys, &Dictionary::french()).unwrap();
    assert_eq!(outcome.best.key_index, Some(2));
    assert_eq!(outcome.best.decoded_text, "BONJOUR");
    assert_eq!(outcome.per_key[1].key, key);
}
