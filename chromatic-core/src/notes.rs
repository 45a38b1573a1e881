//! # Notes Module
//!
//! Stateless 12-tone equal temperament math. A note is identified by its
//! *note index*: the signed number of semitones from A4. Every pitched type in
//! this crate compares, orders and hashes by that index.
//!
//! ## Features
//! - Pitch (Hz) to note index and back, against any A4 reference pitch
//! - Note index to note symbol ("E2", "C#4", "A#-1") and back
//! - Cent deviation between two pitches

use crate::error::{MusicError, MusicResult};

/// Reference pitch of A4 in Hz.
pub const DEFAULT_A4_PITCH: f64 = 440.0;

/// MIDI note number of A4 (note index 0).
pub const A4_MIDI_NOTE_NUMBER: i32 = 69;

/// The twelve note symbols, rooted at C.
pub const NOTE_SYMBOLS: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Highest note index whose pitch stays finite against 440 Hz.
///
/// Past it the pitch overflows `f64` and becomes infinite.
pub const MAX_PITCHED_INDEX: i32 = 12_182;

/// Lowest note index whose `2^(n/12)` factor is still a normal `f64`.
///
/// Below it the factor goes subnormal and then to zero, and the pitch no
/// longer quantizes back to the same index.
pub const MIN_PITCHED_INDEX: i32 = -12_264;

/// Slot of A in [`NOTE_SYMBOLS`]. The table is C-rooted while note indices are
/// A-rooted, so symbol lookups shift the index by this amount.
const A_SLOT: i32 = 9;

/// Calculates the pitch of a note index against the default 440 Hz reference.
pub fn pitch_from_index(index: i32) -> f64 {
    pitch_from_index_with(index, DEFAULT_A4_PITCH)
}

/// Calculates the pitch of a note index in equal temperament.
///
/// The formula is `f = a4 * 2^(n/12)` where `n` is the number of semitones away
/// from A4.
///
/// The result only round-trips through [`index_from_pitch_with`] for indices in
/// [`MIN_PITCHED_INDEX`]`..=`[`MAX_PITCHED_INDEX`] (for a reference near 440 Hz).
/// Further out the pitch overflows to infinity or underflows to zero, and
/// quantizing it gives `InvalidPitch`.
pub fn pitch_from_index_with(index: i32, a4_pitch: f64) -> f64 {
    a4_pitch * 2.0_f64.powf(f64::from(index) / 12.0)
}

/// Continuous semitone offset of a pitch from A4 (440 Hz).
pub fn offset_from_a4(pitch: f64) -> MusicResult<f64> {
    offset_from_a4_with(pitch, DEFAULT_A4_PITCH)
}

/// Continuous semitone offset of a pitch from the given A4 reference.
///
/// # Errors
/// * `InvalidPitch` - if either pitch is not a positive, finite number
pub fn offset_from_a4_with(pitch: f64, a4_pitch: f64) -> MusicResult<f64> {
    check_pitch(pitch)?;
    check_pitch(a4_pitch)?;
    Ok(12.0 * (pitch / a4_pitch).log2())
}

/// Nearest note index of a pitch against the default 440 Hz reference.
pub fn index_from_pitch(pitch: f64) -> MusicResult<i32> {
    index_from_pitch_with(pitch, DEFAULT_A4_PITCH)
}

/// Quantizes a pitch to the nearest note index.
///
/// Ties round half away from zero. Every pitch produced by
/// [`pitch_from_index_with`] for an index in
/// [`MIN_PITCHED_INDEX`]`..=`[`MAX_PITCHED_INDEX`] maps back to that index.
///
/// # Errors
/// * `InvalidPitch` - if either pitch is not a positive, finite number
pub fn index_from_pitch_with(pitch: f64, a4_pitch: f64) -> MusicResult<i32> {
    offset_from_a4_with(pitch, a4_pitch).map(|offset| offset.round() as i32)
}

/// Calculates the deviation of `pitch` from `target` in cents.
///
/// 100 cents is one semitone. Positive values are sharp, negative are flat.
///
/// # Errors
/// * `InvalidPitch` - if either pitch is not a positive, finite number
pub fn cents_between(pitch: f64, target: f64) -> MusicResult<f64> {
    check_pitch(pitch)?;
    check_pitch(target)?;
    Ok(1200.0 * (pitch / target).log2())
}

/// MIDI note number of a note index.
pub fn midi_note_from_index(index: i32) -> i32 {
    index + A4_MIDI_NOTE_NUMBER
}

/// Renders a note index as a symbol such as `"E2"` or `"A#-1"`.
pub fn symbol_from_index(index: i32) -> String {
    format!("{}{}", root_from_index(index), octave_from_index(index))
}

/// The letter part of a note index's symbol, e.g. `"F#"`.
pub fn root_from_index(index: i32) -> &'static str {
    NOTE_SYMBOLS[(index + A_SLOT).rem_euclid(12) as usize]
}

/// The octave number of a note index; octaves change at C.
pub fn octave_from_index(index: i32) -> i32 {
    4 + (index + A_SLOT).div_euclid(12)
}

/// Parses a note symbol into its note index.
///
/// A symbol is one of the twelve [`NOTE_SYMBOLS`] followed by a single octave
/// digit, which may carry a leading minus sign (`"A#-1"`). `-0` is not a valid
/// octave.
///
/// # Errors
/// * `InvalidNoteSymbol` - wrong length, unknown letter or accidental, or a
///   missing octave digit
pub fn index_from_symbol(symbol: &str) -> MusicResult<i32> {
    let (root, octave) = split_symbol(symbol)?;
    let offset = offset_within_octave(root).ok_or_else(|| invalid_symbol(symbol))?;
    Ok((octave - 4) * 12 + offset)
}

/// Returns the letter part of a note symbol, e.g. `"C#"` for `"C#3"`.
///
/// # Errors
/// * `InvalidNoteSymbol` - if the symbol has no octave digit
pub fn root_note(symbol: &str) -> MusicResult<&str> {
    split_symbol(symbol).map(|(root, _)| root)
}

/// Returns the octave part of a note symbol, e.g. `3` for `"C#3"`.
///
/// # Errors
/// * `InvalidNoteSymbol` - if the symbol has no octave digit
pub fn octave(symbol: &str) -> MusicResult<i32> {
    split_symbol(symbol).map(|(_, octave)| octave)
}

fn split_symbol(symbol: &str) -> MusicResult<(&str, i32)> {
    if !symbol.is_ascii() || !(2..=4).contains(&symbol.len()) {
        return Err(invalid_symbol(symbol));
    }

    let (body, last) = symbol.split_at(symbol.len() - 1);
    let digit = last
        .chars()
        .next()
        .and_then(|c| c.to_digit(10))
        .ok_or_else(|| invalid_symbol(symbol))? as i32;

    let (root, octave) = match body.strip_suffix('-') {
        Some(_) if digit == 0 => return Err(invalid_symbol(symbol)),
        Some(root) => (root, -digit),
        None => (body, digit),
    };
    if root.is_empty() {
        return Err(invalid_symbol(symbol));
    }
    Ok((root, octave))
}

fn offset_within_octave(root: &str) -> Option<i32> {
    NOTE_SYMBOLS
        .iter()
        .position(|&s| s == root)
        .map(|slot| slot as i32 - A_SLOT)
}

fn check_pitch(pitch: f64) -> MusicResult<()> {
    if pitch.is_finite() && pitch > 0.0 {
        Ok(())
    } else {
        Err(MusicError::InvalidPitch { pitch })
    }
}

fn invalid_symbol(symbol: &str) -> MusicError {
    MusicError::InvalidNoteSymbol {
        symbol: symbol.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_symbol_round_trip() {
        for i in -60..=60 {
            let symbol = symbol_from_index(i);
            assert_eq!(index_from_symbol(&symbol), Ok(i), "symbol {symbol}");
        }
    }

    #[test]
    fn test_pitch_round_trip() {
        for i in -400..=400 {
            assert_eq!(index_from_pitch(pitch_from_index(i)), Ok(i));
        }
        for i in [-60, 0, 27] {
            assert_eq!(index_from_pitch_with(pitch_from_index_with(i, 432.0), 432.0), Ok(i));
        }
    }

    #[test]
    fn test_pitch_round_trip_at_domain_edges() {
        let edges = [
            MIN_PITCHED_INDEX,
            MIN_PITCHED_INDEX + 1,
            MAX_PITCHED_INDEX - 1,
            MAX_PITCHED_INDEX,
        ];
        for i in edges {
            assert_eq!(index_from_pitch(pitch_from_index(i)), Ok(i), "index {i}");
        }
        assert!(pitch_from_index(13_000).is_infinite());
        assert!(index_from_pitch(pitch_from_index(13_000)).is_err());
        assert_eq!(pitch_from_index(-14_000), 0.0);
        assert!(index_from_pitch(pitch_from_index(-14_000)).is_err());
    }

    #[test]
    fn test_known_symbols() {
        assert_eq!(symbol_from_index(0), "A4");
        assert_eq!(symbol_from_index(3), "C5");
        assert_eq!(symbol_from_index(-29), "E2");
        assert_eq!(symbol_from_index(-30), "D#2");
        assert_eq!(symbol_from_index(-60), "A-1");
        assert_eq!(index_from_symbol("E4"), Ok(-5));
        assert_eq!(index_from_symbol("C4"), Ok(-9));
        assert_eq!(index_from_symbol("B3"), Ok(-10));
    }

    #[test]
    fn test_pitch_values() {
        assert_approx_eq!(pitch_from_index(0), 440.0);
        assert_approx_eq!(pitch_from_index(12), 880.0);
        assert_approx_eq!(pitch_from_index(-5), 329.627_556_9, 1e-6);
        assert_approx_eq!(pitch_from_index_with(0, 432.0), 432.0);
    }

    #[test]
    fn test_quantization_rounds_to_nearest() {
        // A quarter tone above A4 is 0.5 semitones; ties round away from zero.
        let quarter_sharp = 440.0 * 2.0_f64.powf(0.49 / 12.0);
        assert_eq!(index_from_pitch(quarter_sharp), Ok(0));
        assert_eq!(index_from_pitch(446.0), Ok(0));
        assert_eq!(index_from_pitch(460.0), Ok(1));
        assert_eq!(index_from_pitch(110.0), Ok(-24));
        assert_eq!(index_from_pitch(7040.0), Ok(48));
    }

    #[test]
    fn test_non_positive_pitch_is_rejected() {
        assert_eq!(
            index_from_pitch(0.0),
            Err(MusicError::InvalidPitch { pitch: 0.0 })
        );
        assert!(index_from_pitch(-440.0).is_err());
        assert!(index_from_pitch(f64::NAN).is_err());
        assert!(offset_from_a4_with(440.0, 0.0).is_err());
    }

    #[test]
    fn test_malformed_symbols() {
        let malformed = [
            "Z9", "E", "", "H4", "E#4", "Eb4", "C#10", "A#-12", "C-", "4", "-1", "é4", "C#-0",
        ];
        for bad in malformed {
            assert!(
                matches!(index_from_symbol(bad), Err(MusicError::InvalidNoteSymbol { .. })),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_symbol_parts() {
        assert_eq!(root_note("C#3"), Ok("C#"));
        assert_eq!(octave("C#3"), Ok(3));
        assert_eq!(root_note("A#-1"), Ok("A#"));
        assert_eq!(octave("A#-1"), Ok(-1));
    }

    #[test]
    fn test_cents() {
        assert_approx_eq!(cents_between(880.0, 440.0).unwrap(), 1200.0);
        assert_approx_eq!(cents_between(pitch_from_index(1), 440.0).unwrap(), 100.0, 1e-9);
        assert!(cents_between(-1.0, 440.0).is_err());
        assert_approx_eq!(offset_from_a4(220.0).unwrap(), -12.0);
    }

    #[test]
    fn test_midi_note() {
        assert_eq!(midi_note_from_index(0), 69);
        assert_eq!(midi_note_from_index(index_from_symbol("C4").unwrap()), 60);
    }
}
