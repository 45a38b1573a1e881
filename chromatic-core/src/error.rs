//! Error types for the music-theory engine.

use thiserror::Error;

/// Result type for note, string and tuning operations.
pub type MusicResult<T> = Result<T, MusicError>;

/// Errors raised when a pitch, position or name falls outside the modeled domain.
///
/// None of these are fatal. Each one is reported straight to the caller; the
/// only place that swallows one is [`GuitarString::contains_pitch`], which
/// turns `NoteNotOnString` into `false`.
///
/// [`GuitarString::contains_pitch`]: crate::guitar_string::GuitarString::contains_pitch
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MusicError {
    /// A non-positive (or non-finite) pitch was given to a log-based conversion.
    #[error("invalid pitch: {pitch} Hz")]
    InvalidPitch {
        /// The rejected pitch.
        pitch: f64,
    },

    /// Malformed note-name text.
    #[error("invalid note symbol: {symbol:?}")]
    InvalidNoteSymbol {
        /// The rejected symbol.
        symbol: String,
    },

    /// A token of a space-separated tuning string is not a note symbol.
    #[error("invalid tuning string {text:?}: {source}")]
    InvalidTuningString {
        /// The full tuning text.
        text: String,
        /// Why the offending token failed.
        #[source]
        source: Box<MusicError>,
    },

    /// A fret outside `0..=24` was requested from a string.
    #[error("fret {fret} is not on the string")]
    FretOutOfRange {
        /// The requested fret.
        fret: i32,
    },

    /// The nearest note of a pitch is not playable on the string.
    #[error("string {string} does not contain a note with pitch {pitch} Hz")]
    NoteNotOnString {
        /// Full symbol of the string.
        string: String,
        /// The pitch that was looked up.
        pitch: f64,
    },

    /// Positional access past the end of a tuning.
    #[error("string index {index} out of range for a tuning of {len} strings")]
    IndexOutOfRange {
        /// The requested index.
        index: usize,
        /// Number of strings in the tuning.
        len: usize,
    },

    /// Membership lookup of a string the tuning does not contain.
    #[error("string {string} is not present in this tuning")]
    StringNotInTuning {
        /// Full symbol of the missing string.
        string: String,
    },

    /// A note index outside the tuner's playable range.
    #[error("note index {index} outside the range {lowest}..={highest}")]
    NoteOutOfRange {
        /// The requested note index.
        index: i32,
        /// Lowest allowed note index.
        lowest: i32,
        /// Highest allowed note index.
        highest: i32,
    },

    /// A tuned offset threshold that no reading could ever fall within.
    #[error("invalid tuned offset threshold: {threshold} semitones")]
    InvalidThreshold {
        /// The rejected threshold.
        threshold: f64,
    },

    /// An instrument/category filter pair that matches no preset.
    #[error("{instrument} and {category} are not compatible filters")]
    IncompatibleFilter {
        /// Display name of the instrument filter.
        instrument: String,
        /// Display name of the category filter.
        category: String,
    },
}
