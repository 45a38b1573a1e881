//! # Guitar String Module
//!
//! An immutable, tuned string: its open note plus the 24 frets above it.
//! Strings are handed out by a process-wide cache keyed by note name, so asking
//! for the same name twice yields the same shared value.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::FusedIterator;
use std::sync::{Arc, Mutex, PoisonError};

use once_cell::sync::Lazy;
use tracing::debug;

use crate::error::{MusicError, MusicResult};
use crate::notes;

/// Highest fret on a string. Frets run from 0 (open) to this value inclusive.
pub const FRETS: i32 = 24;

/// Every string ever requested, keyed by the note name it was requested with.
///
/// Entries are only ever added; the key space is a few dozen note names.
static CACHE: Lazy<Mutex<HashMap<String, GuitarString>>> = Lazy::new(|| Mutex::new(HashMap::new()));

struct StringData {
    root: &'static str,
    octave: i32,
    root_note_index: i32,
}

/// A string tuned to a root note.
///
/// Cloning is cheap and keeps identity: clones share the cached value.
/// Equality, ordering and hashing use the root note index only, so a string
/// sorts below any higher-pitched one.
#[derive(Clone)]
pub struct GuitarString(Arc<StringData>);

impl GuitarString {
    /// Returns the cached string for a note name such as `"E2"`.
    ///
    /// # Errors
    /// * `InvalidNoteSymbol` - if the name does not parse
    pub fn from_note_name(name: &str) -> MusicResult<Self> {
        let mut cache = CACHE.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(string) = cache.get(name) {
            return Ok(string.clone());
        }

        let index = notes::index_from_symbol(name)?;
        let string = Self::build(index);
        debug!(symbol = name, index, "caching new guitar string");
        cache.insert(name.to_string(), string.clone());
        Ok(string)
    }

    /// Cached lookup for an index whose symbol is already known to be canonical.
    fn from_index(index: i32) -> Self {
        let symbol = notes::symbol_from_index(index);
        let mut cache = CACHE.lock().unwrap_or_else(PoisonError::into_inner);
        cache
            .entry(symbol)
            .or_insert_with_key(|symbol| {
                debug!(symbol = symbol.as_str(), index, "caching new guitar string");
                Self::build(index)
            })
            .clone()
    }

    fn build(root_note_index: i32) -> Self {
        GuitarString(Arc::new(StringData {
            root: notes::root_from_index(root_note_index),
            octave: notes::octave_from_index(root_note_index),
            root_note_index,
        }))
    }

    /// Whether two handles point at the same cached string.
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }

    /// Letter part of the open note, e.g. `"E"`.
    pub fn root(&self) -> &'static str {
        self.0.root
    }

    /// Octave of the open note.
    pub fn octave(&self) -> i32 {
        self.0.octave
    }

    /// Note index of the open string.
    pub fn root_note_index(&self) -> i32 {
        self.0.root_note_index
    }

    /// Pitch of the open string in Hz.
    pub fn root_pitch(&self) -> f64 {
        notes::pitch_from_index(self.0.root_note_index)
    }

    /// Symbol with octave, e.g. `"E2"`.
    pub fn to_full_string(&self) -> String {
        format!("{}{}", self.0.root, self.0.octave)
    }

    /// Returns the fret at which the nearest note to `pitch` is played.
    ///
    /// # Errors
    /// * `InvalidPitch` - if the pitch is not positive
    /// * `NoteNotOnString` - if that note lies outside frets `0..=24`
    pub fn fret_for_pitch(&self, pitch: f64) -> MusicResult<i32> {
        let fret = notes::index_from_pitch(pitch)? - self.0.root_note_index;
        if valid_fret(fret) {
            Ok(fret)
        } else {
            Err(MusicError::NoteNotOnString {
                string: self.to_full_string(),
                pitch,
            })
        }
    }

    /// Returns the pitch played at `fret`.
    ///
    /// # Errors
    /// * `FretOutOfRange` - if the fret is outside `0..=24`
    pub fn pitch_for_fret(&self, fret: i32) -> MusicResult<f64> {
        self.note_index(fret).map(notes::pitch_from_index)
    }

    /// Returns the note index played at `fret`.
    ///
    /// # Errors
    /// * `FretOutOfRange` - if the fret is outside `0..=24`
    pub fn note_index(&self, fret: i32) -> MusicResult<i32> {
        if valid_fret(fret) {
            Ok(self.0.root_note_index + fret)
        } else {
            Err(MusicError::FretOutOfRange { fret })
        }
    }

    /// Whether the nearest note to `pitch` can be played on this string.
    ///
    /// Never fails; an invalid pitch is simply not on the string.
    pub fn contains_pitch(&self, pitch: f64) -> bool {
        self.fret_for_pitch(pitch).is_ok()
    }

    /// The string tuned one semitone lower.
    pub fn lower_string(&self) -> Self {
        Self::from_index(self.0.root_note_index - 1)
    }

    /// The string tuned one semitone higher.
    pub fn higher_string(&self) -> Self {
        Self::from_index(self.0.root_note_index + 1)
    }

    /// Pitches of frets 0 to 24 in order.
    pub fn pitches(&self) -> Pitches {
        Pitches {
            root_note_index: self.0.root_note_index,
            fret: 0,
        }
    }
}

/// Whether a fret lies on a string.
pub fn valid_fret(fret: i32) -> bool {
    (0..=FRETS).contains(&fret)
}

impl PartialEq for GuitarString {
    fn eq(&self, other: &Self) -> bool {
        self.0.root_note_index == other.0.root_note_index
    }
}

impl Eq for GuitarString {}

impl Hash for GuitarString {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.root_note_index.hash(state);
    }
}

impl PartialOrd for GuitarString {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for GuitarString {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.root_note_index.cmp(&other.0.root_note_index)
    }
}

impl fmt::Display for GuitarString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.root)
    }
}

impl fmt::Debug for GuitarString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GuitarString({}{})", self.0.root, self.0.octave)
    }
}

impl<'a> IntoIterator for &'a GuitarString {
    type Item = f64;
    type IntoIter = Pitches;

    fn into_iter(self) -> Pitches {
        self.pitches()
    }
}

/// Iterator over the fret pitches of a string.
///
/// Each call to [`GuitarString::pitches`] starts a fresh traversal.
#[derive(Debug, Clone)]
pub struct Pitches {
    root_note_index: i32,
    fret: i32,
}

impl Iterator for Pitches {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        if self.fret > FRETS {
            return None;
        }
        let pitch = notes::pitch_from_index(self.root_note_index + self.fret);
        self.fret += 1;
        Some(pitch)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = (FRETS + 1 - self.fret).max(0) as usize;
        (left, Some(left))
    }
}

impl ExactSizeIterator for Pitches {}

impl FusedIterator for Pitches {}
