//! # Tuning Module
//!
//! An ordered, optionally named set of strings for one instrument.
//!
//! ## Features
//! - Parsing from space-separated note names (`"E4 B3 G3 D3 A2 E2"`)
//! - Positional and membership lookup of strings
//! - Which strings can play a given pitch
//! - Derived tunings: whole tuning up/down a semitone, one string replaced
//! - Equivalence: same strings on the same instrument, ignoring name and category
//!
//! By convention index 0 is the highest (first) string, but the order is
//! whatever the caller supplied and lookups respect it exactly.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::{MusicError, MusicResult};
use crate::guitar_string::GuitarString;
use crate::instrument::Instrument;

/// Instrument used when a tuning is parsed without one.
pub const DEFAULT_INSTRUMENT: Instrument = Instrument::Guitar;

/// Standard guitar tuning, high to low.
pub static STANDARD: Lazy<Tuning> =
    Lazy::new(|| preset("Standard", Instrument::Guitar, Category::Common, "E4 B3 G3 D3 A2 E2"));

/// Standard tuning with the lowest string dropped to D.
pub static DROP_D: Lazy<Tuning> =
    Lazy::new(|| preset("Drop D", Instrument::Guitar, Category::Common, "E4 B3 G3 D3 A2 D2"));

/// Builds a named preset from literal note names.
pub(crate) fn preset(name: &str, instrument: Instrument, category: Category, text: &str) -> Tuning {
    Tuning::from_note_names(Some(name), instrument, Some(category), text)
        .expect("preset tuning text is valid")
}

/// Group a tuning is listed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Category {
    Common,
    Power,
    Open,
    Misc,
}

impl Category {
    /// Every category, in listing order.
    pub const ALL: [Category; 4] = [
        Category::Common,
        Category::Power,
        Category::Open,
        Category::Misc,
    ];

    /// Upper-case identifier used in stored tunings, e.g. `"OPEN"`.
    pub fn key(self) -> &'static str {
        match self {
            Category::Common => "COMMON",
            Category::Power => "POWER",
            Category::Open => "OPEN",
            Category::Misc => "MISC",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Category::Common => "Common",
            Category::Power => "Power",
            Category::Open => "Open",
            Category::Misc => "Miscellaneous",
        })
    }
}

/// Error returned when text names no known category.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown tuning category {0:?}")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.key() == s)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

/// An ordered collection of strings for an instrument.
///
/// `==` compares everything, including name and category. Use
/// [`Tuning::equivalent_to`] to compare only what is played.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tuning {
    name: Option<String>,
    instrument: Instrument,
    category: Option<Category>,
    strings: Vec<GuitarString>,
}

impl Tuning {
    /// Creates a tuning from strings in the given order.
    pub fn new(
        name: Option<String>,
        instrument: Instrument,
        category: Option<Category>,
        strings: Vec<GuitarString>,
    ) -> Self {
        Tuning {
            name,
            instrument,
            category,
            strings,
        }
    }

    /// Creates a tuning with no name or category.
    pub fn unnamed(instrument: Instrument, strings: Vec<GuitarString>) -> Self {
        Self::new(None, instrument, None, strings)
    }

    /// Parses space-separated note names, keeping their order.
    ///
    /// # Errors
    /// * `InvalidTuningString` - if any token is not a note symbol
    pub fn from_note_names(
        name: Option<&str>,
        instrument: Instrument,
        category: Option<Category>,
        text: &str,
    ) -> MusicResult<Self> {
        let strings = text
            .split_whitespace()
            .map(GuitarString::from_note_name)
            .collect::<MusicResult<Vec<_>>>()
            .map_err(|e| MusicError::InvalidTuningString {
                text: text.to_string(),
                source: Box::new(e),
            })?;
        Ok(Self::new(name.map(str::to_string), instrument, category, strings))
    }

    /// The same strings, instrument and category under a different name.
    pub fn with_name(&self, name: Option<String>) -> Self {
        Tuning {
            name,
            ..self.clone()
        }
    }

    pub fn instrument(&self) -> Instrument {
        self.instrument
    }

    pub fn category(&self) -> Option<Category> {
        self.category
    }

    pub fn has_category(&self) -> bool {
        self.category.is_some()
    }

    pub fn has_name(&self) -> bool {
        self.name.is_some()
    }

    /// The preset name if any, as stored.
    pub fn raw_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The name, or the short string display for unnamed tunings.
    pub fn name(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => self.to_string(),
        }
    }

    /// The name followed by the short display, e.g. `"Drop D (DADGBE)"`.
    pub fn full_name(&self) -> String {
        match &self.name {
            Some(name) => format!("{name} ({self})"),
            None => self.to_string(),
        }
    }

    pub fn num_strings(&self) -> usize {
        self.strings.len()
    }

    pub fn strings(&self) -> &[GuitarString] {
        &self.strings
    }

    pub fn iter(&self) -> std::slice::Iter<'_, GuitarString> {
        self.strings.iter()
    }

    /// Returns the string at `index`.
    ///
    /// # Errors
    /// * `IndexOutOfRange` - if there is no such string
    pub fn string_at(&self, index: usize) -> MusicResult<&GuitarString> {
        self.strings.get(index).ok_or(MusicError::IndexOutOfRange {
            index,
            len: self.strings.len(),
        })
    }

    /// Returns the position of the first string equal to `string`.
    ///
    /// # Errors
    /// * `StringNotInTuning` - if no string has that note
    pub fn index_of(&self, string: &GuitarString) -> MusicResult<usize> {
        self.strings
            .iter()
            .position(|s| s == string)
            .ok_or_else(|| MusicError::StringNotInTuning {
                string: string.to_full_string(),
            })
    }

    /// The strings on which `pitch` can be played, in tuning order.
    pub fn strings_containing_pitch(&self, pitch: f64) -> Vec<GuitarString> {
        self.strings
            .iter()
            .filter(|s| s.contains_pitch(pitch))
            .cloned()
            .collect()
    }

    /// The lowest-pitched string, if any.
    pub fn lowest_string(&self) -> Option<&GuitarString> {
        self.strings.iter().min()
    }

    /// The highest-pitched string, if any.
    pub fn highest_string(&self) -> Option<&GuitarString> {
        self.strings.iter().max()
    }

    /// Every string a semitone lower. The result is unnamed and uncategorised.
    pub fn lower_tuning(&self) -> Self {
        Self::unnamed(
            self.instrument,
            self.strings.iter().map(GuitarString::lower_string).collect(),
        )
    }

    /// Every string a semitone higher. The result is unnamed and uncategorised.
    pub fn higher_tuning(&self) -> Self {
        Self::unnamed(
            self.instrument,
            self.strings.iter().map(GuitarString::higher_string).collect(),
        )
    }

    /// A copy with the string at `index` replaced. The result is unnamed and
    /// uncategorised.
    ///
    /// # Errors
    /// * `IndexOutOfRange` - if there is no such string
    pub fn with_string(&self, index: usize, string: GuitarString) -> MusicResult<Self> {
        let mut strings = self.strings.clone();
        let len = strings.len();
        let slot = strings
            .get_mut(index)
            .ok_or(MusicError::IndexOutOfRange { index, len })?;
        *slot = string;
        Ok(Self::unnamed(self.instrument, strings))
    }

    /// Same strings in the same order on the same instrument.
    pub fn equivalent_to(&self, other: &Tuning) -> bool {
        std::ptr::eq(self, other)
            || (self.instrument == other.instrument && self.strings == other.strings)
    }

    /// The first tuning in `tunings` equivalent to this one.
    pub fn find_equivalent_in<'a, I>(&self, tunings: I) -> Option<&'a Tuning>
    where
        I: IntoIterator<Item = &'a Tuning>,
    {
        tunings.into_iter().find(|t| self.equivalent_to(t))
    }

    /// Whether any tuning in `tunings` is equivalent to this one.
    pub fn has_equivalent_in<'a, I>(&self, tunings: I) -> bool
    where
        I: IntoIterator<Item = &'a Tuning>,
    {
        self.find_equivalent_in(tunings).is_some()
    }

    /// Full symbols in storage order, space-separated: `"E4 B3 G3 D3 A2 E2"`.
    ///
    /// This is the text form tunings are stored in; [`Tuning::from_note_names`]
    /// reads it back.
    pub fn to_full_string(&self) -> String {
        self.strings
            .iter()
            .map(GuitarString::to_full_string)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for Tuning {
    /// Short symbols from the last string to the first, e.g. `"EADGBE"`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for string in self.strings.iter().rev() {
            write!(f, "{string}")?;
        }
        Ok(())
    }
}

impl FromStr for Tuning {
    type Err = MusicError;

    /// Parses an unnamed tuning for the default instrument.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tuning::from_note_names(None, DEFAULT_INSTRUMENT, None, s)
    }
}

impl<'a> IntoIterator for &'a Tuning {
    type Item = &'a GuitarString;
    type IntoIter = std::slice::Iter<'a, GuitarString>;

    fn into_iter(self) -> Self::IntoIter {
        self.strings.iter()
    }
}
