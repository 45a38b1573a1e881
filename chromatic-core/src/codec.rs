//! # Codec Module
//!
//! JSON text forms of tuning entries, as kept by the storage layer.
//!
//! An entry is stored as an object with an optional `name`, an `instrument`
//! key (`"GUITAR"`, `"BASS"` or `"chromatic"`), an optional `category` and the
//! `strings` in [`Tuning::to_full_string`] form:
//!
//! ```json
//! {"tunings":[{"name":"Drop D","instrument":"GUITAR","category":"COMMON","strings":"E4 B3 G3 D3 A2 D2"}]}
//! ```
//!
//! This module only converts between text and values; reading and writing
//! the documents is up to the caller.

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::entry::TuningEntry;
use crate::instrument::Instrument;
use crate::tuning::{Category, DEFAULT_INSTRUMENT, Tuning};
use crate::tuning_list::SavedTunings;

const CHROMATIC_KEY: &str = "chromatic";

#[derive(Debug, Serialize, Deserialize)]
struct EntryRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default)]
    instrument: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    strings: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct EntryList {
    tunings: Vec<EntryRecord>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct InitialRecord {
    #[serde(rename = "lastUsed", default, skip_serializing_if = "Option::is_none")]
    last_used: Option<EntryRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    initial: Option<EntryRecord>,
}

/// The three stored documents of a tuning list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedDocuments {
    pub custom: String,
    pub favourites: String,
    pub initial: String,
}

impl EntryRecord {
    fn from_entry(entry: &TuningEntry) -> Self {
        match entry {
            TuningEntry::Chromatic => EntryRecord {
                name: entry.name().map(str::to_string),
                instrument: Some(CHROMATIC_KEY.to_string()),
                category: None,
                strings: None,
            },
            TuningEntry::Instrument(tuning) => EntryRecord {
                name: entry.name().map(str::to_string),
                instrument: Some(tuning.instrument().key().to_string()),
                category: tuning.category().map(|c| c.key().to_string()),
                strings: Some(tuning.to_full_string()),
            },
        }
    }

    fn into_entry(self) -> Result<TuningEntry> {
        let instrument = match self.instrument.as_deref() {
            Some(CHROMATIC_KEY) => return Ok(TuningEntry::Chromatic),
            None => DEFAULT_INSTRUMENT,
            Some(key) => key.parse().unwrap_or_else(|_| {
                warn!(instrument = key, "unknown instrument in stored tuning, using guitar");
                Instrument::Guitar
            }),
        };

        let category = match self.category.as_deref() {
            None | Some("") => None,
            Some(key) => Some(key.parse::<Category>()?),
        };

        let strings = self
            .strings
            .ok_or_else(|| anyhow!("stored tuning has no strings"))?;
        let tuning = Tuning::from_note_names(self.name.as_deref(), instrument, category, &strings)?;
        Ok(TuningEntry::Instrument(tuning))
    }
}

/// Encodes entries as a `{"tunings":[...]}` document.
pub fn encode_entries<'a, I>(entries: I) -> Result<String>
where
    I: IntoIterator<Item = &'a TuningEntry>,
{
    let list = EntryList {
        tunings: entries.into_iter().map(EntryRecord::from_entry).collect(),
    };
    serde_json::to_string(&list).context("Tunings could not be saved")
}

/// Decodes a `{"tunings":[...]}` document, keeping order.
pub fn decode_entries(json: &str) -> Result<Vec<TuningEntry>> {
    let list: EntryList = serde_json::from_str(json).context("Tunings could not be loaded")?;
    list.tunings
        .into_iter()
        .enumerate()
        .map(|(i, record)| {
            record
                .into_entry()
                .with_context(|| format!("Tunings could not be loaded: entry {i}"))
        })
        .collect()
}

/// Encodes custom tunings in the entry document form.
pub fn encode_custom(tunings: &[Tuning]) -> Result<String> {
    let entries: Vec<TuningEntry> = tunings.iter().cloned().map(TuningEntry::Instrument).collect();
    encode_entries(&entries)
}

/// Decodes custom tunings; chromatic entries are skipped.
pub fn decode_custom(json: &str) -> Result<Vec<Tuning>> {
    Ok(decode_entries(json)?
        .into_iter()
        .filter_map(|entry| match entry {
            TuningEntry::Instrument(tuning) => Some(tuning),
            TuningEntry::Chromatic => None,
        })
        .collect())
}

/// Encodes the last used and pinned entries.
pub fn encode_initial(
    last_used: Option<&TuningEntry>,
    initial: Option<&TuningEntry>,
) -> Result<String> {
    let record = InitialRecord {
        last_used: last_used.map(EntryRecord::from_entry),
        initial: initial.map(EntryRecord::from_entry),
    };
    serde_json::to_string(&record).context("Tunings could not be saved")
}

/// Decodes the last used and pinned entries.
pub fn decode_initial(json: &str) -> Result<(Option<TuningEntry>, Option<TuningEntry>)> {
    let record: InitialRecord = serde_json::from_str(json).context("Tunings could not be loaded")?;
    let last_used = record.last_used.map(EntryRecord::into_entry).transpose()?;
    let initial = record.initial.map(EntryRecord::into_entry).transpose()?;
    Ok((last_used, initial))
}

/// Encodes a tuning list's saved state.
pub fn encode_saved(saved: &SavedTunings) -> Result<SavedDocuments> {
    Ok(SavedDocuments {
        custom: encode_custom(&saved.custom)?,
        favourites: encode_entries(&saved.favourites)?,
        initial: encode_initial(saved.last_used.as_ref(), saved.pinned.as_ref())?,
    })
}

/// Decodes a tuning list's saved state.
///
/// A missing document (`None`) falls back to the defaults: no custom
/// tunings, standard and chromatic as favourites, nothing last used or pinned.
pub fn decode_saved(
    custom: Option<&str>,
    favourites: Option<&str>,
    initial: Option<&str>,
) -> Result<SavedTunings> {
    let mut saved = SavedTunings::default();
    if let Some(json) = custom {
        saved.custom = decode_custom(json)?;
    }
    if let Some(json) = favourites {
        saved.favourites = decode_entries(json)?;
    }
    if let Some(json) = initial {
        (saved.last_used, saved.pinned) = decode_initial(json)?;
    }
    Ok(saved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::{DROP_D, STANDARD};

    #[test]
    fn test_entry_document_shape() {
        let entries = [TuningEntry::Instrument(DROP_D.clone()), TuningEntry::Chromatic];
        let json = encode_entries(&entries).unwrap();
        assert_eq!(
            json,
            r#"{"tunings":[{"name":"Drop D","instrument":"GUITAR","category":"COMMON","strings":"E4 B3 G3 D3 A2 D2"},{"name":"Chromatic","instrument":"chromatic"}]}"#
        );
    }

    #[test]
    fn test_entries_decode_exactly() {
        let bass = Tuning::from_note_names(None, Instrument::Bass, None, "G2 D2 A1 D#1").unwrap();
        let entries = vec![
            TuningEntry::Instrument(STANDARD.clone()),
            TuningEntry::Chromatic,
            TuningEntry::Instrument(bass),
        ];
        let decoded = decode_entries(&encode_entries(&entries).unwrap()).unwrap();
        assert_eq!(decoded, entries);
    }

    #[test]
    fn test_lenient_fields() {
        let json = r#"{"tunings":[
            {"strings":"E4 B3 G3 D3 A2 E2"},
            {"name":"Odd","instrument":"banjo","category":"","strings":"D4 G3 D3 G2"}
        ]}"#;
        let decoded = decode_entries(json).unwrap();
        let first = decoded[0].tuning().unwrap();
        assert!(first.equivalent_to(&STANDARD));
        assert!(!first.has_name());
        let second = decoded[1].tuning().unwrap();
        assert_eq!(second.instrument(), Instrument::Guitar);
        assert_eq!(second.category(), None);
        assert_eq!(second.raw_name(), Some("Odd"));
    }

    #[test]
    fn test_rejects_bad_documents() {
        assert!(decode_entries("not json").is_err());
        assert!(decode_entries(r#"{"tunings":[{"instrument":"GUITAR"}]}"#).is_err());
        assert!(decode_entries(r#"{"tunings":[{"strings":"E4 Z9"}]}"#).is_err());
        assert!(decode_entries(r#"{"tunings":[{"category":"NOPE","strings":"E4"}]}"#).is_err());
    }

    #[test]
    fn test_initial_document() {
        let chromatic = TuningEntry::Chromatic;
        let json = encode_initial(Some(&chromatic), None).unwrap();
        assert_eq!(json, r#"{"lastUsed":{"name":"Chromatic","instrument":"chromatic"}}"#);
        assert_eq!(decode_initial(&json).unwrap(), (Some(TuningEntry::Chromatic), None));
        assert_eq!(decode_initial("{}").unwrap(), (None, None));
    }

    #[test]
    fn test_saved_state() {
        let custom = STANDARD.lower_tuning().with_name(Some("Eb".to_string()));
        let saved = SavedTunings {
            custom: vec![custom.clone()],
            favourites: vec![TuningEntry::Instrument(custom)],
            last_used: Some(TuningEntry::Instrument(DROP_D.clone())),
            pinned: Some(TuningEntry::Chromatic),
        };
        let docs = encode_saved(&saved).unwrap();
        let back =
            decode_saved(Some(&docs.custom), Some(&docs.favourites), Some(&docs.initial)).unwrap();
        assert_eq!(back, saved);

        assert_eq!(decode_saved(None, None, None).unwrap(), SavedTunings::default());
    }
}
