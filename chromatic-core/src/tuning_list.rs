//! # Tuning List Module
//!
//! The user's view of available tunings: the current selection, favourites,
//! custom tunings, the pinned (startup) tuning, and the instrument/category
//! filters applied to the preset library.
//!
//! Saving and loading is left to the caller; [`TuningList::snapshot`] and
//! [`TuningList::load`] exchange plain [`SavedTunings`] values, which the
//! `codec` module turns into text.

use tracing::debug;

use crate::entry::TuningEntry;
use crate::error::{MusicError, MusicResult};
use crate::instrument::Instrument;
use crate::presets::{self, GroupedTunings, TUNINGS};
use crate::tuning::{Category, STANDARD, Tuning};

/// Tuning list state that outlives a session.
#[derive(Debug, Clone, PartialEq)]
pub struct SavedTunings {
    pub custom: Vec<Tuning>,
    pub favourites: Vec<TuningEntry>,
    pub last_used: Option<TuningEntry>,
    pub pinned: Option<TuningEntry>,
}

impl Default for SavedTunings {
    fn default() -> Self {
        SavedTunings {
            custom: Vec::new(),
            favourites: default_favourites(),
            last_used: None,
            pinned: None,
        }
    }
}

fn default_favourites() -> Vec<TuningEntry> {
    vec![TuningEntry::Instrument(STANDARD.clone()), TuningEntry::Chromatic]
}

#[derive(Debug, Clone)]
pub struct TuningList {
    current: Option<TuningEntry>,
    /// Insertion ordered, no duplicates.
    favourites: Vec<TuningEntry>,
    /// Insertion ordered, no duplicates.
    custom: Vec<Tuning>,
    pinned: TuningEntry,
    last_used: Option<TuningEntry>,
    instrument_filter: Option<Instrument>,
    category_filter: Option<Category>,
    loaded: bool,
}

impl Default for TuningList {
    fn default() -> Self {
        Self::new(None)
    }
}

impl TuningList {
    pub fn new(initial_current: Option<Tuning>) -> Self {
        TuningList {
            current: initial_current.map(TuningEntry::Instrument),
            favourites: default_favourites(),
            custom: Vec::new(),
            pinned: TuningEntry::Instrument(STANDARD.clone()),
            last_used: None,
            instrument_filter: None,
            category_filter: None,
            loaded: false,
        }
    }

    pub fn current(&self) -> Option<&TuningEntry> {
        self.current.as_ref()
    }

    pub fn favourites(&self) -> &[TuningEntry] {
        &self.favourites
    }

    pub fn custom(&self) -> &[Tuning] {
        &self.custom
    }

    pub fn pinned(&self) -> &TuningEntry {
        &self.pinned
    }

    /// The entry in use when the list was last saved.
    pub fn last_used(&self) -> Option<&TuningEntry> {
        self.last_used.as_ref()
    }

    pub fn instrument_filter(&self) -> Option<Instrument> {
        self.instrument_filter
    }

    pub fn category_filter(&self) -> Option<Category> {
        self.category_filter
    }

    /// Installs saved state. Only the first call has an effect.
    ///
    /// Returns whether the state was installed.
    pub fn load(&mut self, saved: SavedTunings) -> bool {
        if self.loaded {
            return false;
        }
        self.custom = dedup(saved.custom);
        self.favourites = dedup(saved.favourites);
        self.last_used = saved.last_used;
        if let Some(pinned) = saved.pinned {
            self.pinned = pinned;
        }
        self.loaded = true;
        debug!(
            custom = self.custom.len(),
            favourites = self.favourites.len(),
            "loaded tuning list"
        );
        true
    }

    /// State to save: the current entry is stored as the last used one.
    pub fn snapshot(&self) -> SavedTunings {
        SavedTunings {
            custom: self.custom.clone(),
            favourites: self.favourites.clone(),
            last_used: self.current.clone(),
            pinned: Some(self.pinned.clone()),
        }
    }

    /// Custom tunings followed by the presets.
    fn known_tunings(&self) -> impl Iterator<Item = &Tuning> {
        self.custom.iter().chain(TUNINGS.iter())
    }

    /// Selects an entry. An unnamed tuning is replaced by an equivalent custom
    /// or preset tuning when one exists.
    pub fn set_current(&mut self, entry: TuningEntry) {
        let entry = match entry {
            TuningEntry::Instrument(tuning) if !tuning.has_name() => {
                match tuning.find_equivalent_in(self.known_tunings()) {
                    Some(known) => TuningEntry::Instrument(known.clone()),
                    None => TuningEntry::Instrument(tuning),
                }
            }
            other => other,
        };
        self.current = Some(entry);
    }

    pub fn set_favourited(&mut self, entry: TuningEntry, favourite: bool) {
        if favourite {
            if !self.favourites.contains(&entry) {
                self.favourites.push(entry);
            }
        } else {
            self.favourites.retain(|e| *e != entry);
        }
    }

    /// Tunings among the favourites.
    pub fn instrument_favourites(&self) -> impl Iterator<Item = &Tuning> {
        self.favourites.iter().filter_map(TuningEntry::tuning)
    }

    /// Whether the entry, or a tuning equivalent to it, is a favourite.
    pub fn is_favourite(&self, entry: &TuningEntry) -> bool {
        match entry {
            TuningEntry::Chromatic => self.favourites.contains(entry),
            TuningEntry::Instrument(tuning) => {
                tuning.has_equivalent_in(self.instrument_favourites())
            }
        }
    }

    /// Saves `tuning` as a custom tuning called `name`.
    ///
    /// The current and pinned entries switch to the saved copy if they are
    /// equivalent to it.
    pub fn add_custom(&mut self, name: Option<String>, tuning: &Tuning) -> Tuning {
        let saved = tuning.with_name(name);
        if !self.custom.contains(&saved) {
            self.custom.push(saved.clone());
        }
        if self.current_tuning().is_some_and(|t| t.equivalent_to(tuning)) {
            self.current = Some(TuningEntry::Instrument(saved.clone()));
        }
        if self.pinned.tuning().is_some_and(|t| t.equivalent_to(tuning)) {
            self.pinned = TuningEntry::Instrument(saved.clone());
        }
        debug!(tuning = %saved.name(), "added custom tuning");
        saved
    }

    /// Deletes a custom tuning.
    ///
    /// It is also dropped from the favourites; a current entry equivalent to it
    /// loses its name, and a pinned one is unpinned. Returns whether the tuning
    /// was present.
    pub fn remove_custom(&mut self, tuning: &Tuning) -> bool {
        let before = self.custom.len();
        self.custom.retain(|t| t != tuning);
        let entry = TuningEntry::Instrument(tuning.clone());
        self.favourites.retain(|e| *e != entry);

        if self.current_tuning().is_some_and(|t| t.equivalent_to(tuning)) {
            self.current = Some(TuningEntry::Instrument(tuning.with_name(None)));
        }
        if self.pinned.tuning().is_some_and(|t| t.equivalent_to(tuning)) {
            self.unpin();
        }
        before != self.custom.len()
    }

    fn current_tuning(&self) -> Option<&Tuning> {
        self.current.as_ref().and_then(TuningEntry::tuning)
    }

    pub fn set_pinned(&mut self, entry: TuningEntry) {
        self.pinned = entry;
    }

    /// Resets the pinned entry to standard tuning.
    pub fn unpin(&mut self) {
        self.pinned = TuningEntry::Instrument(STANDARD.clone());
    }

    /// Sets both preset filters.
    ///
    /// # Errors
    /// * `IncompatibleFilter` - if no preset has both the instrument and the category
    pub fn filter_by(
        &mut self,
        instrument: Option<Instrument>,
        category: Option<Category>,
    ) -> MusicResult<()> {
        if let (Some(i), Some(c)) = (instrument, category) {
            if !presets::is_valid_filter(instrument, category) {
                return Err(MusicError::IncompatibleFilter {
                    instrument: i.to_string(),
                    category: c.to_string(),
                });
            }
        }
        self.instrument_filter = instrument;
        self.category_filter = category;
        Ok(())
    }

    /// Presets passing the current filters.
    pub fn filtered_tunings(&self) -> GroupedTunings {
        presets::filtered(self.instrument_filter, self.category_filter)
    }

    /// Which categories can be combined with the current instrument filter.
    pub fn category_filters(&self) -> Vec<(Category, bool)> {
        Category::ALL
            .into_iter()
            .map(|c| (c, presets::is_valid_filter(self.instrument_filter, Some(c))))
            .collect()
    }

    /// Which instruments can be combined with the current category filter.
    pub fn instrument_filters(&self) -> Vec<(Instrument, bool)> {
        Instrument::ALL
            .into_iter()
            .map(|i| (i, presets::is_valid_filter(Some(i), self.category_filter)))
            .collect()
    }

    /// Whether the current entry is chromatic or matches a saved or preset tuning.
    pub fn current_saved(&self) -> bool {
        match &self.current {
            Some(TuningEntry::Chromatic) => true,
            Some(TuningEntry::Instrument(tuning)) => tuning.has_equivalent_in(self.known_tunings()),
            None => false,
        }
    }

    /// Name of the custom or preset tuning equivalent to `tuning`, else its
    /// short display.
    pub fn canonical_name(&self, tuning: &Tuning) -> String {
        tuning
            .find_equivalent_in(self.known_tunings())
            .map(Tuning::name)
            .unwrap_or_else(|| tuning.to_string())
    }
}

fn dedup<T: PartialEq>(items: Vec<T>) -> Vec<T> {
    let mut out: Vec<T> = Vec::with_capacity(items.len());
    for item in items {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::DROP_D;

    fn tuning(text: &str) -> Tuning {
        text.parse().unwrap()
    }

    #[test]
    fn test_defaults() {
        let list = TuningList::default();
        assert!(list.current().is_none());
        assert_eq!(list.pinned(), &TuningEntry::Instrument(STANDARD.clone()));
        assert_eq!(list.favourites().len(), 2);
        assert!(list.is_favourite(&TuningEntry::Chromatic));
        assert!(list.is_favourite(&TuningEntry::Instrument(tuning("E4 B3 G3 D3 A2 E2"))));
        assert!(!list.is_favourite(&TuningEntry::Instrument(DROP_D.clone())));
    }

    #[test]
    fn test_set_current_canonicalises_unnamed() {
        let mut list = TuningList::default();
        list.set_current(TuningEntry::Instrument(tuning("E4 B3 G3 D3 A2 D2")));
        assert_eq!(list.current(), Some(&TuningEntry::Instrument(DROP_D.clone())));

        let odd = tuning("E4 B3 G3 D3 A2 F2");
        list.set_current(TuningEntry::Instrument(odd.clone()));
        assert_eq!(list.current(), Some(&TuningEntry::Instrument(odd)));
        assert!(!list.current_saved());

        list.set_current(TuningEntry::Chromatic);
        assert!(list.current_saved());
    }

    #[test]
    fn test_custom_lifecycle() {
        let mut list = TuningList::default();
        let odd = tuning("E4 B3 G3 D3 A2 F2");
        list.set_current(TuningEntry::Instrument(odd.clone()));
        list.set_pinned(TuningEntry::Instrument(odd.clone()));

        let saved = list.add_custom(Some("Odd".to_string()), &odd);
        assert_eq!(saved.raw_name(), Some("Odd"));
        assert_eq!(list.custom(), std::slice::from_ref(&saved));
        assert_eq!(list.current(), Some(&TuningEntry::Instrument(saved.clone())));
        assert_eq!(list.pinned(), &TuningEntry::Instrument(saved.clone()));
        assert!(list.current_saved());
        assert_eq!(list.canonical_name(&odd), "Odd");

        list.set_favourited(TuningEntry::Instrument(saved.clone()), true);
        assert!(list.is_favourite(&TuningEntry::Instrument(odd.clone())));

        assert!(list.remove_custom(&saved));
        assert!(list.custom().is_empty());
        assert!(!list.is_favourite(&TuningEntry::Instrument(odd.clone())));
        assert_eq!(list.current(), Some(&TuningEntry::Instrument(odd.clone())));
        assert_eq!(list.pinned(), &TuningEntry::Instrument(STANDARD.clone()));
        assert_eq!(list.canonical_name(&odd), "FADGBE");
        assert!(!list.remove_custom(&saved));
    }

    #[test]
    fn test_custom_shadows_equivalent_preset() {
        let mut list = TuningList::default();
        let unnamed = tuning("E4 B3 G3 D3 A2 D2");
        assert_eq!(list.canonical_name(&unnamed), "Drop D");

        let custom = list.add_custom(Some("My Drop D".to_string()), &unnamed);
        assert_eq!(list.canonical_name(&unnamed), "My Drop D");
        assert_eq!(list.canonical_name(&DROP_D), "My Drop D");

        list.set_current(TuningEntry::Instrument(unnamed.clone()));
        assert_eq!(list.current(), Some(&TuningEntry::Instrument(custom.clone())));

        assert!(list.remove_custom(&custom));
        assert_eq!(list.canonical_name(&unnamed), "Drop D");
    }

    #[test]
    fn test_favourites_have_no_duplicates() {
        let mut list = TuningList::default();
        list.set_favourited(TuningEntry::Chromatic, true);
        assert_eq!(list.favourites().len(), 2);
        list.set_favourited(TuningEntry::Chromatic, false);
        assert_eq!(list.favourites().len(), 1);
        assert!(!list.is_favourite(&TuningEntry::Chromatic));
    }

    #[test]
    fn test_filters() {
        let mut list = TuningList::default();
        assert!(list.filter_by(Some(Instrument::Bass), None).is_ok());
        assert!(list.filtered_tunings().keys().all(|(i, _)| *i == Instrument::Bass));
        assert!(list.category_filters().contains(&(Category::Open, false)));
        assert!(list.category_filters().contains(&(Category::Common, true)));

        assert!(matches!(
            list.filter_by(Some(Instrument::Bass), Some(Category::Open)),
            Err(MusicError::IncompatibleFilter { .. })
        ));
        // A rejected filter leaves the previous one in place.
        assert_eq!(list.instrument_filter(), Some(Instrument::Bass));
        assert_eq!(list.category_filter(), None);

        list.filter_by(None, Some(Category::Open)).unwrap();
        assert!(list.instrument_filters().contains(&(Instrument::Bass, false)));
        assert!(list.instrument_filters().contains(&(Instrument::Guitar, true)));
    }

    #[test]
    fn test_load_only_once() {
        let mut list = TuningList::default();
        let custom = tuning("E4 B3 G3 D3 A2 F2").with_name(Some("Odd".to_string()));
        let saved = SavedTunings {
            custom: vec![custom.clone(), custom.clone()],
            favourites: vec![TuningEntry::Chromatic],
            last_used: Some(TuningEntry::Instrument(DROP_D.clone())),
            pinned: Some(TuningEntry::Chromatic),
        };
        assert!(list.load(saved.clone()));
        assert_eq!(list.custom(), std::slice::from_ref(&custom));
        assert_eq!(list.pinned(), &TuningEntry::Chromatic);
        assert_eq!(list.last_used(), Some(&TuningEntry::Instrument(DROP_D.clone())));
        assert!(!list.load(SavedTunings::default()));
        assert_eq!(list.favourites(), &[TuningEntry::Chromatic]);

        list.set_current(TuningEntry::Instrument(STANDARD.clone()));
        let snapshot = list.snapshot();
        assert_eq!(snapshot.last_used, Some(TuningEntry::Instrument(STANDARD.clone())));
        assert_eq!(snapshot.pinned, Some(TuningEntry::Chromatic));
    }
}
