//! Library of named preset tunings.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;

use crate::instrument::Instrument;
use crate::tuning::{Category, DROP_D, STANDARD, Tuning, preset};

/// Presets grouped by instrument and category, in sorted order.
pub type GroupedTunings = BTreeMap<(Instrument, Option<Category>), Vec<Tuning>>;

/// Every preset tuning, guitar first.
pub static TUNINGS: Lazy<Vec<Tuning>> = Lazy::new(|| {
    use Category::*;
    use Instrument::*;

    vec![
        STANDARD.clone(),
        DROP_D.clone(),
        preset("Half Step Down", Guitar, Common, "D#4 A#3 F#3 C#3 G#2 D#2"),
        preset("Whole Step Down", Guitar, Common, "D4 A3 F3 C3 G2 D2"),
        preset("Drop C#", Guitar, Power, "D#4 A#3 F#3 C#3 G#2 C#2"),
        preset("Drop C", Guitar, Power, "D4 A3 F3 C3 G2 C2"),
        preset("Drop B", Guitar, Power, "C#4 G#3 E3 B2 F#2 B1"),
        preset("Drop A", Guitar, Power, "B3 F#3 D3 A2 E2 A1"),
        preset("Open G", Guitar, Open, "D4 B3 G3 D3 G2 D2"),
        preset("Open D", Guitar, Open, "D4 A3 F#3 D3 A2 D2"),
        preset("Open E", Guitar, Open, "E4 B3 G#3 E3 B2 E2"),
        preset("Open C", Guitar, Open, "E4 C4 G3 C3 G2 C2"),
        preset("DADGAD", Guitar, Misc, "D4 A3 G3 D3 A2 D2"),
        preset("All Fourths", Guitar, Misc, "F4 C4 G3 D3 A2 E2"),
        preset("Standard", Bass, Common, "G2 D2 A1 E1"),
        preset("Half Step Down", Bass, Common, "F#2 C#2 G#1 D#1"),
        preset("Drop D", Bass, Power, "G2 D2 A1 D1"),
        preset("Drop C", Bass, Power, "F2 C2 G1 C1"),
    ]
});

/// [`TUNINGS`] grouped by `(instrument, category)`.
pub static GROUPED: Lazy<GroupedTunings> = Lazy::new(|| group_and_sort(TUNINGS.iter()));

/// Groups tunings by instrument and category, keeping their relative order
/// inside each group.
pub fn group_and_sort<'a, I>(tunings: I) -> GroupedTunings
where
    I: IntoIterator<Item = &'a Tuning>,
{
    let mut groups = GroupedTunings::new();
    for tuning in tunings {
        groups
            .entry((tuning.instrument(), tuning.category()))
            .or_default()
            .push(tuning.clone());
    }
    groups
}

/// Whether filtering by both `instrument` and `category` leaves any preset.
///
/// A missing filter on either side always combines.
pub fn is_valid_filter(instrument: Option<Instrument>, category: Option<Category>) -> bool {
    match (instrument, category) {
        (Some(instrument), Some(category)) => GROUPED.contains_key(&(instrument, Some(category))),
        _ => true,
    }
}

/// Presets matching the optional filters, grouped.
pub fn filtered(instrument: Option<Instrument>, category: Option<Category>) -> GroupedTunings {
    group_and_sort(TUNINGS.iter().filter(|t| {
        instrument.is_none_or(|i| t.instrument() == i)
            && category.is_none_or(|c| t.category() == Some(c))
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_match_their_instrument() {
        for tuning in TUNINGS.iter() {
            assert!(tuning.has_name());
            assert!(tuning.has_category());
            assert_eq!(
                tuning.num_strings(),
                tuning.instrument().default_num_strings(),
                "{}",
                tuning.full_name()
            );
        }
    }

    #[test]
    fn test_presets_are_distinct() {
        for (i, a) in TUNINGS.iter().enumerate() {
            for b in &TUNINGS[i + 1..] {
                assert!(!a.equivalent_to(b), "{} duplicates {}", a.full_name(), b.full_name());
            }
        }
    }

    #[test]
    fn test_grouping_is_sorted() {
        let keys: Vec<_> = GROUPED.keys().copied().collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
        assert_eq!(keys[0], (Instrument::Guitar, Some(Category::Common)));
        assert_eq!(GROUPED[&(Instrument::Guitar, Some(Category::Common))][0], *STANDARD);
    }

    #[test]
    fn test_filters() {
        assert!(is_valid_filter(Some(Instrument::Guitar), Some(Category::Open)));
        assert!(!is_valid_filter(Some(Instrument::Bass), Some(Category::Open)));
        assert!(is_valid_filter(None, Some(Category::Open)));
        assert!(is_valid_filter(Some(Instrument::Bass), None));

        let bass = filtered(Some(Instrument::Bass), None);
        assert!(bass.keys().all(|(i, _)| *i == Instrument::Bass));
        assert_eq!(bass.values().map(Vec::len).sum::<usize>(), 4);

        let open = filtered(None, Some(Category::Open));
        assert_eq!(open.len(), 1);
        assert_eq!(filtered(None, None).len(), GROUPED.len());
    }
}
