use std::fmt;

use crate::tuning::Tuning;

/// Something the tuner can be set to: free chromatic mode or an instrument tuning.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TuningEntry {
    /// Tune to the nearest note, whatever it is.
    Chromatic,
    /// Tune the strings of an instrument.
    Instrument(Tuning),
}

impl TuningEntry {
    /// Display name, if the entry has one.
    pub fn name(&self) -> Option<&str> {
        match self {
            TuningEntry::Chromatic => Some("Chromatic"),
            TuningEntry::Instrument(tuning) => tuning.raw_name().filter(|n| !n.is_empty()),
        }
    }

    pub fn has_name(&self) -> bool {
        self.name().is_some()
    }

    /// The tuning, unless chromatic.
    pub fn tuning(&self) -> Option<&Tuning> {
        match self {
            TuningEntry::Chromatic => None,
            TuningEntry::Instrument(tuning) => Some(tuning),
        }
    }

    /// Stable identifier, e.g. `"GUITAR-[E4 B3 G3 D3 A2 E2]"`.
    pub fn key(&self) -> String {
        match self {
            TuningEntry::Chromatic => "chromatic".to_string(),
            TuningEntry::Instrument(tuning) => {
                format!("{}-[{}]", tuning.instrument().key(), tuning.to_full_string())
            }
        }
    }
}

impl From<Tuning> for TuningEntry {
    fn from(tuning: Tuning) -> Self {
        TuningEntry::Instrument(tuning)
    }
}

impl fmt::Display for TuningEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TuningEntry::Chromatic => f.write_str("Chromatic Tuning"),
            TuningEntry::Instrument(tuning) => write!(f, "Instrument Tuning: {tuning}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::STANDARD;

    #[test]
    fn test_keys() {
        assert_eq!(TuningEntry::Chromatic.key(), "chromatic");
        assert_eq!(
            TuningEntry::from(STANDARD.clone()).key(),
            "GUITAR-[E4 B3 G3 D3 A2 E2]"
        );
    }

    #[test]
    fn test_names() {
        assert_eq!(TuningEntry::Chromatic.name(), Some("Chromatic"));
        assert_eq!(TuningEntry::from(STANDARD.clone()).name(), Some("Standard"));
        let unnamed = TuningEntry::from(STANDARD.lower_tuning());
        assert!(!unnamed.has_name());
        assert!(unnamed.tuning().is_some());
        assert!(TuningEntry::Chromatic.tuning().is_none());
    }

    #[test]
    fn test_display() {
        assert_eq!(
            TuningEntry::from(STANDARD.clone()).to_string(),
            "Instrument Tuning: EADGBE"
        );
    }
}
