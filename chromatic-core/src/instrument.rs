use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// General MIDI program for a clean electric guitar (0-based).
pub const MIDI_ELECTRIC_GUITAR_CLEAN: u8 = 27;

/// General MIDI program for a finger-picked electric bass (0-based).
pub const MIDI_ELECTRIC_BASS_FINGER: u8 = 33;

/// A stringed instrument a tuning can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Instrument {
    Guitar,
    Bass,
}

impl Instrument {
    /// Every instrument, in declaration order.
    pub const ALL: [Instrument; 2] = [Instrument::Guitar, Instrument::Bass];

    /// Display name.
    pub fn name(self) -> &'static str {
        match self {
            Instrument::Guitar => "Guitar",
            Instrument::Bass => "Bass",
        }
    }

    /// Number of strings a new tuning for this instrument starts with.
    pub fn default_num_strings(self) -> usize {
        match self {
            Instrument::Guitar => 6,
            Instrument::Bass => 4,
        }
    }

    /// Playback tag handed to the sound output: a General MIDI program number.
    pub fn midi_instrument(self) -> u8 {
        match self {
            Instrument::Guitar => MIDI_ELECTRIC_GUITAR_CLEAN,
            Instrument::Bass => MIDI_ELECTRIC_BASS_FINGER,
        }
    }

    /// Upper-case identifier used in stored tunings, e.g. `"GUITAR"`.
    pub fn key(self) -> &'static str {
        match self {
            Instrument::Guitar => "GUITAR",
            Instrument::Bass => "BASS",
        }
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when text names no known instrument.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown instrument {0:?}")]
pub struct UnknownInstrument(pub String);

impl FromStr for Instrument {
    type Err = UnknownInstrument;

    /// Case-insensitive match on the instrument key.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Instrument::ALL
            .into_iter()
            .find(|i| i.key().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownInstrument(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attributes() {
        assert_eq!(Instrument::Guitar.default_num_strings(), 6);
        assert_eq!(Instrument::Bass.default_num_strings(), 4);
        assert_eq!(Instrument::Guitar.midi_instrument(), 27);
        assert_eq!(Instrument::Bass.midi_instrument(), 33);
        assert_eq!(Instrument::Bass.to_string(), "Bass");
    }

    #[test]
    fn test_parse() {
        assert_eq!("GUITAR".parse(), Ok(Instrument::Guitar));
        assert_eq!("bass".parse(), Ok(Instrument::Bass));
        assert!("ukulele".parse::<Instrument>().is_err());
    }

    #[test]
    fn test_serde_uses_upper_case_keys() {
        assert_eq!(serde_json::to_string(&Instrument::Bass).unwrap(), "\"BASS\"");
    }
}
