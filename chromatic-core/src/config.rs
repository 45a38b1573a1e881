use serde::{Deserialize, Serialize};

use crate::error::{MusicError, MusicResult};
use crate::notes::DEFAULT_A4_PITCH;

/// Lowest note the tuner can tune a string down to: D1.
pub const LOWEST_NOTE: i32 = -43;

/// Highest note the tuner can tune a string up to: B4.
pub const HIGHEST_NOTE: i32 = 2;

/// Tuner settings.
///
/// Every field is optional in the JSON form; missing ones take the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TunerConfig {
    /// Reference pitch of A4 in Hz.
    pub a4_pitch: f64,
    /// Lowest selectable note index.
    pub lowest_note: i32,
    /// Highest selectable note index.
    pub highest_note: i32,
    /// Largest offset, in semitones, still counted as in tune.
    pub tuned_offset_threshold: f64,
    /// How long a note must stay in tune before it is marked tuned.
    pub tuned_sustain_ms: u64,
}

impl Default for TunerConfig {
    fn default() -> Self {
        TunerConfig {
            a4_pitch: DEFAULT_A4_PITCH,
            lowest_note: LOWEST_NOTE,
            highest_note: HIGHEST_NOTE,
            tuned_offset_threshold: 0.05,
            tuned_sustain_ms: 900,
        }
    }
}

impl TunerConfig {
    /// Parses a (possibly partial) JSON document and validates it.
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let config: TunerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    /// * `InvalidPitch` - if the reference pitch is not positive
    /// * `NoteOutOfRange` - if the note range is empty
    /// * `InvalidThreshold` - if the tuned offset threshold is not positive
    pub fn validate(&self) -> MusicResult<()> {
        if !(self.a4_pitch.is_finite() && self.a4_pitch > 0.0) {
            return Err(MusicError::InvalidPitch { pitch: self.a4_pitch });
        }
        let threshold = self.tuned_offset_threshold;
        if !(threshold.is_finite() && threshold > 0.0) {
            return Err(MusicError::InvalidThreshold { threshold });
        }
        if self.lowest_note > self.highest_note {
            return Err(MusicError::NoteOutOfRange {
                index: self.lowest_note,
                lowest: self.lowest_note,
                highest: self.highest_note,
            });
        }
        Ok(())
    }

    /// Whether a note index lies in the selectable range.
    pub fn in_range(&self, index: i32) -> bool {
        (self.lowest_note..=self.highest_note).contains(&index)
    }
}
