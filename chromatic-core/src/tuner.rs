//! # Tuner Module
//!
//! The tuner's state once a pitch reading is available. It does no audio work:
//! a detection thread sends [`PitchReading`]s over a channel and the tuner
//! turns them into a selected string (or note), an offset in semitones, and
//! per-string tuned flags.
//!
//! ## Modes
//! - **Instrument**: readings are matched against the strings of a tuning.
//!   With auto-detect on, the string nearest the played note is selected.
//! - **Chromatic**: readings are matched against any note. With auto-detect
//!   on, the nearest note is selected.

use crossbeam_channel::Receiver;
use tracing::{debug, warn};

use crate::config::TunerConfig;
use crate::error::{MusicError, MusicResult};
use crate::notes;
use crate::tuning::{STANDARD, Tuning};

/// One reading from a pitch detector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PitchReading {
    /// Detected pitch in Hz, or `None` when nothing pitched was heard.
    pub pitch: Option<f64>,
    /// Capture time in milliseconds, from any fixed origin.
    pub timestamp_ms: u64,
}

impl PitchReading {
    pub fn pitched(pitch: f64, timestamp_ms: u64) -> Self {
        PitchReading {
            pitch: Some(pitch),
            timestamp_ms,
        }
    }

    pub fn unpitched(timestamp_ms: u64) -> Self {
        PitchReading {
            pitch: None,
            timestamp_ms,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Tuner {
    config: TunerConfig,
    tuning: Tuning,
    selected_string: usize,
    selected_note: i32,
    note_offset: Option<f64>,
    auto_detect: bool,
    tuned: Vec<bool>,
    note_tuned: bool,
    chromatic: bool,
    /// When the current target came within the tuned threshold.
    in_tune_since: Option<u64>,
}

impl Default for Tuner {
    fn default() -> Self {
        Self::new(STANDARD.clone())
    }
}

/// Note index of E2, the note selected when chromatic mode starts.
const INITIAL_NOTE: i32 = -29;

impl Tuner {
    /// Creates a tuner with the default settings.
    pub fn new(tuning: Tuning) -> Self {
        let tuned = vec![false; tuning.num_strings()];
        Tuner {
            config: TunerConfig::default(),
            tuning,
            selected_string: 0,
            selected_note: INITIAL_NOTE,
            note_offset: None,
            auto_detect: true,
            tuned,
            note_tuned: false,
            chromatic: false,
            in_tune_since: None,
        }
    }

    /// Creates a tuner with the given settings.
    ///
    /// # Errors
    /// Any error from [`TunerConfig::validate`].
    pub fn with_config(tuning: Tuning, config: TunerConfig) -> MusicResult<Self> {
        config.validate()?;
        Ok(Tuner {
            config,
            ..Self::new(tuning)
        })
    }

    pub fn config(&self) -> &TunerConfig {
        &self.config
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn selected_string(&self) -> usize {
        self.selected_string
    }

    pub fn selected_note(&self) -> i32 {
        self.selected_note
    }

    /// Semitones between the last reading and the target; positive is sharp.
    pub fn note_offset(&self) -> Option<f64> {
        self.note_offset
    }

    pub fn auto_detect(&self) -> bool {
        self.auto_detect
    }

    pub fn tuned(&self) -> &[bool] {
        &self.tuned
    }

    pub fn note_tuned(&self) -> bool {
        self.note_tuned
    }

    pub fn chromatic(&self) -> bool {
        self.chromatic
    }

    pub fn a4_pitch(&self) -> f64 {
        self.config.a4_pitch
    }

    /// Whether the last reading is within the tuned threshold of the target.
    pub fn is_in_tune(&self) -> bool {
        self.note_offset
            .is_some_and(|offset| offset.abs() < self.config.tuned_offset_threshold)
    }

    fn check_string(&self, n: usize) -> MusicResult<()> {
        if n < self.tuning.num_strings() {
            Ok(())
        } else {
            Err(MusicError::IndexOutOfRange {
                index: n,
                len: self.tuning.num_strings(),
            })
        }
    }

    /// Selects a string by hand, turning auto-detect off.
    ///
    /// # Errors
    /// * `IndexOutOfRange` - if the tuning has no such string
    pub fn select_string(&mut self, n: usize) -> MusicResult<()> {
        self.check_string(n)?;
        if n != self.selected_string {
            self.in_tune_since = None;
        }
        self.selected_string = n;
        self.auto_detect = false;
        Ok(())
    }

    /// Switches to another tuning, leaving chromatic mode.
    ///
    /// Strings that did not change keep their tuned flag.
    pub fn set_tuning(&mut self, tuning: Tuning) {
        if self.chromatic {
            self.set_chromatic(false);
        }

        if self.tuning.num_strings() != tuning.num_strings() {
            self.tuned = vec![false; tuning.num_strings()];
        } else {
            let pairs = self.tuning.iter().zip(tuning.iter());
            for (flag, (old, new)) in self.tuned.iter_mut().zip(pairs) {
                if old != new {
                    *flag = false;
                }
            }
        }

        if self.selected_string >= tuning.num_strings() {
            self.selected_string = tuning.num_strings().saturating_sub(1);
        }
        debug!(tuning = %tuning.full_name(), "tuning changed");
        self.tuning = tuning;
        self.in_tune_since = None;
    }

    fn reset_tuned(&mut self) {
        self.tuned = vec![false; self.tuning.num_strings()];
        self.in_tune_since = None;
    }

    /// Raises every string a semitone, unless the highest would leave the range.
    ///
    /// Returns whether the tuning changed.
    pub fn tune_up(&mut self) -> bool {
        match self.tuning.highest_string() {
            Some(s) if s.root_note_index() < self.config.highest_note => {
                self.tuning = self.tuning.higher_tuning();
                self.reset_tuned();
                true
            }
            _ => false,
        }
    }

    /// Lowers every string a semitone, unless the lowest would leave the range.
    ///
    /// Returns whether the tuning changed.
    pub fn tune_down(&mut self) -> bool {
        match self.tuning.lowest_string() {
            Some(s) if s.root_note_index() > self.config.lowest_note => {
                self.tuning = self.tuning.lower_tuning();
                self.reset_tuned();
                true
            }
            _ => false,
        }
    }

    /// Raises one string a semitone, unless it would leave the range.
    ///
    /// # Errors
    /// * `IndexOutOfRange` - if the tuning has no such string
    pub fn tune_string_up(&mut self, n: usize) -> MusicResult<bool> {
        let string = self.tuning.string_at(n)?;
        if string.root_note_index() >= self.config.highest_note {
            return Ok(false);
        }
        let higher = string.higher_string();
        self.tuning = self.tuning.with_string(n, higher)?;
        self.set_tuned(n, false)?;
        Ok(true)
    }

    /// Lowers one string a semitone, unless it would leave the range.
    ///
    /// # Errors
    /// * `IndexOutOfRange` - if the tuning has no such string
    pub fn tune_string_down(&mut self, n: usize) -> MusicResult<bool> {
        let string = self.tuning.string_at(n)?;
        if string.root_note_index() <= self.config.lowest_note {
            return Ok(false);
        }
        let lower = string.lower_string();
        self.tuning = self.tuning.with_string(n, lower)?;
        self.set_tuned(n, false)?;
        Ok(true)
    }

    /// Selects a chromatic note by hand, turning auto-detect off.
    ///
    /// # Errors
    /// * `NoteOutOfRange` - if the note is outside the configured range
    pub fn select_note(&mut self, index: i32) -> MusicResult<()> {
        if !self.config.in_range(index) {
            return Err(MusicError::NoteOutOfRange {
                index,
                lowest: self.config.lowest_note,
                highest: self.config.highest_note,
            });
        }
        if self.selected_note != index {
            self.note_tuned = false;
            self.in_tune_since = None;
        }
        self.selected_note = index;
        self.auto_detect = false;
        Ok(())
    }

    /// Marks string `n` tuned or untuned. In chromatic mode this marks the
    /// selected note instead.
    ///
    /// # Errors
    /// * `IndexOutOfRange` - if the tuning has no such string
    pub fn set_tuned(&mut self, n: usize, tuned: bool) -> MusicResult<()> {
        self.check_string(n)?;
        if self.chromatic {
            self.note_tuned = tuned;
        } else {
            self.tuned[n] = tuned;
        }
        Ok(())
    }

    pub fn set_auto_detect(&mut self, on: bool) {
        self.auto_detect = on;
    }

    /// Switches between chromatic and instrument mode, clearing tuned flags.
    pub fn set_chromatic(&mut self, on: bool) {
        self.reset_tuned();
        self.note_tuned = false;
        self.chromatic = on;
    }

    /// # Errors
    /// * `InvalidPitch` - if the pitch is not positive
    pub fn set_a4_pitch(&mut self, pitch: f64) -> MusicResult<()> {
        if !(pitch.is_finite() && pitch > 0.0) {
            return Err(MusicError::InvalidPitch { pitch });
        }
        self.config.a4_pitch = pitch;
        Ok(())
    }

    /// Applies one reading.
    ///
    /// An unpitched reading clears the offset. A pitched one updates the
    /// selection (if auto-detect is on), the offset, and after the target has
    /// stayed in tune for the configured time, its tuned flag.
    ///
    /// # Errors
    /// * `InvalidPitch` - if the reading is not a positive pitch; the offset is cleared
    pub fn process_pitch(&mut self, reading: PitchReading) -> MusicResult<()> {
        let Some(pitch) = reading.pitch else {
            self.note_offset = None;
            self.in_tune_since = None;
            return Ok(());
        };

        let note_playing = match notes::offset_from_a4_with(pitch, self.config.a4_pitch) {
            Ok(offset) => offset,
            Err(e) => {
                self.note_offset = None;
                self.in_tune_since = None;
                return Err(e);
            }
        };

        if self.auto_detect {
            self.auto_select(note_playing);
        }

        self.note_offset = self.target_note().map(|target| note_playing - f64::from(target));
        self.track_sustain(reading.timestamp_ms);
        Ok(())
    }

    fn auto_select(&mut self, note_playing: f64) {
        if self.chromatic {
            let closest = note_playing.round() as i32;
            if closest != self.selected_note {
                self.note_tuned = false;
                self.in_tune_since = None;
            }
            self.selected_note = closest;
        } else {
            let nearest = self
                .tuning
                .iter()
                .enumerate()
                .min_by(|(_, a), (_, b)| {
                    let da = (f64::from(a.root_note_index()) - note_playing).abs();
                    let db = (f64::from(b.root_note_index()) - note_playing).abs();
                    da.total_cmp(&db)
                })
                .map(|(i, _)| i);
            if let Some(n) = nearest {
                if n != self.selected_string {
                    debug!(string = n, "auto-selected string");
                    self.in_tune_since = None;
                }
                self.selected_string = n;
            }
        }
    }

    fn target_note(&self) -> Option<i32> {
        if self.chromatic {
            Some(self.selected_note)
        } else {
            self.tuning
                .string_at(self.selected_string)
                .ok()
                .map(|s| s.root_note_index())
        }
    }

    fn track_sustain(&mut self, now_ms: u64) {
        if !self.is_in_tune() {
            self.in_tune_since = None;
            return;
        }
        let since = *self.in_tune_since.get_or_insert(now_ms);
        if now_ms.saturating_sub(since) >= self.config.tuned_sustain_ms {
            if self.chromatic {
                self.note_tuned = true;
            } else if let Some(flag) = self.tuned.get_mut(self.selected_string) {
                *flag = true;
            }
        }
    }

    /// Applies every reading already waiting on the channel, without blocking.
    ///
    /// Invalid readings are logged and skipped. Returns how many readings were
    /// taken off the channel.
    pub fn drain(&mut self, readings: &Receiver<PitchReading>) -> usize {
        let mut count = 0;
        for reading in readings.try_iter() {
            if let Err(e) = self.process_pitch(reading) {
                warn!("skipping pitch reading: {e}");
            }
            count += 1;
        }
        count
    }
}
