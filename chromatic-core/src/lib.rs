// chromatic-core/src/lib.rs

//! The core logic for the guitar and bass tuner.
//! This crate models notes, strings and tunings under 12-tone equal
//! temperament, and the tuner state driven by pitch readings. It is completely
//! headless: it does no audio capture, file I/O or drawing.

pub mod codec;
pub mod config;
pub mod entry;
pub mod error;
pub mod guitar_string;
pub mod instrument;
pub mod notes;
pub mod presets;
pub mod tuner;
pub mod tuning;
pub mod tuning_list;

pub use entry::TuningEntry;
pub use error::{MusicError, MusicResult};
pub use guitar_string::GuitarString;
pub use instrument::Instrument;
pub use tuner::{PitchReading, Tuner};
pub use tuning::{Category, Tuning};
pub use tuning_list::TuningList;
