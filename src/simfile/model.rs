//! The normalized in-memory model simfiles are parsed into.
//!
//! Each chart owns its own beat and timing arrays; nothing is shared between
//! charts, and the song object owns all of its charts.

pub mod bpm;
pub mod chart;
pub mod repr;
pub mod step;

pub use bpm::{BpmChange, Stop, merge_similar_bpm_ranges};
pub use chart::{Difficulty, Mode, Stepchart, StepchartType};
pub use repr::{RawSimfile, TaggedImages};
pub use step::{BeatOffset, ExtendedStep, HoldKind, Note, Quantization, Step, StepKind};
