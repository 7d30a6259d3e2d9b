//! Prelude module for the simfile crate.
//!
//! Re-exports the public surface for convenient access: use
//! `use simfile_rs::simfile::prelude::*;` to import everything at once.

pub use crate::{
    pack::{Pack, PackWithSongs, get_all_packs, get_pack},
    simfile::{
        Format, compare_file_candidates,
        fraction::Fraction,
        model::{
            BeatOffset, BpmChange, Difficulty, ExtendedStep, HoldKind, Mode, Note, Quantization,
            RawSimfile, Step, StepKind, Stepchart, StepchartType, Stop, TaggedImages,
            merge_similar_bpm_ranges,
        },
        parse::{
            ParseError, ParseWarning, Tolerance, dwi::parse_dwi, sm::parse_sm, ssc::parse_ssc,
        },
    },
    song::{Simfile, SongError, Title, assemble_song, parse_song},
    stats::{Stats, calculate_stats},
};
