//! The DWI/SM/SSC simfile format parser.
//!
//! This crate parses rhythm-game chart definitions — the three historical
//! text formats DWI, SM, and SSC — into one normalized in-memory model of
//! songs, their difficulty variants, and the timed note events within each
//! variant. Measure-based note grids become absolute beat offsets held
//! exactly (rational arithmetic, no float drift), split-format timing data
//! is reconciled into per-chart BPM and stop timelines, and cross-format
//! quirks (DWI's dual-pad doubles streams, its combo pad codes, the
//! per-format difficulty vocabularies) are normalized away.
//!
//! - [`simfile`] — the parsers and the model they emit.
//! - [`song`] — assembles a parsed file into a song with derived metadata
//!   and resolved images.
//! - [`pack`] — walks a pack directory, isolating per-song failures.
//! - [`stats`] — jump/jack/gallop counting over a parsed chart.
//!
//! ```
//! use simfile_rs::simfile::{Format, parse::Tolerance};
//!
//! let source = "#TITLE:Example;
//! #BPMS:0=150;
//! #NOTES:
//!      dance-single:
//!      :
//!      Beginner:
//!      1:
//!      :
//! 1000
//! 0000
//! 0010
//! 0000
//! ;
//! ";
//! let simfile = Format::Sm.parse(source, Tolerance::default())?;
//! assert_eq!(simfile.title, "Example");
//! assert_eq!(simfile.available_types[0].slug, "single-beginner");
//! # Ok::<(), simfile_rs::simfile::parse::ParseError>(())
//! ```

pub mod pack;
pub mod simfile;
pub mod song;
pub mod stats;
