//! The parser module of simfile (.dwi/.sm/.ssc) chart definitions.
//!
//! Three historical text formats describe the same thing — a song, its
//! difficulty variants, and the timed note events within each variant — with
//! very different syntax. Each format gets its own parser under [`parse`];
//! all three emit the one normalized model under [`model`].
//!
//! In detail, our policies are:
//!
//! - Support only UTF-8 (as required `&str` to input).
//! - Do not support editing simfile source text.
//! - Keep parses independent: the error-tolerance policy is an explicit
//!   [`parse::Tolerance`] argument, never process-wide state.
//! - Normalize cross-format differences (difficulty vocabulary, DWI pad
//!   codes, timing re-basing) inside the parsers, so consumers only ever
//!   see the normalized model.

pub mod fraction;
pub mod model;
pub mod parse;
pub mod prelude;

use self::{
    model::RawSimfile,
    parse::{ParseError, Tolerance},
};

/// A supported simfile format.
///
/// The declaration order is the selection priority when a song directory
/// offers more than one candidate file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Format {
    /// StepMania 5 `.ssc`.
    Ssc,
    /// StepMania `.sm`.
    Sm,
    /// Dance With Intensity `.dwi`.
    Dwi,
}

impl Format {
    /// Every supported format, in descending selection priority.
    pub const PRIORITY: [Self; 3] = [Self::Ssc, Self::Sm, Self::Dwi];

    /// The file extension this format uses, dot included.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Ssc => ".ssc",
            Self::Sm => ".sm",
            Self::Dwi => ".dwi",
        }
    }

    /// Picks the format for a file name by its extension.
    #[must_use]
    pub fn from_file_name(name: &str) -> Option<Self> {
        Self::PRIORITY
            .into_iter()
            .find(|format| name.ends_with(format.extension()))
    }

    /// Parses one simfile's entire source text.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] wrapping the failure with a snippet of the
    /// source for any fatal structural problem, or when `tolerance` is
    /// [`Tolerance::Bail`] and a recoverable problem was found.
    pub fn parse(self, source: &str, tolerance: Tolerance) -> Result<RawSimfile, ParseError> {
        match self {
            Self::Ssc => parse::ssc::parse_ssc(source, tolerance),
            Self::Sm => parse::sm::parse_sm(source, tolerance),
            Self::Dwi => parse::dwi::parse_dwi(source, tolerance),
        }
    }
}

/// Orders two file names by how much we'd like to parse them: known
/// extensions in [`Format::PRIORITY`] order, dotfiles last.
#[must_use]
pub fn compare_file_candidates(a: &str, b: &str) -> std::cmp::Ordering {
    use std::cmp::Ordering;

    if a.starts_with('.') {
        return Ordering::Greater;
    }
    if b.starts_with('.') {
        return Ordering::Less;
    }
    let priority = |name: &str| {
        Format::from_file_name(name).map_or(Format::PRIORITY.len(), |format| {
            Format::PRIORITY
                .iter()
                .position(|&f| f == format)
                .unwrap_or(Format::PRIORITY.len())
        })
    };
    priority(a).cmp(&priority(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_priority_prefers_ssc() {
        let mut candidates = vec!["song.dwi", "song.sm", "song.ssc"];
        candidates.sort_by(|a, b| compare_file_candidates(a, b));
        assert_eq!(candidates, vec!["song.ssc", "song.sm", "song.dwi"]);
    }

    #[test]
    fn dotfiles_sort_last() {
        let mut candidates = vec![".hidden.ssc", "song.sm"];
        candidates.sort_by(|a, b| compare_file_candidates(a, b));
        assert_eq!(candidates, vec!["song.sm", ".hidden.ssc"]);
    }

    #[test]
    fn from_file_name_matches_extensions() {
        assert_eq!(Format::from_file_name("a.ssc"), Some(Format::Ssc));
        assert_eq!(Format::from_file_name("a.sm"), Some(Format::Sm));
        assert_eq!(Format::from_file_name("a.dwi"), Some(Format::Dwi));
        assert_eq!(Format::from_file_name("a.txt"), None);
    }
}
