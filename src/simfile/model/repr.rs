//! The whole-song output representation of a format parser.

use std::collections::BTreeMap;

use super::chart::{Stepchart, StepchartType};

/// Image file names named by tags inside the simfile, if any.
///
/// These are claims, not facts: the named files may be missing from the song
/// directory. Resolution against the directory happens during song assembly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TaggedImages {
    /// The wide banner image.
    pub banner: Option<String>,
    /// The gameplay background image.
    pub bg: Option<String>,
    /// The square jacket image.
    pub jacket: Option<String>,
}

/// Everything one format parser extracts from one simfile.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RawSimfile {
    /// The song title.
    pub title: String,
    /// The transliterated title, when the title uses a non-Latin script.
    pub titletranslit: Option<String>,
    /// The song artist.
    pub artist: Option<String>,
    /// The display BPM string the file asked for, if any.
    pub display_bpm: Option<String>,
    /// Parsed charts, keyed by [`StepchartType::slug`].
    pub charts: BTreeMap<String, Stepchart>,
    /// Descriptors for every parsed chart, in file order.
    pub available_types: Vec<StepchartType>,
    /// Image names claimed by tags.
    pub images: TaggedImages,
}

impl RawSimfile {
    /// The chart that stands in for the whole song when deriving song-level
    /// data such as the BPM range: the first one in file order.
    ///
    /// Charts within one song are assumed to share the same base tempo
    /// structure, so song-level figures are not recomputed per chart.
    #[must_use]
    pub fn representative_chart(&self) -> Option<&Stepchart> {
        self.available_types
            .first()
            .and_then(|kind| self.charts.get(&kind.slug))
    }
}
