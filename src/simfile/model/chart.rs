//! Chart-level types: play mode, the difficulty vocabulary, and the chart
//! containers.

use super::{
    bpm::{BpmChange, Stop},
    step::BeatOffset,
};

/// The gameplay mode of a chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Mode {
    /// One pad, 4 columns.
    Single,
    /// Two pads, 8 columns.
    Double,
}

impl Mode {
    /// How many note columns this mode occupies.
    #[must_use]
    pub const fn columns(self) -> usize {
        match self {
            Self::Single => 4,
            Self::Double => 8,
        }
    }

    /// Parses a mode token such as `single` or `dance-double`.
    ///
    /// Returns `None` for modes this crate does not model (couple, solo and
    /// friends).
    #[must_use]
    pub fn normalize(token: &str) -> Option<Self> {
        match token.trim_start_matches("dance-") {
            "single" => Some(Self::Single),
            "double" => Some(Self::Double),
            _ => None,
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Single => write!(f, "single"),
            Self::Double => write!(f, "double"),
        }
    }
}

/// The canonical difficulty vocabulary.
///
/// Every source format uses its own set of difficulty names; they all map
/// onto these six.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Difficulty {
    /// The introductory chart.
    Beginner,
    /// The easy chart, `easy`/`basic` in the sources.
    Basic,
    /// The middle chart, `trick`/`another`/`medium` in the sources.
    Difficult,
    /// The hard chart, `maniac`/`ssr`/`hard` among others in the sources.
    Expert,
    /// The extra chart, `smaniac` in the sources.
    Challenge,
    /// A user-made edit chart.
    Edit,
}

impl Difficulty {
    /// Maps a source-format difficulty token onto the canonical vocabulary.
    ///
    /// The table is case-insensitive and covers every name the three
    /// supported formats are known to use. Returns `None` for anything
    /// else; callers decide how loudly to fail.
    #[must_use]
    pub fn normalize(token: &str) -> Option<Self> {
        Some(match token.to_ascii_lowercase().as_str() {
            "beginner" => Self::Beginner,
            "easy" | "basic" => Self::Basic,
            "trick" | "another" | "medium" => Self::Difficult,
            "difficult" | "expert" | "maniac" | "ssr" | "hard" => Self::Expert,
            "challenge" | "smaniac" => Self::Challenge,
            "edit" => Self::Edit,
            _ => return None,
        })
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Beginner => "beginner",
            Self::Basic => "basic",
            Self::Difficult => "difficult",
            Self::Expert => "expert",
            Self::Challenge => "challenge",
            Self::Edit => "edit",
        };
        write!(f, "{name}")
    }
}

/// Metadata describing one chart variant, independent of the heavy
/// [`Stepchart`] body.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StepchartType {
    /// `"{mode}-{difficulty}"`; the join key into a song's chart map.
    pub slug: String,
    /// The gameplay mode.
    pub mode: Mode,
    /// The canonical difficulty.
    pub difficulty: Difficulty,
    /// The foot/meter rating the chart author assigned.
    pub feet: u32,
}

impl StepchartType {
    /// Builds the descriptor for a mode/difficulty pair.
    #[must_use]
    pub fn new(mode: Mode, difficulty: Difficulty, feet: u32) -> Self {
        Self {
            slug: format!("{mode}-{difficulty}"),
            mode,
            difficulty,
            feet,
        }
    }
}

/// One difficulty/mode variant of a song.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Stepchart {
    /// Every occupied beat offset, ascending.
    pub beats: Vec<BeatOffset>,
    /// All bpm speeds that exist within the song, and the start/end of each.
    pub bpm: Vec<BpmChange>,
    /// All locations at which the note field stops, and the duration of each.
    pub stops: Vec<Stop>,
}
