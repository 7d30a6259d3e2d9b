//! Note events: momentary steps, sustained holds, and the beat grouping.

use crate::simfile::fraction::Fraction;

/// Musically meaningful subdivision buckets for a note's timing.
///
/// Mostly useful for color-coding a note. Anything that doesn't cleanly fit
/// one of the possible buckets is reported as a 64th.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Quantization {
    /// A quarter note.
    Fourth,
    /// A sixth (triplet eighth) note.
    Sixth,
    /// An eighth note.
    Eighth,
    /// A twelfth (triplet sixteenth) note.
    Twelfth,
    /// A sixteenth note.
    Sixteenth,
    /// A thirty-second note.
    ThirtySecond,
    /// A sixty-fourth note, also the catch-all for irregular offsets.
    SixtyFourth,
}

impl Quantization {
    /// Candidate buckets in classification order. First match wins.
    const CANDIDATES: [Self; 7] = [
        Self::Fourth,
        Self::Sixth,
        Self::Eighth,
        Self::Twelfth,
        Self::Sixteenth,
        Self::ThirtySecond,
        Self::SixtyFourth,
    ];

    /// The subdivision denominator this bucket stands for.
    #[must_use]
    pub const fn denominator(self) -> u8 {
        match self {
            Self::Fourth => 4,
            Self::Sixth => 6,
            Self::Eighth => 8,
            Self::Twelfth => 12,
            Self::Sixteenth => 16,
            Self::ThirtySecond => 32,
            Self::SixtyFourth => 64,
        }
    }

    /// Classifies an offset, measured in whole measures relative to the
    /// start of the chart, into the smallest bucket it divides evenly.
    #[must_use]
    pub fn classify(offset: Fraction) -> Self {
        Self::CANDIDATES
            .into_iter()
            .find(|q| (offset % Fraction::new(1, i64::from(q.denominator()))).n == 0)
            .unwrap_or(Self::SixtyFourth)
    }
}

/// The kind of a momentary event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StepKind {
    /// A plain arrow the player steps on.
    Tap,
    /// A hazard the player must avoid.
    Mine,
    /// An arrow released rather than pressed.
    Lift,
}

/// A momentary event in one column.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Step {
    /// What happens at this offset.
    pub kind: StepKind,
    /// The subdivision bucket of the offset.
    pub quantization: Quantization,
    /// Column index; 0 is player 1's left, 7 is player 2's right.
    pub column: usize,
    /// Offset in beats from the first counted measure.
    pub offset: f64,
}

/// The kind of a sustained event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HoldKind {
    /// A freeze arrow, held down for the whole duration.
    Freeze,
    /// A roll arrow, tapped repeatedly for the whole duration.
    Roll,
    /// A sustained mine pit.
    Minepit,
}

/// A sustained event in one column, spanning `[offset, end_offset)`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExtendedStep {
    /// What is sustained.
    pub kind: HoldKind,
    /// The subdivision bucket of the start offset.
    pub quantization: Quantization,
    /// Column index; 0 is player 1's left, 7 is player 2's right.
    pub column: usize,
    /// Start offset in beats from the first counted measure.
    pub offset: f64,
    /// End offset in beats. Always greater than `offset`.
    pub end_offset: f64,
}

/// Any event that can occupy a beat offset.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Note {
    /// A momentary event.
    Step(Step),
    /// A sustained event, placed at its start offset.
    Hold(ExtendedStep),
}

impl Note {
    /// The column this event occupies.
    #[must_use]
    pub const fn column(&self) -> usize {
        match self {
            Self::Step(step) => step.column,
            Self::Hold(hold) => hold.column,
        }
    }

    /// The (start) offset of this event, in beats.
    #[must_use]
    pub const fn offset(&self) -> f64 {
        match self {
            Self::Step(step) => step.offset,
            Self::Hold(hold) => hold.offset,
        }
    }

    /// The subdivision bucket of the (start) offset.
    #[must_use]
    pub const fn quantization(&self) -> Quantization {
        match self {
            Self::Step(step) => step.quantization,
            Self::Hold(hold) => hold.quantization,
        }
    }

    /// Whether this event is a hazard rather than an input to hit.
    #[must_use]
    pub const fn is_obstacle(&self) -> bool {
        matches!(
            self,
            Self::Step(Step {
                kind: StepKind::Mine,
                ..
            }) | Self::Hold(ExtendedStep {
                kind: HoldKind::Minepit,
                ..
            })
        )
    }
}

/// All events sharing one beat offset.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BeatOffset {
    /// Offset in beats from the first counted measure.
    pub offset: f64,
    /// Every event at this offset, in column order.
    pub steps: Vec<Note>,
}
