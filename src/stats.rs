//! Chart statistics: a pure consumer of the parsed beat stream.

use crate::simfile::model::{HoldKind, Note, Quantization, Stepchart, StepKind};

/// Human-relevant counts for one chart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Stats {
    /// Beats with exactly two simultaneous non-obstacle steps.
    pub jumps: usize,
    /// Freeze arrows.
    pub freezes: usize,
    /// Roll arrows.
    pub rolls: usize,
    /// Mines, including sustained mine pits.
    pub mines: usize,
    /// Lifts.
    pub lifts: usize,
    /// Same-column repeats within an eighth note, excluding jumps.
    pub jacks: usize,
    /// Isolated 4th-note two-step bursts onto fresh columns.
    pub gallops: usize,
}

/// One beat collapsed to what the pattern detectors care about.
struct BeatSignature {
    offset: f64,
    quantization: Option<Quantization>,
    /// Columns of the non-obstacle steps, sorted.
    columns: Vec<usize>,
}

impl BeatSignature {
    fn is_jump(&self) -> bool {
        self.columns.len() == 2
    }
}

/// Eighth-note window, in beats: how close two beats must be to read as
/// one pattern.
const PATTERN_WINDOW: f64 = 0.5;

fn is_jack(d: &BeatSignature, p: Option<&BeatSignature>) -> bool {
    let Some(p) = p else {
        return false;
    };
    if d.is_jump() || d.columns.is_empty() {
        return false;
    }
    if d.columns != p.columns {
        return false;
    }
    d.offset - p.offset <= PATTERN_WINDOW
}

fn is_gallop(d: &BeatSignature, p: Option<&BeatSignature>, g: Option<&BeatSignature>) -> bool {
    let Some(p) = p else {
        return false;
    };
    if d.quantization != Some(Quantization::Fourth) {
        return false;
    }
    // jumps are never gallops
    if d.is_jump() {
        return false;
    }
    // the gallop must move to a new direction, otherwise it's at the least
    // a mini jack
    if d.columns == p.columns {
        return false;
    }
    if p.quantization.is_some_and(|q| q.denominator() >= 12) {
        // only consider it a gallop if it's isolated
        if g.is_none_or(|g| p.offset - g.offset >= PATTERN_WINDOW) {
            return d.offset - p.offset < PATTERN_WINDOW;
        }
    }
    false
}

/// Calculates human-relevant stats for a given chart.
#[must_use]
pub fn calculate_stats(chart: &Stepchart) -> Stats {
    let mut stats = Stats::default();

    for beat in &chart.beats {
        for note in &beat.steps {
            match note {
                Note::Step(step) => match step.kind {
                    StepKind::Mine => stats.mines += 1,
                    StepKind::Lift => stats.lifts += 1,
                    StepKind::Tap => {}
                },
                Note::Hold(hold) => match hold.kind {
                    HoldKind::Freeze => stats.freezes += 1,
                    HoldKind::Roll => stats.rolls += 1,
                    HoldKind::Minepit => stats.mines += 1,
                },
            }
        }
    }

    let signatures: Vec<BeatSignature> = chart
        .beats
        .iter()
        .map(|beat| {
            let mut columns: Vec<usize> = beat
                .steps
                .iter()
                .filter(|note| !note.is_obstacle())
                .map(Note::column)
                .collect();
            columns.sort_unstable();
            BeatSignature {
                offset: beat.offset,
                quantization: beat.steps.first().map(Note::quantization),
                columns,
            }
        })
        .collect();

    for (i, signature) in signatures.iter().enumerate() {
        let previous = i.checked_sub(1).and_then(|p| signatures.get(p));
        let grandprevious = i.checked_sub(2).and_then(|g| signatures.get(g));

        if signature.is_jump() {
            stats.jumps += 1;
        }
        if is_jack(signature, previous) {
            stats.jacks += 1;
        }
        if is_gallop(signature, previous, grandprevious) {
            stats.gallops += 1;
        }
    }

    stats
}
