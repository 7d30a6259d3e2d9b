//! Tempo segments, scroll stops, and the BPM smoothing pass.

/// One segment of the tempo timeline.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BpmChange {
    /// Start offset in beats from the first counted measure.
    pub start_offset: f64,
    /// End offset in beats, or `None` if it lasts through the end of the
    /// chart.
    pub end_offset: Option<f64>,
    /// Beats per minute during this segment.
    pub bpm: f64,
}

/// A pause of the note-field scroll.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Stop {
    /// Offset in beats from the first counted measure.
    pub offset: f64,
    /// How long the field stays still, in beats.
    pub duration: f64,
}

fn similar_bpm(a: &BpmChange, b: &BpmChange) -> bool {
    (a.bpm - b.bpm).abs() < 1.0
}

/// Collapses runs of adjacent segments whose BPMs differ by less than 1.
///
/// Source data frequently encodes near-duplicate tempo markers; collapsing
/// them is intentionally lossy smoothing. A single left-to-right pass: a
/// segment similar to its predecessor was merged on the previous iteration
/// and is dropped, a segment similar to its successor absorbs the
/// successor's end offset. The result is order-preserving and no longer
/// than the input.
#[must_use]
pub fn merge_similar_bpm_ranges(bpm: &[BpmChange]) -> Vec<BpmChange> {
    let mut building = Vec::with_capacity(bpm.len());

    for (i, b) in bpm.iter().enumerate() {
        if i > 0 && similar_bpm(&bpm[i - 1], b) {
            continue;
        }

        match bpm.get(i + 1) {
            Some(next) if similar_bpm(next, b) => building.push(BpmChange {
                end_offset: next.end_offset,
                ..*b
            }),
            _ => building.push(*b),
        }
    }

    building
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(start: f64, end: Option<f64>, bpm: f64) -> BpmChange {
        BpmChange {
            start_offset: start,
            end_offset: end,
            bpm,
        }
    }

    #[test]
    fn merges_a_noisy_run_into_one_segment() {
        let input = [
            segment(0.0, Some(4.0), 150.0),
            segment(4.0, Some(8.0), 150.3),
            segment(8.0, None, 149.8),
        ];
        let merged = merge_similar_bpm_ranges(&input);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].bpm, 150.0);
        assert_eq!(merged[0].start_offset, 0.0);
    }

    #[test]
    fn keeps_genuinely_distinct_segments() {
        let input = [
            segment(0.0, Some(16.0), 100.0),
            segment(16.0, Some(32.0), 200.0),
            segment(32.0, None, 100.0),
        ];
        assert_eq!(merge_similar_bpm_ranges(&input), input);
    }

    #[test]
    fn merge_is_idempotent() {
        let input = [
            segment(0.0, Some(4.0), 120.0),
            segment(4.0, Some(6.0), 120.5),
            segment(6.0, Some(20.0), 180.0),
            segment(20.0, None, 90.0),
        ];
        let once = merge_similar_bpm_ranges(&input);
        let twice = merge_similar_bpm_ranges(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn empty_input_merges_to_empty() {
        assert!(merge_similar_bpm_ranges(&[]).is_empty());
    }
}
