//! Shared machinery for the SM/SSC measure-grid scan.
//!
//! Both formats write notes as measures of rows separated by `,` lines and
//! terminated by a `;` line, one character per column. The scan here walks
//! that grid once, tracking an exact measure-relative offset and the open
//! hold per column, and emits the beat groups of the public model.

use std::num::NonZeroUsize;

use itertools::Itertools;

use crate::simfile::{
    fraction::Fraction,
    model::{BeatOffset, BpmChange, ExtendedStep, HoldKind, Note, Quantization, Step, StepKind,
        Stop, merge_similar_bpm_ranges},
    parse::{ParseError, ParseWarning, Tolerance},
};

/// Converts a measure-relative offset to beats (quarter-note units).
pub(crate) fn beats(offset: Fraction) -> f64 {
    offset.as_f64() * 4.0
}

/// One column's parsed symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ColumnSymbol {
    /// `0`, or any code this crate does not model.
    Rest,
    /// `1`.
    Tap,
    /// `2` (freeze), `4` (roll), or the SSC `DM` minepit head.
    Head(HoldKind),
    /// `3`: closes the open hold in this column.
    Tail,
    /// SSC `DL`: closes the open hold and registers a lift.
    TailLift,
    /// `M`.
    Mine,
    /// `L`.
    Lift,
}

/// Reads one grid row into at most `columns` symbols.
///
/// Attack (`{...}`) and keysound (`[...]`) escapes are skipped without
/// consuming a column. Rows wider than the mode are truncated, shorter rows
/// yield fewer symbols. `ssc_extensions` enables the two-character `DM`/`DL`
/// codes.
pub(crate) fn tokenize_row(line: &str, columns: usize, ssc_extensions: bool) -> Vec<ColumnSymbol> {
    let mut symbols = Vec::with_capacity(columns);
    let mut chars = line.chars().peekable();

    while symbols.len() < columns {
        let Some(c) = chars.next() else { break };
        match c {
            '{' => {
                let _ = chars.by_ref().find(|&c| c == '}');
            }
            '[' => {
                let _ = chars.by_ref().find(|&c| c == ']');
            }
            'D' if ssc_extensions => match chars.peek() {
                Some('M') => {
                    chars.next();
                    symbols.push(ColumnSymbol::Head(HoldKind::Minepit));
                }
                Some('L') => {
                    chars.next();
                    symbols.push(ColumnSymbol::TailLift);
                }
                _ => symbols.push(ColumnSymbol::Rest),
            },
            '0' => symbols.push(ColumnSymbol::Rest),
            '1' => symbols.push(ColumnSymbol::Tap),
            '2' => symbols.push(ColumnSymbol::Head(HoldKind::Freeze)),
            '4' => symbols.push(ColumnSymbol::Head(HoldKind::Roll)),
            '3' => symbols.push(ColumnSymbol::Tail),
            'M' => symbols.push(ColumnSymbol::Mine),
            'L' => symbols.push(ColumnSymbol::Lift),
            _ => symbols.push(ColumnSymbol::Rest),
        }
    }

    symbols
}

fn is_rest(symbols: &[ColumnSymbol]) -> bool {
    symbols.iter().all(|&s| s == ColumnSymbol::Rest)
}

/// Does a given line count as the end of a notes block?
pub(crate) fn concludes_a_note_tag(line: Option<&str>) -> bool {
    match line {
        None => true,
        Some(line) => line.starts_with(';') || line.starts_with(",;"),
    }
}

/// Counts the non-blank rows of the measure starting at line `i`.
///
/// `None` means the measure is empty; callers must treat that case
/// explicitly instead of dividing by a fallback constant.
pub(crate) fn measure_length(lines: &[&str], mut i: usize) -> Option<NonZeroUsize> {
    let mut length = 0;
    while i < lines.len() && !concludes_a_note_tag(Some(lines[i])) && !lines[i].starts_with(',') {
        if !lines[i].trim().is_empty() {
            length += 1;
        }
        i += 1;
    }
    NonZeroUsize::new(length)
}

/// The per-row increment of the measure starting at line `i`: `1/length`,
/// or a whole measure when the measure is empty (an empty measure still
/// spans a measure of time; there is just nothing to subdivide).
pub(crate) fn measure_fraction(lines: &[&str], i: usize) -> Fraction {
    measure_length(lines, i).map_or(Fraction::whole(1), |length| {
        Fraction::new(1, length.get() as i64)
    })
}

/// Where the first countable measure of a chart begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FirstMeasure {
    /// Line index of the measure's first line.
    pub(crate) line_index: usize,
    /// How many fully-empty measures were passed getting there.
    pub(crate) measures_skipped: usize,
}

/// Finds the first measure containing at least one non-rest row.
///
/// Returns `None` when the entire block is silent.
pub(crate) fn find_first_non_empty_measure(
    lines: &[&str],
    start: usize,
    columns: usize,
    ssc_extensions: bool,
) -> Option<FirstMeasure> {
    let mut measures_skipped = 0;
    let mut measure_start = start;

    let mut i = start;
    while i < lines.len() && !concludes_a_note_tag(Some(lines[i])) {
        let line = lines[i];
        if line.trim().is_empty() {
            i += 1;
            continue;
        }
        if line.starts_with(',') {
            measure_start = i + 1;
            measures_skipped += 1;
            i += 1;
            continue;
        }
        if !is_rest(&tokenize_row(line, columns, ssc_extensions)) {
            return Some(FirstMeasure {
                line_index: measure_start,
                measures_skipped,
            });
        }
        i += 1;
    }

    None
}

struct OpenHold {
    kind: HoldKind,
    quantization: Quantization,
    start: Fraction,
}

/// Accumulates notes keyed by exact offset and flattens them into the
/// sorted `beats` sequence.
#[derive(Default)]
pub(crate) struct NoteCollector {
    notes: Vec<(Fraction, Note)>,
}

impl NoteCollector {
    pub(crate) fn push(&mut self, offset: Fraction, note: Note) {
        self.notes.push((offset, note));
    }

    /// Sorts by offset and groups equal offsets into [`BeatOffset`]s.
    pub(crate) fn into_beats(mut self) -> Vec<BeatOffset> {
        self.notes
            .sort_by(|a, b| a.0.cmp_value(b.0).then(a.1.column().cmp(&b.1.column())));
        let grouped = self
            .notes
            .into_iter()
            .chunk_by(|&(offset, _)| offset.simplify());
        grouped
            .into_iter()
            .map(|(offset, group)| BeatOffset {
                offset: beats(offset),
                steps: group.map(|(_, note)| note).collect(),
            })
            .collect()
    }
}

/// Result of scanning one notes block.
pub(crate) struct NoteGrid {
    /// The sorted beat groups.
    pub(crate) beats: Vec<BeatOffset>,
    /// Index of the line that terminated the block.
    pub(crate) end_index: usize,
}

/// Walks a measure grid from `start` until the block terminator, emitting
/// every step and hold it contains.
pub(crate) fn scan_note_grid(
    lines: &[&str],
    start: usize,
    columns: usize,
    ssc_extensions: bool,
    tolerance: Tolerance,
    chart_label: &str,
) -> Result<NoteGrid, ParseError> {
    let mut collector = NoteCollector::default();
    let mut open: Vec<Option<OpenHold>> = (0..columns).map(|_| None).collect();

    let mut cur_offset = Fraction::ZERO;
    let mut cur_measure_fraction = measure_fraction(lines, start);

    let mut i = start;
    while i < lines.len() && !concludes_a_note_tag(Some(lines[i])) {
        let line = lines[i];

        if line.trim().is_empty() {
            i += 1;
            continue;
        }

        if line.starts_with(',') {
            cur_measure_fraction = measure_fraction(lines, i + 1);
            i += 1;
            continue;
        }

        let symbols = tokenize_row(line, columns, ssc_extensions);
        let quantization = Quantization::classify(cur_offset);

        for (column, symbol) in symbols.iter().enumerate() {
            match symbol {
                ColumnSymbol::Rest => {}
                ColumnSymbol::Tap | ColumnSymbol::Mine | ColumnSymbol::Lift => {
                    let kind = match symbol {
                        ColumnSymbol::Tap => StepKind::Tap,
                        ColumnSymbol::Mine => StepKind::Mine,
                        _ => StepKind::Lift,
                    };
                    collector.push(
                        cur_offset,
                        Note::Step(Step {
                            kind,
                            quantization,
                            column,
                            offset: beats(cur_offset),
                        }),
                    );
                }
                ColumnSymbol::Head(kind) => {
                    if open[column].is_some() {
                        tolerance.report(ParseWarning::ReopenedHold {
                            chart: chart_label.to_owned(),
                            column,
                        })?;
                    } else {
                        open[column] = Some(OpenHold {
                            kind: *kind,
                            quantization,
                            start: cur_offset,
                        });
                    }
                }
                ColumnSymbol::Tail | ColumnSymbol::TailLift => {
                    match open[column].take() {
                        None => tolerance.report(ParseWarning::OrphanHoldTail {
                            chart: chart_label.to_owned(),
                            column,
                        })?,
                        Some(hold) => {
                            let end = cur_offset + Fraction::new(1, 4);
                            collector.push(
                                hold.start,
                                Note::Hold(ExtendedStep {
                                    kind: hold.kind,
                                    quantization: hold.quantization,
                                    column,
                                    offset: beats(hold.start),
                                    end_offset: beats(end),
                                }),
                            );
                        }
                    }
                    if *symbol == ColumnSymbol::TailLift {
                        collector.push(
                            cur_offset,
                            Note::Step(Step {
                                kind: StepKind::Lift,
                                quantization,
                                column,
                                offset: beats(cur_offset),
                            }),
                        );
                    }
                }
            }
        }

        cur_offset = cur_offset + cur_measure_fraction;
        i += 1;
    }

    for (column, hold) in open.into_iter().enumerate() {
        if hold.is_some() {
            tolerance.report(ParseWarning::UnfinishedHold {
                chart: chart_label.to_owned(),
                column,
            })?;
        }
    }

    Ok(NoteGrid {
        beats: collector.into_beats(),
        end_index: i,
    })
}

/// Parses a raw `BPMS` value into merged tempo segments, re-based past the
/// chart's leading empty measures.
pub(crate) fn parse_bpm_string(bpm_string: &str, measures_skipped: usize) -> Vec<BpmChange> {
    let rebase = measures_skipped as f64 * 4.0;
    let entries: Vec<&str> = bpm_string.split(',').collect();

    let changes: Vec<BpmChange> = entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let (beat_s, bpm_s) = entry.trim().split_once('=').unwrap_or((entry.trim(), ""));
            let next_beat = entries
                .get(i + 1)
                .map(|next| next.trim().split('=').next().unwrap_or(""))
                .and_then(|s| s.parse::<f64>().ok());

            BpmChange {
                start_offset: beat_s.parse::<f64>().unwrap_or_default() - rebase,
                end_offset: next_beat.map(|beat| beat - rebase),
                bpm: bpm_s.parse().unwrap_or_default(),
            }
        })
        .collect();

    merge_similar_bpm_ranges(&changes)
}

/// Parses a raw `STOPS` value, re-based past the chart's leading empty
/// measures. Durations are carried through verbatim.
pub(crate) fn parse_stop_string(stops_string: Option<&str>, measures_skipped: usize) -> Vec<Stop> {
    let Some(stops_string) = stops_string else {
        return Vec::new();
    };
    if stops_string.trim().is_empty() {
        return Vec::new();
    }
    let rebase = measures_skipped as f64 * 4.0;

    stops_string
        .split(',')
        .map(|entry| {
            let (offset_s, duration_s) = entry.trim().split_once('=').unwrap_or((entry.trim(), ""));
            Stop {
                offset: offset_s.parse::<f64>().unwrap_or_default() - rebase,
                duration: duration_s.parse().unwrap_or_default(),
            }
        })
        .collect()
}
