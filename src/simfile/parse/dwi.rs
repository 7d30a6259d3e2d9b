//! DWI format parser.
//!
//! DWI predates the SM grid: each character names a *combination* of pad
//! directions (`A` is an up-down jump), `X!Y` compounds open freezes, and
//! bracket characters switch the implicit per-character subdivision until a
//! closing character resets it to eighth notes. Doubles play ships two
//! independent pad streams that are merged into one 8-column chart.

use crate::simfile::{
    fraction::Fraction,
    model::{
        BpmChange, Difficulty, ExtendedStep, HoldKind, Mode, Note, Quantization, RawSimfile, Step,
        StepKind, Stepchart, StepchartType, Stop, merge_similar_bpm_ranges,
    },
    parse::{
        ParseError, ParseWarning, Tolerance,
        grid::{NoteCollector, beats},
        split_tag, with_wrapped_errors,
    },
};

/// Parses the entire contents of a `.dwi` file.
///
/// # Errors
///
/// Returns a [`ParseError`] carrying a source snippet when the file defines
/// no BPM at all or the given [`Tolerance`] escalates a data-quality
/// problem.
pub fn parse_dwi(source: &str, tolerance: Tolerance) -> Result<RawSimfile, ParseError> {
    with_wrapped_errors(source, || DwiParser::new(source, tolerance).parse())
}

/// Columns named by one DWI pad code, as a 4-bit mask (bit 0 = left,
/// bit 1 = down, bit 2 = up, bit 3 = right).
const fn pad_columns(code: char) -> Option<u8> {
    Some(match code {
        '0' => 0b0000,
        '1' => 0b0011, // down-left
        '2' => 0b0010, // down
        '3' => 0b1010, // down-right
        '4' => 0b0001, // left
        '6' => 0b1000, // right
        '7' => 0b0101, // up-left
        '8' => 0b0100, // up
        '9' => 0b1100, // up-right
        'A' => 0b0110, // up-down jump
        'B' => 0b1001, // left-right jump
        _ => return None,
    })
}

struct OpenHold {
    quantization: Quantization,
    start: Fraction,
}

/// Skips leading whole-empty measures shared by both pads.
///
/// DWI writes eighth notes by default, so a silent measure is eight `0`
/// characters; the return value is the character index where counting
/// starts.
fn find_first_non_empty_measure(p1: &str, p2: Option<&str>) -> usize {
    let mut i = 0;
    while p1.get(i..i + 8).is_some_and(|s| s == "00000000")
        && p2.is_none_or(|p2| p2.get(i..i + 8).is_some_and(|s| s == "00000000"))
    {
        i += 8;
    }
    i
}

fn tap(column: usize, quantization: Quantization, offset: Fraction) -> Note {
    Note::Step(Step {
        kind: StepKind::Tap,
        quantization,
        column,
        offset: beats(offset),
    })
}

/// Walks one pad's character stream, emitting taps and freezes with exact
/// measure-relative offsets.
fn parse_arrow_stream(
    notes: &str,
    first_index: usize,
    tolerance: Tolerance,
    chart_label: &str,
) -> Result<Vec<(Fraction, Note)>, ParseError> {
    let chars: Vec<char> = notes.chars().collect();
    let mut collected: Vec<(Fraction, Note)> = Vec::new();
    let mut open: [Option<OpenHold>; 4] = [None, None, None, None];

    let mut cur_offset = Fraction::ZERO;
    // dwi's default increment is 8th notes
    let mut step_fraction = Fraction::new(1, 8);

    let mut i = first_index;
    while i < chars.len() && chars[i] != ';' {
        let code = chars[i];
        match code {
            '(' => step_fraction = Fraction::new(1, 16),
            '[' => step_fraction = Fraction::new(1, 24),
            '{' => step_fraction = Fraction::new(1, 64),
            '`' => step_fraction = Fraction::new(1, 192),
            ')' | ']' | '}' | '\'' => step_fraction = Fraction::new(1, 8),
            _ => {
                if let Some(full_mask) = pad_columns(code) {
                    // give the current step a chance to conclude any
                    // freezes that may be pending; a concluded column is
                    // consumed from the step
                    let mut mask = full_mask;
                    for column in 0..4 {
                        if mask & (1u8 << column) != 0
                            && let Some(hold) = open[column].take()
                        {
                            let end = cur_offset + Fraction::new(1, 4);
                            collected.push((
                                hold.start,
                                Note::Hold(ExtendedStep {
                                    kind: HoldKind::Freeze,
                                    quantization: hold.quantization,
                                    column,
                                    offset: beats(hold.start),
                                    end_offset: beats(end),
                                }),
                            ));
                            mask &= !(1u8 << column);
                        }
                    }

                    let quantization = Quantization::classify(cur_offset);

                    if chars.get(i + 1) == Some(&'!') {
                        // B!602080B
                        // the chord B starts the row, but only 6 holds; the
                        // freeze body runs under the following steps until a
                        // later 6 (or chord containing it) closes it
                        let freeze_code = chars.get(i + 2).copied().unwrap_or('0');
                        let freeze_mask = match pad_columns(freeze_code) {
                            Some(mask) => mask,
                            None => {
                                tolerance.report(ParseWarning::UnknownPadCode {
                                    chart: chart_label.to_owned(),
                                    code: freeze_code,
                                })?;
                                0
                            }
                        };

                        for column in 0..4 {
                            if freeze_mask & (1u8 << column) != 0 {
                                open[column] = Some(OpenHold {
                                    quantization,
                                    start: cur_offset,
                                });
                            }
                        }
                        // chord columns that don't hold are plain taps; the
                        // holding ones surface as freezes when they close
                        for column in 0..4 {
                            if mask & !freeze_mask & (1u8 << column) != 0 {
                                collected.push((cur_offset, tap(column, quantization, cur_offset)));
                            }
                        }

                        // move past the exclamation and trailing code
                        i += 2;
                    } else {
                        for column in 0..4 {
                            if mask & (1u8 << column) != 0 {
                                collected.push((cur_offset, tap(column, quantization, cur_offset)));
                            }
                        }
                    }
                }
                // unknown characters advance time like rests
                cur_offset = cur_offset + step_fraction;
            }
        }
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

    Ok(collected)
}

/// Shifts a player-2 event onto columns 4..8.
fn shift_columns(note: Note) -> Note {
    match note {
        Note::Step(step) => Note::Step(Step {
            column: step.column + 4,
            ..step
        }),
        Note::Hold(hold) => Note::Hold(ExtendedStep {
            column: hold.column + 4,
            ..hold
        }),
    }
}

struct DwiParser<'a> {
    lines: Vec<&'a str>,
    tolerance: Tolerance,
    bpm: Option<String>,
    changebpm: Option<String>,
    displaybpm: Option<String>,
    stops: Option<String>,
    song: RawSimfile,
}

impl<'a> DwiParser<'a> {
    fn new(source: &'a str, tolerance: Tolerance) -> Self {
        Self {
            lines: source.lines().map(str::trim).collect(),
            tolerance,
            bpm: None,
            changebpm: None,
            displaybpm: None,
            stops: None,
            song: RawSimfile::default(),
        }
    }

    fn parse(mut self) -> Result<RawSimfile, ParseError> {
        let mut i = 0;
        while i < self.lines.len() {
            let line = self.lines[i];
            if line.is_empty() || line.starts_with("//") {
                i += 1;
                continue;
            }
            if line.starts_with('#') {
                self.parse_tag(i)?;
            }
            i += 1;
        }

        if self.displaybpm.is_none() && self.bpm.is_none() {
            return Err(ParseError::MissingBpms);
        }

        if let Some(displaybpm) = &self.displaybpm {
            self.song.display_bpm = Some(format_display_bpm(displaybpm));
        }

        Ok(self.song)
    }

    fn parse_tag(&mut self, index: usize) -> Result<(), ParseError> {
        let Some((tag, value)) = split_tag(self.lines[index]) else {
            return Ok(());
        };

        let stored = (!value.is_empty()).then(|| value.to_owned());
        match tag.as_str() {
            "title" => self.song.title = value.to_owned(),
            "artist" => self.song.artist = stored,
            "displaybpm" => self.displaybpm = stored,
            "bpm" => self.bpm = stored,
            "changebpm" => self.changebpm = stored,
            "freeze" => self.stops = stored,
            "single" => self.parse_notes(Mode::Single, value)?,
            "double" => self.parse_notes(Mode::Double, value)?,
            _ => {}
        }

        Ok(())
    }

    /// Parses one `#SINGLE`/`#DOUBLE` value:
    /// `difficulty:feet:steps[:player2steps]`.
    fn parse_notes(&mut self, mode: Mode, raw_notes: &str) -> Result<(), ParseError> {
        let values: Vec<&str> = raw_notes.split(':').collect();
        let difficulty_token = values.first().copied().unwrap_or("");
        let Some(difficulty) = Difficulty::normalize(difficulty_token) else {
            self.tolerance
                .report(ParseWarning::UnknownDifficulty(difficulty_token.to_owned()))?;
            return Ok(());
        };
        let feet = values.get(1).copied().unwrap_or("").trim().parse().unwrap_or(0);
        let notes = values.get(2).copied().unwrap_or("");
        let player_two_notes = values.get(3).copied();

        let first_index = find_first_non_empty_measure(notes, player_two_notes);

        let label = format!("{}, {mode}, {difficulty}", self.song.title);
        let mut collected = parse_arrow_stream(notes, first_index, self.tolerance, &label)?;

        if mode == Mode::Double {
            let player_two = parse_arrow_stream(
                player_two_notes.unwrap_or(""),
                first_index,
                self.tolerance,
                &label,
            )?;
            collected.extend(
                player_two
                    .into_iter()
                    .map(|(offset, note)| (offset, shift_columns(note))),
            );
        }

        let mut collector = NoteCollector::default();
        for (offset, note) in collected {
            collector.push(offset, note);
        }

        let chart = Stepchart {
            beats: collector.into_beats(),
            bpm: self.determine_bpm(first_index)?,
            stops: self.determine_stops(first_index),
        };
        let kind = StepchartType::new(mode, difficulty, feet);
        self.song.charts.insert(kind.slug.clone(), chart);
        self.song.available_types.push(kind);

        Ok(())
    }

    /// Builds the tempo timeline for a chart whose leading `empty_offset`
    /// characters (eighth notes) were skipped.
    fn determine_bpm(&self, empty_offset: usize) -> Result<Vec<BpmChange>, ParseError> {
        let mut final_bpms: Vec<BpmChange> = Vec::new();

        if let Some(bpm) = &self.bpm
            && let Ok(value) = bpm.trim().parse::<f64>()
        {
            final_bpms.push(BpmChange {
                start_offset: 0.0,
                end_offset: None,
                bpm: value,
            });
        }

        if let Some(changebpm) = &self.changebpm {
            let rebase = empty_offset as f64 / 2.0;
            let entries: Vec<&str> = changebpm.split(',').collect();
            let additional: Vec<BpmChange> = entries
                .iter()
                .enumerate()
                .map(|(i, entry)| {
                    let (pos_s, bpm_s) =
                        entry.trim().split_once('=').unwrap_or((entry.trim(), ""));
                    let next_pos = entries
                        .get(i + 1)
                        .map(|next| next.trim().split('=').next().unwrap_or(""))
                        .and_then(|s| s.parse::<f64>().ok());

                    BpmChange {
                        start_offset: pos_s.parse::<f64>().unwrap_or_default() / 4.0 - rebase,
                        end_offset: next_pos.map(|pos| pos / 4.0 - rebase),
                        bpm: bpm_s.parse().unwrap_or_default(),
                    }
                })
                .collect();

            final_bpms.extend(additional);
            if final_bpms.len() >= 2 {
                final_bpms[0].end_offset = Some(final_bpms[1].start_offset);
            }
        }

        if final_bpms.is_empty() {
            return Err(ParseError::MissingBpms);
        }

        Ok(merge_similar_bpm_ranges(&final_bpms))
    }

    /// Builds the stop list from the `#FREEZE` tag, re-based like the BPMs.
    fn determine_stops(&self, empty_offset: usize) -> Vec<Stop> {
        let Some(stops) = &self.stops else {
            return Vec::new();
        };
        let rebase = empty_offset as f64 / 2.0;

        stops
            .split(',')
            .map(|entry| {
                let (pos_s, duration_s) = entry.trim().split_once('=').unwrap_or((entry.trim(), ""));
                Stop {
                    offset: pos_s.parse::<f64>().unwrap_or_default() / 4.0 - rebase,
                    duration: duration_s.parse().unwrap_or_default(),
                }
            })
            .collect()
    }
}

/// A DWI display BPM is a plain number, a `low..high` range, or `*`.
fn format_display_bpm(displaybpm: &str) -> String {
    if displaybpm.trim().parse::<f64>().is_ok() {
        return displaybpm.trim().to_owned();
    }
    if let Some((low, high)) = displaybpm.split_once("..") {
        return format!("{}-{}", low.trim(), high.trim());
    }
    // displayBpm is allowed to be '*', pass it through
    displaybpm.trim().to_owned()
}
