//! SM format parser.
//!
//! Ref: <https://github.com/stepmania/stepmania/wiki/sm>
//!
//! SM keeps one song-wide `#BPMS`/`#STOPS` timeline and one `#NOTES` block
//! per chart, with the chart's mode/author/difficulty/rating packed into
//! the five header lines of the block.

use crate::simfile::{
    model::{Difficulty, Mode, RawSimfile, Stepchart, StepchartType},
    parse::{
        ParseError, ParseWarning, Tolerance, grid, read_multiline_value, split_tag,
        with_wrapped_errors,
    },
};

/// Parses the entire contents of an `.sm` file.
///
/// # Errors
///
/// Returns a [`ParseError`] carrying a source snippet when the file has no
/// tempo, a chart has no steps at all, or the given [`Tolerance`] escalates
/// a data-quality problem.
pub fn parse_sm(source: &str, tolerance: Tolerance) -> Result<RawSimfile, ParseError> {
    with_wrapped_errors(source, || SmParser::new(source, tolerance).parse())
}

struct SmParser<'a> {
    lines: Vec<&'a str>,
    tolerance: Tolerance,
    bpm_string: Option<String>,
    stops_string: Option<String>,
    song: RawSimfile,
}

impl<'a> SmParser<'a> {
    fn new(source: &'a str, tolerance: Tolerance) -> Self {
        Self {
            lines: source.lines().map(str::trim).collect(),
            tolerance,
            bpm_string: None,
            stops_string: None,
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
                i = self.parse_tag(i)?;
            } else {
                i += 1;
            }
        }
        Ok(self.song)
    }

    fn parse_tag(&mut self, index: usize) -> Result<usize, ParseError> {
        let Some((tag, value)) = split_tag(self.lines[index]) else {
            return Ok(index + 1);
        };

        match tag.as_str() {
            "title" => self.song.title = value.to_owned(),
            "titletranslit" => {
                if !value.is_empty() {
                    self.song.titletranslit = Some(value.to_owned());
                }
            }
            "artist" => {
                if !value.is_empty() {
                    self.song.artist = Some(value.to_owned());
                }
            }
            "banner" => self.song.images.banner = Some(value.to_owned()),
            "background" => self.song.images.bg = Some(value.to_owned()),
            "jacket" => self.song.images.jacket = Some(value.to_owned()),
            "displaybpm" => self.song.display_bpm = Some(value.replace(':', "-")),
            "bpms" => {
                let mut idx = index;
                let joined = read_multiline_value(&self.lines, &mut idx, value);
                self.bpm_string = Some(joined);
                return Ok(idx + 1);
            }
            "stops" => {
                let mut idx = index;
                let joined = read_multiline_value(&self.lines, &mut idx, value);
                self.stops_string = Some(joined);
                return Ok(idx + 1);
            }
            "notes" => {
                let Some(bpm_string) = self.bpm_string.clone() else {
                    return Err(ParseError::MissingBpms);
                };
                return self.parse_notes(index, &bpm_string);
            }
            _ => {}
        }

        Ok(index + 1)
    }

    /// Parses one `#NOTES` block: five header lines, then the measure grid.
    fn parse_notes(&mut self, mut i: usize, bpm_string: &str) -> Result<usize, ParseError> {
        // move past #NOTES into the note metadata
        i += 1;
        let mode_token = self.header_line(i);
        i += 2; // skip author for now
        let difficulty_token = self.header_line(i);
        i += 1;
        let feet = self.header_line(i).parse().unwrap_or(0);
        i += 2; // skip groove meter data for now

        // skip couple, versus, etc for now
        let Some(mode) = Mode::normalize(&mode_token) else {
            return Ok(i + 1);
        };
        let Some(difficulty) = Difficulty::normalize(&difficulty_token) else {
            self.tolerance
                .report(ParseWarning::UnknownDifficulty(difficulty_token))?;
            return Ok(i + 1);
        };

        // now i is pointing at the first measure
        let first = grid::find_first_non_empty_measure(&self.lines, i, mode.columns(), false)
            .ok_or(ParseError::NoNonEmptyMeasure)?;

        let label = format!("{}, {mode}, {difficulty}", self.song.title);
        let scanned = grid::scan_note_grid(
            &self.lines,
            first.line_index,
            mode.columns(),
            false,
            self.tolerance,
            &label,
        )?;

        let chart = Stepchart {
            beats: scanned.beats,
            bpm: grid::parse_bpm_string(bpm_string, first.measures_skipped),
            stops: grid::parse_stop_string(self.stops_string.as_deref(), first.measures_skipped),
        };
        let kind = StepchartType::new(mode, difficulty, feet);
        self.song.charts.insert(kind.slug.clone(), chart);
        self.song.available_types.push(kind);

        Ok(scanned.end_index + 1)
    }

    /// One of the `value:` header lines of a `#NOTES` block, sans colon.
    fn header_line(&self, i: usize) -> String {
        self.lines.get(i).copied().unwrap_or("").replace(':', "")
    }
}
