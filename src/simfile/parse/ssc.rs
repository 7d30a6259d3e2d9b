//! SSC format parser.
//!
//! Ref: <https://github.com/stepmania/stepmania/wiki/ssc>
//!
//! SSC unpacks the SM `#NOTES` header into dedicated tags: `#NOTEDATA`
//! opens a chart, `#STEPSTYPE`/`#DIFFICULTY`/`#METER` fill it in, and
//! `#NOTES` carries only the measure grid. The grid itself also grows the
//! two-character `DM`/`DL` codes.

use crate::simfile::{
    model::{Difficulty, Mode, RawSimfile, Stepchart, StepchartType},
    parse::{
        ParseError, ParseWarning, Tolerance, grid, read_multiline_value, split_tag,
        with_wrapped_errors,
    },
};

/// Parses the entire contents of an `.ssc` file.
///
/// # Errors
///
/// Returns a [`ParseError`] carrying a source snippet when the file has no
/// tempo, a chart tag appears outside a `#NOTEDATA` block, or the given
/// [`Tolerance`] escalates a data-quality problem.
pub fn parse_ssc(source: &str, tolerance: Tolerance) -> Result<RawSimfile, ParseError> {
    with_wrapped_errors(source, || SscParser::new(source, tolerance).parse())
}

#[derive(Default)]
struct ChartInProgress {
    mode: Option<Mode>,
    difficulty: Option<Difficulty>,
    feet: u32,
    chart: Option<Stepchart>,
}

struct SscParser<'a> {
    lines: Vec<&'a str>,
    tolerance: Tolerance,
    bpm_string: Option<String>,
    stops_string: Option<String>,
    current_chart: Option<ChartInProgress>,
    song: RawSimfile,
}

impl<'a> SscParser<'a> {
    fn new(source: &'a str, tolerance: Tolerance) -> Self {
        Self {
            lines: source.lines().map(str::trim).collect(),
            tolerance,
            bpm_string: None,
            stops_string: None,
            current_chart: None,
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

        // commit last pending chart, if it exists
        self.commit_current_chart()?;
        Ok(self.song)
    }

    fn parse_tag(&mut self, index: usize) -> Result<usize, ParseError> {
        let Some((tag, value)) = split_tag(self.lines[index]) else {
            return Ok(index + 1);
        };

        match tag.as_str() {
            "title" | "titletranslit" | "artist" => {
                if !value.is_empty() {
                    match tag.as_str() {
                        "title" => self.song.title = value.to_owned(),
                        "titletranslit" => self.song.titletranslit = Some(value.to_owned()),
                        _ => self.song.artist = Some(value.to_owned()),
                    }
                }
            }
            "banner" => self.song.images.banner = Some(value.to_owned()),
            "background" => self.song.images.bg = Some(value.to_owned()),
            "jacket" => self.song.images.jacket = Some(value.to_owned()),
            "stepstype" | "difficulty" | "meter" => self.consume_chart_tag(&tag, value)?,
            "displaybpm" => self.song.display_bpm = Some(format_display_bpm(value)),
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
            "notedata" => {
                self.commit_current_chart()?;
                self.current_chart = Some(ChartInProgress::default());
            }
            "notes" => {
                if self.bpm_string.is_none() {
                    return Err(ParseError::MissingBpms);
                }
                return self.parse_notes(index);
            }
            _ => {}
        }

        Ok(index + 1)
    }

    /// Adds one `#STEPSTYPE`/`#DIFFICULTY`/`#METER` value to the chart in
    /// progress.
    fn consume_chart_tag(&mut self, tag: &str, value: &str) -> Result<(), ParseError> {
        let tolerance = self.tolerance;
        let Some(current) = self.current_chart.as_mut() else {
            return Err(ParseError::ChartTagBeforeChart);
        };
        match tag {
            "stepstype" => current.mode = Mode::normalize(value),
            "difficulty" => {
                current.difficulty = Difficulty::normalize(value);
                if current.difficulty.is_none() {
                    tolerance.report(ParseWarning::UnknownDifficulty(value.to_owned()))?;
                }
            }
            _ => current.feet = value.parse().unwrap_or(0),
        }
        Ok(())
    }

    /// Registers the chart in progress, if it gathered everything it needs.
    fn commit_current_chart(&mut self) -> Result<(), ParseError> {
        let Some(current) = self.current_chart.take() else {
            return Ok(());
        };
        match (current.chart, current.mode, current.difficulty) {
            (Some(chart), Some(mode), Some(difficulty)) => {
                let kind = StepchartType::new(mode, difficulty, current.feet);
                self.song.charts.insert(kind.slug.clone(), chart);
                self.song.available_types.push(kind);
            }
            _ => self.tolerance.report(ParseWarning::IncompleteChart)?,
        }
        Ok(())
    }

    /// Parses one `#NOTES` measure grid into the chart in progress.
    fn parse_notes(&mut self, mut i: usize) -> Result<usize, ParseError> {
        let (mode, difficulty) = match self.current_chart.as_ref() {
            Some(ChartInProgress {
                mode: Some(mode),
                difficulty: Some(difficulty),
                ..
            }) => (*mode, *difficulty),
            // a chart this crate can't register (unknown mode or dropped
            // difficulty); skip the grid without scanning it
            _ => {
                self.current_chart = None;
                return Ok(self.skip_note_block(i + 1));
            }
        };

        // move past #NOTES into the first measure
        i += 1;

        let Some(first) =
            grid::find_first_non_empty_measure(&self.lines, i, mode.columns(), true)
        else {
            // bail on current chart
            self.current_chart = None;
            return Ok(self.skip_note_block(i));
        };

        let label = format!("{}, {mode}, {difficulty}", self.song.title);
        let scanned = grid::scan_note_grid(
            &self.lines,
            first.line_index,
            mode.columns(),
            true,
            self.tolerance,
            &label,
        )?;

        let bpm_string = self.bpm_string.as_deref().unwrap_or_default();
        let chart = Stepchart {
            beats: scanned.beats,
            bpm: grid::parse_bpm_string(bpm_string, first.measures_skipped),
            stops: grid::parse_stop_string(self.stops_string.as_deref(), first.measures_skipped),
        };
        if let Some(current) = self.current_chart.as_mut() {
            current.chart = Some(chart);
        }

        Ok(scanned.end_index + 1)
    }

    /// Advances past the remainder of a notes block, returning the index
    /// just after its terminator.
    fn skip_note_block(&self, mut i: usize) -> usize {
        while i < self.lines.len() && !grid::concludes_a_note_tag(Some(self.lines[i])) {
            i += 1;
        }
        i + 1
    }
}

/// `#DISPLAYBPM` carries `value` or `low:high`; render both as the display
/// string, rounding each numeric part.
fn format_display_bpm(value: &str) -> String {
    value
        .split(':')
        .map(|part| {
            part.trim()
                .parse::<f64>()
                .map_or_else(|_| part.trim().to_owned(), |v| format!("{}", v.round()))
        })
        .collect::<Vec<_>>()
        .join("-")
}
