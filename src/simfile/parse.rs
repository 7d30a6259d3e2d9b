//! Parsing simfile text into [`RawSimfile`].
//!
//! Raw text == [`dwi`]/[`sm`]/[`ssc`] ==> [`RawSimfile`]
//!
//! All three format parsers share one skeleton: scan tag lines, capture
//! metadata verbatim, defer the raw timing strings until a chart's leading
//! empty measures are known, and walk each note grid with an exact
//! [`Fraction`](crate::simfile::fraction::Fraction) offset. Recoverable
//! data-quality problems are routed through an explicit [`Tolerance`] value
//! so parses stay independent; there is no process-wide state.

pub mod dwi;
pub(crate) mod grid;
pub mod sm;
pub mod ssc;

use thiserror::Error;

use crate::simfile::model::RawSimfile;

/// How recoverable data-quality problems are handled.
///
/// Fatal structural errors (no tempo, no parsable measure) ignore this and
/// always fail the parse; see [`ParseError`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Tolerance {
    /// Escalate the problem to a [`ParseError`].
    Bail,
    /// Log the problem and continue, leaving the malformed entity dropped
    /// or partial.
    #[default]
    Warn,
    /// Silently continue.
    Ignore,
}

impl Tolerance {
    /// Routes one recoverable problem through the policy.
    pub(crate) fn report(self, warning: ParseWarning) -> Result<(), ParseError> {
        match self {
            Self::Bail => Err(ParseError::Aborted(warning)),
            Self::Warn => {
                log::warn!("{warning}");
                Ok(())
            }
            Self::Ignore => Ok(()),
        }
    }
}

/// A recoverable data-quality problem found while parsing.
///
/// Whether one of these surfaces as a log line, silence, or a failed parse
/// is decided by the [`Tolerance`] the caller passed in.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ParseWarning {
    /// A hold head appeared in a column whose previous hold never closed.
    #[error("{chart}: found a new starting hold in column {column} before a previous one finished")]
    ReopenedHold {
        /// Chart label, for the log line.
        chart: String,
        /// The offending column.
        column: usize,
    },
    /// A hold tail appeared in a column with no open hold.
    #[error("{chart}: tried to close a hold in column {column} that never opened")]
    OrphanHoldTail {
        /// Chart label, for the log line.
        chart: String,
        /// The offending column.
        column: usize,
    },
    /// A hold was still open when its chart ended; the hold is dropped.
    #[error("{chart}: hold in column {column} never closed before the chart ended")]
    UnfinishedHold {
        /// Chart label, for the log line.
        chart: String,
        /// The offending column.
        column: usize,
    },
    /// A difficulty name outside the known vocabulary; the chart is dropped.
    #[error("unrecognized difficulty name `{0}`")]
    UnknownDifficulty(String),
    /// A chart block ended without the metadata needed to register it.
    #[error("incomplete chart info available")]
    IncompleteChart,
    /// A step code outside the known DWI vocabulary.
    #[error("{chart}: unrecognized pad code `{code}`")]
    UnknownPadCode {
        /// Chart label, for the log line.
        chart: String,
        /// The unrecognized character.
        code: char,
    },
    /// A whole song yielded no charts at all.
    #[error("failed to parse any charts from song: {0}")]
    NoCharts(String),
}

/// A fatal structural error; no valid chart object could be constructed.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ParseError {
    /// A notes block was reached but no BPM was ever defined.
    #[error("about to parse notes but never got bpm")]
    MissingBpms,
    /// No measure in the entire chart contains a step.
    #[error("failed to find a non-empty measure in entire song")]
    NoNonEmptyMeasure,
    /// A chart property tag appeared before any chart was started.
    #[error("got chart tag before start of first chart")]
    ChartTagBeforeChart,
    /// A recoverable problem escalated by [`Tolerance::Bail`].
    #[error("parse aborted: {0}")]
    Aborted(#[from] ParseWarning),
    /// Wrapper attached at the parse entry point, carrying a snippet of the
    /// offending source text and the underlying error as its cause.
    #[error("error parsing {snippet}")]
    Simfile {
        /// The first few hundred characters of the source.
        snippet: String,
        /// The underlying error.
        #[source]
        source: Box<ParseError>,
    },
}

impl ParseError {
    /// Wraps an error with a snippet of the source it came from.
    pub(crate) fn with_snippet(source_text: &str, inner: Self) -> Self {
        Self::Simfile {
            snippet: source_text.chars().take(300).collect(),
            source: Box::new(inner),
        }
    }
}

/// Splits a `#TAG:value` line into a lowercased tag name and its raw value.
///
/// The value ends at the first `;` or at the end of the line; multi-line
/// values are the caller's concern. Returns `None` for lines that are not
/// tag lines.
pub(crate) fn split_tag(line: &str) -> Option<(String, &str)> {
    let rest = line.strip_prefix('#')?;
    let (tag, value) = rest.split_once(':')?;
    if tag.is_empty() || !tag.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let value = value.split(';').next().unwrap_or("");
    Some((tag.to_ascii_lowercase(), value))
}

/// Continues reading a tag value across physical lines until a terminating
/// `;`, starting from the line at `*index`. Used for `BPMS`/`STOPS` values
/// that sources often break across lines.
pub(crate) fn read_multiline_value(lines: &[&str], index: &mut usize, first_value: &str) -> String {
    let mut value = first_value.to_owned();
    let mut line = lines[*index];
    while !line.ends_with(';') && *index + 1 < lines.len() {
        *index += 1;
        line = lines[*index];
        value.push_str(line.split(';').next().unwrap_or(""));
    }
    value
}

/// Parses one format's source text, wrapping any failure with a source
/// snippet.
pub(crate) fn with_wrapped_errors(
    source: &str,
    parse: impl FnOnce() -> Result<RawSimfile, ParseError>,
) -> Result<RawSimfile, ParseError> {
    parse().map_err(|e| ParseError::with_snippet(source, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_tag_extracts_name_and_value() {
        assert_eq!(
            split_tag("#TITLE:AFRONOVA;"),
            Some(("title".to_owned(), "AFRONOVA"))
        );
        assert_eq!(split_tag("#ARTIST:;"), Some(("artist".to_owned(), "")));
    }

    #[test]
    fn split_tag_ignores_non_tag_lines() {
        assert_eq!(split_tag("0000"), None);
        assert_eq!(split_tag("#NOCOLON"), None);
        assert_eq!(split_tag("#B4D:tag;"), None);
    }

    #[test]
    fn multiline_value_concatenates_until_semicolon() {
        let lines = ["#BPMS:0=150", ",4=152", ",8=170;", "#STOPS:;"];
        let mut index = 0;
        let value = read_multiline_value(&lines, &mut index, "0=150");
        assert_eq!(value, "0=150,4=152,8=170");
        assert_eq!(index, 2);
    }

    #[test]
    fn bail_escalates_warnings() {
        let err = Tolerance::Bail.report(ParseWarning::IncompleteChart);
        assert!(matches!(err, Err(ParseError::Aborted(_))));
        assert!(Tolerance::Warn.report(ParseWarning::IncompleteChart).is_ok());
        assert!(
            Tolerance::Ignore
                .report(ParseWarning::IncompleteChart)
                .is_ok()
        );
    }
}
