//! Song assembly: derived song-level metadata and image resolution.
//!
//! A format parser only reports what the file says. This module turns that
//! into a [`Simfile`]: it derives the BPM range and display string, counts
//! the stops, and reconciles tagged image names against what actually sits
//! in the song directory.

use std::{fs, path::Path};

use thiserror::Error;

use crate::simfile::{
    Format, compare_file_candidates,
    model::{RawSimfile, Stepchart, StepchartType, TaggedImages},
    parse::{ParseError, ParseWarning, Tolerance},
};

/// Song title metadata, image references resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Title {
    /// The song title as written in the simfile.
    pub title_name: String,
    /// The transliterated title, when the title uses a non-Latin script.
    pub translit_title_name: Option<String>,
    /// Name of the song directory this simfile came from.
    pub title_dir: String,
    /// The resolved banner image file name.
    pub banner: Option<String>,
    /// The resolved background image file name.
    pub bg: Option<String>,
    /// The resolved jacket image file name.
    pub jacket: Option<String>,
}

/// One fully-assembled song.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Simfile {
    /// Metadata about the song.
    pub title: Title,
    /// The song artist.
    pub artist: Option<String>,
    /// Descriptors for every available chart.
    pub available_types: Vec<StepchartType>,
    /// The charts, keyed by [`StepchartType::slug`].
    pub charts: std::collections::BTreeMap<String, Stepchart>,
    /// The lowest BPM of the representative chart, rounded.
    pub min_bpm: i32,
    /// The highest BPM of the representative chart, rounded.
    pub max_bpm: i32,
    /// Human-readable BPM, `"150"` or `"100-180"`.
    pub display_bpm: String,
    /// How many scroll stops the representative chart has.
    pub stop_count: usize,
}

/// An error assembling one song.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum SongError {
    /// The song directory could not be listed or read.
    #[error("failed to read song directory: {0}")]
    Io(#[from] std::io::Error),
    /// The chart-definition file failed to parse.
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Parses a single simfile from a song directory.
///
/// Automatically determines which parser to use depending on the chart
/// definition files present, preferring them in [`Format::PRIORITY`] order.
/// Returns `Ok(None)` when the directory holds no supported file, or when
/// the song was dropped by `tolerance`.
///
/// # Errors
///
/// Returns [`SongError`] when the directory cannot be read, or the chart
/// definition fails to parse.
pub fn parse_song(song_dir: &Path, tolerance: Tolerance) -> Result<Option<Simfile>, SongError> {
    let mut files: Vec<String> = fs::read_dir(song_dir)?
        .filter_map(Result::ok)
        .filter(|entry| entry.path().is_file())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect();
    files.sort();

    let mut candidates: Vec<&str> = files
        .iter()
        .map(String::as_str)
        .filter(|name| Format::from_file_name(name).is_some())
        .collect();
    candidates.sort_by(|a, b| compare_file_candidates(a, b));
    let Some(song_file) = candidates.first() else {
        return Ok(None);
    };
    let Some(format) = Format::from_file_name(song_file) else {
        return Ok(None);
    };

    let bytes = fs::read(song_dir.join(song_file))?;
    let source = String::from_utf8_lossy(&bytes);
    let raw = format.parse(&source, tolerance)?;

    let title_dir = song_dir
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    assemble_song(raw, &title_dir, &files, tolerance)
}

/// Assembles a parsed simfile into a [`Simfile`], resolving images against
/// the file names found in its directory.
///
/// Returns `Ok(None)` when the parse produced no charts and `tolerance`
/// chose to drop the song rather than fail.
///
/// # Errors
///
/// Returns [`SongError`] when `tolerance` is [`Tolerance::Bail`] and the
/// parse produced no charts.
pub fn assemble_song(
    raw: RawSimfile,
    title_dir: &str,
    files: &[String],
    tolerance: Tolerance,
) -> Result<Option<Simfile>, SongError> {
    let Some(representative) = raw.representative_chart() else {
        tolerance.report(ParseWarning::NoCharts(raw.title.clone()))?;
        return Ok(None);
    };

    let bpms: Vec<f64> = representative.bpm.iter().map(|segment| segment.bpm).collect();
    let min_bpm = round_bpm(bpms.iter().copied().fold(f64::INFINITY, f64::min));
    let max_bpm = round_bpm(bpms.iter().copied().fold(f64::NEG_INFINITY, f64::max));

    let display_bpm = raw.display_bpm.clone().unwrap_or_else(|| {
        if min_bpm == max_bpm {
            min_bpm.to_string()
        } else {
            format!("{min_bpm}-{max_bpm}")
        }
    });
    let stop_count = representative.stops.len();

    let (jacket, bg, banner) = resolve_images(&raw.images, files);

    Ok(Some(Simfile {
        title: Title {
            title_name: raw.title,
            translit_title_name: raw.titletranslit,
            title_dir: title_dir.to_owned(),
            banner,
            bg,
            jacket,
        },
        artist: raw.artist,
        available_types: raw.available_types,
        charts: raw.charts,
        min_bpm,
        max_bpm,
        display_bpm,
        stop_count,
    }))
}

fn round_bpm(value: f64) -> i32 {
    if value.is_finite() { value.round() as i32 } else { 0 }
}

const IMAGE_EXTENSIONS: [&str; 2] = [".png", ".jpg"];

fn is_image(name: &str) -> bool {
    IMAGE_EXTENSIONS.iter().any(|ext| name.ends_with(ext))
}

fn extension(name: &str) -> Option<&str> {
    name.rfind('.').map(|dot| &name[dot..])
}

/// Make some best guesses about which images should be used for which
/// fields: explicit tags win, then the conventional name patterns, then
/// whatever is left over fills jacket, bg, and banner in that order.
fn resolve_images(
    tagged: &TaggedImages,
    files: &[String],
) -> (Option<String>, Option<String>, Option<String>) {
    let tagged_present = |claim: &Option<String>| {
        claim
            .as_ref()
            .filter(|name| files.iter().any(|f| f == *name))
            .cloned()
    };
    let mut jacket = tagged_present(&tagged.jacket);
    let mut bg = tagged_present(&tagged.bg);
    let mut banner = tagged_present(&tagged.banner);

    let mut leftovers: Vec<&String> = Vec::new();
    for image in files.iter().filter(|name| is_image(name)) {
        let Some(ext) = extension(image) else {
            continue;
        };
        if (tagged.jacket.is_none() && image.ends_with(&format!("-jacket{ext}")))
            || image.starts_with("jacket.")
        {
            jacket = Some(image.clone());
        } else if (tagged.bg.is_none() && image.ends_with(&format!("-bg{ext}")))
            || image.starts_with("bg.")
        {
            bg = Some(image.clone());
        } else if (tagged.banner.is_none() && image.ends_with(&format!("-bn{ext}")))
            || image.starts_with("bn.")
        {
            banner = Some(image.clone());
        } else {
            leftovers.push(image);
        }
    }

    // files already claimed by a tag or pattern are not up for grabs
    leftovers.retain(|name| {
        [&jacket, &bg, &banner]
            .iter()
            .all(|claimed| claimed.as_ref() != Some(*name))
    });

    let mut leftovers = leftovers.into_iter();
    if jacket.is_none() {
        jacket = leftovers.next().cloned();
    }
    if bg.is_none() {
        bg = leftovers.next().cloned();
    }
    if banner.is_none() {
        banner = leftovers.next().cloned();
    }

    (jacket, bg, banner)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn files(names: &[&str]) -> Vec<String> {
        names.iter().map(|&n| n.to_owned()).collect()
    }

    #[test]
    fn pattern_names_resolve_without_tags() {
        let (jacket, bg, banner) = resolve_images(
            &TaggedImages::default(),
            &files(&["AFRONOVA-bg.png", "AFRONOVA-jacket.png", "AFRONOVA-bn.png"]),
        );
        assert_eq!(jacket.as_deref(), Some("AFRONOVA-jacket.png"));
        assert_eq!(bg.as_deref(), Some("AFRONOVA-bg.png"));
        assert_eq!(banner.as_deref(), Some("AFRONOVA-bn.png"));
    }

    #[test]
    fn explicit_tags_win_over_patterns() {
        let tagged = TaggedImages {
            banner: Some("custom.png".to_owned()),
            bg: None,
            jacket: None,
        };
        let (_, _, banner) =
            resolve_images(&tagged, &files(&["custom.png", "other-bn.png"]));
        assert_eq!(banner.as_deref(), Some("custom.png"));
    }

    #[test]
    fn leftovers_fill_jacket_then_bg_then_banner() {
        let (jacket, bg, banner) = resolve_images(
            &TaggedImages::default(),
            &files(&["a.png", "b.png", "notes.txt"]),
        );
        assert_eq!(jacket.as_deref(), Some("a.png"));
        assert_eq!(bg.as_deref(), Some("b.png"));
        assert_eq!(banner, None);
    }

    #[test]
    fn missing_tagged_file_is_not_resolved() {
        let tagged = TaggedImages {
            banner: Some("gone.png".to_owned()),
            bg: None,
            jacket: None,
        };
        let (_, _, banner) = resolve_images(&tagged, &files(&[]));
        assert_eq!(banner, None);
    }
}
