//! Pack traversal: aggregate every song of a pack directory tree.
//!
//! A pack is a directory of song directories. One malformed song must not
//! take the pack down with it: unless the caller asked to bail, bad songs
//! are reported and excluded, and the pack carries on with the rest.

use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{
    simfile::parse::Tolerance,
    song::{Simfile, SongError, parse_song},
};

/// Metadata about one pack of songs.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pack {
    /// Pack name, derived from the directory basename.
    pub name: String,
    /// The pack directory.
    pub dir: PathBuf,
    /// How many songs parsed successfully.
    pub song_count: usize,
}

/// A pack together with every song that parsed.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PackWithSongs {
    /// Metadata about the pack.
    pub pack: Pack,
    /// The parsed songs.
    pub simfiles: Vec<Simfile>,
}

fn subdirectories(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut dirs: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    dirs.sort();
    Ok(dirs)
}

/// Parses an entire pack directory and returns all of its data.
///
/// Per-song failures are routed through `tolerance`: a malformed song is
/// excluded (and logged under [`Tolerance::Warn`]) while the remaining
/// songs still parse. [`Pack::song_count`] counts only the songs that made
/// it.
///
/// # Errors
///
/// Returns [`SongError`] when the pack directory itself cannot be listed,
/// or when `tolerance` is [`Tolerance::Bail`] and any song fails.
pub fn get_pack(dir: &Path, tolerance: Tolerance) -> Result<PackWithSongs, SongError> {
    let mut simfiles = Vec::new();

    for song_dir in subdirectories(dir)? {
        match parse_song(&song_dir, tolerance) {
            Ok(Some(simfile)) => simfiles.push(simfile),
            Ok(None) => {
                log::debug!("no usable simfile in {}", song_dir.display());
            }
            Err(err) => match tolerance {
                Tolerance::Bail => return Err(err),
                Tolerance::Warn => {
                    log::warn!("skipping song {}: {err}", song_dir.display());
                }
                Tolerance::Ignore => {}
            },
        }
    }

    let name = dir
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
        .replace('-', " ");

    Ok(PackWithSongs {
        pack: Pack {
            name,
            dir: dir.to_path_buf(),
            song_count: simfiles.len(),
        },
        simfiles,
    })
}

/// Convenience function to call [`get_pack`] on every immediate
/// subdirectory of a songs root.
///
/// # Errors
///
/// Returns [`SongError`] under the same conditions as [`get_pack`].
pub fn get_all_packs(root: &Path, tolerance: Tolerance) -> Result<Vec<PackWithSongs>, SongError> {
    subdirectories(root)?
        .iter()
        .map(|dir| get_pack(dir, tolerance))
        .collect()
}
