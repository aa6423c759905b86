//! File and directory manipulation utilities.

use std::ffi::OsStr;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::{fs, io};

use anyhow::bail;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{from_reader, to_writer_pretty};
use tracing::debug;

use crate::csv;
use crate::game::Game;

/// Reads a JSON-encoded type from a given file `path`.
pub fn read_json<D: DeserializeOwned>(path: impl AsRef<Path>) -> Result<D, io::Error> {
    let file = File::open(path)?;
    Ok(from_reader(file)?)
}

/// Writes `value` to `path` as pretty-printed JSON, replacing any existing file.
pub fn write_json<S: Serialize>(path: impl AsRef<Path>, value: &S) -> Result<(), io::Error> {
    let file = File::create(path)?;
    Ok(to_writer_pretty(BufWriter::new(file), value)?)
}

pub trait ReadJsonFile<D> {
    fn read_json_file(path: impl AsRef<Path>) -> Result<D, io::Error>;
}

impl<D: DeserializeOwned> ReadJsonFile<D> for D {
    fn read_json_file(path: impl AsRef<Path>) -> Result<D, io::Error> {
        read_json(path)
    }
}

/// Recursively locates all files in a given directory matching the supplied `extension_filter`.
/// The located files are written into the `files` vector. If the given `path` is a file that
/// matches the filter (rather than a directory), it is added to `files`.
pub fn recurse_dir(
    path: PathBuf,
    files: &mut Vec<PathBuf>,
    extension_filter: &mut impl FnMut(&OsStr) -> bool,
) -> Result<(), io::Error> {
    let md = fs::metadata(&path)?;
    if md.is_dir() {
        let entries = fs::read_dir(path)?;
        for entry in entries {
            recurse_dir(entry?.path(), files, extension_filter)?;
        }
    } else if extension_filter(path.extension().unwrap_or_default()) {
        files.push(path);
    }
    Ok(())
}

/// Loads games from a `.json` file (an array of games), a `.csv` file, or a directory searched
/// recursively for both. Files are read in path order; the games are returned in file order and
/// are not yet sorted.
pub fn read_games(path: impl AsRef<Path>) -> Result<Vec<Game>, anyhow::Error> {
    let path = path.as_ref();
    let mut files = vec![];
    recurse_dir(path.into(), &mut files, &mut |ext| ext == "json" || ext == "csv")?;
    if files.is_empty() && path.is_file() {
        bail!("unsupported game file {}", path.display());
    }
    files.sort();

    let mut games = vec![];
    for file in files {
        let mut loaded = if file.extension().unwrap_or_default() == "csv" {
            csv::read_games(&file)?
        } else {
            Vec::<Game>::read_json_file(&file)?
        };
        debug!("read {} games from {}", loaded.len(), file.display());
        games.append(&mut loaded);
    }
    Ok(games)
}
