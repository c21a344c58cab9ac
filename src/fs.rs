//! Thin wrappers around `std::fs` that attach the offending path to every error.

use std::{
    fs::OpenOptions,
    io::{self, Write},
    path::{Path, PathBuf},
};

use log::trace;
use miette::Diagnostic;
use thiserror::Error;

pub(crate) fn write<C: AsRef<[u8]>>(path: &Path, contents: C) -> Result<(), Error> {
    trace!("Writing {}", path.display());
    std::fs::write(path, contents).map_err(|source| Error::Write {
        path: path.into(),
        source,
    })
}

/// Writes `contents` to `path` only if nothing is there yet. Returns `false` if `path` exists.
pub(crate) fn write_new<C: AsRef<[u8]>>(path: &Path, contents: C) -> Result<bool, Error> {
    trace!("Writing new file {}", path.display());
    let to_error = |source: io::Error| Error::Write {
        path: path.into(),
        source,
    };
    let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == io::ErrorKind::AlreadyExists => return Ok(false),
        Err(source) => return Err(to_error(source)),
    };
    file.write_all(contents.as_ref()).map_err(to_error)?;
    Ok(true)
}

pub(crate) fn create_dir(path: &Path) -> Result<(), Error> {
    trace!("Creating directory {}", path.display());
    std::fs::create_dir_all(path).map_err(|source| Error::Write {
        path: path.into(),
        source,
    })
}

pub(crate) fn read_to_string(path: &Path) -> Result<String, Error> {
    std::fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.into(),
        source,
    })
}

/// Lists the directories directly inside `path`. A missing `path` is treated as empty.
pub(crate) fn list_dirs(path: &Path) -> Result<Vec<PathBuf>, Error> {
    let entries = match std::fs::read_dir(path) {
        Ok(entries) => entries,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            trace!("{} does not exist", path.display());
            return Ok(Vec::new());
        }
        Err(source) => {
            return Err(Error::Read {
                path: path.into(),
                source,
            })
        }
    };
    let mut dirs = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| Error::Read {
            path: path.into(),
            source,
        })?;
        let entry_path = entry.path();
        if entry_path.is_dir() {
            dirs.push(entry_path);
        }
    }
    dirs.sort();
    Ok(dirs)
}

#[derive(Debug, Diagnostic, Error)]
pub enum Error {
    #[error("Error writing to {path}: {source}")]
    #[diagnostic(
        code(fs::write),
        help("Make sure you have permission to write to this file.")
    )]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Error reading from {path}: {source}")]
    #[diagnostic(
        code(fs::read),
        help("Make sure you have permission to read this file.")
    )]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
