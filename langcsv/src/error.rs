//! All error types for the langcsv crate.
//!
//! These are returned from all fallible operations (loading translation files,
//! reading and writing CSV, sanitizing paths, emitting files).

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("unknown format `{0}`")]
    UnknownFormat(String),

    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("PHP parse error on line {line}: {message}")]
    PhpParse { line: usize, message: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("translation file does not return a mapping")]
    NotAMapping,

    #[error("the lang directory does not exist at {}", .0.display())]
    SourceRootMissing(PathBuf),

    #[error("CSV file not found at {}", .0.display())]
    CsvNotFound(PathBuf),

    #[error("invalid path `{path}`: {reason}")]
    InvalidPath { path: String, reason: &'static str },

    #[error("could not write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Creates an invalid-path error for a path rejected by the sanitizer.
    pub fn invalid_path(path: impl Into<String>, reason: &'static str) -> Self {
        Error::InvalidPath {
            path: path.into(),
            reason,
        }
    }

    /// Wraps an I/O failure that happened while producing `path`.
    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Write {
            path: path.into(),
            source,
        }
    }
}
