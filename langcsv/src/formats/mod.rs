//! Supported translation file formats.
//!
//! This module re-exports the document type of each format and provides the
//! [`FormatType`] enum used to pick a loader or emitter at runtime.

pub mod csv;
pub mod json;
pub mod php;

use std::{
    fmt::{Display, Formatter},
    path::Path,
    str::FromStr,
};

// Reexporting the formats for easier access
pub use csv::CsvRow;
pub use json::Format as JsonFormat;
pub use php::Format as PhpFormat;

use crate::{Error, traits::Parser, types::TranslationTree};

/// The file formats a translation tree can be stored in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FormatType {
    /// PHP files returning an array (`.php`).
    #[default]
    Php,
    /// JSON objects (`.json`).
    Json,
}

/// Implements [`std::fmt::Display`] for [`FormatType`].
///
/// # Example
/// ```rust
/// use langcsv::formats::FormatType;
/// assert_eq!(FormatType::Php.to_string(), "php");
/// assert_eq!(FormatType::Json.to_string(), "json");
/// ```
impl Display for FormatType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FormatType::Php => write!(f, "php"),
            FormatType::Json => write!(f, "json"),
        }
    }
}

/// Implements [`std::str::FromStr`] for [`FormatType`].
///
/// Accepts `"php"` and `"json"`, case-insensitive and trimmed. Returns
/// [`crate::error::Error::UnknownFormat`] for anything else.
///
/// # Example
/// ```rust
/// use langcsv::formats::FormatType;
/// use std::str::FromStr;
/// assert_eq!(FormatType::from_str("PHP").unwrap(), FormatType::Php);
/// assert!(FormatType::from_str("yaml").is_err());
/// ```
impl FromStr for FormatType {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        match s.as_str() {
            "php" => Ok(FormatType::Php),
            "json" => Ok(FormatType::Json),
            other => Err(Error::UnknownFormat(other.to_string())),
        }
    }
}

impl FormatType {
    /// Returns the file extension for this format, without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            FormatType::Php => "php",
            FormatType::Json => "json",
        }
    }

    /// Picks the format of a file from its extension, if supported.
    pub fn from_extension(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?;
        [FormatType::Php, FormatType::Json]
            .into_iter()
            .find(|format| format.extension().eq_ignore_ascii_case(extension))
    }

    /// Loads the translation tree stored at `path` in this format.
    pub fn load_tree(&self, path: &Path) -> Result<TranslationTree, Error> {
        match self {
            FormatType::Php => PhpFormat::read_from(path).map(|f| f.tree),
            FormatType::Json => JsonFormat::read_from(path).map(|f| f.tree),
        }
    }

    /// Writes `tree` to `path` in this format, replacing any existing file.
    pub fn save_tree(&self, path: &Path, tree: TranslationTree) -> Result<(), Error> {
        match self {
            FormatType::Php => PhpFormat::new(tree).write_to(path),
            FormatType::Json => JsonFormat::new(tree).write_to(path),
        }
    }
}
