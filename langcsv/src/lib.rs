#![forbid(unsafe_code)]
//! Round-trip locale-rooted translation files through a flat CSV table.
//!
//! Export walks a directory such as `lang/` holding `<locale>/<file>.php` and
//! `vendor/<package>/<locale>/<file>.php` translation files and writes every
//! leaf as a `Path,Key,Original,New` row. Translators fill in the `New` column,
//! and import writes one file per distinct `Path` back into the tree.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use langcsv::{ExportOptions, ImportOptions, LocaleFilter, export, import};
//!
//! let options = ExportOptions::new("lang", "lang/translations.csv")
//!     .with_filter(LocaleFilter::Only(vec!["en".to_string()]));
//! let report = export(&options)?;
//! println!("Exported {} rows", report.rows);
//!
//! // ...after the CSV has been edited
//! let report = import(&ImportOptions::new("lang/translations.csv", "lang"))?;
//! for file in &report.files {
//!     println!("Created: {}", file.target.display());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Supported Formats
//!
//! - **PHP**: files returning a (nested) array literal
//! - **JSON**: nested objects
//! - **CSV**: the exchanged `Path,Key,Original,New` table

pub mod error;
pub mod export;
pub mod formats;
pub mod import;
pub mod locale;
pub mod sanitize;
pub mod traits;
pub mod tree;
pub mod types;

// Re-export most used types for easy consumption
pub use crate::{
    error::Error,
    export::{ExportOptions, ExportReport, ScanWarning, export},
    formats::{CsvRow, FormatType},
    import::{ImportIssue, ImportOptions, ImportReport, ImportedFile, import},
    locale::{LocaleFilter, extract_locale},
    sanitize::sanitize_path,
    types::{LeafValue, Node, TranslationFile, TranslationTree},
};
