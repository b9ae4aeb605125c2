//! Import: read an edited CSV table and write one translation file per distinct
//! `Path` value.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use tracing::{debug, error, info, warn};

use crate::{
    error::Error,
    formats::{CsvRow, FormatType},
    locale::matches_locale,
    sanitize::sanitize_path,
    traits::Parser,
    tree::{MAX_DEPTH, key_depth},
    types::TranslationTree,
};

/// Settings for one import run.
#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// The CSV table to read.
    pub csv_path: PathBuf,
    /// Root the files are written under, e.g. `lang`.
    pub lang_path: PathBuf,
    /// Format of the written files.
    pub format: FormatType,
    /// Only import rows whose path belongs to this locale.
    pub locale: Option<String>,
    /// Plan the writes without touching the filesystem.
    pub dry_run: bool,
}

impl ImportOptions {
    pub fn new(csv_path: impl Into<PathBuf>, lang_path: impl Into<PathBuf>) -> Self {
        Self {
            csv_path: csv_path.into(),
            lang_path: lang_path.into(),
            format: FormatType::Php,
            locale: None,
            dry_run: false,
        }
    }

    pub fn with_format(mut self, format: FormatType) -> Self {
        self.format = format;
        self
    }

    /// Restricts the import to one locale. A blank locale means no filter.
    pub fn with_locale(mut self, locale: Option<String>) -> Self {
        self.locale = locale
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty());
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

/// A file written (or, on a dry run, planned) by an import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedFile {
    /// Sanitized, locale-rooted path, e.g. `en/auth`.
    pub path: String,
    pub target: PathBuf,
    /// Number of leaves in the file's tree.
    pub keys: usize,
}

/// A `Path` group that was not written.
#[derive(Debug)]
pub enum ImportIssue {
    /// The path was rejected by the sanitizer; the group was skipped.
    InvalidPath { path: String, error: Error },
    /// Serializing or writing the file failed; the run went on without it.
    WriteFailed { path: String, error: Error },
}

impl ImportIssue {
    pub fn path(&self) -> &str {
        match self {
            ImportIssue::InvalidPath { path, .. } | ImportIssue::WriteFailed { path, .. } => path,
        }
    }

    pub fn error(&self) -> &Error {
        match self {
            ImportIssue::InvalidPath { error, .. } | ImportIssue::WriteFailed { error, .. } => {
                error
            }
        }
    }
}

/// Outcome of a finished import.
#[derive(Debug, Default)]
pub struct ImportReport {
    pub files: Vec<ImportedFile>,
    pub issues: Vec<ImportIssue>,
    pub dry_run: bool,
}

impl ImportReport {
    /// Whether any file failed to be written. Skipped invalid paths do not
    /// count as failures.
    pub fn has_failures(&self) -> bool {
        self.issues
            .iter()
            .any(|issue| matches!(issue, ImportIssue::WriteFailed { .. }))
    }
}

/// Reads every data row of the CSV at `csv_path`.
///
/// Fails with [`Error::CsvNotFound`] when the file does not exist.
pub fn read_rows(csv_path: &Path) -> Result<Vec<CsvRow>, Error> {
    if !csv_path.exists() {
        return Err(Error::CsvNotFound(csv_path.to_path_buf()));
    }
    Vec::<CsvRow>::read_from(csv_path)
}

/// Groups rows by their raw `Path` value, in order of first appearance, and
/// builds each group's tree from the rows' effective values.
///
/// With a `locale`, rows whose path does not belong to exactly that locale
/// are left out. Rows whose key nests deeper than [`MAX_DEPTH`] levels are
/// logged and skipped.
pub fn group_rows(rows: &[CsvRow], locale: Option<&str>) -> IndexMap<String, TranslationTree> {
    let mut groups: IndexMap<String, TranslationTree> = IndexMap::new();
    for row in rows {
        if let Some(locale) = locale
            && !matches_locale(&row.path, locale)
        {
            continue;
        }
        if key_depth(&row.key) > MAX_DEPTH {
            warn!(
                "Skipping a key in {}: nested deeper than {} levels",
                row.path, MAX_DEPTH
            );
            continue;
        }
        groups
            .entry(row.path.clone())
            .or_default()
            .set_dotted(&row.key, row.effective_value());
    }
    groups
}

/// The file a sanitized path is written to.
pub fn target_path(dest_root: &Path, path: &str, format: FormatType) -> PathBuf {
    dest_root.join(format!("{}.{}", path, format.extension()))
}

/// Writes `tree` to `<dest_root>/<path>.<ext>`, creating directories as needed
/// and overwriting any existing file. `path` must already be sanitized.
pub fn write_tree(
    dest_root: &Path,
    path: &str,
    tree: TranslationTree,
    format: FormatType,
) -> Result<PathBuf, Error> {
    let target = target_path(dest_root, path, format);
    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent).map_err(|e| Error::write(parent, e))?;
    }
    format.save_tree(&target, tree)?;
    Ok(target)
}

/// Runs a full import as described by `options`.
///
/// Only a missing or unreadable CSV fails the whole run. A group whose path is
/// invalid, or whose file cannot be written, is recorded in the report and the
/// remaining groups are still written.
pub fn import(options: &ImportOptions) -> Result<ImportReport, Error> {
    let rows = read_rows(&options.csv_path)?;
    debug!(
        "Read {} rows from {}",
        rows.len(),
        options.csv_path.display()
    );

    let mut report = ImportReport {
        dry_run: options.dry_run,
        ..ImportReport::default()
    };
    for (raw_path, tree) in group_rows(&rows, options.locale.as_deref()) {
        let path = match sanitize_path(&raw_path) {
            Ok(path) => path,
            Err(error) => {
                error!("Skipping {}: {}", raw_path, error);
                report.issues.push(ImportIssue::InvalidPath {
                    path: raw_path,
                    error,
                });
                continue;
            }
        };

        let keys = tree.leaf_count();
        if options.dry_run {
            let target = target_path(&options.lang_path, &path, options.format);
            debug!("Would write {} ({} keys)", target.display(), keys);
            report.files.push(ImportedFile { path, target, keys });
            continue;
        }

        match write_tree(&options.lang_path, &path, tree, options.format) {
            Ok(target) => {
                debug!("Created {} ({} keys)", target.display(), keys);
                report.files.push(ImportedFile { path, target, keys });
            }
            Err(error) => {
                error!("Failed to write {}: {}", path, error);
                report.issues.push(ImportIssue::WriteFailed { path, error });
            }
        }
    }

    info!(
        "Imported {} files from {}",
        report.files.len(),
        options.csv_path.display()
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Node;
    use std::fs;

    fn rows() -> Vec<CsvRow> {
        vec![
            CsvRow::new("en/test", "greeting", "Hello", ""),
            CsvRow::new("fr/test", "greeting", "Hello", "Bonjour"),
            CsvRow::new("en/test", "nested.key", "Value", ""),
            CsvRow::new("vendor/pkg/fr/test", "title", "Title", "Titre"),
        ]
    }

    #[test]
    fn test_group_rows_in_first_appearance_order() {
        let groups = group_rows(&rows(), None);
        let paths: Vec<&str> = groups.keys().map(String::as_str).collect();
        assert_eq!(paths, vec!["en/test", "fr/test", "vendor/pkg/fr/test"]);
        assert_eq!(
            groups["en/test"].flatten(),
            vec![
                ("greeting".to_string(), "Hello".to_string()),
                ("nested.key".to_string(), "Value".to_string()),
            ]
        );
        assert_eq!(
            groups["fr/test"].get("greeting"),
            Some(&Node::from("Bonjour"))
        );
    }

    #[test]
    fn test_group_rows_by_locale() {
        let groups = group_rows(&rows(), Some("fr"));
        let paths: Vec<&str> = groups.keys().map(String::as_str).collect();
        assert_eq!(paths, vec!["fr/test", "vendor/pkg/fr/test"]);
    }

    #[test]
    fn test_group_rows_later_row_wins() {
        let rows = vec![
            CsvRow::new("en/a", "k", "first", ""),
            CsvRow::new("en/a", "k", "second", ""),
            CsvRow::new("en/a", "k.child", "deeper", ""),
        ];
        let groups = group_rows(&rows, None);
        assert_eq!(
            groups["en/a"].flatten(),
            vec![("k.child".to_string(), "deeper".to_string())]
        );
    }

    #[test]
    fn test_group_rows_skips_overly_deep_keys() {
        let deep = vec!["k"; 10_000].join(".");
        let rows = vec![
            CsvRow::new("en/a", deep.as_str(), "v", ""),
            CsvRow::new("en/a", "ok", "v", ""),
        ];
        let groups = group_rows(&rows, None);
        assert_eq!(
            groups["en/a"].flatten(),
            vec![("ok".to_string(), "v".to_string())]
        );

        let limit = vec!["k"; MAX_DEPTH].join(".");
        let groups = group_rows(&[CsvRow::new("en/a", limit.as_str(), "v", "")], None);
        assert_eq!(groups["en/a"].leaf_count(), 1);
    }

    #[test]
    fn test_blank_locale_means_no_filter() {
        let dir = tempfile::tempdir().unwrap();
        let csv = dir.path().join("t.csv");
        let lang = dir.path().join("lang");
        fs::write(
            &csv,
            "Path,Key,Original,New\nen/test,k,v,\nfr/test,k,v,\n",
        )
        .unwrap();

        for blank in ["", "  "] {
            let options = ImportOptions::new(&csv, &lang).with_locale(Some(blank.to_string()));
            assert_eq!(options.locale, None);
            let report = import(&options).unwrap();
            assert_eq!(report.files.len(), 2);
        }
        let options = ImportOptions::new(&csv, &lang).with_locale(Some(" fr ".to_string()));
        assert_eq!(options.locale.as_deref(), Some("fr"));
    }

    #[test]
    fn test_read_rows_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.csv");
        assert!(matches!(
            read_rows(&missing),
            Err(Error::CsvNotFound(path)) if path == missing
        ));
    }

    #[test]
    fn test_write_tree_creates_directories_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let tree = TranslationTree::unflatten([("a", "A")]);
        let target = write_tree(dir.path(), "vendor/pkg/es/x", tree, FormatType::Json).unwrap();
        assert_eq!(target, dir.path().join("vendor/pkg/es/x.json"));

        let tree = TranslationTree::unflatten([("b", "B")]);
        write_tree(dir.path(), "vendor/pkg/es/x", tree, FormatType::Json).unwrap();
        assert_eq!(
            fs::read_to_string(target).unwrap(),
            "{\n    \"b\": \"B\"\n}\n"
        );
    }

    #[test]
    fn test_import_skips_invalid_paths() {
        let dir = tempfile::tempdir().unwrap();
        let csv = dir.path().join("t.csv");
        let lang = dir.path().join("lang");
        fs::write(
            &csv,
            "Path,Key,Original,New\n../../etc/passwd,k,v,\nen/ok,k,v,\n",
        )
        .unwrap();

        let report = import(&ImportOptions::new(&csv, &lang)).unwrap();
        assert_eq!(report.files.len(), 1);
        assert_eq!(report.files[0].path, "en/ok");
        assert_eq!(report.issues.len(), 1);
        assert_eq!(report.issues[0].path(), "../../etc/passwd");
        assert!(!report.has_failures());
        assert!(lang.join("en/ok.php").is_file());
        assert!(!dir.path().join("etc").exists());
    }

    #[test]
    fn test_import_write_failure_is_per_path() {
        let dir = tempfile::tempdir().unwrap();
        let csv = dir.path().join("t.csv");
        let lang = dir.path().join("lang");
        // A plain file where the `bad` directory would have to be created.
        fs::create_dir_all(&lang).unwrap();
        fs::write(lang.join("bad"), "not a directory").unwrap();
        fs::write(
            &csv,
            "Path,Key,Original,New\nbad/test,k,v,\nen/test,k,v,\n",
        )
        .unwrap();

        let report = import(&ImportOptions::new(&csv, &lang)).unwrap();
        assert!(report.has_failures());
        assert!(matches!(
            &report.issues[..],
            [ImportIssue::WriteFailed { path, .. }] if path == "bad/test"
        ));
        assert_eq!(report.files.len(), 1);
        assert!(lang.join("en/test.php").is_file());
    }

    #[test]
    fn test_import_dry_run_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let csv = dir.path().join("t.csv");
        let lang = dir.path().join("lang");
        fs::write(
            &csv,
            "Path,Key,Original,New\nen/test,a,A,\nen/test,b.c,C,\n",
        )
        .unwrap();

        let options = ImportOptions::new(&csv, &lang)
            .with_format(FormatType::Json)
            .with_dry_run(true);
        let report = import(&options).unwrap();
        assert!(report.dry_run);
        assert_eq!(
            report.files,
            vec![ImportedFile {
                path: "en/test".to_string(),
                target: lang.join("en/test.json"),
                keys: 2,
            }]
        );
        assert!(!lang.exists());
    }
}
