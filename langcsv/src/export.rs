//! Export: walk a locale-rooted directory of translation files and write every
//! string, number and null leaf as one row of the CSV table.

use std::path::{Component, Path, PathBuf};

use tempfile::Builder;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::{
    error::Error,
    formats::{CsvRow, FormatType, csv::write_rows},
    locale::LocaleFilter,
    types::TranslationFile,
};

/// Settings for one export run.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Root of the locale-rooted translation tree, e.g. `lang`.
    pub lang_path: PathBuf,
    /// CSV file to create or replace.
    pub output: PathBuf,
    /// Which locales to keep.
    pub filter: LocaleFilter,
    /// Which file formats to read.
    pub formats: Vec<FormatType>,
}

impl ExportOptions {
    pub fn new(lang_path: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            lang_path: lang_path.into(),
            output: output.into(),
            filter: LocaleFilter::All,
            formats: vec![FormatType::Php],
        }
    }

    pub fn with_filter(mut self, filter: LocaleFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_formats(mut self, formats: Vec<FormatType>) -> Self {
        self.formats = formats;
        self
    }
}

/// A translation file found under the export root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Location on disk.
    pub full_path: PathBuf,
    /// Slash separated path relative to the root, without extension.
    pub path: String,
    pub format: FormatType,
}

/// A file or directory entry that was skipped during an export.
#[derive(Debug)]
pub struct ScanWarning {
    pub file: PathBuf,
    pub error: Error,
}

/// Rows gathered from the source tree.
#[derive(Debug, Default)]
pub struct Collected {
    pub rows: Vec<CsvRow>,
    /// Number of files that were loaded.
    pub files: usize,
    pub warnings: Vec<ScanWarning>,
}

/// Outcome of a finished export.
#[derive(Debug)]
pub struct ExportReport {
    pub output: PathBuf,
    pub rows: usize,
    pub files: usize,
    pub warnings: Vec<ScanWarning>,
}

/// Lists the translation files under `root` whose extension is one of
/// `formats`, ordered by a depth-first walk sorted by file name.
///
/// Fails with [`Error::SourceRootMissing`] when `root` is not a directory.
/// Entries the walk cannot read are logged and skipped.
pub fn scan_translation_files(
    root: &Path,
    formats: &[FormatType],
) -> Result<Vec<SourceFile>, Error> {
    if !root.is_dir() {
        return Err(Error::SourceRootMissing(root.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let full_path = entry.path();
        let Some(format) = FormatType::from_extension(full_path).filter(|f| formats.contains(f))
        else {
            continue;
        };
        let Ok(relative) = full_path.strip_prefix(root) else {
            continue;
        };
        files.push(SourceFile {
            full_path: full_path.to_path_buf(),
            path: locale_rooted_path(relative),
            format,
        });
    }
    Ok(files)
}

/// `en/admin/users.php` becomes `en/admin/users`, with `/` on every platform.
fn locale_rooted_path(relative: &Path) -> String {
    relative
        .with_extension("")
        .components()
        .filter_map(|component| match component {
            Component::Normal(segment) => Some(segment.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Loads the files under `root` that pass `filter` and flattens them into rows.
///
/// The filter is applied to each path's locale before the file is read. A file
/// that fails to load becomes a [`ScanWarning`] and contributes no rows.
pub fn collect_rows(
    root: &Path,
    filter: &LocaleFilter,
    formats: &[FormatType],
) -> Result<Collected, Error> {
    let mut collected = Collected::default();

    for source in scan_translation_files(root, formats)? {
        if !filter.includes(&source.path) {
            debug!("Skipping {} (locale not selected)", source.path);
            continue;
        }
        let tree = match source.format.load_tree(&source.full_path) {
            Ok(tree) => tree,
            Err(error) => {
                warn!("Skipping {}: {}", source.full_path.display(), error);
                collected.warnings.push(ScanWarning {
                    file: source.full_path,
                    error,
                });
                continue;
            }
        };

        let file = TranslationFile::new(source.path, tree);
        let before = collected.rows.len();
        collected.rows.extend(
            file.tree
                .flatten()
                .into_iter()
                .map(|(key, original)| CsvRow::new(file.path.as_str(), key, original, "")),
        );
        debug!(
            "Loaded {} ({} rows)",
            file.path,
            collected.rows.len() - before
        );
        collected.files += 1;
    }

    Ok(collected)
}

/// Writes `rows` to `dest`, replacing it only once the whole table is written.
///
/// Parent directories are created as needed. The table is first written to a
/// temporary file next to `dest`. A replaced file keeps its permissions; a new
/// one gets the usual umask-filtered mode.
pub fn write_csv_atomic(dest: &Path, rows: &[CsvRow]) -> Result<(), Error> {
    let parent = match dest.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent).map_err(|e| Error::write(parent, e))?;

    let mut builder = Builder::new();
    builder.prefix(".langcsv");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(std::fs::Permissions::from_mode(0o666));
    }
    let mut tmp = builder
        .tempfile_in(parent)
        .map_err(|e| Error::write(dest, e))?;
    write_rows(tmp.as_file_mut(), rows)?;

    if let Ok(existing) = std::fs::metadata(dest)
        && existing.is_file()
    {
        tmp.as_file()
            .set_permissions(existing.permissions())
            .map_err(|e| Error::write(dest, e))?;
    }
    tmp.persist(dest).map_err(|e| Error::write(dest, e.error))?;
    Ok(())
}

/// Runs a full export as described by `options`.
pub fn export(options: &ExportOptions) -> Result<ExportReport, Error> {
    let collected = collect_rows(&options.lang_path, &options.filter, &options.formats)?;
    write_csv_atomic(&options.output, &collected.rows)?;

    info!(
        "Exported {} rows from {} files to {}",
        collected.rows.len(),
        collected.files,
        options.output.display()
    );
    Ok(ExportReport {
        output: options.output.clone(),
        rows: collected.rows.len(),
        files: collected.files,
        warnings: collected.warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn paths(files: &[SourceFile]) -> Vec<&str> {
        files.iter().map(|f| f.path.as_str()).collect()
    }

    #[test]
    fn test_scan_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("lang");
        assert!(matches!(
            scan_translation_files(&missing, &[FormatType::Php]),
            Err(Error::SourceRootMissing(path)) if path == missing
        ));
    }

    #[test]
    fn test_scan_orders_and_filters_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "fr/auth.php", "<?php return [];");
        write(root, "en/validation.php", "<?php return [];");
        write(root, "en/auth.php", "<?php return [];");
        write(root, "en/admin/users.php", "<?php return [];");
        write(root, "en/notes.txt", "ignored");
        write(root, "en/extra.json", "{}");

        let files = scan_translation_files(root, &[FormatType::Php]).unwrap();
        assert_eq!(
            paths(&files),
            vec!["en/admin/users", "en/auth", "en/validation", "fr/auth"]
        );

        let files = scan_translation_files(root, &[FormatType::Json]).unwrap();
        assert_eq!(paths(&files), vec!["en/extra"]);
        assert_eq!(files[0].format, FormatType::Json);
    }

    #[test]
    fn test_locale_rooted_path() {
        assert_eq!(
            locale_rooted_path(Path::new("vendor/pkg/es/test.php")),
            "vendor/pkg/es/test"
        );
        assert_eq!(locale_rooted_path(Path::new("en/auth.php")), "en/auth");
    }

    #[test]
    fn test_collect_rows_flattens_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(
            root,
            "en/auth.php",
            "<?php return ['failed' => 'Failed', 'nested' => ['key' => 'Value'], 'on' => true];",
        );
        write(root, "en/misc.php", "<?php return ['count' => 3, 'none' => null];");

        let collected = collect_rows(root, &LocaleFilter::All, &[FormatType::Php]).unwrap();
        assert_eq!(collected.files, 2);
        assert_eq!(
            collected.rows,
            vec![
                CsvRow::new("en/auth", "failed", "Failed", ""),
                CsvRow::new("en/auth", "nested.key", "Value", ""),
                CsvRow::new("en/misc", "count", "3", ""),
                CsvRow::new("en/misc", "none", "", ""),
            ]
        );
    }

    #[test]
    fn test_collect_rows_filters_before_loading() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "en/auth.php", "<?php return ['a' => 'A'];");
        // Broken, but never read because fr is filtered out.
        write(root, "fr/auth.php", "<?php return [");

        let filter = LocaleFilter::Only(vec!["en".to_string()]);
        let collected = collect_rows(root, &filter, &[FormatType::Php]).unwrap();
        assert_eq!(collected.rows, vec![CsvRow::new("en/auth", "a", "A", "")]);
        assert!(collected.warnings.is_empty());
    }

    #[test]
    fn test_collect_rows_warns_and_continues() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "en/a_broken.php", "<?php return foo();");
        write(root, "en/b_scalar.php", "<?php return 'text';");
        write(root, "en/c_good.php", "<?php return ['k' => 'v'];");

        let collected = collect_rows(root, &LocaleFilter::All, &[FormatType::Php]).unwrap();
        assert_eq!(collected.rows, vec![CsvRow::new("en/c_good", "k", "v", "")]);
        assert_eq!(collected.files, 1);
        assert_eq!(collected.warnings.len(), 2);
        assert!(matches!(collected.warnings[1].error, Error::NotAMapping));
    }

    #[test]
    fn test_write_csv_atomic_creates_parents_and_replaces() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out/nested/translations.csv");
        write_csv_atomic(&dest, &[CsvRow::new("en/a", "k", "v", "")]).unwrap();
        assert_eq!(
            fs::read_to_string(&dest).unwrap(),
            "Path,Key,Original,New\nen/a,k,v,\n"
        );

        write_csv_atomic(&dest, &[]).unwrap();
        assert_eq!(fs::read_to_string(&dest).unwrap(), "Path,Key,Original,New\n");
        let leftovers = fs::read_dir(dest.parent().unwrap()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn test_write_csv_atomic_into_directory_fails_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("dest.csv");
        fs::create_dir(&dest).unwrap();

        let result = write_csv_atomic(&dest, &[CsvRow::new("en/a", "k", "v", "")]);
        assert!(matches!(result, Err(Error::Write { path, .. }) if path == dest));

        let entries: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("dest.csv")]);
        assert!(dest.is_dir());
    }

    #[cfg(unix)]
    #[test]
    fn test_write_csv_atomic_keeps_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out.csv");
        write_csv_atomic(&dest, &[]).unwrap();

        for mode in [0o644, 0o640] {
            fs::set_permissions(&dest, fs::Permissions::from_mode(mode)).unwrap();
            write_csv_atomic(&dest, &[CsvRow::new("en/a", "k", "v", "")]).unwrap();
            assert_eq!(fs::metadata(&dest).unwrap().permissions().mode() & 0o777, mode);
        }
    }

    #[test]
    fn test_export_with_nothing_selected_writes_header() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("lang");
        write(&root, "fr/auth.php", "<?php return ['a' => 'A'];");
        let output = dir.path().join("out.csv");

        let options = ExportOptions::new(&root, &output)
            .with_filter(LocaleFilter::Only(vec!["de".to_string()]));
        let report = export(&options).unwrap();
        assert_eq!(report.rows, 0);
        assert_eq!(report.files, 0);
        assert_eq!(fs::read_to_string(output).unwrap(), "Path,Key,Original,New\n");
    }
}
