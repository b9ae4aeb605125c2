//! `langcsv.toml` discovery and loading.

use std::{
    fs,
    path::{Path, PathBuf},
};

use langcsv::Error;
use serde::Deserialize;

pub const CONFIG_FILE_NAME: &str = "langcsv.toml";

/// Project settings shared by the `export` and `import` commands.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Root of the locale-rooted translation tree.
    #[serde(default = "default_lang_path")]
    pub lang_path: PathBuf,
    /// CSV written by `export` and read by `import` when no path is given.
    #[serde(default = "default_export_path")]
    pub export_path: PathBuf,
    /// Locale exported when neither `--locales` nor `--all` is given.
    #[serde(default = "default_locale")]
    pub default_locale: String,
}

fn default_lang_path() -> PathBuf {
    PathBuf::from("lang")
}

fn default_export_path() -> PathBuf {
    PathBuf::from("lang/translations.csv")
}

fn default_locale() -> String {
    "en".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            lang_path: default_lang_path(),
            export_path: default_export_path(),
            default_locale: default_locale(),
        }
    }
}

impl Config {
    /// Resolves relative paths against `base`, the directory holding the
    /// config file.
    fn relative_to(mut self, base: &Path) -> Self {
        if self.lang_path.is_relative() {
            self.lang_path = base.join(&self.lang_path);
        }
        if self.export_path.is_relative() {
            self.export_path = base.join(&self.export_path);
        }
        self
    }

    /// Applies command-line (or environment) values over the loaded ones.
    pub fn with_overrides(mut self, lang_path: Option<PathBuf>, locale: Option<String>) -> Self {
        if let Some(lang_path) = lang_path {
            self.lang_path = lang_path;
        }
        if let Some(locale) = locale {
            self.default_locale = locale;
        }
        self
    }
}

/// Looks for [`CONFIG_FILE_NAME`] in `start_dir` and its ancestors, stopping
/// at the first directory that contains `.git`.
pub fn find_config_file(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.is_file() {
            return Some(config_path);
        }
        if current.join(".git").exists() {
            return None;
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Result of loading configuration.
#[derive(Debug)]
pub struct ConfigLoadResult {
    pub config: Config,
    /// The file the configuration came from, if any.
    pub source: Option<PathBuf>,
}

/// Parses the config file at `path`, resolving its relative paths against
/// the file's directory.
pub fn load_config_file(path: &Path) -> Result<Config, Error> {
    let content = fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("cannot read {}: {}", path.display(), e)))?;
    let config: Config = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("invalid {}: {}", path.display(), e)))?;
    let base = path.parent().unwrap_or_else(|| Path::new(""));
    Ok(config.relative_to(base))
}

/// Loads `explicit` when given, otherwise the nearest config file above
/// `start_dir`, otherwise the defaults.
pub fn load_config(explicit: Option<&Path>, start_dir: &Path) -> Result<ConfigLoadResult, Error> {
    let source = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => find_config_file(start_dir),
    };
    match source {
        Some(path) => Ok(ConfigLoadResult {
            config: load_config_file(&path)?,
            source: Some(path),
        }),
        None => Ok(ConfigLoadResult {
            config: Config::default(),
            source: None,
        }),
    }
}
