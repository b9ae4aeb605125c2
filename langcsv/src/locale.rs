//! Locale derivation from locale-rooted paths, and the locale filter used by
//! the export pipeline.
//!
//! Translation files live either at `<locale>/<...path>` or, for packages, at
//! `vendor/<package>/<locale>/<...path>`. The locale of a file is never stored;
//! it is always read back from its path.

/// First segment that marks a package-namespaced path.
pub const VENDOR_SEGMENT: &str = "vendor";

/// Derives the locale of a locale-rooted path.
///
/// Backslashes are read as separators. For a `vendor/<package>/<locale>/...`
/// path the locale is the third segment; otherwise it is the first one. A
/// vendor path that is too short has no locale.
///
/// # Example
/// ```rust
/// use langcsv::locale::extract_locale;
///
/// assert_eq!(extract_locale("en/auth"), Some("en"));
/// assert_eq!(extract_locale("vendor/foo/es/modal"), Some("es"));
/// assert_eq!(extract_locale("vendor/x"), None);
/// ```
pub fn extract_locale(path: &str) -> Option<&str> {
    let mut segments = path.split(['/', '\\']);
    match segments.next()? {
        VENDOR_SEGMENT => segments.nth(1),
        first => Some(first),
    }
}

/// Which locales an export run keeps.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LocaleFilter {
    /// Keep every locale.
    #[default]
    All,
    /// Keep only these locales (exact, case-sensitive match).
    Only(Vec<String>),
}

impl LocaleFilter {
    /// Builds the filter from command-line style options.
    ///
    /// `all` wins over everything; otherwise a comma separated `locales` list is
    /// used when it names at least one locale, and the single `default_locale`
    /// when it is missing or blank.
    pub fn from_options(all: bool, locales: Option<&str>, default_locale: &str) -> Self {
        if all {
            return LocaleFilter::All;
        }
        let locales = locales.map(parse_locale_list).unwrap_or_default();
        if locales.is_empty() {
            LocaleFilter::Only(vec![default_locale.to_string()])
        } else {
            LocaleFilter::Only(locales)
        }
    }

    /// Decides whether a file at `path` takes part in the export.
    ///
    /// Paths without a derivable locale are always included.
    pub fn includes(&self, path: &str) -> bool {
        match self {
            LocaleFilter::All => true,
            LocaleFilter::Only(locales) if locales.is_empty() => true,
            LocaleFilter::Only(locales) => match extract_locale(path) {
                None | Some("") => true,
                Some(locale) => locales.iter().any(|l| l == locale),
            },
        }
    }
}

/// Whether a CSV row's path belongs to exactly `locale`.
///
/// Unlike [`LocaleFilter::includes`], a path without a derivable locale never
/// matches.
pub fn matches_locale(path: &str, locale: &str) -> bool {
    extract_locale(path) == Some(locale)
}

/// Splits a comma separated locale list, trimming whitespace and dropping
/// empty items.
pub fn parse_locale_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect()
}
