//! Validation of the `Path` column before an imported tree is written to disk.

use crate::error::Error;

/// Normalizes a relative translation path coming from an edited CSV.
///
/// Backslashes become `/`, surrounding whitespace is trimmed, and empty or `.`
/// segments are dropped. The path is rejected when it is empty, absolute
/// (leading `/`, or a drive prefix such as `C:` or `C:foo`), or contains a
/// `..` segment.
///
/// # Example
/// ```rust
/// use langcsv::sanitize::sanitize_path;
///
/// assert_eq!(sanitize_path("a/./b").unwrap(), "a/b");
/// assert!(sanitize_path("../../etc/passwd").is_err());
/// ```
pub fn sanitize_path(raw: &str) -> Result<String, Error> {
    let normalized = raw.replace('\\', "/");
    let trimmed = normalized.trim();

    if trimmed.is_empty() {
        return Err(Error::invalid_path(raw, "path is empty"));
    }
    if trimmed.starts_with('/') {
        return Err(Error::invalid_path(raw, "absolute paths are not allowed"));
    }

    let segments: Vec<&str> = trimmed
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect();

    if segments.iter().any(|segment| *segment == "..") {
        return Err(Error::invalid_path(raw, "directory traversal is not allowed"));
    }
    match segments.first() {
        None => Err(Error::invalid_path(raw, "path is empty")),
        Some(first) if is_drive_prefix(first) => {
            Err(Error::invalid_path(raw, "absolute paths are not allowed"))
        }
        Some(_) => Ok(segments.join("/")),
    }
}

/// `C:`, `C:foo` and other segments starting with a drive letter.
fn is_drive_prefix(segment: &str) -> bool {
    matches!(segment.as_bytes(), [letter, b':', ..] if letter.is_ascii_alphabetic())
}
