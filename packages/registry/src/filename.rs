use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use tracing::warn;

/// Name used when a record's name is unusable on disk.
pub const FALLBACK_NAME: &str = "download";

/// Reasons a file name cannot be written as-is.
#[derive(Debug, PartialEq, Eq)]
pub enum FilenameError {
    /// Filename is empty or whitespace-only.
    Empty,
    /// Filename contains path separators (`/` or `\`).
    ContainsPathSeparator,
    /// Filename is `.` or `..`.
    PathTraversal,
    /// Filename contains null bytes.
    NullByte,
    /// Filename contains control characters (CR, LF, etc.).
    ControlCharacter,
}

impl FilenameError {
    pub fn message(&self) -> &'static str {
        match self {
            Self::Empty => "Filename cannot be empty",
            Self::ContainsPathSeparator => "Invalid filename: path separators are not allowed",
            Self::PathTraversal => "Invalid filename: '.' and '..' are not allowed",
            Self::NullByte => "Invalid filename: null bytes are not allowed",
            Self::ControlCharacter => "Invalid filename: control characters are not allowed",
        }
    }
}

/// Validates a flat filename (no directory components allowed).
pub fn validate_flat_filename(filename: &str) -> Result<&str, FilenameError> {
    let trimmed = filename.trim();

    if trimmed.is_empty() {
        return Err(FilenameError::Empty);
    }

    if trimmed.contains('\0') {
        return Err(FilenameError::NullByte);
    }

    if trimmed.chars().any(char::is_control) {
        return Err(FilenameError::ControlCharacter);
    }

    if trimmed.contains('/') || trimmed.contains('\\') {
        return Err(FilenameError::ContainsPathSeparator);
    }

    if trimmed == "." || trimmed == ".." {
        return Err(FilenameError::PathTraversal);
    }

    Ok(trimmed)
}

/// The name a download of `name` is saved under.
pub fn download_name(name: &str) -> &str {
    match validate_flat_filename(name) {
        Ok(name) => name,
        Err(e) => {
            warn!(
                file_name = name,
                reason = e.message(),
                fallback = FALLBACK_NAME,
                "Unusable download name"
            );
            FALLBACK_NAME
        }
    }
}

/// Splits `name` into stem and extension (`"a.tar.gz"` → `("a.tar", Some("gz"))`).
///
/// Leading-dot names such as `.env` have no extension.
pub fn split_extension(name: &str) -> (&str, Option<&str>) {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => (stem, Some(ext)),
        _ => (name, None),
    }
}

/// Create a new file in `dir` for `name` without touching existing ones:
/// `name.ext`, then `name (1).ext`, `name (2).ext`, …
///
/// Each candidate is opened with `create_new`, so a file that appears
/// concurrently is skipped rather than truncated.
pub fn create_unique(dir: &Path, name: &str) -> io::Result<(PathBuf, File)> {
    let (stem, ext) = split_extension(name);
    let numbered = (1u32..).map(|n| match ext {
        Some(ext) => dir.join(format!("{stem} ({n}).{ext}")),
        None => dir.join(format!("{stem} ({n})")),
    });

    for path in std::iter::once(dir.join(name)).chain(numbered) {
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => return Ok((path, file)),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(e),
        }
    }

    Err(io::Error::new(
        io::ErrorKind::AlreadyExists,
        format!("no free name for '{name}' in {}", dir.display()),
    ))
}
