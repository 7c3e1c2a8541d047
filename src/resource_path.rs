//! Validated destination paths for resources injected into a staging tree.

use crate::{Error, Result};
use std::fmt;
use std::path::PathBuf;

/// Maximum length for resource paths (in bytes).
const MAX_PATH_LENGTH: usize = 4096;

/// Windows reserved device names that cannot be used as filenames.
///
/// The packer runs on Windows for most mappers, so these are rejected on
/// all platforms.
const WINDOWS_RESERVED_NAMES: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// Checks if a filename is a Windows reserved name.
///
/// Windows reserved names are case-insensitive and also reserved
/// when followed by an extension (e.g., "CON.txt" is reserved).
fn is_windows_reserved(name: &str) -> bool {
    let base = match name.find('.') {
        Some(pos) => &name[..pos],
        None => name,
    };

    WINDOWS_RESERVED_NAMES
        .iter()
        .any(|reserved| base.eq_ignore_ascii_case(reserved))
}

/// A relative path inside a staging directory.
///
/// `ResourcePath` uses forward slashes and guarantees that joining it onto a
/// staging root cannot escape that root:
/// - No NUL bytes are present
/// - The path is not absolute and has no drive prefix
/// - No empty segments exist (no `//` or trailing `/`)
/// - No `.` or `..` segments are present
/// - No backslashes (the separator is always `/`)
///
/// # Examples
///
/// ```
/// use mapsmith::ResourcePath;
///
/// let path = ResourcePath::new("maps/externalmap/qsb.lua").unwrap();
/// assert_eq!(path.file_name(), "qsb.lua");
///
/// assert!(ResourcePath::new("../outside.lua").is_err());
/// assert!(ResourcePath::new("/maps/qsb.lua").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResourcePath(String);

impl ResourcePath {
    /// Creates a new `ResourcePath` from a string, validating it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidResourcePath`] if the path is empty, absolute,
    /// too long, or contains NUL bytes, backslashes, empty segments, `.` or
    /// `..` segments, or Windows reserved names.
    pub fn new(s: &str) -> Result<Self> {
        Self::validate(s)?;
        Ok(Self(s.to_string()))
    }

    fn validate(s: &str) -> Result<()> {
        if s.contains('\0') {
            return Err(Error::InvalidResourcePath("contains NUL byte".into()));
        }

        if s.is_empty() {
            return Err(Error::InvalidResourcePath("empty path".into()));
        }

        if s.len() > MAX_PATH_LENGTH {
            return Err(Error::InvalidResourcePath(format!(
                "path exceeds maximum length of {} bytes",
                MAX_PATH_LENGTH
            )));
        }

        if s.contains('\\') {
            return Err(Error::InvalidResourcePath(
                "backslash separator not allowed".into(),
            ));
        }

        if s.starts_with('/') {
            return Err(Error::InvalidResourcePath(
                "absolute path not allowed".into(),
            ));
        }

        // "C:/..." would join as an absolute path on Windows
        if s.split('/').next().is_some_and(|first| first.contains(':')) {
            return Err(Error::InvalidResourcePath(
                "drive prefix not allowed".into(),
            ));
        }

        if s.ends_with('/') {
            return Err(Error::InvalidResourcePath(
                "trailing slash not allowed".into(),
            ));
        }

        for segment in s.split('/') {
            if segment.is_empty() {
                return Err(Error::InvalidResourcePath(
                    "empty segment (consecutive slashes)".into(),
                ));
            }
            if segment == "." {
                return Err(Error::InvalidResourcePath("'.' segment not allowed".into()));
            }
            if segment == ".." {
                return Err(Error::InvalidResourcePath(
                    "'..' segment not allowed (path traversal)".into(),
                ));
            }
            if is_windows_reserved(segment) {
                return Err(Error::InvalidResourcePath(format!(
                    "Windows reserved filename '{}' not allowed",
                    segment
                )));
            }
        }

        Ok(())
    }

    /// Returns the path as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the file name (last segment) of this path.
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    /// Returns the parent directory of this path, if any.
    pub fn parent(&self) -> Option<Self> {
        self.0.rfind('/').map(|idx| Self(self.0[..idx].to_string()))
    }

    /// Returns an iterator over the path segments.
    pub fn components(&self) -> impl Iterator<Item = &str> {
        self.0.split('/')
    }

    /// Converts this path to a platform path relative to a staging root.
    pub fn to_relative_path(&self) -> PathBuf {
        self.components().collect()
    }
}

impl AsRef<str> for ResourcePath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourcePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<&str> for ResourcePath {
    type Error = Error;

    fn try_from(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for ResourcePath {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        Self::validate(&s)?;
        Ok(Self(s))
    }
}

impl std::str::FromStr for ResourcePath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}
