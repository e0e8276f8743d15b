//! The selected working directory and the rule that turns it into a label.
//!
//! Paths are kept as strings rather than [`PathBuf`]s: the label rule splits
//! on both `/` and `\` regardless of the host platform, so a Windows path
//! shown on Linux (or the other way round) still gets a sensible label.

use std::fmt;
use std::path::{Path, PathBuf};

/// A non-empty file-system path chosen as the working directory.
///
/// "No path" is represented as `Option<SelectedPath>::None`; an empty string
/// never makes it into this type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SelectedPath(String);

impl SelectedPath {
    /// Wrap `path`, returning `None` when it is empty.
    pub fn new(path: impl Into<String>) -> Option<Self> {
        let path = path.into();
        if path.is_empty() {
            None
        } else {
            Some(Self(path))
        }
    }

    /// Lossy conversion from a filesystem path.
    pub fn from_path(path: &Path) -> Option<Self> {
        Self::new(path.to_string_lossy().into_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn to_path_buf(&self) -> PathBuf {
        PathBuf::from(&self.0)
    }

    /// Short label shown in the selector; see [`display_label`].
    pub fn label(&self) -> &str {
        display_label(&self.0)
    }
}

impl fmt::Display for SelectedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SelectedPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Last segment of `path` after splitting on `/` or `\`.
///
/// When that segment is empty (trailing separator, separators only, empty
/// input) the whole string is returned unchanged.
pub fn display_label(path: &str) -> &str {
    match path.rsplit(|c| c == '/' || c == '\\').next() {
        Some(last) if !last.is_empty() => last,
        _ => path,
    }
}
