//! Name and path helpers for output files and log fields.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

static RE_WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Returns only the filename component of a path (no directory).
///
/// Used for span fields so logs name the record without the full path.
pub fn redact_path(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("<unknown>")
        .to_string()
}

/// Filesystem-safe video file name for a job identity.
///
/// Every whitespace run becomes a single underscore:
/// `"Famous Rivalries.1"` → `"Famous_Rivalries.1.mp4"`.
pub fn video_file_name(identity: &str) -> String {
    format!("{}.mp4", RE_WHITESPACE.replace_all(identity, "_"))
}
