//! Utility functions for naming and human-readable formatting

use std::path::Path;

/// Metric unit prefixes used for byte counts and rates
const SI_UNITS: [&str; 6] = ["", "kB", "MB", "GB", "TB", "PB"];

/// Format a byte count with a metric (factor 1000) unit, e.g. `" 12.3 MB"`.
///
/// The number is right-aligned to five characters with one decimal so the
/// progress line keeps a stable width.
#[must_use]
pub fn format_size(bytes: f64) -> String {
    let mut n = bytes;
    let mut unit = 0;
    while n > 1000.0 && unit < SI_UNITS.len() - 1 {
        n /= 1000.0;
        unit += 1;
    }
    format!("{:5.1} {}", n, SI_UNITS[unit])
}

/// Format a duration in seconds as `minutes:seconds`.
#[must_use]
pub fn format_eta(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Scratch file name for a message-id; path separators are replaced so the file stays in its directory.
#[must_use]
pub fn scratch_file_name(message_id: &str) -> String {
    let name: String = message_id
        .trim_start_matches('<')
        .trim_end_matches('>')
        .chars()
        .map(|c| if c == '/' || c == '\\' { '_' } else { c })
        .collect();
    match name.as_str() {
        "" | "." | ".." => format!("_{}", name),
        _ => name,
    }
}

/// Final path component of a yEnc header name, or `None` if nothing usable remains.
#[must_use]
pub fn output_file_name(name: &str) -> Option<String> {
    let name = name.trim().replace('\\', "/");
    Path::new(&name)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .filter(|n| !n.is_empty())
}

/// Working-directory name for a manifest: its file name without the `.nzb` suffix.
#[must_use]
pub fn manifest_base_name(path: &Path) -> String {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let lower = file_name.to_ascii_lowercase();
    match lower.strip_suffix(".nzb") {
        Some(stem) if !stem.is_empty() => file_name[..stem.len()].to_string(),
        _ => file_name,
    }
}
