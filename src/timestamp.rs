//! Pulls the acquisition time out of satellite image file names.

use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

/// Returned when a file name carries no `YYYY-MM-DD[ _]HHMMSS` block.
pub const NO_DATE: &str = "no date found";

static TIMESTAMP_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([0-9]{4}-[0-9]{2}-[0-9]{2})[ _]([0-9]{6})").expect("timestamp pattern compiles")
});

/// Formats the first `YYYY-MM-DD` + separator + `HHMMSS` match as
/// `"YYYY-MM-DD HH:MM:SS"`, or returns [`NO_DATE`].
///
/// The digits are not checked against the calendar.
pub fn extract_timestamp(file_name: &str) -> String {
    let Some(caps) = TIMESTAMP_PATTERN.captures(file_name) else {
        return NO_DATE.to_string();
    };
    let date = &caps[1];
    let time = &caps[2];
    format!("{date} {}:{}:{}", &time[0..2], &time[2..4], &time[4..6])
}

/// Same as [`extract_timestamp`], applied to the final component of `path`.
pub fn timestamp_for_path(path: &Path) -> String {
    match path.file_name() {
        Some(name) => extract_timestamp(&name.to_string_lossy()),
        None => NO_DATE.to_string(),
    }
}
