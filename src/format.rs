//! Line layout.
//!
//! Every record is rendered at call time as
//! `<YYYY-MM-DD HH:MM:SS> <zone-label> [<LEVEL>] <appName>: <message>`.

use crate::Level;
use crate::timezone::TimeZone;

/// Width of the `YYYY-MM-DD HH:MM:SS` prefix.
const TIMESTAMP_WIDTH: usize = 19;

/// Render one record, capturing the timestamp now.
pub fn format_line(zone: &TimeZone, level: Level, app_name: &str, message: &str) -> String {
    format_line_at(&zone.timestamp(), zone.label(), level, app_name, message)
}

/// Render one record with an explicit timestamp.
pub fn format_line_at(
    timestamp: &str,
    label: &str,
    level: Level,
    app_name: &str,
    message: &str,
) -> String {
    format!(
        "{} {} [{}] {}: {}",
        timestamp, label, level, app_name, message
    )
}

/// The fields of a formatted line, borrowed from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine<'a> {
    pub timestamp: &'a str,
    pub label: &'a str,
    pub level: Level,
    pub app_name: &'a str,
    pub message: &'a str,
}

impl<'a> LogLine<'a> {
    /// Split a line back into its fields. A trailing newline is ignored.
    pub fn parse(line: &'a str) -> Option<Self> {
        let line = line.strip_suffix('\n').unwrap_or(line);
        let timestamp = line.get(..TIMESTAMP_WIDTH)?;
        let rest = line.get(TIMESTAMP_WIDTH..)?.strip_prefix(' ')?;

        let (label, rest) = rest.split_once(" [")?;
        let (level, rest) = rest.split_once("] ")?;
        let (app_name, message) = rest.split_once(": ")?;

        Some(Self {
            timestamp,
            label,
            level: level.parse().ok()?,
            app_name,
            message,
        })
    }
}
