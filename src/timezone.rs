//! Resolution of symbolic timezone codes.
//!
//! A code such as `"IST"` or `"PST"` maps to exactly one IANA region. Anything
//! else, including the empty string, falls back to the process's local zone.
//! Resolution never fails.

use chrono::{FixedOffset, Local, Offset, Utc};
use chrono_tz::Tz;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Recognized codes and the region each one stands for.
const ZONE_TABLE: &[(&str, Tz)] = &[
    ("ACST", chrono_tz::Australia::Adelaide),
    ("AEST", chrono_tz::Australia::Sydney),
    ("AKST", chrono_tz::America::Anchorage),
    ("AST", chrono_tz::Asia::Riyadh),
    ("AWST", chrono_tz::Australia::Perth),
    ("BST", chrono_tz::Europe::London),
    ("CCT", chrono_tz::Asia::Shanghai),
    ("CDT", chrono_tz::America::Chicago),
    ("CET", chrono_tz::Europe::Paris),
    ("CST", chrono_tz::America::Chicago),
    ("EAT", chrono_tz::Africa::Nairobi),
    ("EDT", chrono_tz::America::New_York),
    ("EET", chrono_tz::Europe::Bucharest),
    ("EST", chrono_tz::America::New_York),
    ("GMT", chrono_tz::Europe::London),
    ("HKT", chrono_tz::Asia::Hong_Kong),
    ("HST", chrono_tz::Pacific::Honolulu),
    ("IST", chrono_tz::Asia::Kolkata),
    ("JST", chrono_tz::Asia::Tokyo),
    ("KST", chrono_tz::Asia::Seoul),
    ("MDT", chrono_tz::America::Denver),
    ("MSK", chrono_tz::Europe::Moscow),
    ("MST", chrono_tz::America::Denver),
    ("NZST", chrono_tz::Pacific::Auckland),
    ("PDT", chrono_tz::America::Los_Angeles),
    ("PST", chrono_tz::America::Los_Angeles),
    ("SAST", chrono_tz::Africa::Johannesburg),
    ("SGT", chrono_tz::Asia::Singapore),
    ("UTC", chrono_tz::UTC),
    ("WAT", chrono_tz::Africa::Lagos),
];

/// A concrete zone used to stamp timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zone {
    /// A named IANA region.
    Region(Tz),
    /// Whatever the process considers local time.
    Local,
}

/// A resolved zone together with the label printed after each timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeZone {
    zone: Zone,
    label: String,
}

impl TimeZone {
    /// Resolve a case-sensitive timezone code.
    pub fn resolve(code: &str) -> Self {
        match lookup(code) {
            Some(tz) => Self {
                zone: Zone::Region(tz),
                label: code.to_string(),
            },
            None => Self::local(),
        }
    }

    /// The process's local zone, labelled from its current abbreviation or offset.
    pub fn local() -> Self {
        Self {
            zone: Zone::Local,
            label: local_label(),
        }
    }

    pub fn zone(&self) -> Zone {
        self.zone
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Current wall-clock time in this zone, as `YYYY-MM-DD HH:MM:SS`.
    pub fn timestamp(&self) -> String {
        match self.zone {
            Zone::Region(tz) => Utc::now()
                .with_timezone(&tz)
                .format(TIMESTAMP_FORMAT)
                .to_string(),
            Zone::Local => Local::now().format(TIMESTAMP_FORMAT).to_string(),
        }
    }
}

impl Default for TimeZone {
    fn default() -> Self {
        Self::local()
    }
}

/// Look a code up in the fixed table.
pub fn lookup(code: &str) -> Option<Tz> {
    ZONE_TABLE
        .iter()
        .find(|(name, _)| *name == code)
        .map(|(_, tz)| *tz)
}

/// Codes accepted by [`TimeZone::resolve`].
pub fn known_codes() -> impl Iterator<Item = &'static str> {
    ZONE_TABLE.iter().map(|(name, _)| *name)
}

fn local_label() -> String {
    // chrono's Local has no abbreviation, so borrow one from TZ when it names a region.
    if let Some(tz) = std::env::var("TZ")
        .ok()
        .and_then(|name| name.trim_start_matches(':').parse::<Tz>().ok())
    {
        return Utc::now().with_timezone(&tz).format("%Z").to_string();
    }
    offset_label(Local::now().offset().fix())
}

fn offset_label(offset: FixedOffset) -> String {
    let seconds = offset.local_minus_utc();
    let sign = if seconds < 0 { '-' } else { '+' };
    let minutes = seconds.abs() / 60;
    format!("UTC{}{:02}:{:02}", sign, minutes / 60, minutes % 60)
}
