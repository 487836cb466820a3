use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};

use crate::models::ParsedDateTime;

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%z",
    "%Y-%m-%d %H:%M%z",
    "%Y%m%dT%H%M%S%.f%z",
    "%Y%m%dT%H%M%z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y%m%dT%H%M%S%.f%:z",
    "%Y%m%dT%H%M%:z",
];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y%m%dT%H%M%S%.f",
    "%Y%m%dT%H%M",
];

/// Parses an ISO-8601 timestamp into the wall-clock slot and the labels the
/// scheduling page uses. Returns `None` when the input is not ISO-8601.
pub fn convert_iso(iso: &str) -> Option<ParsedDateTime> {
    let Some(date_time) = parse_iso(iso) else {
        tracing::warn!(input = %iso, "invalid ISO date format");
        return None;
    };

    Some(ParsedDateTime {
        date_time,
        date_label: date_label(&date_time),
        time_label: time_label(&date_time),
    })
}

/// Offsets are kept, not converted: the slot is read in the timezone the
/// caller wrote it in.
fn parse_iso(iso: &str) -> Option<NaiveDateTime> {
    let normalized = match iso.strip_suffix(|c: char| c == 'Z' || c == 'z') {
        Some(rest) => format!("{rest}+00:00"),
        None => iso.to_string(),
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(&normalized) {
        return Some(dt.naive_local());
    }
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(&normalized, fmt) {
            return Some(dt.naive_local());
        }
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(&normalized, fmt) {
            return Some(dt);
        }
    }

    // chrono needs minutes, so "2024-10-25T13" is read as "2024-10-25T13:00".
    if normalized.len() == 13 {
        let padded = format!("{normalized}:00");
        for fmt in ["%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"] {
            if let Ok(dt) = NaiveDateTime::parse_from_str(&padded, fmt) {
                return Some(dt);
            }
        }
    }

    ["%Y-%m-%d", "%Y%m%d"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(&normalized, fmt).ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// "Friday, October 25"
pub fn date_label(dt: &NaiveDateTime) -> String {
    dt.format("%A, %B %-d").to_string()
}

/// "1:30pm", "9:05am", "12:00am"
pub fn time_label(dt: &NaiveDateTime) -> String {
    dt.format("%-I:%M%p").to_string().to_lowercase()
}

/// Number of forward month steps needed to show `requested` when the
/// calendar currently shows `displayed`. Never negative.
pub fn months_to_advance(displayed: NaiveDate, requested: NaiveDate) -> u32 {
    let index = |d: NaiveDate| d.year() as i64 * 12 + d.month0() as i64;
    (index(requested) - index(displayed)).max(0) as u32
}
