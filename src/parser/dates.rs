use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::model::WhoisDate;

// Zone-aware formats, tried first. Year-leading forms come before
// day-leading ones; ambiguous all-numeric dates read month-first.
const ZONED_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%z",
    "%d-%b-%Y %H:%M:%S %z",
];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y.%m.%d %H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
    "%d-%b-%Y %H:%M:%S",
    "%d.%m.%Y %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y.%m.%d",
    "%Y/%m/%d",
    "%Y%m%d",
    "%d-%b-%Y",
    "%d %b %Y",
    "%b %d %Y",
    "%m/%d/%Y",
    "%d.%m.%Y",
];

/// Coerce a WHOIS date string into a UTC timestamp. Timestamps without a
/// zone are taken as UTC. When no known format applies, the original
/// string is kept so the caller still surfaces what the registry sent.
pub fn cast_date(date_string: &str) -> WhoisDate {
    match parse_timestamp(date_string) {
        Some(ts) => WhoisDate::Timestamp(ts),
        None => WhoisDate::Raw(date_string.to_string()),
    }
}

fn parse_timestamp(date_string: &str) -> Option<DateTime<Utc>> {
    let date_string = date_string.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(date_string) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in ZONED_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(date_string, format) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    // Several registries suffix a naive timestamp with the zone name.
    let stripped = date_string
        .trim_end_matches(" UTC")
        .trim_end_matches(" GMT")
        .trim_end_matches('Z');

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(stripped, format) {
            return Some(DateTime::from_naive_utc_and_offset(naive, Utc));
        }
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(stripped, format) {
            let naive = date.and_hms_opt(0, 0, 0)?;
            return Some(DateTime::from_naive_utc_and_offset(naive, Utc));
        }
    }

    None
}
