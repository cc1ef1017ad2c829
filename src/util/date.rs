use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// `strftime` pattern for RFC 1123 dates, the form OPML files use
/// (`Tue, 02 Aug 2005 21:42:48 GMT`).
const RFC1123_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Naive layouts tried after RFC 2822 and RFC 3339. Values without an offset
/// are taken as UTC.
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %I:%M:%S %p",
    "%d %b %Y %H:%M:%S",
];

const NAIVE_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%d %b %Y"];

/// Parses an OPML timestamp.
///
/// Weekday and month names are always English, independent of the host
/// locale. Empty or unparseable input yields `None` rather than an error.
pub fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc2822(value) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(dt.and_utc());
        }
    }
    for format in NAIVE_DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
        }
    }

    tracing::debug!(value = %value, "Ignoring unparseable date");
    None
}

/// Renders a timestamp in RFC 1123 form, always in GMT.
pub fn format_date(value: &DateTime<Utc>) -> String {
    value.format(RFC1123_FORMAT).to_string()
}
