use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};

use super::errors::PlotError;

/// Naive layouts tried after RFC 3339, in order
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// Parse a raw timestamp string into UTC
///
/// With an explicit `format` only that chrono layout is tried (a date-only
/// layout yields midnight). Without one, RFC 3339 is tried first, then the
/// naive layouts in `NAIVE_FORMATS`, then a bare `YYYY-MM-DD` date.
/// Naive values are taken as UTC.
pub fn parse_timestamp(raw: &str, format: Option<&str>) -> Result<DateTime<Utc>, PlotError> {
    let value = raw.trim();

    if let Some(format) = format {
        return NaiveDateTime::parse_from_str(value, format)
            .or_else(|_| NaiveDate::parse_from_str(value, format).map(midnight))
            .map(|naive| DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc))
            .map_err(|e| PlotError::Timestamp {
                value: raw.to_string(),
                reason: format!("does not match '{}': {}", format, e),
            });
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }

    for layout in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, layout) {
            return Ok(DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc));
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|d| DateTime::<Utc>::from_naive_utc_and_offset(midnight(d), Utc))
        .map_err(|_| PlotError::Timestamp {
            value: raw.to_string(),
            reason: "unrecognized timestamp format".to_string(),
        })
}

fn midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}
