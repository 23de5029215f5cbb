use chrono::Duration;

use super::errors::PlotError;

const UNITS_HINT: &str = "Use: ns, us, ms, s, m, h";

/// Nanoseconds in one `unit`
fn unit_nanos(unit: &str) -> Option<i128> {
    match unit {
        "ns" => Some(1),
        "us" | "µs" | "μs" => Some(1_000),
        "ms" => Some(1_000_000),
        "s" => Some(1_000_000_000),
        "m" => Some(60 * 1_000_000_000),
        "h" => Some(3_600 * 1_000_000_000),
        _ => None,
    }
}

/// Parse a candle interval string to a duration
/// Examples: "240h" -> 10 days, "1h30m" -> 90 minutes, "1.5h", "2h45m30.5s", "90us"
///
/// Accepts one or more `<amount><unit>` groups where the amount may carry a
/// decimal fraction and unit is one of `ns`, `us` (or `µs`), `ms`, `s`, `m`,
/// `h`. Fractions finer than a nanosecond are truncated. The total must be
/// positive.
pub fn parse_interval(interval: &str) -> Result<Duration, PlotError> {
    let invalid = |reason: &str| PlotError::Interval {
        value: interval.to_string(),
        reason: reason.to_string(),
    };

    let mut rest = interval.trim();
    if rest.is_empty() {
        return Err(invalid("empty interval. Examples: 1h, 24h, 240h, 1h30m"));
    }

    let mut total: i128 = 0;
    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        let number = &rest[..number_len];
        rest = &rest[number_len..];

        let (whole, fraction) = number.split_once('.').unwrap_or((number, ""));
        if whole.is_empty() && fraction.is_empty() {
            return Err(invalid("expected a number before each unit"));
        }
        if fraction.contains('.') {
            return Err(invalid("malformed number"));
        }

        let unit_len = rest.find(|c: char| !c.is_alphabetic()).unwrap_or(rest.len());
        let unit = &rest[..unit_len];
        rest = &rest[unit_len..];

        let scale = match unit {
            "" => return Err(invalid(&format!("missing unit. {}", UNITS_HINT))),
            _ => unit_nanos(unit).ok_or_else(|| PlotError::Interval {
                value: interval.to_string(),
                reason: format!("unknown unit '{}'. {}", unit, UNITS_HINT),
            })?,
        };

        let whole: i128 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid("interval too large"))?
        };

        // Digits past the 18th are below a nanosecond for every unit
        let digits = &fraction[..fraction.len().min(18)];
        let fraction_nanos = if digits.is_empty() {
            0
        } else {
            let numerator: i128 = digits.parse().map_err(|_| invalid("malformed number"))?;
            numerator * scale / 10i128.pow(digits.len() as u32)
        };

        total = whole
            .checked_mul(scale)
            .and_then(|n| n.checked_add(fraction_nanos))
            .and_then(|n| total.checked_add(n))
            .filter(|n| *n <= i64::MAX as i128)
            .ok_or_else(|| invalid("interval too large"))?;
    }

    if total <= 0 {
        return Err(invalid("interval must be positive"));
    }

    Ok(Duration::nanoseconds(total as i64))
}
