//! Display formatting for amounts and timestamps.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// US-dollar amount with thousands separators, e.g. `$1,234.50`.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn format_currency(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}${grouped}.{:02}", cents % 100)
}

/// Timestamp as `Jan 5, 2024, 03:30 PM`, in the offset it was written with.
///
/// Accepts RFC 3339, naive `YYYY-MM-DDTHH:MM:SS[.f]` and plain dates. Anything
/// else is returned unchanged.
#[must_use]
pub fn format_date(value: &str) -> String {
    const DISPLAY: &str = "%b %-d, %Y, %I:%M %p";

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return dt.format(DISPLAY).to_string();
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, pattern) {
            return dt.format(DISPLAY).to_string();
        }
    }
    if let Some(dt) = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
    {
        return dt.format(DISPLAY).to_string();
    }
    value.to_string()
}
