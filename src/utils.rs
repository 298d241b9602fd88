use serde_json::Value;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime, UtcOffset};

/// Apply `f` to every leaf of a nested JSON structure, keeping arrays and
/// objects intact.
pub fn map_deep<F>(value: Value, mut f: F) -> Value
where
    F: FnMut(Value) -> Value,
{
    map_deep_with(value, &mut f)
}

fn map_deep_with<F>(value: Value, f: &mut F) -> Value
where
    F: FnMut(Value) -> Value,
{
    match value {
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| map_deep_with(item, f))
                .collect(),
        ),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, item)| (key, map_deep_with(item, f)))
                .collect(),
        ),
        leaf => f(leaf),
    }
}

/// Parse an ISO-8601 date or date-time and return its calendar date in UTC.
///
/// Accepts `YYYY-MM-DD`, naive `YYYY-MM-DDTHH:MM:SS[.fff]` (taken as UTC, a
/// space may replace the `T`), and RFC 3339 timestamps with an offset.
pub fn parse_utc_date(input: &str) -> Option<Date> {
    let input = input.trim();
    if input.len() < 10 {
        return None;
    }

    if let Ok(date) = Date::parse(input, format_description!("[year]-[month]-[day]")) {
        return Some(date);
    }

    let normalized = input.replacen(' ', "T", 1);

    if let Ok(dt) = OffsetDateTime::parse(&normalized, &Rfc3339) {
        return Some(dt.to_offset(UtcOffset::UTC).date());
    }

    PrimitiveDateTime::parse(
        &normalized,
        format_description!(
            "[year]-[month]-[day]T[hour]:[minute]:[second][optional [.[subsecond]]]"
        ),
    )
    .ok()
    .map(|dt| dt.date())
}

/// Format a calendar date as `YYYY-MM-DD`.
pub fn format_date(date: Date) -> Result<String, time::error::Format> {
    date.format(format_description!("[year]-[month]-[day]"))
}

/// Rewrite every ISO-8601-shaped string leaf to its UTC calendar date.
pub fn normalize_iso_dates(value: Value) -> Value {
    map_deep(value, |leaf| match leaf {
        Value::String(s) => match parse_utc_date(&s).and_then(|d| format_date(d).ok()) {
            Some(date) => Value::String(date),
            None => Value::String(s),
        },
        other => other,
    })
}
