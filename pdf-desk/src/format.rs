//! Date rendering for the listing and the edit form.

use time::{Date, Month};

use crate::time_utils::{parse_iso_day, to_local_time};

pub const INVALID_DATE: &str = "Invalid Date";
pub const PICK_A_DATE: &str = "Pick a date";

/// Render a record date as `M/D/YYYY`.
///
/// Missing or malformed values render as [`INVALID_DATE`] instead of
/// failing. A bare `YYYY-MM-DD` is a calendar day and is never shifted;
/// full timestamps are shown in the local offset.
pub fn format_date(raw: Option<&str>) -> String {
    let Some(raw) = raw.filter(|s| !s.trim().is_empty()) else {
        return INVALID_DATE.to_string();
    };

    let date = match parse_iso_day(raw) {
        Some(date) => date,
        None => match time::OffsetDateTime::parse(
            raw.trim(),
            &time::format_description::well_known::Rfc3339,
        ) {
            Ok(dt) => to_local_time(dt).date(),
            Err(_) => return INVALID_DATE.to_string(),
        },
    };

    short_date(date)
}

pub fn short_date(date: Date) -> String {
    format!("{}/{}/{}", date.month() as u8, date.day(), date.year())
}

/// Inverse of [`short_date`].
pub fn parse_display_date(display: &str) -> Option<Date> {
    let mut parts = display.trim().splitn(3, '/');
    let month: u8 = parts.next()?.parse().ok()?;
    let day: u8 = parts.next()?.parse().ok()?;
    let year: i32 = parts.next()?.parse().ok()?;
    let month = Month::try_from(month).ok()?;
    Date::from_calendar_date(year, month, day).ok()
}

/// Long form used on the date picker button, e.g. `March 5th, 2024`.
pub fn format_long_date(date: Date) -> String {
    format!(
        "{} {}{}, {}",
        date.month(),
        date.day(),
        ordinal_suffix(date.day()),
        date.year()
    )
}

fn ordinal_suffix(day: u8) -> &'static str {
    match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}
