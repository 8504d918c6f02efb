use time::UtcOffset;

pub fn to_local_time(dt: time::OffsetDateTime) -> time::OffsetDateTime {
    if let Ok(local_offset) = UtcOffset::current_local_offset() {
        dt.to_offset(local_offset)
    } else {
        dt
    }
}

/// Parse either a bare `YYYY-MM-DD` day (taken as midnight UTC) or a full
/// RFC 3339 timestamp.
pub fn parse_instant(raw: &str) -> Option<time::OffsetDateTime> {
    let raw = raw.trim();
    if let Ok(dt) =
        time::OffsetDateTime::parse(raw, &time::format_description::well_known::Rfc3339)
    {
        return Some(dt);
    }
    parse_iso_day(raw).map(|date| date.midnight().assume_utc())
}

pub fn parse_iso_day(raw: &str) -> Option<time::Date> {
    let format = time::macros::format_description!("[year]-[month]-[day]");
    time::Date::parse(raw.trim(), &format).ok()
}
