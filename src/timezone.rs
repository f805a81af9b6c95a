//! Resolves the server's configured timezone to a UTC offset.

use time::{Date, OffsetDateTime, UtcOffset, macros::format_description};
use time_tz::{Offset, TimeZone};

use crate::Error;

/// Get the current UTC offset for a canonical timezone name, e.g. "Pacific/Auckland".
///
/// Returns `None` if the name is not a known timezone.
pub fn get_local_offset(canonical_timezone: &str) -> Option<UtcOffset> {
    time_tz::timezones::get_by_name(canonical_timezone)
        .map(|tz| tz.get_offset_utc(&OffsetDateTime::now_utc()).to_utc())
}

/// The current UTC date time truncated to whole seconds.
///
/// Timestamps are stored with second precision so that values read back from
/// the database compare equal to the values that were written.
pub fn now_utc() -> OffsetDateTime {
    let now = OffsetDateTime::now_utc();
    now.replace_nanosecond(0).unwrap_or(now)
}

/// Today's date in the timezone `canonical_timezone`.
///
/// # Errors
///
/// Returns [Error::InvalidTimezoneError] if the timezone is not known.
pub fn local_today(canonical_timezone: &str) -> Result<Date, Error> {
    let offset = get_local_offset(canonical_timezone)
        .ok_or_else(|| Error::InvalidTimezoneError(canonical_timezone.to_owned()))?;

    Ok(OffsetDateTime::now_utc().to_offset(offset).date())
}

/// Parse a date sent by a client, e.g. "2025-03-31".
///
/// Date times such as "2025-03-31T00:00:00.000Z" are accepted and truncated to their date.
///
/// # Errors
///
/// Returns [Error::InvalidDate] if `text` does not start with a date in the format YYYY-MM-DD.
pub fn parse_date(text: &str) -> Result<Date, Error> {
    let trimmed = text.trim();
    let date_part = trimmed.get(..10).unwrap_or(trimmed);

    Date::parse(date_part, format_description!("[year]-[month]-[day]"))
        .map_err(|_| Error::InvalidDate(text.to_owned()))
}
