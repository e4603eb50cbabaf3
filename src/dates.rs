use time::{format_description::FormatItem, macros::format_description, Date, OffsetDateTime};

use crate::error::{AppError, AppResult};

/// Wire format for calendar dates: `YYYY-MM-DD`.
pub const DATE_FORMAT: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

// `#[serde(with = "crate::dates::iso_date")]`, or `iso_date::option` for `Option<Date>`.
time::serde::format_description!(pub(crate) iso_date, Date, "[year]-[month]-[day]");

pub fn parse_date(raw: &str) -> AppResult<Date> {
    Date::parse(raw.trim(), DATE_FORMAT)
        .map_err(|_| AppError::validation(format!("Invalid date '{raw}', expected YYYY-MM-DD")))
}

pub fn today_utc() -> Date {
    OffsetDateTime::now_utc().date()
}
