use time::{Date, Duration, OffsetDateTime, format_description::BorrowedFormatItem};

/// `YYYY-MM-DD`, the on-disk representation of a day.
pub const DATE_FORMAT: &[BorrowedFormatItem<'static>] =
    time::macros::format_description!("[year]-[month]-[day]");

/// Current calendar day, UTC.
pub fn today() -> Date {
    OffsetDateTime::now_utc().date()
}

pub fn format_date(date: Date) -> Result<String, time::error::Format> {
    date.format(DATE_FORMAT)
}

pub fn parse_date(value: &str) -> Result<Date, time::error::Parse> {
    Date::parse(value, DATE_FORMAT)
}

/// `count` consecutive days starting at `start`.
pub fn days_from(start: Date, count: u32) -> Vec<Date> {
    (0..i64::from(count))
        .map(|offset| start + Duration::days(offset))
        .collect()
}

/// The `count` days before `end`, oldest first. `end` itself is excluded.
pub fn days_before(end: Date, count: u32) -> Vec<Date> {
    (1..=i64::from(count))
        .rev()
        .map(|offset| end - Duration::days(offset))
        .collect()
}
