//! Day-month-year dates as users type them

use chrono::{Datelike, Duration, NaiveDate};

/// Display format for dates in replies
pub const DATE_FORMAT: &str = "%d.%m.%Y";

fn digits(part: &str, min: usize, max: usize) -> Option<&str> {
    (part.len() >= min && part.len() <= max && part.bytes().all(|b| b.is_ascii_digit()))
        .then_some(part)
}

/// Parse `D.M`, `D.M.YY` or `D.M.YYYY`
///
/// Day and month take one or two digits. A missing year means the year of
/// `today`; a two-digit year `YY` means `20YY`.
pub fn parse_date(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    let mut parts = text.trim().split('.');
    let day: u32 = digits(parts.next()?, 1, 2)?.parse().ok()?;
    let month: u32 = digits(parts.next()?, 1, 2)?.parse().ok()?;
    let year = match parts.next() {
        None => today.year(),
        Some(y) if y.len() == 2 => 2000 + digits(y, 2, 2)?.parse::<i32>().ok()?,
        Some(y) => digits(y, 4, 4)?.parse().ok()?,
    };
    if parts.next().is_some() {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Monday and Sunday of the week `weeks_back` weeks before the one containing `today`
///
/// `None` when that week falls outside the supported date range.
pub fn week_bounds(today: NaiveDate, weeks_back: u32) -> Option<(NaiveDate, NaiveDate)> {
    let since_monday = i64::from(today.weekday().num_days_from_monday());
    let back = Duration::days(since_monday + 7 * i64::from(weeks_back));
    let monday = today.checked_sub_signed(back)?;
    Some((monday, monday.checked_add_signed(Duration::days(6))?))
}

/// First and last day of the month containing `today`
pub fn month_bounds(today: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
    let first = today.with_day(1)?;
    let next_first = if today.month() == 12 {
        NaiveDate::from_ymd_opt(today.year().checked_add(1)?, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(today.year(), today.month() + 1, 1)?
    };
    Some((first, next_first.pred_opt()?))
}
