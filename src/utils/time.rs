use chrono::{Datelike, Months, NaiveDate, NaiveTime, Utc, Weekday};
use chrono_tz::Tz;

/// Canonical date format used for keys, queries and the wire
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse time string in HH:MM or HH:MM:SS format
pub fn parse_time(time_str: &str) -> Option<(u32, u32)> {
    let parts: Vec<&str> = time_str.trim().split(':').collect();
    if parts.len() != 2 && parts.len() != 3 {
        return None;
    }
    let hour = parts[0].parse::<u32>().ok()?;
    let minute = parts[1].parse::<u32>().ok()?;
    if hour > 23 || minute > 59 {
        return None;
    }
    if let Some(second) = parts.get(2) {
        let second = second.parse::<u32>().ok()?;
        if second > 59 {
            return None;
        }
    }
    Some((hour, minute))
}

/// Parse a time of day, keeping seconds when present
pub fn parse_naive_time(time_str: &str) -> Option<NaiveTime> {
    let trimmed = time_str.trim();
    parse_time(trimmed)?;
    NaiveTime::parse_from_str(trimmed, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M"))
        .ok()
}

/// Parse a YYYY-MM-DD date
pub fn parse_date(date_str: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(date_str.trim(), DATE_FORMAT).ok()
}

/// Format a date as YYYY-MM-DD
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// First and last day of the month containing `date`
pub fn month_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = date.with_day(1).unwrap_or(date);
    let last = first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(date);
    (first, last)
}

/// Number of days between the start of the week and `date`
pub fn days_into_week(date: NaiveDate, week_start: Weekday) -> u32 {
    let day = date.weekday().num_days_from_sunday();
    let start = week_start.num_days_from_sunday();
    (7 + day - start) % 7
}

/// Current calendar date in the configured timezone
pub fn today_in(tz: &Tz) -> NaiveDate {
    Utc::now().with_timezone(tz).date_naive()
}
