//! Due-date parsing and formatting.
//!
//! Due dates are entered as calendar days and stored as the UTC midnight
//! instant of that day, so a task due "today" becomes overdue as soon as the
//! day has started.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc};

/// Parse human-readable due date input relative to `today`.
///
/// Supports:
/// - "today", "tomorrow", "yesterday"
/// - "monday", "next monday", "this friday", "fri"
/// - "end of week", "end of month", "this weekend"
/// - "in 3d", "in 2w", "in 1m"
/// - "YYYY-MM-DD"
///
/// Anything else yields `None`; callers treat that as "no due date".
pub fn parse_due_input(s: &str, today: NaiveDate) -> Option<NaiveDate> {
    let s = s.trim().to_lowercase();

    match s.as_str() {
        "" => return None,
        "today" => return Some(today),
        "tomorrow" => return Some(today + Duration::days(1)),
        "yesterday" => return Some(today - Duration::days(1)),
        "end of week" | "eow" => return Some(end_of_week(today)),
        "end of month" | "eom" => {
            let (year, month) = if today.month() == 12 {
                (today.year() + 1, 1)
            } else {
                (today.year(), today.month() + 1)
            };
            let first_of_next = NaiveDate::from_ymd_opt(year, month, 1)?;
            return Some(first_of_next - Duration::days(1));
        }
        "this weekend" | "weekend" => {
            let days_until_saturday = (5 + 7 - today.weekday().num_days_from_monday()) % 7;
            return Some(today + Duration::days(days_until_saturday as i64));
        }
        _ => {}
    }

    if let Some(rest) = s.strip_prefix("in ") {
        let rest = rest.trim();
        if let Some(unit) = rest.chars().last() {
            let amount = &rest[..rest.len() - unit.len_utf8()];
            if let Ok(n) = amount.trim().parse::<i64>() {
                let days = match unit {
                    'd' => Some(n),
                    'w' => n.checked_mul(7),
                    // Approximate: 30 days per month
                    'm' => n.checked_mul(30),
                    _ => return None,
                };
                // Out-of-range offsets are treated like any other bad input.
                return days
                    .and_then(Duration::try_days)
                    .and_then(|delta| today.checked_add_signed(delta));
            }
        }
    }

    let (base, skip_week) = if let Some(day) = s.strip_prefix("next ") {
        (day, true)
    } else if let Some(day) = s.strip_prefix("this ") {
        (day, false)
    } else {
        (s.as_str(), false)
    };
    if let Some(target) = weekday_index(base) {
        let current = today.weekday().num_days_from_monday();
        let mut days_ahead = (target + 7 - current) % 7;
        if skip_week {
            days_ahead += 7;
        }
        return Some(today + Duration::days(days_ahead as i64));
    }

    NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()
}

fn weekday_index(name: &str) -> Option<u32> {
    let idx = match name {
        "monday" | "mon" => 0,
        "tuesday" | "tue" => 1,
        "wednesday" | "wed" => 2,
        "thursday" | "thu" => 3,
        "friday" | "fri" => 4,
        "saturday" | "sat" => 5,
        "sunday" | "sun" => 6,
        _ => return None,
    };
    Some(idx)
}

/// Sunday of the ISO week containing `today`.
pub fn end_of_week(today: NaiveDate) -> NaiveDate {
    let weekday = today.weekday().num_days_from_monday() as i64;
    today + Duration::days(6 - weekday)
}

/// The instant a calendar due date refers to (UTC midnight).
pub fn due_instant(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Parse due-date input straight to the stored instant.
pub fn parse_due_instant(s: &str, today: NaiveDate) -> Option<DateTime<Utc>> {
    parse_due_input(s, today).map(due_instant)
}

/// Format a due date as "Mon D, YYYY".
pub fn format_date(date: DateTime<Utc>) -> String {
    date.format("%b %-d, %Y").to_string()
}

/// Format a due date relative to today ("today", "tomorrow", "in 3d", "2d late").
pub fn format_due_relative(due: Option<DateTime<Utc>>, today: NaiveDate) -> String {
    match due {
        None => "-".into(),
        Some(d) => {
            let delta = (d.date_naive() - today).num_days();
            if delta == 0 {
                "today".into()
            } else if delta == 1 {
                "tomorrow".into()
            } else if delta > 1 {
                format!("in {}d", delta)
            } else {
                format!("{}d late", -delta)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wednesday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 15).unwrap()
    }

    #[test]
    fn parses_keywords() {
        let today = wednesday();
        assert_eq!(parse_due_input("today", today), Some(today));
        assert_eq!(parse_due_input("Tomorrow", today), NaiveDate::from_ymd_opt(2024, 5, 16));
        assert_eq!(parse_due_input("yesterday", today), NaiveDate::from_ymd_opt(2024, 5, 14));
        assert_eq!(parse_due_input("eow", today), NaiveDate::from_ymd_opt(2024, 5, 19));
        assert_eq!(parse_due_input("end of month", today), NaiveDate::from_ymd_opt(2024, 5, 31));
        assert_eq!(parse_due_input("weekend", today), NaiveDate::from_ymd_opt(2024, 5, 18));
    }

    #[test]
    fn parses_relative_offsets() {
        let today = wednesday();
        assert_eq!(parse_due_input("in 3d", today), NaiveDate::from_ymd_opt(2024, 5, 18));
        assert_eq!(parse_due_input("in 2w", today), NaiveDate::from_ymd_opt(2024, 5, 29));
        assert_eq!(parse_due_input("in 1m", today), NaiveDate::from_ymd_opt(2024, 6, 14));
        assert_eq!(parse_due_input("in xd", today), None);
    }

    #[test]
    fn huge_offsets_are_absent() {
        let today = wednesday();
        assert_eq!(parse_due_input("in 100000000d", today), None);
        assert_eq!(parse_due_input("in 99999999999999d", today), None);
        assert_eq!(parse_due_input("in 9223372036854775807w", today), None);
        assert_eq!(parse_due_input("in 400000000000000000m", today), None);
        assert_eq!(parse_due_input("in -100000000d", today), None);
    }

    #[test]
    fn parses_weekdays() {
        let today = wednesday();
        assert_eq!(parse_due_input("friday", today), NaiveDate::from_ymd_opt(2024, 5, 17));
        assert_eq!(parse_due_input("wed", today), Some(today));
        assert_eq!(parse_due_input("next wed", today), NaiveDate::from_ymd_opt(2024, 5, 22));
        assert_eq!(parse_due_input("this mon", today), NaiveDate::from_ymd_opt(2024, 5, 20));
    }

    #[test]
    fn iso_dates_and_garbage() {
        let today = wednesday();
        assert_eq!(parse_due_input("2024-12-25", today), NaiveDate::from_ymd_opt(2024, 12, 25));
        assert_eq!(parse_due_input("2024-13-40", today), None);
        assert_eq!(parse_due_input("whenever", today), None);
        assert_eq!(parse_due_input("   ", today), None);
    }

    #[test]
    fn due_instant_is_utc_midnight() {
        let instant = parse_due_instant("2024-05-20", wednesday()).unwrap();
        assert_eq!(instant.to_rfc3339(), "2024-05-20T00:00:00+00:00");
        assert_eq!(format_date(instant), "May 20, 2024");
    }

    #[test]
    fn relative_formatting() {
        let today = wednesday();
        let on = |y, m, d| Some(due_instant(NaiveDate::from_ymd_opt(y, m, d).unwrap()));
        assert_eq!(format_due_relative(None, today), "-");
        assert_eq!(format_due_relative(on(2024, 5, 15), today), "today");
        assert_eq!(format_due_relative(on(2024, 5, 16), today), "tomorrow");
        assert_eq!(format_due_relative(on(2024, 5, 20), today), "in 5d");
        assert_eq!(format_due_relative(on(2024, 5, 13), today), "2d late");
    }
}
