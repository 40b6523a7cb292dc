use anyhow::{anyhow, Result};
use chrono::{Datelike, Duration, Local, NaiveDate, Weekday};

/// Like [`parse_due_date`], relative to the local calendar date.
pub fn parse_due_date_local(input: &str) -> Result<NaiveDate> {
    parse_due_date(input, Local::now().date_naive())
}

/// Accepts `today`, `tomorrow`, `eow`, `eom`, `+Nd`/`+Nw`/`+Nm`, weekday
/// names (`fri`, `2:fri`) and `YYYY-MM-DD`.
pub fn parse_due_date(input: &str, today: NaiveDate) -> Result<NaiveDate> {
    let input = input.trim();
    if input.is_empty() {
        return Err(anyhow!("Empty due date"));
    }

    // 1. Reserved keywords
    match input.to_lowercase().as_str() {
        "today" | "tod" => return Ok(today),
        "tomorrow" | "tom" => return add_days(today, 1),
        "eow" => {
            let days_to_sunday = (7 - today.weekday().num_days_from_sunday() as i64) % 7;
            return add_days(today, days_to_sunday);
        }
        "eom" => return last_day_of_month(today.year(), today.month()),
        _ => {}
    }

    // 2. Relative format (+Nd, +Nw, +Nm)
    if let Some(rest) = input.strip_prefix('+') {
        let Some((unit_index, unit)) = rest.char_indices().last() else {
            return Err(anyhow!("Invalid relative format: {}", input));
        };
        let count: i64 = rest[..unit_index]
            .parse()
            .map_err(|_| anyhow!("Invalid relative format: {}", input))?;

        return match unit.to_ascii_lowercase() {
            'd' => add_days(today, count),
            'w' => count
                .checked_mul(7)
                .ok_or_else(out_of_range)
                .and_then(|days| add_days(today, days)),
            'm' => add_months(today, count),
            _ => Err(anyhow!("Unknown unit in relative time: {}", unit)),
        };
    }

    // 3. ISO date
    if let Ok(d) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Ok(d);
    }

    // 4. Weekday format (fri, 2:fri)
    if let Some((count, day_str)) = parse_weekday_token(input) {
        if let Ok(target) = parse_weekday_str(day_str) {
            let mut days_needed = target.num_days_from_sunday() as i64
                - today.weekday().num_days_from_sunday() as i64;
            if days_needed <= 0 {
                days_needed += 7;
            }
            let days_needed = (count - 1)
                .checked_mul(7)
                .and_then(|weeks| weeks.checked_add(days_needed))
                .ok_or_else(out_of_range)?;
            return add_days(today, days_needed);
        }
    }

    Err(anyhow!("Could not parse date: {}", input))
}

fn out_of_range() -> anyhow::Error {
    anyhow!("Date out of range")
}

fn add_days(date: NaiveDate, days: i64) -> Result<NaiveDate> {
    Duration::try_days(days)
        .and_then(|delta| date.checked_add_signed(delta))
        .ok_or_else(out_of_range)
}

fn add_months(date: NaiveDate, count: i64) -> Result<NaiveDate> {
    let months = (date.year() as i64 * 12 + date.month0() as i64)
        .checked_add(count)
        .ok_or_else(out_of_range)?;
    let year = i32::try_from(months.div_euclid(12)).map_err(|_| out_of_range())?;
    let month = months.rem_euclid(12) as u32 + 1;

    match NaiveDate::from_ymd_opt(year, month, date.day()) {
        Some(d) => Ok(d),
        // Jan 31 + 1m -> Feb 28
        None => last_day_of_month(year, month),
    }
}

fn last_day_of_month(year: i32, month: u32) -> Result<NaiveDate> {
    let first_of_next = if month == 12 {
        year.checked_add(1).and_then(|y| NaiveDate::from_ymd_opt(y, 1, 1))
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    first_of_next
        .and_then(|d| d.pred_opt())
        .ok_or_else(out_of_range)
}

fn parse_weekday_token(input: &str) -> Option<(i64, &str)> {
    match input.split_once(':') {
        Some((count, day)) => count
            .parse::<i64>()
            .ok()
            .filter(|c| *c >= 1)
            .map(|c| (c, day)),
        None => Some((1, input)),
    }
}

fn parse_weekday_str(s: &str) -> Result<Weekday> {
    match s.to_lowercase().as_str() {
        "mon" | "monday" => Ok(Weekday::Mon),
        "tue" | "tuesday" => Ok(Weekday::Tue),
        "wed" | "wednesday" => Ok(Weekday::Wed),
        "thu" | "thursday" => Ok(Weekday::Thu),
        "fri" | "friday" => Ok(Weekday::Fri),
        "sat" | "saturday" => Ok(Weekday::Sat),
        "sun" | "sunday" => Ok(Weekday::Sun),
        _ => Err(anyhow!("Unknown weekday: {}", s)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // 2025-01-15 is a Wednesday.
    const TODAY: (i32, u32, u32) = (2025, 1, 15);

    fn today() -> NaiveDate {
        ymd(TODAY.0, TODAY.1, TODAY.2)
    }

    #[test]
    fn test_keywords() {
        assert_eq!(parse_due_date("today", today()).unwrap(), today());
        assert_eq!(parse_due_date("tom", today()).unwrap(), ymd(2025, 1, 16));
        assert_eq!(parse_due_date("eow", today()).unwrap(), ymd(2025, 1, 19));
        assert_eq!(parse_due_date("eom", today()).unwrap(), ymd(2025, 1, 31));
        assert_eq!(parse_due_date("EOM", ymd(2024, 12, 3)).unwrap(), ymd(2024, 12, 31));
    }

    #[test]
    fn test_eow_on_sunday_is_today() {
        let sunday = ymd(2025, 1, 19);
        assert_eq!(parse_due_date("eow", sunday).unwrap(), sunday);
    }

    #[test]
    fn test_relative() {
        assert_eq!(parse_due_date("+3d", today()).unwrap(), ymd(2025, 1, 18));
        assert_eq!(parse_due_date("+2w", today()).unwrap(), ymd(2025, 1, 29));
        assert_eq!(parse_due_date("+1m", ymd(2025, 1, 31)).unwrap(), ymd(2025, 2, 28));
        assert_eq!(parse_due_date("+12m", today()).unwrap(), ymd(2026, 1, 15));
        assert!(parse_due_date("+d", today()).is_err());
        assert!(parse_due_date("+3y", today()).is_err());
    }

    #[test]
    fn test_weekdays() {
        assert_eq!(parse_due_date("fri", today()).unwrap(), ymd(2025, 1, 17));
        assert_eq!(parse_due_date("wed", today()).unwrap(), ymd(2025, 1, 22));
        assert_eq!(parse_due_date("2:fri", today()).unwrap(), ymd(2025, 1, 24));
        assert!(parse_due_date("0:fri", today()).is_err());
    }

    #[test]
    fn test_multibyte_unit_is_an_error() {
        assert!(parse_due_date("+3é", today()).is_err());
        assert!(parse_due_date("+é", today()).is_err());
        assert!(parse_due_date("+", today()).is_err());
    }

    #[test]
    fn test_huge_offsets_are_out_of_range() {
        for input in [
            "+99999999999d",
            "+9223372036854775807d",
            "+9223372036854775807w",
            "+9223372036854775807m",
            "+99999999999m",
            "9999999999999:fri",
            "9223372036854775807:fri",
        ] {
            let err = parse_due_date(input, today()).unwrap_err();
            assert!(err.to_string().contains("out of range"), "{}: {}", input, err);
        }
    }

    #[test]
    fn test_end_of_calendar_is_out_of_range() {
        let last = NaiveDate::MAX;
        assert!(parse_due_date("tomorrow", last).is_err());
        assert!(parse_due_date("+1m", last).is_err());
    }

    #[test]
    fn test_iso_and_garbage() {
        assert_eq!(parse_due_date(" 2025-03-01 ", today()).unwrap(), ymd(2025, 3, 1));
        assert!(parse_due_date("", today()).is_err());
        assert!(parse_due_date("someday", today()).is_err());
        assert!(parse_due_date("2025-02-30", today()).is_err());
    }
}
