use chrono::{DateTime, NaiveDate, Utc};

pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Relative age by calendar-day difference, e.g. `"3 days ago"` or `"2 weeks ago"`.
pub fn posted_age(created_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    age_in_days(created_at.date_naive(), now.date_naive())
}

fn age_in_days(from: NaiveDate, to: NaiveDate) -> String {
    let days = (to - from).num_days().abs();
    match days {
        0 => "Today".to_string(),
        1 => "1 day ago".to_string(),
        2..=6 => format!("{} days ago", days),
        7..=29 => plural(days / 7, "week"),
        _ => plural(days / 30, "month"),
    }
}

fn plural(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("1 {} ago", unit)
    } else {
        format!("{} {}s ago", count, unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn counts_calendar_days_not_elapsed_hours() {
        let now = at(2024, 3, 2, 1);
        assert_eq!(posted_age(at(2024, 3, 1, 23), now), "1 day ago");
        assert_eq!(posted_age(at(2024, 3, 2, 0), now), "Today");
    }

    #[test]
    fn buckets_by_week_and_month() {
        let now = at(2024, 3, 31, 12);
        assert_eq!(posted_age(at(2024, 3, 27, 12), now), "4 days ago");
        assert_eq!(posted_age(at(2024, 3, 24, 12), now), "1 week ago");
        assert_eq!(posted_age(at(2024, 3, 10, 12), now), "3 weeks ago");
        assert_eq!(posted_age(at(2024, 3, 1, 12), now), "1 month ago");
        assert_eq!(posted_age(at(2023, 12, 1, 12), now), "4 months ago");
    }
}
