//! "N minutes ago" style rendering
//!
//! Buckets: under a minute (future dates included), minutes, hours, and days
//! up to 29. Anything older falls back to the absolute `YYYY-MM-DD` date.

use chrono::{DateTime, Local, TimeZone};
use serde::{Deserialize, Serialize};

use crate::date::format_date;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Zh,
    En,
}

enum Bucket {
    JustNow,
    Minutes(i64),
    Hours(i64),
    Days(i64),
}

impl Locale {
    fn render(self, bucket: Bucket) -> String {
        match (self, bucket) {
            (Locale::Zh, Bucket::JustNow) => "刚刚".to_string(),
            (Locale::Zh, Bucket::Minutes(n)) => format!("{n}分钟前"),
            (Locale::Zh, Bucket::Hours(n)) => format!("{n}小时前"),
            (Locale::Zh, Bucket::Days(n)) => format!("{n}天前"),
            (Locale::En, Bucket::JustNow) => "just now".to_string(),
            (Locale::En, Bucket::Minutes(n)) => english(n, "minute"),
            (Locale::En, Bucket::Hours(n)) => english(n, "hour"),
            (Locale::En, Bucket::Days(n)) => english(n, "day"),
        }
    }
}

fn english(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("1 {unit} ago")
    } else {
        format!("{n} {unit}s ago")
    }
}

/// Relative time of `date` as seen from `now`.
pub fn format_relative_time_at<Tz: TimeZone, Tz2: TimeZone>(
    date: &DateTime<Tz>,
    now: &DateTime<Tz2>,
    locale: Locale,
) -> String {
    let seconds = (now.timestamp_millis() - date.timestamp_millis()).div_euclid(1000);
    if seconds < 60 {
        return locale.render(Bucket::JustNow);
    }
    let minutes = seconds / 60;
    if minutes < 60 {
        return locale.render(Bucket::Minutes(minutes));
    }
    let hours = minutes / 60;
    if hours < 24 {
        return locale.render(Bucket::Hours(hours));
    }
    let days = hours / 24;
    if days < 30 {
        return locale.render(Bucket::Days(days));
    }
    format_date(date, "YYYY-MM-DD")
}

/// Relative time of `date` as seen from the local clock.
pub fn format_relative_time<Tz: TimeZone>(date: &DateTime<Tz>, locale: Locale) -> String {
    format_relative_time_at(date, &Local::now(), locale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 20, 12, 0, 0).unwrap()
    }

    fn ago(seconds: i64, locale: Locale) -> String {
        let now = now();
        format_relative_time_at(&(now - Duration::seconds(seconds)), &now, locale)
    }

    #[test]
    fn under_a_minute_is_just_now() {
        assert_eq!(ago(30, Locale::Zh), "刚刚");
        assert_eq!(ago(30, Locale::En), "just now");
        assert_eq!(ago(0, Locale::En), "just now");
        assert_eq!(ago(59, Locale::Zh), "刚刚");
    }

    #[test]
    fn future_dates_are_just_now() {
        assert_eq!(ago(-3600, Locale::Zh), "刚刚");
        assert_eq!(ago(-1, Locale::En), "just now");
    }

    #[test]
    fn one_hour() {
        assert_eq!(ago(3600, Locale::Zh), "1小时前");
        assert_eq!(ago(3600, Locale::En), "1 hour ago");
    }

    #[test]
    fn bucket_boundaries() {
        assert_eq!(ago(60, Locale::Zh), "1分钟前");
        assert_eq!(ago(59 * 60 + 59, Locale::Zh), "59分钟前");
        assert_eq!(ago(23 * 3600 + 3599, Locale::Zh), "23小时前");
        assert_eq!(ago(24 * 3600, Locale::Zh), "1天前");
        assert_eq!(ago(29 * 86400, Locale::Zh), "29天前");
    }

    #[test]
    fn english_pluralizes() {
        assert_eq!(ago(60, Locale::En), "1 minute ago");
        assert_eq!(ago(5 * 60, Locale::En), "5 minutes ago");
        assert_eq!(ago(2 * 3600, Locale::En), "2 hours ago");
        assert_eq!(ago(86400, Locale::En), "1 day ago");
        assert_eq!(ago(3 * 86400, Locale::En), "3 days ago");
    }

    #[test]
    fn thirty_days_and_older_show_the_date() {
        assert_eq!(ago(30 * 86400, Locale::Zh), "2024-04-20");
        assert_eq!(ago(400 * 86400, Locale::En), "2023-04-16");
    }

    #[test]
    fn locale_deserializes_lowercase() {
        #[derive(Deserialize)]
        struct Wrapper {
            locale: Locale,
        }
        let w: Wrapper = serde_json::from_str(r#"{"locale":"en"}"#).unwrap();
        assert_eq!(w.locale, Locale::En);
        assert_eq!(Locale::default(), Locale::Zh);
    }
}
