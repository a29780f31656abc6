//! Pattern-based date formatting
//!
//! Patterns use the tokens `YYYY MM DD HH mm ss`. Tokens are substituted one
//! after another over the whole pattern, so literal text that happens to spell
//! a token is replaced too.

use chrono::{DateTime, Datelike, FixedOffset, Local, NaiveDateTime, TimeZone, Timelike};

pub const DEFAULT_PATTERN: &str = "YYYY-MM-DD HH:mm:ss";

/// Render `date` in its own timezone using `pattern`.
pub fn format_date<Tz: TimeZone>(date: &DateTime<Tz>, pattern: &str) -> String {
    pattern
        .replace("YYYY", &date.year().to_string())
        .replace("MM", &format!("{:02}", date.month()))
        .replace("DD", &format!("{:02}", date.day()))
        .replace("HH", &format!("{:02}", date.hour()))
        .replace("mm", &format!("{:02}", date.minute()))
        .replace("ss", &format!("{:02}", date.second()))
}

/// Parse an RFC 3339 timestamp, or `YYYY-MM-DD HH:MM:SS` in local time.
///
/// Returns `None` for unparseable input and for local times that do not
/// exist or are ambiguous (DST transitions).
pub fn parse_datetime(input: &str) -> Option<DateTime<FixedOffset>> {
    let input = input.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(input) {
        return Some(parsed);
    }
    let naive = NaiveDateTime::parse_from_str(input, "%Y-%m-%d %H:%M:%S").ok()?;
    Local
        .from_local_datetime(&naive)
        .single()
        .map(|local| local.fixed_offset())
}
