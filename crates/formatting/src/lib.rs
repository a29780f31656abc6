//! Display helpers for timestamps and byte counts
//!
//! Used by the console to render credential ages and response sizes.

pub mod date;
pub mod relative;
pub mod size;

pub use date::{DEFAULT_PATTERN, format_date, parse_datetime};
pub use relative::{Locale, format_relative_time, format_relative_time_at};
pub use size::format_file_size;
