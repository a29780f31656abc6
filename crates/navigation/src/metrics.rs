//! Navigation counters
//!
//! - `navigation_redirects_total` (counter): label `target`

/// Record a guard redirect to the given login path.
pub fn record_redirect(target: &str) {
    metrics::counter!("navigation_redirects_total", "target" => target.to_string()).increment(1);
}
