//! Request pipeline counters
//!
//! - `session_requests_total` (counter): label `status` ("transport" when no
//!   response arrived)
//! - `session_auth_failures_total` (counter): label `scope`

use crate::request::RequestScope;

/// Record a completed request by status code.
pub fn record_request(status: Option<u16>) {
    let status = status
        .map(|s| s.to_string())
        .unwrap_or_else(|| "transport".to_string());
    metrics::counter!("session_requests_total", "status" => status).increment(1);
}

/// Record a 401 attributed to `scope`.
pub fn record_auth_failure(scope: RequestScope) {
    metrics::counter!("session_auth_failures_total", "scope" => scope.label()).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_functions_do_not_panic_without_recorder() {
        record_request(Some(200));
        record_request(None);
        record_auth_failure(RequestScope::Admin);
    }
}
