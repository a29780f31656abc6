//! Navigation targets
//!
//! A `Location` is an in-app path with optional query and fragment, e.g.
//! `/admin/login?redirect=%2Fadmin%2Fdashboard`. Query values are stored
//! percent-decoded.

use std::fmt;

use crate::error::{Error, Result};
use crate::route::normalize_path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    full_path: String,
    path: String,
    query: Vec<(String, String)>,
}

impl Location {
    /// Parse an in-app target. It must start with a single `/`.
    pub fn parse(target: &str) -> Result<Self> {
        let target = target.trim();
        if !target.starts_with('/') || target.starts_with("//") {
            return Err(Error::InvalidPath(target.to_string()));
        }

        let without_fragment = target.split('#').next().unwrap_or(target);
        let query = match without_fragment.split_once('?') {
            Some((_, raw)) => parse_query(raw),
            None => Vec::new(),
        };

        Ok(Self {
            full_path: target.to_string(),
            path: normalize_path(target).to_string(),
            query,
        })
    }

    /// Location for a known in-app path with no query.
    pub fn bare(path: &str) -> Self {
        Self {
            full_path: path.to_string(),
            path: normalize_path(path).to_string(),
            query: Vec::new(),
        }
    }

    /// Build `path?key=value` with the value percent-encoded.
    pub fn with_param(path: &str, key: &str, value: &str) -> Self {
        Self {
            full_path: format!("{path}?{key}={}", urlencoding::encode(value)),
            path: normalize_path(path).to_string(),
            query: vec![(key.to_string(), value.to_string())],
        }
    }

    /// Path without query or fragment, trailing slash removed.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The target exactly as navigated to.
    pub fn full_path(&self) -> &str {
        &self.full_path
    }

    /// First decoded value for `key`.
    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_path)
    }
}

fn parse_query(raw: &str) -> Vec<(String, String)> {
    raw.split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (decode(key), decode(value))
        })
        .collect()
}

/// Percent-decode, keeping the raw text when it is not valid UTF-8.
fn decode(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|s| s.into_owned())
        .unwrap_or(spaced)
}
