//! Outgoing request options
//!
//! [`RequestOptions`] carries the caller-controlled parts of a request —
//! extra headers, query parameters, cookies, a JSON body — which the
//! session manager merges with its authentication data.

use serde_json::Value;
use std::time::Duration;

/// Caller-supplied transport parameters for one request.
///
/// Values set here win over the manager's fixed defaults when both name the
/// same header or cookie; the manager only fills in what the caller left
/// unset.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Additional headers
    pub headers: Vec<(String, String)>,
    /// Query string parameters
    pub query: Vec<(String, String)>,
    /// Additional cookies, merged over the session cookie set
    pub cookies: Vec<(String, String)>,
    /// JSON request body
    pub json: Option<Value>,
    /// Per-request timeout override
    pub timeout: Option<Duration>,
}

impl RequestOptions {
    /// Create empty request options
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a header
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Add a query parameter
    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// Add a cookie
    pub fn with_cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.push((name.into(), value.into()));
        self
    }

    /// Set the JSON body
    pub fn with_json(mut self, body: Value) -> Self {
        self.json = Some(body);
        self
    }

    /// Set a per-request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builder() {
        let options = RequestOptions::new()
            .with_header("X-Trace", "1")
            .with_query("sysparm_limit", "1")
            .with_cookie("extra", "value")
            .with_json(json!({"short_description": "test"}))
            .with_timeout(Duration::from_secs(10));

        assert_eq!(options.headers, vec![("X-Trace".to_string(), "1".to_string())]);
        assert_eq!(
            options.query,
            vec![("sysparm_limit".to_string(), "1".to_string())]
        );
        assert_eq!(options.cookies.len(), 1);
        assert!(options.json.is_some());
        assert_eq!(options.timeout, Some(Duration::from_secs(10)));
    }

    #[test]
    fn test_default_is_empty() {
        let options = RequestOptions::default();
        assert!(options.headers.is_empty());
        assert!(options.query.is_empty());
        assert!(options.cookies.is_empty());
        assert!(options.json.is_none());
        assert!(options.timeout.is_none());
    }
}
