//! Request DTOs for the diagnostics API
//!
//! Defines the structure of incoming query parameters and path validation.

use std::time::Duration;

use serde::Deserialize;

/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;

/// Maximum TTL accepted from a request (one week)
pub const MAX_TTL_SECS: u64 = 7 * 24 * 60 * 60;

/// Query string for `GET /aggregate/:key`
///
/// # Fields
/// - `ttl`: Optional TTL in seconds for this lookup (uses the cache default if
///   not specified). 0 ignores the stored value, but a request arriving while
///   the key is already being computed shares that computation
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AggregateQuery {
    /// Optional TTL in seconds
    #[serde(default)]
    pub ttl: Option<u64>,
}

impl AggregateQuery {
    /// Validates the query
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        match self.ttl {
            Some(ttl) if ttl > MAX_TTL_SECS => Some(format!(
                "TTL exceeds maximum of {} seconds",
                MAX_TTL_SECS
            )),
            _ => None,
        }
    }

    /// TTL requested by the caller, or `default` when absent.
    pub fn ttl_or(&self, default: Duration) -> Duration {
        self.ttl.map(Duration::from_secs).unwrap_or(default)
    }
}

/// Validates an aggregate key taken from the path.
///
/// Returns an error message if validation fails, None if valid.
pub fn validate_key(key: &str) -> Option<String> {
    if key.trim().is_empty() {
        return Some("Key cannot be empty".to_string());
    }
    if key.len() > MAX_KEY_LENGTH {
        return Some(format!(
            "Key exceeds maximum length of {} bytes",
            MAX_KEY_LENGTH
        ));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_deserialize_without_ttl() {
        let query: AggregateQuery = serde_json::from_str("{}").unwrap();
        assert!(query.ttl.is_none());
        assert_eq!(query.ttl_or(Duration::from_secs(900)), Duration::from_secs(900));
    }

    #[test]
    fn test_query_with_ttl() {
        let query: AggregateQuery = serde_json::from_str(r#"{"ttl": 60}"#).unwrap();
        assert_eq!(query.ttl, Some(60));
        assert_eq!(query.ttl_or(Duration::from_secs(900)), Duration::from_secs(60));
        assert!(query.validate().is_none());
    }

    #[test]
    fn test_query_ttl_too_large() {
        let query = AggregateQuery {
            ttl: Some(MAX_TTL_SECS + 1),
        };
        assert!(query.validate().is_some());
    }

    #[test]
    fn test_validate_empty_key() {
        assert!(validate_key("").is_some());
        assert!(validate_key("   ").is_some());
    }

    #[test]
    fn test_validate_long_key() {
        assert!(validate_key(&"x".repeat(MAX_KEY_LENGTH + 1)).is_some());
        assert!(validate_key(&"x".repeat(MAX_KEY_LENGTH)).is_none());
    }
}
