//! Shared API token
//!
//! The trigger gateway and the notification endpoint both authenticate with a
//! single pre-shared secret sent as `Authorization: Bearer <token>`.

use serde::Deserialize;
use std::fmt;

/// Pre-shared API token. `Debug` never prints the secret.
#[derive(Clone, Deserialize)]
#[serde(transparent)]
pub struct ApiToken(String);

impl ApiToken {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Compare a presented token in constant time
    #[must_use]
    pub fn matches(&self, presented: &str) -> bool {
        constant_time_eq(self.0.as_bytes(), presented.as_bytes())
    }

    /// Header value to send to a peer
    #[must_use]
    pub fn bearer_header(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiToken(***)")
    }
}

/// Check an `Authorization` header value against the expected token
pub fn bearer_matches(header: Option<&str>, expected: &ApiToken) -> bool {
    header
        .and_then(|value| value.strip_prefix("Bearer "))
        .is_some_and(|presented| expected.matches(presented))
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches() {
        let token = ApiToken::new("s3cret");
        assert!(token.matches("s3cret"));
        assert!(!token.matches("s3cre"));
        assert!(!token.matches("S3cret"));
        assert!(!token.matches(""));
    }

    #[test]
    fn test_bearer_matches() {
        let token = ApiToken::new("s3cret");
        assert!(bearer_matches(Some("Bearer s3cret"), &token));
        assert!(!bearer_matches(Some("Basic s3cret"), &token));
        assert!(!bearer_matches(Some("s3cret"), &token));
        assert!(!bearer_matches(Some("Bearer  s3cret "), &token));
        assert!(!bearer_matches(Some("Bearer s3cret "), &token));
        assert!(!bearer_matches(None, &token));
    }

    #[test]
    fn test_debug_redacts() {
        let token = ApiToken::new("s3cret");
        assert_eq!(format!("{token:?}"), "ApiToken(***)");
        assert_eq!(token.bearer_header(), "Bearer s3cret");
    }
}
