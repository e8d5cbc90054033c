use std::fmt;

/// `IdempotencyToken` lets the receiving service drop repeated deliveries
/// of the same logical request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IdempotencyToken(String);

impl IdempotencyToken {
    /// A token for a brand new request.
    pub fn fresh() -> IdempotencyToken {
        IdempotencyToken(uuid::Uuid::new_v4().to_string())
    }

    /// A token derived from an object's content fingerprint (its ETag),
    /// so that redelivered events map to the same token.
    pub fn from_fingerprint(etag: &str) -> IdempotencyToken {
        IdempotencyToken(etag.trim_matches('"').to_string())
    }

    /// Borrow the raw token value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdempotencyToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
