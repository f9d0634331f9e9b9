use chrono::{DateTime, Utc};

/// Compact JWS ready to be sent as an assertion.
#[derive(Debug, Clone)]
pub struct SignedJwt {
    /// Issue date
    pub(crate) issued_at: DateTime<Utc>,
    /// Expiration date
    pub(crate) expiration_date: DateTime<Utc>,
    /// Encoded value
    pub(crate) value: String,
}

impl SignedJwt {
    /// Get the issue date
    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    /// Get the expiration date
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expiration_date
    }

    /// Get the encoded value
    pub fn value(&self) -> &str {
        &self.value
    }
}
