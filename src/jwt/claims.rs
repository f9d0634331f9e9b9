use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::JwtEncoderError;

/// Seconds an assertion stays valid after being issued.
pub const ASSERTION_LIFETIME_SECONDS: u64 = 30;

/// Number of random bytes backing each JWT ID.
const JTI_RANDOM_BYTES: usize = 64;

/// Kind of identity the assertion is requesting a token for (`box_sub_type` claim).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubjectType {
    Enterprise,
    User,
}

impl fmt::Display for SubjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubjectType::Enterprise => write!(f, "enterprise"),
            SubjectType::User => write!(f, "user"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssertionClaims {
    /// Issuer: client ID of the app.
    pub(crate) iss: String,
    /// Subject: enterprise ID or app user ID.
    pub(crate) sub: String,
    /// Whether `sub` is an enterprise or a user.
    pub(crate) box_sub_type: SubjectType,
    /// Audience: the token endpoint URL.
    pub(crate) aud: String,
    /// JWT ID. Random, never reused.
    pub(crate) jti: String,
    /// Issued at (as UTC timestamp in seconds).
    pub(crate) iat: u64,
    /// Expiration time (as UTC timestamp in seconds).
    pub(crate) exp: u64,
}

impl AssertionClaims {
    /// Claims for `subject` issued at `issued_at`, expiring [ASSERTION_LIFETIME_SECONDS] later
    /// and carrying a freshly generated JWT ID.
    pub fn try_new(
        subject: String,
        subject_type: SubjectType,
        issued_at: u64,
    ) -> Result<Self, JwtEncoderError> {
        Ok(Self {
            iss: String::new(),
            sub: subject,
            box_sub_type: subject_type,
            aud: String::new(),
            jti: jti()?,
            iat: issued_at,
            exp: issued_at + ASSERTION_LIFETIME_SECONDS,
        })
    }

    /// Set the issuer
    pub fn with_issuer(self, iss: String) -> Self {
        Self { iss, ..self }
    }

    /// Set the audience
    pub fn with_audience(self, aud: String) -> Self {
        Self { aud, ..self }
    }

    pub fn subject(&self) -> &str {
        &self.sub
    }

    pub fn subject_type(&self) -> SubjectType {
        self.box_sub_type
    }

    pub fn issuer(&self) -> &str {
        &self.iss
    }

    pub fn audience(&self) -> &str {
        &self.aud
    }

    pub fn jwt_id(&self) -> &str {
        &self.jti
    }

    pub fn issued_at(&self) -> u64 {
        self.iat
    }

    pub fn expires_at(&self) -> u64 {
        self.exp
    }
}

/// Base64 encoding of [JTI_RANDOM_BYTES] bytes from a CSPRNG.
fn jti() -> Result<String, JwtEncoderError> {
    let mut buf = [0u8; JTI_RANDOM_BYTES];
    openssl::rand::rand_bytes(&mut buf)
        .map_err(|e| JwtEncoderError::RandomGeneration(e.to_string()))?;
    Ok(STANDARD.encode(buf))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expiration_is_thirty_seconds_after_issue() {
        for issued_at in [0, 1, 1_700_000_000, 4_102_444_800] {
            let claims =
                AssertionClaims::try_new("123".to_owned(), SubjectType::Enterprise, issued_at)
                    .unwrap();
            assert_eq!(claims.issued_at(), issued_at);
            assert_eq!(claims.expires_at() - claims.issued_at(), 30);
        }
    }

    #[test]
    fn jwt_id_is_base64_of_64_random_bytes() {
        let claims =
            AssertionClaims::try_new("u42".to_owned(), SubjectType::User, 1_700_000_000).unwrap();
        let decoded = STANDARD.decode(claims.jwt_id()).unwrap();
        assert_eq!(decoded.len(), 64);
        assert_eq!(claims.jwt_id().len(), 88);
    }

    #[test]
    fn consecutive_claims_have_distinct_jwt_ids() {
        let first =
            AssertionClaims::try_new("123".to_owned(), SubjectType::Enterprise, 1).unwrap();
        let second =
            AssertionClaims::try_new("123".to_owned(), SubjectType::Enterprise, 1).unwrap();
        assert_ne!(first.jwt_id(), second.jwt_id());
    }

    #[test]
    fn serialized_claim_names() {
        let claims = AssertionClaims::try_new("123".to_owned(), SubjectType::Enterprise, 10)
            .unwrap()
            .with_issuer("abc".to_owned())
            .with_audience("https://api.box.com/oauth2/token".to_owned());

        let value = serde_json::to_value(&claims).unwrap();
        assert_eq!(value["iss"], "abc");
        assert_eq!(value["sub"], "123");
        assert_eq!(value["box_sub_type"], "enterprise");
        assert_eq!(value["aud"], "https://api.box.com/oauth2/token");
        assert_eq!(value["jti"], claims.jwt_id());
        assert_eq!(value["iat"], 10);
        assert_eq!(value["exp"], 40);
    }

    #[test]
    fn subject_type_display() {
        assert_eq!(SubjectType::Enterprise.to_string(), "enterprise");
        assert_eq!(SubjectType::User.to_string(), "user");
    }
}
