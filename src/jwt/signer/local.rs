use chrono::{offset::LocalResult, DateTime, TimeZone, Utc};
use jsonwebtoken::Header;

use crate::jwt::{claims::AssertionClaims, error::JwtEncoderError, signed::SignedJwt};
use crate::key::SigningIdentity;

use super::JwtSigner;

/// Signs assertions in-process with the app private key.
#[derive(Debug)]
pub struct LocalPrivateKeySigner {
    identity: SigningIdentity,
    /// ID of the public key registered in the app, sent as `kid`.
    key_id: Option<String>,
}

impl LocalPrivateKeySigner {
    pub fn new(identity: SigningIdentity) -> Self {
        Self {
            identity,
            key_id: None,
        }
    }

    pub fn with_key_id(self, key_id: Option<String>) -> Self {
        Self { key_id, ..self }
    }
}

impl From<SigningIdentity> for LocalPrivateKeySigner {
    fn from(identity: SigningIdentity) -> Self {
        Self::new(identity)
    }
}

impl JwtSigner for LocalPrivateKeySigner {
    fn sign(&self, claims: AssertionClaims) -> Result<SignedJwt, JwtEncoderError> {
        let issued_at = timestamp_to_date(claims.iat)?;
        let expiration_date = timestamp_to_date(claims.exp)?;

        let mut header = Header::new(self.identity.algorithm());
        header.kid.clone_from(&self.key_id);

        let value = jsonwebtoken::encode(&header, &claims, self.identity.encoding_key())?;
        Ok(SignedJwt {
            issued_at,
            expiration_date,
            value,
        })
    }
}

fn timestamp_to_date(timestamp: u64) -> Result<DateTime<Utc>, JwtEncoderError> {
    let seconds = i64::try_from(timestamp)
        .map_err(|_| JwtEncoderError::InvalidTimestamp(format!("{timestamp} is out of range")))?;
    match Utc.timestamp_opt(seconds, 0) {
        LocalResult::Single(date) => Ok(date),
        // UTC has no transitions, so anything else means the value is not representable
        LocalResult::Ambiguous(earliest, latest) => Err(JwtEncoderError::InvalidTimestamp(
            format!("ambiguous timestamp. Earliest: {earliest}, Latest: {latest}"),
        )),
        LocalResult::None => Err(JwtEncoderError::InvalidTimestamp(format!(
            "invalid timestamp was provided: {timestamp}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jwt::claims::{SubjectType, ASSERTION_LIFETIME_SECONDS};
    use crate::key::tests::{test_identity, RSA_PUBLIC_KEY};
    use assert_matches::assert_matches;
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
    use jsonwebtoken::{
        decode, decode_header, errors::ErrorKind, get_current_timestamp, Algorithm, DecodingKey,
        Validation,
    };

    const TOKEN_URL: &str = "https://api.box.com/oauth2/token";

    fn claims(subject: &str, subject_type: SubjectType) -> AssertionClaims {
        AssertionClaims::try_new(subject.to_owned(), subject_type, get_current_timestamp())
            .unwrap()
            .with_issuer("abc".to_owned())
            .with_audience(TOKEN_URL.to_owned())
    }

    fn validation() -> Validation {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[TOKEN_URL]);
        validation.set_issuer(&["abc"]);
        validation.set_required_spec_claims(&["exp", "sub", "aud", "iss"]);
        validation
    }

    fn decoding_key() -> DecodingKey {
        DecodingKey::from_rsa_pem(RSA_PUBLIC_KEY.as_bytes()).unwrap()
    }

    #[test]
    fn signed_assertion_verifies_with_public_key() {
        let signer = LocalPrivateKeySigner::new(test_identity());
        let claims = claims("123", SubjectType::Enterprise);

        let signed = signer.sign(claims.clone()).unwrap();
        assert_eq!(signed.value().split('.').count(), 3);

        let decoded = decode::<AssertionClaims>(signed.value(), &decoding_key(), &validation())
            .unwrap();
        assert_eq!(decoded.header.alg, Algorithm::RS256);
        assert_eq!(decoded.header.typ.as_deref(), Some("JWT"));
        assert_eq!(decoded.header.kid, None);
        assert_eq!(decoded.claims, claims);
    }

    #[test]
    fn signed_dates_match_claims() {
        let signer = LocalPrivateKeySigner::new(test_identity());
        let claims = claims("u42", SubjectType::User);
        let issued_at = claims.issued_at();

        let signed = signer.sign(claims).unwrap();
        assert_eq!(signed.issued_at().timestamp() as u64, issued_at);
        assert_eq!(
            (signed.expires_at() - signed.issued_at()).num_seconds() as u64,
            ASSERTION_LIFETIME_SECONDS
        );
    }

    #[test]
    fn key_id_is_set_in_header() {
        let signer = LocalPrivateKeySigner::new(test_identity()).with_key_id(Some("kid-1".into()));

        let signed = signer.sign(claims("123", SubjectType::Enterprise)).unwrap();
        let header = decode_header(signed.value()).unwrap();
        assert_eq!(header.kid.as_deref(), Some("kid-1"));
    }

    #[test]
    fn altered_payload_fails_verification() {
        let signer = LocalPrivateKeySigner::new(test_identity());
        let signed = signer.sign(claims("123", SubjectType::Enterprise)).unwrap();

        let parts: Vec<&str> = signed.value().split('.').collect();
        let mut payload: serde_json::Value =
            serde_json::from_slice(&URL_SAFE_NO_PAD.decode(parts[1]).unwrap()).unwrap();
        payload["sub"] = serde_json::Value::String("124".to_owned());
        let tampered_payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&payload).unwrap());
        let tampered = format!("{}.{}.{}", parts[0], tampered_payload, parts[2]);

        let err = decode::<AssertionClaims>(&tampered, &decoding_key(), &validation()).unwrap_err();
        assert_matches!(err.kind(), ErrorKind::InvalidSignature);
    }

    #[test]
    fn consecutive_assertions_share_issuer_audience_and_algorithm() {
        let signer = LocalPrivateKeySigner::new(test_identity());

        let first = signer.sign(claims("u42", SubjectType::User)).unwrap();
        let second = signer.sign(claims("u42", SubjectType::User)).unwrap();

        let first = decode::<AssertionClaims>(first.value(), &decoding_key(), &validation())
            .unwrap();
        let second = decode::<AssertionClaims>(second.value(), &decoding_key(), &validation())
            .unwrap();

        assert_ne!(first.claims.jwt_id(), second.claims.jwt_id());
        assert_eq!(first.claims.issuer(), second.claims.issuer());
        assert_eq!(first.claims.audience(), second.claims.audience());
        assert_eq!(first.header.alg, second.header.alg);
    }

    #[test]
    fn out_of_range_timestamp() {
        let err = timestamp_to_date(u64::MAX).unwrap_err();
        assert_matches!(err, JwtEncoderError::InvalidTimestamp(_));
    }
}
