use std::fmt;
use std::time::Duration;

pub type AccessToken = String;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum TokenType {
    #[default]
    Bearer,
    Other(String),
}

impl From<&str> for TokenType {
    fn from(value: &str) -> Self {
        if value.eq_ignore_ascii_case("bearer") {
            TokenType::Bearer
        } else {
            TokenType::Other(value.to_owned())
        }
    }
}

/// Access token granted by the token endpoint.
///
/// It is meant to be sent as `Authorization: Bearer <access_token>` to the content API.
/// Tokens are neither cached nor refreshed: `expires_in` is informational only.
#[derive(Clone, PartialEq)]
pub struct Token {
    access_token: AccessToken,
    token_type: TokenType,
    expires_in: Option<Duration>,
}

impl Token {
    pub fn new(
        access_token: AccessToken,
        token_type: TokenType,
        expires_in: Option<Duration>,
    ) -> Self {
        Self {
            access_token,
            token_type,
            expires_in,
        }
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn token_type(&self) -> &TokenType {
        &self.token_type
    }

    /// Lifetime granted by the endpoint at issuance, when reported.
    pub fn expires_in(&self) -> Option<Duration> {
        self.expires_in
    }

    pub fn into_access_token(self) -> AccessToken {
        self.access_token
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("access_token", &"<redacted>")
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_type_from_str() {
        assert_eq!(TokenType::from("bearer"), TokenType::Bearer);
        assert_eq!(TokenType::from("Bearer"), TokenType::Bearer);
        assert_eq!(TokenType::from("mac"), TokenType::Other("mac".to_owned()));
    }

    #[test]
    fn debug_redacts_access_token() {
        let token = Token::new(
            "tok1".to_owned(),
            TokenType::Bearer,
            Some(Duration::from_secs(3600)),
        );
        let output = format!("{token:?}");
        assert!(!output.contains("tok1"));
        assert!(output.contains("<redacted>"));
    }
}
