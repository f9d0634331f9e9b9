use crate::http_client::{body_snippet, HttpClient, HttpClientError};
use crate::jwt::error::JwtEncoderError;
use crate::token::{Token, TokenType};
use http::header::{ACCEPT, CONTENT_TYPE};
use http::{Method, Request};
use serde::Deserialize;
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use url::{form_urlencoded, Url};

pub const JWT_BEARER_GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

#[derive(Error, Debug)]
pub enum AuthExchangeError {
    #[error("unable to sign the assertion: `{0}`")]
    JwtEncoder(#[from] JwtEncoderError),
    #[error("http client error: `{0}`")]
    HttpClient(#[from] HttpClientError),
    #[error("unable to build the token request: `{0}`")]
    InvalidRequest(String),
    #[error("token endpoint responded with status `{status}`: `{body}`")]
    UnsuccessfulResponse { status: u16, body: String },
    #[error("unable to deserialize token response: `{0}`")]
    Deserialize(String),
    #[error("token response does not contain an access token")]
    MissingAccessToken,
}

/// Authenticator exchanges a signed assertion for an access token
/// POST /oauth2/token
///
/// Response:
/// {
///    "access_token": "<opaque token>",
///    "expires_in": 3600,
///    "restricted_to": [],
///    "token_type": "bearer"
/// }
pub trait Authenticator {
    fn authenticate(&self, req: TokenRequest) -> Result<TokenResponse, AuthExchangeError>;
}

/// Form body of the JWT-bearer grant.
pub struct TokenRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    assertion: &'a str,
}

impl<'a> TokenRequest<'a> {
    pub fn new(client_id: &'a str, client_secret: &'a str, assertion: &'a str) -> Self {
        Self {
            client_id,
            client_secret,
            assertion,
        }
    }

    /// `application/x-www-form-urlencoded` encoding of the request.
    pub fn encode(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .append_pair("grant_type", JWT_BEARER_GRANT_TYPE)
            .append_pair("client_id", self.client_id)
            .append_pair("client_secret", self.client_secret)
            .append_pair("assertion", self.assertion)
            .finish()
    }
}

#[derive(Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    access_token: String,
    expires_in: Option<u64>,
    token_type: Option<String>,
}

impl TokenResponse {
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn expires_in_seconds(&self) -> Option<u64> {
        self.expires_in
    }
}

impl fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenResponse")
            .field("access_token", &"<redacted>")
            .field("expires_in", &self.expires_in)
            .field("token_type", &self.token_type)
            .finish()
    }
}

impl From<TokenResponse> for Token {
    fn from(response: TokenResponse) -> Self {
        Token::new(
            response.access_token,
            response
                .token_type
                .as_deref()
                .map(TokenType::from)
                .unwrap_or_default(),
            response.expires_in.map(Duration::from_secs),
        )
    }
}

pub struct HttpAuthenticator<C>
where
    C: HttpClient,
{
    http_client: C,
    token_url: Url,
}

impl<C> HttpAuthenticator<C>
where
    C: HttpClient,
{
    pub fn new(http_client: C, token_url: Url) -> HttpAuthenticator<C> {
        HttpAuthenticator {
            http_client,
            token_url,
        }
    }

    pub fn token_url(&self) -> &Url {
        &self.token_url
    }
}

impl<C> Authenticator for HttpAuthenticator<C>
where
    C: HttpClient,
{
    fn authenticate(&self, req: TokenRequest) -> Result<TokenResponse, AuthExchangeError> {
        let request = Request::builder()
            .method(Method::POST)
            .uri(self.token_url.as_str())
            .header(CONTENT_TYPE, FORM_URLENCODED)
            .header(ACCEPT, "application/json")
            .body(req.encode().into_bytes())
            .map_err(|e| AuthExchangeError::InvalidRequest(e.to_string()))?;

        let response = self.http_client.send(request)?;

        if !response.status().is_success() {
            return Err(AuthExchangeError::UnsuccessfulResponse {
                status: response.status().as_u16(),
                body: body_snippet(response.body()),
            });
        }

        let token_response: TokenResponse = serde_json::from_slice(response.body())
            .map_err(|e| AuthExchangeError::Deserialize(e.to_string()))?;

        if token_response.access_token.is_empty() {
            return Err(AuthExchangeError::MissingAccessToken);
        }
        Ok(token_response)
    }
}
