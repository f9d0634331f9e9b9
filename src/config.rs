use crate::http::config::{HttpConfig, DEFAULT_CLIENT_CONN_TIMEOUT, DEFAULT_CLIENT_TIMEOUT};
use crate::key::{KeyDecodeError, SigningIdentity};
use crate::{ClientID, ClientSecret, EnterpriseID};
use duration_str::deserialize_duration;
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// The endpoint assertions are exchanged at. It is also the audience of every assertion.
pub const BOX_TOKEN_URL: &str = "https://api.box.com/oauth2/token";
/// Base of the content API, users live under `{BOX_API_URL}users`.
pub const BOX_API_URL: &str = "https://api.box.com/2.0/";

#[derive(Error, Debug)]
pub enum AuthConfigError {
    #[error("error loading config: `{0}`")]
    IOError(#[from] std::io::Error),
    #[error("error loading config: `{0}`")]
    SerdeYamlError(#[from] serde_yaml::Error),
    #[error("either `private_key` or `private_key_path` must be set")]
    MissingPrivateKey,
    #[error("invalid url `{url}`: `{err}`")]
    InvalidUrl { url: String, err: String },
}

/// Credentials and endpoints of a Box app using server authentication with JWT.
#[derive(Deserialize, PartialEq, Clone)]
pub struct AuthConfig {
    pub client_id: ClientID,
    pub client_secret: ClientSecret,
    pub enterprise_id: EnterpriseID,
    /// Inline PEM private key. Takes precedence over `private_key_path`.
    #[serde(default)]
    pub private_key: Option<String>,
    /// Path to the PEM private key.
    #[serde(default)]
    pub private_key_path: Option<PathBuf>,
    pub private_key_passphrase: String,
    /// ID of the public key registered for the app, sent as the `kid` header.
    #[serde(default)]
    pub public_key_id: Option<String>,
    #[serde(default)]
    pub token_url: Option<Url>,
    #[serde(default)]
    pub api_url: Option<Url>,
    #[serde(default)]
    pub timeout: RequestTimeout,
    #[serde(default)]
    pub connect_timeout: ConnectTimeout,
}

impl AuthConfig {
    /// Loads the configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Self, AuthConfigError> {
        let f = std::fs::File::open(path)?;
        Ok(serde_yaml::from_reader(f)?)
    }

    pub fn parse(content: &str) -> Result<Self, AuthConfigError> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Decrypts the configured private key.
    pub fn signing_identity(&self) -> Result<SigningIdentity, AuthConfigLoadKeyError> {
        let passphrase = self.private_key_passphrase.as_bytes();
        match (&self.private_key, &self.private_key_path) {
            (Some(pem), _) => Ok(SigningIdentity::try_from_encrypted_pem(
                pem.as_bytes(),
                passphrase,
            )?),
            (None, Some(path)) => Ok(SigningIdentity::try_from_encrypted_pem_file(
                path, passphrase,
            )?),
            (None, None) => Err(AuthConfigError::MissingPrivateKey.into()),
        }
    }

    pub fn token_url(&self) -> Result<Url, AuthConfigError> {
        match &self.token_url {
            Some(url) => Ok(url.clone()),
            None => parse_url(BOX_TOKEN_URL),
        }
    }

    /// Users endpoint, relative to `api_url`.
    pub fn users_url(&self) -> Result<Url, AuthConfigError> {
        let api_url = match &self.api_url {
            Some(url) => with_trailing_slash(url.clone()),
            None => parse_url(BOX_API_URL)?,
        };
        api_url
            .join("users")
            .map_err(|err| AuthConfigError::InvalidUrl {
                url: api_url.to_string(),
                err: err.to_string(),
            })
    }

    pub fn http_config(&self) -> HttpConfig {
        HttpConfig::new(self.timeout.into(), self.connect_timeout.into())
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("enterprise_id", &self.enterprise_id)
            .field("private_key", &self.private_key.as_ref().map(|_| "<redacted>"))
            .field("private_key_path", &self.private_key_path)
            .field("private_key_passphrase", &"<redacted>")
            .field("public_key_id", &self.public_key_id)
            .field("token_url", &self.token_url)
            .field("api_url", &self.api_url)
            .field("timeout", &self.timeout)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

/// Failure to obtain the signing key out of an [AuthConfig].
#[derive(Error, Debug)]
pub enum AuthConfigLoadKeyError {
    #[error("{0}")]
    Config(#[from] AuthConfigError),
    #[error("{0}")]
    KeyDecode(#[from] KeyDecodeError),
}

#[derive(Debug, Clone, Deserialize, Copy, PartialEq)]
pub struct RequestTimeout(#[serde(deserialize_with = "deserialize_duration")] Duration);

impl From<RequestTimeout> for Duration {
    fn from(value: RequestTimeout) -> Self {
        value.0
    }
}
impl From<Duration> for RequestTimeout {
    fn from(value: Duration) -> Self {
        Self(value)
    }
}

impl Default for RequestTimeout {
    fn default() -> Self {
        Self(DEFAULT_CLIENT_TIMEOUT)
    }
}

#[derive(Debug, Clone, Deserialize, Copy, PartialEq)]
pub struct ConnectTimeout(#[serde(deserialize_with = "deserialize_duration")] Duration);

impl From<ConnectTimeout> for Duration {
    fn from(value: ConnectTimeout) -> Self {
        value.0
    }
}
impl From<Duration> for ConnectTimeout {
    fn from(value: Duration) -> Self {
        Self(value)
    }
}

impl Default for ConnectTimeout {
    fn default() -> Self {
        Self(DEFAULT_CLIENT_CONN_TIMEOUT)
    }
}

fn parse_url(url: &str) -> Result<Url, AuthConfigError> {
    Url::parse(url).map_err(|err| AuthConfigError::InvalidUrl {
        url: url.to_owned(),
        err: err.to_string(),
    })
}

/// `Url::join` replaces the last segment unless the base ends with `/`.
fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}
