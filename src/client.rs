//! # JWT Auth Client
//!
//! Entry point of the crate. Mints enterprise and user tokens through the JWT-bearer grant and
//! provisions app users with an enterprise token.
//!
//! Nothing is cached: every token request signs a new assertion and performs a full round trip
//! to the token endpoint. The client holds no mutable state, so a failed call leaves it ready
//! for the next one.
use crate::authenticator::{AuthExchangeError, Authenticator, HttpAuthenticator, TokenRequest};
use crate::config::{AuthConfig, AuthConfigError, AuthConfigLoadKeyError};
use crate::http::reqwest::ReqwestHttpClient;
use crate::http_client::{HttpClient, HttpClientError};
use crate::jwt::claims::{AssertionClaims, SubjectType};
use crate::jwt::signer::local::LocalPrivateKeySigner;
use crate::jwt::signer::JwtSigner;
use crate::provisioning::{AppUser, AppUserProvisioner, ProvisioningError};
use crate::token::Token;
use crate::{ClientID, ClientSecret, EnterpriseID, UserID};
use jsonwebtoken::get_current_timestamp;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;
use url::Url;

#[derive(Error, Debug)]
pub enum JwtAuthClientBuildError {
    #[error("invalid configuration: `{0}`")]
    Config(#[from] AuthConfigError),
    #[error("unable to load the private key: `{0}`")]
    Key(#[from] AuthConfigLoadKeyError),
    #[error("building http client: `{0}`")]
    HttpClient(#[from] HttpClientError),
}

/// Identity of the app and endpoints it talks to.
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub enterprise_id: EnterpriseID,
    pub client_id: ClientID,
    pub client_secret: ClientSecret,
    pub token_url: Url,
    pub users_url: Url,
}

impl TryFrom<&AuthConfig> for ClientSettings {
    type Error = AuthConfigError;

    fn try_from(config: &AuthConfig) -> Result<Self, Self::Error> {
        Ok(Self {
            enterprise_id: config.enterprise_id.clone(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            token_url: config.token_url()?,
            users_url: config.users_url()?,
        })
    }
}

pub struct JwtAuthClient<C, S = LocalPrivateKeySigner>
where
    C: HttpClient,
    S: JwtSigner,
{
    enterprise_id: EnterpriseID,
    client_id: ClientID,
    client_secret: ClientSecret,
    signer: S,
    authenticator: HttpAuthenticator<Arc<C>>,
    provisioner: AppUserProvisioner<Arc<C>>,
}

impl JwtAuthClient<ReqwestHttpClient> {
    /// Decrypts the private key and sets up the HTTP client described by `config`.
    pub fn try_new(config: AuthConfig) -> Result<Self, JwtAuthClientBuildError> {
        let settings = ClientSettings::try_from(&config)?;
        let signer = LocalPrivateKeySigner::new(config.signing_identity()?)
            .with_key_id(config.public_key_id.clone());
        let http_client = ReqwestHttpClient::try_new(config.http_config())?;

        Ok(Self::new(settings, signer, http_client))
    }
}

impl<C, S> JwtAuthClient<C, S>
where
    C: HttpClient,
    S: JwtSigner,
{
    pub fn new(settings: ClientSettings, signer: S, http_client: C) -> Self {
        let http_client = Arc::new(http_client);
        Self {
            enterprise_id: settings.enterprise_id,
            client_id: settings.client_id,
            client_secret: settings.client_secret,
            signer,
            authenticator: HttpAuthenticator::new(http_client.clone(), settings.token_url),
            provisioner: AppUserProvisioner::new(http_client, settings.users_url),
        }
    }

    /// Token acting as the enterprise service account.
    pub fn get_enterprise_token(&self) -> Result<Token, AuthExchangeError> {
        self.exchange(&self.enterprise_id, SubjectType::Enterprise)
    }

    /// Token acting as the app user `user_id`.
    pub fn get_user_token(&self, user_id: &str) -> Result<Token, AuthExchangeError> {
        self.exchange(user_id, SubjectType::User)
    }

    /// Creates a platform-only app user named `name`, returning its id.
    pub fn create_app_user(
        &self,
        name: &str,
        enterprise_token: &str,
    ) -> Result<UserID, ProvisioningError> {
        Ok(self.create_app_user_details(name, enterprise_token)?.id().to_owned())
    }

    /// Same as [JwtAuthClient::create_app_user] but returns the whole user.
    pub fn create_app_user_details(
        &self,
        name: &str,
        enterprise_token: &str,
    ) -> Result<AppUser, ProvisioningError> {
        self.provisioner.create(name, enterprise_token)
    }

    /// Deletes the app user. With `force` the user is removed even if it still owns content.
    pub fn delete_app_user(
        &self,
        user_id: &str,
        enterprise_token: &str,
        force: bool,
    ) -> Result<(), ProvisioningError> {
        self.provisioner.delete(user_id, enterprise_token, force)
    }

    /// [JwtAuthClient::delete_app_user] with `force` set.
    pub fn delete_app_user_forced(
        &self,
        user_id: &str,
        enterprise_token: &str,
    ) -> Result<(), ProvisioningError> {
        self.delete_app_user(user_id, enterprise_token, true)
    }

    fn exchange(&self, subject: &str, subject_type: SubjectType) -> Result<Token, AuthExchangeError> {
        let claims =
            AssertionClaims::try_new(subject.to_owned(), subject_type, get_current_timestamp())?
                .with_issuer(self.client_id.clone())
                .with_audience(self.authenticator.token_url().to_string());

        let signed_jwt = self.signer.sign(claims)?;
        debug!(%subject_type, expires_at = %signed_jwt.expires_at(), "assertion signed");

        let request = TokenRequest::new(&self.client_id, &self.client_secret, signed_jwt.value());
        let response = self.authenticator.authenticate(request)?;

        Ok(response.into())
    }
}
