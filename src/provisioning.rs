//! # App user provisioning
//!
//! Create and delete the platform-only users that user tokens are minted for. Every request
//! is authorized with an enterprise token.
use crate::http_client::{bearer_header, body_snippet, HttpClient, HttpClientError};
use crate::UserID;
use http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use http::{Method, Request, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum ProvisioningError {
    #[error("http client error: `{0}`")]
    HttpClient(#[from] HttpClientError),
    #[error("unable to build the provisioning request: `{0}`")]
    InvalidRequest(String),
    #[error("users endpoint responded with status `{status}`: `{body}`")]
    UnsuccessfulResponse { status: u16, body: String },
    #[error("unable to deserialize user response: `{0}`")]
    Deserialize(String),
    #[error("user response does not contain an id")]
    MissingId,
}

#[derive(Serialize)]
struct CreateAppUserRequest<'a> {
    name: &'a str,
    is_platform_access_only: bool,
}

/// User returned by the users endpoint. Only `id` is guaranteed to be present.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AppUser {
    #[serde(default)]
    id: UserID,
    name: Option<String>,
    login: Option<String>,
    status: Option<String>,
}

impl AppUser {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn login(&self) -> Option<&str> {
        self.login.as_deref()
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }
}

/// Issues provisioning requests against `{api_url}/users`.
pub struct AppUserProvisioner<C>
where
    C: HttpClient,
{
    http_client: C,
    users_url: Url,
}

impl<C> AppUserProvisioner<C>
where
    C: HttpClient,
{
    pub fn new(http_client: C, users_url: Url) -> Self {
        Self {
            http_client,
            users_url,
        }
    }

    /// `POST /users` with `is_platform_access_only` set.
    pub fn create(&self, name: &str, enterprise_token: &str) -> Result<AppUser, ProvisioningError> {
        let body = serde_json::to_vec(&CreateAppUserRequest {
            name,
            is_platform_access_only: true,
        })
        .map_err(|e| ProvisioningError::InvalidRequest(e.to_string()))?;

        let request = Request::builder()
            .method(Method::POST)
            .uri(self.users_url.as_str())
            .header(AUTHORIZATION, authorization(enterprise_token)?)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .body(body)
            .map_err(|e| ProvisioningError::InvalidRequest(e.to_string()))?;

        let response = successful(self.http_client.send(request)?)?;

        let app_user: AppUser = serde_json::from_slice(response.body())
            .map_err(|e| ProvisioningError::Deserialize(e.to_string()))?;
        if app_user.id.is_empty() {
            return Err(ProvisioningError::MissingId);
        }
        Ok(app_user)
    }

    /// `DELETE /users/{user_id}?force={force}`. Any non-2xx status is reported as an error.
    pub fn delete(
        &self,
        user_id: &str,
        enterprise_token: &str,
        force: bool,
    ) -> Result<(), ProvisioningError> {
        let url = self.user_url(user_id, force)?;

        let request = Request::builder()
            .method(Method::DELETE)
            .uri(url.as_str())
            .header(AUTHORIZATION, authorization(enterprise_token)?)
            .body(Vec::new())
            .map_err(|e| ProvisioningError::InvalidRequest(e.to_string()))?;

        successful(self.http_client.send(request)?)?;
        Ok(())
    }

    fn user_url(&self, user_id: &str, force: bool) -> Result<Url, ProvisioningError> {
        if user_id.is_empty() {
            return Err(ProvisioningError::InvalidRequest(
                "empty user id".to_owned(),
            ));
        }
        let mut url = self.users_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                ProvisioningError::InvalidRequest(format!(
                    "users url `{}` cannot be a base",
                    self.users_url
                ))
            })?
            .pop_if_empty()
            .push(user_id);
        url.query_pairs_mut()
            .append_pair("force", if force { "true" } else { "false" });
        Ok(url)
    }
}

fn authorization(token: &str) -> Result<http::HeaderValue, ProvisioningError> {
    bearer_header(token)
        .map_err(|e| ProvisioningError::InvalidRequest(format!("invalid bearer token: {e}")))
}

fn successful(response: Response<Vec<u8>>) -> Result<Response<Vec<u8>>, ProvisioningError> {
    if response.status().is_success() {
        Ok(response)
    } else {
        Err(ProvisioningError::UnsuccessfulResponse {
            status: response.status().as_u16(),
            body: body_snippet(response.body()),
        })
    }
}
