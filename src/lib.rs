//! Client for the Box JWT-bearer grant.
//!
//! Builds RS256-signed assertions for an enterprise or an app user, exchanges them for bearer
//! access tokens and provisions the app users those tokens act on behalf of.
pub mod authenticator;
pub mod cli;
pub mod client;
pub mod config;
pub mod http;
pub mod http_client;
pub mod jwt;
pub mod key;
pub mod logging;
pub mod provisioning;
pub mod token;

pub type ClientID = String;
pub type ClientSecret = String;
pub type EnterpriseID = String;
pub type UserID = String;

pub use authenticator::AuthExchangeError;
pub use client::{JwtAuthClient, JwtAuthClientBuildError};
pub use config::AuthConfig;
pub use key::{KeyDecodeError, SigningIdentity};
pub use provisioning::ProvisioningError;
pub use token::Token;
