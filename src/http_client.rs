use http::header::InvalidHeaderValue;
use http::{HeaderValue, Request, Response};
use std::sync::Arc;
use thiserror::Error;

/// Max number of bytes of a response body kept in error messages.
const MAX_BODY_SNIPPET_BYTES: usize = 512;

/// An enumeration of potential errors related to the HTTP client.
#[derive(Error, Debug)]
pub enum HttpClientError {
    /// Represents an error building the HttpClient
    #[error("could not build the HTTP client: `{0}`")]
    BuildingError(String),
    /// Represents HTTP Transport error.
    #[error("transport HTTP client error: `{0}`")]
    TransportError(String),
    /// The response could not be read.
    #[error("invalid HTTP response: `{0}`")]
    InvalidResponse(String),
}

/// The `HttpClient` trait defines the HTTP send interface to be implemented
/// by HTTP clients.
///
/// Any response the server produced is returned as `Ok`, whatever its status code.
pub trait HttpClient {
    /// Returns a `http::Response<Vec<u8>>` structure as the HTTP response or
    /// HttpClientError if an error was found.
    fn send(&self, request: Request<Vec<u8>>) -> Result<Response<Vec<u8>>, HttpClientError>;
}

impl<C> HttpClient for Arc<C>
where
    C: HttpClient + ?Sized,
{
    fn send(&self, request: Request<Vec<u8>>) -> Result<Response<Vec<u8>>, HttpClientError> {
        (**self).send(request)
    }
}

/// Builds the `Authorization` header value for a bearer token, flagged as sensitive.
pub(crate) fn bearer_header(token: &str) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut value = HeaderValue::from_str(&format!("Bearer {token}"))?;
    value.set_sensitive(true);
    Ok(value)
}

/// Lossy text of a response body, truncated so it can be carried in an error.
pub(crate) fn body_snippet(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    if text.len() <= MAX_BODY_SNIPPET_BYTES {
        return text.into_owned();
    }
    let mut end = MAX_BODY_SNIPPET_BYTES;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &text[..end])
}
