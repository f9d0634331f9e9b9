//! # Reqwest blocking implementation of [HttpClient]
use super::config::HttpConfig;
use crate::http_client::{HttpClient, HttpClientError};
use http::{Request, Response};
use reqwest::blocking::Client;
use tracing::debug;

pub struct ReqwestHttpClient {
    client: Client,
}

impl ReqwestHttpClient {
    /// Builds the underlying reqwest client with the provided timeouts.
    pub fn try_new(config: HttpConfig) -> Result<Self, HttpClientError> {
        let client = Client::builder()
            .use_rustls_tls()
            .timeout(config.timeout)
            .connect_timeout(config.conn_timeout)
            .build()
            .map_err(|err| HttpClientError::BuildingError(err.to_string()))?;
        Ok(Self { client })
    }
}

impl HttpClient for ReqwestHttpClient {
    fn send(&self, request: Request<Vec<u8>>) -> Result<Response<Vec<u8>>, HttpClientError> {
        let (parts, body) = request.into_parts();
        // Query strings may carry user ids, only the path is worth recording.
        debug!(method = %parts.method, path = parts.uri.path(), "sending request");

        let res = self
            .client
            .request(parts.method, parts.uri.to_string())
            .headers(parts.headers)
            .body(body)
            .send()
            .map_err(|err| HttpClientError::TransportError(err.to_string()))?;

        debug!(status = res.status().as_u16(), "response received");
        try_build_response(res)
    }
}

/// Helper to build a [http::Response<Vec<u8>>] from a reqwest's blocking response.
/// It includes status, version, headers and body.
fn try_build_response(
    res: reqwest::blocking::Response,
) -> Result<Response<Vec<u8>>, HttpClientError> {
    let mut builder = Response::builder()
        .status(res.status())
        .version(res.version());
    if let Some(headers) = builder.headers_mut() {
        headers.extend(res.headers().clone());
    }
    let body: Vec<u8> = res
        .bytes()
        .map_err(|err| HttpClientError::InvalidResponse(err.to_string()))?
        .into();
    builder
        .body(body)
        .map_err(|err| HttpClientError::InvalidResponse(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use http::{Method, StatusCode};
    use httpmock::MockServer;
    use std::time::Duration;

    #[test]
    fn send_returns_status_headers_and_body() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(httpmock::Method::POST)
                .path("/echo")
                .header("x-test", "value")
                .body("ping");
            then.status(201).header("x-reply", "yes").body("pong");
        });

        let client = ReqwestHttpClient::try_new(HttpConfig::default()).unwrap();
        let request = Request::builder()
            .method(Method::POST)
            .uri(server.url("/echo"))
            .header("x-test", "value")
            .body(b"ping".to_vec())
            .unwrap();

        let res = client.send(request).unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
        assert_eq!(res.headers().get("x-reply").unwrap(), "yes");
        assert_eq!(res.body(), b"pong");
        mock.assert();
    }

    #[test]
    fn unsuccessful_status_is_not_an_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.any_request();
            then.status(500).body("boom");
        });

        let client = ReqwestHttpClient::try_new(HttpConfig::default()).unwrap();
        let request = Request::builder()
            .uri(server.url("/"))
            .body(Vec::new())
            .unwrap();

        let res = client.send(request).unwrap();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(res.body(), b"boom");
    }

    #[test]
    fn unreachable_server_is_a_transport_error() {
        let config = HttpConfig::new(Duration::from_secs(1), Duration::from_secs(1));
        let client = ReqwestHttpClient::try_new(config).unwrap();
        // Port 9 (discard) is not expected to be listening locally
        let request = Request::builder()
            .uri("http://127.0.0.1:9/")
            .body(Vec::new())
            .unwrap();

        let err = client.send(request).unwrap_err();
        assert_matches!(err, HttpClientError::TransportError(_));
    }
}
