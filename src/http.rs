//! # Blocking HTTP transport backing [crate::http_client::HttpClient]
pub mod config;
pub mod reqwest;
