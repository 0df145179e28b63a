//! HTTP client initialization.

use reqwest::ClientBuilder;

use crate::config::Config;

/// Initializes the HTTP client used for index submissions.
///
/// Creates a `reqwest::Client` configured with:
/// - Request timeout from `--request-timeout-secs`
/// - A crate-specific User-Agent
/// - Rustls TLS backend (no native TLS)
///
/// `reqwest::Client` is reference-counted internally, so the returned value
/// is cloned into each sink rather than wrapped in an `Arc`.
///
/// # Errors
///
/// Returns a `reqwest::Error` if client creation fails.
pub fn init_client(config: &Config) -> Result<reqwest::Client, reqwest::Error> {
    ClientBuilder::new()
        .timeout(config.request_timeout())
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
}
