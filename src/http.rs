//! HTTP client utilities for talking to the course API.
//!
//! This module provides reusable HTTP client construction, request
//! building and error-response handling shared by every endpoint.

use reqwest::{Client, RequestBuilder, StatusCode};
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::client::{ClientError, DEFAULT_ERROR_MESSAGE};
use crate::credentials::Credentials;
use crate::model::ApiErrorBody;
use crate::options::ClientOptions;

/// Build a configured HTTP client from client options.
///
/// This applies common configuration like timeouts and proxies.
///
/// # Example
/// ```ignore
/// let client = build_http_client(&options)?;
/// ```
pub fn build_http_client(options: &ClientOptions) -> Result<Client, reqwest::Error> {
    let mut builder = Client::builder();

    if let Some(timeout) = options.timeout {
        builder = builder.timeout(timeout);
    }

    if let Some(proxy_url) = &options.proxy {
        match reqwest::Proxy::all(proxy_url) {
            Ok(proxy) => builder = builder.proxy(proxy),
            Err(e) => warn!("Ignoring invalid proxy {}: {}", proxy_url, e),
        }
    }

    builder.build()
}

/// Add extra headers to a request if specified in client options.
pub fn add_extra_headers(
    mut request: RequestBuilder,
    extra_headers: &Option<HashMap<String, String>>,
) -> RequestBuilder {
    if let Some(headers) = extra_headers {
        for (key, value) in headers {
            request = request.header(key, value);
        }
    }
    request
}

/// Attach the bearer token from `credentials`, if any.
pub fn authorize(request: RequestBuilder, credentials: &Credentials) -> RequestBuilder {
    match credentials.bearer() {
        Some(value) => request.header(reqwest::header::AUTHORIZATION, value),
        None => request,
    }
}

/// Turn a non-OK response into a [`ClientError`].
///
/// The body is read exactly once as an [`ApiErrorBody`]. When the effective
/// status (the body's `status`, else the HTTP status) is 401 the credentials
/// are logged out before returning [`ClientError::Unauthorized`].
pub async fn error_from_response(
    response: reqwest::Response,
    credentials: &Credentials,
) -> ClientError {
    let http_status = response.status();
    let body = response.text().await.unwrap_or_default();
    let parsed: ApiErrorBody = serde_json::from_str(&body).unwrap_or_default();

    let status = parsed.status.unwrap_or(http_status.as_u16());
    let message = parsed
        .message
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| DEFAULT_ERROR_MESSAGE.to_string());

    debug!("API error: HTTP {} (reported status {}): {}", http_status, status, message);

    if status == StatusCode::UNAUTHORIZED.as_u16() {
        warn!("Auth token rejected, logging out");
        credentials.logout();
        return ClientError::Unauthorized { message };
    }

    ClientError::Api { status, message }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_build_http_client() {
        let options = ClientOptions::new("http://localhost").with_timeout(Duration::from_secs(30));

        let client = build_http_client(&options);
        assert!(client.is_ok());
    }

    #[test]
    fn test_build_http_client_with_proxy() {
        let options = ClientOptions::new("http://localhost")
            .with_proxy("http://proxy.example.com:8080".to_string());

        let client = build_http_client(&options);
        assert!(client.is_ok());
    }
}
