//! HTTP utilities for ONTAP REST API calls

use super::auth::Credentials;
use super::query::Query;
use anyhow::{Context, Result};
use reqwest::{Client, Method};
use serde_json::Value;
use std::time::Duration;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Sanitize response body for logging
/// Truncates long responses and strips control characters
pub(crate) fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let mut end = MAX_LOG_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... [truncated, {} bytes total]", &body[..end], body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

/// Failure of a single REST call
///
/// `status` is the HTTP status code, or 0 when no response was received.
/// `empty_response` marks a successful status whose body lacked the
/// expected `records` member.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct RestError {
    pub status: u16,
    pub message: String,
    pub empty_response: bool,
}

impl RestError {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            empty_response: false,
        }
    }

    pub fn empty_response(status: u16, api: &str) -> Self {
        Self {
            status,
            message: format!("no response for GET {}", api),
            empty_response: true,
        }
    }
}

/// Extract the message from ONTAP's error envelope:
/// `{"error": {"message": "...", "code": "...", "target": "..."}}`
pub fn parse_error_body(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    let error = value.get("error")?;
    let message = error.get("message").and_then(|v| v.as_str())?;

    let code = error.get("code").and_then(|v| v.as_str());
    let target = error.get("target").and_then(|v| v.as_str());
    Some(match (code, target) {
        (Some(code), Some(target)) => format!("{} (code {}, target {})", message, code, target),
        (Some(code), None) => format!("{} (code {})", message, code),
        (None, Some(target)) => format!("{} (target {})", message, target),
        (None, None) => message.to_string(),
    })
}

/// HTTP client wrapper for ONTAP API calls
#[derive(Clone)]
pub struct OntapHttpClient {
    client: Client,
}

impl OntapHttpClient {
    /// Create a new HTTP client
    pub fn new(validate_certs: bool, timeout: Duration) -> Result<Self> {
        if !validate_certs {
            tracing::warn!("TLS certificate validation is disabled");
        }

        let client = Client::builder()
            .user_agent(concat!("lifctl/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .danger_accept_invalid_certs(!validate_certs)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }

    /// Send one request and return the status with the decoded JSON body
    ///
    /// An empty success body decodes to `Value::Null`.
    pub async fn send(
        &self,
        method: Method,
        url: &str,
        credentials: &Credentials,
        query: Option<&Query>,
        body: Option<&Value>,
    ) -> std::result::Result<(u16, Value), RestError> {
        tracing::debug!("{} {}", method, url);

        let mut request = self
            .client
            .request(method, url)
            .basic_auth(&credentials.username, Some(credentials.password()))
            .header(reqwest::header::ACCEPT, "application/json");

        if let Some(query) = query.filter(|q| !q.is_empty()) {
            request = request.query(query.pairs());
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            let status = e.status().map(|s| s.as_u16()).unwrap_or(0);
            RestError::new(status, format!("Failed to send request: {}", e))
        })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            RestError::new(status.as_u16(), format!("Failed to read response body: {}", e))
        })?;

        if !status.is_success() {
            // Security: Only log sanitized/truncated error body to avoid leaking sensitive data
            tracing::error!("API error: {} - {}", status, sanitize_for_log(&text));
            let message = parse_error_body(&text).unwrap_or_else(|| {
                if text.trim().is_empty() {
                    format!("API request failed: {}", status)
                } else {
                    format!("API request failed: {} - {}", status, sanitize_for_log(&text))
                }
            });
            return Err(RestError::new(status.as_u16(), message));
        }

        if text.trim().is_empty() {
            return Ok((status.as_u16(), Value::Null));
        }

        let value = serde_json::from_str(&text).map_err(|e| {
            RestError::new(status.as_u16(), format!("Failed to parse response JSON: {}", e))
        })?;
        Ok((status.as_u16(), value))
    }
}

/// Short, user-facing hint for a failed status code
/// Security: Generic messages avoid echoing API internals back to the terminal
pub fn status_hint(status: u16) -> Option<&'static str> {
    match status {
        0 => Some("Cluster unreachable. Check the host address and your network connection."),
        400 => Some("Invalid request. Check your parameters."),
        401 => Some("Authentication failed. Check ONTAP_USERNAME / ONTAP_PASSWORD."),
        403 => Some("Permission denied. The API user lacks the required role."),
        404 => Some("Resource not found."),
        409 => Some("Resource conflict. The interface may already exist."),
        429 => Some("Rate limit exceeded. Please try again later."),
        500 | 502 | 503 => Some("Cluster management service temporarily unavailable."),
        _ => None,
    }
}
