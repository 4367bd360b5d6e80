//! HTTP plumbing shared by the remote embedding providers.

use reqwest::Response;
use std::time::Duration;

use crate::ports::EmbeddingError;

/// Builds the HTTP client used by a provider.
pub(crate) fn build_client(timeout: Duration) -> Result<reqwest::Client, EmbeddingError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| EmbeddingError::invalid_request(format!("Failed to create HTTP client: {}", e)))
}

/// Maps a transport failure to an embedding error.
pub(crate) fn map_send_error(error: reqwest::Error, timeout: Duration) -> EmbeddingError {
    if error.is_timeout() {
        EmbeddingError::Timeout {
            timeout_secs: timeout.as_secs() as u32,
        }
    } else if error.is_connect() {
        EmbeddingError::network(format!("Connection failed: {}", error))
    } else {
        EmbeddingError::network(error.to_string())
    }
}

/// Passes successful responses through and maps error statuses.
pub(crate) async fn check_status(response: Response) -> Result<Response, EmbeddingError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let error_body = response.text().await.unwrap_or_default();
    Err(status_error(status.as_u16(), &error_body))
}

pub(crate) fn status_error(status: u16, error_body: &str) -> EmbeddingError {
    match status {
        401 | 403 => EmbeddingError::AuthenticationFailed,
        429 => EmbeddingError::rate_limited(parse_retry_after(error_body)),
        400 | 404 | 422 => EmbeddingError::InvalidRequest(error_body.to_string()),
        500..=599 => EmbeddingError::unavailable(format!("Server error {}: {}", status, error_body)),
        _ => EmbeddingError::network(format!("Unexpected status {}: {}", status, error_body)),
    }
}

/// Extracts "try again in Ns" from an error body, defaulting to 30 seconds.
pub(crate) fn parse_retry_after(error_body: &str) -> u32 {
    let message = serde_json::from_str::<serde_json::Value>(error_body)
        .ok()
        .and_then(|v| v.get("error")?.get("message")?.as_str().map(String::from))
        .unwrap_or_else(|| error_body.to_string());

    message
        .find("try again in ")
        .map(|idx| &message[idx + "try again in ".len()..])
        .and_then(|rest| {
            let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
            digits.parse::<u32>().ok()
        })
        .unwrap_or(30)
}
