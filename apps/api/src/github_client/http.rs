//! Shared status-code checks for GitHub responses.

use reqwest::{Response, StatusCode};

use super::CodeHostError;

/// Returns the response unchanged on success. Handles:
/// - **429**, or **403** with `x-ratelimit-remaining: 0` → [`CodeHostError::RateLimited`]
///   (`Retry-After` seconds, 60 when absent).
/// - **Non-success status** → [`CodeHostError::Api`] with the response body.
pub async fn check_response(resp: Response) -> Result<Response, CodeHostError> {
    let status = resp.status();
    if status == StatusCode::TOO_MANY_REQUESTS
        || (status == StatusCode::FORBIDDEN && quota_exhausted(&resp))
    {
        return Err(CodeHostError::RateLimited {
            retry_after_secs: parse_retry_after(&resp),
        });
    }
    if !status.is_success() {
        return Err(CodeHostError::Api {
            status: status.as_u16(),
            message: resp.text().await.unwrap_or_default(),
        });
    }
    Ok(resp)
}

fn quota_exhausted(resp: &Response) -> bool {
    resp.headers()
        .get("x-ratelimit-remaining")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.trim() == "0")
}

fn parse_retry_after(resp: &Response) -> u64 {
    resp.headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(60)
}
