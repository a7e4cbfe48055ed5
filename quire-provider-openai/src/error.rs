//! Mapping of HTTP failures to [`ProviderError`].

use std::time::Duration;

use quire_turn::ProviderError;
use reqwest::StatusCode;

/// Map a non-success HTTP status from the API to a [`ProviderError`].
pub(crate) fn map_http_status(status: StatusCode, body: &str) -> ProviderError {
    match status.as_u16() {
        401 | 403 => ProviderError::AuthFailed(body.to_string()),
        429 => ProviderError::RateLimited,
        500..=599 => ProviderError::RequestFailed(format!("HTTP {status}: {body}")),
        _ => ProviderError::InvalidResponse(format!("HTTP {status}: {body}")),
    }
}

/// Map a transport failure. `timeout` is the limit the request ran under.
pub(crate) fn map_reqwest_error(err: reqwest::Error, timeout: Duration) -> ProviderError {
    if err.is_timeout() {
        ProviderError::Timeout(timeout)
    } else {
        ProviderError::RequestFailed(err.to_string())
    }
}
