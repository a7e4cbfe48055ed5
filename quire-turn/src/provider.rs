//! Provider trait for reasoning engines.
//!
//! The [`Provider`] trait uses RPITIT (return-position `impl Trait` in traits)
//! and is intentionally NOT object-safe. The agent loop is generic over it,
//! `Agent<P: Provider>`, so the engine client is an injected value rather
//! than a shared global.

use crate::types::{ProviderRequest, ProviderResponse};
use quire_types::AgentError;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// Errors from reasoning engines.
///
/// A failed engine call ends the whole run. [`ProviderError::is_retryable`]
/// tells the caller whether sending the same request again could work.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ProviderError {
    /// HTTP or network request failed.
    #[error("request failed: {0}")]
    RequestFailed(String),

    /// The engine did not answer within the allowed time.
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// Provider rate-limited the request.
    #[error("rate limited")]
    RateLimited,

    /// Authentication/authorization failed.
    #[error("auth failed: {0}")]
    AuthFailed(String),

    /// Could not parse the provider's response.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Catch-all for other errors.
    #[error("{0}")]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl ProviderError {
    /// Whether retrying this request might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ProviderError::RateLimited
                | ProviderError::RequestFailed(_)
                | ProviderError::Timeout(_)
        )
    }
}

impl From<ProviderError> for AgentError {
    fn from(err: ProviderError) -> Self {
        if err.is_retryable() {
            AgentError::Retryable(err.to_string())
        } else {
            AgentError::Model(err.to_string())
        }
    }
}

/// Reasoning engine interface.
///
/// Given the conversation so far and the operation catalog, an engine
/// replies with either operation calls or a final answer.
pub trait Provider: Send + Sync {
    /// Send a completion request to the engine.
    fn complete(
        &self,
        request: ProviderRequest,
    ) -> impl Future<Output = Result<ProviderResponse, ProviderError>> + Send;
}
