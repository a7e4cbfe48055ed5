#![deny(missing_docs)]
//! Reasoning engine contract.
//!
//! Provides the [`Provider`] trait the agent loop calls to decide its next
//! step, and the request/response types that cross that boundary.

pub mod provider;
pub mod types;

// Re-exports
pub use provider::{Provider, ProviderError};
pub use types::*;
