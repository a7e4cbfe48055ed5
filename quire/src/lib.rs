#![deny(missing_docs)]
//! # quire: umbrella crate
//!
//! Edit `.xlsx` and `.docx` files by talking to an agent. Re-exports the
//! member crates, plus the configuration and wiring used by the `quire`
//! binary.

pub mod config;

pub use quire_agent;
pub use quire_doc;
pub use quire_ops;
pub use quire_provider_openai;
pub use quire_session;
pub use quire_turn;
pub use quire_types;

use std::sync::Arc;

use quire_agent::Agent;
use quire_doc::FileAdapter;
use quire_ops::OperationRegistry;
use quire_provider_openai::OpenAi;
use quire_session::SessionStore;
use thiserror::Error;

pub use config::{ConfigError, QuireConfig};

/// Top-level errors surfaced by the binary.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum QuireError {
    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// An agent run failed.
    #[error(transparent)]
    Agent(#[from] quire_types::AgentError),

    /// Terminal I/O failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Assemble an OpenAI-backed agent over the standard catalog and real files.
pub fn build_agent(
    config: &QuireConfig,
    sessions: Arc<SessionStore>,
) -> Result<Agent<OpenAi>, ConfigError> {
    let mut provider = OpenAi::new(config.api_key()?);
    if let Some(url) = &config.base_url {
        provider = provider.base_url(url.clone());
    }
    if let Some(model) = &config.agent.model {
        provider = provider.model(model.clone());
    }
    Ok(Agent::new(
        provider,
        Arc::new(OperationRegistry::standard()),
        Arc::new(FileAdapter::new()),
        sessions,
        config.agent.clone(),
    ))
}

/// Happy-path imports.
pub mod prelude {
    pub use quire_agent::{Agent, AgentConfig, ExitReason, RunOutput};
    pub use quire_doc::FileAdapter;
    pub use quire_ops::{DocumentAdapter, OperationRegistry};
    pub use quire_provider_openai::OpenAi;
    pub use quire_session::SessionStore;
    pub use quire_turn::{Provider, ProviderError};
    pub use quire_types::{AgentError, FileKind, OperationError, SessionId, Turn};
}
