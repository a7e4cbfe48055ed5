#![deny(missing_docs)]
//! Agent control loop for quire.
//!
//! [`Agent::run`] turns one user message into a bounded sequence of
//! engine consultations and document operations against a single file:
//!
//! 1. commit the user message to the session
//! 2. ask the engine, with a freshly built system context and the history
//! 3. if it asked for operations, run them in order, commit the engine
//!    turn with every result, and go back to 2
//! 4. otherwise normalize its answer, commit it, and return
//!
//! The loop stops after `max_iterations` consultations that all asked for
//! operations and answers with a fixed notice instead.

pub mod agent;
pub mod config;
pub mod context;
pub mod normalize;

pub use agent::{Agent, ExitReason, OperationRecord, RunOutput};
pub use config::{AgentConfig, DEFAULT_MAX_ITERATIONS};
pub use context::AgentContext;
pub use normalize::normalize;
