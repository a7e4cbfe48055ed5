//! # quire-types: shared vocabulary
//!
//! The types every other quire crate speaks: session ids, conversation
//! turns, operation calls, the engine's final-answer shapes, the file
//! kind, and the error taxonomy.
//!
//! ## Layout
//!
//! | Module | What it holds |
//! |--------|---------------|
//! | [`id`] | [`SessionId`] |
//! | [`turn`] | [`Turn`], [`OperationCall`] |
//! | [`content`] | [`FinalContent`] |
//! | [`file_kind`] | [`FileKind`] |
//! | [`error`] | [`OperationError`], [`ErrorKind`], [`AgentError`] |
//!
//! Everything is serializable with serde so histories can be logged or
//! persisted as JSON.

#![deny(missing_docs)]

pub mod content;
pub mod error;
pub mod file_kind;
pub mod id;
pub mod turn;

pub use content::FinalContent;
pub use error::{AgentError, ErrorKind, OperationError};
pub use file_kind::FileKind;
pub use id::SessionId;
pub use turn::{OperationCall, Turn, find_unanswered_call};
