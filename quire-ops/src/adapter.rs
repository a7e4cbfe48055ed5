//! The seam between the agent loop and concrete file handling.

use std::path::Path;

use async_trait::async_trait;
use quire_types::OperationError;

use crate::descriptor::{Arguments, OperationDescriptor};

/// Executes a resolved operation against one file.
///
/// Object safe so the agent can hold an `Arc<dyn DocumentAdapter>`.
/// Implementations return the human-readable result text on success.
#[async_trait]
pub trait DocumentAdapter: Send + Sync {
    /// Run `operation` on the file at `path` with already-bound arguments.
    async fn execute(
        &self,
        operation: &OperationDescriptor,
        path: &Path,
        args: &Arguments,
    ) -> Result<String, OperationError>;
}
