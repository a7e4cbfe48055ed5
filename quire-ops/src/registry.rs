//! Operation registry: list, look up, and describe operations.

use std::collections::HashMap;

use quire_turn::ToolSchema;
use quire_types::OperationError;
use thiserror::Error;

use crate::catalog;
use crate::descriptor::OperationDescriptor;

/// Registry lookup failures.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// No operation with this name.
    #[error("unknown operation '{0}'")]
    NotFound(String),
}

impl From<RegistryError> for OperationError {
    fn from(err: RegistryError) -> Self {
        OperationError::not_found(err.to_string())
    }
}

/// Immutable catalog of operation descriptors.
///
/// Order is preserved for presentation; lookups go through a name index.
#[derive(Debug, Clone)]
pub struct OperationRegistry {
    operations: Vec<OperationDescriptor>,
    by_name: HashMap<String, usize>,
}

impl OperationRegistry {
    /// Build a registry from descriptors. Later duplicates replace earlier ones.
    pub fn new(descriptors: impl IntoIterator<Item = OperationDescriptor>) -> Self {
        let mut operations: Vec<OperationDescriptor> = Vec::new();
        let mut by_name = HashMap::new();
        for descriptor in descriptors {
            match by_name.get(&descriptor.name) {
                Some(&idx) => operations[idx] = descriptor,
                None => {
                    by_name.insert(descriptor.name.clone(), operations.len());
                    operations.push(descriptor);
                }
            }
        }
        Self {
            operations,
            by_name,
        }
    }

    /// The full spreadsheet and document catalog.
    pub fn standard() -> Self {
        Self::new(catalog::spreadsheet().into_iter().chain(catalog::document()))
    }

    /// All descriptors in catalog order.
    pub fn list_operations(&self) -> &[OperationDescriptor] {
        &self.operations
    }

    /// Look up a descriptor by name.
    pub fn resolve(&self, name: &str) -> Result<&OperationDescriptor, RegistryError> {
        self.by_name
            .get(name)
            .map(|&idx| &self.operations[idx])
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))
    }

    /// Schemas for the reasoning engine, in catalog order.
    pub fn schemas(&self) -> Vec<ToolSchema> {
        self.operations
            .iter()
            .map(OperationDescriptor::tool_schema)
            .collect()
    }

    /// Number of operations.
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

impl Default for OperationRegistry {
    fn default() -> Self {
        Self::standard()
    }
}
