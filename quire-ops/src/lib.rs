#![deny(missing_docs)]
//! Operation registry for quire.
//!
//! The registry is a fixed catalog of named operations. Each operation has a
//! description and a declared parameter schema; [`OperationDescriptor::bind`]
//! validates the reasoning engine's raw arguments against that schema before
//! a [`DocumentAdapter`] runs the operation. The registry itself never
//! touches the filesystem.

pub mod adapter;
pub mod catalog;
pub mod descriptor;
pub mod registry;

pub use adapter::DocumentAdapter;
pub use descriptor::{Arguments, OperationDescriptor, ParamKind, ParamSpec, TargetKind};
pub use registry::{OperationRegistry, RegistryError};
