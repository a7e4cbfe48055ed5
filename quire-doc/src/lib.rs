#![deny(missing_docs)]
//! File-backed document adapter for quire.
//!
//! [`FileAdapter`] implements [`quire_ops::DocumentAdapter`] for `.xlsx`
//! workbooks (through `umya-spreadsheet`) and `.docx` documents (by
//! rewriting `word/document.xml` inside the zip package).
//!
//! Mutations go through [`atomic::replace_atomically`]: the new file is
//! written beside the original and renamed over it, so a failed edit never
//! leaves a half-written document behind.

pub mod adapter;
pub mod atomic;
pub mod document;
pub mod locks;
pub mod range;
pub mod spreadsheet;

pub use adapter::FileAdapter;
pub use locks::FileLocks;
