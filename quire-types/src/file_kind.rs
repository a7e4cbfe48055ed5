//! File kind inferred from a path's extension.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// What sort of file the agent is editing.
///
/// Informational only: it goes into the engine's system context and never
/// restricts which operations may be called.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    /// `.xlsx` / `.xls`
    Spreadsheet,
    /// `.docx` / `.doc`
    Document,
    /// Anything else.
    Unknown,
}

impl FileKind {
    /// Infer the kind from the extension, ignoring case.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let ext = path
            .as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("xlsx") | Some("xls") => FileKind::Spreadsheet,
            Some("docx") | Some("doc") => FileKind::Document,
            _ => FileKind::Unknown,
        }
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FileKind::Spreadsheet => "Excel",
            FileKind::Document => "Word",
            FileKind::Unknown => "Unknown",
        };
        f.write_str(label)
    }
}
