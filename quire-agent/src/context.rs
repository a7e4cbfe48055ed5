//! Per-run context and the system prompt built from it.

use std::path::{Path, PathBuf};

use quire_types::FileKind;

/// What a single run is working on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentContext {
    /// The document every operation targets.
    pub file_path: PathBuf,
    /// Kind derived from the path's extension.
    pub file_kind: FileKind,
}

impl AgentContext {
    /// Context for `file_path`.
    pub fn new(file_path: impl AsRef<Path>) -> Self {
        let file_path = file_path.as_ref().to_path_buf();
        let file_kind = FileKind::from_path(&file_path);
        Self {
            file_path,
            file_kind,
        }
    }

    /// The system context for one consultation.
    ///
    /// Rebuilt for every request and never stored in history.
    pub fn system_prompt(&self, addendum: Option<&str>) -> String {
        let mut prompt = format!(
            "You are an intelligent AI agent helping a user edit a file.\n\
             File Path: {}\n\
             File Type: {}\n\
             \n\
             You have tools to read and modify this file.\n\
             Always verify the structure/content before making edits if you are unsure.\n\
             Refrain from asking the user for the file path, you already have it.",
            self.file_path.display(),
            self.file_kind,
        );
        if let Some(extra) = addendum.filter(|a| !a.trim().is_empty()) {
            prompt.push_str("\n\n");
            prompt.push_str(extra);
        }
        prompt
    }
}
