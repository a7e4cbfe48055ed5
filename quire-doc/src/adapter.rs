//! [`DocumentAdapter`] over real files.

use std::path::{Path, PathBuf};
use std::time::Instant;

use async_trait::async_trait;
use quire_ops::{Arguments, DocumentAdapter, OperationDescriptor};
use quire_types::OperationError;

use crate::locks::FileLocks;
use crate::spreadsheet::StylePatch;
use crate::{document, spreadsheet};

/// Runs catalog operations against files on disk.
///
/// Operations on one file are serialized; the blocking parse/edit/write
/// work runs on the blocking thread pool and holds the file's lock until
/// it returns, even if the caller stops waiting.
#[derive(Debug, Default)]
pub struct FileAdapter {
    locks: FileLocks,
}

impl FileAdapter {
    /// Create an adapter with an empty lock table.
    pub fn new() -> Self {
        Self::default()
    }
}

/// Run one operation synchronously. Unknown names are `Unsupported`.
pub fn dispatch(name: &str, path: &Path, args: &Arguments) -> Result<String, OperationError> {
    match name {
        "read_excel_structure" => spreadsheet::read_structure(path),
        "read_excel_values" => {
            spreadsheet::read_values(path, args.str("sheet_name")?, args.opt_str("range_string"))
        }
        "add_excel_row" => {
            spreadsheet::add_row(path, args.str("sheet_name")?, &args.string_list("data")?)
        }
        "write_excel_cell" => spreadsheet::write_cell(
            path,
            args.str("sheet_name")?,
            args.str("cell")?,
            args.str("value")?,
        ),
        "delete_excel_row" => {
            spreadsheet::delete_row(path, args.str("sheet_name")?, args.int("row_idx")?)
        }
        "delete_excel_column" => {
            spreadsheet::delete_column(path, args.str("sheet_name")?, args.column("col_idx")?)
        }
        "insert_excel_column" => {
            spreadsheet::insert_column(path, args.str("sheet_name")?, args.int("col_idx")?)
        }
        "merge_excel_cells" => {
            spreadsheet::merge_cells(path, args.str("sheet_name")?, args.str("range_string")?)
        }
        "unmerge_excel_cells" => {
            spreadsheet::unmerge_cells(path, args.str("sheet_name")?, args.str("range_string")?)
        }
        "apply_excel_style" => {
            let patch = StylePatch {
                bold: args.opt_bool("bold"),
                italic: args.opt_bool("italic"),
                color: args.opt_str("color").map(str::to_string),
                bg_color: args.opt_str("bg_color").map(str::to_string),
            };
            spreadsheet::apply_style(
                path,
                args.str("sheet_name")?,
                args.str("target_range")?,
                &patch,
            )
        }
        "read_word_text" => document::read_text(path),
        "append_word_text" => document::append_text(path, args.str("text")?),
        "replace_word_text" => {
            document::replace_text(path, args.str("old_text")?, args.str("new_text")?)
        }
        other => Err(OperationError::unsupported(format!(
            "no handler for operation '{other}'"
        ))),
    }
}

#[async_trait]
impl DocumentAdapter for FileAdapter {
    async fn execute(
        &self,
        operation: &OperationDescriptor,
        path: &Path,
        args: &Arguments,
    ) -> Result<String, OperationError> {
        let started = Instant::now();

        let name = operation.name.clone();
        let owned_path: PathBuf = path.to_path_buf();
        let owned_args = args.clone();
        let result = self
            .locks
            .run_exclusive(path, move || dispatch(&name, &owned_path, &owned_args))
            .await
            .map_err(|e| OperationError::io(format!("operation task failed: {e}")))?;

        tracing::debug!(
            operation = %operation.name,
            path = %path.display(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            ok = result.is_ok(),
            "document operation finished"
        );
        result
    }
}
