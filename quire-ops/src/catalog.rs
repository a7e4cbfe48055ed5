//! The built-in operation catalog.

use crate::descriptor::{OperationDescriptor, ParamKind, ParamSpec, TargetKind};

fn sheet_name() -> ParamSpec {
    ParamSpec::required("sheet_name", ParamKind::String, "Name of the worksheet.")
}

fn spreadsheet_op(name: &str, description: &str, params: Vec<ParamSpec>) -> OperationDescriptor {
    OperationDescriptor {
        name: name.into(),
        description: description.into(),
        target: TargetKind::Spreadsheet,
        params,
    }
}

fn document_op(name: &str, description: &str, params: Vec<ParamSpec>) -> OperationDescriptor {
    OperationDescriptor {
        name: name.into(),
        description: description.into(),
        target: TargetKind::Document,
        params,
    }
}

/// Operations on `.xlsx` workbooks.
pub fn spreadsheet() -> Vec<OperationDescriptor> {
    vec![
        spreadsheet_op(
            "read_excel_structure",
            "Reads the sheet names and columns of an Excel file. Use this to understand the file structure.",
            vec![],
        ),
        spreadsheet_op(
            "read_excel_values",
            "Reads values from a specific sheet. range_string can be 'A1', 'A1:B2', or omitted (reads the used range).",
            vec![
                sheet_name(),
                ParamSpec::optional(
                    "range_string",
                    ParamKind::String,
                    "Cell or range to read, e.g. 'A1' or 'A1:B2'.",
                ),
            ],
        ),
        spreadsheet_op(
            "add_excel_row",
            "Appends a row to an Excel sheet. data should be a list of values.",
            vec![
                sheet_name(),
                ParamSpec::required("data", ParamKind::StringList, "Cell values, left to right."),
            ],
        ),
        spreadsheet_op(
            "write_excel_cell",
            "Writes a value to a specific cell (e.g., 'A1').",
            vec![
                sheet_name(),
                ParamSpec::required("cell", ParamKind::String, "Cell address, e.g. 'A1'."),
                ParamSpec::required("value", ParamKind::String, "Value to write."),
            ],
        ),
        spreadsheet_op(
            "delete_excel_row",
            "Deletes a row from an Excel sheet. row_idx is 1-based index (e.g., 2).",
            vec![
                sheet_name(),
                ParamSpec::required("row_idx", ParamKind::Integer, "1-based row index."),
            ],
        ),
        spreadsheet_op(
            "delete_excel_column",
            "Deletes a column from an Excel sheet. col_idx can be a letter (e.g., 'A') or index.",
            vec![
                sheet_name(),
                ParamSpec::required(
                    "col_idx",
                    ParamKind::ColumnRef,
                    "Column letter or 1-based column index.",
                ),
            ],
        ),
        spreadsheet_op(
            "insert_excel_column",
            "Inserts a new column at the specified index. col_idx is 1-based index.",
            vec![
                sheet_name(),
                ParamSpec::required("col_idx", ParamKind::Integer, "1-based column index."),
            ],
        ),
        spreadsheet_op(
            "merge_excel_cells",
            "Merges cells in the specified range (e.g., 'A1:B2').",
            vec![
                sheet_name(),
                ParamSpec::required("range_string", ParamKind::String, "Range to merge."),
            ],
        ),
        spreadsheet_op(
            "unmerge_excel_cells",
            "Unmerges cells in the specified range (e.g., 'A1:B2').",
            vec![
                sheet_name(),
                ParamSpec::required("range_string", ParamKind::String, "Range to unmerge."),
            ],
        ),
        spreadsheet_op(
            "apply_excel_style",
            "Applies styles to Excel cells. target_range: 'A1', 'A1:B2', 'A' (column), or '1' (row). \
             color/bg_color: Hex codes (e.g. 'FF0000'). bold/italic: true/false. \
             Attributes that are omitted keep their current value.",
            vec![
                sheet_name(),
                ParamSpec::required("target_range", ParamKind::String, "Cells to style."),
                ParamSpec::optional("bold", ParamKind::Boolean, "Set or clear bold."),
                ParamSpec::optional("italic", ParamKind::Boolean, "Set or clear italic."),
                ParamSpec::optional("color", ParamKind::String, "Font color as a hex code."),
                ParamSpec::optional("bg_color", ParamKind::String, "Fill color as a hex code."),
            ],
        ),
    ]
}

/// Operations on `.docx` documents.
pub fn document() -> Vec<OperationDescriptor> {
    vec![
        document_op(
            "read_word_text",
            "Reads the text content of a Word file.",
            vec![],
        ),
        document_op(
            "append_word_text",
            "Appends a paragraph of text to a Word file.",
            vec![ParamSpec::required("text", ParamKind::String, "Paragraph text.")],
        ),
        document_op(
            "replace_word_text",
            "Replaces occurrences of text in a Word file.",
            vec![
                ParamSpec::required("old_text", ParamKind::String, "Text to find."),
                ParamSpec::required("new_text", ParamKind::String, "Replacement text."),
            ],
        ),
    ]
}
