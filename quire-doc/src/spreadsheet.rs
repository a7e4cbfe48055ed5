//! `.xlsx` operations.
//!
//! Every mutating function loads the workbook, checks the sheet exists,
//! edits in memory, and writes through [`replace_atomically`]. Nothing is
//! written when any step fails.

use std::path::Path;

use quire_types::OperationError;
use umya_spreadsheet::{Spreadsheet, Worksheet};

use crate::atomic::replace_atomically;
use crate::range::{self, CellRange, RangeSpec};

/// Style attributes to merge over a cell's current style.
///
/// `None` leaves the attribute as it is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StylePatch {
    /// Bold on or off.
    pub bold: Option<bool>,
    /// Italic on or off.
    pub italic: Option<bool>,
    /// Font color, hex.
    pub color: Option<String>,
    /// Solid fill color, hex.
    pub bg_color: Option<String>,
}

fn open(path: &Path) -> Result<Spreadsheet, OperationError> {
    if !path.exists() {
        return Err(OperationError::not_found(format!(
            "File {} not found.",
            path.display()
        )));
    }
    umya_spreadsheet::reader::xlsx::read(path).map_err(|e| {
        OperationError::format(format!(
            "Could not open {} as a workbook: {e}",
            path.display()
        ))
    })
}

fn save(book: &Spreadsheet, path: &Path) -> Result<(), OperationError> {
    replace_atomically(path, |tmp| {
        umya_spreadsheet::writer::xlsx::write(book, tmp)
            .map_err(|e| OperationError::io(format!("Could not save workbook: {e}")))
    })
}

fn sheet_not_found(name: &str) -> OperationError {
    OperationError::not_found(format!("Sheet {name} not found."))
}

/// Read-only access to one sheet.
fn inspect<T>(
    path: &Path,
    sheet_name: &str,
    f: impl FnOnce(&Worksheet) -> Result<T, OperationError>,
) -> Result<T, OperationError> {
    let book = open(path)?;
    let sheet = book
        .get_sheet_by_name(sheet_name)
        .ok_or_else(|| sheet_not_found(sheet_name))?;
    f(sheet)
}

/// Edit one sheet and save the workbook.
fn edit<T>(
    path: &Path,
    sheet_name: &str,
    f: impl FnOnce(&mut Worksheet) -> Result<T, OperationError>,
) -> Result<T, OperationError> {
    let mut book = open(path)?;
    let sheet = book
        .get_sheet_by_name_mut(sheet_name)
        .ok_or_else(|| sheet_not_found(sheet_name))?;
    let out = f(sheet)?;
    save(&book, path)?;
    Ok(out)
}

fn cell_text(sheet: &Worksheet, coordinate: (u32, u32)) -> String {
    sheet
        .get_cell(coordinate)
        .map(|cell| cell.get_value().to_string())
        .unwrap_or_default()
}

fn extent(sheet: &Worksheet) -> (u32, u32) {
    sheet.get_highest_column_and_row()
}

fn render_rows(sheet: &Worksheet, range: &CellRange) -> String {
    let rows: Vec<Vec<String>> = range
        .rows()
        .into_iter()
        .map(|row| row.into_iter().map(|c| cell_text(sheet, c)).collect())
        .collect();
    serde_json::Value::from(rows).to_string()
}

/// One line per sheet: `Sheet: {name}, Columns: [..]` with the non-empty
/// header values from row 1.
pub fn read_structure(path: &Path) -> Result<String, OperationError> {
    let book = open(path)?;
    let lines: Vec<String> = book
        .get_sheet_collection()
        .iter()
        .map(|sheet| {
            let (max_col, _) = extent(sheet);
            let headers: Vec<String> = (1..=max_col)
                .map(|col| cell_text(sheet, (col, 1)))
                .filter(|v| !v.is_empty())
                .collect();
            format!(
                "Sheet: {}, Columns: {}",
                sheet.get_name(),
                serde_json::Value::from(headers)
            )
        })
        .collect();
    Ok(lines.join("\n"))
}

/// Values of a cell, a range, or (with no range) the whole used area.
///
/// A single cell yields its bare value; anything else a JSON array of
/// row arrays, cut down to the used area of the sheet.
pub fn read_values(
    path: &Path,
    sheet_name: &str,
    range_string: Option<&str>,
) -> Result<String, OperationError> {
    inspect(path, sheet_name, |sheet| {
        let (max_col, max_row) = extent(sheet);
        match range_string.map(str::trim).filter(|r| !r.is_empty()) {
            None if max_col == 0 || max_row == 0 => Ok("[]".to_string()),
            None => {
                let used = RangeSpec::Rect((1, 1), (max_col, max_row)).resolve((max_col, max_row));
                Ok(render_rows(sheet, &used.within_budget(&used.to_string())?))
            }
            Some(r) => match RangeSpec::parse(r)? {
                RangeSpec::Cell(c, row) => Ok(cell_text(sheet, (c, row))),
                spec => match spec.resolve((max_col, max_row)).clamp((max_col, max_row)) {
                    None => Ok("[]".to_string()),
                    Some(range) => Ok(render_rows(sheet, &range.within_budget(r)?)),
                },
            },
        }
    })
}

/// Append `data` as a new row below the last used row.
pub fn add_row(path: &Path, sheet_name: &str, data: &[String]) -> Result<String, OperationError> {
    edit(path, sheet_name, |sheet| {
        let (_, max_row) = extent(sheet);
        let row = max_row + 1;
        for (col, value) in (1u32..).zip(data) {
            sheet.get_cell_mut((col, row)).set_value(value.as_str());
        }
        Ok("Row added successfully.".to_string())
    })
}

/// Write `value` into one cell.
pub fn write_cell(
    path: &Path,
    sheet_name: &str,
    cell: &str,
    value: &str,
) -> Result<String, OperationError> {
    let coordinate = range::parse_cell(cell)?;
    edit(path, sheet_name, |sheet| {
        sheet.get_cell_mut(coordinate).set_value(value);
        Ok(format!("Wrote '{value}' to {cell} successfully."))
    })
}

/// Delete one row, shifting the rows below it up.
pub fn delete_row(path: &Path, sheet_name: &str, row_idx: i64) -> Result<String, OperationError> {
    let row = u32::try_from(row_idx)
        .ok()
        .filter(|r| (1..=range::MAX_ROW).contains(r))
        .ok_or_else(|| OperationError::validation(format!("Invalid row index {row_idx}")))?;
    edit(path, sheet_name, |sheet| {
        sheet.remove_row(&row, &1);
        Ok(format!("Row {row_idx} deleted successfully."))
    })
}

/// Delete one column given as a letter or a 1-based index.
pub fn delete_column(path: &Path, sheet_name: &str, col: &str) -> Result<String, OperationError> {
    let index = range::parse_column_ref(col)?;
    edit(path, sheet_name, |sheet| {
        sheet.remove_column_by_index(&index, &1);
        Ok(format!("Column {col} deleted successfully."))
    })
}

/// Insert an empty column at a 1-based index, shifting the rest right.
pub fn insert_column(path: &Path, sheet_name: &str, col_idx: i64) -> Result<String, OperationError> {
    let index = u32::try_from(col_idx)
        .ok()
        .filter(|c| (1..=range::MAX_COLUMN).contains(c))
        .ok_or_else(|| OperationError::validation(format!("Invalid column index {col_idx}")))?;
    edit(path, sheet_name, |sheet| {
        sheet.insert_new_column_by_index(&index, &1);
        Ok(format!("Inserted column at index {col_idx} successfully."))
    })
}

fn merge_target(sheet: &Worksheet, range_string: &str) -> Result<CellRange, OperationError> {
    Ok(RangeSpec::parse(range_string)?.resolve(extent(sheet)))
}

/// Merge the cells of a range.
pub fn merge_cells(path: &Path, sheet_name: &str, range_string: &str) -> Result<String, OperationError> {
    edit(path, sheet_name, |sheet| {
        let target = merge_target(sheet, range_string)?;
        sheet.add_merge_cells(target.to_string());
        Ok(format!("Merged cells {range_string} successfully."))
    })
}

/// Remove a merge whose bounds equal the range.
pub fn unmerge_cells(
    path: &Path,
    sheet_name: &str,
    range_string: &str,
) -> Result<String, OperationError> {
    edit(path, sheet_name, |sheet| {
        let target = merge_target(sheet, range_string)?;
        let merges = sheet.get_merge_cells_mut();
        let before = merges.len();
        merges.retain(|merged| !same_range(&merged.get_range(), &target));
        if merges.len() == before {
            return Err(OperationError::not_found(format!(
                "Cell range {range_string} is not merged."
            )));
        }
        Ok(format!("Unmerged cells {range_string} successfully."))
    })
}

fn same_range(existing: &str, target: &CellRange) -> bool {
    match RangeSpec::parse(existing) {
        Ok(spec @ (RangeSpec::Cell(..) | RangeSpec::Rect(..))) => spec.resolve((0, 0)) == *target,
        _ => false,
    }
}

/// Normalize `RRGGBB`, `#RRGGBB` or `AARRGGBB` to uppercase ARGB.
pub fn normalize_color(input: &str) -> Result<String, OperationError> {
    let hex = input.trim().trim_start_matches('#');
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(invalid_color(input));
    }
    match hex.len() {
        6 => Ok(format!("FF{}", hex.to_ascii_uppercase())),
        8 => Ok(hex.to_ascii_uppercase()),
        _ => Err(invalid_color(input)),
    }
}

fn invalid_color(input: &str) -> OperationError {
    OperationError::validation(format!("Invalid color {input}"))
}

/// Merge `patch` over the style of every cell in `target_range`.
pub fn apply_style(
    path: &Path,
    sheet_name: &str,
    target_range: &str,
    patch: &StylePatch,
) -> Result<String, OperationError> {
    let spec = RangeSpec::parse(target_range)?;
    let color = patch.color.as_deref().map(normalize_color).transpose()?;
    let fill = patch.bg_color.as_deref().map(normalize_color).transpose()?;

    edit(path, sheet_name, |sheet| {
        let cells = spec.resolve(extent(sheet)).within_budget(target_range)?.cells();
        for coordinate in cells {
            let style = sheet.get_cell_mut(coordinate).get_style_mut();
            let font = style.get_font_mut();
            if let Some(bold) = patch.bold {
                font.set_bold(bold);
            }
            if let Some(italic) = patch.italic {
                font.set_italic(italic);
            }
            if let Some(argb) = &color {
                font.get_color_mut().set_argb(argb.as_str());
            }
            if let Some(argb) = &fill {
                style.set_background_color(argb.as_str());
            }
        }
        Ok(format!("Applied styles to {target_range} successfully."))
    })
}
