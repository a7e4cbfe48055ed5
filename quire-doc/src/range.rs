//! A1-style cell addressing.
//!
//! Accepted forms: a cell (`B3`), a rectangle (`A1:C4`), a column (`B`), a
//! row (`3`), a column span (`A:C`) and a row span (`1:3`). Letters are
//! case-insensitive and `$` anchors are ignored. Columns and rows are
//! 1-based throughout.

use std::fmt;

use quire_types::OperationError;

/// Largest column index in an xlsx sheet (`XFD`).
pub const MAX_COLUMN: u32 = 16_384;
/// Largest row index in an xlsx sheet.
pub const MAX_ROW: u32 = 1_048_576;
/// Most cells one operation will visit.
pub const MAX_RANGE_CELLS: u64 = 1_000_000;

/// A parsed range, before it is fitted to a sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeSpec {
    /// One cell, `(column, row)`.
    Cell(u32, u32),
    /// A rectangle between two corners.
    Rect((u32, u32), (u32, u32)),
    /// Whole columns, first to last.
    Columns(u32, u32),
    /// Whole rows, first to last.
    Rows(u32, u32),
}

/// A concrete rectangle of cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRange {
    /// Leftmost column.
    pub first_col: u32,
    /// Top row.
    pub first_row: u32,
    /// Rightmost column.
    pub last_col: u32,
    /// Bottom row.
    pub last_row: u32,
}

impl CellRange {
    fn new((c1, r1): (u32, u32), (c2, r2): (u32, u32)) -> Self {
        Self {
            first_col: c1.min(c2),
            first_row: r1.min(r2),
            last_col: c1.max(c2),
            last_row: r1.max(r2),
        }
    }

    /// Number of cells covered.
    pub fn cell_count(&self) -> u64 {
        let cols = u64::from(self.last_col - self.first_col + 1);
        let rows = u64::from(self.last_row - self.first_row + 1);
        cols * rows
    }

    /// Cut down to the used extent `(max_col, max_row)`. `None` when
    /// nothing is left.
    pub fn clamp(&self, (max_col, max_row): (u32, u32)) -> Option<Self> {
        let last_col = self.last_col.min(max_col);
        let last_row = self.last_row.min(max_row);
        (self.first_col <= last_col && self.first_row <= last_row).then_some(Self {
            last_col,
            last_row,
            ..*self
        })
    }

    /// Fail with a validation error when the range covers more than
    /// [`MAX_RANGE_CELLS`]. `input` is the range as the caller wrote it.
    pub fn within_budget(self, input: &str) -> Result<Self, OperationError> {
        let count = self.cell_count();
        if count > MAX_RANGE_CELLS {
            return Err(OperationError::validation(format!(
                "Range {input} covers {count} cells; at most {MAX_RANGE_CELLS} can be used at once."
            )));
        }
        Ok(self)
    }

    /// Cells as `(column, row)`, row by row.
    pub fn cells(&self) -> Vec<(u32, u32)> {
        self.rows().into_iter().flatten().collect()
    }

    /// Cells grouped per row, top to bottom.
    pub fn rows(&self) -> Vec<Vec<(u32, u32)>> {
        (self.first_row..=self.last_row)
            .map(|row| (self.first_col..=self.last_col).map(|col| (col, row)).collect())
            .collect()
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}:{}{}",
            column_name(self.first_col),
            self.first_row,
            column_name(self.last_col),
            self.last_row
        )
    }
}

impl RangeSpec {
    /// Parse `input`, or fail with `"Invalid range format {input}"`.
    pub fn parse(input: &str) -> Result<Self, OperationError> {
        parse_spec(input).ok_or_else(|| invalid(input))
    }

    /// Fit to a sheet whose used extent is `(max_col, max_row)`.
    ///
    /// Whole rows and columns stop at the used extent, or at the first
    /// cell for an empty sheet.
    pub fn resolve(&self, (max_col, max_row): (u32, u32)) -> CellRange {
        let max_col = max_col.max(1);
        let max_row = max_row.max(1);
        match *self {
            RangeSpec::Cell(c, r) => CellRange::new((c, r), (c, r)),
            RangeSpec::Rect(a, b) => CellRange::new(a, b),
            RangeSpec::Columns(a, b) => CellRange::new((a, 1), (b, max_row)),
            RangeSpec::Rows(a, b) => CellRange::new((1, a), (max_col, b)),
        }
    }
}

fn invalid(input: &str) -> OperationError {
    OperationError::validation(format!("Invalid range format {input}"))
}

fn parse_spec(input: &str) -> Option<RangeSpec> {
    let input = input.trim();
    match input.split_once(':') {
        None => match parse_part(input)? {
            Part::Cell(c, r) => Some(RangeSpec::Cell(c, r)),
            Part::Column(c) => Some(RangeSpec::Columns(c, c)),
            Part::Row(r) => Some(RangeSpec::Rows(r, r)),
        },
        Some((left, right)) => match (parse_part(left)?, parse_part(right)?) {
            (Part::Cell(c1, r1), Part::Cell(c2, r2)) => Some(RangeSpec::Rect((c1, r1), (c2, r2))),
            (Part::Column(a), Part::Column(b)) => Some(RangeSpec::Columns(a.min(b), a.max(b))),
            (Part::Row(a), Part::Row(b)) => Some(RangeSpec::Rows(a.min(b), a.max(b))),
            _ => None,
        },
    }
}

enum Part {
    Cell(u32, u32),
    Column(u32),
    Row(u32),
}

fn parse_part(part: &str) -> Option<Part> {
    let part: String = part.trim().chars().filter(|&c| c != '$').collect();
    let split = part
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(part.len());
    let (letters, digits) = part.split_at(split);
    match (letters.is_empty(), digits.is_empty()) {
        (false, true) => column_index(letters).map(Part::Column),
        (true, false) => parse_row(digits).map(Part::Row),
        (false, false) => Some(Part::Cell(column_index(letters)?, parse_row(digits)?)),
        (true, true) => None,
    }
}

fn parse_row(digits: &str) -> Option<u32> {
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse::<u32>().ok().filter(|r| (1..=MAX_ROW).contains(r))
}

/// Parse a single cell address such as `B3`.
pub fn parse_cell(input: &str) -> Result<(u32, u32), OperationError> {
    match parse_part(input) {
        Some(Part::Cell(c, r)) => Ok((c, r)),
        _ => Err(OperationError::validation(format!(
            "Invalid cell address {input}"
        ))),
    }
}

/// `A` → 1, `Z` → 26, `AA` → 27. `None` for anything else or past `XFD`.
pub fn column_index(letters: &str) -> Option<u32> {
    if letters.is_empty() || letters.len() > 3 {
        return None;
    }
    let mut index: u32 = 0;
    for c in letters.chars() {
        if !c.is_ascii_alphabetic() {
            return None;
        }
        index = index * 26 + (c.to_ascii_uppercase() as u32 - 'A' as u32 + 1);
    }
    (index <= MAX_COLUMN).then_some(index)
}

/// 1 → `A`, 27 → `AA`.
pub fn column_name(mut index: u32) -> String {
    let mut name = Vec::new();
    while index > 0 {
        let rem = (index - 1) % 26;
        name.push(b'A' + rem as u8);
        index = (index - 1) / 26;
    }
    name.reverse();
    String::from_utf8_lossy(&name).into_owned()
}

/// A column given as letters (`"B"`) or a 1-based index (`"2"`).
pub fn parse_column_ref(input: &str) -> Result<u32, OperationError> {
    let trimmed = input.trim();
    let index = if trimmed.bytes().all(|b| b.is_ascii_digit()) {
        trimmed
            .parse::<u32>()
            .ok()
            .filter(|c| (1..=MAX_COLUMN).contains(c))
    } else {
        column_index(trimmed)
    };
    index.ok_or_else(|| OperationError::validation(format!("Invalid column {input}")))
}
