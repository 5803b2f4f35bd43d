use std::collections::BTreeMap;

use adsheet_core::ports::{TabularSink, TabularSource};
use adsheet_core::types::CellValue;
use adsheet_core::{AdsheetError, AdsheetResult};

/// Named sheets held as ragged grids of cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InMemoryWorkbook {
    sheets: BTreeMap<String, Vec<Vec<CellValue>>>,
}

impl InMemoryWorkbook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sheet(mut self, name: impl Into<String>, rows: Vec<Vec<CellValue>>) -> Self {
        self.sheets.insert(name.into(), rows);
        self
    }

    pub fn sheet_names(&self) -> impl Iterator<Item = &str> {
        self.sheets.keys().map(String::as_str)
    }

    pub fn sheets(&self) -> &BTreeMap<String, Vec<Vec<CellValue>>> {
        &self.sheets
    }

    /// Cell at 1-based (`row`, `col`); out-of-range cells read as empty.
    pub fn cell(&self, sheet: &str, row: usize, col: usize) -> CellValue {
        if row == 0 || col == 0 {
            return CellValue::Empty;
        }
        self.sheets
            .get(sheet)
            .and_then(|rows| rows.get(row - 1))
            .and_then(|cells| cells.get(col - 1))
            .cloned()
            .unwrap_or_default()
    }
}

impl TabularSource for InMemoryWorkbook {
    fn read_rows(&self, sheet: &str) -> AdsheetResult<Vec<Vec<CellValue>>> {
        let rows = self
            .sheets
            .get(sheet)
            .ok_or_else(|| AdsheetError::Sheet(format!("sheet '{sheet}' not found")))?;
        // Trailing blank rows are outside the data region.
        let end = rows
            .iter()
            .rposition(|row| row.iter().any(|c| !c.is_blank()))
            .map_or(0, |last| last + 1);
        Ok(rows[..end].to_vec())
    }
}

impl TabularSink for InMemoryWorkbook {
    fn write_range(
        &mut self,
        sheet: &str,
        row: usize,
        col: usize,
        rows: &[Vec<CellValue>],
    ) -> AdsheetResult<()> {
        if row == 0 || col == 0 {
            return Err(AdsheetError::Sheet(format!(
                "range origin ({row}, {col}) is not 1-based"
            )));
        }
        let width = rows.first().map_or(0, Vec::len);
        if let Some(bad) = rows.iter().position(|r| r.len() != width) {
            return Err(AdsheetError::Sheet(format!(
                "range for '{sheet}' is not rectangular: row {bad} has {} cells, expected {width}",
                rows[bad].len()
            )));
        }

        let grid = self.sheets.entry(sheet.to_string()).or_default();
        let needed_rows = row - 1 + rows.len();
        if grid.len() < needed_rows {
            grid.resize_with(needed_rows, Vec::new);
        }
        for (offset, values) in rows.iter().enumerate() {
            let target = &mut grid[row - 1 + offset];
            let needed_cols = col - 1 + width;
            if target.len() < needed_cols {
                target.resize(needed_cols, CellValue::Empty);
            }
            target[col - 1..needed_cols].clone_from_slice(values);
        }
        Ok(())
    }

    fn clear_from(&mut self, sheet: &str, row: usize) -> AdsheetResult<()> {
        if row == 0 {
            return Err(AdsheetError::Sheet(format!(
                "clear of '{sheet}' from row 0 is not 1-based"
            )));
        }
        if let Some(grid) = self.sheets.get_mut(sheet) {
            grid.truncate(row - 1);
        }
        Ok(())
    }
}
