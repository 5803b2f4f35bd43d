//! Workbook persisted as a JSON document:
//!
//! ```json
//! { "sheets": { "Bids": [["Campaign", "Keyword", ...], ["CampX", "shoes", ...]] } }
//! ```
//!
//! Strings, numbers, booleans and `null` map onto [`CellValue`] variants.
//! Numbers are kept as their literal text in both directions, so `10.00`
//! stays `10.00` and no value passes through `f64`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use adsheet_core::ports::{TabularSink, TabularSource};
use adsheet_core::types::CellValue;
use adsheet_core::{AdsheetError, AdsheetResult};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::value::{to_raw_value, RawValue};
use serde_json::Value;
use tracing::{debug, info};

use crate::memory::InMemoryWorkbook;

#[derive(Debug, Default, Serialize, Deserialize)]
struct WorkbookFile {
    #[serde(default)]
    sheets: BTreeMap<String, Vec<Vec<Box<RawValue>>>>,
}

#[derive(Debug)]
pub struct JsonWorkbook {
    path: PathBuf,
    book: InMemoryWorkbook,
}

impl JsonWorkbook {
    pub fn open(path: impl AsRef<Path>) -> AdsheetResult<Self> {
        let path = path.as_ref().to_path_buf();
        let raw = std::fs::read_to_string(&path)?;
        let file: WorkbookFile = serde_json::from_str(&raw)?;

        let mut book = InMemoryWorkbook::new();
        for (name, rows) in file.sheets {
            let rows = rows
                .into_iter()
                .map(|row| row.iter().map(|raw| cell_from_json(raw)).collect::<AdsheetResult<_>>())
                .collect::<AdsheetResult<_>>()
                .map_err(|e| AdsheetError::Sheet(format!("sheet '{name}': {e}")))?;
            book = book.with_sheet(name, rows);
        }
        debug!(path = %path.display(), "Workbook opened");
        Ok(Self { path, book })
    }

    /// Open `path`, or start an empty workbook there if the file does not exist yet.
    pub fn open_or_create(path: impl AsRef<Path>) -> AdsheetResult<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::open(path)
        } else {
            info!(path = %path.display(), "Workbook not found, starting a new one");
            Ok(Self {
                path: path.to_path_buf(),
                book: InMemoryWorkbook::new(),
            })
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn book(&self) -> &InMemoryWorkbook {
        &self.book
    }

    pub fn save(&self) -> AdsheetResult<()> {
        let mut file = WorkbookFile::default();
        for (name, rows) in self.book.sheets() {
            let rows = rows
                .iter()
                .map(|row| row.iter().map(cell_to_json).collect::<AdsheetResult<_>>())
                .collect::<AdsheetResult<_>>()?;
            file.sheets.insert(name.clone(), rows);
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(&file)?)?;
        debug!(path = %self.path.display(), "Workbook saved");
        Ok(())
    }
}

impl TabularSource for JsonWorkbook {
    fn read_rows(&self, sheet: &str) -> AdsheetResult<Vec<Vec<CellValue>>> {
        self.book.read_rows(sheet)
    }
}

impl TabularSink for JsonWorkbook {
    fn write_range(
        &mut self,
        sheet: &str,
        row: usize,
        col: usize,
        rows: &[Vec<CellValue>],
    ) -> AdsheetResult<()> {
        self.book.write_range(sheet, row, col, rows)
    }

    fn clear_from(&mut self, sheet: &str, row: usize) -> AdsheetResult<()> {
        self.book.clear_from(sheet, row)
    }
}

fn cell_from_json(raw: &RawValue) -> AdsheetResult<CellValue> {
    let text = raw.get().trim();
    if text.starts_with(|c: char| c == '-' || c.is_ascii_digit()) {
        let decimal = Decimal::from_str(text)
            .or_else(|_| Decimal::from_scientific(text))
            .map_err(|e| AdsheetError::Sheet(format!("number {text} out of range: {e}")))?;
        return Ok(CellValue::Number(decimal));
    }
    Ok(match serde_json::from_str::<Value>(text)? {
        Value::Null => CellValue::Empty,
        Value::String(s) => CellValue::Text(s),
        Value::Bool(b) => CellValue::Bool(b),
        other => {
            return Err(AdsheetError::Sheet(format!(
                "unsupported cell value {other}"
            )))
        }
    })
}

fn cell_to_json(cell: &CellValue) -> AdsheetResult<Box<RawValue>> {
    let raw = match cell {
        CellValue::Empty => to_raw_value(&Value::Null)?,
        CellValue::Text(s) => to_raw_value(s)?,
        CellValue::Bool(b) => to_raw_value(b)?,
        CellValue::Number(n) => RawValue::from_string(n.to_string())?,
    };
    Ok(raw)
}
