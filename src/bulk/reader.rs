// src/bulk/reader.rs
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use std::collections::HashMap;
use std::io::Cursor;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SpreadsheetError {
    #[error("Please upload an Excel file (.xlsx or .xls), got {0:?}")]
    UnsupportedFile(String),
    #[error("Failed to read the Excel file. Please check the file format.")]
    Unreadable(String),
    #[error("The spreadsheet contains no sheets")]
    NoSheets,
    #[error("Sheet not found: {0}")]
    UnknownSheet(String),
}

/// One row of a sheet, keyed by header text.
pub type SheetRow = HashMap<String, String>;

#[derive(Debug, Clone, PartialEq)]
pub struct SheetData {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<SheetRow>,
}

/// An uploaded workbook, decoded once. Every sheet keeps its rows so
/// switching sheets never touches the original bytes again.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadedWorkbook {
    pub filename: String,
    pub sheets: Vec<SheetData>,
}

pub fn is_spreadsheet_name(filename: &str) -> bool {
    let lower = filename.trim().to_ascii_lowercase();
    lower.ends_with(".xlsx") || lower.ends_with(".xls")
}

impl UploadedWorkbook {
    pub fn from_bytes(filename: &str, bytes: Vec<u8>) -> Result<Self, SpreadsheetError> {
        if !is_spreadsheet_name(filename) {
            return Err(SpreadsheetError::UnsupportedFile(filename.to_string()));
        }

        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
            .map_err(|e| SpreadsheetError::Unreadable(e.to_string()))?;

        let mut sheets = Vec::new();
        for name in workbook.sheet_names() {
            let range = workbook
                .worksheet_range(&name)
                .map_err(|e| SpreadsheetError::Unreadable(format!("{name}: {e}")))?;
            let grid: Vec<Vec<String>> = range
                .rows()
                .map(|row| row.iter().map(cell_text).collect())
                .collect();
            sheets.push(SheetData::from_grid(name, grid));
        }

        if sheets.is_empty() {
            return Err(SpreadsheetError::NoSheets);
        }

        tracing::info!(
            filename,
            sheets = sheets.len(),
            rows = sheets.iter().map(|s| s.rows.len()).sum::<usize>(),
            "workbook decoded"
        );

        Ok(Self {
            filename: filename.to_string(),
            sheets,
        })
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn first_sheet(&self) -> &SheetData {
        // from_bytes refuses workbooks without sheets
        &self.sheets[0]
    }

    pub fn sheet(&self, name: &str) -> Result<&SheetData, SpreadsheetError> {
        self.sheets
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| SpreadsheetError::UnknownSheet(name.to_string()))
    }
}

impl SheetData {
    /// First row is the header row. Rows with no text at all are dropped;
    /// columns without a header are ignored.
    pub fn from_grid(name: impl Into<String>, grid: Vec<Vec<String>>) -> Self {
        let mut grid = grid.into_iter();
        let headers: Vec<String> = grid
            .next()
            .unwrap_or_default()
            .into_iter()
            .map(|h| h.trim().to_string())
            .collect();

        let rows = grid
            .filter(|cells| cells.iter().any(|c| !c.trim().is_empty()))
            .map(|cells| {
                let mut row = SheetRow::new();
                for (header, cell) in headers.iter().zip(cells) {
                    if header.is_empty() {
                        continue;
                    }
                    row.entry(header.clone()).or_insert(cell);
                }
                row
            })
            .collect();

        Self {
            name: name.into(),
            headers,
            rows,
        }
    }
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::Error(_) => String::new(),
        other => other.to_string(),
    }
}
