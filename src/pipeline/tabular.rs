//! Tabular decode and re-encode: CSV ↔ single-sheet XLSX workbooks.
//!
//! ## The CSV decode chain
//!
//! Uploaded CSVs are routinely saved by Korean Excel installs in legacy
//! codepages. The reader tries a fixed, ordered list of encodings and takes
//! the first one that decodes the whole byte stream cleanly: strict UTF-8
//! first, then the WHATWG euc-kr decoder (windows-949, which covers both
//! the `cp949` and `euc-kr` labels). This is an ordered trial, not
//! detection — a file that happens to decode under an earlier candidate is
//! accepted as-is, because compatibility is defined by that behaviour.
//!
//! ## Failure points
//!
//! Reading and writing fail differently on purpose:
//! [`ConvertError::ReadFailed`] ("could not read file") covers the decode
//! chain and both parsers; [`ConvertError::ConvertFailed`] ("could not
//! convert file") covers re-encoding after a successful read. The caller
//! surfaces them as two different user-facing messages.

use crate::error::ConvertError;
use crate::output::InputFile;
use crate::pipeline::recipe::TabularRecipe;
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use encoding_rs::EUC_KR;
use rust_xlsxwriter::Workbook;
use std::borrow::Cow;
use std::io::Cursor;
use tracing::debug;

/// UTF-8 byte-order mark prepended to produced CSV files so that Excel
/// opens them with the right encoding.
pub const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// An in-memory table: one header row plus data rows, all cells as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }
}

// ── Read ─────────────────────────────────────────────────────────────────

/// Read the input into a [`Table`] using the reader the recipe selects.
pub fn read_table(item: &InputFile, recipe: TabularRecipe) -> Result<Table, ConvertError> {
    match recipe {
        TabularRecipe::CsvToWorkbook => read_csv(item),
        TabularRecipe::WorkbookToCsv => read_workbook(item),
    }
}

/// Decode the byte stream with the first encoding in the chain that accepts
/// it fully. Returns the decoded text and the winning encoding's label.
fn decode_text(bytes: &[u8]) -> Option<(Cow<'_, str>, &'static str)> {
    if let Ok(s) = std::str::from_utf8(bytes) {
        return Some((Cow::Borrowed(s), "utf-8"));
    }
    EUC_KR
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(|s| (s, EUC_KR.name()))
}

fn read_csv(item: &InputFile) -> Result<Table, ConvertError> {
    let (text, encoding) =
        decode_text(&item.bytes).ok_or_else(|| ConvertError::ReadFailed {
            name: item.name.clone(),
            detail: "no encoding in the chain (utf-8, euc-kr) decodes this file".into(),
        })?;

    debug!("Decoded '{}' as {}", item.name, encoding);

    let mut reader = csv::ReaderBuilder::new().from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| ConvertError::ReadFailed {
            name: item.name.clone(),
            detail: e.to_string(),
        })?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| ConvertError::ReadFailed {
            name: item.name.clone(),
            detail: e.to_string(),
        })?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(Table { headers, rows })
}

fn read_workbook(item: &InputFile) -> Result<Table, ConvertError> {
    let cursor = Cursor::new(item.bytes.as_slice());
    let mut workbook =
        open_workbook_auto_from_rs(cursor).map_err(|e| ConvertError::ReadFailed {
            name: item.name.clone(),
            detail: e.to_string(),
        })?;

    // First sheet only; header row inferred from the first row, the same
    // way the CSV reader treats its first record.
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ConvertError::ReadFailed {
            name: item.name.clone(),
            detail: "workbook contains no sheets".into(),
        })?
        .map_err(|e| ConvertError::ReadFailed {
            name: item.name.clone(),
            detail: e.to_string(),
        })?;

    let mut rows_iter = range.rows();
    let headers: Vec<String> = rows_iter
        .next()
        .map(|row| row.iter().map(cell_to_string).collect())
        .unwrap_or_default();
    let rows: Vec<Vec<String>> = rows_iter
        .map(|row| row.iter().map(cell_to_string).collect())
        .collect();

    Ok(Table { headers, rows })
}

/// Render one workbook cell as CSV text.
fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => {
            if *b {
                "TRUE".to_string()
            } else {
                "FALSE".to_string()
            }
        }
        other => other.to_string(),
    }
}

// ── Write ────────────────────────────────────────────────────────────────

/// Re-encode the table in the recipe's target format.
pub fn encode_table(
    table: &Table,
    recipe: TabularRecipe,
    name: &str,
) -> Result<Vec<u8>, ConvertError> {
    let result = match recipe {
        TabularRecipe::CsvToWorkbook => write_workbook(table),
        TabularRecipe::WorkbookToCsv => write_csv_with_bom(table),
    };
    result.map_err(|detail| ConvertError::ConvertFailed {
        name: name.to_string(),
        detail,
    })
}

/// Write a single-sheet workbook: headers as the first row, no index
/// column, numeric-looking cells stored as numbers so Excel sorts and sums
/// them natively.
fn write_workbook(table: &Table) -> Result<Vec<u8>, String> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    for (col, header) in table.headers.iter().enumerate() {
        worksheet
            .write_string(0, col as u16, header.as_str())
            .map_err(|e| e.to_string())?;
    }

    for (r, row) in table.rows.iter().enumerate() {
        for (c, cell) in row.iter().enumerate() {
            let row_idx = (r + 1) as u32;
            let col_idx = c as u16;
            match numeric_cell(cell) {
                Some(n) => worksheet
                    .write_number(row_idx, col_idx, n)
                    .map_err(|e| e.to_string())?,
                None => worksheet
                    .write_string(row_idx, col_idx, cell.as_str())
                    .map_err(|e| e.to_string())?,
            };
        }
    }

    workbook.save_to_buffer().map_err(|e| e.to_string())
}

/// Parse a cell as a finite number, rejecting empty cells and the textual
/// NaN/inf spellings `f64::from_str` would otherwise accept.
fn numeric_cell(cell: &str) -> Option<f64> {
    if cell.is_empty() {
        return None;
    }
    cell.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Write BOM-prefixed UTF-8 CSV: headers first, no index column.
fn write_csv_with_bom(table: &Table) -> Result<Vec<u8>, String> {
    let mut out = Vec::from(UTF8_BOM);
    {
        let mut writer = csv::Writer::from_writer(&mut out);
        if !table.headers.is_empty() {
            writer
                .write_record(&table.headers)
                .map_err(|e| e.to_string())?;
        }
        for row in &table.rows {
            writer.write_record(row).map_err(|e| e.to_string())?;
        }
        writer.flush().map_err(|e| e.to_string())?;
    }
    Ok(out)
}
