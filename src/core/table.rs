use crate::utils::error::{EnrollError, Result};
use calamine::{open_workbook, Data, Reader, Xlsx};
use std::collections::HashMap;
use std::path::Path;

/// The preference table is [classId, PL, TP, T] and nothing else.
pub const REQUIRED_COLUMNS: usize = 4;

/// One normalized table row: string-keyed, string-valued, missing cells
/// mapped to empty string. Column order lives in the headers list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRecord {
    pub data: HashMap<String, String>,
}

impl TableRecord {
    pub fn get(&self, header: &str) -> &str {
        self.data.get(header).map(String::as_str).unwrap_or("")
    }
}

/// Parse a preference file into `(records, headers)`. All-or-nothing: no
/// partial table is ever returned.
pub fn load_table(path: &str) -> Result<(Vec<TableRecord>, Vec<String>)> {
    let extension = Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default();

    let (records, headers) = match extension {
        "csv" => {
            tracing::debug!("Reading {} with the csv reader", path);
            load_csv(path)?
        }
        "xlsx" => {
            tracing::debug!("Reading {} with the xlsx reader", path);
            load_xlsx(path)?
        }
        other => {
            return Err(EnrollError::UnsupportedFormat {
                extension: other.to_string(),
            })
        }
    };

    if headers.is_empty() {
        return Err(EnrollError::NoHeaders);
    }
    if headers.len() != REQUIRED_COLUMNS {
        return Err(EnrollError::ColumnCountMismatch {
            found: headers.len(),
        });
    }
    if records.is_empty() {
        return Err(EnrollError::EmptyTable);
    }

    Ok((records, headers))
}

fn load_csv(path: &str) -> Result<(Vec<TableRecord>, Vec<String>)> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|header| header.to_string())
        .collect();

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        let data = headers
            .iter()
            .enumerate()
            .map(|(i, header)| {
                (
                    header.clone(),
                    row.get(i).map(str::to_string).unwrap_or_default(),
                )
            })
            .collect();
        records.push(TableRecord { data });
    }

    Ok((records, headers))
}

fn load_xlsx(path: &str) -> Result<(Vec<TableRecord>, Vec<String>)> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;
    let range = match workbook.worksheet_range_at(0) {
        Some(range) => range?,
        None => return Err(EnrollError::NoHeaders),
    };

    let mut rows = range.rows();
    let mut headers: Vec<String> = match rows.next() {
        Some(row) => row.iter().map(cell_to_string).collect(),
        None => return Err(EnrollError::NoHeaders),
    };
    // The used range can extend past the last real header column.
    while headers.last().is_some_and(|header| header.is_empty()) {
        headers.pop();
    }

    let mut records = Vec::new();
    for row in rows {
        let data = headers
            .iter()
            .enumerate()
            .map(|(i, header)| {
                (
                    header.clone(),
                    row.get(i).map(cell_to_string).unwrap_or_default(),
                )
            })
            .collect();
        records.push(TableRecord { data });
    }

    Ok((records, headers))
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(value) => value.clone(),
        // Slot numbers typed as numbers come back as floats; "101.0" would
        // never match a classId on the portal.
        Data::Float(value) if value.fract() == 0.0 => format!("{}", *value as i64),
        other => other.to_string(),
    }
}
