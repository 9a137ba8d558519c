use std::io::Cursor;

use calamine::{Data, Reader, Xls, Xlsx};

use super::ImportError;

/// Accepted upload formats, recognized by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Csv,
    Xlsx,
    Xls,
}

impl FileKind {
    pub fn from_name(name: &str) -> Option<Self> {
        let lower = name.to_lowercase();
        if lower.ends_with(".csv") {
            Some(Self::Csv)
        } else if lower.ends_with(".xlsx") {
            Some(Self::Xlsx)
        } else if lower.ends_with(".xls") {
            Some(Self::Xls)
        } else {
            None
        }
    }
}

/// A parsed sheet: normalized headers plus rows of plain string cells.
/// Cells keep exactly what was typed; phone numbers and budgets never pass
/// through numeric inference.
#[derive(Debug, Default)]
pub struct TabularFile {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TabularFile {
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == name)
    }

    pub fn cell<'a>(&self, row: &'a [String], name: &str) -> &'a str {
        self.column(name)
            .and_then(|index| row.get(index))
            .map(String::as_str)
            .unwrap_or("")
    }
}

pub fn parse(kind: FileKind, bytes: &[u8]) -> Result<TabularFile, ImportError> {
    let table = match kind {
        FileKind::Csv => parse_csv(bytes)?,
        FileKind::Xlsx => {
            let workbook = Xlsx::new(Cursor::new(bytes)).map_err(calamine::Error::from)?;
            parse_workbook(workbook)?
        }
        FileKind::Xls => {
            let workbook = Xls::new(Cursor::new(bytes)).map_err(calamine::Error::from)?;
            parse_workbook(workbook)?
        }
    };

    if table.headers.iter().all(String::is_empty) {
        return Err(ImportError::Empty);
    }
    Ok(table)
}

/// Headers are matched after trimming and lower-casing; a UTF-8 BOM on the
/// first header survives naive CSV readers and is stripped here.
fn normalize_header(raw: &str) -> String {
    raw.trim_start_matches('\u{feff}').trim().to_lowercase()
}

fn parse_csv(bytes: &[u8]) -> Result<TabularFile, ImportError> {
    let bytes = bytes.strip_prefix(b"\xef\xbb\xbf").unwrap_or(bytes);
    let text = match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        // Legacy exports arrive as Latin-1; every byte maps to one scalar.
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    };

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(normalize_header)
        .collect();
    if headers.is_empty() {
        return Err(ImportError::Empty);
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(TabularFile { headers, rows })
}

fn parse_workbook<RS, W>(mut workbook: W) -> Result<TabularFile, ImportError>
where
    RS: std::io::Read + std::io::Seek,
    W: Reader<RS>,
    calamine::Error: From<W::Error>,
{
    let range = match workbook.worksheet_range_at(0) {
        Some(result) => result.map_err(calamine::Error::from)?,
        None => return Err(ImportError::Empty),
    };

    let mut sheet_rows = range.rows();
    let headers: Vec<String> = match sheet_rows.next() {
        Some(row) => row
            .iter()
            .map(|cell| normalize_header(&cell_to_string(cell)))
            .collect(),
        None => return Err(ImportError::Empty),
    };

    let rows = sheet_rows
        .map(|row| row.iter().map(cell_to_string).collect())
        .collect();

    Ok(TabularFile { headers, rows })
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(value) => value.clone(),
        Data::Int(value) => value.to_string(),
        Data::Float(value) => float_to_string(*value),
        Data::Bool(value) => value.to_string(),
        Data::DateTime(value) => float_to_string(value.as_f64()),
        Data::DateTimeIso(value) | Data::DurationIso(value) => value.clone(),
    }
}

/// Renders spreadsheet numerics without the float artifacts pandas-style
/// inference would introduce: an integral cell prints with no `.0` tail.
fn float_to_string(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 9_007_199_254_740_992.0 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}
