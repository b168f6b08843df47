//! CSV tables
//!
//! Typed helpers for the fixed ESCO/Tabiya schemas, and an untyped [`Table`]
//! for passes that only touch a few named columns and must carry every other
//! column through unchanged (lineage, denormalization).

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Result, TabiyaError};

/// Read typed records from a CSV file with a header row.
///
/// `limit` keeps only the first `limit` records (used for sample exports).
pub fn read_records<T: DeserializeOwned>(path: &Path, limit: Option<usize>) -> Result<Vec<T>> {
    let file = File::open(path)?;
    read_records_from(file, limit)
}

pub fn read_records_from<T: DeserializeOwned, R: Read>(
    reader: R,
    limit: Option<usize>,
) -> Result<Vec<T>> {
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let mut records = Vec::new();
    for result in rdr.deserialize() {
        if limit.is_some_and(|max| records.len() >= max) {
            break;
        }
        records.push(result?);
    }
    Ok(records)
}

/// A row type written as one CSV line.
///
/// `COLUMNS` lists the serialized field names in order. It is the header of
/// a table with no rows, so that every written table can be read back.
pub trait CsvRecord: Serialize {
    const COLUMNS: &'static [&'static str];
}

/// Write typed records with a header row derived from the record type
pub fn write_records<T: CsvRecord>(path: &Path, records: &[T]) -> Result<()> {
    let file = File::create(path)?;
    write_records_to(file, records)
}

pub fn write_records_to<T: CsvRecord, W: Write>(writer: W, records: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    if records.is_empty() {
        wtr.write_record(T::COLUMNS)?;
    }
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Header plus string rows, every row padded to the header width
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    pub fn read(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
        let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
        let mut table = Self::new(headers);
        for record in rdr.records() {
            let record = record?;
            table.push_row(record.iter().map(str::to_string).collect())?;
        }
        Ok(table)
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let file = File::create(path)?;
        self.to_writer(file)
    }

    pub fn to_writer<W: Write>(&self, writer: W) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        if !self.headers.is_empty() {
            wtr.write_record(&self.headers)?;
        }
        for row in &self.rows {
            wtr.write_record(row)?;
        }
        wtr.flush()?;
        Ok(())
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn rows_mut(&mut self) -> &mut [Vec<String>] {
        &mut self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// No header and no rows, as read from a 0-byte file
    pub fn is_blank(&self) -> bool {
        self.headers.is_empty() && self.rows.is_empty()
    }

    /// Append a row, padding it to the header width.
    ///
    /// Trailing empty cells past the last column are dropped. A row with
    /// data past the last column is rejected.
    pub fn push_row(&mut self, mut row: Vec<String>) -> Result<()> {
        let width = self.headers.len();
        if row.len() > width {
            if row[width..].iter().any(|cell| !cell.is_empty()) {
                return Err(TabiyaError::RowTooWide {
                    row: self.rows.len() + 1,
                    fields: row.len(),
                    columns: width,
                });
            }
            row.truncate(width);
        }
        row.resize(width, String::new());
        self.rows.push(row);
        Ok(())
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Like [`Table::column_index`] but a missing column is an error
    pub fn require_column(&self, name: &str, table: &str) -> Result<usize> {
        self.column_index(name).ok_or_else(|| TabiyaError::MissingColumn {
            column: name.to_string(),
            table: table.to_string(),
        })
    }

    /// Index of `name`, appending an empty column if it does not exist yet
    pub fn ensure_column(&mut self, name: &str) -> usize {
        if let Some(idx) = self.column_index(name) {
            return idx;
        }
        self.headers.push(name.to_string());
        for row in &mut self.rows {
            row.push(String::new());
        }
        self.headers.len() - 1
    }

    /// Cell value by row number and column name
    pub fn get(&self, row: usize, column: &str) -> Option<&str> {
        let idx = self.column_index(column)?;
        self.rows.get(row).map(|r| r[idx].as_str())
    }
}
