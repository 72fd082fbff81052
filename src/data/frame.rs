//! Minimal string-celled table with CSV I/O.

use std::fs::{self, File};
use std::io;
use std::path::Path;

use crate::{Error, Result};

/// Named columns of string cells, row-major
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TabularFrame {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl TabularFrame {
    /// Create a frame, checking that every row matches the header width
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self> {
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != columns.len()) {
            return Err(Error::Data(format!(
                "row {i} has {} cells, header has {}",
                row.len(),
                columns.len()
            )));
        }
        Ok(Self { columns, rows })
    }

    /// Parse CSV text with a header line
    pub fn from_csv_str(text: &str) -> Result<Self> {
        Self::from_reader(text.as_bytes())
    }

    /// Parse CSV from any reader; the first record is the header
    ///
    /// Quoted fields may contain separators, quotes and newlines. Lines with
    /// no bytes at all are skipped; a one-column row holding an empty cell
    /// must be written as `""`, which `to_writer` does.
    pub fn from_reader<R: io::Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);
        let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        if columns.is_empty() {
            return Err(Error::Data("CSV input is empty".into()));
        }
        let rows = reader
            .records()
            .map(|record| -> Result<Vec<String>> { Ok(record?.iter().map(str::to_string).collect()) })
            .collect::<Result<Vec<Vec<String>>>>()?;
        Self::new(columns, rows)
    }

    /// Read a CSV file
    pub fn read_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref()).map_err(|e| {
            Error::Data(format!("Failed to read {}: {e}", path.as_ref().display()))
        })?;
        Self::from_reader(io::BufReader::new(file))
    }

    /// Write CSV to any writer, header first
    pub fn to_writer<W: io::Write>(&self, writer: W) -> Result<()> {
        let mut writer = csv::Writer::from_writer(writer);
        writer.write_record(&self.columns)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Render as CSV text
    pub fn to_csv_string(&self) -> Result<String> {
        let mut buf = Vec::new();
        self.to_writer(&mut buf)?;
        String::from_utf8(buf).map_err(|e| Error::Data(format!("CSV output is not UTF-8: {e}")))
    }

    /// Write a CSV file, creating parent directories
    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        self.to_writer(io::BufWriter::new(File::create(path)?))
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    /// Position of a named column
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Cells of one column, top to bottom
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &str> {
        self.rows.iter().map(move |r| r[index].as_str())
    }

    /// Keep only the given rows, in the given order
    #[must_use]
    pub fn select_rows(&self, indices: &[usize]) -> Self {
        Self {
            columns: self.columns.clone(),
            rows: indices.iter().map(|&i| self.rows[i].clone()).collect(),
        }
    }
}
