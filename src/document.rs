//! Structured document I/O.
//!
//! A settings document is a JSON array of records (objects). This layer only
//! cares about syntax: it loads and writes the array without knowing what the
//! records mean. Record keys keep their file order so a load/write cycle does
//! not reshuffle a hand-edited file.
//!
//! # Example
//!
//! ```rust,no_run
//! use mapsmith::document::Document;
//!
//! let doc = Document::load("cnf/baseWindow.json")?;
//! println!("{} records", doc.len());
//! doc.write("cnf/baseWindow.json")?;
//! # Ok::<(), mapsmith::Error>(())
//! ```

use std::fs;
use std::io::{Read, Write};
use std::path::Path;

use serde_json::{Map, Value};

use crate::{Error, Result};

/// A single key-value record of a document.
pub type Record = Map<String, Value>;

/// An ordered sequence of records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    records: Vec<Record>,
}

impl Document {
    /// Creates a document from records.
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    /// Loads a document from a file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read and
    /// [`Error::DocumentParse`] if it is not a JSON array of objects.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = fs::read(path.as_ref())?;
        Self::from_slice(&bytes)
    }

    /// Parses a document from a reader.
    pub fn from_reader(mut reader: impl Read) -> Result<Self> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Self::from_slice(&bytes)
    }

    /// Parses a document from bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let value: Value =
            serde_json::from_slice(bytes).map_err(|e| Error::DocumentParse(e.to_string()))?;
        Self::from_value(value)
    }

    /// Converts a JSON value into a document.
    ///
    /// The value must be an array whose elements are all objects.
    pub fn from_value(value: Value) -> Result<Self> {
        let Value::Array(items) = value else {
            return Err(Error::DocumentParse(format!(
                "expected an array of records, found {}",
                value_kind(&value)
            )));
        };

        let records = items
            .into_iter()
            .enumerate()
            .map(|(idx, item)| match item {
                Value::Object(map) => Ok(map),
                other => Err(Error::DocumentParse(format!(
                    "record {} is {}, expected an object",
                    idx,
                    value_kind(&other)
                ))),
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { records })
    }

    /// Converts the document back into a JSON value.
    pub fn to_value(&self) -> Value {
        Value::Array(self.records.iter().cloned().map(Value::Object).collect())
    }

    /// Writes the document to a file.
    ///
    /// The whole document is serialized first and written with a single
    /// call, so a serialization failure never truncates the target.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DocumentSerialize`] if serialization fails and
    /// [`Error::Io`] if the file cannot be written.
    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        let bytes = self.to_vec()?;
        fs::write(path.as_ref(), bytes)?;
        Ok(())
    }

    /// Serializes the document into a writer.
    pub fn to_writer(&self, mut writer: impl Write) -> Result<()> {
        let bytes = self.to_vec()?;
        writer.write_all(&bytes)?;
        Ok(())
    }

    /// Serializes the document to pretty-printed JSON bytes.
    pub fn to_vec(&self) -> Result<Vec<u8>> {
        let mut bytes = serde_json::to_vec_pretty(&self.records)
            .map_err(|e| Error::DocumentSerialize(e.to_string()))?;
        bytes.push(b'\n');
        Ok(bytes)
    }

    /// Returns the number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the document has no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns all records.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Returns the record at `index`.
    pub fn record(&self, index: usize) -> Option<&Record> {
        self.records.get(index)
    }

    /// Returns a mutable reference to the record at `index`.
    pub fn record_mut(&mut self, index: usize) -> Option<&mut Record> {
        self.records.get_mut(index)
    }

    /// Consumes the document and returns its records.
    pub fn into_records(self) -> Vec<Record> {
        self.records
    }
}

/// Returns a short description of a JSON value's type for error messages.
pub(crate) fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
