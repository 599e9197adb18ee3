//! CSV parameter-file parser
//!
//! The header row names the columns; every data row becomes a flat
//! string-to-string mapping in header order.

use crate::error::{ArtifactError, ArtifactResult};
use crate::parsers::{ArtifactFormat, ArtifactParser};
use serde_json::{Map, Value};
use std::path::Path;

/// CSV parser
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvParser;

impl CsvParser {
    /// Create new CSV parser
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ArtifactParser for CsvParser {
    fn format(&self) -> ArtifactFormat {
        ArtifactFormat::Csv
    }

    fn parse(&self, path: &Path, content: &str) -> ArtifactResult<Value> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(content.as_bytes());

        let headers = reader
            .headers()
            .map_err(|e| ArtifactError::format(path, format!("CSV header error: {e}")))?
            .clone();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record
                .map_err(|e| ArtifactError::format(path, format!("CSV row error: {e}")))?;

            let row: Map<String, Value> = headers
                .iter()
                .zip(record.iter())
                .map(|(column, cell)| (column.to_string(), Value::String(cell.to_string())))
                .collect();
            rows.push(Value::Object(row));
        }

        Ok(Value::Array(rows))
    }

    fn extensions(&self) -> &[&str] {
        &["csv"]
    }
}
