//! Parsers for usage export files

pub mod csv;
mod usage_csv;

pub use usage_csv::{
    coerce_cost, coerce_tokens, load_usage_log, parse_date, parse_usage_csv, Column, ColumnMap,
    ParseReport, RowOutcome, SkipReason, SkippedRow, UsageCsvParser,
};

use crate::types::Result;
use std::path::Path;

impl UsageCsvParser {
    /// Read and parse a whole export file.
    ///
    /// The file is read in one shot; I/O failure is the only error here,
    /// an export with no valid rows yields an empty report.
    pub fn parse_file(&self, path: &Path) -> Result<ParseReport> {
        let text = std::fs::read_to_string(path)?;
        Ok(self.parse(&text))
    }
}
