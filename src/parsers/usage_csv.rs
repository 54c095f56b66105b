//! Usage export CSV parser
//!
//! Columns are resolved by header name once, then applied to every row.
//! Rows are evaluated independently into a [`RowOutcome`]; a bad row is
//! skipped with a recorded reason and never aborts the parse.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;

use super::csv::{clean_cell, split_line};
use crate::types::{Result, UsageLog, UsageRecord};

const COLUMN_COUNT: usize = 10;

/// Logical columns of a usage export
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Date,
    Kind,
    Model,
    MaxMode,
    InputCacheWrite,
    InputNoCacheWrite,
    CacheRead,
    OutputTokens,
    TotalTokens,
    Cost,
}

impl Column {
    pub const ALL: [Column; COLUMN_COUNT] = [
        Column::Date,
        Column::Kind,
        Column::Model,
        Column::MaxMode,
        Column::InputCacheWrite,
        Column::InputNoCacheWrite,
        Column::CacheRead,
        Column::OutputTokens,
        Column::TotalTokens,
        Column::Cost,
    ];

    /// Exact header text in the export
    pub fn header(self) -> &'static str {
        match self {
            Self::Date => "Date",
            Self::Kind => "Kind",
            Self::Model => "Model",
            Self::MaxMode => "Max Mode",
            Self::InputCacheWrite => "Input (w/ Cache Write)",
            Self::InputNoCacheWrite => "Input (w/o Cache Write)",
            Self::CacheRead => "Cache Read",
            Self::OutputTokens => "Output Tokens",
            Self::TotalTokens => "Total Tokens",
            Self::Cost => "Cost",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Header positions for each logical column (`None` = not found)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    positions: [Option<usize>; COLUMN_COUNT],
}

impl ColumnMap {
    /// Resolve columns by exact (cleaned) header name; first match wins
    pub fn from_headers(headers: &[String]) -> Self {
        let mut positions = [None; COLUMN_COUNT];
        for column in Column::ALL {
            positions[column.index()] = headers.iter().position(|h| h == column.header());
        }
        Self { positions }
    }

    pub fn position(&self, column: Column) -> Option<usize> {
        self.positions[column.index()]
    }

    /// Columns that were not found in the header row
    pub fn missing(&self) -> Vec<Column> {
        Column::ALL
            .into_iter()
            .filter(|c| self.position(*c).is_none())
            .collect()
    }

    /// Cell for `column`, or "" when the column is missing or the row is short
    fn cell<'a>(&self, column: Column, values: &'a [String]) -> &'a str {
        self.position(column)
            .and_then(|i| values.get(i))
            .map(String::as_str)
            .unwrap_or("")
    }
}

/// Why a data row was not turned into a record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SkipReason {
    /// Fewer fields than headers
    ShortRow { expected: usize, found: usize },
    /// Date cell empty or not a calendar timestamp
    InvalidDate { value: String },
}

/// Result of evaluating one data row
#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    Accepted(UsageRecord),
    Skipped(SkipReason),
}

/// A rejected row with its position among the non-blank lines (header = 0)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRow {
    pub line: usize,
    pub reason: SkipReason,
}

/// Accepted records (sorted by date) plus skipped-row diagnostics
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseReport {
    pub records: Vec<UsageRecord>,
    pub skipped: Vec<SkippedRow>,
}

impl ParseReport {
    /// Turn into a non-empty log, or `NoValidRecords`
    pub fn into_log(self) -> Result<UsageLog> {
        UsageLog::new(self.records)
    }
}

/// Parser for usage export text
#[derive(Debug, Clone, Copy, Default)]
pub struct UsageCsvParser;

impl UsageCsvParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse full file text.
    ///
    /// Needs a header plus at least one data row after blank lines are
    /// dropped; otherwise the report is empty.
    pub fn parse(&self, text: &str) -> ParseReport {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
        if lines.len() < 2 {
            tracing::debug!(lines = lines.len(), "not enough lines for header + data");
            return ParseReport::default();
        }

        let headers: Vec<String> = split_line(lines[0])
            .iter()
            .map(|h| clean_cell(h).to_string())
            .collect();
        let columns = ColumnMap::from_headers(&headers);
        let missing = columns.missing();
        if !missing.is_empty() {
            tracing::debug!(?missing, "columns not found, using defaults");
        }

        let mut report = ParseReport::default();
        for (line_no, line) in lines.iter().enumerate().skip(1) {
            match self.parse_row(line_no, line, headers.len(), &columns) {
                RowOutcome::Accepted(record) => report.records.push(record),
                RowOutcome::Skipped(reason) => {
                    match &reason {
                        SkipReason::ShortRow { expected, found } => {
                            tracing::debug!(
                                line = line_no,
                                expected,
                                found,
                                "skipping short row"
                            );
                        }
                        SkipReason::InvalidDate { value } => {
                            tracing::warn!(
                                line = line_no,
                                value = %value,
                                "skipping row with invalid date"
                            );
                        }
                    }
                    report.skipped.push(SkippedRow {
                        line: line_no,
                        reason,
                    });
                }
            }
        }

        report.records.sort_by_key(|r| r.date);
        tracing::debug!(
            accepted = report.records.len(),
            skipped = report.skipped.len(),
            "parsed usage export"
        );
        report
    }

    /// Evaluate one data row against the resolved columns
    pub fn parse_row(
        &self,
        line_no: usize,
        line: &str,
        header_count: usize,
        columns: &ColumnMap,
    ) -> RowOutcome {
        let values: Vec<String> = split_line(line)
            .iter()
            .map(|v| clean_cell(v).to_string())
            .collect();

        if values.len() < header_count {
            return RowOutcome::Skipped(SkipReason::ShortRow {
                expected: header_count,
                found: values.len(),
            });
        }

        let date_cell = columns.cell(Column::Date, &values);
        let Some(date) = parse_date(date_cell) else {
            return RowOutcome::Skipped(SkipReason::InvalidDate {
                value: date_cell.to_string(),
            });
        };

        RowOutcome::Accepted(UsageRecord {
            id: format!("row-{}", line_no),
            date,
            kind: columns.cell(Column::Kind, &values).to_string(),
            model: columns.cell(Column::Model, &values).to_string(),
            max_mode: columns.cell(Column::MaxMode, &values) == "Yes",
            input_cache_write: coerce_tokens(columns.cell(Column::InputCacheWrite, &values)),
            input_no_cache_write: coerce_tokens(columns.cell(Column::InputNoCacheWrite, &values)),
            cache_read: coerce_tokens(columns.cell(Column::CacheRead, &values)),
            output_tokens: coerce_tokens(columns.cell(Column::OutputTokens, &values)),
            total_tokens: coerce_tokens(columns.cell(Column::TotalTokens, &values)),
            cost: coerce_cost(columns.cell(Column::Cost, &values)),
        })
    }
}

/// Parse text into date-sorted records; empty when nothing validates
pub fn parse_usage_csv(text: &str) -> Vec<UsageRecord> {
    UsageCsvParser::new().parse(text).records
}

/// Parse text into a non-empty log, or `NoValidRecords`
pub fn load_usage_log(text: &str) -> Result<UsageLog> {
    UsageCsvParser::new().parse(text).into_log()
}

const OFFSET_DATETIME_FORMATS: [&str; 2] = [
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
];

const NAIVE_DATETIME_FORMATS: [&str; 11] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%b %d, %Y %H:%M:%S",
];

const NAIVE_DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%b %d, %Y"];

/// Parse a date cell into a UTC instant.
///
/// Offsets are honored; naive date-times and bare dates are taken as UTC.
pub fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(value) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in OFFSET_DATETIME_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(value, format) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc());
        }
    }
    for format in NAIVE_DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
        }
    }
    None
}

/// Integer coercion for token cells.
///
/// Takes the leading run of digits after an optional `+` (`"10.7"` -> 10).
/// Blank, non-numeric, or negative cells yield 0; overflow saturates.
pub fn coerce_tokens(value: &str) -> u64 {
    let value = value.trim();
    let digits = value.strip_prefix('+').unwrap_or(value);
    digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0u64, |acc, b| {
            acc.saturating_mul(10).saturating_add(u64::from(b - b'0'))
        })
}

/// Decimal coercion for cost cells.
///
/// Takes the leading decimal number (`"2.5 USD"` -> 2.5, `"1,250.00"` -> 1).
/// No leading number, negative or non-finite -> 0.0.
pub fn coerce_cost(value: &str) -> f64 {
    decimal_prefix(value.trim())
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
        .unwrap_or(0.0)
}

/// Longest prefix shaped like `[+-]digits[.digits][e[+-]digits]`
fn decimal_prefix(value: &str) -> &str {
    let bytes = value.as_bytes();
    let digits_from = |start: usize| {
        bytes[start..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count()
    };

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let int_digits = digits_from(end);
    end += int_digits;

    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = digits_from(end + 1);
        if int_digits > 0 || frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }
    if int_digits == 0 && frac_digits == 0 {
        return "";
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let sign = usize::from(matches!(bytes.get(end + 1), Some(b'+' | b'-')));
        let exp_digits = digits_from(end + 1 + sign);
        if exp_digits > 0 {
            end += 1 + sign + exp_digits;
        }
    }
    &value[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::sync::{Arc, Mutex};

    const HEADER: &str = "Date,Kind,Model,Max Mode,Input (w/ Cache Write),Input (w/o Cache Write),Cache Read,Output Tokens,Total Tokens,Cost";

    fn csv(rows: &[&str]) -> String {
        let mut text = String::from(HEADER);
        for row in rows {
            text.push('\n');
            text.push_str(row);
        }
        text
    }

    /// Collects formatted log output written by a test subscriber
    #[derive(Clone, Default)]
    struct LogCapture(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for LogCapture {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl LogCapture {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    // ========== parse() tests ==========

    #[test]
    fn test_parse_reference_scenario() {
        let text = csv(&[
            "2024-01-01,chat,gpt-4,No,10,5,0,20,35,0.50",
            "2024-01-02,chat,gpt-4,Yes,0,0,0,0,0,bad",
        ]);
        let records = parse_usage_csv(&text);

        assert_eq!(records.len(), 2);
        let first = &records[0];
        assert_eq!(first.date, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(first.kind, "chat");
        assert_eq!(first.model, "gpt-4");
        assert!(!first.max_mode);
        assert_eq!(first.input_cache_write, 10);
        assert_eq!(first.input_no_cache_write, 5);
        assert_eq!(first.cache_read, 0);
        assert_eq!(first.output_tokens, 20);
        assert_eq!(first.total_tokens, 35);
        assert!((first.cost - 0.50).abs() < f64::EPSILON);

        let second = &records[1];
        assert!(second.max_mode);
        assert!((second.cost - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parse_header_only_is_empty() {
        assert!(parse_usage_csv(HEADER).is_empty());
        assert!(parse_usage_csv(&format!("{}\n\n   \n", HEADER)).is_empty());
        assert!(parse_usage_csv("").is_empty());
    }

    #[test]
    fn test_parse_short_row_skipped_others_kept() {
        let text = csv(&[
            "2024-01-01,chat,gpt-4,No,10,5,0,20,35,0.50",
            "2024-01-02,chat,gpt-4",
            "2024-01-03,chat,claude,No,1,1,1,1,4,0.10",
        ]);
        let report = UsageCsvParser::new().parse(&text);

        assert_eq!(report.records.len(), 2);
        assert_eq!(
            report.skipped,
            vec![SkippedRow {
                line: 2,
                reason: SkipReason::ShortRow {
                    expected: 10,
                    found: 3
                },
            }]
        );
    }

    #[test]
    fn test_parse_invalid_date_excluded() {
        let text = csv(&[
            ",chat,gpt-4,No,1,1,1,1,4,0.10",
            "yesterday,chat,gpt-4,No,1,1,1,1,4,0.10",
            "2024-02-30,chat,gpt-4,No,1,1,1,1,4,0.10",
            "2024-01-03,chat,gpt-4,No,1,1,1,1,4,0.10",
        ]);
        let report = UsageCsvParser::new().parse(&text);

        assert_eq!(report.records.len(), 1);
        assert_eq!(report.records[0].id, "row-4");
        let reasons: Vec<&SkipReason> = report.skipped.iter().map(|s| &s.reason).collect();
        assert_eq!(
            reasons,
            vec![
                &SkipReason::InvalidDate { value: "".into() },
                &SkipReason::InvalidDate {
                    value: "yesterday".into()
                },
                &SkipReason::InvalidDate {
                    value: "2024-02-30".into()
                },
            ]
        );
    }

    #[test]
    fn test_parse_empty_numeric_defaults_to_zero() {
        let text = csv(&["2024-01-01,chat,gpt-4,No,,5,,20,,"]);
        let records = parse_usage_csv(&text);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].input_cache_write, 0);
        assert_eq!(records[0].input_no_cache_write, 5);
        assert_eq!(records[0].cache_read, 0);
        assert_eq!(records[0].total_tokens, 0);
        assert!((records[0].cost - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parse_sorted_by_date() {
        let text = csv(&[
            "2024-03-01,chat,a,No,1,1,1,1,4,0.10",
            "2024-01-01,chat,a,No,1,1,1,1,4,0.10",
            "2024-02-01T12:00:00Z,chat,a,No,1,1,1,1,4,0.10",
        ]);
        let records = parse_usage_csv(&text);

        assert_eq!(records.len(), 3);
        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["row-2", "row-3", "row-1"]);
    }

    #[test]
    fn test_parse_header_order_independent() {
        let original = csv(&[
            "2024-01-01,chat,gpt-4,No,10,5,0,20,35,0.50",
            "2024-01-02,agent,claude,Yes,1,2,3,4,10,1.25",
        ]);
        let permuted = "Cost,Model,Total Tokens,Date,Output Tokens,Kind,Cache Read,Max Mode,Input (w/o Cache Write),Input (w/ Cache Write)\n\
             0.50,gpt-4,35,2024-01-01,20,chat,0,No,5,10\n\
             1.25,claude,10,2024-01-02,4,agent,3,Yes,2,1";

        assert_eq!(parse_usage_csv(&original), parse_usage_csv(permuted));
    }

    #[test]
    fn test_parse_quoted_headers_and_values() {
        let text = "\"Date\",\"Kind\",\"Model\",\"Max Mode\",\"Input (w/ Cache Write)\",\"Input (w/o Cache Write)\",\"Cache Read\",\"Output Tokens\",\"Total Tokens\",\"Cost\"\r\n\
             \"2024-01-01T08:30:00.000Z\",\"Included in Pro\",\"claude-4-sonnet, thinking\",\"Yes\",\"1,200\",\"5\",\"0\",\"20\",\"1225\",\"0.50\"\r\n";
        let records = parse_usage_csv(text);

        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.kind, "Included in Pro");
        assert_eq!(record.model, "claude-4-sonnet, thinking");
        assert!(record.max_mode);
        // Leading digits only, no thousands-separator handling
        assert_eq!(record.input_cache_write, 1);
        assert_eq!(record.total_tokens, 1225);
        assert_eq!(
            record.date,
            Utc.with_ymd_and_hms(2024, 1, 1, 8, 30, 0).unwrap()
        );
    }

    #[test]
    fn test_parse_missing_column_uses_defaults() {
        let text = "Date,Model,Cost\n2024-01-01,gpt-4,0.75";
        let report = UsageCsvParser::new().parse(text);

        assert_eq!(report.records.len(), 1);
        let record = &report.records[0];
        assert_eq!(record.kind, "");
        assert!(!record.max_mode);
        assert_eq!(record.total_tokens, 0);
        assert!((record.cost - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parse_missing_date_column_rejects_all() {
        let text = "Kind,Model,Cost\nchat,gpt-4,0.75";
        assert!(load_usage_log(text).is_err());
    }

    #[test]
    fn test_parse_row_ids_unique() {
        let text = csv(&[
            "2024-01-01,chat,a,No,1,1,1,1,4,0.10",
            "2024-01-01,chat,a,No,1,1,1,1,4,0.10",
            "2024-01-01,chat,a,No,1,1,1,1,4,0.10",
        ]);
        let records = parse_usage_csv(&text);
        let mut ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        ids.dedup();
        assert_eq!(ids.len(), 3);
    }

    #[test]
    fn test_parse_extra_fields_allowed() {
        let text = csv(&["2024-01-01,chat,a,No,1,1,1,1,4,0.10,extra"]);
        assert_eq!(parse_usage_csv(&text).len(), 1);
    }

    #[test]
    fn test_parse_strips_bom() {
        let text = format!("\u{feff}{}", csv(&["2024-01-01,chat,a,No,1,1,1,1,4,0.10"]));
        assert_eq!(parse_usage_csv(&text).len(), 1);
    }

    #[test]
    fn test_load_usage_log_no_valid_records() {
        let err = load_usage_log(HEADER).unwrap_err();
        assert!(matches!(err, crate::types::TokdashError::NoValidRecords));
    }

    // ========== ColumnMap tests ==========

    #[test]
    fn test_column_map_not_found() {
        let headers: Vec<String> = vec!["Date".into(), "Cost".into()];
        let map = ColumnMap::from_headers(&headers);

        assert_eq!(map.position(Column::Date), Some(0));
        assert_eq!(map.position(Column::Cost), Some(1));
        assert_eq!(map.position(Column::Model), None);
        assert_eq!(map.missing().len(), 8);
    }

    #[test]
    fn test_column_headers_exact() {
        assert_eq!(Column::MaxMode.header(), "Max Mode");
        assert_eq!(Column::InputCacheWrite.header(), "Input (w/ Cache Write)");
        assert_eq!(Column::InputNoCacheWrite.header(), "Input (w/o Cache Write)");
    }

    // ========== parse_date() tests ==========

    #[test]
    fn test_parse_invalid_date_logs_warning() {
        let capture = LogCapture::default();
        let writer = capture.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_max_level(tracing::Level::WARN)
            .with_ansi(false)
            .finish();

        let text = csv(&[
            "not-a-date,chat,gpt-4,No,1,1,1,1,4,0.10",
            "2024-01-03,chat,gpt-4",
            "2024-01-03,chat,gpt-4,No,1,1,1,1,4,0.10",
        ]);
        let report = tracing::subscriber::with_default(subscriber, || {
            UsageCsvParser::new().parse(&text)
        });

        assert_eq!(report.records.len(), 1);
        let logged = capture.contents();
        assert_eq!(logged.lines().count(), 1);
        assert!(logged.contains("WARN"));
        assert!(logged.contains("skipping row with invalid date"));
        assert!(logged.contains("value=not-a-date"));
        assert!(logged.contains("line=1"));
    }

    #[test]
    fn test_parse_date_forms() {
        let expected = Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap();
        assert_eq!(parse_date("2024-05-06T07:08:09Z"), Some(expected));
        assert_eq!(parse_date("2024-05-06T09:08:09+02:00"), Some(expected));
        assert_eq!(parse_date("2024-05-06 07:08:09"), Some(expected));
        assert_eq!(parse_date("2024-05-06T07:08:09"), Some(expected));
        assert_eq!(parse_date("Mon, 06 May 2024 07:08:09 +0000"), Some(expected));
        assert_eq!(parse_date("2024-05-06T07:08:09+0000"), Some(expected));
        assert_eq!(parse_date("2024-05-06T12:38:09.000+0530"), Some(expected));
        assert_eq!(parse_date("2024-05-06 07:08:09+0000"), Some(expected));
        assert_eq!(parse_date("05/06/2024 07:08:09"), Some(expected));
        assert_eq!(parse_date("May 06, 2024 07:08:09"), Some(expected));

        let midnight = Utc.with_ymd_and_hms(2024, 5, 6, 0, 0, 0).unwrap();
        assert_eq!(parse_date("2024/05/06"), Some(midnight));
        assert_eq!(parse_date("05/06/2024"), Some(midnight));
        assert_eq!(parse_date("5/6/2024"), Some(midnight));
        assert_eq!(parse_date("May 6, 2024"), Some(midnight));
    }

    #[test]
    fn test_parse_row_us_and_offset_dates_kept() {
        let text = csv(&[
            "2024-01-15T10:00:00+0000,chat,gpt-4,No,1,1,1,1,4,0.10",
            "01/15/2024,chat,gpt-4,No,1,1,1,1,4,0.10",
            "\"Jan 15, 2024\",chat,gpt-4,No,1,1,1,1,4,0.10",
        ]);
        let report = UsageCsvParser::new().parse(&text);

        assert!(report.skipped.is_empty());
        assert_eq!(report.records.len(), 3);
        assert!(report
            .records
            .iter()
            .all(|r| r.day() == NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()));
    }

    #[test]
    fn test_parse_date_fractional_seconds() {
        let parsed = parse_date("2024-05-06 07:08:09.250").unwrap();
        assert_eq!(parsed.timestamp_subsec_millis(), 250);
    }

    #[test]
    fn test_parse_date_invalid() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("   "), None);
        assert_eq!(parse_date("not a date"), None);
        assert_eq!(parse_date("2024-13-01"), None);
    }

    // ========== coercion tests ==========

    #[test]
    fn test_coerce_tokens() {
        assert_eq!(coerce_tokens("42"), 42);
        assert_eq!(coerce_tokens(" 42 "), 42);
        assert_eq!(coerce_tokens("+7"), 7);
        assert_eq!(coerce_tokens("10.7"), 10);
        assert_eq!(coerce_tokens("12abc"), 12);
        assert_eq!(coerce_tokens(""), 0);
        assert_eq!(coerce_tokens("abc"), 0);
        assert_eq!(coerce_tokens("-5"), 0);
        assert_eq!(coerce_tokens("99999999999999999999999"), u64::MAX);
    }

    #[test]
    fn test_coerce_cost() {
        assert!((coerce_cost("0.50") - 0.50).abs() < f64::EPSILON);
        assert!((coerce_cost(" 3 ") - 3.0).abs() < f64::EPSILON);
        assert!((coerce_cost("bad") - 0.0).abs() < f64::EPSILON);
        assert!((coerce_cost("") - 0.0).abs() < f64::EPSILON);
        assert!((coerce_cost("-1.5") - 0.0).abs() < f64::EPSILON);
        assert!((coerce_cost("NaN") - 0.0).abs() < f64::EPSILON);
        assert!((coerce_cost("inf") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_coerce_cost_numeric_prefix() {
        assert!((coerce_cost("0.50abc") - 0.50).abs() < f64::EPSILON);
        assert!((coerce_cost("2.5 USD") - 2.5).abs() < f64::EPSILON);
        assert!((coerce_cost("1,200") - 1.0).abs() < f64::EPSILON);
        assert!((coerce_cost(".25") - 0.25).abs() < f64::EPSILON);
        assert!((coerce_cost("3.") - 3.0).abs() < f64::EPSILON);
        assert!((coerce_cost("1.5e2x") - 150.0).abs() < f64::EPSILON);
        assert!((coerce_cost("7e") - 7.0).abs() < f64::EPSILON);
        assert!((coerce_cost("+4") - 4.0).abs() < f64::EPSILON);
        assert!((coerce_cost(".") - 0.0).abs() < f64::EPSILON);
        assert!((coerce_cost("$5") - 0.0).abs() < f64::EPSILON);
        assert!((coerce_cost("-2.5 USD") - 0.0).abs() < f64::EPSILON);
        assert!((coerce_cost("1e999") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parse_quoted_cost_with_thousands_separator() {
        let text = csv(&["2024-01-03,chat,gpt-4,No,1,1,1,1,4,\"1,250.00\""]);
        let records = parse_usage_csv(&text);

        assert_eq!(records.len(), 1);
        assert!((records[0].cost - 1.0).abs() < f64::EPSILON);
    }
}
