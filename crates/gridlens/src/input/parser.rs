//! Delimited-text and JSON row loaders with delimiter detection.

use std::io::{BufRead, BufReader, Read};

use sha2::{Digest, Sha256};

use crate::error::{GridLensError, Result};
use super::source::SourceMetadata;
use super::value::{Row, Value, parse_bool, parse_date, parse_number};

/// Delimiters to try when auto-detecting.
const DELIMITERS: &[u8] = &[b'\t', b',', b';', b'|'];

/// Parser configuration.
#[derive(Debug, Clone)]
pub struct ParserConfig {
    /// Delimiter to use (None = auto-detect).
    pub delimiter: Option<u8>,
    /// Whether the data has a header row.
    pub has_header: bool,
    /// Maximum rows to read (None = all).
    pub max_rows: Option<usize>,
    /// Quote character.
    pub quote: u8,
    /// Convert date-looking cells to native dates instead of text.
    pub coerce_dates: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            delimiter: None,
            has_header: true,
            max_rows: None,
            quote: b'"',
            coerce_dates: false,
        }
    }
}

/// Parses tabular text into rows.
pub struct Parser {
    config: ParserConfig,
}

impl Parser {
    /// Create a new parser with default configuration.
    pub fn new() -> Self {
        Self {
            config: ParserConfig::default(),
        }
    }

    /// Create a parser with custom configuration.
    pub fn with_config(config: ParserConfig) -> Self {
        Self { config }
    }

    /// Read all input from `reader` and parse it as delimited text.
    pub fn parse_reader(&self, mut reader: impl Read) -> Result<(Vec<Row>, SourceMetadata)> {
        let mut contents = Vec::new();
        reader.read_to_end(&mut contents)?;
        self.parse_bytes(&contents)
    }

    /// Parse delimited text held in a string.
    pub fn parse_str(&self, text: &str) -> Result<(Vec<Row>, SourceMetadata)> {
        self.parse_bytes(text.as_bytes())
    }

    /// Parse delimited bytes.
    pub fn parse_bytes(&self, contents: &[u8]) -> Result<(Vec<Row>, SourceMetadata)> {
        let delimiter = match self.config.delimiter {
            Some(d) => d,
            None => detect_delimiter(contents)?,
        };
        if delimiter == self.config.quote || delimiter == b'\n' || delimiter == b'\r' {
            return Err(GridLensError::InvalidDelimiter(format!(
                "{:?} cannot separate fields",
                delimiter as char
            )));
        }

        let (headers, rows) = self.read_records(contents, delimiter)?;

        let format = match delimiter {
            b'\t' => "tsv",
            b',' => "csv",
            b';' => "csv-semicolon",
            b'|' => "psv",
            _ => "delimited",
        };

        let metadata = SourceMetadata::new(content_hash(contents), format, rows.len(), headers.len());
        tracing::debug!(
            format,
            rows = metadata.row_count,
            columns = metadata.column_count,
            "parsed delimited input"
        );

        Ok((rows, metadata))
    }

    fn read_records(&self, bytes: &[u8], delimiter: u8) -> Result<(Vec<String>, Vec<Row>)> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(self.config.has_header)
            .quote(self.config.quote)
            .flexible(true)
            .from_reader(bytes);

        let headers: Vec<String> = if self.config.has_header {
            reader.headers()?.iter().map(|s| s.trim().to_string()).collect()
        } else {
            let mut probe = csv::ReaderBuilder::new()
                .delimiter(delimiter)
                .has_headers(false)
                .quote(self.config.quote)
                .flexible(true)
                .from_reader(bytes);
            match probe.records().next() {
                Some(Ok(record)) => (0..record.len())
                    .map(|i| format!("column_{}", i + 1))
                    .collect(),
                Some(Err(e)) => return Err(e.into()),
                None => return Err(GridLensError::EmptyData("No data rows found".to_string())),
            }
        };

        if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
            return Err(GridLensError::EmptyData("No columns found".to_string()));
        }

        let mut rows = Vec::new();
        for (row_idx, result) in reader.records().enumerate() {
            if let Some(max) = self.config.max_rows {
                if row_idx >= max {
                    break;
                }
            }

            let record = result?;
            if record.len() > headers.len() && record.iter().skip(headers.len()).any(|c| !c.is_empty()) {
                return Err(GridLensError::Parse {
                    row: row_idx + 1,
                    column: headers.len() + 1,
                    message: format!(
                        "expected {} fields, found {}",
                        headers.len(),
                        record.len()
                    ),
                });
            }

            // Short records pad with nulls so every row shares the field set.
            let row: Row = headers
                .iter()
                .enumerate()
                .map(|(i, h)| (h.clone(), self.coerce_cell(record.get(i).unwrap_or(""))))
                .collect();
            rows.push(row);
        }

        Ok((headers, rows))
    }

    fn coerce_cell(&self, raw: &str) -> Value {
        coerce_text(raw, self.config.coerce_dates)
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert a raw text cell into the narrowest scalar it represents.
pub fn coerce_text(raw: &str, coerce_dates: bool) -> Value {
    if raw.trim().is_empty() {
        return Value::Null;
    }
    if let Some(n) = parse_number(raw) {
        return Value::Number(n);
    }
    if let Some(b) = parse_bool(raw) {
        return Value::Bool(b);
    }
    if coerce_dates {
        if let Some(d) = parse_date(raw) {
            return Value::Date(d);
        }
    }
    Value::Text(raw.to_string())
}

/// Parse a JSON array of objects into rows.
///
/// Object key order is preserved. Keys missing from later rows simply read as
/// null when looked up.
pub fn rows_from_json(text: &str) -> Result<Vec<Row>> {
    let parsed: Vec<indexmap::IndexMap<String, serde_json::Value>> = serde_json::from_str(text)?;
    Ok(parsed
        .into_iter()
        .map(|obj| obj.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
        .collect())
}

fn content_hash(contents: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(contents);
    format!("sha256:{:x}", hasher.finalize())
}

/// Detect the delimiter by analyzing the first few lines.
fn detect_delimiter(bytes: &[u8]) -> Result<u8> {
    let reader = BufReader::new(bytes);
    let lines: Vec<String> = reader
        .lines()
        .take(10)
        .filter_map(|l| l.ok())
        .filter(|l| !l.trim().is_empty())
        .collect();

    if lines.is_empty() {
        return Err(GridLensError::EmptyData("No lines to analyze".to_string()));
    }

    let mut best_delimiter = b',';
    let mut best_score = 0;

    for &delim in DELIMITERS {
        let counts: Vec<usize> = lines
            .iter()
            .map(|line| count_delimiter_in_line(line, delim))
            .collect();

        let first_count = counts[0];
        if first_count == 0 {
            continue;
        }

        let consistent = counts.iter().all(|&c| c == first_count);
        let variance: f64 = if counts.len() > 1 {
            let mean = counts.iter().sum::<usize>() as f64 / counts.len() as f64;
            counts.iter().map(|&c| (c as f64 - mean).powi(2)).sum::<f64>() / counts.len() as f64
        } else {
            0.0
        };

        // Higher count with lower variance wins; tab breaks ties.
        let score = if consistent {
            first_count * 1000 + (if delim == b'\t' { 100 } else { 0 })
        } else if variance < 1.0 {
            first_count * 100
        } else {
            first_count
        };

        if score > best_score {
            best_score = score;
            best_delimiter = delim;
        }
    }

    Ok(best_delimiter)
}

/// Count delimiter occurrences in a line, respecting quotes.
fn count_delimiter_in_line(line: &str, delimiter: u8) -> usize {
    let delim_char = delimiter as char;
    let mut count = 0;
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            c if c == delim_char && !in_quotes => count += 1,
            _ => {}
        }
    }

    count
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_delimiter_csv() {
        let data = b"a,b,c\n1,2,3\n4,5,6";
        assert_eq!(detect_delimiter(data).unwrap(), b',');
    }

    #[test]
    fn test_detect_delimiter_tsv() {
        let data = b"a\tb\tc\n1\t2\t3\n4\t5\t6";
        assert_eq!(detect_delimiter(data).unwrap(), b'\t');
    }

    #[test]
    fn test_detect_delimiter_ignores_quoted_commas() {
        let data = b"name;note\n\"Smith, J\";x\n\"Doe, A\";y";
        assert_eq!(detect_delimiter(data).unwrap(), b';');
    }

    #[test]
    fn test_parse_csv_coerces_scalars() {
        let parser = Parser::new();
        let (rows, meta) = parser
            .parse_str("name,age,active,joined\nAlice,30,true,2024-01-02\nBob,,false,\n")
            .unwrap();

        assert_eq!(meta.format, "csv");
        assert_eq!(meta.row_count, 2);
        assert_eq!(meta.column_count, 4);
        assert_eq!(rows[0]["name"], Value::from("Alice"));
        assert_eq!(rows[0]["age"], Value::Number(30.0));
        assert_eq!(rows[0]["active"], Value::Bool(true));
        assert_eq!(rows[0]["joined"], Value::from("2024-01-02"));
        assert_eq!(rows[1]["age"], Value::Null);
        assert_eq!(rows[1]["joined"], Value::Null);
    }

    #[test]
    fn test_parse_coerce_dates() {
        let parser = Parser::with_config(ParserConfig {
            coerce_dates: true,
            ..ParserConfig::default()
        });
        let (rows, _) = parser.parse_str("d\n2024-01-02\n").unwrap();
        assert!(matches!(rows[0]["d"], Value::Date(_)));
    }

    #[test]
    fn test_short_records_are_padded() {
        let (rows, _) = Parser::new().parse_str("a,b,c\n1,2\n").unwrap();
        assert_eq!(rows[0].len(), 3);
        assert_eq!(rows[0]["c"], Value::Null);
    }

    #[test]
    fn test_header_only_input_has_no_rows() {
        let (rows, meta) = Parser::new().parse_str("a,b\n").unwrap();
        assert!(rows.is_empty());
        assert_eq!(meta.column_count, 2);
    }

    #[test]
    fn test_invalid_delimiter_rejected() {
        let parser = Parser::with_config(ParserConfig {
            delimiter: Some(b'"'),
            ..ParserConfig::default()
        });
        assert!(matches!(
            parser.parse_str("a\n1\n"),
            Err(GridLensError::InvalidDelimiter(_))
        ));
    }

    #[test]
    fn test_empty_input_is_error() {
        assert!(Parser::new().parse_str("").is_err());
    }

    #[test]
    fn test_rows_from_json() {
        let rows = rows_from_json(r#"[{"region": "East", "sales": 10}, {"region": null, "sales": 2.5}]"#)
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["sales"], Value::Number(10.0));
        assert_eq!(rows[1]["region"], Value::Null);
        assert_eq!(rows[0].keys().collect::<Vec<_>>(), vec!["region", "sales"]);
    }

    #[test]
    fn test_hash_is_stable() {
        let (_, a) = Parser::new().parse_str("a\n1\n").unwrap();
        let (_, b) = Parser::new().parse_str("a\n1\n").unwrap();
        assert_eq!(a.hash, b.hash);
        assert!(a.hash.starts_with("sha256:"));
    }
}
