//! CLI command implementations.

pub mod analyze;
pub mod pivot;
pub mod stats;

use std::fs;
use std::path::Path;

use gridlens::{GridLens, ParserConfig};

/// Load a data file: JSON arrays by extension, everything else as
/// delimited text with auto-detection.
pub fn load(file: &Path) -> Result<GridLens, Box<dyn std::error::Error>> {
    if !file.exists() {
        return Err(format!("File not found: {}", file.display()).into());
    }

    let text = fs::read_to_string(file)?;
    let is_json = file
        .extension()
        .map(|e| e.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let lens = if is_json {
        GridLens::from_json(&text)?
    } else {
        let (lens, source) = GridLens::from_delimited(&text, ParserConfig::default())?;
        tracing::debug!(
            format = %source.format,
            rows = source.row_count,
            columns = source.column_count,
            "loaded data file"
        );
        lens
    };
    Ok(lens)
}
