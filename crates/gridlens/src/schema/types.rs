//! Core type definitions for field classification.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Semantic type detected for a field's values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    /// Text values (also the fallback for mixed or empty columns).
    #[default]
    String,
    /// Numbers, native or numeric text.
    Number,
    /// Boolean values or `true`/`false` text.
    Boolean,
    /// Dates and date-times.
    Date,
}

impl FieldType {
    /// Returns true if this type is numeric.
    pub fn is_numeric(&self) -> bool {
        matches!(self, FieldType::Number)
    }

    /// Returns true if this type is temporal.
    pub fn is_temporal(&self) -> bool {
        matches!(self, FieldType::Date)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
            FieldType::Date => "date",
        };
        f.pad(name)
    }
}

/// Analytical role of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldRole {
    /// Categorical field used to group rows.
    #[default]
    Dimension,
    /// Quantitative field whose values are aggregated.
    Measure,
    /// Date/time field, typically a time-series axis.
    Temporal,
}

impl fmt::Display for FieldRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldRole::Dimension => "dimension",
            FieldRole::Measure => "measure",
            FieldRole::Temporal => "temporal",
        };
        f.pad(name)
    }
}

impl FromStr for FieldRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dimension" => Ok(FieldRole::Dimension),
            "measure" => Ok(FieldRole::Measure),
            "temporal" => Ok(FieldRole::Temporal),
            other => Err(format!("unknown field role '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        assert_eq!(FieldType::default(), FieldType::String);
        assert_eq!(FieldRole::default(), FieldRole::Dimension);
    }

    #[test]
    fn test_role_round_trips_through_text() {
        for role in [FieldRole::Dimension, FieldRole::Measure, FieldRole::Temporal] {
            assert_eq!(role.to_string().parse::<FieldRole>().unwrap(), role);
        }
        assert!("axis".parse::<FieldRole>().is_err());
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(serde_json::to_string(&FieldType::Boolean).unwrap(), "\"boolean\"");
        assert_eq!(serde_json::to_string(&FieldRole::Measure).unwrap(), "\"measure\"");
    }
}
