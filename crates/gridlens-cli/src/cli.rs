//! CLI argument definitions using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use gridlens::{Aggregation, FieldRole};

/// GridLens: field profiling and pivot tables for tabular data
#[derive(Parser)]
#[command(name = "gridlens")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Detect the type and role of every field
    Analyze {
        /// Path to the data file (CSV/TSV/JSON)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Pin a field's role, e.g. `--role year=measure`
        #[arg(long, value_name = "FIELD=ROLE")]
        role: Vec<RoleOverride>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show statistics and distinct values of one field
    Stats {
        /// Path to the data file (CSV/TSV/JSON)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Field name
        #[arg(value_name = "FIELD")]
        field: String,

        /// Maximum distinct values to list
        #[arg(short, long, default_value = "20")]
        max: usize,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Build a pivot table
    Pivot {
        /// Path to the data file (CSV/TSV/JSON)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Row fields, outermost first
        #[arg(short, long, value_delimiter = ',')]
        rows: Vec<String>,

        /// Column fields, outermost first
        #[arg(short, long, value_delimiter = ',')]
        cols: Vec<String>,

        /// Value fields as `field:aggregation` (aggregation defaults to sum)
        #[arg(long = "value", value_name = "FIELD[:AGG]")]
        values: Vec<ValueSpec>,

        /// Calculated fields as `id=formula`
        #[arg(long = "calc", value_name = "ID=FORMULA")]
        calcs: Vec<CalcSpec>,

        /// Hide the row totals column
        #[arg(long)]
        no_row_totals: bool,

        /// Hide the column totals row
        #[arg(long)]
        no_col_totals: bool,

        /// Save the layout for this file's field set
        #[arg(long)]
        save: bool,

        /// Start from the layout saved for this file's field set
        #[arg(long, conflicts_with_all = ["rows", "cols", "values", "calcs"])]
        restore: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// `FIELD=ROLE` argument.
#[derive(Clone, Debug)]
pub struct RoleOverride {
    pub field: String,
    pub role: FieldRole,
}

impl std::str::FromStr for RoleOverride {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (field, role) = s
            .split_once('=')
            .ok_or_else(|| format!("Expected FIELD=ROLE, got '{}'", s))?;
        Ok(RoleOverride {
            field: field.trim().to_string(),
            role: role.parse()?,
        })
    }
}

/// `FIELD[:AGG]` argument.
#[derive(Clone, Debug)]
pub struct ValueSpec {
    pub field: String,
    pub aggregation: Aggregation,
}

impl std::str::FromStr for ValueSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.rsplit_once(':') {
            Some((field, agg)) if !field.is_empty() => Ok(ValueSpec {
                field: field.to_string(),
                aggregation: agg.parse()?,
            }),
            _ => Ok(ValueSpec {
                field: s.to_string(),
                aggregation: Aggregation::Sum,
            }),
        }
    }
}

/// `ID=FORMULA` argument.
#[derive(Clone, Debug)]
pub struct CalcSpec {
    pub id: String,
    pub formula: String,
}

impl std::str::FromStr for CalcSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('=') {
            Some((id, formula)) if !id.trim().is_empty() => Ok(CalcSpec {
                id: id.trim().to_string(),
                formula: formula.to_string(),
            }),
            _ => Err(format!("Expected ID=FORMULA, got '{}'", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_spec() {
        let spec: ValueSpec = "revenue:avg".parse().unwrap();
        assert_eq!(spec.field, "revenue");
        assert_eq!(spec.aggregation, Aggregation::Avg);

        let spec: ValueSpec = "units".parse().unwrap();
        assert_eq!(spec.aggregation, Aggregation::Sum);

        assert!("units:bogus".parse::<ValueSpec>().is_err());
    }

    #[test]
    fn test_calc_spec_keeps_formula_equals() {
        let spec: CalcSpec = "flag=IF(a = b, 1, 0)".parse().unwrap();
        assert_eq!(spec.id, "flag");
        assert_eq!(spec.formula, "IF(a = b, 1, 0)");
        assert!("=a+b".parse::<CalcSpec>().is_err());
    }

    #[test]
    fn test_role_override() {
        let o: RoleOverride = "year=measure".parse().unwrap();
        assert_eq!(o.field, "year");
        assert_eq!(o.role, FieldRole::Measure);
        assert!("year".parse::<RoleOverride>().is_err());
    }
}
