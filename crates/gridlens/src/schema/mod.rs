//! Field types, roles and statistics.

mod stats;
mod types;

pub use stats::{ColumnValues, FieldStats};
pub use types::{FieldRole, FieldType};
