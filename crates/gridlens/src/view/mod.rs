//! Filtered and sorted views over rows.

mod filter;
mod sort;

pub use filter::{NumberOp, RowFilter, TextOp, filter_rows};
pub use sort::{KeyOrder, SortDirection, SortSpec, compare_keys, sort_keys, sort_rows};
