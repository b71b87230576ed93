//! Request model for gridsql
//!
//! Value types describing what the grid asks for: a page window, drill-down
//! state, value and pivot columns, per-column filters and sort order. They are
//! built fresh per request and never mutated by the compiler.

mod filter;
mod model;

pub use filter::{Filter, NumberOp, TextOp};
pub use model::{ColumnSpec, FilterMap, PivotValues, RowsRequest, SortDirection, SortSpec};
