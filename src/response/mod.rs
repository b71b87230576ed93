//! Response shaping for gridsql
//!
//! After the caller executes a `CompiledQuery`, the returned rows are
//! wrapped in a `RowsPage` the grid can consume.

mod page;
mod shaper;

pub use page::{last_row, Row, RowsPage, UNKNOWN_LAST_ROW};
pub use shaper::ResponseShaper;
