//! gridsql - compiles server-side row model requests into parameterized SQL
//!
//! A request describes a page of a data grid: its row window, row-group
//! drill path, value and pivot columns, filters and sort order. The
//! compiler turns it into one SQL statement plus binds; the response
//! shaper turns executed rows back into a page the grid understands.
//!
//! ```ignore
//! use gridsql::compiler::QueryCompiler;
//! use gridsql::request::{ColumnSpec, PivotValues, RowsRequest};
//!
//! let request = RowsRequest::new(0, 10)
//!     .with_value(ColumnSpec::field("region"))
//!     .with_value(ColumnSpec::field("sales"));
//! let query = QueryCompiler::default().compile(&request, "sales_data", &PivotValues::new())?;
//! ```

pub mod cli;
pub mod compiler;
pub mod config;
pub mod observability;
pub mod request;
pub mod response;
