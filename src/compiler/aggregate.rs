//! Aggregate function allow-list
//!
//! Aggregate names arrive as free text from the grid. Only names in this
//! list ever reach SQL text.

use std::fmt;

use super::errors::{CompileError, CompileResult};

/// Supported aggregate functions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateFn {
    Sum,
    Avg,
    Count,
    Min,
    Max,
}

impl AggregateFn {
    /// Resolves an aggregate name (case-insensitive) for `column`
    pub fn resolve(column: &str, name: &str) -> CompileResult<Self> {
        match name.to_ascii_lowercase().as_str() {
            "sum" => Ok(AggregateFn::Sum),
            "avg" => Ok(AggregateFn::Avg),
            "count" => Ok(AggregateFn::Count),
            "min" => Ok(AggregateFn::Min),
            "max" => Ok(AggregateFn::Max),
            _ => Err(CompileError::UnsupportedAggregate {
                column: column.to_string(),
                func: name.to_string(),
            }),
        }
    }

    /// SQL function name
    pub fn as_str(&self) -> &'static str {
        match self {
            AggregateFn::Sum => "sum",
            AggregateFn::Avg => "avg",
            AggregateFn::Count => "count",
            AggregateFn::Min => "min",
            AggregateFn::Max => "max",
        }
    }
}

impl fmt::Display for AggregateFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
