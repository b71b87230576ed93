//! Compiler error types
//!
//! Every error is either a `Validation` error (the request itself is
//! malformed) or a `Configuration` error (the request names something the
//! compiler refuses to render, such as an aggregate outside the allow-list).

use std::fmt;

use thiserror::Error;

/// Broad error category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Configuration,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "VALIDATION",
            ErrorKind::Configuration => "CONFIGURATION",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result type for compile operations
pub type CompileResult<T> = Result<T, CompileError>;

/// Compile errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    // ==================
    // Validation
    // ==================
    /// Page window is inverted or starts before row 0
    #[error("Invalid row window: startRow={start_row}, endRow={end_row}")]
    InvalidWindow { start_row: i64, end_row: i64 },

    /// Page larger than the configured maximum
    #[error("Page size {size} exceeds maximum {max}")]
    PageTooLarge { size: u64, max: u64 },

    /// More group keys than row-group columns
    #[error("{keys} group keys supplied for {groups} row group columns")]
    TooManyGroupKeys { keys: usize, groups: usize },

    /// Empty table or column identifier
    #[error("Empty identifier in {0}")]
    EmptyIdentifier(&'static str),

    /// Filter operator that needs a value arrived without one
    #[error("Filter '{op}' on column '{column}' requires {missing}")]
    MissingFilterValue {
        column: String,
        op: String,
        missing: &'static str,
    },

    /// Operator outside the fixed per-kind set, under the reject policy
    #[error("Unknown {kind} filter operator '{op}' on column '{column}'")]
    UnknownOperator {
        column: String,
        kind: &'static str,
        op: String,
    },

    // ==================
    // Configuration
    // ==================
    /// Aggregate function outside the allow-list
    #[error("Unsupported aggregate function '{func}' on column '{column}'")]
    UnsupportedAggregate { column: String, func: String },

    /// Pivot expansion over a value column with no aggregate
    #[error("Pivot value column '{0}' requires an aggregate function")]
    MissingAggregate(String),
}

impl CompileError {
    /// Returns the error category
    pub fn kind(&self) -> ErrorKind {
        match self {
            CompileError::UnsupportedAggregate { .. } | CompileError::MissingAggregate(_) => {
                ErrorKind::Configuration
            }
            _ => ErrorKind::Validation,
        }
    }

    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            CompileError::InvalidWindow { .. } => "GRIDSQL_INVALID_WINDOW",
            CompileError::PageTooLarge { .. } => "GRIDSQL_PAGE_TOO_LARGE",
            CompileError::TooManyGroupKeys { .. } => "GRIDSQL_TOO_MANY_GROUP_KEYS",
            CompileError::EmptyIdentifier(_) => "GRIDSQL_EMPTY_IDENTIFIER",
            CompileError::MissingFilterValue { .. } => "GRIDSQL_MISSING_FILTER_VALUE",
            CompileError::UnknownOperator { .. } => "GRIDSQL_UNKNOWN_OPERATOR",
            CompileError::UnsupportedAggregate { .. } => "GRIDSQL_UNSUPPORTED_AGGREGATE",
            CompileError::MissingAggregate(_) => "GRIDSQL_MISSING_AGGREGATE",
        }
    }

    pub fn is_validation(&self) -> bool {
        self.kind() == ErrorKind::Validation
    }

    pub fn is_configuration(&self) -> bool {
        self.kind() == ErrorKind::Configuration
    }
}
