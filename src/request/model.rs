//! # Rows Request Model
//!
//! Immutable description of one server-side row model request. Every list
//! defaults to empty so a sparse request deserializes to "no such clause".

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::filter::Filter;

/// Distinct values of each pivot column, resolved by the caller
pub type PivotValues = IndexMap<String, Vec<String>>;

/// Column filters keyed by column id, in request order
pub type FilterMap = IndexMap<String, Filter>;

/// A value, row-group or pivot column reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSpec {
    /// Grid column id (informational)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Header text (informational)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    /// Underlying table column
    pub field: String,

    /// Aggregate function name, validated at compile time
    #[serde(rename = "aggFunc", default, skip_serializing_if = "Option::is_none")]
    pub aggregate_fn: Option<String>,
}

impl ColumnSpec {
    /// Column without aggregation
    pub fn field(field: impl Into<String>) -> Self {
        Self {
            id: None,
            display_name: None,
            field: field.into(),
            aggregate_fn: None,
        }
    }

    /// Column aggregated with the given function
    pub fn aggregated(aggregate_fn: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            aggregate_fn: Some(aggregate_fn.into()),
            ..Self::field(field)
        }
    }

    /// Aggregate name, treating an empty string as absent
    pub fn aggregate_name(&self) -> Option<&str> {
        self.aggregate_fn.as_deref().filter(|name| !name.is_empty())
    }
}

/// Sort direction
///
/// Deserialization is permissive: `"asc"` in any case is ascending, every
/// other string (including garbage) is descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn parse(s: &str) -> Self {
        if s.eq_ignore_ascii_case("asc") {
            SortDirection::Asc
        } else {
            SortDirection::Desc
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

impl From<String> for SortDirection {
    fn from(s: String) -> Self {
        SortDirection::parse(&s)
    }
}

impl From<SortDirection> for String {
    fn from(direction: SortDirection) -> Self {
        direction.as_str().to_string()
    }
}

/// Sort entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    #[serde(rename = "colId")]
    pub column_id: String,

    #[serde(rename = "sort")]
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn asc(column_id: impl Into<String>) -> Self {
        Self {
            column_id: column_id.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(column_id: impl Into<String>) -> Self {
        Self {
            column_id: column_id.into(),
            direction: SortDirection::Desc,
        }
    }
}

/// A server-side row model request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowsRequest {
    /// First row of the page (inclusive)
    pub start_row: i64,

    /// Last row of the page (inclusive)
    pub end_row: i64,

    #[serde(default)]
    pub row_group_cols: Vec<ColumnSpec>,

    #[serde(default)]
    pub value_cols: Vec<ColumnSpec>,

    #[serde(default)]
    pub pivot_cols: Vec<ColumnSpec>,

    #[serde(default)]
    pub pivot_mode: bool,

    /// Group values chosen so far while drilling down
    #[serde(default)]
    pub group_keys: Vec<String>,

    #[serde(rename = "filterModel", alias = "filters", default)]
    pub filters: FilterMap,

    #[serde(rename = "sortModel", alias = "sort", default)]
    pub sort: Vec<SortSpec>,
}

impl RowsRequest {
    /// Creates a request for the page `[start_row, end_row]`
    pub fn new(start_row: i64, end_row: i64) -> Self {
        Self {
            start_row,
            end_row,
            ..Default::default()
        }
    }

    pub fn with_row_group(mut self, column: ColumnSpec) -> Self {
        self.row_group_cols.push(column);
        self
    }

    pub fn with_value(mut self, column: ColumnSpec) -> Self {
        self.value_cols.push(column);
        self
    }

    /// Adds a pivot column and switches pivot mode on
    pub fn with_pivot(mut self, column: ColumnSpec) -> Self {
        self.pivot_cols.push(column);
        self.pivot_mode = true;
        self
    }

    pub fn with_group_key(mut self, key: impl Into<String>) -> Self {
        self.group_keys.push(key.into());
        self
    }

    /// Adds (or replaces, keeping its position) the filter on a column
    pub fn with_filter(mut self, column_id: impl Into<String>, filter: Filter) -> Self {
        self.filters.insert(column_id.into(), filter);
        self
    }

    pub fn with_sort(mut self, sort: SortSpec) -> Self {
        self.sort.push(sort);
        self
    }

    /// Number of rows the page asks for (`endRow - startRow + 1`).
    ///
    /// Saturates at `i64::MAX`; the compiler bounds the page before using it.
    pub fn page_size(&self) -> i64 {
        self.end_row
            .saturating_sub(self.start_row)
            .saturating_add(1)
    }

    /// True when pivot mode is on and there is something to pivot by
    pub fn pivots(&self) -> bool {
        self.pivot_mode && !self.pivot_cols.is_empty()
    }
}
