//! Row-group drill resolution
//!
//! A grouped grid is explored one level at a time. With `k` group keys
//! chosen so far, the query groups by the first `k + 1` row-group columns
//! and restricts the first `k` of them to the chosen keys.

use crate::request::{RowsRequest, SortSpec};

use super::ast::{OrderItem, Predicate};
use super::errors::{CompileError, CompileResult};

/// Active drill level of one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrillPath {
    row_groups: Vec<String>,
    group_keys: Vec<String>,
}

impl DrillPath {
    /// Resolves the drill path of `request`.
    ///
    /// Fails if a row-group column has an empty field or if more group keys
    /// are supplied than there are row-group columns.
    pub fn resolve(request: &RowsRequest) -> CompileResult<Self> {
        let row_groups: Vec<String> = request
            .row_group_cols
            .iter()
            .map(|col| col.field.clone())
            .collect();

        if row_groups.iter().any(String::is_empty) {
            return Err(CompileError::EmptyIdentifier("row group column"));
        }

        if request.group_keys.len() > row_groups.len() {
            return Err(CompileError::TooManyGroupKeys {
                keys: request.group_keys.len(),
                groups: row_groups.len(),
            });
        }

        Ok(Self {
            row_groups,
            group_keys: request.group_keys.clone(),
        })
    }

    /// Row-group fields in request order
    pub fn row_groups(&self) -> &[String] {
        &self.row_groups
    }

    pub fn group_keys(&self) -> &[String] {
        &self.group_keys
    }

    /// Number of group keys chosen so far
    pub fn depth(&self) -> usize {
        self.group_keys.len()
    }

    pub fn is_grouping(&self) -> bool {
        !self.row_groups.is_empty() && self.row_groups.len() >= self.group_keys.len()
    }

    /// Row groups revealed at this level: one deeper than the keys so far
    pub fn rows_to_include(&self) -> &[String] {
        let n = (self.group_keys.len() + 1).min(self.row_groups.len());
        &self.row_groups[..n]
    }

    /// `row_groups[i] = group_keys[i]` for every chosen key, in key order
    pub fn group_predicates(&self) -> Vec<Predicate> {
        self.row_groups
            .iter()
            .zip(&self.group_keys)
            .map(|(column, key)| Predicate::eq(column.as_str(), key.as_str()))
            .collect()
    }

    /// Sort entries that apply at this level.
    ///
    /// While grouping only row-group columns can be ordered, and at most
    /// `depth + 1` of them. Otherwise every entry applies in request order.
    pub fn order_items(&self, sort: &[SortSpec]) -> Vec<OrderItem> {
        let limit = if self.is_grouping() {
            self.depth() + 1
        } else {
            usize::MAX
        };

        sort.iter()
            .filter(|spec| !self.is_grouping() || self.row_groups.contains(&spec.column_id))
            .take(limit)
            .map(|spec| OrderItem {
                column: spec.column_id.clone(),
                direction: spec.direction,
            })
            .collect()
    }
}
