//! Pivot expansion
//!
//! Every pivot column contributes an axis of distinct values. One pivot
//! label exists per point of the cartesian product of the axes, and each
//! value column is aggregated once per label:
//!
//! ```text
//! sum(CASE WHEN ("quarter" = ? AND "region" = ?) THEN "sales" ELSE NULL END) AS "Q1_North_sales"
//! ```
//!
//! The product is generated once, as index tuples, and both the SELECT
//! expansion and the client's secondary column names read it.

use itertools::Itertools;

use crate::observability::{log_event_with_fields, Event};
use crate::request::{ColumnSpec, PivotValues};

use super::aggregate::AggregateFn;
use super::ast::{Expr, Predicate, SelectItem};
use super::errors::{CompileError, CompileResult};

/// One pivot column and its distinct values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PivotAxis<'a> {
    pub column: &'a str,
    pub values: &'a [String],
}

/// One point of the pivot product: a `(column, value)` pair per axis
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Combination<'a> {
    pairs: Vec<(&'a str, &'a str)>,
}

impl<'a> Combination<'a> {
    pub fn pairs(&self) -> &[(&'a str, &'a str)] {
        &self.pairs
    }

    /// Values joined with `_`, in axis order
    pub fn label(&self) -> String {
        self.pairs.iter().map(|(_, value)| *value).join("_")
    }

    /// Conjunction of `column = value` over every pair
    pub fn predicate(&self) -> Predicate {
        let mut predicates: Vec<Predicate> = self
            .pairs
            .iter()
            .map(|(column, value)| Predicate::eq(*column, *value))
            .collect();

        if predicates.len() == 1 {
            predicates.remove(0)
        } else {
            Predicate::And(predicates)
        }
    }
}

/// Pivot product over the request's pivot columns
#[derive(Debug, Clone)]
pub struct PivotExpander<'a> {
    axes: Vec<PivotAxis<'a>>,
    tuples: Vec<Vec<usize>>,
}

impl<'a> PivotExpander<'a> {
    /// Builds the axes in `pivot_cols` order.
    ///
    /// A pivot column with no entry in `pivot_values` becomes an empty axis,
    /// which empties the whole product.
    pub fn new(
        pivot_cols: &'a [ColumnSpec],
        pivot_values: &'a PivotValues,
    ) -> CompileResult<Self> {
        let mut axes = Vec::with_capacity(pivot_cols.len());

        for col in pivot_cols {
            if col.field.is_empty() {
                return Err(CompileError::EmptyIdentifier("pivot column"));
            }

            let values: &'a [String] = match pivot_values.get(&col.field) {
                Some(values) if !values.is_empty() => values.as_slice(),
                _ => {
                    log_event_with_fields(
                        Event::PivotValuesMissing,
                        &[("column", col.field.as_str())],
                    );
                    &[]
                }
            };

            axes.push(PivotAxis {
                column: &col.field,
                values,
            });
        }

        let tuples = index_tuples(&axes);
        Ok(Self { axes, tuples })
    }

    pub fn axes(&self) -> &[PivotAxis<'a>] {
        &self.axes
    }

    /// Number of pivot labels
    pub fn combination_count(&self) -> usize {
        self.tuples.len()
    }

    /// Every combination, first axis varying slowest
    pub fn combinations(&self) -> impl Iterator<Item = Combination<'a>> + '_ {
        self.tuples.iter().map(move |tuple| Combination {
            pairs: self
                .axes
                .iter()
                .zip(tuple)
                .map(|(axis, &i)| (axis.column, axis.values[i].as_str()))
                .collect(),
        })
    }

    /// Aggregated CASE expressions, one per combination and value column.
    ///
    /// Every value column must carry an aggregate.
    pub fn select_items(&self, value_cols: &[ColumnSpec]) -> CompileResult<Vec<SelectItem>> {
        let aggregates = value_cols
            .iter()
            .map(|col| {
                let name = col
                    .aggregate_name()
                    .ok_or_else(|| CompileError::MissingAggregate(col.field.clone()))?;
                AggregateFn::resolve(&col.field, name)
            })
            .collect::<CompileResult<Vec<_>>>()?;

        let mut items = Vec::with_capacity(self.combination_count() * value_cols.len());
        for combination in self.combinations() {
            let label = combination.label();
            for (col, func) in value_cols.iter().zip(&aggregates) {
                let case = Expr::Case {
                    when: combination.predicate(),
                    then: Box::new(Expr::column(col.field.as_str())),
                    otherwise: Box::new(Expr::Null),
                };
                items.push(SelectItem::aliased(
                    Expr::aggregate(*func, case),
                    format!("{}_{}", label, col.field),
                ));
            }
        }

        Ok(items)
    }

    /// Result column names the client sees, in SELECT expansion order
    pub fn secondary_columns(&self, value_cols: &[ColumnSpec]) -> Vec<String> {
        self.combinations()
            .flat_map(|combination| {
                let label = combination.label();
                value_cols
                    .iter()
                    .map(move |col| format!("{}_{}", label, col.field))
            })
            .collect()
    }
}

fn index_tuples(axes: &[PivotAxis<'_>]) -> Vec<Vec<usize>> {
    if axes.is_empty() || axes.iter().any(|axis| axis.values.is_empty()) {
        return Vec::new();
    }

    axes.iter()
        .map(|axis| 0..axis.values.len())
        .multi_cartesian_product()
        .collect()
}
