//! Filter compilation
//!
//! Turns one column filter into a predicate. The bind values live inside the
//! predicate nodes, so a filter can never contribute a bind without also
//! contributing its placeholder.
//!
//! `None` means "always true": the filter contributes nothing to WHERE.

use serde::{Deserialize, Serialize};

use crate::observability::{log_event_with_fields, Event};
use crate::request::{Filter, FilterMap, NumberOp, TextOp};

use super::ast::{BindValue, CompareOp, Predicate};
use super::errors::{CompileError, CompileResult};

/// What to do with an operator outside the fixed per-kind set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownOperatorPolicy {
    /// Treat the filter as always true
    #[default]
    Ignore,
    /// Fail with a validation error
    Reject,
}

impl UnknownOperatorPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnknownOperatorPolicy::Ignore => "ignore",
            UnknownOperatorPolicy::Reject => "reject",
        }
    }
}

/// Compiles every filter in map order
pub fn compile_filters(
    filters: &FilterMap,
    policy: UnknownOperatorPolicy,
) -> CompileResult<Vec<Predicate>> {
    let mut predicates = Vec::with_capacity(filters.len());
    for (column, filter) in filters {
        if let Some(predicate) = compile_filter(column, filter, policy)? {
            predicates.push(predicate);
        }
    }
    Ok(predicates)
}

/// Compiles a single column filter
pub fn compile_filter(
    column: &str,
    filter: &Filter,
    policy: UnknownOperatorPolicy,
) -> CompileResult<Option<Predicate>> {
    if column.is_empty() {
        return Err(CompileError::EmptyIdentifier("filter column"));
    }

    match filter {
        Filter::Text { op, value } => text_filter(column, op, value.as_deref(), policy),
        Filter::Number {
            op,
            value,
            value_to,
        } => number_filter(column, op, value.as_ref(), value_to.as_ref(), policy),
        Filter::Set { values } => Ok(Some(Predicate::InList {
            column: column.to_string(),
            values: values.iter().map(|v| BindValue::from(v.as_str())).collect(),
        })),
    }
}

fn text_filter(
    column: &str,
    op: &TextOp,
    value: Option<&str>,
    policy: UnknownOperatorPolicy,
) -> CompileResult<Option<Predicate>> {
    let required = || {
        value.ok_or_else(|| CompileError::MissingFilterValue {
            column: column.to_string(),
            op: op.as_str().to_string(),
            missing: "a filter value",
        })
    };
    let like = |pattern: String, negated: bool| Predicate::Like {
        column: column.to_string(),
        pattern: pattern.into(),
        negated,
    };
    let compare = |op: CompareOp, value: &str| Predicate::Compare {
        column: column.to_string(),
        op,
        value: value.into(),
    };

    let predicate = match op {
        TextOp::Contains => like(format!("%{}%", required()?), false),
        TextOp::NotContains => like(format!("%{}%", required()?), true),
        TextOp::StartsWith => like(format!("{}%", required()?), false),
        TextOp::EndsWith => like(format!("%{}", required()?), false),
        TextOp::Equals => compare(CompareOp::Eq, required()?),
        TextOp::NotEqual => compare(CompareOp::NotEq, required()?),
        TextOp::Blank => Predicate::IsNull {
            column: column.to_string(),
            negated: false,
        },
        TextOp::NotBlank => Predicate::IsNull {
            column: column.to_string(),
            negated: true,
        },
        TextOp::Unknown(name) => return unknown_operator(column, "text", name, policy),
    };

    Ok(Some(predicate))
}

fn number_filter(
    column: &str,
    op: &NumberOp,
    value: Option<&serde_json::Number>,
    value_to: Option<&serde_json::Number>,
    policy: UnknownOperatorPolicy,
) -> CompileResult<Option<Predicate>> {
    let compare = match op {
        NumberOp::Equals => CompareOp::Eq,
        NumberOp::NotEqual => CompareOp::NotEq,
        NumberOp::LessThan => CompareOp::Lt,
        NumberOp::LessThanOrEqual => CompareOp::LtEq,
        NumberOp::GreaterThan => CompareOp::Gt,
        NumberOp::GreaterThanOrEqual => CompareOp::GtEq,
        NumberOp::InRange => {
            let (low, high) = match (value, value_to) {
                (Some(low), Some(high)) => (low, high),
                (None, _) => return Err(missing_number(column, op, "a filter value")),
                (_, None) => return Err(missing_number(column, op, "a filterTo value")),
            };
            return Ok(Some(Predicate::Between {
                column: column.to_string(),
                low: low.clone().into(),
                high: high.clone().into(),
            }));
        }
        NumberOp::Unknown(name) => return unknown_operator(column, "number", name, policy),
    };

    // `valueTo` only belongs to inRange; anywhere else it is ignored
    let value = value.ok_or_else(|| missing_number(column, op, "a filter value"))?;
    Ok(Some(Predicate::Compare {
        column: column.to_string(),
        op: compare,
        value: value.clone().into(),
    }))
}

fn missing_number(column: &str, op: &NumberOp, missing: &'static str) -> CompileError {
    CompileError::MissingFilterValue {
        column: column.to_string(),
        op: op.as_str().to_string(),
        missing,
    }
}

fn unknown_operator(
    column: &str,
    kind: &'static str,
    op: &str,
    policy: UnknownOperatorPolicy,
) -> CompileResult<Option<Predicate>> {
    match policy {
        UnknownOperatorPolicy::Ignore => {
            log_event_with_fields(
                Event::FilterIgnored,
                &[("column", column), ("kind", kind), ("op", op)],
            );
            Ok(None)
        }
        UnknownOperatorPolicy::Reject => Err(CompileError::UnknownOperator {
            column: column.to_string(),
            kind,
            op: op.to_string(),
        }),
    }
}
