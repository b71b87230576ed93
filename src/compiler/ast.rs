//! SQL expression AST
//!
//! The compiler never concatenates SQL fragments directly. It builds these
//! nodes and hands the finished statement to a dialect renderer, which is
//! the only place that produces SQL text or placeholders.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::request::SortDirection;

use super::aggregate::AggregateFn;
use super::errors::{CompileError, CompileResult};

/// A value bound to a positional placeholder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BindValue {
    Number(serde_json::Number),
    Text(String),
}

impl BindValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            BindValue::Text(s) => Some(s),
            BindValue::Number(_) => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            BindValue::Number(n) => n.as_i64(),
            BindValue::Text(_) => None,
        }
    }
}

impl fmt::Display for BindValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindValue::Number(n) => write!(f, "{}", n),
            BindValue::Text(s) => write!(f, "{:?}", s),
        }
    }
}

impl From<&str> for BindValue {
    fn from(s: &str) -> Self {
        BindValue::Text(s.to_string())
    }
}

impl From<String> for BindValue {
    fn from(s: String) -> Self {
        BindValue::Text(s)
    }
}

impl From<serde_json::Number> for BindValue {
    fn from(n: serde_json::Number) -> Self {
        BindValue::Number(n)
    }
}

impl From<i32> for BindValue {
    fn from(n: i32) -> Self {
        BindValue::Number(n.into())
    }
}

impl From<i64> for BindValue {
    fn from(n: i64) -> Self {
        BindValue::Number(n.into())
    }
}

impl From<u64> for BindValue {
    fn from(n: u64) -> Self {
        BindValue::Number(n.into())
    }
}

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
}

impl CompareOp {
    pub fn as_sql(&self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::NotEq => "<>",
            CompareOp::Lt => "<",
            CompareOp::LtEq => "<=",
            CompareOp::Gt => ">",
            CompareOp::GtEq => ">=",
        }
    }
}

/// Boolean predicate
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// `column <op> ?`
    Compare {
        column: String,
        op: CompareOp,
        value: BindValue,
    },
    /// `column [NOT] LIKE ?`
    Like {
        column: String,
        pattern: BindValue,
        negated: bool,
    },
    /// `column IS [NOT] NULL`
    IsNull { column: String, negated: bool },
    /// `column IN (?, ...)`, or `column IN ('')` when `values` is empty
    InList {
        column: String,
        values: Vec<BindValue>,
    },
    /// `column BETWEEN ? AND ?`
    Between {
        column: String,
        low: BindValue,
        high: BindValue,
    },
    /// Conjunction of two or more predicates
    And(Vec<Predicate>),
}

impl Predicate {
    pub fn eq(column: impl Into<String>, value: impl Into<BindValue>) -> Self {
        Predicate::Compare {
            column: column.into(),
            op: CompareOp::Eq,
            value: value.into(),
        }
    }

    /// Conjunction of `predicates`, flattening nested conjunctions.
    ///
    /// Returns `None` for an empty input and the predicate itself for a
    /// single one.
    pub fn all(predicates: impl IntoIterator<Item = Predicate>) -> Option<Predicate> {
        let mut flat = Vec::new();
        for predicate in predicates {
            match predicate {
                Predicate::And(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }

        match flat.len() {
            0 => None,
            1 => flat.pop(),
            _ => Some(Predicate::And(flat)),
        }
    }

    /// Number of bind values this predicate consumes
    pub fn bind_count(&self) -> usize {
        match self {
            Predicate::Compare { .. } | Predicate::Like { .. } => 1,
            Predicate::IsNull { .. } => 0,
            Predicate::InList { values, .. } => values.len(),
            Predicate::Between { .. } => 2,
            Predicate::And(inner) => inner.iter().map(Predicate::bind_count).sum(),
        }
    }
}

/// Scalar expression
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Column(String),
    Null,
    Aggregate {
        func: AggregateFn,
        arg: Box<Expr>,
    },
    /// `CASE WHEN <when> THEN <then> ELSE <otherwise> END`
    Case {
        when: Predicate,
        then: Box<Expr>,
        otherwise: Box<Expr>,
    },
}

impl Expr {
    pub fn column(name: impl Into<String>) -> Self {
        Expr::Column(name.into())
    }

    pub fn aggregate(func: AggregateFn, arg: Expr) -> Self {
        Expr::Aggregate {
            func,
            arg: Box::new(arg),
        }
    }
}

/// One entry of the SELECT list
#[derive(Debug, Clone, PartialEq)]
pub struct SelectItem {
    pub expr: Expr,
    pub alias: Option<String>,
}

impl SelectItem {
    pub fn column(name: impl Into<String>) -> Self {
        Self {
            expr: Expr::column(name),
            alias: None,
        }
    }

    pub fn aliased(expr: Expr, alias: impl Into<String>) -> Self {
        Self {
            expr,
            alias: Some(alias.into()),
        }
    }
}

/// One ORDER BY entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderItem {
    pub column: String,
    pub direction: SortDirection,
}

/// Target table, optionally schema-qualified
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRef {
    pub schema: Option<String>,
    pub name: String,
}

impl TableRef {
    /// Parses `table` or `schema.table`
    pub fn parse(qualified: &str) -> CompileResult<Self> {
        let (schema, name) = match qualified.split_once('.') {
            Some((schema, name)) => (Some(schema.to_string()), name.to_string()),
            None => (None, qualified.to_string()),
        };

        if name.is_empty() || schema.as_deref() == Some("") {
            return Err(CompileError::EmptyIdentifier("table name"));
        }

        Ok(Self { schema, name })
    }
}

/// A complete paginated SELECT
#[derive(Debug, Clone, PartialEq)]
pub struct SelectStatement {
    pub items: Vec<SelectItem>,
    pub from: TableRef,
    pub filter: Option<Predicate>,
    pub group_by: Vec<String>,
    pub order_by: Vec<OrderItem>,
    pub offset: BindValue,
    pub fetch: BindValue,
}
