//! # Column Filters
//!
//! Filter model for a single grid column, in the AG-Grid wire shape:
//!
//! ```json
//! {"filterType": "text",   "type": "contains", "filter": "nor"}
//! {"filterType": "number", "type": "inRange",  "filter": 10, "filterTo": 20}
//! {"filterType": "set",    "values": ["North", "South"]}
//! ```
//!
//! Operators deserialize permissively: an operator name the compiler does not
//! know survives as `Unknown(name)` so the compiler can decide whether to
//! ignore or reject it.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// Text filter operators
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TextOp {
    Contains,
    NotContains,
    Equals,
    NotEqual,
    StartsWith,
    EndsWith,
    /// `IS NULL`, takes no value
    Blank,
    /// `IS NOT NULL`, takes no value
    NotBlank,
    Unknown(String),
}

impl TextOp {
    /// Returns the wire name of this operator
    pub fn as_str(&self) -> &str {
        match self {
            TextOp::Contains => "contains",
            TextOp::NotContains => "notContains",
            TextOp::Equals => "equals",
            TextOp::NotEqual => "notEqual",
            TextOp::StartsWith => "startsWith",
            TextOp::EndsWith => "endsWith",
            TextOp::Blank => "blank",
            TextOp::NotBlank => "notBlank",
            TextOp::Unknown(name) => name,
        }
    }

    /// Returns true if the operator consumes a filter value
    pub fn takes_value(&self) -> bool {
        !matches!(self, TextOp::Blank | TextOp::NotBlank | TextOp::Unknown(_))
    }
}

impl From<String> for TextOp {
    fn from(name: String) -> Self {
        match name.as_str() {
            "contains" => TextOp::Contains,
            "notContains" => TextOp::NotContains,
            "equals" => TextOp::Equals,
            "notEqual" => TextOp::NotEqual,
            "startsWith" => TextOp::StartsWith,
            "endsWith" => TextOp::EndsWith,
            "blank" => TextOp::Blank,
            "notBlank" => TextOp::NotBlank,
            _ => TextOp::Unknown(name),
        }
    }
}

impl From<TextOp> for String {
    fn from(op: TextOp) -> Self {
        op.as_str().to_string()
    }
}

/// Number filter operators
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NumberOp {
    Equals,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    /// `BETWEEN value AND valueTo`
    InRange,
    Unknown(String),
}

impl NumberOp {
    /// Returns the wire name of this operator
    pub fn as_str(&self) -> &str {
        match self {
            NumberOp::Equals => "equals",
            NumberOp::NotEqual => "notEqual",
            NumberOp::LessThan => "lessThan",
            NumberOp::LessThanOrEqual => "lessThanOrEqual",
            NumberOp::GreaterThan => "greaterThan",
            NumberOp::GreaterThanOrEqual => "greaterThanOrEqual",
            NumberOp::InRange => "inRange",
            NumberOp::Unknown(name) => name,
        }
    }
}

impl From<String> for NumberOp {
    fn from(name: String) -> Self {
        match name.as_str() {
            "equals" => NumberOp::Equals,
            "notEqual" => NumberOp::NotEqual,
            "lessThan" => NumberOp::LessThan,
            "lessThanOrEqual" => NumberOp::LessThanOrEqual,
            "greaterThan" => NumberOp::GreaterThan,
            "greaterThanOrEqual" => NumberOp::GreaterThanOrEqual,
            "inRange" => NumberOp::InRange,
            _ => NumberOp::Unknown(name),
        }
    }
}

impl From<NumberOp> for String {
    fn from(op: NumberOp) -> Self {
        op.as_str().to_string()
    }
}

/// A filter on one column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "filterType", rename_all = "lowercase")]
pub enum Filter {
    Text {
        #[serde(rename = "type")]
        op: TextOp,

        /// Absent for `blank` / `notBlank`
        #[serde(rename = "filter", default, skip_serializing_if = "Option::is_none")]
        value: Option<String>,
    },

    Number {
        #[serde(rename = "type")]
        op: NumberOp,

        #[serde(rename = "filter", default, skip_serializing_if = "Option::is_none")]
        value: Option<serde_json::Number>,

        /// Upper bound, only meaningful for `inRange`
        #[serde(rename = "filterTo", default, skip_serializing_if = "Option::is_none")]
        value_to: Option<serde_json::Number>,
    },

    Set {
        #[serde(default)]
        values: IndexSet<String>,
    },
}

impl Filter {
    /// Create a text filter
    pub fn text(op: TextOp, value: impl Into<String>) -> Self {
        Filter::Text {
            op,
            value: Some(value.into()),
        }
    }

    /// Create a text filter that takes no value (`blank` / `notBlank`)
    pub fn text_unary(op: TextOp) -> Self {
        Filter::Text { op, value: None }
    }

    /// Create a single-value number filter
    pub fn number(op: NumberOp, value: impl Into<serde_json::Number>) -> Self {
        Filter::Number {
            op,
            value: Some(value.into()),
            value_to: None,
        }
    }

    /// Create an `inRange` number filter
    pub fn number_range(
        from: impl Into<serde_json::Number>,
        to: impl Into<serde_json::Number>,
    ) -> Self {
        Filter::Number {
            op: NumberOp::InRange,
            value: Some(from.into()),
            value_to: Some(to.into()),
        }
    }

    /// Create a set filter; duplicates collapse, first occurrence wins
    pub fn set<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Filter::Set {
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns the filter kind as it appears on the wire
    pub fn kind(&self) -> &'static str {
        match self {
            Filter::Text { .. } => "text",
            Filter::Number { .. } => "number",
            Filter::Set { .. } => "set",
        }
    }
}
