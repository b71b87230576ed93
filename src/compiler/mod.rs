//! Query compiler subsystem for gridsql
//!
//! Turns a server-side row model request into one parameterized SQL
//! statement and its binds.
//!
//! # Pipeline
//!
//! 1. `CompileContext::new` validates the request and resolves the drill
//!    path and pivot product
//! 2. Clause builders produce a `SelectStatement` AST
//! 3. The dialect renderer writes SQL text and binds in one pass
//!
//! # Bind Order
//!
//! Pivot values (SELECT), group keys and filter values (WHERE), then
//! offset and fetch. The Nth placeholder always pairs with the Nth bind.

mod aggregate;
mod ast;
mod clauses;
mod compiler;
mod errors;
mod explain;
mod filters;
mod grouping;
mod pivot;
mod render;

pub use aggregate::AggregateFn;
pub use ast::{
    BindValue, CompareOp, Expr, OrderItem, Predicate, SelectItem, SelectStatement, TableRef,
};
pub use compiler::{CompileContext, CompileMode, CompiledQuery, QueryCompiler};
pub use errors::{CompileError, CompileResult, ErrorKind};
pub use explain::CompileExplain;
pub use filters::{compile_filter, compile_filters, UnknownOperatorPolicy};
pub use grouping::DrillPath;
pub use pivot::{Combination, PivotAxis, PivotExpander};
pub use render::{render, Dialect, SqlWriter};
