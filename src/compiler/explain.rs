//! Compile explain output
//!
//! Produces a deterministic, human-readable summary of one compile.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::compiler::{CompileContext, CompileMode, CompiledQuery};
use super::render::Dialect;

/// Summary of how a request compiled
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileExplain {
    pub mode: CompileMode,
    pub dialect: Dialect,
    /// Row groups selected at this drill level
    pub active_row_groups: Vec<String>,
    /// Number of group keys chosen so far
    pub drill_depth: usize,
    /// Pivot labels generated (0 outside pivot mode)
    pub pivot_combinations: usize,
    pub placeholder_count: usize,
    pub bind_count: usize,
    pub sql: String,
}

impl CompileExplain {
    pub fn new(ctx: &CompileContext<'_>, query: &CompiledQuery, dialect: Dialect) -> Self {
        Self {
            mode: ctx.mode(),
            dialect,
            active_row_groups: ctx.drill.rows_to_include().to_vec(),
            drill_depth: ctx.drill.depth(),
            pivot_combinations: ctx
                .pivot
                .as_ref()
                .map_or(0, |expander| expander.combination_count()),
            placeholder_count: query.placeholder_count(dialect),
            bind_count: query.binds.len(),
            sql: query.sql.clone(),
        }
    }
}

impl fmt::Display for CompileExplain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== COMPILE EXPLAIN ===")?;
        writeln!(f, "Mode: {}", self.mode.as_str())?;
        writeln!(f, "Dialect: {}", self.dialect.as_str())?;
        if !self.active_row_groups.is_empty() {
            writeln!(f, "Row Groups: {}", self.active_row_groups.join(", "))?;
            writeln!(f, "Drill Depth: {}", self.drill_depth)?;
        }
        if self.mode == CompileMode::Pivot {
            writeln!(f, "Pivot Combinations: {}", self.pivot_combinations)?;
        }
        writeln!(
            f,
            "Placeholders: {} ({} binds)",
            self.placeholder_count, self.bind_count
        )?;
        writeln!(f, "SQL: {}", self.sql)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::QueryCompiler;
    use crate::config::CompilerConfig;
    use crate::request::{ColumnSpec, PivotValues, RowsRequest};

    fn pivot_request() -> (RowsRequest, PivotValues) {
        let request = RowsRequest::new(0, 9)
            .with_row_group(ColumnSpec::field("region"))
            .with_pivot(ColumnSpec::field("quarter"))
            .with_value(ColumnSpec::aggregated("sum", "sales"));
        let mut pivot_values = PivotValues::new();
        pivot_values.insert("quarter".into(), vec!["Q1".into(), "Q2".into(), "Q3".into()]);
        (request, pivot_values)
    }

    #[test]
    fn test_explain_pivot() {
        let (request, pivot_values) = pivot_request();
        let explain = QueryCompiler::default()
            .explain(&request, "sales_data", &pivot_values)
            .unwrap();

        assert_eq!(explain.mode, CompileMode::Pivot);
        assert_eq!(explain.active_row_groups, vec!["region"]);
        assert_eq!(explain.drill_depth, 0);
        assert_eq!(explain.pivot_combinations, 3);
        // 3 pivot values + offset + fetch
        assert_eq!(explain.bind_count, 5);
        assert_eq!(explain.placeholder_count, explain.bind_count);

        let output = format!("{}", explain);
        assert!(output.contains("Mode: pivot"));
        assert!(output.contains("Pivot Combinations: 3"));
    }

    #[test]
    fn test_explain_flat_omits_pivot_line() {
        let explain = QueryCompiler::new(CompilerConfig::default())
            .explain(&RowsRequest::new(0, 9), "t", &PivotValues::new())
            .unwrap();

        assert_eq!(explain.mode, CompileMode::Flat);
        let output = format!("{}", explain);
        assert!(!output.contains("Pivot"));
        assert!(!output.contains("Row Groups"));
    }

    #[test]
    fn test_explain_deterministic() {
        let (request, pivot_values) = pivot_request();
        let compiler = QueryCompiler::default();

        let first = format!("{}", compiler.explain(&request, "t", &pivot_values).unwrap());
        let second = format!("{}", compiler.explain(&request, "t", &pivot_values).unwrap());
        assert_eq!(first, second);
    }

    #[test]
    fn test_explain_serializes() {
        let explain = QueryCompiler::default()
            .explain(&RowsRequest::new(0, 9), "t", &PivotValues::new())
            .unwrap();
        let json = serde_json::to_value(&explain).unwrap();
        assert_eq!(json["mode"], "flat");
        assert_eq!(json["dialect"], "ansi");
        assert_eq!(json["placeholder_count"], 2);
    }
}
