//! Clause builders
//!
//! Each builder reads the per-call `CompileContext` and returns AST nodes.
//! None of them render SQL.

use crate::request::ColumnSpec;

use super::aggregate::AggregateFn;
use super::ast::{Expr, OrderItem, Predicate, SelectItem, SelectStatement};
use super::compiler::CompileContext;
use super::errors::CompileResult;
use super::filters::compile_filters;

/// SELECT list for the context's mode.
///
/// - Pivoting at the top level: the raw pivot columns
/// - Pivoting below it: the included row groups, then the pivot expansion
/// - Otherwise: the included row groups, then each value column
pub fn select_list(ctx: &CompileContext<'_>) -> CompileResult<Vec<SelectItem>> {
    let groups = ctx
        .drill
        .rows_to_include()
        .iter()
        .map(|column| SelectItem::column(column.as_str()));

    match &ctx.pivot {
        Some(_) if ctx.drill.rows_to_include().is_empty() => Ok(ctx
            .request
            .pivot_cols
            .iter()
            .map(|col| SelectItem::column(col.field.as_str()))
            .collect()),
        Some(expander) => {
            let mut items: Vec<SelectItem> = groups.collect();
            items.extend(expander.select_items(&ctx.request.value_cols)?);
            Ok(items)
        }
        None => {
            let mut items: Vec<SelectItem> = groups.collect();
            for col in &ctx.request.value_cols {
                items.push(value_item(col)?);
            }
            Ok(items)
        }
    }
}

/// `field`, or `agg(field) AS field`
fn value_item(col: &ColumnSpec) -> CompileResult<SelectItem> {
    match col.aggregate_name() {
        None => Ok(SelectItem::column(col.field.as_str())),
        Some(name) => {
            let func = AggregateFn::resolve(&col.field, name)?;
            Ok(SelectItem::aliased(
                Expr::aggregate(func, Expr::column(col.field.as_str())),
                col.field.as_str(),
            ))
        }
    }
}

/// Group-key predicates followed by filter predicates, ANDed
pub fn where_clause(ctx: &CompileContext<'_>) -> CompileResult<Option<Predicate>> {
    let mut predicates = ctx.drill.group_predicates();
    predicates.extend(compile_filters(&ctx.request.filters, ctx.policy)?);
    Ok(Predicate::all(predicates))
}

pub fn group_by(ctx: &CompileContext<'_>) -> Vec<String> {
    if ctx.drill.is_grouping() {
        ctx.drill.rows_to_include().to_vec()
    } else {
        Vec::new()
    }
}

pub fn order_by(ctx: &CompileContext<'_>) -> Vec<OrderItem> {
    ctx.drill.order_items(&ctx.request.sort)
}

/// Assembles the full paginated statement
pub fn statement(ctx: &CompileContext<'_>) -> CompileResult<SelectStatement> {
    Ok(SelectStatement {
        items: select_list(ctx)?,
        from: ctx.table.clone(),
        filter: where_clause(ctx)?,
        group_by: group_by(ctx),
        order_by: order_by(ctx),
        offset: ctx.request.start_row.into(),
        fetch: ctx.page_size.into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::ast::BindValue;
    use crate::compiler::filters::UnknownOperatorPolicy;
    use crate::config::CompilerConfig;
    use crate::request::{Filter, NumberOp, PivotValues, RowsRequest, SortSpec, TextOp};

    fn context<'a>(
        request: &'a RowsRequest,
        pivot_values: &'a PivotValues,
    ) -> CompileContext<'a> {
        CompileContext::new(request, "sales_data", pivot_values, &CompilerConfig::default())
            .unwrap()
    }

    #[test]
    fn test_flat_select_keeps_value_order() {
        let request = RowsRequest::new(0, 10)
            .with_value(ColumnSpec::field("region"))
            .with_value(ColumnSpec::aggregated("Sum", "sales"));
        let pivot_values = PivotValues::new();
        let items = select_list(&context(&request, &pivot_values)).unwrap();

        assert_eq!(
            items,
            vec![
                SelectItem::column("region"),
                SelectItem::aliased(
                    Expr::aggregate(AggregateFn::Sum, Expr::column("sales")),
                    "sales"
                ),
            ]
        );
    }

    #[test]
    fn test_grouped_select_leads_with_groups() {
        let request = RowsRequest::new(0, 10)
            .with_row_group(ColumnSpec::field("country"))
            .with_row_group(ColumnSpec::field("city"))
            .with_value(ColumnSpec::aggregated("max", "sales"));
        let pivot_values = PivotValues::new();
        let ctx = context(&request, &pivot_values);

        let items = select_list(&ctx).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0], SelectItem::column("country"));
        assert_eq!(group_by(&ctx), vec!["country".to_string()]);
    }

    #[test]
    fn test_unsupported_aggregate() {
        let request = RowsRequest::new(0, 10).with_value(ColumnSpec::aggregated("median", "x"));
        let pivot_values = PivotValues::new();
        let err = select_list(&context(&request, &pivot_values)).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_top_level_pivot_selects_pivot_columns() {
        let request = RowsRequest::new(0, 10)
            .with_pivot(ColumnSpec::field("quarter"))
            .with_value(ColumnSpec::aggregated("sum", "sales"));
        let mut pivot_values = PivotValues::new();
        pivot_values.insert("quarter".into(), vec!["Q1".into()]);

        let items = select_list(&context(&request, &pivot_values)).unwrap();
        assert_eq!(items, vec![SelectItem::column("quarter")]);
    }

    #[test]
    fn test_grouped_pivot_expands() {
        let request = RowsRequest::new(0, 10)
            .with_row_group(ColumnSpec::field("region"))
            .with_pivot(ColumnSpec::field("quarter"))
            .with_value(ColumnSpec::aggregated("sum", "sales"));
        let mut pivot_values = PivotValues::new();
        pivot_values.insert("quarter".into(), vec!["Q1".into(), "Q2".into()]);

        let items = select_list(&context(&request, &pivot_values)).unwrap();
        let aliases: Vec<Option<&str>> = items.iter().map(|i| i.alias.as_deref()).collect();
        assert_eq!(aliases, vec![None, Some("Q1_sales"), Some("Q2_sales")]);
    }

    #[test]
    fn test_where_puts_group_keys_first() {
        let request = RowsRequest::new(0, 10)
            .with_row_group(ColumnSpec::field("region"))
            .with_group_key("North")
            .with_filter("sales", Filter::number(NumberOp::GreaterThan, 5))
            .with_filter("rep", Filter::text(TextOp::Unknown("near".into()), "x"));
        let pivot_values = PivotValues::new();
        let ctx = context(&request, &pivot_values);
        assert_eq!(ctx.policy, UnknownOperatorPolicy::Ignore);

        match where_clause(&ctx).unwrap() {
            Some(Predicate::And(inner)) => {
                assert_eq!(inner.len(), 2);
                assert_eq!(inner[0], Predicate::eq("region", "North"));
            }
            other => panic!("expected conjunction, got {:?}", other),
        }
    }

    #[test]
    fn test_no_predicates_no_where() {
        let request = RowsRequest::new(0, 10);
        let pivot_values = PivotValues::new();
        assert_eq!(where_clause(&context(&request, &pivot_values)).unwrap(), None);
    }

    #[test]
    fn test_statement_pagination() {
        let request = RowsRequest::new(20, 29).with_sort(SortSpec::asc("region"));
        let pivot_values = PivotValues::new();
        let stmt = statement(&context(&request, &pivot_values)).unwrap();

        assert_eq!(stmt.offset, BindValue::from(20));
        assert_eq!(stmt.fetch, BindValue::from(10));
        assert_eq!(stmt.order_by.len(), 1);
        assert!(stmt.items.is_empty());
    }
}
