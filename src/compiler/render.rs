//! Dialect renderer
//!
//! Walks a `SelectStatement` left to right, writing SQL text into a buffer.
//! Each placeholder is written in the same step that pushes its bind value,
//! so the Nth placeholder always pairs with the Nth bind.

use serde::{Deserialize, Serialize};

use super::ast::{BindValue, Expr, OrderItem, Predicate, SelectItem, SelectStatement, TableRef};
use crate::request::SortDirection;

/// Target SQL dialect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// `?` placeholders
    #[default]
    Ansi,
    /// `$1`, `$2`, ... placeholders
    Postgres,
}

impl Dialect {
    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::Ansi => "ansi",
            Dialect::Postgres => "postgres",
        }
    }

    /// Counts placeholders in rendered SQL.
    ///
    /// Text inside quoted identifiers and string literals is skipped, so
    /// pivot aliases built from data never count. A doubled quote closes
    /// and reopens the quoted run, which leaves it quoted.
    pub fn count_placeholders(&self, sql: &str) -> usize {
        let mut count = 0;
        let mut quote = None;
        let mut chars = sql.chars().peekable();

        while let Some(c) = chars.next() {
            match quote {
                Some(open) if c == open => quote = None,
                Some(_) => {}
                None => match (self, c) {
                    (_, '"' | '\'') => quote = Some(c),
                    (Dialect::Ansi, '?') => count += 1,
                    (Dialect::Postgres, '$')
                        if chars.peek().map_or(false, char::is_ascii_digit) =>
                    {
                        count += 1
                    }
                    _ => {}
                },
            }
        }

        count
    }
}

/// SQL text buffer paired with its bind list
#[derive(Debug)]
pub struct SqlWriter {
    dialect: Dialect,
    sql: String,
    binds: Vec<BindValue>,
}

impl SqlWriter {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            sql: String::with_capacity(256),
            binds: Vec::new(),
        }
    }

    fn push_str(&mut self, s: &str) {
        self.sql.push_str(s);
    }

    /// Writes a placeholder and records its value
    fn push_bind(&mut self, value: &BindValue) {
        self.binds.push(value.clone());
        match self.dialect {
            Dialect::Ansi => self.sql.push('?'),
            Dialect::Postgres => {
                self.sql.push('$');
                self.sql.push_str(&self.binds.len().to_string());
            }
        }
    }

    /// Writes a double-quoted identifier, doubling embedded quotes
    fn push_ident(&mut self, name: &str) {
        self.sql.push('"');
        for c in name.chars() {
            if c == '"' {
                self.sql.push('"');
            }
            self.sql.push(c);
        }
        self.sql.push('"');
    }

    fn push_table(&mut self, table: &TableRef) {
        if let Some(schema) = &table.schema {
            self.push_ident(schema);
            self.sql.push('.');
        }
        self.push_ident(&table.name);
    }

    fn push_list<T>(&mut self, items: &[T], mut each: impl FnMut(&mut Self, &T)) {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.sql.push(',');
            }
            each(self, item);
        }
    }

    fn push_select_item(&mut self, item: &SelectItem) {
        self.push_expr(&item.expr);
        if let Some(alias) = &item.alias {
            self.push_str(" AS ");
            self.push_ident(alias);
        }
    }

    fn push_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Column(name) => self.push_ident(name),
            Expr::Null => self.push_str("NULL"),
            Expr::Aggregate { func, arg } => {
                self.push_str(func.as_str());
                self.sql.push('(');
                self.push_expr(arg);
                self.sql.push(')');
            }
            Expr::Case {
                when,
                then,
                otherwise,
            } => {
                self.push_str("CASE WHEN ");
                self.push_predicate(when);
                self.push_str(" THEN ");
                self.push_expr(then);
                self.push_str(" ELSE ");
                self.push_expr(otherwise);
                self.push_str(" END");
            }
        }
    }

    fn push_predicate(&mut self, predicate: &Predicate) {
        match predicate {
            Predicate::Compare { column, op, value } => {
                self.push_ident(column);
                self.sql.push(' ');
                self.push_str(op.as_sql());
                self.sql.push(' ');
                self.push_bind(value);
            }
            Predicate::Like {
                column,
                pattern,
                negated,
            } => {
                self.push_ident(column);
                self.push_str(if *negated { " NOT LIKE " } else { " LIKE " });
                self.push_bind(pattern);
            }
            Predicate::IsNull { column, negated } => {
                self.push_ident(column);
                self.push_str(if *negated { " IS NOT NULL" } else { " IS NULL" });
            }
            Predicate::InList { column, values } => {
                self.push_ident(column);
                if values.is_empty() {
                    self.push_str(" IN ('')");
                } else {
                    self.push_str(" IN (");
                    self.push_list(values, |w, v| w.push_bind(v));
                    self.sql.push(')');
                }
            }
            Predicate::Between { column, low, high } => {
                self.push_ident(column);
                self.push_str(" BETWEEN ");
                self.push_bind(low);
                self.push_str(" AND ");
                self.push_bind(high);
            }
            Predicate::And(inner) => {
                self.sql.push('(');
                for (i, p) in inner.iter().enumerate() {
                    if i > 0 {
                        self.push_str(" AND ");
                    }
                    self.push_predicate(p);
                }
                self.sql.push(')');
            }
        }
    }

    fn push_order_item(&mut self, item: &OrderItem) {
        self.push_ident(&item.column);
        self.push_str(match item.direction {
            SortDirection::Asc => " ASC",
            SortDirection::Desc => " DESC",
        });
    }

    /// Renders a full statement
    pub fn push_statement(&mut self, stmt: &SelectStatement) {
        self.push_str("SELECT ");
        if stmt.items.is_empty() {
            self.sql.push('*');
        } else {
            self.push_list(&stmt.items, Self::push_select_item);
        }

        self.push_str(" FROM ");
        self.push_table(&stmt.from);

        if let Some(filter) = &stmt.filter {
            self.push_str(" WHERE ");
            self.push_predicate(filter);
        }

        if !stmt.group_by.is_empty() {
            self.push_str(" GROUP BY ");
            self.push_list(&stmt.group_by, |w, c| w.push_ident(c));
        }

        if !stmt.order_by.is_empty() {
            self.push_str(" ORDER BY ");
            self.push_list(&stmt.order_by, Self::push_order_item);
        }

        self.push_str(" OFFSET ");
        self.push_bind(&stmt.offset);
        self.push_str(" ROWS FETCH NEXT ");
        self.push_bind(&stmt.fetch);
        self.push_str(" ROWS ONLY");
    }

    /// Consumes the writer, returning SQL text and binds
    pub fn finish(self) -> (String, Vec<BindValue>) {
        (self.sql, self.binds)
    }
}

/// Renders `stmt` for `dialect`
pub fn render(stmt: &SelectStatement, dialect: Dialect) -> (String, Vec<BindValue>) {
    let mut writer = SqlWriter::new(dialect);
    writer.push_statement(stmt);
    writer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::aggregate::AggregateFn;
    use crate::compiler::ast::CompareOp;

    fn statement(filter: Option<Predicate>) -> SelectStatement {
        SelectStatement {
            items: vec![SelectItem::column("region")],
            from: TableRef::parse("sales_data").unwrap(),
            filter,
            group_by: Vec::new(),
            order_by: Vec::new(),
            offset: 0.into(),
            fetch: 11.into(),
        }
    }

    #[test]
    fn test_minimal_statement() {
        let (sql, binds) = render(&statement(None), Dialect::Ansi);
        assert_eq!(
            sql,
            r#"SELECT "region" FROM "sales_data" OFFSET ? ROWS FETCH NEXT ? ROWS ONLY"#
        );
        assert_eq!(binds, vec![BindValue::from(0), BindValue::from(11)]);
    }

    #[test]
    fn test_postgres_placeholders_are_numbered() {
        let filter = Predicate::Between {
            column: "sales".into(),
            low: 10.into(),
            high: 20.into(),
        };
        let (sql, binds) = render(&statement(Some(filter)), Dialect::Postgres);
        assert_eq!(
            sql,
            r#"SELECT "region" FROM "sales_data" WHERE "sales" BETWEEN $1 AND $2 OFFSET $3 ROWS FETCH NEXT $4 ROWS ONLY"#
        );
        assert_eq!(binds.len(), 4);
        assert_eq!(Dialect::Postgres.count_placeholders(&sql), 4);
    }

    #[test]
    fn test_identifier_quotes_are_doubled() {
        let mut stmt = statement(None);
        stmt.items = vec![SelectItem::column(r#"we"ird"#)];
        stmt.from = TableRef::parse("ingress.sessions").unwrap();
        let (sql, _) = render(&stmt, Dialect::Ansi);
        assert!(sql.starts_with(r#"SELECT "we""ird" FROM "ingress"."sessions""#));
    }

    #[test]
    fn test_case_expression() {
        let mut stmt = statement(None);
        stmt.items = vec![SelectItem::aliased(
            Expr::aggregate(
                AggregateFn::Sum,
                Expr::Case {
                    when: Predicate::Compare {
                        column: "quarter".into(),
                        op: CompareOp::Eq,
                        value: "Q1".into(),
                    },
                    then: Box::new(Expr::column("sales")),
                    otherwise: Box::new(Expr::Null),
                },
            ),
            "Q1_sales",
        )];
        let (sql, binds) = render(&stmt, Dialect::Ansi);
        assert!(sql.starts_with(
            r#"SELECT sum(CASE WHEN "quarter" = ? THEN "sales" ELSE NULL END) AS "Q1_sales" FROM"#
        ));
        assert_eq!(binds[0], BindValue::from("Q1"));
    }

    #[test]
    fn test_empty_select_list_is_star() {
        let mut stmt = statement(None);
        stmt.items.clear();
        let (sql, _) = render(&stmt, Dialect::Ansi);
        assert!(sql.starts_with(r#"SELECT * FROM "sales_data""#));
    }

    #[test]
    fn test_conjunction_is_parenthesized() {
        let filter = Predicate::all(vec![
            Predicate::eq("region", "North"),
            Predicate::IsNull {
                column: "rep".into(),
                negated: true,
            },
        ]);
        let (sql, binds) = render(&statement(filter), Dialect::Ansi);
        assert!(sql.contains(r#"WHERE ("region" = ? AND "rep" IS NOT NULL) OFFSET"#));
        assert_eq!(binds.len(), 3);
    }

    #[test]
    fn test_empty_in_list_has_no_binds() {
        let filter = Predicate::InList {
            column: "region".into(),
            values: Vec::new(),
        };
        let (sql, binds) = render(&statement(Some(filter)), Dialect::Ansi);
        assert!(sql.contains(r#"WHERE "region" IN ('') OFFSET"#));
        assert_eq!(binds.len(), 2);
        assert_eq!(Dialect::Ansi.count_placeholders(&sql), 2);
    }

    #[test]
    fn test_placeholder_count() {
        assert_eq!(Dialect::Ansi.count_placeholders("a = ? AND b IN (?,?)"), 3);
        assert_eq!(Dialect::Postgres.count_placeholders("a = $1 AND b = $2 AND c = '$1'"), 2);
    }

    #[test]
    fn test_placeholder_count_skips_quoted_text() {
        let ansi = r#"SELECT "a""?" AS "Q1?_sales" FROM "t" WHERE "b" IN ('?') AND "c" = ?"#;
        assert_eq!(Dialect::Ansi.count_placeholders(ansi), 1);

        let postgres = r#"SELECT sum(x) AS "$1_sales" FROM "t" WHERE "c" = $1 OFFSET $2"#;
        assert_eq!(Dialect::Postgres.count_placeholders(postgres), 2);
    }
}
