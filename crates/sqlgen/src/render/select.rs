use crate::{
    ast::{
        common::JoinKind,
        expr::ScalarExpr,
        select::{
            DerivedSource, OrderByExpr, Projection, Query, Select, SetOpQuery, Source, TableSource,
            ValuesSource,
        },
    },
    render::{Render, Renderer},
};

impl Render for Query {
    fn render(&self, r: &mut Renderer) {
        match self {
            Query::Select(select) => select.render(r),
            // A pending skip never survives the pagination pass; the inner
            // select is the only renderable form.
            Query::PendingSkip(pending) => pending.select.render(r),
            Query::SetOp(op) => op.render(r),
        }
    }
}

impl Render for SetOpQuery {
    fn render(&self, r: &mut Renderer) {
        self.left.render(r);
        r.sql.push(' ');
        r.sql.push_str(self.kind.keyword());
        if self.all {
            r.sql.push_str(" ALL");
        }
        r.sql.push(' ');
        self.right.render(r);
    }
}

impl Render for Select {
    fn render(&self, r: &mut Renderer) {
        // 1. SELECT clause, with the front-N cap folded in
        r.sql.push_str("SELECT ");
        if self.distinct {
            r.sql.push_str("DISTINCT ");
        }
        if let Some(limit) = &self.limit {
            r.sql.push_str("TOP ");
            limit.render(r);
            r.sql.push(' ');
        }
        if self.projections.is_empty() {
            r.sql.push('*');
        }
        for (i, projection) in self.projections.iter().enumerate() {
            if i > 0 {
                r.sql.push_str(", ");
            }
            projection.render(r);
        }

        // 2. FROM
        if !self.from.is_empty() {
            r.sql.push_str(" FROM ");
            for (i, source) in self.from.iter().enumerate() {
                match source {
                    Source::Join(join) if i > 0 => {
                        if join.kind == JoinKind::Cross {
                            // The engine spells a cross join as a comma.
                            r.sql.push_str(", ");
                            join.source.render(r);
                        } else {
                            r.sql.push(' ');
                            source.render(r);
                        }
                    }
                    _ => {
                        if i > 0 {
                            r.sql.push_str(", ");
                        }
                        source.render(r);
                    }
                }
            }
        }

        // 3. WHERE
        if let Some(predicate) = &self.predicate {
            r.sql.push_str(" WHERE ");
            predicate.render(r);
        }

        // 4. GROUP BY / HAVING
        if !self.group_by.is_empty() {
            r.sql.push_str(" GROUP BY ");
            for (i, expr) in self.group_by.iter().enumerate() {
                if i > 0 {
                    r.sql.push_str(", ");
                }
                expr.render(r);
            }
        }
        if let Some(having) = &self.having {
            r.sql.push_str(" HAVING ");
            having.render(r);
        }

        // 5. ORDER BY
        if !self.order_by.is_empty() {
            r.sql.push_str(" ORDER BY ");
            for (i, ordering) in self.order_by.iter().enumerate() {
                if i > 0 {
                    r.sql.push_str(", ");
                }
                ordering.render(r);
            }
        }
    }
}

impl Render for Projection {
    fn render(&self, r: &mut Renderer) {
        self.expr.render(r);
        if let Some(alias) = &self.alias {
            // A bare column already named like its alias needs no AS clause.
            let redundant = matches!(
                &self.expr,
                ScalarExpr::Column(c) if &c.name == alias
            );
            if !redundant {
                r.sql.push_str(" AS ");
                r.push_ident(alias);
            }
        }
    }
}

impl Render for Source {
    fn render(&self, r: &mut Renderer) {
        match self {
            Source::Table(table) => table.render(r),
            Source::Derived(derived) => derived.render(r),
            Source::Join(join) => {
                let keyword = match join.kind {
                    JoinKind::Inner => "INNER JOIN ",
                    JoinKind::Left => "LEFT JOIN ",
                    JoinKind::Cross => ", ",
                };
                r.sql.push_str(keyword);
                join.source.render(r);
                if let Some(on) = &join.on {
                    r.sql.push_str(" ON ");
                    on.render(r);
                }
            }
            Source::Apply(apply) => {
                // Never survives the guard; rendered only for diagnostics.
                r.sql.push_str(apply.kind.keyword());
                r.sql.push(' ');
                apply.source.render(r);
            }
            Source::Values(values) => values.render(r),
        }
    }
}

impl Render for TableSource {
    fn render(&self, r: &mut Renderer) {
        if let Some(schema) = &self.table.schema {
            r.push_ident(schema);
            r.sql.push('.');
        }
        r.push_ident(&self.table.name);
        if let Some(alias) = &self.alias {
            r.sql.push_str(" AS ");
            r.push_ident(alias);
        }
    }
}

impl Render for DerivedSource {
    fn render(&self, r: &mut Renderer) {
        r.sql.push('(');
        self.query.render(r);
        r.sql.push_str(") AS ");
        r.push_ident(&self.alias);
    }
}

/// The engine has no row-constructor clause; an inline row set renders as a
/// union of projected selects.
impl Render for ValuesSource {
    fn render(&self, r: &mut Renderer) {
        r.sql.push('(');
        for (row_index, row) in self.rows.iter().enumerate() {
            if row_index > 0 {
                r.sql.push_str(" UNION ALL ");
            }
            r.sql.push_str("SELECT ");
            for (i, expr) in row.iter().enumerate() {
                if i > 0 {
                    r.sql.push_str(", ");
                }
                expr.render(r);
                if let Some(column) = self.column_aliases.get(i) {
                    r.sql.push_str(" AS ");
                    r.push_ident(column);
                }
            }
        }
        r.sql.push_str(") AS ");
        r.push_ident(&self.alias);
    }
}

impl Render for OrderByExpr {
    fn render(&self, r: &mut Renderer) {
        self.expr.render(r);
        if !self.ascending {
            r.sql.push_str(" DESC");
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::common::JoinKind;
    use crate::build::select::SelectBuilder;
    use crate::dialect::Jet;
    use crate::render::{Render, Renderer};
    use crate::{binary, column, ident, int, proj, proj_as, table_ref, text};
    use crate::ast::expr::BinaryOperator;

    #[test]
    fn test_simple_select() {
        let ast = SelectBuilder::new()
            .select(vec![proj(ident("id")), proj(ident("name"))])
            .from(table_ref!("users"), None)
            .where_clause(binary(BinaryOperator::Eq, ident("id"), int(123)))
            .build();

        let dialect = Jet;
        let mut renderer = Renderer::new(&dialect);
        ast.render(&mut renderer);
        let (sql, params) = renderer.finish();

        assert_eq!(sql, "SELECT [id], [name] FROM [users] WHERE ([id] = 123)");
        assert!(params.is_empty());
    }

    #[test]
    fn test_select_with_top_and_join() {
        let ast = SelectBuilder::new()
            .select(vec![
                proj(column("u", "id")),
                proj_as(column("p", "title"), "post_title"),
            ])
            .from(table_ref!("users"), Some("u"))
            .join(
                JoinKind::Left,
                table_ref!("posts"),
                Some("p"),
                Some(binary(
                    BinaryOperator::Eq,
                    column("u", "id"),
                    column("p", "user_id"),
                )),
            )
            .where_clause(binary(
                BinaryOperator::NotEq,
                column("u", "status"),
                text("inactive"),
            ))
            .order_by(column("u", "created_at"), false)
            .limit(int(10))
            .build();

        let dialect = Jet;
        let mut renderer = Renderer::new(&dialect);
        ast.render(&mut renderer);
        let (sql, _) = renderer.finish();

        assert_eq!(
            sql,
            "SELECT TOP 10 [u].[id], [p].[title] AS [post_title] \
             FROM [users] AS [u] LEFT JOIN [posts] AS [p] ON ([u].[id] = [p].[user_id]) \
             WHERE ([u].[status] <> 'inactive') ORDER BY [u].[created_at] DESC"
        );
    }

    #[test]
    fn test_parameter_renders_positionally() {
        let ast = SelectBuilder::new()
            .select(vec![proj(ident("id"))])
            .from(table_ref!("users"), None)
            .where_clause(binary(
                BinaryOperator::Eq,
                ident("status"),
                crate::param("status"),
            ))
            .build();

        let dialect = Jet;
        let mut renderer = Renderer::new(&dialect);
        ast.render(&mut renderer);
        let (sql, params) = renderer.finish();

        assert_eq!(sql, "SELECT [id] FROM [users] WHERE ([status] = ?)");
        assert_eq!(params.len(), 1);
        assert_eq!(params[0].name, "status");
    }
}
