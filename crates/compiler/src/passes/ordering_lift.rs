//! Materializes orderings the engine cannot evaluate in place.
//!
//! The engine orders only by columns of the immediately visible row shape.
//! An ordering over a scalar subquery, or over a column belonging to an
//! enclosing scope, is first projected into the select and the select is
//! pushed down into a derived table; the new outer shell then orders by the
//! projected columns.

use crate::context::TranslationContext;
use sqlgen::ast::expr::{ExistsExpr, InExpr, InSet, ScalarExpr, SubqueryExpr};
use sqlgen::ast::select::{
    ApplySource, DerivedSource, JoinSource, OrderByExpr, Projection, Query, Select, SetOpQuery,
    Source,
};
use sqlgen::ast::statement::Statement;
use sqlgen::ast::walk;
use sqlgen::column;

pub fn lift_statement(statement: Statement, ctx: &mut TranslationContext) -> Statement {
    let statement = walk::map_statement(statement, &mut |expr| match expr {
        ScalarExpr::Subquery(sub) => {
            let sub = *sub;
            ScalarExpr::Subquery(Box::new(SubqueryExpr {
                query: lift_query(sub.query, ctx),
                ty: sub.ty,
            }))
        }
        ScalarExpr::Exists(exists) => {
            let exists = *exists;
            ScalarExpr::Exists(Box::new(ExistsExpr {
                query: lift_query(exists.query, ctx),
                negated: exists.negated,
            }))
        }
        ScalarExpr::In(in_expr) => {
            let in_expr = *in_expr;
            ScalarExpr::In(Box::new(InExpr {
                expr: in_expr.expr,
                set: match in_expr.set {
                    InSet::Subquery(query) => InSet::Subquery(lift_query(query, ctx)),
                    list => list,
                },
                negated: in_expr.negated,
            }))
        }
        other => other,
    });

    match statement {
        Statement::Select(query) => Statement::Select(lift_query(query, ctx)),
        other => other,
    }
}

fn lift_query(query: Query, ctx: &mut TranslationContext) -> Query {
    match query {
        Query::Select(select) => lift_select(select, ctx),
        Query::SetOp(op) => Query::SetOp(Box::new(SetOpQuery {
            kind: op.kind,
            all: op.all,
            left: lift_query(op.left, ctx),
            right: lift_query(op.right, ctx),
        })),
        // A pending skip is already a guard failure; nothing to lift.
        pending => pending,
    }
}

fn lift_select(mut select: Select, ctx: &mut TranslationContext) -> Query {
    select.from = select
        .from
        .into_iter()
        .map(|source| lift_source(source, ctx))
        .collect();

    let scope = select.scope_names();
    let needs_lift = select
        .order_by
        .iter()
        .any(|ordering| ordering_needs_lift(&ordering.expr, &scope));
    if !needs_lift {
        return Query::Select(select);
    }

    let original_names: Vec<String> = (0..select.projections.len())
        .map(|i| select.projection_name(i))
        .collect();
    let keys = ensure_ordering_projections(&mut select);
    select.order_by.clear();

    let alias = ctx.fresh_alias();
    let mut outer = Query::Select(select).into_derived_select(&alias);
    outer
        .projections
        .retain(|p| matches!(&p.alias, Some(name) if original_names.contains(name)));
    outer.order_by = keys
        .iter()
        .map(|(name, ascending)| OrderByExpr {
            expr: column(&alias, name),
            ascending: *ascending,
        })
        .collect();
    Query::Select(outer)
}

fn lift_source(source: Source, ctx: &mut TranslationContext) -> Source {
    match source {
        Source::Derived(derived) => Source::Derived(DerivedSource {
            query: Box::new(lift_query(*derived.query, ctx)),
            alias: derived.alias,
        }),
        Source::Join(join) => Source::Join(Box::new(JoinSource {
            kind: join.kind,
            source: lift_source(join.source, ctx),
            on: join.on,
        })),
        Source::Apply(apply) => Source::Apply(Box::new(ApplySource {
            kind: apply.kind,
            source: lift_source(apply.source, ctx),
        })),
        other => other,
    }
}

fn ordering_needs_lift(expr: &ScalarExpr, scope: &[String]) -> bool {
    match expr {
        ScalarExpr::Subquery(_) => true,
        // A column qualified by a table that is not in this select's own
        // sources refers to an enclosing scope.
        ScalarExpr::Column(c) => match &c.table {
            Some(table) => !scope.iter().any(|name| name == table),
            None => false,
        },
        _ => false,
    }
}

/// Guarantees every ordering expression is present in the projection list,
/// returning the projected column name and direction for each ordering.
/// Existing structurally-equal projections are reused; new ones get fresh
/// `o<n>` aliases.
pub(crate) fn ensure_ordering_projections(select: &mut Select) -> Vec<(String, bool)> {
    let mut keys = Vec::new();
    for i in 0..select.order_by.len() {
        let ordering = select.order_by[i].clone();
        let index = match select.find_projection(&ordering.expr) {
            Some(index) => index,
            None => {
                let alias = fresh_projection_alias(select);
                select.projections.push(Projection {
                    expr: ordering.expr.clone(),
                    alias: Some(alias),
                });
                select.projections.len() - 1
            }
        };
        // A reused projection still needs an addressable output name.
        if select.projections[index].alias.is_none()
            && !matches!(select.projections[index].expr, ScalarExpr::Column(_))
        {
            let alias = fresh_projection_alias(select);
            select.projections[index].alias = Some(alias);
        }
        keys.push((select.projection_name(index), ordering.ascending));
    }
    keys
}

fn fresh_projection_alias(select: &Select) -> String {
    let existing: Vec<String> = (0..select.projections.len())
        .map(|i| select.projection_name(i))
        .collect();
    let mut n = 0;
    loop {
        let candidate = format!("o{n}");
        if !existing.contains(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlgen::build::select::SelectBuilder;
    use sqlgen::{column, ident, proj, proj_as, table_ref};

    fn ctx_for(statement: &Statement) -> TranslationContext {
        TranslationContext::new(false, statement)
    }

    fn scalar_subquery() -> ScalarExpr {
        ScalarExpr::Subquery(Box::new(SubqueryExpr {
            query: SelectBuilder::new()
                .select(vec![proj(ident("score"))])
                .from(table_ref!("ratings"), None)
                .into_query(),
            ty: None,
        }))
    }

    #[test]
    fn test_plain_column_ordering_is_untouched() {
        let statement = Statement::Select(
            SelectBuilder::new()
                .select(vec![proj(column("u", "id"))])
                .from(table_ref!("users"), Some("u"))
                .order_by(column("u", "name"), true)
                .into_query(),
        );
        let mut ctx = ctx_for(&statement);
        let lifted = lift_statement(statement.clone(), &mut ctx);
        assert_eq!(lifted, statement);
    }

    #[test]
    fn test_subquery_ordering_is_projected_and_pushed_down() {
        let statement = Statement::Select(
            SelectBuilder::new()
                .select(vec![proj_as(column("u", "id"), "id")])
                .from(table_ref!("users"), Some("u"))
                .order_by(scalar_subquery(), false)
                .into_query(),
        );
        let mut ctx = ctx_for(&statement);
        let lifted = lift_statement(statement, &mut ctx);

        let Statement::Select(Query::Select(outer)) = lifted else {
            panic!("expected select statement");
        };
        // Outer shape keeps only the original column and orders by the
        // projected subquery alias.
        assert_eq!(outer.projections.len(), 1);
        assert_eq!(outer.order_by.len(), 1);
        assert!(ordering_closure_holds(&outer));

        let Source::Derived(inner) = &outer.from[0] else {
            panic!("expected pushdown into a derived table");
        };
        let inner = inner.query.as_select().expect("inner select");
        assert!(inner.order_by.is_empty());
        assert_eq!(inner.projections.len(), 2);
    }

    #[test]
    fn test_outer_scope_column_ordering_is_projected() {
        let statement = Statement::Select(
            SelectBuilder::new()
                .select(vec![proj_as(column("u", "id"), "id")])
                .from(table_ref!("users"), Some("u"))
                .order_by(column("outer_ref", "rank"), true)
                .into_query(),
        );
        let mut ctx = ctx_for(&statement);
        let lifted = lift_statement(statement, &mut ctx);

        let Statement::Select(Query::Select(outer)) = lifted else {
            panic!("expected select statement");
        };
        assert!(matches!(outer.from[0], Source::Derived(_)));
        assert!(ordering_closure_holds(&outer));
    }

    /// The closure property: every ordering resolves to a column reference
    /// addressable within the select's own row shape.
    fn ordering_closure_holds(select: &Select) -> bool {
        let scope = select.scope_names();
        select.order_by.iter().all(|o| match &o.expr {
            ScalarExpr::Column(c) => match &c.table {
                Some(table) => scope.iter().any(|name| name == table),
                None => true,
            },
            _ => false,
        })
    }
}
