//! Bottom-up expression rewriting over whole trees.
//!
//! Passes that rewrite scalar expressions without caring about their
//! syntactic position (translators, null-semantics simplification) run
//! through these helpers instead of hand-rolling the recursion. The mapper
//! sees every scalar node exactly once, children before parents, including
//! nodes nested inside subqueries and join conditions.

use crate::ast::{
    expr::{
        BinaryExpr, CaseBranch, CaseExpr, ExistsExpr, FunctionCall, HostCallExpr, InExpr, InSet,
        LikeExpr, RowNumberExpr, ScalarExpr, SubqueryExpr, UnaryExpr,
    },
    select::{
        ApplySource, DerivedSource, JoinSource, OrderByExpr, PendingSkip, Projection, Query,
        Select, SetOpQuery, Source, ValuesSource,
    },
    statement::{Assignment, DeleteStatement, Statement, UpdateStatement},
};
use std::convert::Infallible;

pub fn try_map_statement<E, F>(statement: Statement, f: &mut F) -> Result<Statement, E>
where
    F: FnMut(ScalarExpr) -> Result<ScalarExpr, E>,
{
    Ok(match statement {
        Statement::Select(query) => Statement::Select(try_map_query(query, f)?),
        Statement::Update(update) => Statement::Update(UpdateStatement {
            table: update.table,
            assignments: update
                .assignments
                .into_iter()
                .map(|a| {
                    Ok(Assignment {
                        column: a.column,
                        value: try_map_expr(a.value, f)?,
                    })
                })
                .collect::<Result<_, E>>()?,
            predicate: update.predicate.map(|p| try_map_expr(p, f)).transpose()?,
        }),
        Statement::Delete(delete) => Statement::Delete(DeleteStatement {
            table: delete.table,
            predicate: delete.predicate.map(|p| try_map_expr(p, f)).transpose()?,
        }),
    })
}

pub fn try_map_query<E, F>(query: Query, f: &mut F) -> Result<Query, E>
where
    F: FnMut(ScalarExpr) -> Result<ScalarExpr, E>,
{
    Ok(match query {
        Query::Select(select) => Query::Select(try_map_select(select, f)?),
        Query::PendingSkip(pending) => Query::PendingSkip(PendingSkip {
            select: Box::new(try_map_select(*pending.select, f)?),
            offset: try_map_expr(pending.offset, f)?,
        }),
        Query::SetOp(op) => Query::SetOp(Box::new(SetOpQuery {
            kind: op.kind,
            all: op.all,
            left: try_map_query(op.left, f)?,
            right: try_map_query(op.right, f)?,
        })),
    })
}

pub fn try_map_select<E, F>(select: Select, f: &mut F) -> Result<Select, E>
where
    F: FnMut(ScalarExpr) -> Result<ScalarExpr, E>,
{
    Ok(Select {
        distinct: select.distinct,
        projections: select
            .projections
            .into_iter()
            .map(|p| {
                Ok(Projection {
                    expr: try_map_expr(p.expr, f)?,
                    alias: p.alias,
                })
            })
            .collect::<Result<_, E>>()?,
        from: select
            .from
            .into_iter()
            .map(|s| try_map_source(s, f))
            .collect::<Result<_, E>>()?,
        predicate: select.predicate.map(|p| try_map_expr(p, f)).transpose()?,
        group_by: select
            .group_by
            .into_iter()
            .map(|g| try_map_expr(g, f))
            .collect::<Result<_, E>>()?,
        having: select.having.map(|h| try_map_expr(h, f)).transpose()?,
        order_by: select
            .order_by
            .into_iter()
            .map(|o| try_map_ordering(o, f))
            .collect::<Result<_, E>>()?,
        offset: select.offset.map(|o| try_map_expr(o, f)).transpose()?,
        limit: select.limit.map(|l| try_map_expr(l, f)).transpose()?,
    })
}

fn try_map_source<E, F>(source: Source, f: &mut F) -> Result<Source, E>
where
    F: FnMut(ScalarExpr) -> Result<ScalarExpr, E>,
{
    Ok(match source {
        Source::Table(t) => Source::Table(t),
        Source::Derived(d) => Source::Derived(DerivedSource {
            query: Box::new(try_map_query(*d.query, f)?),
            alias: d.alias,
        }),
        Source::Join(j) => Source::Join(Box::new(JoinSource {
            kind: j.kind,
            source: try_map_source(j.source, f)?,
            on: j.on.map(|on| try_map_expr(on, f)).transpose()?,
        })),
        Source::Apply(a) => Source::Apply(Box::new(ApplySource {
            kind: a.kind,
            source: try_map_source(a.source, f)?,
        })),
        Source::Values(v) => Source::Values(ValuesSource {
            rows: v
                .rows
                .into_iter()
                .map(|row| row.into_iter().map(|e| try_map_expr(e, f)).collect())
                .collect::<Result<_, E>>()?,
            column_aliases: v.column_aliases,
            alias: v.alias,
        }),
    })
}

fn try_map_ordering<E, F>(ordering: OrderByExpr, f: &mut F) -> Result<OrderByExpr, E>
where
    F: FnMut(ScalarExpr) -> Result<ScalarExpr, E>,
{
    Ok(OrderByExpr {
        expr: try_map_expr(ordering.expr, f)?,
        ascending: ordering.ascending,
    })
}

/// Rebuild `expr` bottom-up, applying `f` to every node after its children
/// have been rewritten.
pub fn try_map_expr<E, F>(expr: ScalarExpr, f: &mut F) -> Result<ScalarExpr, E>
where
    F: FnMut(ScalarExpr) -> Result<ScalarExpr, E>,
{
    let rebuilt = match expr {
        ScalarExpr::Column(_)
        | ScalarExpr::Constant(_)
        | ScalarExpr::Parameter(_)
        | ScalarExpr::JsonAccess(_) => expr,
        ScalarExpr::Call(call) => ScalarExpr::Call(Box::new(HostCallExpr {
            call: call.call,
            args: call
                .args
                .into_iter()
                .map(|a| try_map_expr(a, f))
                .collect::<Result<_, E>>()?,
            ty: call.ty,
        })),
        ScalarExpr::Function(func) => ScalarExpr::Function(Box::new(FunctionCall {
            name: func.name,
            args: func
                .args
                .into_iter()
                .map(|a| try_map_expr(a, f))
                .collect::<Result<_, E>>()?,
            ty: func.ty,
        })),
        ScalarExpr::Binary(binary) => ScalarExpr::Binary(Box::new(BinaryExpr {
            op: binary.op,
            left: try_map_expr(binary.left, f)?,
            right: try_map_expr(binary.right, f)?,
            ty: binary.ty,
        })),
        ScalarExpr::Unary(unary) => ScalarExpr::Unary(Box::new(UnaryExpr {
            op: unary.op,
            operand: try_map_expr(unary.operand, f)?,
            ty: unary.ty,
        })),
        ScalarExpr::Case(case) => ScalarExpr::Case(Box::new(CaseExpr {
            operand: case.operand.map(|o| try_map_expr(o, f)).transpose()?,
            branches: case
                .branches
                .into_iter()
                .map(|b| {
                    Ok(CaseBranch {
                        when: try_map_expr(b.when, f)?,
                        then: try_map_expr(b.then, f)?,
                    })
                })
                .collect::<Result<_, E>>()?,
            else_result: case.else_result.map(|e| try_map_expr(e, f)).transpose()?,
            ty: case.ty,
        })),
        ScalarExpr::Subquery(sub) => ScalarExpr::Subquery(Box::new(SubqueryExpr {
            query: try_map_query(sub.query, f)?,
            ty: sub.ty,
        })),
        ScalarExpr::Exists(exists) => ScalarExpr::Exists(Box::new(ExistsExpr {
            query: try_map_query(exists.query, f)?,
            negated: exists.negated,
        })),
        ScalarExpr::In(in_expr) => ScalarExpr::In(Box::new(InExpr {
            expr: try_map_expr(in_expr.expr, f)?,
            set: match in_expr.set {
                InSet::List(items) => InSet::List(
                    items
                        .into_iter()
                        .map(|i| try_map_expr(i, f))
                        .collect::<Result<_, E>>()?,
                ),
                InSet::Subquery(query) => InSet::Subquery(try_map_query(query, f)?),
            },
            negated: in_expr.negated,
        })),
        ScalarExpr::Like(like) => ScalarExpr::Like(Box::new(LikeExpr {
            expr: try_map_expr(like.expr, f)?,
            pattern: try_map_expr(like.pattern, f)?,
            escape: like.escape,
        })),
        ScalarExpr::RowNumber(row) => ScalarExpr::RowNumber(Box::new(RowNumberExpr {
            partition_by: row
                .partition_by
                .into_iter()
                .map(|p| try_map_expr(p, f))
                .collect::<Result<_, E>>()?,
            order_by: row
                .order_by
                .into_iter()
                .map(|o| try_map_ordering(o, f))
                .collect::<Result<_, E>>()?,
        })),
    };
    f(rebuilt)
}

pub fn map_statement<F>(statement: Statement, f: &mut F) -> Statement
where
    F: FnMut(ScalarExpr) -> ScalarExpr,
{
    match try_map_statement::<Infallible, _>(statement, &mut |e| Ok(f(e))) {
        Ok(statement) => statement,
        Err(e) => match e {},
    }
}

pub fn map_query<F>(query: Query, f: &mut F) -> Query
where
    F: FnMut(ScalarExpr) -> ScalarExpr,
{
    match try_map_query::<Infallible, _>(query, &mut |e| Ok(f(e))) {
        Ok(query) => query,
        Err(e) => match e {},
    }
}

pub fn map_expr<F>(expr: ScalarExpr, f: &mut F) -> ScalarExpr
where
    F: FnMut(ScalarExpr) -> ScalarExpr,
{
    match try_map_expr::<Infallible, _>(expr, &mut |e| Ok(f(e))) {
        Ok(expr) => expr,
        Err(e) => match e {},
    }
}
