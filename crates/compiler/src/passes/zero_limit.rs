//! Collapses degenerate row limits.
//!
//! A select whose limit is provably zero can never return rows, so the
//! pagination trick downstream would be wasted work for the engine. The
//! select keeps its shape but gains a constant-false filter instead. When
//! the zero came from a bound parameter value rather than a literal, the
//! compiled plan is only correct for that binding and must not be cached.

use crate::context::TranslationContext;
use model::params::ParameterValues;
use sqlgen::ast::expr::{BinaryOperator, InSet, ScalarExpr, SubqueryExpr};
use sqlgen::ast::select::{
    ApplySource, DerivedSource, JoinSource, PendingSkip, Query, Select, SetOpQuery, Source,
};
use sqlgen::ast::statement::Statement;
use sqlgen::ast::walk;
use sqlgen::ast::expr::{ExistsExpr, InExpr};
use sqlgen::const_false_predicate;
use tracing::warn;

pub fn collapse_statement(
    statement: Statement,
    params: &ParameterValues,
    ctx: &mut TranslationContext,
) -> Statement {
    // Queries embedded in expression position first; the walk is bottom-up.
    let statement = walk::map_statement(statement, &mut |expr| match expr {
        ScalarExpr::Subquery(sub) => {
            let sub = *sub;
            ScalarExpr::Subquery(Box::new(SubqueryExpr {
                query: collapse_query(sub.query, params, ctx),
                ty: sub.ty,
            }))
        }
        ScalarExpr::Exists(exists) => {
            let exists = *exists;
            ScalarExpr::Exists(Box::new(ExistsExpr {
                query: collapse_query(exists.query, params, ctx),
                negated: exists.negated,
            }))
        }
        ScalarExpr::In(in_expr) => {
            let in_expr = *in_expr;
            ScalarExpr::In(Box::new(InExpr {
                expr: in_expr.expr,
                set: match in_expr.set {
                    InSet::Subquery(query) => InSet::Subquery(collapse_query(query, params, ctx)),
                    list => list,
                },
                negated: in_expr.negated,
            }))
        }
        other => other,
    });

    match statement {
        Statement::Select(query) => Statement::Select(collapse_query(query, params, ctx)),
        other => other,
    }
}

fn collapse_query(query: Query, params: &ParameterValues, ctx: &mut TranslationContext) -> Query {
    match query {
        Query::Select(select) => Query::Select(collapse_select(select, params, ctx)),
        Query::PendingSkip(pending) => Query::PendingSkip(PendingSkip {
            select: Box::new(collapse_select(*pending.select, params, ctx)),
            offset: pending.offset,
        }),
        Query::SetOp(op) => Query::SetOp(Box::new(SetOpQuery {
            kind: op.kind,
            all: op.all,
            left: collapse_query(op.left, params, ctx),
            right: collapse_query(op.right, params, ctx),
        })),
    }
}

fn collapse_select(
    mut select: Select,
    params: &ParameterValues,
    ctx: &mut TranslationContext,
) -> Select {
    select.from = select
        .from
        .into_iter()
        .map(|source| collapse_source(source, params, ctx))
        .collect();

    if let Some(limit) = &select.limit {
        if let Zeroness::Zero { param_dependent } = zeroness(limit, params) {
            if param_dependent {
                warn!("row limit is zero for the current parameter binding; plan is not cacheable");
                ctx.poison_cache();
            }
            if select.group_by.is_empty() {
                select.predicate = Some(const_false_predicate());
            } else {
                // A false WHERE under GROUP BY would suppress the grouping
                // itself; the empty result has to come from HAVING.
                select.having = Some(const_false_predicate());
            }
            select.order_by.clear();
            select.limit = None;
            select.offset = None;
        }
    }
    select
}

fn collapse_source(
    source: Source,
    params: &ParameterValues,
    ctx: &mut TranslationContext,
) -> Source {
    match source {
        Source::Derived(derived) => Source::Derived(DerivedSource {
            query: Box::new(collapse_query(*derived.query, params, ctx)),
            alias: derived.alias,
        }),
        Source::Join(join) => Source::Join(Box::new(JoinSource {
            kind: join.kind,
            source: collapse_source(join.source, params, ctx),
            on: join.on,
        })),
        Source::Apply(apply) => Source::Apply(Box::new(ApplySource {
            kind: apply.kind,
            source: collapse_source(apply.source, params, ctx),
        })),
        other => other,
    }
}

enum Zeroness {
    Zero { param_dependent: bool },
    NonZero,
}

/// A limit is zero when it is a literal zero, a parameter currently bound to
/// zero, or an addition/subtraction of two operands that are each
/// independently zero. A sum that only happens to cancel out (one negative,
/// one positive operand) is deliberately not recognized; reasoning about
/// signs would make the collapse depend on arithmetic the engine performs.
fn zeroness(expr: &ScalarExpr, params: &ParameterValues) -> Zeroness {
    match expr {
        ScalarExpr::Constant(c) if c.value.is_zero() => Zeroness::Zero {
            param_dependent: false,
        },
        ScalarExpr::Parameter(p) => match params.get(&p.name) {
            Some(value) if value.is_zero() => Zeroness::Zero {
                param_dependent: true,
            },
            _ => Zeroness::NonZero,
        },
        ScalarExpr::Binary(b)
            if matches!(b.op, BinaryOperator::Add | BinaryOperator::Sub) =>
        {
            match (zeroness(&b.left, params), zeroness(&b.right, params)) {
                (
                    Zeroness::Zero {
                        param_dependent: left,
                    },
                    Zeroness::Zero {
                        param_dependent: right,
                    },
                ) => Zeroness::Zero {
                    param_dependent: left || right,
                },
                _ => Zeroness::NonZero,
            }
        }
        _ => Zeroness::NonZero,
    }
}
