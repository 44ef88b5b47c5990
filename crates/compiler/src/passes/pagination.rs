//! Emulates offset pagination on an engine whose only row cap is a front-N
//! clause.
//!
//! A window of `offset, limit` over an ordered select is computed as: cap
//! the ordered rows at `offset + limit`, reverse the order and cap at
//! `limit` (keeping the tail of the window), then reverse once more to
//! restore the declared order. The final reversal is skipped when the
//! immediately enclosing select carries its own ordering, since that scope
//! re-establishes order anyway.
//!
//! The equivalence to "skip `offset`, take `limit`" holds when the ordering
//! is total; callers paginating over ties must include a unique tiebreaker
//! key.
//!
//! The engine's front-N clause only accepts literals, so parameterized
//! counts are inlined from their bound values here, which makes the
//! compiled plan non-reusable across bindings.

use crate::context::TranslationContext;
use crate::error::{Result, TranslationError};
use crate::passes::ordering_lift::ensure_ordering_projections;
use model::params::ParameterValues;
use sqlgen::ast::expr::{
    BinaryOperator, ExistsExpr, InExpr, InSet, ScalarExpr, SubqueryExpr,
};
use sqlgen::ast::select::{
    ApplySource, DerivedSource, JoinSource, OrderByExpr, Query, Select, SetOpQuery, Source,
};
use sqlgen::ast::statement::Statement;
use sqlgen::ast::walk;
use sqlgen::{column, int};
use tracing::warn;

pub fn rewrite_statement(
    statement: Statement,
    params: &ParameterValues,
    ctx: &mut TranslationContext,
) -> Result<Statement> {
    // Queries embedded in expression position first; the walk is bottom-up.
    // Their windows are independent of any enclosing ordering.
    let statement = walk::try_map_statement(statement, &mut |expr| {
        Ok(match expr {
            ScalarExpr::Subquery(sub) => {
                let sub = *sub;
                ScalarExpr::Subquery(Box::new(SubqueryExpr {
                    query: rewrite_query(sub.query, params, ctx, false)?,
                    ty: sub.ty,
                }))
            }
            ScalarExpr::Exists(exists) => {
                let exists = *exists;
                ScalarExpr::Exists(Box::new(ExistsExpr {
                    query: rewrite_query(exists.query, params, ctx, false)?,
                    negated: exists.negated,
                }))
            }
            ScalarExpr::In(in_expr) => {
                let in_expr = *in_expr;
                ScalarExpr::In(Box::new(InExpr {
                    expr: in_expr.expr,
                    set: match in_expr.set {
                        InSet::Subquery(query) => {
                            InSet::Subquery(rewrite_query(query, params, ctx, false)?)
                        }
                        list => list,
                    },
                    negated: in_expr.negated,
                }))
            }
            other => other,
        })
    })?;

    Ok(match statement {
        Statement::Select(query) => {
            Statement::Select(rewrite_query(query, params, ctx, false)?)
        }
        other => other,
    })
}

fn rewrite_query(
    query: Query,
    params: &ParameterValues,
    ctx: &mut TranslationContext,
    parent_ordered: bool,
) -> Result<Query> {
    match query {
        Query::Select(select) => rewrite_select(select, params, ctx, parent_ordered),
        // A skip that never saw a take cannot be emulated; the window
        // arithmetic needs both numbers.
        Query::PendingSkip(_) => Err(TranslationError::SkipWithoutTake),
        Query::SetOp(op) => Ok(Query::SetOp(Box::new(SetOpQuery {
            kind: op.kind,
            all: op.all,
            left: rewrite_query(op.left, params, ctx, false)?,
            right: rewrite_query(op.right, params, ctx, false)?,
        }))),
    }
}

fn rewrite_select(
    mut select: Select,
    params: &ParameterValues,
    ctx: &mut TranslationContext,
    parent_ordered: bool,
) -> Result<Query> {
    let self_ordered = !select.order_by.is_empty();
    select.from = select
        .from
        .into_iter()
        .map(|source| rewrite_source(source, params, ctx, self_ordered))
        .collect::<Result<_>>()?;

    let limit = match select.limit.take() {
        Some(expr) => Some(resolve_count(&expr, params, ctx)?),
        None => None,
    };
    let offset = match select.offset.take() {
        Some(expr) => Some(resolve_count(&expr, params, ctx)?),
        None => None,
    };

    match (offset, limit) {
        (None, None) => Ok(Query::Select(select)),
        (None, Some(limit)) => {
            select.limit = Some(int(limit));
            Ok(Query::Select(select))
        }
        (Some(_), None) => Err(TranslationError::SkipWithoutTake),
        (Some(offset), Some(limit)) => {
            emulate_window(select, offset, limit, ctx, parent_ordered)
        }
    }
}

fn rewrite_source(
    source: Source,
    params: &ParameterValues,
    ctx: &mut TranslationContext,
    parent_ordered: bool,
) -> Result<Source> {
    Ok(match source {
        Source::Derived(derived) => Source::Derived(DerivedSource {
            query: Box::new(rewrite_query(*derived.query, params, ctx, parent_ordered)?),
            alias: derived.alias,
        }),
        Source::Join(join) => Source::Join(Box::new(JoinSource {
            kind: join.kind,
            source: rewrite_source(join.source, params, ctx, parent_ordered)?,
            on: join.on,
        })),
        Source::Apply(apply) => Source::Apply(Box::new(ApplySource {
            kind: apply.kind,
            source: rewrite_source(apply.source, params, ctx, parent_ordered)?,
        })),
        other => other,
    })
}

fn emulate_window(
    mut select: Select,
    offset: i64,
    limit: i64,
    ctx: &mut TranslationContext,
    parent_ordered: bool,
) -> Result<Query> {
    if select.order_by.is_empty() {
        // Skipping rows of an unordered set has no stable meaning. Under
        // split execution the rows of each round-trip must correlate, so
        // this is fatal; in a single query the engine's arbitrary order is
        // accepted and pinned to the first projection.
        if ctx.split_query {
            return Err(TranslationError::SplitQueryOffsetWithoutOrderBy);
        }
        if select.projections.is_empty() {
            return Err(TranslationError::UnorderedOffset);
        }
        warn!("row offset without an ordering; ordering by the first projected column");
        select.order_by.push(OrderByExpr {
            expr: select.projections[0].expr.clone(),
            ascending: true,
        });
    }

    let original_names: Vec<String> = (0..select.projections.len())
        .map(|i| select.projection_name(i))
        .collect();
    let keys = ensure_ordering_projections(&mut select);

    // Front of the declared order, capped at the window's far edge.
    select.limit = Some(int(offset + limit));

    // Reversed, capped at the window size: the tail of the capped front.
    let inner_alias = ctx.fresh_alias();
    let mut middle = Query::Select(select).into_derived_select(&inner_alias);
    middle.order_by = keys
        .iter()
        .map(|(name, ascending)| OrderByExpr {
            expr: column(&inner_alias, name),
            ascending: !ascending,
        })
        .collect();
    middle.limit = Some(int(limit));

    if parent_ordered {
        // The enclosing select re-establishes order; the rows may stay
        // reversed here.
        return Ok(Query::Select(middle));
    }

    // Reversed back into the declared order.
    let outer_alias = ctx.fresh_alias();
    let mut outer = Query::Select(middle).into_derived_select(&outer_alias);
    outer
        .projections
        .retain(|p| matches!(&p.alias, Some(name) if original_names.contains(name)));
    outer.order_by = keys
        .iter()
        .map(|(name, ascending)| OrderByExpr {
            expr: column(&outer_alias, name),
            ascending: *ascending,
        })
        .collect();
    Ok(Query::Select(outer))
}

/// Resolves a row-count expression to a literal, inlining bound parameter
/// values (and poisoning plan reuse) where needed.
fn resolve_count(
    expr: &ScalarExpr,
    params: &ParameterValues,
    ctx: &mut TranslationContext,
) -> Result<i64> {
    match expr {
        ScalarExpr::Constant(c) => c.value.as_i64().ok_or(TranslationError::NonConstantLimit),
        ScalarExpr::Parameter(p) => {
            let value = params
                .get(&p.name)
                .ok_or_else(|| TranslationError::ParameterNotBound {
                    name: p.name.clone(),
                })?;
            let count = value.as_i64().ok_or(TranslationError::NonConstantLimit)?;
            warn!(
                parameter = %p.name,
                "inlining row-count parameter into a literal cap; plan is not cacheable"
            );
            ctx.poison_cache();
            Ok(count)
        }
        ScalarExpr::Binary(b) => {
            let left = resolve_count(&b.left, params, ctx)?;
            let right = resolve_count(&b.right, params, ctx)?;
            match b.op {
                BinaryOperator::Add => Ok(left + right),
                BinaryOperator::Sub => Ok(left - right),
                _ => Err(TranslationError::NonConstantLimit),
            }
        }
        _ => Err(TranslationError::NonConstantLimit),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::core::value::Value;
    use sqlgen::build::select::SelectBuilder;
    use sqlgen::{ident, param, proj, proj_as, table_ref};

    fn ordered_ids() -> Query {
        SelectBuilder::new()
            .select(vec![proj_as(ident("id"), "id")])
            .from(table_ref!("rows"), None)
            .order_by(ident("id"), true)
            .into_query()
    }

    fn rewrite(query: Query, params: &ParameterValues, split: bool) -> Result<(Query, bool)> {
        let statement = Statement::Select(query);
        let mut ctx = TranslationContext::new(split, &statement);
        let rewritten = rewrite_statement(statement, params, &mut ctx)?;
        let cacheable = ctx.is_cacheable();
        match rewritten {
            Statement::Select(query) => Ok((query, cacheable)),
            other => panic!("expected select, got {other:?}"),
        }
    }

    /// Replays the emulation's window arithmetic over literal rows: cap at
    /// offset+limit, reverse, cap at limit, reverse back.
    fn simulate(rows: &[i64], offset: usize, limit: usize) -> Vec<i64> {
        let mut window: Vec<i64> = rows.iter().copied().take(offset + limit).collect();
        window.reverse();
        window.truncate(limit);
        window.reverse();
        window
    }

    #[test]
    fn test_window_arithmetic_matches_skip_take() {
        let rows: Vec<i64> = (1..=10).collect();
        assert_eq!(simulate(&rows, 3, 4), vec![4, 5, 6, 7]);
        assert_eq!(simulate(&rows, 0, 3), vec![1, 2, 3]);
        assert_eq!(simulate(&rows, 6, 4), vec![7, 8, 9, 10]);
        assert_eq!(simulate(&rows, 3, 0), Vec::<i64>::new());
    }

    #[test]
    fn test_offset_and_limit_become_nested_caps() {
        let (query, cacheable) =
            rewrite(ordered_ids().skip(int(3)).take(int(4)), &ParameterValues::new(), false)
                .unwrap();
        assert!(cacheable);

        // Outermost: original order, no cap.
        let outer = query.as_select().expect("outer select");
        assert!(outer.limit.is_none());
        assert!(outer.order_by[0].ascending);

        // Middle: reversed order, capped at the window size.
        let Source::Derived(middle_src) = &outer.from[0] else {
            panic!("expected derived middle");
        };
        let middle = middle_src.query.as_select().expect("middle select");
        assert_eq!(middle.limit, Some(int(4)));
        assert!(!middle.order_by[0].ascending);

        // Innermost: declared order, capped at offset + limit.
        let Source::Derived(inner_src) = &middle.from[0] else {
            panic!("expected derived inner");
        };
        let inner = inner_src.query.as_select().expect("inner select");
        assert_eq!(inner.limit, Some(int(7)));
        assert!(inner.order_by[0].ascending);
        assert!(inner.offset.is_none());
    }

    #[test]
    fn test_parameterized_counts_are_inlined_and_poison_cache() {
        let params = ParameterValues::new()
            .with("skip", Value::Int(2))
            .with("take", Value::Int(5));
        let (query, cacheable) = rewrite(
            ordered_ids().skip(param("skip")).take(param("take")),
            &params,
            false,
        )
        .unwrap();
        assert!(!cacheable);

        let outer = query.as_select().expect("outer select");
        let Source::Derived(middle_src) = &outer.from[0] else {
            panic!("expected derived middle");
        };
        let middle = middle_src.query.as_select().expect("middle select");
        assert_eq!(middle.limit, Some(int(5)));
    }

    #[test]
    fn test_split_query_offset_without_order_is_fatal() {
        let unordered = SelectBuilder::new()
            .select(vec![proj_as(ident("id"), "id")])
            .from(table_ref!("rows"), None)
            .into_query();
        let err = rewrite(
            unordered.skip(int(3)).take(int(4)),
            &ParameterValues::new(),
            true,
        )
        .unwrap_err();
        assert_eq!(err, TranslationError::SplitQueryOffsetWithoutOrderBy);
    }

    #[test]
    fn test_single_query_offset_without_order_synthesizes_one() {
        let unordered = SelectBuilder::new()
            .select(vec![proj_as(ident("id"), "id")])
            .from(table_ref!("rows"), None)
            .into_query();
        let (query, _) = rewrite(
            unordered.skip(int(3)).take(int(4)),
            &ParameterValues::new(),
            false,
        )
        .unwrap();
        let outer = query.as_select().expect("outer select");
        assert_eq!(outer.order_by.len(), 1);
    }

    #[test]
    fn test_pending_skip_is_fatal() {
        let err = rewrite(ordered_ids().skip(int(3)), &ParameterValues::new(), false)
            .unwrap_err();
        assert_eq!(err, TranslationError::SkipWithoutTake);
    }

    #[test]
    fn test_limit_only_is_passed_through() {
        let (query, cacheable) =
            rewrite(ordered_ids().take(int(5)), &ParameterValues::new(), false).unwrap();
        assert!(cacheable);
        let select = query.as_select().expect("select");
        assert_eq!(select.limit, Some(int(5)));
        assert!(matches!(select.from[0], Source::Table(_)));
    }
}
