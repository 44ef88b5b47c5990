//! The terminal compatibility guard.
//!
//! Runs strictly after every rewrite pass, so a pass that eliminated an
//! unsupported construct gets credit for doing so. Anything still carrying
//! a shape the engine cannot express fails here, before any SQL text is
//! emitted; a compiler-side diagnostic naming the construct beats the
//! engine's parse error every time.

use crate::error::{Result, TranslationError};
use sqlgen::ast::common::SetOpKind;
use sqlgen::ast::expr::{InSet, ScalarExpr};
use sqlgen::ast::select::{ApplySource, Query, Select, Source};
use sqlgen::ast::statement::Statement;
use sqlgen::ast::common::ApplyKind;

pub fn check_statement(statement: &Statement) -> Result<()> {
    match statement {
        Statement::Select(query) => check_query(query),
        Statement::Update(update) => {
            for assignment in &update.assignments {
                check_expr(&assignment.value)?;
            }
            check_optional(&update.predicate)
        }
        Statement::Delete(delete) => check_optional(&delete.predicate),
    }
}

fn check_query(query: &Query) -> Result<()> {
    match query {
        Query::Select(select) => check_select(select),
        Query::PendingSkip(_) => Err(TranslationError::SkipWithoutTake),
        Query::SetOp(op) => {
            match op.kind {
                SetOpKind::Except => return Err(TranslationError::Except),
                SetOpKind::Intersect => return Err(TranslationError::Intersect),
                SetOpKind::Union => {}
            }
            check_query(&op.left)?;
            check_query(&op.right)
        }
    }
}

fn check_select(select: &Select) -> Result<()> {
    // The transient unordered-offset state must be discharged by now.
    if select.offset.is_some() {
        return Err(TranslationError::UnresolvedOffset);
    }
    if let Some(limit) = &select.limit {
        if !matches!(limit, ScalarExpr::Constant(_)) {
            return Err(TranslationError::NonConstantLimit);
        }
    }
    for projection in &select.projections {
        check_expr(&projection.expr)?;
    }
    for source in &select.from {
        check_source(source)?;
    }
    check_optional(&select.predicate)?;
    for expr in &select.group_by {
        check_expr(expr)?;
    }
    check_optional(&select.having)?;
    for ordering in &select.order_by {
        check_expr(&ordering.expr)?;
    }
    Ok(())
}

fn check_source(source: &Source) -> Result<()> {
    match source {
        Source::Table(_) => Ok(()),
        Source::Derived(derived) => check_query(&derived.query),
        Source::Join(join) => {
            check_source(&join.source)?;
            check_optional(&join.on)
        }
        Source::Apply(apply) => Err(apply_error(apply)),
        Source::Values(values) => {
            for row in &values.rows {
                for expr in row {
                    check_expr(expr)?;
                }
            }
            Ok(())
        }
    }
}

fn apply_error(apply: &ApplySource) -> TranslationError {
    match apply.kind {
        ApplyKind::Cross => TranslationError::CrossApply,
        ApplyKind::Outer => TranslationError::OuterApply,
    }
}

fn check_optional(expr: &Option<ScalarExpr>) -> Result<()> {
    match expr {
        Some(expr) => check_expr(expr),
        None => Ok(()),
    }
}

fn check_expr(expr: &ScalarExpr) -> Result<()> {
    match expr {
        ScalarExpr::RowNumber(_) => Err(TranslationError::RowNumber),
        ScalarExpr::JsonAccess(access) => {
            if access.path.is_empty() {
                Ok(())
            } else {
                Err(TranslationError::JsonPath {
                    path: access.path.join("."),
                })
            }
        }
        ScalarExpr::Call(call) => Err(TranslationError::UntranslatedCall {
            call: call.call.describe(),
        }),
        ScalarExpr::Column(_) | ScalarExpr::Constant(_) | ScalarExpr::Parameter(_) => Ok(()),
        ScalarExpr::Function(func) => {
            for arg in &func.args {
                check_expr(arg)?;
            }
            Ok(())
        }
        ScalarExpr::Binary(binary) => {
            check_expr(&binary.left)?;
            check_expr(&binary.right)
        }
        ScalarExpr::Unary(unary) => check_expr(&unary.operand),
        ScalarExpr::Case(case) => {
            check_optional(&case.operand)?;
            for branch in &case.branches {
                check_expr(&branch.when)?;
                check_expr(&branch.then)?;
            }
            check_optional(&case.else_result)
        }
        ScalarExpr::Subquery(sub) => check_query(&sub.query),
        ScalarExpr::Exists(exists) => check_query(&exists.query),
        ScalarExpr::In(in_expr) => {
            check_expr(&in_expr.expr)?;
            match &in_expr.set {
                InSet::List(items) => {
                    for item in items {
                        check_expr(item)?;
                    }
                    Ok(())
                }
                InSet::Subquery(query) => check_query(query),
            }
        }
        ScalarExpr::Like(like) => {
            check_expr(&like.expr)?;
            check_expr(&like.pattern)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlgen::ast::common::{JoinKind, SetOpKind};
    use sqlgen::ast::expr::{JsonAccessExpr, RowNumberExpr, SubqueryExpr};
    use sqlgen::ast::select::{
        ApplySource, OrderByExpr, Query, SetOpQuery, Source, TableSource,
    };
    use sqlgen::build::select::SelectBuilder;
    use sqlgen::{ident, proj, table_ref};

    fn base_query() -> Query {
        SelectBuilder::new()
            .select(vec![proj(ident("id"))])
            .from(table_ref!("rows"), None)
            .into_query()
    }

    fn select_with_projection(expr: ScalarExpr) -> Statement {
        Statement::Select(
            SelectBuilder::new()
                .select(vec![proj(expr)])
                .from(table_ref!("rows"), None)
                .into_query(),
        )
    }

    #[test]
    fn test_row_number_is_rejected() {
        let statement = select_with_projection(ScalarExpr::RowNumber(Box::new(RowNumberExpr {
            partition_by: vec![],
            order_by: vec![OrderByExpr {
                expr: ident("id"),
                ascending: true,
            }],
        })));
        assert_eq!(
            check_statement(&statement).unwrap_err(),
            TranslationError::RowNumber
        );
    }

    #[test]
    fn test_apply_is_rejected() {
        for (kind, expected) in [
            (sqlgen::ast::common::ApplyKind::Cross, TranslationError::CrossApply),
            (sqlgen::ast::common::ApplyKind::Outer, TranslationError::OuterApply),
        ] {
            let mut select = SelectBuilder::new()
                .select(vec![proj(ident("id"))])
                .from(table_ref!("rows"), None)
                .build();
            select.from.push(Source::Apply(Box::new(ApplySource {
                kind,
                source: Source::Table(TableSource {
                    table: table_ref!("details"),
                    alias: None,
                }),
            })));
            let statement = Statement::Select(Query::Select(select));
            assert_eq!(check_statement(&statement).unwrap_err(), expected);
        }
    }

    #[test]
    fn test_set_difference_and_intersection_are_rejected() {
        for (kind, expected) in [
            (SetOpKind::Except, TranslationError::Except),
            (SetOpKind::Intersect, TranslationError::Intersect),
        ] {
            let statement = Statement::Select(Query::SetOp(Box::new(SetOpQuery {
                kind,
                all: false,
                left: base_query(),
                right: base_query(),
            })));
            assert_eq!(check_statement(&statement).unwrap_err(), expected);
        }
    }

    #[test]
    fn test_union_passes() {
        let statement = Statement::Select(Query::SetOp(Box::new(SetOpQuery {
            kind: SetOpKind::Union,
            all: true,
            left: base_query(),
            right: base_query(),
        })));
        assert!(check_statement(&statement).is_ok());
    }

    #[test]
    fn test_json_path_is_rejected_but_bare_column_passes() {
        let bare = select_with_projection(ScalarExpr::JsonAccess(Box::new(JsonAccessExpr {
            column: sqlgen::ast::expr::ColumnRef {
                table: None,
                name: "payload".into(),
                ty: None,
            },
            path: vec![],
        })));
        assert!(check_statement(&bare).is_ok());

        let pathed = select_with_projection(ScalarExpr::JsonAccess(Box::new(JsonAccessExpr {
            column: sqlgen::ast::expr::ColumnRef {
                table: None,
                name: "payload".into(),
                ty: None,
            },
            path: vec!["a".into(), "b".into()],
        })));
        assert_eq!(
            check_statement(&pathed).unwrap_err(),
            TranslationError::JsonPath { path: "a.b".into() }
        );
    }

    #[test]
    fn test_unsupported_shapes_inside_subqueries_are_found() {
        let inner = select_with_projection(ScalarExpr::RowNumber(Box::new(RowNumberExpr {
            partition_by: vec![],
            order_by: vec![],
        })));
        let Statement::Select(inner_query) = inner else {
            panic!("expected select");
        };
        let statement = select_with_projection(ScalarExpr::Subquery(Box::new(SubqueryExpr {
            query: inner_query,
            ty: None,
        })));
        assert_eq!(
            check_statement(&statement).unwrap_err(),
            TranslationError::RowNumber
        );
    }

    #[test]
    fn test_join_on_is_checked() {
        let statement = Statement::Select(
            SelectBuilder::new()
                .select(vec![proj(ident("id"))])
                .from(table_ref!("rows"), None)
                .join(
                    JoinKind::Inner,
                    table_ref!("others"),
                    None,
                    Some(ScalarExpr::RowNumber(Box::new(RowNumberExpr {
                        partition_by: vec![],
                        order_by: vec![],
                    }))),
                )
                .into_query(),
        );
        assert_eq!(
            check_statement(&statement).unwrap_err(),
            TranslationError::RowNumber
        );
    }
}
