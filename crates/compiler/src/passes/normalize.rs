//! Three-valued-logic-aware simplification.
//!
//! Comparisons against the NULL constant become `IS NULL` tests (the
//! engine's `=` never matches NULL), double negation is eliminated, `NOT`
//! over an equality flips the operator, and constant-true/false conjuncts
//! fold in the directions that are safe when the other side is unknown.
//! The classification pass re-runs at the end, because earlier rewrites may
//! have introduced boolean-shaped nodes that still need a position; the
//! whole pass is idempotent.

use crate::passes::classify;
use sqlgen::ast::expr::{
    BinaryExpr, BinaryOperator, ScalarExpr, UnaryExpr, UnaryOperator,
};
use sqlgen::ast::statement::Statement;
use sqlgen::ast::walk;
use sqlgen::{
    const_false_predicate, const_true_predicate, is_const_false_predicate,
    is_const_true_predicate,
};
use model::core::value::Value;

pub fn normalize_statement(statement: Statement) -> Statement {
    let statement = walk::map_statement(statement, &mut simplify);
    classify::classify_statement(statement)
}

/// Node-local simplification; children are already simplified when the
/// bottom-up walk reaches a node.
fn simplify(expr: ScalarExpr) -> ScalarExpr {
    match expr {
        ScalarExpr::Binary(binary) => simplify_binary(*binary),
        ScalarExpr::Unary(unary) => simplify_unary(*unary),
        other => other,
    }
}

fn simplify_binary(binary: BinaryExpr) -> ScalarExpr {
    match binary.op {
        BinaryOperator::Eq | BinaryOperator::NotEq => {
            let null_test = if binary.op == BinaryOperator::Eq {
                UnaryOperator::IsNull
            } else {
                UnaryOperator::IsNotNull
            };
            if is_null_constant(&binary.right) {
                return null_unary(null_test, binary.left);
            }
            if is_null_constant(&binary.left) {
                return null_unary(null_test, binary.right);
            }
            ScalarExpr::Binary(Box::new(binary))
        }
        BinaryOperator::And => {
            if is_const_true_predicate(&binary.left) {
                return binary.right;
            }
            if is_const_true_predicate(&binary.right) {
                return binary.left;
            }
            if is_const_false_predicate(&binary.left) || is_const_false_predicate(&binary.right) {
                return const_false_predicate();
            }
            ScalarExpr::Binary(Box::new(binary))
        }
        BinaryOperator::Or => {
            if is_const_true_predicate(&binary.left) || is_const_true_predicate(&binary.right) {
                return const_true_predicate();
            }
            if is_const_false_predicate(&binary.left) {
                return binary.right;
            }
            if is_const_false_predicate(&binary.right) {
                return binary.left;
            }
            ScalarExpr::Binary(Box::new(binary))
        }
        _ => ScalarExpr::Binary(Box::new(binary)),
    }
}

fn simplify_unary(unary: UnaryExpr) -> ScalarExpr {
    if unary.op != UnaryOperator::Not {
        return ScalarExpr::Unary(Box::new(unary));
    }
    match unary.operand {
        // NOT NOT x
        ScalarExpr::Unary(inner) if inner.op == UnaryOperator::Not => inner.operand,
        ScalarExpr::Unary(inner) if inner.op == UnaryOperator::IsNull => ScalarExpr::Unary(
            Box::new(UnaryExpr {
                op: UnaryOperator::IsNotNull,
                operand: inner.operand,
                ty: inner.ty,
            }),
        ),
        ScalarExpr::Unary(inner) if inner.op == UnaryOperator::IsNotNull => ScalarExpr::Unary(
            Box::new(UnaryExpr {
                op: UnaryOperator::IsNull,
                operand: inner.operand,
                ty: inner.ty,
            }),
        ),
        ScalarExpr::Binary(inner) => {
            let inner = *inner;
            match inner.op.negated() {
                Some(flipped) => ScalarExpr::Binary(Box::new(BinaryExpr {
                    op: flipped,
                    left: inner.left,
                    right: inner.right,
                    ty: inner.ty,
                })),
                None => ScalarExpr::Unary(Box::new(UnaryExpr {
                    op: UnaryOperator::Not,
                    operand: ScalarExpr::Binary(Box::new(inner)),
                    ty: unary.ty,
                })),
            }
        }
        operand => ScalarExpr::Unary(Box::new(UnaryExpr {
            op: UnaryOperator::Not,
            operand,
            ty: unary.ty,
        })),
    }
}

fn is_null_constant(expr: &ScalarExpr) -> bool {
    matches!(expr, ScalarExpr::Constant(c) if c.value == Value::Null)
}

fn null_unary(op: UnaryOperator, operand: ScalarExpr) -> ScalarExpr {
    ScalarExpr::Unary(Box::new(UnaryExpr {
        op,
        operand,
        ty: None,
    }))
}
