use crate::ast::{
    calls::HostCall,
    expr::{
        BinaryExpr, BinaryOperator, ColumnRef, Constant, FunctionCall, HostCallExpr, ParamTransform,
        ParameterRef, ScalarExpr, UnaryExpr, UnaryOperator,
    },
    select::Projection,
};
use model::core::{
    data_type::{SemanticType, TypeMapping},
    value::Value,
};

pub mod ast;
pub mod build;
pub mod dialect;
pub mod like;
pub mod macros;
pub mod render;

pub fn ident(name: &str) -> ScalarExpr {
    ScalarExpr::Column(ColumnRef {
        table: None,
        name: name.to_string(),
        ty: None,
    })
}

pub fn column(table: &str, name: &str) -> ScalarExpr {
    ScalarExpr::Column(ColumnRef {
        table: Some(table.to_string()),
        name: name.to_string(),
        ty: None,
    })
}

pub fn typed_column(table: &str, name: &str, semantic: SemanticType) -> ScalarExpr {
    ScalarExpr::Column(ColumnRef {
        table: Some(table.to_string()),
        name: name.to_string(),
        ty: Some(TypeMapping::new(semantic)),
    })
}

pub fn value(val: Value) -> ScalarExpr {
    ScalarExpr::Constant(Constant {
        value: val,
        ty: None,
    })
}

pub fn int(val: i64) -> ScalarExpr {
    value(Value::Int(val))
}

pub fn text(val: &str) -> ScalarExpr {
    value(Value::String(val.to_string()))
}

pub fn boolean(val: bool) -> ScalarExpr {
    ScalarExpr::Constant(Constant {
        value: Value::Boolean(val),
        ty: Some(TypeMapping::new(SemanticType::Boolean)),
    })
}

pub fn param(name: &str) -> ScalarExpr {
    ScalarExpr::Parameter(ParameterRef {
        name: name.to_string(),
        ty: None,
        transform: ParamTransform::Raw,
    })
}

pub fn typed_param(name: &str, semantic: SemanticType) -> ScalarExpr {
    ScalarExpr::Parameter(ParameterRef {
        name: name.to_string(),
        ty: Some(TypeMapping::new(semantic)),
        transform: ParamTransform::Raw,
    })
}

pub fn binary(op: BinaryOperator, left: ScalarExpr, right: ScalarExpr) -> ScalarExpr {
    ScalarExpr::Binary(Box::new(BinaryExpr {
        op,
        left,
        right,
        ty: None,
    }))
}

pub fn typed_binary(
    op: BinaryOperator,
    left: ScalarExpr,
    right: ScalarExpr,
    semantic: SemanticType,
) -> ScalarExpr {
    ScalarExpr::Binary(Box::new(BinaryExpr {
        op,
        left,
        right,
        ty: Some(TypeMapping::new(semantic)),
    }))
}

pub fn eq(left: ScalarExpr, right: ScalarExpr) -> ScalarExpr {
    binary(BinaryOperator::Eq, left, right)
}

pub fn not_eq(left: ScalarExpr, right: ScalarExpr) -> ScalarExpr {
    binary(BinaryOperator::NotEq, left, right)
}

pub fn and(left: ScalarExpr, right: ScalarExpr) -> ScalarExpr {
    binary(BinaryOperator::And, left, right)
}

pub fn or(left: ScalarExpr, right: ScalarExpr) -> ScalarExpr {
    binary(BinaryOperator::Or, left, right)
}

pub fn unary(op: UnaryOperator, operand: ScalarExpr) -> ScalarExpr {
    ScalarExpr::Unary(Box::new(UnaryExpr {
        op,
        operand,
        ty: None,
    }))
}

pub fn not(operand: ScalarExpr) -> ScalarExpr {
    unary(UnaryOperator::Not, operand)
}

pub fn is_null(operand: ScalarExpr) -> ScalarExpr {
    unary(UnaryOperator::IsNull, operand)
}

pub fn is_not_null(operand: ScalarExpr) -> ScalarExpr {
    unary(UnaryOperator::IsNotNull, operand)
}

pub fn func(name: &str, args: Vec<ScalarExpr>) -> ScalarExpr {
    ScalarExpr::Function(Box::new(FunctionCall {
        name: name.to_string(),
        args,
        ty: None,
    }))
}

pub fn typed_func(name: &str, args: Vec<ScalarExpr>, semantic: SemanticType) -> ScalarExpr {
    ScalarExpr::Function(Box::new(FunctionCall {
        name: name.to_string(),
        args,
        ty: Some(TypeMapping::new(semantic)),
    }))
}

/// The engine's conditional function: `IIF(condition, then, else)`.
pub fn iif(condition: ScalarExpr, then_value: ScalarExpr, else_value: ScalarExpr) -> ScalarExpr {
    typed_func("IIF", vec![condition, then_value, else_value], SemanticType::Boolean)
}

pub fn host_call(call: HostCall, args: Vec<ScalarExpr>) -> ScalarExpr {
    ScalarExpr::Call(Box::new(HostCallExpr {
        call,
        args,
        ty: None,
    }))
}

pub fn proj(expr: ScalarExpr) -> Projection {
    Projection { expr, alias: None }
}

pub fn proj_as(expr: ScalarExpr, alias: &str) -> Projection {
    Projection {
        expr,
        alias: Some(alias.to_string()),
    }
}

/// The canonical always-true predicate, `1 = 1`. The engine's parser wants a
/// comparison in predicate position, not a bare boolean literal.
pub fn const_true_predicate() -> ScalarExpr {
    eq(int(1), int(1))
}

/// The canonical always-false predicate, `0 = 1`.
pub fn const_false_predicate() -> ScalarExpr {
    eq(int(0), int(1))
}

fn is_int_pair_predicate(expr: &ScalarExpr, left: i64, right: i64) -> bool {
    if let ScalarExpr::Binary(b) = expr {
        if b.op == BinaryOperator::Eq {
            let l = matches!(&b.left, ScalarExpr::Constant(c) if c.value == Value::Int(left));
            let r = matches!(&b.right, ScalarExpr::Constant(c) if c.value == Value::Int(right));
            return l && r;
        }
    }
    false
}

pub fn is_const_true_predicate(expr: &ScalarExpr) -> bool {
    is_int_pair_predicate(expr, 1, 1)
}

pub fn is_const_false_predicate(expr: &ScalarExpr) -> bool {
    is_int_pair_predicate(expr, 0, 1)
}
