//! Math rewrites.
//!
//! The engine's math vocabulary is small: `ABS`, `ATN`, `COS`, `EXP`,
//! `FIX`, `INT`, `LOG`, `SGN`, `SIN`, `SQR`, `TAN`, `ROUND`, and the `^`
//! operator. Everything else is expressed through algebraic identities over
//! those primitives.

use crate::error::Result;
use crate::translators::take_args;
use model::core::data_type::SemanticType;
use sqlgen::ast::calls::MathCall;
use sqlgen::ast::expr::{BinaryOperator, ScalarExpr, UnaryOperator};
use sqlgen::{binary, int, typed_binary, typed_func, unary};

pub(crate) fn translate(call: MathCall, args: Vec<ScalarExpr>) -> Result<ScalarExpr> {
    match call {
        MathCall::Abs => direct("Math.Abs", "ABS", args),
        MathCall::Sign => {
            let [x] = take_args("Math.Sign", args)?;
            Ok(typed_func("SGN", vec![x], SemanticType::Int32))
        }
        MathCall::Sin => direct("Math.Sin", "SIN", args),
        MathCall::Cos => direct("Math.Cos", "COS", args),
        MathCall::Tan => direct("Math.Tan", "TAN", args),
        MathCall::Atan => direct("Math.Atan", "ATN", args),
        MathCall::Exp => direct("Math.Exp", "EXP", args),
        MathCall::Sqrt => direct("Math.Sqrt", "SQR", args),
        MathCall::Log => direct("Math.Log", "LOG", args),

        // Change of base: LOG(x) / LOG(n).
        MathCall::Log10 => {
            let [x] = take_args("Math.Log10", args)?;
            Ok(log_ratio(x, int(10)))
        }
        MathCall::LogBase => {
            let [x, base] = take_args("Math.Log", args)?;
            Ok(log_ratio(x, base))
        }

        // Arccos(x) = Atn(-x / Sqr(-x * x + 1)) + 2 * Atn(1)
        MathCall::Acos => {
            let [x] = take_args("Math.Acos", args)?;
            let atan = arc_atan(x);
            Ok(typed_binary(
                BinaryOperator::Add,
                atan,
                binary(
                    BinaryOperator::Mul,
                    int(2),
                    typed_func("ATN", vec![int(1)], SemanticType::Double),
                ),
                SemanticType::Double,
            ))
        }
        // Arcsin(x) = Atn(x / Sqr(-x * x + 1))
        MathCall::Asin => {
            let [x] = take_args("Math.Asin", args)?;
            let root = unit_root(&x);
            Ok(typed_func(
                "ATN",
                vec![binary(BinaryOperator::Div, x, root)],
                SemanticType::Double,
            ))
        }

        // INT truncates toward negative infinity, which is exactly floor;
        // ceiling is floor mirrored through negation.
        MathCall::Floor => direct("Math.Floor", "INT", args),
        MathCall::Ceiling => {
            let [x] = take_args("Math.Ceiling", args)?;
            Ok(unary(
                UnaryOperator::Negate,
                typed_func(
                    "INT",
                    vec![unary(UnaryOperator::Negate, x)],
                    SemanticType::Double,
                ),
            ))
        }

        // FIX truncates toward zero.
        MathCall::Truncate => direct("Math.Truncate", "FIX", args),

        MathCall::Pow => {
            let [x, exponent] = take_args("Math.Pow", args)?;
            Ok(typed_binary(
                BinaryOperator::Pow,
                x,
                exponent,
                SemanticType::Double,
            ))
        }

        // ROUND always receives an explicit digit count; the engine's
        // one-argument form rounds inconsistently across store types.
        MathCall::Round => {
            let [x] = take_args("Math.Round", args)?;
            Ok(typed_func("ROUND", vec![x, int(0)], SemanticType::Double))
        }
        MathCall::RoundDigits => {
            let [x, digits] = take_args("Math.Round", args)?;
            Ok(typed_func("ROUND", vec![x, digits], SemanticType::Double))
        }
    }
}

fn direct(call: &str, builtin: &str, args: Vec<ScalarExpr>) -> Result<ScalarExpr> {
    let [x] = take_args(call, args)?;
    Ok(typed_func(builtin, vec![x], SemanticType::Double))
}

/// `SQR(-x * x + 1)`, the shared radical of the inverse-trig identities.
fn unit_root(x: &ScalarExpr) -> ScalarExpr {
    let negated_square = binary(
        BinaryOperator::Mul,
        unary(UnaryOperator::Negate, x.clone()),
        x.clone(),
    );
    typed_func(
        "SQR",
        vec![binary(BinaryOperator::Add, negated_square, int(1))],
        SemanticType::Double,
    )
}

/// `ATN(-x / SQR(-x * x + 1))`.
fn arc_atan(x: ScalarExpr) -> ScalarExpr {
    let root = unit_root(&x);
    typed_func(
        "ATN",
        vec![binary(
            BinaryOperator::Div,
            unary(UnaryOperator::Negate, x),
            root,
        )],
        SemanticType::Double,
    )
}

fn log_ratio(x: ScalarExpr, base: ScalarExpr) -> ScalarExpr {
    typed_binary(
        BinaryOperator::Div,
        typed_func("LOG", vec![x], SemanticType::Double),
        typed_func("LOG", vec![base], SemanticType::Double),
        SemanticType::Double,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlgen::ident;

    #[test]
    fn test_sqrt_maps_to_sqr() {
        let result = translate(MathCall::Sqrt, vec![ident("x")]).unwrap();
        match result {
            ScalarExpr::Function(f) => assert_eq!(f.name, "SQR"),
            other => panic!("expected function, got {other:?}"),
        }
    }

    #[test]
    fn test_log10_uses_change_of_base() {
        let result = translate(MathCall::Log10, vec![ident("x")]).unwrap();
        match result {
            ScalarExpr::Binary(b) => {
                assert_eq!(b.op, BinaryOperator::Div);
                assert!(matches!(&b.left, ScalarExpr::Function(f) if f.name == "LOG"));
                assert!(matches!(&b.right, ScalarExpr::Function(f) if f.name == "LOG"));
            }
            other => panic!("expected division, got {other:?}"),
        }
    }

    #[test]
    fn test_round_always_passes_digit_count() {
        let result = translate(MathCall::Round, vec![ident("x")]).unwrap();
        match result {
            ScalarExpr::Function(f) => {
                assert_eq!(f.name, "ROUND");
                assert_eq!(f.args.len(), 2);
                assert_eq!(f.args[1], int(0));
            }
            other => panic!("expected function, got {other:?}"),
        }
    }

    #[test]
    fn test_acos_builds_the_identity() {
        let result = translate(MathCall::Acos, vec![ident("x")]).unwrap();
        // ATN(...) + 2 * ATN(1)
        match result {
            ScalarExpr::Binary(b) => assert_eq!(b.op, BinaryOperator::Add),
            other => panic!("expected addition, got {other:?}"),
        }
    }
}
