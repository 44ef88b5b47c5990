//! String rewrites.
//!
//! Pattern search is the delicate case. A compile-time-constant pattern is
//! escaped here and emitted as a `LIKE` literal. A parameter pattern cannot
//! be escaped until its value is known, so the parameter carries a bind-time
//! transform instead. A column or computed pattern cannot be escaped at all;
//! those fall back to `LEFT`/`RIGHT`/`INSTR` comparisons, trading the
//! index-friendly `LIKE` for a scan that is at least correct.

use crate::error::{Result, TranslationError};
use crate::translators::take_args;
use model::core::{data_type::SemanticType, value::Value};
use sqlgen::ast::calls::{StringCall, StringComparison};
use sqlgen::ast::expr::{
    BinaryOperator, LikeExpr, ParamTransform, ParameterRef, ScalarExpr,
};
use sqlgen::{
    binary, eq, func, int, is_null, like, or, text, typed_binary, typed_func, value,
};

pub(crate) fn translate(call: StringCall, args: Vec<ScalarExpr>) -> Result<ScalarExpr> {
    match call {
        StringCall::Contains { comparison } => {
            pattern_match("String.Contains", comparison, args, "%", "%")
        }
        StringCall::StartsWith { comparison } => {
            pattern_match("String.StartsWith", comparison, args, "", "%")
        }
        StringCall::EndsWith { comparison } => {
            pattern_match("String.EndsWith", comparison, args, "%", "")
        }
        StringCall::IndexOf { comparison } => {
            check_comparison("String.IndexOf", comparison)?;
            let [haystack, needle] = take_args("String.IndexOf", args)?;
            // An empty needle is found at position zero by definition; the
            // search primitive would report an off-by-one value instead.
            if is_empty_string(&needle) {
                return Ok(typed_int(0));
            }
            let instr = typed_func("INSTR", vec![haystack, needle], SemanticType::Int32);
            Ok(typed_binary(
                BinaryOperator::Sub,
                instr,
                int(1),
                SemanticType::Int32,
            ))
        }
        StringCall::Substring { with_length } => {
            if with_length {
                let [text_arg, start, length] = take_args("String.Substring", args)?;
                Ok(typed_func(
                    "MID",
                    vec![text_arg, plus_one(start), length],
                    SemanticType::Text,
                ))
            } else {
                let [text_arg, start] = take_args("String.Substring", args)?;
                Ok(typed_func(
                    "MID",
                    vec![text_arg, plus_one(start)],
                    SemanticType::Text,
                ))
            }
        }
        StringCall::ToLower => unary_builtin("String.ToLower", "LCASE", args),
        StringCall::ToUpper => unary_builtin("String.ToUpper", "UCASE", args),
        StringCall::Trim => unary_builtin("String.Trim", "TRIM", args),
        StringCall::TrimStart => unary_builtin("String.TrimStart", "LTRIM", args),
        StringCall::TrimEnd => unary_builtin("String.TrimEnd", "RTRIM", args),
        StringCall::TrimChars | StringCall::TrimStartChars | StringCall::TrimEndChars => {
            Err(TranslationError::TrimWithArguments)
        }
        StringCall::Replace => {
            let [text_arg, find, replacement] = take_args("String.Replace", args)?;
            Ok(typed_func(
                "REPLACE",
                vec![text_arg, find, replacement],
                SemanticType::Text,
            ))
        }
        StringCall::Length => {
            let [text_arg] = take_args("String.Length", args)?;
            Ok(typed_func("LEN", vec![text_arg], SemanticType::Int32))
        }
        StringCall::Concat => {
            let mut args = args.into_iter();
            let first = match args.next() {
                Some(first) => first,
                None => return Ok(text("")),
            };
            Ok(args.fold(first, |acc, arg| {
                typed_binary(BinaryOperator::Concat, acc, arg, SemanticType::Text)
            }))
        }
        StringCall::IsNullOrEmpty => {
            let [text_arg] = take_args("String.IsNullOrEmpty", args)?;
            Ok(or(is_null(text_arg.clone()), eq(text_arg, text(""))))
        }
    }
}

fn pattern_match(
    name: &str,
    comparison: Option<StringComparison>,
    args: Vec<ScalarExpr>,
    prefix: &str,
    suffix: &str,
) -> Result<ScalarExpr> {
    check_comparison(name, comparison)?;
    let [haystack, pattern] = take_args(name, args)?;

    match pattern {
        ScalarExpr::Constant(constant) => match &constant.value {
            Value::String(fragment) => {
                if fragment.is_empty() {
                    // Matching against nothing holds for every non-null value.
                    return Ok(ScalarExpr::Like(Box::new(LikeExpr {
                        expr: haystack,
                        pattern: text("%"),
                        escape: None,
                    })));
                }
                let escaped = like::escape_pattern(fragment);
                let escape = like::needs_escape(fragment).then_some(like::ESCAPE_CHAR);
                Ok(ScalarExpr::Like(Box::new(LikeExpr {
                    expr: haystack,
                    pattern: text(&format!("{prefix}{escaped}{suffix}")),
                    escape,
                })))
            }
            other => Ok(fallback_match(
                name,
                haystack,
                value(other.clone()),
            )),
        },
        ScalarExpr::Parameter(parameter) => Ok(ScalarExpr::Like(Box::new(LikeExpr {
            expr: haystack,
            pattern: ScalarExpr::Parameter(ParameterRef {
                name: parameter.name,
                ty: parameter.ty,
                transform: ParamTransform::LikePattern {
                    prefix: prefix.to_string(),
                    suffix: suffix.to_string(),
                },
            }),
            escape: Some(like::ESCAPE_CHAR),
        }))),
        other => Ok(fallback_match(name, haystack, other)),
    }
}

/// The scan-friendly comparison used when the pattern is an arbitrary
/// expression whose metacharacters cannot be escaped syntactically.
fn fallback_match(name: &str, haystack: ScalarExpr, pattern: ScalarExpr) -> ScalarExpr {
    match name {
        "String.StartsWith" => {
            let length = typed_func("LEN", vec![pattern.clone()], SemanticType::Int32);
            eq(
                typed_func("LEFT", vec![haystack, length], SemanticType::Text),
                pattern,
            )
        }
        "String.EndsWith" => {
            let length = typed_func("LEN", vec![pattern.clone()], SemanticType::Int32);
            eq(
                typed_func("RIGHT", vec![haystack, length], SemanticType::Text),
                pattern,
            )
        }
        _ => binary(
            BinaryOperator::Gt,
            func("INSTR", vec![haystack, pattern]),
            int(0),
        ),
    }
}

fn check_comparison(name: &str, comparison: Option<StringComparison>) -> Result<()> {
    match comparison {
        // The engine compares text case-insensitively; only the modes that
        // match that behavior are translatable.
        None | Some(StringComparison::OrdinalIgnoreCase) => Ok(()),
        Some(mode) => Err(TranslationError::StringComparisonMode {
            mode: format!("{mode:?} ({name})"),
        }),
    }
}

fn unary_builtin(call: &str, builtin: &str, args: Vec<ScalarExpr>) -> Result<ScalarExpr> {
    let [arg] = take_args(call, args)?;
    Ok(typed_func(builtin, vec![arg], SemanticType::Text))
}

fn is_empty_string(expr: &ScalarExpr) -> bool {
    matches!(
        expr,
        ScalarExpr::Constant(c) if matches!(&c.value, Value::String(s) if s.is_empty())
    )
}

fn typed_int(n: i64) -> ScalarExpr {
    use model::core::data_type::TypeMapping;
    use sqlgen::ast::expr::Constant;
    ScalarExpr::Constant(Constant {
        value: Value::Int(n),
        ty: Some(TypeMapping::new(SemanticType::Int32)),
    })
}

fn plus_one(start: ScalarExpr) -> ScalarExpr {
    match &start {
        ScalarExpr::Constant(c) => {
            if let Value::Int(n) = c.value {
                return int(n + 1);
            }
            binary(BinaryOperator::Add, start, int(1))
        }
        _ => binary(BinaryOperator::Add, start, int(1)),
    }
}
