//! Type-coercion rewrites onto the engine's single-letter coercion family.

use crate::error::Result;
use crate::translators::take_args;
use model::core::data_type::SemanticType;
use sqlgen::ast::calls::ConvertCall;
use sqlgen::ast::expr::ScalarExpr;
use sqlgen::typed_func;

pub(crate) fn translate(call: ConvertCall, args: Vec<ScalarExpr>) -> Result<ScalarExpr> {
    let [operand] = take_args("Convert", args)?;
    let (builtin, semantic) = match call {
        ConvertCall::ToBoolean => ("CBOOL", SemanticType::Boolean),
        ConvertCall::ToByte => ("CBYTE", SemanticType::Byte),
        ConvertCall::ToInt16 => ("CINT", SemanticType::Int16),
        ConvertCall::ToInt32 => ("CLNG", SemanticType::Int32),
        // The decimal coercion is unreliable in the engine; 64-bit and
        // decimal conversions route through the currency coercion instead.
        ConvertCall::ToInt64 => ("CCUR", SemanticType::Int64),
        ConvertCall::ToDecimal => ("CCUR", SemanticType::Decimal),
        ConvertCall::ToSingle => ("CSNG", SemanticType::Single),
        ConvertCall::ToDouble => ("CDBL", SemanticType::Double),
        ConvertCall::ToDateTime => ("CDATE", SemanticType::DateTime),
        ConvertCall::ToText => ("CSTR", SemanticType::Text),
    };
    Ok(typed_func(builtin, vec![operand], semantic))
}
