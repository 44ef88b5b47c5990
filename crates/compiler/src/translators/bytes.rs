//! Byte-array rewrites.
//!
//! The engine has no array or blob indexing primitive; element access rides
//! on the byte-oriented string functions. Length does not: `LENB` reports
//! storage length, which disagrees with the host array length for anything
//! but the trivial cases, so it is refused outright.

use crate::error::{Result, TranslationError};
use crate::translators::take_args;
use model::core::data_type::SemanticType;
use sqlgen::ast::calls::BytesCall;
use sqlgen::ast::expr::{BinaryOperator, ScalarExpr};
use sqlgen::{binary, int, typed_func};

pub(crate) fn translate(call: BytesCall, args: Vec<ScalarExpr>) -> Result<ScalarExpr> {
    match call {
        BytesCall::ElementAt => {
            let [bytes, index] = take_args("Bytes.ElementAt", args)?;
            let slice = typed_func(
                "MIDB",
                vec![bytes, binary(BinaryOperator::Add, index, int(1)), int(1)],
                SemanticType::Binary,
            );
            Ok(typed_func("ASCB", vec![slice], SemanticType::Byte))
        }
        BytesCall::Length => Err(TranslationError::ByteArrayLength),
    }
}
