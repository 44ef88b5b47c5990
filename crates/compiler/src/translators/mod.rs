//! Rewrites host-library calls into the engine's built-in vocabulary.
//!
//! One pure mapping function per call domain; the dispatch is exhaustive
//! over the closed [`HostCall`] enumeration. A recognized call whose
//! argument shape the engine cannot honor is a definitive error naming the
//! unsupported feature, so the diagnostic surfaces here rather than as a
//! generic failure later in the pipeline.

use crate::error::{Result, TranslationError};
use sqlgen::ast::calls::HostCall;
use sqlgen::ast::expr::{HostCallExpr, ScalarExpr};
use sqlgen::ast::statement::Statement;
use sqlgen::ast::walk;

mod bytes;
mod convert;
mod datetime;
mod guid;
mod math;
mod strings;

/// Rewrites every host call in the statement, innermost first.
pub fn translate_statement(statement: Statement) -> Result<Statement> {
    walk::try_map_statement(statement, &mut |expr| match expr {
        ScalarExpr::Call(call) => translate_call(*call),
        other => Ok(other),
    })
}

fn translate_call(expr: HostCallExpr) -> Result<ScalarExpr> {
    let HostCallExpr { call, args, .. } = expr;
    match call {
        HostCall::DateTime(call) => datetime::translate(call, args),
        HostCall::Str(call) => strings::translate(call, args),
        HostCall::Math(call) => math::translate(call, args),
        HostCall::Convert(call) => convert::translate(call, args),
        HostCall::Guid(call) => guid::translate(call, args),
        HostCall::Bytes(call) => bytes::translate(call, args),
    }
}

/// Destructures the argument list into a fixed arity, failing with a precise
/// diagnostic on a mismatch.
fn take_args<const N: usize>(call: &str, args: Vec<ScalarExpr>) -> Result<[ScalarExpr; N]> {
    <[ScalarExpr; N]>::try_from(args).map_err(|args| TranslationError::InvalidCallArity {
        call: call.to_string(),
        expected: N,
        actual: args.len(),
    })
}
