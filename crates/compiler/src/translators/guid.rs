//! GUID rewrites.

use crate::error::Result;
use crate::translators::take_args;
use model::core::data_type::SemanticType;
use sqlgen::ast::calls::GuidCall;
use sqlgen::ast::expr::ScalarExpr;
use sqlgen::typed_func;

pub(crate) fn translate(call: GuidCall, args: Vec<ScalarExpr>) -> Result<ScalarExpr> {
    match call {
        GuidCall::NewGuid => {
            let [] = take_args("Guid.NewGuid", args)?;
            Ok(typed_func("GENGUID", vec![], SemanticType::Guid))
        }
    }
}
