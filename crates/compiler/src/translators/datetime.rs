//! Date and time rewrites.
//!
//! The engine expresses all date arithmetic and extraction through two
//! built-ins taking a date-part code string: `DATEADD('m', n, d)` and
//! `DATEPART('m', d)`. Sub-second precision does not exist in the store
//! type, so millisecond operations fail translation outright rather than
//! silently truncating.

use crate::error::{Result, TranslationError};
use crate::translators::take_args;
use model::core::data_type::SemanticType;
use sqlgen::ast::calls::{DatePart, DateTimeCall};
use sqlgen::ast::expr::ScalarExpr;
use sqlgen::{text, typed_func};

pub(crate) fn translate(call: DateTimeCall, args: Vec<ScalarExpr>) -> Result<ScalarExpr> {
    match call {
        DateTimeCall::Add(part) => {
            let code = part_code(part)?;
            let [base, amount] = take_args("DateTime.Add", args)?;
            Ok(typed_func(
                "DATEADD",
                vec![text(code), amount, base],
                SemanticType::DateTime,
            ))
        }
        DateTimeCall::Part(part) => {
            let code = part_code(part)?;
            let [base] = take_args("DateTime.Part", args)?;
            Ok(typed_func(
                "DATEPART",
                vec![text(code), base],
                SemanticType::Int32,
            ))
        }
        DateTimeCall::Now => {
            let [] = take_args("DateTime.Now", args)?;
            Ok(typed_func("NOW", vec![], SemanticType::DateTime))
        }
        DateTimeCall::Today => {
            let [] = take_args("DateTime.Today", args)?;
            Ok(typed_func("DATE", vec![], SemanticType::DateTime))
        }
    }
}

fn part_code(part: DatePart) -> Result<&'static str> {
    part.code().ok_or(TranslationError::MillisecondDatePart)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlgen::{ident, int};

    #[test]
    fn test_add_days_uses_date_part_code() {
        let result = translate(
            DateTimeCall::Add(DatePart::Day),
            vec![ident("created_at"), int(3)],
        )
        .unwrap();
        match result {
            ScalarExpr::Function(f) => {
                assert_eq!(f.name, "DATEADD");
                assert_eq!(f.args[0], text("d"));
            }
            other => panic!("expected function, got {other:?}"),
        }
    }

    #[test]
    fn test_minute_code_is_n() {
        let result = translate(DateTimeCall::Part(DatePart::Minute), vec![ident("ts")]).unwrap();
        match result {
            ScalarExpr::Function(f) => assert_eq!(f.args[0], text("n")),
            other => panic!("expected function, got {other:?}"),
        }
    }

    #[test]
    fn test_milliseconds_fail_translation() {
        let err = translate(
            DateTimeCall::Add(DatePart::Millisecond),
            vec![ident("ts"), int(1)],
        )
        .unwrap_err();
        assert_eq!(err, TranslationError::MillisecondDatePart);
    }
}
