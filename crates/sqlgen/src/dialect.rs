//! Defines the `Dialect` trait for engine-specific SQL syntax.

use crate::like;
use model::core::value::Value;

pub trait Dialect: Send + Sync {
    /// Wraps an identifier (like a table or column name) in the correct
    /// quotation marks for the dialect.
    fn quote_identifier(&self, ident: &str) -> String;

    /// Returns the placeholder for a parameterized query.
    fn placeholder(&self, index: usize) -> String;

    /// Renders a value as an inline SQL literal.
    fn format_literal(&self, value: &Value) -> String;

    /// The escape character declared in generated `ESCAPE` clauses.
    fn like_escape_char(&self) -> char;

    /// Escapes pattern-match metacharacters in a constant pattern fragment.
    fn escape_like_pattern(&self, fragment: &str) -> String;

    /// Returns the name of the dialect.
    fn name(&self) -> String;
}

/// The legacy desktop engine dialect: bracket-quoted identifiers, positional
/// `?` placeholders, a literal-only front-N clause, and `#`-delimited date
/// literals.
#[derive(Debug, Clone)]
pub struct Jet;

impl Dialect for Jet {
    fn quote_identifier(&self, ident: &str) -> String {
        format!("[{ident}]")
    }

    fn placeholder(&self, _index: usize) -> String {
        // Positional placeholders only.
        "?".into()
    }

    fn format_literal(&self, value: &Value) -> String {
        match value {
            Value::Int(v) => v.to_string(),
            Value::Float(v) => v.to_string(),
            Value::Decimal(v) => v.to_string(),
            Value::String(v) => format!("'{}'", v.replace('\'', "''")),
            Value::Boolean(v) => if *v { "TRUE" } else { "FALSE" }.into(),
            Value::Uuid(v) => format!("{{guid {{{v}}}}}"),
            Value::Date(v) => format!("#{}#", v.format("%Y-%m-%d")),
            Value::DateTime(v) => format!("#{}#", v.format("%Y-%m-%d %H:%M:%S")),
            Value::Bytes(v) => {
                let mut hex = String::with_capacity(2 + v.len() * 2);
                hex.push_str("0x");
                for byte in v {
                    hex.push_str(&format!("{byte:02x}"));
                }
                hex
            }
            Value::Null => "NULL".into(),
        }
    }

    fn like_escape_char(&self) -> char {
        like::ESCAPE_CHAR
    }

    fn escape_like_pattern(&self, fragment: &str) -> String {
        like::escape_pattern(fragment)
    }

    fn name(&self) -> String {
        "Jet".into()
    }
}
