//! Defines the core rendering trait and context for converting AST to SQL.

use crate::ast::expr::ParamTransform;
use crate::dialect::Dialect;
use model::core::value::Value;
use serde::{Deserialize, Serialize};

pub mod expr;
pub mod select;
pub mod statement;

/// A trait for any AST node that can be rendered into a SQL string.
pub trait Render {
    fn render(&self, renderer: &mut Renderer);
}

/// A parameter placeholder in emission order, together with the bind-time
/// transform the executor must apply to the raw value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParamBinding {
    pub name: String,
    pub transform: ParamTransform,
}

/// A context that holds the state during the rendering process.
///
/// It accumulates the SQL string and the ordered parameter bindings, and
/// provides access to the dialect for syntax-specific details.
pub struct Renderer<'a> {
    pub sql: String,
    pub params: Vec<ParamBinding>,
    pub dialect: &'a dyn Dialect,
}

impl<'a> Renderer<'a> {
    pub fn new(dialect: &'a dyn Dialect) -> Self {
        Self {
            sql: String::new(),
            params: Vec::new(),
            dialect,
        }
    }

    /// Consumes the renderer and returns the final SQL string and bindings.
    pub fn finish(self) -> (String, Vec<ParamBinding>) {
        (self.sql, self.params)
    }

    pub fn add_param(&mut self, name: String, transform: ParamTransform) {
        self.params.push(ParamBinding { name, transform });
        let placeholder = self.dialect.placeholder(self.params.len() - 1);
        self.sql.push_str(&placeholder);
    }

    pub fn push_literal(&mut self, value: &Value) {
        let literal = self.dialect.format_literal(value);
        self.sql.push_str(&literal);
    }

    pub fn push_ident(&mut self, ident: &str) {
        let quoted = self.dialect.quote_identifier(ident);
        self.sql.push_str(&quoted);
    }
}
