//! Defines the AST for scalar expressions.

use crate::ast::calls::HostCall;
use crate::ast::select::{OrderByExpr, Query};
use model::core::{data_type::TypeMapping, value::Value};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ScalarExpr {
    /// A column reference, e.g. `[u].[id]`.
    Column(ColumnRef),

    /// A literal value, inlined into the generated text.
    Constant(Constant),

    /// A runtime parameter, emitted as a positional placeholder.
    Parameter(ParameterRef),

    /// A host-library call not yet rewritten into the engine's vocabulary.
    Call(Box<HostCallExpr>),

    /// A call to one of the engine's built-in functions.
    Function(Box<FunctionCall>),

    Binary(Box<BinaryExpr>),
    Unary(Box<UnaryExpr>),
    Case(Box<CaseExpr>),

    /// A subquery used in scalar position.
    Subquery(Box<SubqueryExpr>),

    Exists(Box<ExistsExpr>),
    In(Box<InExpr>),
    Like(Box<LikeExpr>),

    /// A row-numbering window; carried so the final guard can name it.
    RowNumber(Box<RowNumberExpr>),

    /// A scalar access into a JSON-typed column. An empty path is a plain
    /// column read; a non-empty path has no translation.
    JsonAccess(Box<JsonAccessExpr>),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ColumnRef {
    pub table: Option<String>,
    pub name: String,
    pub ty: Option<TypeMapping>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Constant {
    pub value: Value,
    pub ty: Option<TypeMapping>,
}

/// How a parameter's bound value must be reshaped before it is handed to the
/// statement-execution layer.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ParamTransform {
    #[default]
    Raw,
    /// Escape pattern-match metacharacters in the bound value, then wrap it
    /// in the given wildcards. Registered for parameterized `LIKE` patterns,
    /// which cannot be escaped until the value is known.
    LikePattern { prefix: String, suffix: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ParameterRef {
    pub name: String,
    pub ty: Option<TypeMapping>,
    pub transform: ParamTransform,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct HostCallExpr {
    pub call: HostCall,
    pub args: Vec<ScalarExpr>,
    pub ty: Option<TypeMapping>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct FunctionCall {
    pub name: String,
    pub args: Vec<ScalarExpr>,
    pub ty: Option<TypeMapping>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct BinaryExpr {
    pub op: BinaryOperator,
    pub left: ScalarExpr,
    pub right: ScalarExpr,
    pub ty: Option<TypeMapping>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct UnaryExpr {
    pub op: UnaryOperator,
    pub operand: ScalarExpr,
    pub ty: Option<TypeMapping>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct CaseExpr {
    /// Present for the simple form `CASE x WHEN ... END`.
    pub operand: Option<ScalarExpr>,
    pub branches: Vec<CaseBranch>,
    pub else_result: Option<ScalarExpr>,
    pub ty: Option<TypeMapping>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct CaseBranch {
    pub when: ScalarExpr,
    pub then: ScalarExpr,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct SubqueryExpr {
    pub query: Query,
    pub ty: Option<TypeMapping>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ExistsExpr {
    pub query: Query,
    pub negated: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct InExpr {
    pub expr: ScalarExpr,
    pub set: InSet,
    pub negated: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum InSet {
    List(Vec<ScalarExpr>),
    Subquery(Query),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct LikeExpr {
    pub expr: ScalarExpr,
    pub pattern: ScalarExpr,
    pub escape: Option<char>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct RowNumberExpr {
    pub partition_by: Vec<ScalarExpr>,
    pub order_by: Vec<OrderByExpr>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct JsonAccessExpr {
    pub column: ColumnRef,
    pub path: Vec<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    // Comparison
    Eq,    // =
    NotEq, // <>
    Lt,    // <
    LtEq,  // <=
    Gt,    // >
    GtEq,  // >=

    // Logical
    And,
    Or,
    Xor,

    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,

    // String
    Concat,
}

impl BinaryOperator {
    pub fn is_comparison(&self) -> bool {
        use BinaryOperator::*;
        matches!(self, Eq | NotEq | Lt | LtEq | Gt | GtEq)
    }

    pub fn is_logical(&self) -> bool {
        matches!(self, BinaryOperator::And | BinaryOperator::Or)
    }

    /// The complementary operator for equality forms. Only `=`/`<>` are
    /// flipped; the engine parses negated inequalities inconsistently, so
    /// those stay wrapped in `NOT`.
    pub fn negated(&self) -> Option<BinaryOperator> {
        match self {
            BinaryOperator::Eq => Some(BinaryOperator::NotEq),
            BinaryOperator::NotEq => Some(BinaryOperator::Eq),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum UnaryOperator {
    Not,
    Negate,
    IsNull,
    IsNotNull,
}

impl ScalarExpr {
    pub fn type_mapping(&self) -> Option<&TypeMapping> {
        match self {
            ScalarExpr::Column(c) => c.ty.as_ref(),
            ScalarExpr::Constant(c) => c.ty.as_ref(),
            ScalarExpr::Parameter(p) => p.ty.as_ref(),
            ScalarExpr::Call(c) => c.ty.as_ref(),
            ScalarExpr::Function(f) => f.ty.as_ref(),
            ScalarExpr::Binary(b) => b.ty.as_ref(),
            ScalarExpr::Unary(u) => u.ty.as_ref(),
            ScalarExpr::Case(c) => c.ty.as_ref(),
            ScalarExpr::Subquery(s) => s.ty.as_ref(),
            ScalarExpr::JsonAccess(j) => j.column.ty.as_ref(),
            ScalarExpr::Exists(_)
            | ScalarExpr::In(_)
            | ScalarExpr::Like(_)
            | ScalarExpr::RowNumber(_) => None,
        }
    }

    /// True when the node is shaped like a predicate: something the dialect
    /// accepts directly in `WHERE`/`ON`/`HAVING` position.
    pub fn is_predicate_shaped(&self) -> bool {
        match self {
            ScalarExpr::Binary(b) => {
                b.op.is_comparison() || b.op.is_logical() || b.op == BinaryOperator::Xor
            }
            ScalarExpr::Unary(u) => matches!(
                u.op,
                UnaryOperator::Not | UnaryOperator::IsNull | UnaryOperator::IsNotNull
            ),
            ScalarExpr::Exists(_) | ScalarExpr::In(_) | ScalarExpr::Like(_) => true,
            _ => false,
        }
    }

    /// True when the node is a boolean-typed scalar, the shape that needs a
    /// `= TRUE` comparison to become a predicate and that participates in
    /// the XOR equality rewrite.
    pub fn is_boolean_typed(&self) -> bool {
        if let Some(mapping) = self.type_mapping() {
            return mapping.semantic.is_boolean();
        }
        matches!(
            self,
            ScalarExpr::Constant(c) if matches!(c.value, Value::Boolean(_))
        )
    }
}
