//! Top-level statement forms handed to the compiler.

use crate::ast::{common::TableRef, expr::ScalarExpr, select::Query};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Statement {
    Select(Query),
    Update(UpdateStatement),
    Delete(DeleteStatement),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct UpdateStatement {
    pub table: TableRef,
    pub assignments: Vec<Assignment>,
    pub predicate: Option<ScalarExpr>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Assignment {
    pub column: String,
    pub value: ScalarExpr,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct DeleteStatement {
    pub table: TableRef,
    pub predicate: Option<ScalarExpr>,
}
