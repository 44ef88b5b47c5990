//! Defines the AST for a SELECT query and its source clauses.

use crate::ast::{
    common::{ApplyKind, JoinKind, SetOpKind, TableRef},
    expr::ScalarExpr,
};
use model::core::data_type::TypeMapping;
use serde::{Deserialize, Serialize};

/// A relational query. Pending pagination states are part of the union so a
/// deferred skip is visible in the type system rather than encoded as a tag
/// on a select node.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Query {
    Select(Select),

    /// An offset-only pagination request. The window arithmetic is deferred
    /// until a row-count limit is composed on the same logical query; the
    /// pagination pass refuses to emit a query still in this state.
    PendingSkip(PendingSkip),

    SetOp(Box<SetOpQuery>),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct PendingSkip {
    pub select: Box<Select>,
    pub offset: ScalarExpr,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct SetOpQuery {
    pub kind: SetOpKind,
    pub all: bool,
    pub left: Query,
    pub right: Query,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Select {
    pub distinct: bool,

    /// The projected expressions and their aliases.
    pub projections: Vec<Projection>,

    /// The FROM clause sources. Join arms attach to the preceding source.
    pub from: Vec<Source>,

    /// The WHERE clause condition.
    pub predicate: Option<ScalarExpr>,

    pub group_by: Vec<ScalarExpr>,
    pub having: Option<ScalarExpr>,

    pub order_by: Vec<OrderByExpr>,

    /// Row-window start. Only legal transiently mid-pipeline; the engine has
    /// no concept of unordered pagination, so this must be rewritten away or
    /// rejected before emission.
    pub offset: Option<ScalarExpr>,

    /// Row-count cap, emitted as the engine's front-N clause.
    pub limit: Option<ScalarExpr>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Projection {
    pub expr: ScalarExpr,
    pub alias: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct OrderByExpr {
    pub expr: ScalarExpr,
    pub ascending: bool,
}

impl OrderByExpr {
    pub fn reversed(&self) -> OrderByExpr {
        OrderByExpr {
            expr: self.expr.clone(),
            ascending: !self.ascending,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Source {
    Table(TableSource),
    Derived(DerivedSource),
    Join(Box<JoinSource>),
    Apply(Box<ApplySource>),
    Values(ValuesSource),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct TableSource {
    pub table: TableRef,
    pub alias: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct DerivedSource {
    pub query: Box<Query>,
    pub alias: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct JoinSource {
    pub kind: JoinKind,
    pub source: Source,
    /// The join condition; absent for cross joins.
    pub on: Option<ScalarExpr>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ApplySource {
    pub kind: ApplyKind,
    pub source: Source,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ValuesSource {
    pub rows: Vec<Vec<ScalarExpr>>,
    pub column_aliases: Vec<String>,
    pub alias: String,
}

impl Source {
    /// The alias (or table name) this source binds in the enclosing scope.
    pub fn binding_name(&self) -> Option<&str> {
        match self {
            Source::Table(t) => Some(t.alias.as_deref().unwrap_or(&t.table.name)),
            Source::Derived(d) => Some(&d.alias),
            Source::Join(j) => j.source.binding_name(),
            Source::Apply(a) => a.source.binding_name(),
            Source::Values(v) => Some(&v.alias),
        }
    }
}

impl Select {
    /// The output column name of the projection at `index`: the explicit
    /// alias, the column's own name for a bare column reference, or a
    /// positional fallback.
    pub fn projection_name(&self, index: usize) -> String {
        let projection = &self.projections[index];
        if let Some(alias) = &projection.alias {
            return alias.clone();
        }
        if let ScalarExpr::Column(c) = &projection.expr {
            return c.name.clone();
        }
        format!("c{index}")
    }

    /// All source binding names visible in this select's own scope.
    pub fn scope_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        for source in &self.from {
            collect_binding_names(source, &mut names);
        }
        names
    }

    /// Index of a projection whose expression structurally equals `expr`.
    pub fn find_projection(&self, expr: &ScalarExpr) -> Option<usize> {
        self.projections.iter().position(|p| &p.expr == expr)
    }
}

fn collect_binding_names(source: &Source, names: &mut Vec<String>) {
    match source {
        Source::Table(t) => {
            names.push(t.alias.clone().unwrap_or_else(|| t.table.name.clone()));
        }
        Source::Derived(d) => names.push(d.alias.clone()),
        Source::Join(j) => collect_binding_names(&j.source, names),
        Source::Apply(a) => collect_binding_names(&a.source, names),
        Source::Values(v) => names.push(v.alias.clone()),
    }
}

impl Query {
    /// The output column names of the query's projected row shape.
    pub fn projection_names(&self) -> Vec<String> {
        match self {
            Query::Select(s) => (0..s.projections.len()).map(|i| s.projection_name(i)).collect(),
            Query::PendingSkip(p) => {
                (0..p.select.projections.len()).map(|i| p.select.projection_name(i)).collect()
            }
            Query::SetOp(op) => op.left.projection_names(),
        }
    }

    /// The type mappings of the query's projected row shape, parallel to
    /// [`Query::projection_names`].
    pub fn projection_types(&self) -> Vec<Option<TypeMapping>> {
        match self {
            Query::Select(s) => s
                .projections
                .iter()
                .map(|p| p.expr.type_mapping().cloned())
                .collect(),
            Query::PendingSkip(p) => p
                .select
                .projections
                .iter()
                .map(|proj| proj.expr.type_mapping().cloned())
                .collect(),
            Query::SetOp(op) => op.left.projection_types(),
        }
    }

    pub fn as_select(&self) -> Option<&Select> {
        match self {
            Query::Select(s) => Some(s),
            _ => None,
        }
    }
}
