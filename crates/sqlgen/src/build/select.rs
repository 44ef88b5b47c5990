//! Provides a type-safe, fluent builder for constructing `Select` ASTs.

// --- Typestate Marker Structs ---
// These zero-sized structs represent the state of the builder.
// They ensure that methods are called in the correct SQL order at compile time.

use crate::ast::{
    common::{JoinKind, TableRef},
    expr::ScalarExpr,
    select::{
        DerivedSource, JoinSource, OrderByExpr, Projection, Query, Select, Source, TableSource,
    },
};

/// The initial state of the builder before any clauses have been added.
#[derive(Debug, Default, Clone)]
pub struct InitialState;

/// The state after the `SELECT` clause has been added.
#[derive(Debug, Default, Clone)]
pub struct SelectState;

/// The state after the `FROM` clause has been added.
#[derive(Debug, Default, Clone)]
pub struct FromState;

// --- The Main Builder ---

#[derive(Debug, Clone)]
pub struct SelectBuilder<State> {
    pub ast: Select,
    state: State,
}

impl Default for SelectBuilder<InitialState> {
    fn default() -> Self {
        Self::new()
    }
}

/// Implementation for the initial state of the builder.
impl SelectBuilder<InitialState> {
    pub fn new() -> Self {
        Self {
            ast: Select::default(),
            state: InitialState,
        }
    }

    /// Adds a `SELECT` clause with a list of projections.
    /// This is the entry point for building a select query.
    pub fn select(mut self, projections: Vec<Projection>) -> SelectBuilder<SelectState> {
        self.ast.projections = projections;
        SelectBuilder {
            ast: self.ast,
            state: SelectState,
        }
    }
}

/// Implementation for the state after `SELECT` has been called.
/// The only valid next step is to specify a `FROM` source.
impl SelectBuilder<SelectState> {
    pub fn distinct(mut self) -> Self {
        self.ast.distinct = true;
        self
    }

    /// Adds a `FROM` clause specifying the primary table.
    pub fn from(mut self, table: TableRef, alias: Option<&str>) -> SelectBuilder<FromState> {
        self.ast.from.push(Source::Table(TableSource {
            table,
            alias: alias.map(String::from),
        }));
        SelectBuilder {
            ast: self.ast,
            state: FromState,
        }
    }

    /// Adds a `FROM` clause over a derived table.
    pub fn from_query(mut self, query: Query, alias: &str) -> SelectBuilder<FromState> {
        self.ast.from.push(Source::Derived(DerivedSource {
            query: Box::new(query),
            alias: alias.to_string(),
        }));
        SelectBuilder {
            ast: self.ast,
            state: FromState,
        }
    }
}

/// Implementation for the state after `FROM` has been called.
/// From here, we can add optional clauses like `JOIN`, `WHERE`, etc.
impl SelectBuilder<FromState> {
    /// Adds a `JOIN` clause to the query.
    pub fn join(
        mut self,
        kind: JoinKind,
        table: TableRef,
        alias: Option<&str>,
        on: Option<ScalarExpr>,
    ) -> Self {
        self.ast.from.push(Source::Join(Box::new(JoinSource {
            kind,
            source: Source::Table(TableSource {
                table,
                alias: alias.map(String::from),
            }),
            on,
        })));
        self
    }

    /// Adds a `WHERE` clause to the query.
    pub fn where_clause(mut self, condition: ScalarExpr) -> Self {
        self.ast.predicate = Some(condition);
        self
    }

    /// Adds a `GROUP BY` expression to the query.
    pub fn group_by(mut self, expr: ScalarExpr) -> Self {
        self.ast.group_by.push(expr);
        self
    }

    /// Adds a `HAVING` clause to the query.
    pub fn having(mut self, condition: ScalarExpr) -> Self {
        self.ast.having = Some(condition);
        self
    }

    /// Adds an `ORDER BY` expression to the query.
    pub fn order_by(mut self, expr: ScalarExpr, ascending: bool) -> Self {
        self.ast.order_by.push(OrderByExpr { expr, ascending });
        self
    }

    /// Adds a row-count limit to the query.
    pub fn limit(mut self, limit: ScalarExpr) -> Self {
        self.ast.limit = Some(limit);
        self
    }

    /// Finalizes and returns the constructed `Select` AST.
    pub fn build(self) -> Select {
        self.ast
    }

    /// Finalizes the builder into a composable query.
    pub fn into_query(self) -> Query {
        Query::Select(self.ast)
    }
}
