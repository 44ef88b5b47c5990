//! Query-level composition operations: skipping, taking, and the derived
//! wrappers they need.
//!
//! Skip and take cannot be applied independently, because the engine can
//! only cap rows from the front of the current order. A skip with no limit
//! yet is therefore held as [`Query::PendingSkip`] until a take (or a
//! terminal single-row consumer) completes the window.

use crate::ast::{
    expr::{BinaryOperator, ColumnRef, ScalarExpr},
    select::{DerivedSource, PendingSkip, Projection, Query, Select, Source},
};
use crate::{binary, int};

impl Query {
    /// Composes a row skip onto the query. Stacked skips accumulate by
    /// summing their offsets.
    pub fn skip(self, offset: ScalarExpr) -> Query {
        match self {
            Query::Select(select) if select.limit.is_none() && select.offset.is_none() => {
                Query::PendingSkip(PendingSkip {
                    select: Box::new(select),
                    offset,
                })
            }
            Query::PendingSkip(pending) => Query::PendingSkip(PendingSkip {
                select: pending.select,
                offset: binary(BinaryOperator::Add, pending.offset, offset),
            }),
            other => {
                let alias = fresh_alias(&other);
                let wrapper = other.into_derived_select(&alias);
                Query::PendingSkip(PendingSkip {
                    select: Box::new(wrapper),
                    offset,
                })
            }
        }
    }

    /// Composes a row-count limit onto the query, completing any pending
    /// skip into a concrete offset+limit window.
    pub fn take(self, limit: ScalarExpr) -> Query {
        match self {
            Query::Select(mut select) if select.limit.is_none() => {
                select.limit = Some(limit);
                Query::Select(select)
            }
            Query::PendingSkip(pending) => {
                let mut select = *pending.select;
                select.offset = Some(pending.offset);
                select.limit = Some(limit);
                Query::Select(select)
            }
            other => {
                let alias = fresh_alias(&other);
                let mut wrapper = other.into_derived_select(&alias);
                wrapper.limit = Some(limit);
                Query::Select(wrapper)
            }
        }
    }

    /// The terminal single-row consumer: equivalent to taking one row, which
    /// also resolves a pending skip.
    pub fn first(self) -> Query {
        self.take(int(1))
    }

    /// Pushes the query down into a derived table and builds a passthrough
    /// select over it, preserving the projected row shape.
    pub fn into_derived_select(mut self, alias: &str) -> Select {
        // Projections without an addressable output name get one, so the
        // passthrough columns can reference them.
        if let Query::Select(select) = &mut self {
            for i in 0..select.projections.len() {
                let name = select.projection_name(i);
                let projection = &mut select.projections[i];
                if projection.alias.is_none()
                    && !matches!(projection.expr, ScalarExpr::Column(_))
                {
                    projection.alias = Some(name);
                }
            }
        }
        let names = self.projection_names();
        let types = self.projection_types();
        let projections = names
            .into_iter()
            .zip(types)
            .map(|(name, ty)| Projection {
                expr: ScalarExpr::Column(ColumnRef {
                    table: Some(alias.to_string()),
                    name: name.clone(),
                    ty,
                }),
                alias: Some(name),
            })
            .collect();

        Select {
            projections,
            from: vec![Source::Derived(DerivedSource {
                query: Box::new(self),
                alias: alias.to_string(),
            })],
            ..Default::default()
        }
    }
}

/// Returns a derived-table alias unused by any select scope in the query.
pub fn fresh_alias(query: &Query) -> String {
    let mut max_index = 0;
    scan_query(query, &mut max_index);
    format!("t{max_index}")
}

fn scan_query(query: &Query, max_index: &mut usize) {
    match query {
        Query::Select(select) => scan_select(select, max_index),
        Query::PendingSkip(pending) => scan_select(&pending.select, max_index),
        Query::SetOp(op) => {
            scan_query(&op.left, max_index);
            scan_query(&op.right, max_index);
        }
    }
}

fn scan_select(select: &Select, max_index: &mut usize) {
    for source in &select.from {
        scan_source(source, max_index);
    }
}

fn scan_source(source: &Source, max_index: &mut usize) {
    match source {
        Source::Derived(derived) => {
            note_alias(&derived.alias, max_index);
            scan_query(&derived.query, max_index);
        }
        Source::Join(join) => scan_source(&join.source, max_index),
        Source::Apply(apply) => scan_source(&apply.source, max_index),
        Source::Table(_) | Source::Values(_) => {}
    }
}

fn note_alias(alias: &str, max_index: &mut usize) {
    if let Some(rest) = alias.strip_prefix('t') {
        if let Ok(index) = rest.parse::<usize>() {
            *max_index = (*max_index).max(index + 1);
        }
    }
}
