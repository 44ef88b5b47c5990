//! The ordered pass pipeline.
//!
//! Each pass consumes the previous pass's output tree; the parameter map is
//! read-only throughout. Fatal conditions surface at the earliest pass able
//! to detect them, never at emission or as an engine-side parse error.

use crate::context::TranslationContext;
use crate::error::Result;
use crate::passes;
use crate::translators;
use model::params::ParameterValues;
use sqlgen::ast::statement::Statement;
use sqlgen::dialect::Jet;
use sqlgen::render::{ParamBinding, Render, Renderer};
use tracing::debug;

#[derive(Debug, Default, Clone)]
pub struct CompilerOptions {
    /// Split execution correlates the rows of multiple round-trips by key,
    /// which hardens the offset-without-order failure policy.
    pub split_query: bool,
}

/// The outcome of a successful compilation: final SQL text, parameter
/// placeholders in emission order, and whether the plan may be reused across
/// executions with different parameter values.
#[derive(Debug, Clone)]
pub struct Compilation {
    pub sql: String,
    pub params: Vec<ParamBinding>,
    pub can_cache: bool,
}

/// Compiles a relational tree into SQL text for the engine.
pub fn compile(
    statement: Statement,
    params: &ParameterValues,
    options: &CompilerOptions,
) -> Result<Compilation> {
    let mut ctx = TranslationContext::new(options.split_query, &statement);

    let statement = translators::translate_statement(statement)?;
    debug!("host calls translated");

    let statement = passes::classify::classify_statement(statement);
    debug!("expressions classified");

    let statement = passes::zero_limit::collapse_statement(statement, params, &mut ctx);
    let statement = passes::pagination::rewrite_statement(statement, params, &mut ctx)?;
    debug!("pagination rewritten");

    let statement = passes::normalize::normalize_statement(statement);
    let statement = passes::ordering_lift::lift_statement(statement, &mut ctx);

    passes::guard::check_statement(&statement)?;

    let dialect = Jet;
    let mut renderer = Renderer::new(&dialect);
    statement.render(&mut renderer);
    let (sql, bindings) = renderer.finish();

    debug!(cacheable = ctx.is_cacheable(), "compilation finished");
    Ok(Compilation {
        sql,
        params: bindings,
        can_cache: ctx.is_cacheable(),
    })
}
