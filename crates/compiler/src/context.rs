//! Per-compilation transient state.

use sqlgen::ast::statement::Statement;
use sqlgen::build::compose::fresh_alias;

/// Whether the compiled plan may be reused across executions with different
/// parameter values. Poisoning is monotonic: once a pass bakes a
/// value-dependent decision into the tree, the flag never recovers.
#[derive(Debug, Clone)]
pub struct Cacheability(bool);

impl Cacheability {
    pub fn new() -> Self {
        Cacheability(true)
    }

    pub fn poison(&mut self) {
        self.0 = false;
    }

    pub fn is_cacheable(&self) -> bool {
        self.0
    }
}

impl Default for Cacheability {
    fn default() -> Self {
        Self::new()
    }
}

/// State threaded through the passes of a single compilation request.
/// Never shared between concurrent compilations.
#[derive(Debug)]
pub struct TranslationContext {
    pub split_query: bool,
    cache: Cacheability,
    next_alias: usize,
}

impl TranslationContext {
    pub fn new(split_query: bool, statement: &Statement) -> Self {
        let next_alias = match statement {
            Statement::Select(query) => seed_alias_index(&fresh_alias(query)),
            Statement::Update(_) | Statement::Delete(_) => 0,
        };
        Self {
            split_query,
            cache: Cacheability::new(),
            next_alias,
        }
    }

    /// A derived-table alias unused by any scope in the input tree.
    pub fn fresh_alias(&mut self) -> String {
        let alias = format!("t{}", self.next_alias);
        self.next_alias += 1;
        alias
    }

    pub fn poison_cache(&mut self) {
        self.cache.poison();
    }

    pub fn is_cacheable(&self) -> bool {
        self.cache.is_cacheable()
    }
}

fn seed_alias_index(alias: &str) -> usize {
    alias
        .strip_prefix('t')
        .and_then(|rest| rest.parse::<usize>().ok())
        .unwrap_or(0)
}
