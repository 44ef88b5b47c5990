use thiserror::Error;

/// A translation failure. Every variant is fatal to the compilation attempt
/// that raised it; there is no recovery or retry inside the pipeline.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TranslationError {
    // --- Unsupported constructs (compatibility guard) ---
    #[error("row-numbering window functions have no translation for this engine")]
    RowNumber,

    #[error("CROSS APPLY has no translation for this engine")]
    CrossApply,

    #[error("OUTER APPLY has no translation for this engine")]
    OuterApply,

    #[error("EXCEPT has no translation for this engine")]
    Except,

    #[error("INTERSECT has no translation for this engine")]
    Intersect,

    #[error("JSON path access '{path}' has no translation for this engine")]
    JsonPath { path: String },

    // --- Unsupported argument shapes (function translators) ---
    #[error("millisecond date parts are not representable by this engine")]
    MillisecondDatePart,

    #[error("string comparison mode {mode} has no translation for this engine")]
    StringComparisonMode { mode: String },

    #[error("byte array length cannot be translated faithfully by this engine")]
    ByteArrayLength,

    #[error("trim with an explicit character set has no translation for this engine")]
    TrimWithArguments,

    #[error("call {call} was not translated into the engine vocabulary")]
    UntranslatedCall { call: String },

    #[error("call {call} expected {expected} arguments, got {actual}")]
    InvalidCallArity {
        call: String,
        expected: usize,
        actual: usize,
    },

    // --- Structural preconditions (pagination rewriter) ---
    #[error(
        "a row offset requires an explicit ordering when the query is split \
         across multiple round-trips"
    )]
    SplitQueryOffsetWithoutOrderBy,

    #[error("a row offset with no projected column to order by cannot be emulated")]
    UnorderedOffset,

    #[error("skipping rows without a following row limit has no translation for this engine")]
    SkipWithoutTake,

    #[error("parameter '{name}' has no bound value")]
    ParameterNotBound { name: String },

    #[error("the engine's front-N clause only accepts a literal row count")]
    NonConstantLimit,

    #[error("a row offset survived to emission without being emulated")]
    UnresolvedOffset,
}

pub type Result<T> = std::result::Result<T, TranslationError>;
