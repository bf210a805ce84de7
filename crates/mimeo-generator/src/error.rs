//! Error types for context management, rendering and generation.

use mimeo_data::DataError;

/// Errors raised by execution contexts and the context manager.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ContextError {
    /// Operation attempted outside an active session
    #[error("Context manager instance is not alive: open a session first")]
    NotAlive,

    #[error("No current context has been set")]
    NoCurrentContext,

    #[error("Identifier of context '{0}' cannot go below zero")]
    MinimumIdentifierReached(String),

    #[error("No iteration has been initialized in context '{0}'")]
    UninitializedIteration(String),

    #[error("No iteration {iteration} in context '{context}'")]
    IterationNotFound { context: String, iteration: u64 },

    #[error("Special field '{0}' is already set in the current iteration")]
    SpecialFieldAlreadySet(String),
}

/// Errors raised while rendering a single value.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Provided variable [{0}] is not defined")]
    VarNotFound(String),

    #[error("Special field [{0}] does not exist in the current iteration")]
    SpecialFieldNotFound(String),

    #[error("No such Mimeo Util: {0}")]
    InvalidMimeoUtil(String),

    #[error("Invalid value for [{util}]: {reason}")]
    InvalidValue { util: String, reason: String },

    #[error("No data found: {0}")]
    DataNotFound(String),

    #[error("Invalid sex [{0}]: expected one of M, F, Male, Female")]
    InvalidSex(String),

    /// Every value of a unique draw has been used in the current context
    #[error("No more unique values for [{0}]")]
    OutOfStock(String),

    #[error("Field '{field}' of context '{context}' is referenced and must render to an atomic value")]
    InvalidReferenceValue { context: String, field: String },

    #[error("No reference named [{0}]")]
    ReferenceNotFound(String),

    #[error("Reference [{0}] has no cached values")]
    NonPopulatedReference(String),

    #[error("Only atomic values can be rendered")]
    NotAtomic,

    #[error(transparent)]
    Context(#[from] ContextError),

    #[error(transparent)]
    Data(#[from] DataError),
}

/// Errors raised while walking a template.
#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    #[error("Failed to render '{tag}': {source}")]
    Render {
        tag: String,
        #[source]
        source: RenderError,
    },

    #[error("Special field '{0}' must hold an atomic value")]
    InvalidSpecialField(String),

    #[error("Unsupported list item under '{tag}': {reason}")]
    UnsupportedArrayItem { tag: String, reason: String },

    #[error(transparent)]
    Context(#[from] ContextError),

    #[error(transparent)]
    Data(#[from] DataError),
}
