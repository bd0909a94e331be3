//! Error kinds raised against live data (spec §7). `TemplateSyntaxError`
//! (compile-time) lives in `lvt-template`; everything here is raised while
//! hydrating, keying, or planning against a concrete state value.

/// Raised by the hydrator (C3) when evaluating a construct against live
/// data fails. The session survives; the caller reports this to the
/// client and retains the last good tree (spec §4.7).
#[derive(Debug, Clone, thiserror::Error)]
#[non_exhaustive]
pub enum RenderError {
    #[error("field `{path}` is undefined on the current value")]
    UndefinedField { path: String },

    #[error("variable `${name}` is not bound in the current scope")]
    UnboundVariable { name: String },

    #[error("`{func}` expected {expected} argument(s), got {got}")]
    ArityMismatch { func: String, expected: usize, got: usize },

    #[error("`{func}` received an argument of the wrong type")]
    TypeMismatch { func: String },

    #[error("unknown function `{name}` called at render time")]
    UnknownFunctionAtRuntime { name: String },

    #[error("range expression did not evaluate to an array or object: {path}")]
    NotIterable { path: String },

    #[error("`{{{{template \"{name}\"}}}}`/`{{{{block}}}}` refers to an undefined template name")]
    UnknownTemplate { name: String },

    /// A range yielded a duplicate key while hydrating (see [`DuplicateKeyError`]).
    #[error(transparent)]
    DuplicateKey(#[from] DuplicateKeyError),
}

/// Raised by the key generator (C2) when a range yields a duplicate
/// attribute-provided key (spec open question: attribute keys win
/// unconditionally; a duplicate after that is fatal rather than silently
/// rewritten).
#[derive(Debug, Clone, thiserror::Error)]
#[error("duplicate range key `{key}` in range at `{range_path}`")]
pub struct DuplicateKeyError {
    pub key: String,
    pub range_path: String,
}

/// Raised by the range-op planner (C6) when the matched old/new key sets
/// are internally inconsistent (duplicate or missing keys after matching).
#[derive(Debug, Clone, thiserror::Error)]
#[error("range invariant violated while planning ops for `{range_path}`: {reason}")]
pub struct RangeInvariantError {
    pub range_path: String,
    pub reason: String,
}

/// Raised by the session renderer (C7) when a render exceeds its
/// wall-clock budget. Retained state is left untouched.
#[derive(Debug, Clone, thiserror::Error)]
#[error("render exceeded its {budget_ms}ms wall-clock budget")]
pub struct RenderTimeoutError {
    pub budget_ms: u64,
}
