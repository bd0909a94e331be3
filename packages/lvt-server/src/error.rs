//! Errors raised while driving a session (spec §7). Fatal variants leave
//! the session's retained tree untouched; the caller reports them to the
//! client and keeps serving the session.

/// Everything that can go wrong for one `renderUpdate`/`renderInitial`
/// call. The session survives every variant here — only the in-flight
/// render is discarded.
#[derive(Debug, Clone, thiserror::Error)]
#[non_exhaustive]
pub enum SessionRenderError {
    #[error(transparent)]
    Template(#[from] lvt_template::TemplateSyntaxError),

    #[error(transparent)]
    Render(#[from] lvt_core::RenderError),

    #[error(transparent)]
    RangeInvariant(#[from] lvt_core::RangeInvariantError),

    #[error(transparent)]
    Timeout(#[from] lvt_core::RenderTimeoutError),
}

/// Rejection of a client action by application-supplied `Change` logic
/// (spec §7 "ValidationError"). Not fatal to the render: the session
/// still emits an update payload, just with `meta.success = false`.
#[derive(Debug, Clone, thiserror::Error)]
#[error("action rejected: {message}")]
pub struct ValidationError {
    pub message: String,
    pub field_errors: std::collections::BTreeMap<String, String>,
}
