/// A byte offset into the original source, used to anchor error messages.
pub type Position = usize;

/// Everything that can go wrong while compiling a template.
///
/// `lvt-core`'s hydrator and differ raise their own, separate error kinds
/// (`RenderError`, `DuplicateKeyError`, `RangeInvariantError`) for failures
/// that only manifest against live data; this enum only covers failures
/// detectable from the source text alone.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum TemplateSyntaxError {
    #[error("unexpected end of template inside a directive starting at byte {0}")]
    UnterminatedDirective(Position),

    #[error("unbalanced control structure: `{kind}` opened at byte {opened_at} was never closed")]
    UnbalancedControl { kind: &'static str, opened_at: Position },

    #[error("`{0}` at byte {1} has no matching open directive")]
    UnexpectedEnd(&'static str, Position),

    #[error("`{{{{else}}}}` at byte {0} is not inside an `if`, `with`, or `range`")]
    UnexpectedElse(Position),

    #[error("`{0}` at byte {1} is only valid inside a `range` body")]
    LoopControlOutsideRange(&'static str, Position),

    #[error("malformed expression at byte {0}: {1}")]
    MalformedExpression(Position, String),

    #[error("unknown function or method `{name}` at byte {position}")]
    UnknownFunction { name: String, position: Position },

    #[error("`$$` is not supported (byte {0}); nested dollar-scopes must use a named variable")]
    NestedDollarUnsupported(Position),

    #[error("duplicate `{{{{define}}}}`/`{{{{block}}}}` name `{0}`")]
    DuplicateTemplateName(String),

    #[error("empty action `{{{{}}}}` at byte {0}")]
    EmptyAction(Position),
}
