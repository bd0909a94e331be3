//! The construct tree produced by [`crate::compile`].
//!
//! Every directive in the source template becomes one [`Construct`]. The
//! tree is shared, immutable, compiled once per template and hydrated many
//! times (see `lvt-core`'s `Hydrator`).

/// A dotted field path, e.g. `.User.Name` becomes `["User", "Name"]`. The
/// empty path refers to the current pipeline root (`.` alone).
pub type Path = Vec<String>;

/// An expression that can appear as a pipeline stage, a conditional
/// predicate, a range source, or a call argument.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// `.` or `.Field.Sub` — resolved against the current dot.
    Field(Path),
    /// `$x` or `$x.Field.Sub` — resolved against a named variable.
    Var(String, Path),
    /// String literal, already unescaped.
    Str(String),
    /// Integer literal.
    Int(i64),
    /// Floating point literal.
    Float(f64),
    /// `true` / `false`.
    Bool(bool),
    /// `nil`.
    Nil,
    /// A builtin or user function application: `name arg1 arg2 …`.
    Call(Call),
    /// A pipeline: `stage0 | stage1 | …`. Each subsequent stage receives the
    /// previous stage's result appended as its last argument, mirroring Go
    /// template pipeline semantics.
    Pipeline(Box<Expr>, Vec<Call>),
}

/// A named function application, e.g. `eq .A .B` or `printf "%d" .N`.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub name: String,
    pub args: Vec<Expr>,
}

/// Left/right whitespace trim markers attached to a directive (`{{-` / `-}}`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Trim {
    pub left: bool,
    pub right: bool,
}

/// One node of the compiled construct tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Construct {
    /// Literal text, already trimmed per adjacent directives' trim markers.
    Text(String),
    /// `{{expr}}` — HTML-escaped unless the final pipeline stage is the
    /// `safe` builtin; the hydrator decides that by inspecting `expr`
    /// itself, not by tagging the evaluated value.
    Field(Expr),
    /// `{{if cond}}…{{else if cond}}…{{else}}…{{end}}`. Else-if chains are
    /// represented as a nested `Conditional` inside `else_body`.
    Conditional {
        cond: Expr,
        then_body: Vec<Construct>,
        else_body: Option<Vec<Construct>>,
    },
    /// `{{with expr}}…{{else}}…{{end}}`.
    With {
        expr: Expr,
        body: Vec<Construct>,
        else_body: Option<Vec<Construct>>,
    },
    /// `{{range expr}}…{{end}}` / `{{range $i, $v := expr}}…{{end}}`.
    Range {
        /// Stable ID assigned at compile time (source order). The key
        /// generator (C2) keys its per-range registry on this, so the same
        /// range construct keeps the same registry across renders even
        /// though trees are rebuilt from scratch each time.
        id: usize,
        expr: Expr,
        index_var: Option<String>,
        value_var: Option<String>,
        body: Vec<Construct>,
        else_body: Option<Vec<Construct>>,
    },
    /// `{{$x := expr}}` — declares a new variable in the enclosing scope.
    VarDecl { name: String, expr: Expr },
    /// `{{$x = expr}}` — reassigns an existing variable.
    VarAssign { name: String, expr: Expr },
    /// `{{break}}`, valid only inside a range body.
    Break,
    /// `{{continue}}`, valid only inside a range body.
    Continue,
    /// `{{template "name" pipeline}}`.
    Invocation { name: String, arg: Option<Expr> },
    /// `{{block "name" pipeline}}…{{end}}` — behaves as an inline construct
    /// list using `default_body` unless an override is registered for `name`.
    Block {
        name: String,
        default_body: Vec<Construct>,
    },
}

/// The result of compiling one template source: the root construct list
/// plus any named bodies defined via `{{define "name"}}…{{end}}` (auxiliary
/// templates invoked with `{{template "name" …}}`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompiledTemplate {
    pub roots: Vec<Construct>,
    pub named: std::collections::BTreeMap<String, Vec<Construct>>,
}
