//! Recursive-descent parser turning a flat [`Segment`] list into a
//! [`CompiledTemplate`] construct tree.

use std::collections::BTreeMap;

use crate::ast::{Call, CompiledTemplate, Construct, Expr};
use crate::error::TemplateSyntaxError;
use crate::expr_parser::ExprParser;
use crate::lexer::{self, Segment, Token};

/// Compiles `source` into a construct tree.
///
/// `known_funcs` names additional functions (beyond the builtins in
/// [`crate::expr_parser::BUILTINS`]) the caller will supply at hydration
/// time; any bareword function name used in a pipeline that is neither a
/// builtin nor in this list is a `TemplateSyntaxError::UnknownFunction`.
pub fn compile(source: &str, known_funcs: &[String]) -> Result<CompiledTemplate, TemplateSyntaxError> {
    let segments = lexer::split_segments(source)?;
    let mut parser = Parser { segments: &segments, idx: 0, known_funcs, named: BTreeMap::new(), next_range_id: 0 };
    let (roots, stop) = parser.parse_construct_list(false)?;
    match stop {
        Stop::Eof => Ok(CompiledTemplate { roots, named: parser.named }),
        Stop::End(pos) => Err(TemplateSyntaxError::UnexpectedEnd("end", pos)),
        Stop::Else(pos) | Stop::ElseIf(pos, _) => Err(TemplateSyntaxError::UnexpectedElse(pos)),
    }
}

enum Stop {
    Eof,
    End(usize),
    Else(usize),
    ElseIf(usize, Expr),
}

enum DirectiveKind {
    If(Expr),
    ElseIf(Expr),
    Else,
    End,
    With(Expr),
    Range { expr: Expr, index_var: Option<String>, value_var: Option<String> },
    VarDecl(String, Expr),
    VarAssign(String, Expr),
    Break,
    Continue,
    Template(String, Option<Expr>),
    Block(String, Expr),
    Define(String),
    Field(Expr),
}

struct Parser<'a> {
    segments: &'a [Segment],
    idx: usize,
    known_funcs: &'a [String],
    named: BTreeMap<String, Vec<Construct>>,
    next_range_id: usize,
}

impl<'a> Parser<'a> {
    fn parse_construct_list(&mut self, in_range: bool) -> Result<(Vec<Construct>, Stop), TemplateSyntaxError> {
        let mut out = Vec::new();
        loop {
            let seg = match self.segments.get(self.idx) {
                None => return Ok((out, Stop::Eof)),
                Some(s) => s,
            };
            self.idx += 1;
            match seg {
                Segment::Text(text) => {
                    if !text.is_empty() {
                        out.push(Construct::Text(text.clone()));
                    }
                }
                Segment::Directive { body, pos } => {
                    let pos = *pos;
                    match self.classify(body, pos)? {
                        DirectiveKind::End => return Ok((out, Stop::End(pos))),
                        DirectiveKind::Else => return Ok((out, Stop::Else(pos))),
                        DirectiveKind::ElseIf(cond) => return Ok((out, Stop::ElseIf(pos, cond))),
                        DirectiveKind::Break => {
                            if !in_range {
                                return Err(TemplateSyntaxError::LoopControlOutsideRange("break", pos));
                            }
                            out.push(Construct::Break);
                        }
                        DirectiveKind::Continue => {
                            if !in_range {
                                return Err(TemplateSyntaxError::LoopControlOutsideRange("continue", pos));
                            }
                            out.push(Construct::Continue);
                        }
                        DirectiveKind::If(cond) => out.push(self.parse_if(cond, pos, in_range)?),
                        DirectiveKind::With(expr) => {
                            let (body, stop) = self.parse_construct_list(in_range)?;
                            let else_body = self.finish_simple_else(stop, pos, "with")?;
                            out.push(Construct::With { expr, body, else_body });
                        }
                        DirectiveKind::Range { expr, index_var, value_var } => {
                            let id = self.next_range_id;
                            self.next_range_id += 1;
                            let (body, stop) = self.parse_construct_list(true)?;
                            let else_body = self.finish_simple_else(stop, pos, "range")?;
                            out.push(Construct::Range { id, expr, index_var, value_var, body, else_body });
                        }
                        DirectiveKind::VarDecl(name, expr) => out.push(Construct::VarDecl { name, expr }),
                        DirectiveKind::VarAssign(name, expr) => out.push(Construct::VarAssign { name, expr }),
                        DirectiveKind::Template(name, arg) => out.push(Construct::Invocation { name, arg }),
                        DirectiveKind::Block(name, arg) => {
                            let (body, stop) = self.parse_construct_list(in_range)?;
                            self.expect_plain_end(stop, pos, "block")?;
                            if self.named.contains_key(&name) {
                                return Err(TemplateSyntaxError::DuplicateTemplateName(name));
                            }
                            self.named.insert(name.clone(), body.clone());
                            out.push(Construct::Block { name, default_body: body });
                            let _ = arg; // the invocation pipeline selects `.` for the block body at hydration time
                        }
                        DirectiveKind::Define(name) => {
                            let (body, stop) = self.parse_construct_list(false)?;
                            self.expect_plain_end(stop, pos, "define")?;
                            if self.named.contains_key(&name) {
                                return Err(TemplateSyntaxError::DuplicateTemplateName(name));
                            }
                            self.named.insert(name, body);
                        }
                        DirectiveKind::Field(expr) => out.push(Construct::Field(expr)),
                    }
                }
            }
        }
    }

    /// Parses the remainder of an `if`/`else if` chain starting after the
    /// condition of one `if`/`else if` has already been read.
    fn parse_if(&mut self, cond: Expr, opened_at: usize, in_range: bool) -> Result<Construct, TemplateSyntaxError> {
        let (then_body, stop) = self.parse_construct_list(in_range)?;
        let else_body = match stop {
            Stop::End(_) => None,
            Stop::Else(_) => {
                let (body, stop2) = self.parse_construct_list(in_range)?;
                match stop2 {
                    Stop::End(_) => Some(body),
                    _ => return Err(TemplateSyntaxError::UnbalancedControl { kind: "if", opened_at }),
                }
            }
            Stop::ElseIf(_, cond2) => Some(vec![self.parse_if(cond2, opened_at, in_range)?]),
            Stop::Eof => return Err(TemplateSyntaxError::UnbalancedControl { kind: "if", opened_at }),
        };
        Ok(Construct::Conditional { cond, then_body, else_body })
    }

    /// Handles the `{{else}}…{{end}}` tail shared by `with` and `range`
    /// (neither supports `else if` chaining).
    fn finish_simple_else(
        &mut self,
        stop: Stop,
        opened_at: usize,
        kind: &'static str,
    ) -> Result<Option<Vec<Construct>>, TemplateSyntaxError> {
        match stop {
            Stop::End(_) => Ok(None),
            Stop::Else(_) => {
                let (body, stop2) = self.parse_construct_list(kind == "range")?;
                match stop2 {
                    Stop::End(_) => Ok(Some(body)),
                    _ => Err(TemplateSyntaxError::UnbalancedControl { kind, opened_at }),
                }
            }
            Stop::ElseIf(pos, _) => Err(TemplateSyntaxError::UnexpectedElse(pos)),
            Stop::Eof => Err(TemplateSyntaxError::UnbalancedControl { kind, opened_at }),
        }
    }

    fn expect_plain_end(&self, stop: Stop, opened_at: usize, kind: &'static str) -> Result<(), TemplateSyntaxError> {
        match stop {
            Stop::End(_) => Ok(()),
            Stop::Else(pos) | Stop::ElseIf(pos, _) => Err(TemplateSyntaxError::UnexpectedElse(pos)),
            Stop::Eof => Err(TemplateSyntaxError::UnbalancedControl { kind, opened_at }),
        }
    }

    fn classify(&self, body: &str, pos: usize) -> Result<DirectiveKind, TemplateSyntaxError> {
        let tokens = lexer::tokenize(body, pos)?;
        match tokens.first() {
            Some(Token::Ident(kw)) if kw == "end" && tokens.len() == 1 => Ok(DirectiveKind::End),
            Some(Token::Ident(kw)) if kw == "break" && tokens.len() == 1 => Ok(DirectiveKind::Break),
            Some(Token::Ident(kw)) if kw == "continue" && tokens.len() == 1 => Ok(DirectiveKind::Continue),
            Some(Token::Ident(kw)) if kw == "else" => {
                if tokens.len() == 1 {
                    Ok(DirectiveKind::Else)
                } else if matches!(tokens.get(1), Some(Token::Ident(w)) if w == "if") {
                    let cond = self.parse_expr(&tokens[2..], pos)?;
                    Ok(DirectiveKind::ElseIf(cond))
                } else {
                    Err(TemplateSyntaxError::MalformedExpression(pos, "expected `else` or `else if`".to_string()))
                }
            }
            Some(Token::Ident(kw)) if kw == "if" => Ok(DirectiveKind::If(self.parse_expr(&tokens[1..], pos)?)),
            Some(Token::Ident(kw)) if kw == "with" => Ok(DirectiveKind::With(self.parse_expr(&tokens[1..], pos)?)),
            Some(Token::Ident(kw)) if kw == "range" => self.parse_range_header(&tokens[1..], pos),
            Some(Token::Ident(kw)) if kw == "template" => self.parse_template_invocation(&tokens[1..], pos),
            Some(Token::Ident(kw)) if kw == "define" => self.parse_define(&tokens[1..], pos),
            Some(Token::Ident(kw)) if kw == "block" => self.parse_block_header(&tokens[1..], pos),
            Some(Token::Var(name, path)) if path.is_empty() && tokens.get(1) == Some(&Token::ColonAssign) => {
                let expr = self.parse_expr(&tokens[2..], pos)?;
                Ok(DirectiveKind::VarDecl(name.clone(), expr))
            }
            Some(Token::Var(name, path)) if path.is_empty() && tokens.get(1) == Some(&Token::Assign) => {
                let expr = self.parse_expr(&tokens[2..], pos)?;
                Ok(DirectiveKind::VarAssign(name.clone(), expr))
            }
            _ => Ok(DirectiveKind::Field(self.parse_expr(&tokens, pos)?)),
        }
    }

    fn parse_expr(&self, tokens: &[Token], pos: usize) -> Result<Expr, TemplateSyntaxError> {
        ExprParser::new(tokens, pos, self.known_funcs).parse_pipeline_exact()
    }

    fn parse_range_header(&self, tokens: &[Token], pos: usize) -> Result<DirectiveKind, TemplateSyntaxError> {
        // `range .Items` | `range $v := .Items` | `range $i, $v := .Items`
        if let Some(Token::Var(v, p)) = tokens.first() {
            if p.is_empty() && tokens.get(1) == Some(&Token::ColonAssign) {
                let expr = self.parse_expr(&tokens[2..], pos)?;
                return Ok(DirectiveKind::Range { expr, index_var: None, value_var: Some(v.clone()) });
            }
            if p.is_empty() && tokens.get(1) == Some(&Token::Comma) {
                if let Some(Token::Var(v2, p2)) = tokens.get(2) {
                    if p2.is_empty() && tokens.get(3) == Some(&Token::ColonAssign) {
                        let expr = self.parse_expr(&tokens[4..], pos)?;
                        return Ok(DirectiveKind::Range {
                            expr,
                            index_var: Some(v.clone()),
                            value_var: Some(v2.clone()),
                        });
                    }
                }
            }
        }
        let expr = self.parse_expr(tokens, pos)?;
        Ok(DirectiveKind::Range { expr, index_var: None, value_var: None })
    }

    fn parse_template_invocation(&self, tokens: &[Token], pos: usize) -> Result<DirectiveKind, TemplateSyntaxError> {
        match tokens.first() {
            Some(Token::Str(name)) => {
                let name = name.clone();
                if tokens.len() == 1 {
                    Ok(DirectiveKind::Template(name, None))
                } else {
                    Ok(DirectiveKind::Template(name, Some(self.parse_expr(&tokens[1..], pos)?)))
                }
            }
            _ => Err(TemplateSyntaxError::MalformedExpression(pos, "expected a quoted template name".to_string())),
        }
    }

    fn parse_block_header(&self, tokens: &[Token], pos: usize) -> Result<DirectiveKind, TemplateSyntaxError> {
        match tokens.first() {
            Some(Token::Str(name)) => {
                let name = name.clone();
                if tokens.len() == 1 {
                    return Err(TemplateSyntaxError::MalformedExpression(
                        pos,
                        "`block` requires a pipeline argument".to_string(),
                    ));
                }
                Ok(DirectiveKind::Block(name, self.parse_expr(&tokens[1..], pos)?))
            }
            _ => Err(TemplateSyntaxError::MalformedExpression(pos, "expected a quoted block name".to_string())),
        }
    }

    fn parse_define(&self, tokens: &[Token], pos: usize) -> Result<DirectiveKind, TemplateSyntaxError> {
        match tokens.first() {
            Some(Token::Str(name)) if tokens.len() == 1 => Ok(DirectiveKind::Define(name.clone())),
            _ => Err(TemplateSyntaxError::MalformedExpression(pos, "expected a quoted define name".to_string())),
        }
    }
}

/// Convenience used by `expr_parser` error messages; re-exported so callers
/// constructing synthetic calls (e.g. tests) don't need a second import.
#[allow(dead_code)]
pub(crate) fn call(name: &str, args: Vec<Expr>) -> Expr {
    Expr::Call(Call { name: name.to_string(), args })
}
