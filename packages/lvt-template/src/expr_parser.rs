//! Parses a token stream (see `lexer::tokenize`) into an [`Expr`] pipeline.

use crate::ast::{Call, Expr};
use crate::error::TemplateSyntaxError;
use crate::lexer::Token;

/// The builtin functions recognized by the compiler (spec §4.1). `safe`
/// marks its argument as pre-escaped HTML the hydrator must pass through
/// unescaped (spec §4.3's "unless the function chain marks its result
/// safe").
pub const BUILTINS: &[&str] = &[
    "eq", "ne", "lt", "le", "gt", "ge", "and", "or", "not", "len", "index", "printf", "call", "safe",
];

pub struct ExprParser<'a> {
    toks: &'a [Token],
    i: usize,
    pos: usize,
    known_funcs: &'a [String],
}

impl<'a> ExprParser<'a> {
    pub fn new(toks: &'a [Token], pos: usize, known_funcs: &'a [String]) -> Self {
        Self { toks, i: 0, pos, known_funcs }
    }

    fn peek(&self) -> Option<&Token> {
        self.toks.get(self.i)
    }

    fn bump(&mut self) -> Option<&Token> {
        let t = self.toks.get(self.i);
        if t.is_some() {
            self.i += 1;
        }
        t
    }

    /// Parses a full pipeline and asserts every token was consumed.
    pub fn parse_pipeline_exact(&mut self) -> Result<Expr, TemplateSyntaxError> {
        let expr = self.parse_pipeline()?;
        if self.i != self.toks.len() {
            return Err(TemplateSyntaxError::MalformedExpression(
                self.pos,
                "trailing tokens after expression".to_string(),
            ));
        }
        Ok(expr)
    }

    pub fn parse_pipeline(&mut self) -> Result<Expr, TemplateSyntaxError> {
        let first = self.parse_command()?;
        let mut rest = Vec::new();
        while matches!(self.peek(), Some(Token::Pipe)) {
            self.bump();
            match self.parse_command()? {
                Expr::Call(call) => rest.push(call),
                other => {
                    return Err(TemplateSyntaxError::MalformedExpression(
                        self.pos,
                        format!("pipeline stage must be a function call, got {other:?}"),
                    ))
                }
            }
        }
        if rest.is_empty() {
            Ok(first)
        } else {
            Ok(Expr::Pipeline(Box::new(first), rest))
        }
    }

    fn parse_command(&mut self) -> Result<Expr, TemplateSyntaxError> {
        match self.peek() {
            Some(Token::Ident(name)) => {
                let name = name.clone();
                self.bump();
                if !BUILTINS.contains(&name.as_str()) && !self.known_funcs.iter().any(|f| f == &name) {
                    return Err(TemplateSyntaxError::UnknownFunction { name, position: self.pos });
                }
                let mut args = Vec::new();
                while self.peek_is_atom_start() {
                    args.push(self.parse_atom()?);
                }
                Ok(Expr::Call(Call { name, args }))
            }
            _ => self.parse_atom(),
        }
    }

    fn peek_is_atom_start(&self) -> bool {
        matches!(
            self.peek(),
            Some(Token::Field(_))
                | Some(Token::Var(_, _))
                | Some(Token::Str(_))
                | Some(Token::Int(_))
                | Some(Token::Float(_))
                | Some(Token::Bool(_))
                | Some(Token::Nil)
                | Some(Token::LParen)
        )
    }

    fn parse_atom(&mut self) -> Result<Expr, TemplateSyntaxError> {
        match self.bump().cloned() {
            Some(Token::Field(path)) => Ok(Expr::Field(path)),
            Some(Token::Var(name, path)) => {
                if name.is_empty() {
                    return Err(TemplateSyntaxError::NestedDollarUnsupported(self.pos));
                }
                Ok(Expr::Var(name, path))
            }
            Some(Token::Str(s)) => Ok(Expr::Str(s)),
            Some(Token::Int(n)) => Ok(Expr::Int(n)),
            Some(Token::Float(f)) => Ok(Expr::Float(f)),
            Some(Token::Bool(b)) => Ok(Expr::Bool(b)),
            Some(Token::Nil) => Ok(Expr::Nil),
            Some(Token::LParen) => {
                let inner = self.parse_pipeline()?;
                match self.bump() {
                    Some(Token::RParen) => Ok(inner),
                    _ => Err(TemplateSyntaxError::MalformedExpression(
                        self.pos,
                        "expected `)`".to_string(),
                    )),
                }
            }
            other => Err(TemplateSyntaxError::MalformedExpression(
                self.pos,
                format!("expected an expression, got {other:?}"),
            )),
        }
    }
}
