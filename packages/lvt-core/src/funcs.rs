//! Builtin pipeline functions (spec §4.1) plus the extension point for
//! application-supplied functions.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::RenderError;
use crate::value::{self, Value};

/// A registered custom function: takes the already-evaluated argument
/// values and returns a result value or a render error.
pub type Func = Arc<dyn Fn(&[Value]) -> Result<Value, RenderError> + Send + Sync>;

/// The set of functions available to a template beyond the builtins.
/// Method invocation on opaque application state (spec §3) has no Rust
/// equivalent of reflection-based method dispatch; it is modeled as a
/// registered function applied to the receiver value, matching the `call`
/// builtin's shape — see DESIGN.md.
#[derive(Clone, Default)]
pub struct FuncMap(HashMap<String, Func>);

impl FuncMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>, f: Func) -> &mut Self {
        self.0.insert(name.into(), f);
        self
    }

    pub fn names(&self) -> Vec<String> {
        self.0.keys().cloned().collect()
    }

    pub fn get(&self, name: &str) -> Option<&Func> {
        self.0.get(name)
    }
}

/// Evaluates a builtin or registered call given its already-evaluated
/// argument values.
pub fn call_builtin(name: &str, args: &[Value], funcs: &FuncMap) -> Result<Value, RenderError> {
    match name {
        "eq" => {
            let ok = args.len() >= 2 && args[1..].iter().any(|a| value::equals(&args[0], a));
            Ok(Value::Bool(ok))
        }
        "ne" => {
            let ok = args.len() >= 2 && args[1..].iter().any(|a| value::equals(&args[0], a));
            Ok(Value::Bool(!ok))
        }
        "lt" | "le" | "gt" | "ge" => {
            if args.len() != 2 {
                return Err(RenderError::ArityMismatch { func: name.to_string(), expected: 2, got: args.len() });
            }
            let ord = value::compare(&args[0], &args[1])
                .ok_or_else(|| RenderError::TypeMismatch { func: name.to_string() })?;
            use std::cmp::Ordering::*;
            let ok = match (name, ord) {
                ("lt", Less) | ("le", Less) | ("le", Equal) => true,
                ("gt", Greater) | ("ge", Greater) | ("ge", Equal) => true,
                _ => false,
            };
            Ok(Value::Bool(ok))
        }
        "and" => Ok(args
            .iter()
            .find(|a| !value::truthy(a))
            .cloned()
            .unwrap_or_else(|| args.last().cloned().unwrap_or(Value::Bool(true)))),
        "or" => Ok(args
            .iter()
            .find(|a| value::truthy(a))
            .cloned()
            .unwrap_or_else(|| args.last().cloned().unwrap_or(Value::Bool(false)))),
        "not" => {
            let v = args.first().ok_or_else(|| RenderError::ArityMismatch {
                func: "not".to_string(),
                expected: 1,
                got: 0,
            })?;
            Ok(Value::Bool(!value::truthy(v)))
        }
        "len" => {
            let v = args.first().ok_or_else(|| RenderError::ArityMismatch {
                func: "len".to_string(),
                expected: 1,
                got: 0,
            })?;
            let n = match v {
                Value::String(s) => s.chars().count(),
                Value::Array(a) => a.len(),
                Value::Object(o) => o.len(),
                _ => return Err(RenderError::TypeMismatch { func: "len".to_string() }),
            };
            Ok(Value::Number(n.into()))
        }
        "index" => {
            let mut cur = args.first().cloned().unwrap_or(Value::Null);
            for key in &args[1..] {
                let k = value::stringify(key);
                cur = value::field(&cur, &k)
                    .ok_or_else(|| RenderError::TypeMismatch { func: "index".to_string() })?;
            }
            Ok(cur)
        }
        "printf" => {
            let fmt = match args.first() {
                Some(Value::String(s)) => s.clone(),
                _ => return Err(RenderError::TypeMismatch { func: "printf".to_string() }),
            };
            Ok(Value::String(printf(&fmt, &args[1..])))
        }
        "safe" => {
            // Value-level identity; the hydrator is the one that actually
            // skips escaping, recognizing `safe` as the pipeline's final
            // stage before it ever reaches here.
            Ok(args.first().cloned().unwrap_or(Value::Null))
        }
        "call" => {
            let fname = match args.first() {
                Some(Value::String(s)) => s.clone(),
                _ => return Err(RenderError::TypeMismatch { func: "call".to_string() }),
            };
            let f = funcs
                .get(&fname)
                .ok_or_else(|| RenderError::UnknownFunctionAtRuntime { name: fname.clone() })?;
            f(&args[1..])
        }
        other => {
            let f = funcs
                .get(other)
                .ok_or_else(|| RenderError::UnknownFunctionAtRuntime { name: other.to_string() })?;
            f(args)
        }
    }
}

/// Minimal `%v`/`%s`/`%d`/`%f`/`%%` substitution, sufficient for the
/// enumerated builtin surface.
fn printf(fmt: &str, args: &[Value]) -> String {
    let mut out = String::new();
    let mut arg_i = 0usize;
    let mut chars = fmt.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('%') => out.push('%'),
            Some(spec @ ('s' | 'v' | 'd' | 'f')) => {
                let val = args.get(arg_i).cloned().unwrap_or(Value::Null);
                arg_i += 1;
                match spec {
                    'd' => out.push_str(&format!("{}", val.as_f64().unwrap_or(0.0) as i64)),
                    'f' => out.push_str(&format!("{:.6}", val.as_f64().unwrap_or(0.0))),
                    _ => out.push_str(&value::stringify(&val)),
                }
            }
            Some(other) => {
                out.push('%');
                out.push(other);
            }
            None => out.push('%'),
        }
    }
    out
}
