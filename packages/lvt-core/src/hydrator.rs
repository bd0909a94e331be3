//! The hydrator (spec §4.3, C3): evaluates a compiled construct list against
//! live application state to produce a [`TreeNode`].
//!
//! Structural facts (how many dynamic slots a construct list has, and in
//! what order) depend only on the compiled [`Construct`] shape, never on the
//! data being hydrated — `{{$x := …}}`, `{{break}}`, and `{{continue}}` never
//! occupy a slot. [`structural_statics`] exploits this to compute a range's
//! shared item statics once, independent of any particular item's data
//! (spec §4.3 "its `s` is the hydration of the body against a zero item").

use rustc_hash::FxHashMap;

use lvt_template::{CompiledTemplate, Construct, Expr};

use crate::error::RenderError;
use crate::funcs::{self, FuncMap};
use crate::keygen::{find_key_position, KeyRegistry};
use crate::tree::{Dynamic, RangeItem, RangeWrapper, TreeNode};
use crate::value::{self, Value};

/// Lexical scope threaded through one hydration pass: the current dot,
/// plus named variables bound by `{{$x := …}}` or range/with bindings.
/// Cloned (not shared) at every branch point so a variable declared inside
/// one `if`/`range` arm never leaks past its enclosing block (spec §3
/// "VarDecl/VarAssign … scoped to enclosing control block's end").
#[derive(Clone)]
struct Scope {
    dot: Value,
    vars: FxHashMap<String, Value>,
}

impl Scope {
    fn root(data: Value) -> Self {
        Self { dot: data, vars: FxHashMap::default() }
    }

    fn with_dot(&self, dot: Value) -> Self {
        Self { dot, vars: self.vars.clone() }
    }

    fn bind(&mut self, name: String, value: Value) {
        self.vars.insert(name, value);
    }
}

/// `{{break}}` / `{{continue}}` bubbling up from a nested construct list to
/// the range iteration that owns it (spec §4.3 "short-circuit iteration").
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum LoopControl {
    Break,
    Continue,
}

struct Ctx<'a> {
    named: &'a std::collections::BTreeMap<String, Vec<Construct>>,
    funcs: &'a FuncMap,
    keys: &'a mut KeyRegistry,
}

/// Hydrates `state` (serialized once, per §3's "Value" doc comment) against
/// `tpl`, returning the structured tree the differ and fingerprinter
/// consume.
pub fn hydrate<S: serde::Serialize>(
    tpl: &CompiledTemplate,
    state: &S,
    keys: &mut KeyRegistry,
    funcs: &FuncMap,
) -> Result<TreeNode, RenderError> {
    let data = serde_json::to_value(state).map_err(|e| RenderError::UndefinedField { path: e.to_string() })?;
    hydrate_value(tpl, data, keys, funcs)
}

/// As [`hydrate`], but takes an already-converted [`Value`] (used directly
/// by tests and by callers that already hold a `serde_json::Value`).
pub fn hydrate_value(
    tpl: &CompiledTemplate,
    data: Value,
    keys: &mut KeyRegistry,
    funcs: &FuncMap,
) -> Result<TreeNode, RenderError> {
    let mut ctx = Ctx { named: &tpl.named, funcs, keys };
    let scope = Scope::root(data);
    let (node, _control) = hydrate_list(&mut ctx, &tpl.roots, &scope)?;
    Ok(node)
}

/// The structural static-text skeleton of a construct list, independent of
/// any data: every construct that is not `Text`/`VarDecl`/`VarAssign`/
/// `Break`/`Continue` occupies exactly one dynamic slot.
pub(crate) fn structural_statics(body: &[Construct]) -> Vec<String> {
    let mut statics = Vec::new();
    let mut buf = String::new();
    for c in body {
        match c {
            Construct::Text(t) => buf.push_str(t),
            Construct::VarDecl { .. } | Construct::VarAssign { .. } | Construct::Break | Construct::Continue => {}
            _ => statics.push(std::mem::take(&mut buf)),
        }
    }
    statics.push(buf);
    statics
}

/// Whether `expr`'s last pipeline stage is the `safe` builtin, per spec
/// §4.3 "unless the function chain marks its result safe". Checked
/// syntactically rather than via a tagged value, since the value model
/// (`serde_json::Value`) has no room for a "pre-escaped" variant.
fn is_marked_safe(expr: &Expr) -> bool {
    match expr {
        Expr::Pipeline(_, stages) => stages.last().is_some_and(|c| c.name == "safe"),
        Expr::Call(c) => c.name == "safe",
        _ => false,
    }
}

fn empty_node() -> TreeNode {
    TreeNode { statics: vec![String::new()], dynamics: vec![] }
}

fn hydrate_list(
    ctx: &mut Ctx,
    body: &[Construct],
    scope: &Scope,
) -> Result<(TreeNode, Option<LoopControl>), RenderError> {
    let mut statics = Vec::new();
    let mut dynamics = Vec::new();
    let mut buf = String::new();
    let mut local = scope.clone();

    for construct in body {
        match construct {
            Construct::Text(t) => buf.push_str(t),

            Construct::Field(expr) => {
                statics.push(std::mem::take(&mut buf));
                let v = eval_expr(ctx, &local, expr)?;
                let rendered = if is_marked_safe(expr) {
                    value::stringify(&v)
                } else {
                    value::html_escape(&value::stringify(&v))
                };
                dynamics.push(Dynamic::Leaf(rendered));
            }

            Construct::Conditional { cond, then_body, else_body } => {
                statics.push(std::mem::take(&mut buf));
                let c = eval_expr(ctx, &local, cond)?;
                let (node, control) = if value::truthy(&c) {
                    hydrate_list(ctx, then_body, &local)?
                } else if let Some(else_body) = else_body {
                    hydrate_list(ctx, else_body, &local)?
                } else {
                    (empty_node(), None)
                };
                dynamics.push(Dynamic::Node(Box::new(node)));
                if control.is_some() {
                    statics.push(std::mem::take(&mut buf));
                    return Ok((TreeNode { statics, dynamics }, control));
                }
            }

            Construct::With { expr, body, else_body } => {
                statics.push(std::mem::take(&mut buf));
                let v = eval_expr(ctx, &local, expr)?;
                let (node, control) = if value::truthy(&v) {
                    hydrate_list(ctx, body, &local.with_dot(v))?
                } else if let Some(else_body) = else_body {
                    hydrate_list(ctx, else_body, &local)?
                } else {
                    (empty_node(), None)
                };
                dynamics.push(Dynamic::Node(Box::new(node)));
                if control.is_some() {
                    statics.push(std::mem::take(&mut buf));
                    return Ok((TreeNode { statics, dynamics }, control));
                }
            }

            Construct::Range { id, expr, index_var, value_var, body, else_body } => {
                statics.push(std::mem::take(&mut buf));
                let collection = eval_expr(ctx, &local, expr)?;
                let is_map = matches!(collection, Value::Object(_));
                let entries = range_entries(&collection)?;
                let wrapper = if entries.is_empty() {
                    let (node, _) = match else_body {
                        Some(else_body) => hydrate_list(ctx, else_body, &local)?,
                        None => (empty_node(), None),
                    };
                    Dynamic::Node(Box::new(node))
                } else {
                    let item_statics = structural_statics(body);
                    let key_pos = find_key_position(&item_statics);
                    let range_label = format!("range#{id}");
                    let mut cursor = ctx.keys.begin_range(*id);
                    let mut items = Vec::with_capacity(entries.len());
                    for (index_val, item_val) in entries {
                        let mut item_scope = local.with_dot(item_val.clone());
                        if let Some(iv) = index_var {
                            item_scope.bind(iv.clone(), index_val.clone());
                        }
                        if let Some(vv) = value_var {
                            item_scope.bind(vv.clone(), item_val);
                        }
                        let (item_node, control) = hydrate_list(ctx, body, &item_scope)?;
                        let attr_value = key_pos.and_then(|p| match item_node.dynamics.get(p) {
                            Some(Dynamic::Leaf(s)) if !s.is_empty() => {
                                Some(Value::String(s.clone()))
                            }
                            _ => None,
                        });
                        // An explicit key attribute always wins (spec §9 Open
                        // Question: "attribute wins unconditionally"). Absent
                        // one, a map's own key is already a stable, unique
                        // per-item identity — stronger than a positional
                        // counter — so it is used as the fallback key source
                        // before synthesizing one (map ranges have no natural
                        // position otherwise, since sort order can shift as
                        // keys are added/removed).
                        let key_hint = attr_value.or_else(|| {
                            if is_map { Some(index_val.clone()) } else { None }
                        });
                        let key = cursor.next_key(key_hint.as_ref(), &range_label)?;
                        items.push(RangeItem { key, dynamics: item_node.dynamics });
                        if control == Some(LoopControl::Break) {
                            break;
                        }
                        // `continue` has already short-circuited the item's own
                        // hydration above; nothing further to do per-iteration.
                    }
                    Dynamic::Range(RangeWrapper { item_statics, items })
                };
                dynamics.push(wrapper);
                // break/continue are scoped to their nearest enclosing range:
                // consumed here, never bubbled past this construct.
            }

            Construct::VarDecl { name, expr } | Construct::VarAssign { name, expr } => {
                let v = eval_expr(ctx, &local, expr)?;
                local.bind(name.clone(), v);
            }

            Construct::Break => {
                statics.push(std::mem::take(&mut buf));
                return Ok((TreeNode { statics, dynamics }, Some(LoopControl::Break)));
            }
            Construct::Continue => {
                statics.push(std::mem::take(&mut buf));
                return Ok((TreeNode { statics, dynamics }, Some(LoopControl::Continue)));
            }

            Construct::Invocation { name, arg } => {
                statics.push(std::mem::take(&mut buf));
                let new_dot = match arg {
                    Some(e) => eval_expr(ctx, &local, e)?,
                    None => Value::Null,
                };
                let target = ctx
                    .named
                    .get(name)
                    .ok_or_else(|| RenderError::UnknownTemplate { name: name.clone() })?
                    .clone();
                let (node, _) = hydrate_list(ctx, &target, &local.with_dot(new_dot))?;
                dynamics.push(Dynamic::Node(Box::new(node)));
            }

            Construct::Block { name, default_body } => {
                statics.push(std::mem::take(&mut buf));
                // An override replaces `default_body` only when a separate
                // `{{define "name"}}` registered the same name elsewhere in
                // the template set (spec §3 "Block"); our single-source
                // compiler never produces that case today (see DESIGN.md),
                // so this always resolves to `default_body` via `named`.
                let target = ctx.named.get(name).cloned().unwrap_or_else(|| default_body.clone());
                let (node, _) = hydrate_list(ctx, &target, &local)?;
                dynamics.push(Dynamic::Node(Box::new(node)));
            }
        }
    }
    statics.push(buf);
    Ok((TreeNode { statics, dynamics }, None))
}

/// Expands a range collection into `(index, value)` pairs, sorting object
/// keys for determinism (spec §4.3 "Ordering & tie-breaks"). `Null` and
/// empty collections both yield no entries (the range's else branch fires
/// for either, per spec's nil-vs-empty edge case).
fn range_entries(v: &Value) -> Result<Vec<(Value, Value)>, RenderError> {
    match v {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => {
            Ok(items.iter().enumerate().map(|(i, v)| (Value::Number(i.into()), v.clone())).collect())
        }
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            Ok(keys.into_iter().map(|k| (Value::String(k.clone()), map[k].clone())).collect())
        }
        _ => Err(RenderError::NotIterable { path: "<range expression>".to_string() }),
    }
}

fn eval_expr(ctx: &mut Ctx, scope: &Scope, expr: &Expr) -> Result<Value, RenderError> {
    match expr {
        Expr::Field(path) => {
            if path.is_empty() {
                Ok(scope.dot.clone())
            } else {
                value::resolve_path(&scope.dot, path)
                    .ok_or_else(|| RenderError::UndefinedField { path: path.join(".") })
            }
        }
        Expr::Var(name, path) => {
            let base = scope
                .vars
                .get(name)
                .cloned()
                .ok_or_else(|| RenderError::UnboundVariable { name: name.clone() })?;
            if path.is_empty() {
                Ok(base)
            } else {
                value::resolve_path(&base, path)
                    .ok_or_else(|| RenderError::UndefinedField { path: format!("${}.{}", name, path.join(".")) })
            }
        }
        Expr::Str(s) => Ok(Value::String(s.clone())),
        Expr::Int(n) => Ok(Value::Number((*n).into())),
        Expr::Float(f) => Ok(serde_json::Number::from_f64(*f).map(Value::Number).unwrap_or(Value::Null)),
        Expr::Bool(b) => Ok(Value::Bool(*b)),
        Expr::Nil => Ok(Value::Null),
        Expr::Call(call) => {
            let args = call.args.iter().map(|a| eval_expr(ctx, scope, a)).collect::<Result<Vec<_>, _>>()?;
            funcs::call_builtin(&call.name, &args, ctx.funcs)
        }
        Expr::Pipeline(first, rest) => {
            let mut v = eval_expr(ctx, scope, first)?;
            for call in rest {
                let mut args = call.args.iter().map(|a| eval_expr(ctx, scope, a)).collect::<Result<Vec<_>, _>>()?;
                args.push(v);
                v = funcs::call_builtin(&call.name, &args, ctx.funcs)?;
            }
            Ok(v)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn hydrate_src(src: &str, data: Value) -> TreeNode {
        let tpl = lvt_template::compile(src, &[]).unwrap();
        let mut keys = KeyRegistry::new();
        let funcs = FuncMap::new();
        hydrate_value(&tpl, data, &mut keys, &funcs).unwrap()
    }

    #[test]
    fn counter_scenario() {
        let node = hydrate_src("<p>count: {{.n}}</p>", json!({"n": 0}));
        assert_eq!(node.statics, vec!["<p>count: ".to_string(), "</p>".to_string()]);
        assert_eq!(node.dynamics, vec![Dynamic::Leaf("0".to_string())]);
    }

    #[test]
    fn toggle_scenario() {
        let off = hydrate_src("{{if .on}}on{{else}}off{{end}}", json!({"on": false}));
        assert_eq!(off.dynamics, vec![Dynamic::Node(Box::new(TreeNode {
            statics: vec!["off".to_string()],
            dynamics: vec![],
        }))]);
        let on = hydrate_src("{{if .on}}on{{else}}off{{end}}", json!({"on": true}));
        assert_eq!(on.dynamics, vec![Dynamic::Node(Box::new(TreeNode {
            statics: vec!["on".to_string()],
            dynamics: vec![],
        }))]);
    }

    #[test]
    fn range_append_scenario() {
        let src = r#"<ul>{{range .items}}<li id="{{.id}}">{{.name}}</li>{{end}}</ul>"#;
        let node = hydrate_src(src, json!({"items": [{"id": "a", "name": "A"}]}));
        let Dynamic::Range(wrapper) = &node.dynamics[0] else { panic!("expected range") };
        assert_eq!(wrapper.items.len(), 1);
        assert_eq!(wrapper.items[0].key, "a");
    }

    #[test]
    fn empty_range_renders_else() {
        let src = r#"<ul>{{range .items}}<li>{{.name}}</li>{{else}}no items{{end}}</ul>"#;
        let node = hydrate_src(src, json!({"items": []}));
        assert!(matches!(&node.dynamics[0], Dynamic::Node(n) if n.render_html() == "no items"));
    }

    #[test]
    fn nil_range_also_renders_else() {
        let src = r#"{{range .items}}x{{else}}none{{end}}"#;
        let node = hydrate_src(src, json!({"items": null}));
        assert!(matches!(&node.dynamics[0], Dynamic::Node(n) if n.render_html() == "none"));
    }

    #[test]
    fn map_iteration_is_sorted_by_key() {
        let src = "{{range $k, $v := .m}}{{$k}}={{$v}};{{end}}";
        let node = hydrate_src(src, json!({"m": {"b": 2, "a": 1, "c": 3}}));
        let Dynamic::Range(wrapper) = &node.dynamics[0] else { panic!() };
        let keys: Vec<&str> = wrapper.items.iter().map(|i| i.key.as_str()).collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
    }

    #[test]
    fn round_trip_matches_plain_rendering() {
        let src = r#"<div>{{if .show}}<b>{{.name}}</b>{{end}} and {{range .xs}}{{.}},{{end}}</div>"#;
        let node = hydrate_src(src, json!({"show": true, "name": "Ada", "xs": [1, 2, 3]}));
        assert_eq!(node.render_html(), "<div><b>Ada</b> and 1,2,3,</div>");
    }

    #[test]
    fn break_stops_range_iteration() {
        let src = "{{range .xs}}{{if eq . 2}}{{break}}{{end}}{{.}};{{end}}";
        let node = hydrate_src(src, json!({"xs": [1, 2, 3]}));
        let Dynamic::Range(wrapper) = &node.dynamics[0] else { panic!() };
        assert_eq!(wrapper.items.len(), 2);
    }

    #[test]
    fn break_does_not_render_trailing_statics_that_never_ran() {
        let src = "{{range .xs}}{{if eq . 2}}{{break}}{{end}}{{.}};{{end}}";
        let node = hydrate_src(src, json!({"xs": [1, 2, 3]}));
        assert_eq!(node.render_html(), "1;");
    }

    #[test]
    fn field_is_escaped_by_default() {
        let node = hydrate_src("{{.markup}}", json!({"markup": "<b>hi</b>"}));
        assert_eq!(node.dynamics, vec![Dynamic::Leaf("&lt;b&gt;hi&lt;/b&gt;".to_string())]);
    }

    #[test]
    fn safe_pipeline_stage_skips_escaping() {
        let node = hydrate_src("{{.markup | safe}}", json!({"markup": "<b>hi</b>"}));
        assert_eq!(node.dynamics, vec![Dynamic::Leaf("<b>hi</b>".to_string())]);
    }
}
