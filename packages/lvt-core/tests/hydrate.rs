//! Hydration properties that cut across the whole pipeline rather than one
//! construct: round-tripping to plain HTML, fingerprint stability, and
//! no-op idempotence under an unchanged render.

use lvt_core::{fingerprint, hydrate_value, FuncMap, KeyRegistry};
use serde_json::json;

fn hydrate(src: &str, data: serde_json::Value) -> lvt_core::TreeNode {
    let tpl = lvt_template::compile(src, &[]).unwrap();
    let mut keys = KeyRegistry::new();
    let funcs = FuncMap::new();
    hydrate_value(&tpl, data, &mut keys, &funcs).unwrap()
}

#[test]
fn nested_conditional_and_range_round_trips_to_plain_html() {
    let src = r#"<section>{{if .user}}<h1>{{.user.name}}</h1>{{end}}<ul>{{range .todos}}<li>{{.}}</li>{{end}}</ul></section>"#;
    let node = hydrate(
        src,
        json!({"user": {"name": "Ada"}, "todos": ["write spec", "ship it"]}),
    );
    assert_eq!(
        node.render_html(),
        "<section><h1>Ada</h1><ul><li>write spec</li><li>ship it</li></ul></section>"
    );
}

#[test]
fn identical_state_fingerprints_equal_and_different_state_differs() {
    let a = hydrate("<p>{{.n}}</p>", json!({"n": 1}));
    let b = hydrate("<p>{{.n}}</p>", json!({"n": 1}));
    let c = hydrate("<p>{{.n}}</p>", json!({"n": 2}));
    assert_eq!(fingerprint(&a), fingerprint(&b));
    assert_ne!(fingerprint(&a), fingerprint(&c));
}

#[test]
fn html_special_characters_are_escaped() {
    let node = hydrate("<p>{{.comment}}</p>", json!({"comment": "<script>alert(1)</script>"}));
    assert!(node.render_html().contains("&lt;script&gt;"));
    assert!(!node.render_html().contains("<script>"));
}

#[test]
fn with_rebinds_dot_for_its_body_only() {
    let src = "{{.outer}}{{with .inner}}{{.name}}{{end}}{{.outer}}";
    let node = hydrate(
        src,
        json!({"outer": "O", "inner": {"name": "I"}}),
    );
    assert_eq!(node.render_html(), "OIO");
}

#[test]
fn undefined_field_is_a_render_error_not_a_panic() {
    let tpl = lvt_template::compile("{{.missing.deeper}}", &[]).unwrap();
    let mut keys = KeyRegistry::new();
    let funcs = FuncMap::new();
    let result = hydrate_value(&tpl, json!({}), &mut keys, &funcs);
    assert!(result.is_err());
}
