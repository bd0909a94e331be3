//! The template differencing engine (spec §2): hydration, fingerprinting,
//! diffing, and keyed range-op planning. This crate is pure — every
//! function is a total mapping over its inputs except [`KeyRegistry`],
//! which owns the small per-range key map a session renderer threads
//! through successive hydrations (spec §3 "Ownership").

pub mod diff;
pub mod error;
pub mod fingerprint;
pub mod funcs;
mod hydrator;
mod keygen;
pub mod planner;
pub mod tree;
pub mod value;

pub use diff::{diff as diff_trees, RenderPayload};
pub use error::{DuplicateKeyError, RangeInvariantError, RenderError, RenderTimeoutError};
pub use fingerprint::{fingerprint, Fingerprint};
pub use funcs::{Func, FuncMap};
pub use hydrator::{hydrate, hydrate_value};
pub use keygen::KeyRegistry;
pub use lvt_template::{compile, CompiledTemplate, TemplateSyntaxError};
pub use planner::PlanOutcome;
pub use tree::{Dynamic, RangeItem, RangeWrapper, TreeNode};
pub use value::Value;

#[cfg(test)]
mod integration {
    //! End-to-end exercises of hydrate → fingerprint → diff, grounding the
    //! spec §8 testable properties at the crate root (per-module unit tests
    //! cover each component's own contract).
    use super::*;
    use serde_json::json;

    #[test]
    fn delta_fidelity_counter_to_toggle_combo() {
        let tpl = compile("<p>{{.n}}: {{if .on}}on{{else}}off{{end}}</p>", &[]).unwrap();
        let mut keys = KeyRegistry::new();
        let funcs = FuncMap::new();

        let t0 = hydrate_value(&tpl, json!({"n": 0, "on": false}), &mut keys, &funcs).unwrap();
        let t1 = hydrate_value(&tpl, json!({"n": 1, "on": true}), &mut keys, &funcs).unwrap();

        let payload = diff_trees(&t0, &t1).unwrap();
        let RenderPayload::Delta(changes) = payload else { panic!("expected delta") };
        assert_eq!(changes.len(), 2);

        assert_eq!(t1.render_html(), "<p>1: on</p>");
    }

    #[test]
    fn key_stability_across_unrelated_field_change() {
        let tpl = compile(r#"<ul>{{range .items}}<li id="{{.id}}">{{.n}}: {{.name}}</li>{{end}}</ul>"#, &[]).unwrap();
        let mut keys = KeyRegistry::new();
        let funcs = FuncMap::new();

        let t0 = hydrate_value(
            &tpl,
            json!({"n": 1, "items": [{"id": "a", "name": "Ada"}]}),
            &mut keys,
            &funcs,
        )
        .unwrap();
        let t1 = hydrate_value(
            &tpl,
            json!({"n": 2, "items": [{"id": "a", "name": "Ada"}]}),
            &mut keys,
            &funcs,
        )
        .unwrap();

        let Dynamic::Range(w0) = &t0.dynamics[0] else { panic!() };
        let Dynamic::Range(w1) = &t1.dynamics[0] else { panic!() };
        assert_eq!(w0.items[0].key, w1.items[0].key);
    }
}
