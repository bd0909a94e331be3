//! Walks through the concrete range scenarios enumerated in spec §8 —
//! append, reorder, mixed remove+update+insert, and the empty↔nonempty
//! transition — printing the exact payload `lvt-core` emits for each so
//! the range-op planner's contract is visible end to end without a
//! browser.

use lvt::{diff_trees, hydrate, FuncMap, KeyRegistry};
use serde_json::json;

const LIST_TEMPLATE: &str = r#"<ul>{{range .items}}<li id="{{.id}}">{{.name}}</li>{{else}}no items{{end}}</ul>"#;

fn render(src: &str, data: serde_json::Value, keys: &mut KeyRegistry) -> lvt::TreeNode {
    let tpl = lvt::compile(src, &[]).unwrap();
    let funcs = FuncMap::new();
    hydrate(&tpl, &data, keys, &funcs).unwrap()
}

fn show(title: &str, old: &lvt::TreeNode, new: &lvt::TreeNode) {
    let payload = diff_trees(old, new).unwrap();
    let fp = lvt::fingerprint(new);
    println!("{title}: {}", payload.to_json(fp));
}

fn main() {
    let mut keys = KeyRegistry::new();

    let a = render(LIST_TEMPLATE, json!({"items": [{"id": "a", "name": "A"}]}), &mut keys);
    let ab = render(
        LIST_TEMPLATE,
        json!({"items": [{"id": "a", "name": "A"}, {"id": "b", "name": "B"}]}),
        &mut keys,
    );
    show("append", &a, &ab);

    let abc = render(
        LIST_TEMPLATE,
        json!({"items": [
            {"id": "a", "name": "A"}, {"id": "b", "name": "B"}, {"id": "c", "name": "C"},
        ]}),
        &mut keys,
    );
    let cab = render(
        LIST_TEMPLATE,
        json!({"items": [
            {"id": "c", "name": "C"}, {"id": "a", "name": "A"}, {"id": "b", "name": "B"},
        ]}),
        &mut keys,
    );
    show("reorder", &abc, &cab);

    let mixed = render(
        LIST_TEMPLATE,
        json!({"items": [
            {"id": "a", "name": "A"}, {"id": "c", "name": "C2"}, {"id": "d", "name": "D"},
        ]}),
        &mut keys,
    );
    show("mixed remove+update+insert", &abc, &mixed);

    let empty = render(LIST_TEMPLATE, json!({"items": []}), &mut keys);
    show("empty -> nonempty", &empty, &a);
    show("nonempty -> empty", &a, &empty);
}
