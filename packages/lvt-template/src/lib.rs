//! Compiles Go-style HTML templates with LiveView directives into a
//! construct tree (`lvt-core`'s `Hydrator` walks the tree against
//! application state to produce the structured static/dynamic split).
//!
//! See spec §4.1 (C1 Template Compiler) for the contract this crate
//! implements.

pub mod ast;
pub mod error;
mod expr_parser;
mod lexer;
mod parser;

pub use ast::{Call, CompiledTemplate, Construct, Expr, Path, Trim};
pub use error::TemplateSyntaxError;
pub use parser::compile;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn compiles_counter() {
        let tpl = compile("<p>count: {{.n}}</p>", &[]).unwrap();
        assert_eq!(
            tpl.roots,
            vec![
                Construct::Text("<p>count: ".to_string()),
                Construct::Field(Expr::Field(vec!["n".to_string()])),
                Construct::Text("</p>".to_string()),
            ]
        );
    }

    #[test]
    fn compiles_if_else() {
        let tpl = compile("{{if .on}}on{{else}}off{{end}}", &[]).unwrap();
        assert_eq!(
            tpl.roots,
            vec![Construct::Conditional {
                cond: Expr::Field(vec!["on".to_string()]),
                then_body: vec![Construct::Text("on".to_string())],
                else_body: Some(vec![Construct::Text("off".to_string())]),
            }]
        );
    }

    #[test]
    fn compiles_else_if_chain() {
        let tpl = compile("{{if .a}}A{{else if .b}}B{{else}}C{{end}}", &[]).unwrap();
        let Construct::Conditional { else_body, .. } = &tpl.roots[0] else { panic!("expected conditional") };
        let nested = else_body.as_ref().unwrap();
        assert_eq!(nested.len(), 1);
        assert!(matches!(nested[0], Construct::Conditional { .. }));
    }

    #[test]
    fn compiles_range_with_bindings() {
        let tpl = compile(
            r#"<ul>{{range $i, $v := .Items}}<li>{{$i}}:{{$v.Name}}</li>{{end}}</ul>"#,
            &[],
        )
        .unwrap();
        assert!(matches!(
            &tpl.roots[1],
            Construct::Range { index_var: Some(i), value_var: Some(v), .. } if i == "i" && v == "v"
        ));
    }

    #[test]
    fn rejects_unbalanced_if() {
        let err = compile("{{if .a}}oops", &[]).unwrap_err();
        assert!(matches!(err, TemplateSyntaxError::UnbalancedControl { kind: "if", .. }));
    }

    #[test]
    fn rejects_break_outside_range() {
        let err = compile("{{break}}", &[]).unwrap_err();
        assert!(matches!(err, TemplateSyntaxError::LoopControlOutsideRange("break", _)));
    }

    #[test]
    fn rejects_unknown_function() {
        let err = compile("{{frobnicate .x}}", &[]).unwrap_err();
        assert!(matches!(err, TemplateSyntaxError::UnknownFunction { name, .. } if name == "frobnicate"));
    }

    #[test]
    fn accepts_registered_function() {
        let tpl = compile("{{frobnicate .x}}", &["frobnicate".to_string()]).unwrap();
        assert_eq!(tpl.roots.len(), 1);
    }

    #[test]
    fn rejects_double_dollar() {
        let err = compile("{{$$.x}}", &[]).unwrap_err();
        assert!(matches!(err, TemplateSyntaxError::NestedDollarUnsupported(_)));
    }

    #[test]
    fn negative_literal_vs_trim_marker() {
        let tpl = compile("{{printf \"%d\" -1}}", &[]).unwrap();
        let Construct::Field(Expr::Call(call)) = &tpl.roots[0] else { panic!() };
        assert_eq!(call.args[1], Expr::Int(-1));
    }

    #[test]
    fn compiles_safe_pipeline() {
        let tpl = compile("{{.markup | safe}}", &[]).unwrap();
        let Construct::Field(Expr::Pipeline(_, stages)) = &tpl.roots[0] else { panic!() };
        assert_eq!(stages[0].name, "safe");
    }

    #[test]
    fn compiles_block_and_registers_named() {
        let tpl = compile(r#"{{block "greeting" .}}hi{{end}}"#, &[]).unwrap();
        assert!(tpl.named.contains_key("greeting"));
        assert!(matches!(&tpl.roots[0], Construct::Block { name, .. } if name == "greeting"));
    }
}
