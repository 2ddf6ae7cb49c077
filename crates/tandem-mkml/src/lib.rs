//! Lexer, parser and AST for the tandem markup language (`.mkml`).
//!
//! The crate has no dependencies so tooling can read `.mkml` files without
//! pulling in GPU or windowing code.
//!
//! ```rust
//! use tandem_mkml::parse_str;
//!
//! let doc = parse_str(r#"
//!     Column {
//!         gap: 8
//!         Text "fps: 0" { id: l1  color: #ffffffff }
//!     }
//! "#).unwrap();
//! assert_eq!(doc.root.kind, "Column");
//! assert!(doc.root.find_by_id("l1").is_some());
//! ```

pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;

pub use ast::{Document, Node, Value};
pub use error::ParseError;
pub use parser::parse_str;

#[cfg(test)]
mod parse_tests {
    use super::*;

    fn ok(src: &str) -> Document {
        parse_str(src).unwrap()
    }

    fn err(src: &str) -> ParseError {
        parse_str(src).unwrap_err()
    }

    // ── accepted ──────────────────────────────────────────────────────────

    #[test]
    fn bare_element() {
        let doc = ok("Container");
        assert_eq!(doc.root.kind, "Container");
        assert!(doc.root.props.is_empty());
    }

    #[test]
    fn props_and_children_mix() {
        let doc = ok(r#"Column { gap: 8  Text "a"  padding: 4  Text "b" }"#);
        assert_eq!(doc.root.props.len(), 2);
        assert_eq!(doc.root.children.len(), 2);
        assert_eq!(doc.root.children[1].content.as_deref(), Some("b"));
    }

    #[test]
    fn control_panel() {
        let doc = ok(r#"
            Row {
                Button "2x" { id: b1 }
                Button "1/2x" { id: b2 }
                TextBox { id: t1  placeholder: "speed" }
                Text "" { id: l1 }
                Image { source: "images/logo.png"  width: 64  height: 64 }
            }
        "#);
        let t1 = doc.root.find_by_id("t1").unwrap();
        assert_eq!(t1.kind, "TextBox");
        assert_eq!(t1.prop_str("placeholder"), Some("speed"));
        let img = &doc.root.children[4];
        assert_eq!(img.prop_str("source"), Some("images/logo.png"));
        assert_eq!(img.prop_f32("width"), Some(64.0));
    }

    #[test]
    fn value_kinds() {
        let doc = ok(r#"Text "x" { size: 14.5  color: #102030  wrap: true  font: body  label: "q\"" }"#);
        let n = &doc.root;
        assert_eq!(n.prop_f32("size"), Some(14.5));
        assert_eq!(n.prop_color("color"), Some([0x10, 0x20, 0x30, 0xff]));
        assert_eq!(n.prop_bool("wrap"), Some(true));
        assert_eq!(n.prop_str("font"), Some("body"));
        assert_eq!(n.prop_str("label"), Some("q\""));
    }

    #[test]
    fn imports() {
        let doc = ok(r#"import "panel.mkml" as Panel  Column { Panel }"#);
        assert_eq!(doc.imports[0].alias, "Panel");
        assert_eq!(doc.imports[0].path, "panel.mkml");
        assert_eq!(doc.root.children[0].kind, "Panel");
    }

    #[test]
    fn node_lines_recorded() {
        let doc = ok("Column {\n  Text \"a\"\n}");
        assert_eq!(doc.root.line, 1);
        assert_eq!(doc.root.children[0].line, 2);
    }

    // ── rejected ──────────────────────────────────────────────────────────

    #[test]
    fn unclosed_block() {
        let e = err("Column {\n  gap: 4\n");
        assert!(e.message.contains("unclosed"));
        assert_eq!(e.line, 3);
    }

    #[test]
    fn missing_value() {
        let e = err("Column { gap: : 8 }");
        assert_eq!((e.line, e.col), (1, 15));
    }

    #[test]
    fn two_roots() {
        err("Column { } Row { }");
    }

    #[test]
    fn bad_color() {
        err("Container { bg: #xyz }");
    }

    #[test]
    fn unterminated_string() {
        err(r#"Text "oops { }"#);
    }

    #[test]
    fn import_without_alias() {
        err(r#"import "a.mkml" Column"#);
    }
}
