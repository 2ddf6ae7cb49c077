// ── Value ─────────────────────────────────────────────────────────────────

/// Right-hand side of a `key: value` property.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Str(String),
    Number(f32),
    /// Straight-alpha `[r, g, b, a]` bytes from `#rrggbb` or `#rrggbbaa`.
    Color([u8; 4]),
    Bool(bool),
    /// Bare word: font names, ids, alignment keywords.
    Ident(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Prop {
    pub key: String,
    pub value: Value,
    pub line: usize,
}

// ── Node ──────────────────────────────────────────────────────────────────

/// One element of the tree.
///
/// ```mkml
/// Button "2x" { id: b1  padding: 6 }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Element type or import alias.
    pub kind: String,
    /// Inline string after the type name.
    pub content: Option<String>,
    pub props: Vec<Prop>,
    pub children: Vec<Node>,
    pub line: usize,
}

impl Node {
    /// Last property with `key`; later entries win.
    pub fn prop(&self, key: &str) -> Option<&Value> {
        self.props.iter().rev().find(|p| p.key == key).map(|p| &p.value)
    }

    pub fn prop_f32(&self, key: &str) -> Option<f32> {
        match self.prop(key)? {
            Value::Number(v) => Some(*v),
            _ => None,
        }
    }

    /// String or bare identifier.
    pub fn prop_str(&self, key: &str) -> Option<&str> {
        match self.prop(key)? {
            Value::Str(s) | Value::Ident(s) => Some(s),
            _ => None,
        }
    }

    pub fn prop_color(&self, key: &str) -> Option<[u8; 4]> {
        match self.prop(key)? {
            Value::Color(c) => Some(*c),
            _ => None,
        }
    }

    pub fn prop_bool(&self, key: &str) -> Option<bool> {
        match self.prop(key)? {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The `id:` property, if any.
    pub fn id(&self) -> Option<&str> {
        self.prop_str("id")
    }

    /// Depth-first search for the node with `id`.
    pub fn find_by_id(&self, id: &str) -> Option<&Node> {
        if self.id() == Some(id) {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find_by_id(id))
    }
}

// ── Document ──────────────────────────────────────────────────────────────

/// `import "path.mkml" as Alias`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    pub path: String,
    pub alias: String,
}

/// A parsed `.mkml` file: leading imports and a single root node.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub imports: Vec<Import>,
    pub root: Node,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(kind: &str, id: Option<&str>, children: Vec<Node>) -> Node {
        Node {
            kind: kind.to_string(),
            content: None,
            props: id
                .map(|id| Prop { key: "id".into(), value: Value::Ident(id.into()), line: 1 })
                .into_iter()
                .collect(),
            children,
            line: 1,
        }
    }

    #[test]
    fn find_by_id_searches_depth_first() {
        let root = node(
            "Column",
            None,
            vec![node("Row", Some("r"), vec![node("Text", Some("l1"), vec![])])],
        );
        assert_eq!(root.find_by_id("l1").map(|n| n.kind.as_str()), Some("Text"));
        assert!(root.find_by_id("missing").is_none());
    }

    #[test]
    fn later_props_win() {
        let mut n = node("Text", None, vec![]);
        n.props.push(Prop { key: "size".into(), value: Value::Number(10.0), line: 1 });
        n.props.push(Prop { key: "size".into(), value: Value::Number(12.0), line: 2 });
        assert_eq!(n.prop_f32("size"), Some(12.0));
        assert_eq!(n.prop_str("size"), None);
    }
}
