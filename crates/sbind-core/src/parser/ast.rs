//! SBind AST Types — Abstract Syntax Tree node definitions
//!
//! These types represent the parsed structure of a binding string.
//! They map directly to the grammar documented on [`crate::parser`].
//!
//! All AST types are immutable after construction. `Display` renders a node
//! back to binding syntax.

use serde::Serialize;

use super::tokenizer::Span;

/// One `name: value` pair of a binding string
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Binding {
    pub name: String,
    pub value: Node,
    pub span: Span,
}

/// A value expression
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Node {
    Literal(Literal),
    Array(Vec<Node>),
    /// Keys may repeat; the last entry wins when the object is built
    Object(Vec<ObjectEntry>),
    Path(Vec<PathSegment>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Literal {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Null,
    Undefined,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectEntry {
    pub key: String,
    pub value: Node,
}

/// One `.`-separated component of a path expression.
/// `invoked` means the value found here is called with no arguments
/// before the walk continues.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathSegment {
    pub name: String,
    pub invoked: bool,
}

impl PathSegment {
    pub fn member(name: impl Into<String>) -> Self {
        PathSegment {
            name: name.into(),
            invoked: false,
        }
    }

    pub fn call(name: impl Into<String>) -> Self {
        PathSegment {
            name: name.into(),
            invoked: true,
        }
    }
}

// ── Display ───────────────────────────────────────────────

impl std::fmt::Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Literal::String(s) => write!(f, "\"{}\"", s),
            Literal::Integer(i) => write!(f, "{}", i),
            Literal::Float(v) => write!(f, "{:?}", v),
            Literal::Boolean(b) => write!(f, "{}", b),
            Literal::Null => write!(f, "null"),
            Literal::Undefined => write!(f, "undefined"),
        }
    }
}

impl std::fmt::Display for PathSegment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.invoked {
            write!(f, "{}()", self.name)
        } else {
            write!(f, "{}", self.name)
        }
    }
}

impl std::fmt::Display for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Node::Literal(lit) => write!(f, "{}", lit),
            Node::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Node::Object(entries) => {
                write!(f, "{{")?;
                for (i, entry) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "\"{}\": {}", entry.key, entry.value)?;
                }
                write!(f, "}}")
            }
            Node::Path(segments) => {
                for (i, segment) in segments.iter().enumerate() {
                    if i > 0 {
                        write!(f, ".")?;
                    }
                    write!(f, "{}", segment)?;
                }
                Ok(())
            }
        }
    }
}

impl std::fmt::Display for Binding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.name, self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_path() {
        let node = Node::Path(vec![
            PathSegment::call("F2"),
            PathSegment::member("G"),
            PathSegment::member("1"),
        ]);
        assert_eq!(node.to_string(), "F2().G.1");
    }

    #[test]
    fn test_display_nested_literals() {
        let node = Node::Object(vec![
            ObjectEntry {
                key: "R".into(),
                value: Node::Array(vec![
                    Node::Literal(Literal::Integer(1)),
                    Node::Literal(Literal::Float(2.0)),
                    Node::Literal(Literal::Undefined),
                ]),
            },
        ]);
        assert_eq!(node.to_string(), r#"{"R": [1, 2.0, undefined]}"#);
    }

    #[test]
    fn test_serialize_node_shape() {
        let node = Node::Path(vec![PathSegment::call("f")]);
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"kind": "path", "value": [{"name": "f", "invoked": true}]})
        );
    }
}
