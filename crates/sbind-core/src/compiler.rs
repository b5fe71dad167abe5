//! Accessor compiler — turns AST nodes into lazily evaluated closures
//!
//! Each node is compiled once. The resulting [`Accessor`] re-reads its
//! evaluation context every time it is called, so values that the host
//! changes between reads are always current.

use std::rc::Rc;

use indexmap::IndexMap;

use crate::parser::ast::{Literal, Node, PathSegment};
use crate::pluck;
use crate::value::Value;

/// A compiled expression. Calling [`Accessor::get`] evaluates it against the
/// current state of its context; `None` means the value is absent.
#[derive(Clone)]
pub struct Accessor(Rc<dyn Fn() -> Option<Value>>);

impl Accessor {
    pub fn new(f: impl Fn() -> Option<Value> + 'static) -> Self {
        Accessor(Rc::new(f))
    }

    pub fn constant(value: Value) -> Self {
        Accessor::new(move || Some(value.clone()))
    }

    /// Evaluate now
    pub fn get(&self) -> Option<Value> {
        (self.0)()
    }

    /// Evaluate now, reporting an absent value as `undefined`
    pub fn value(&self) -> Value {
        self.get().unwrap_or(Value::Undefined)
    }
}

impl std::fmt::Debug for Accessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Accessor")
    }
}

/// The objects root identifiers are resolved against.
/// `extra` is consulted first, then `primary`.
#[derive(Debug, Clone)]
pub struct EvaluationContext {
    pub primary: Value,
    pub extra: Option<Value>,
}

impl EvaluationContext {
    pub fn new(primary: Value, extra: Option<Value>) -> Self {
        EvaluationContext { primary, extra }
    }

    /// The object that owns the root identifier `name`
    pub fn root_for(&self, name: &str) -> &Value {
        match &self.extra {
            Some(extra) if extra.has_member(name) => extra,
            _ => &self.primary,
        }
    }
}

/// Compile one node against `context`
pub fn compile(node: &Node, context: &EvaluationContext) -> Accessor {
    match node {
        Node::Literal(literal) => Accessor::constant(literal_value(literal)),

        Node::Array(items) => {
            let children: Vec<Accessor> = items.iter().map(|item| compile(item, context)).collect();
            Accessor::new(move || Some(Value::array(children.iter().map(Accessor::value))))
        }

        Node::Object(entries) => {
            let children: Vec<(String, Accessor)> = entries
                .iter()
                .map(|entry| (entry.key.clone(), compile(&entry.value, context)))
                .collect();
            Accessor::new(move || {
                // Repeated keys: last write wins, first position is kept
                let mut map = IndexMap::with_capacity(children.len());
                for (key, child) in &children {
                    map.insert(key.clone(), child.value());
                }
                Some(Value::object(map))
            })
        }

        Node::Path(segments) => {
            let segments: Rc<[PathSegment]> = segments.clone().into();
            let context = context.clone();
            Accessor::new(move || {
                let first = segments.first()?;
                pluck::walk(context.root_for(&first.name), &segments)
            })
        }
    }
}

fn literal_value(literal: &Literal) -> Value {
    match literal {
        Literal::String(s) => Value::String(s.clone()),
        Literal::Integer(i) => Value::Integer(*i),
        Literal::Float(f) => Value::Float(*f),
        Literal::Boolean(b) => Value::Boolean(*b),
        Literal::Null => Value::Null,
        Literal::Undefined => Value::Undefined,
    }
}
