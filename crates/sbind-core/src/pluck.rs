//! Path-pluck engine — soft lookups along dotted paths
//!
//! `a.b.c.e.1` walks object keys and array indices; `F2().G()` calls the
//! functions found at those segments. Any miss (no such member, a
//! non-container in the middle of the path, a call on something that is not
//! a function) ends the walk with `None` instead of an error.

use crate::compiler::Accessor;
use crate::parser::ast::PathSegment;
use crate::value::Value;

/// Split a dotted path into segments. A segment ending in `()` is an
/// invocation of the member named by the rest of the segment.
pub fn parse_path(path: &str) -> Vec<PathSegment> {
    path.split('.')
        .map(|part| match part.strip_suffix("()") {
            Some(name) => PathSegment::call(name),
            None => PathSegment::member(part),
        })
        .collect()
}

/// Build an accessor that re-walks `path` from `root` on every call
///
/// # Example
/// ```
/// use sbind_core::{pluck::make_accessor, Value};
///
/// let data = Value::from_json(&serde_json::json!({"a": {"e": [9, 8]}}));
/// assert_eq!(make_accessor("a.e.1", &data).get(), Some(Value::Integer(8)));
/// assert_eq!(make_accessor("a.x", &data).get(), None);
/// ```
pub fn make_accessor(path: &str, root: &Value) -> Accessor {
    let segments = parse_path(path);
    let root = root.clone();
    Accessor::new(move || walk(&root, &segments))
}

/// Walk `segments` starting at `root`
pub fn walk(root: &Value, segments: &[PathSegment]) -> Option<Value> {
    let mut current = root.clone();

    for segment in segments {
        match step(&current, segment) {
            Some(next) => current = next,
            None => {
                tracing::trace!(
                    segment = %segment,
                    on = current.type_name(),
                    "path lookup is absent"
                );
                return None;
            }
        }
    }

    Some(current)
}

fn step(current: &Value, segment: &PathSegment) -> Option<Value> {
    let member = current.get(&segment.name)?;
    if segment.invoked {
        member.call()
    } else {
        Some(member)
    }
}
