//! Binding provider — the entry points a host UI framework calls
//!
//! The host owns the nodes, the view model and the binding lifecycle. The
//! provider only answers two questions: does this node declare bindings, and
//! what are the accessors for a binding string.
//!
//! # Example
//! ```
//! use sbind_core::{SecureBindingProvider, Value};
//!
//! let provider = SecureBindingProvider::new();
//! let view_model = Value::from_json(&serde_json::json!({"user": {"name": "Ada"}}));
//!
//! let bindings = provider.get_bindings("text: user.name, visible: true", &view_model, None)?;
//! assert_eq!(bindings.get("text").unwrap().get(), Some(Value::from("Ada")));
//!
//! view_model.get("user").unwrap().set("name", Value::from("Grace"));
//! assert_eq!(bindings.get("text").unwrap().get(), Some(Value::from("Grace")));
//! # Ok::<(), sbind_core::Error>(())
//! ```

use std::collections::{BTreeMap, HashMap};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::compiler::{compile, Accessor, EvaluationContext};
use crate::parser::ast::Binding;
use crate::parser::{tokenizer, DuplicatePolicy, Parser, DEFAULT_MAX_DEPTH};
use crate::value::Value;
use crate::{pluck, Error, Result};

/// Attribute that carries the binding string unless configured otherwise
pub const DEFAULT_BINDING_ATTRIBUTE: &str = "data-sbind";

// ── Configuration ─────────────────────────────────────────

/// Provider configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProviderOptions {
    /// Name of the attribute holding the binding string
    pub attribute: String,
    /// Handling of a binding name that appears twice
    pub duplicates: DuplicatePolicy,
    /// Deepest allowed nesting of array and object literals
    pub max_depth: usize,
}

impl Default for ProviderOptions {
    fn default() -> Self {
        ProviderOptions {
            attribute: DEFAULT_BINDING_ATTRIBUTE.to_string(),
            duplicates: DuplicatePolicy::default(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ProviderOptions {
    /// Load options from JSON; missing fields take their defaults
    pub fn from_json(text: &str) -> Result<Self> {
        let options: ProviderOptions =
            serde_json::from_str(text).map_err(|e| Error::Config(e.to_string()))?;
        if options.attribute.trim().is_empty() {
            return Err(Error::Config("attribute must not be empty".into()));
        }
        if options.max_depth == 0 {
            return Err(Error::Config("max_depth must be at least 1".into()));
        }
        Ok(options)
    }
}

// ── Host seam ─────────────────────────────────────────────

/// A host element that may carry a binding attribute
pub trait BindingNode {
    fn attribute(&self, name: &str) -> Option<&str>;
}

impl BindingNode for HashMap<String, String> {
    fn attribute(&self, name: &str) -> Option<&str> {
        self.get(name).map(String::as_str)
    }
}

impl BindingNode for BTreeMap<String, String> {
    fn attribute(&self, name: &str) -> Option<&str> {
        self.get(name).map(String::as_str)
    }
}

// ── Binding set ───────────────────────────────────────────

/// Binding name → accessor, in source order
#[derive(Debug, Clone, Default)]
pub struct BindingSet {
    accessors: IndexMap<String, Accessor>,
}

impl BindingSet {
    pub fn get(&self, name: &str) -> Option<&Accessor> {
        self.accessors.get(name)
    }

    pub fn len(&self) -> usize {
        self.accessors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accessors.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.accessors.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Accessor)> {
        self.accessors.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Evaluate every accessor once
    pub fn evaluate(&self) -> IndexMap<String, Option<Value>> {
        self.accessors
            .iter()
            .map(|(name, accessor)| (name.clone(), accessor.get()))
            .collect()
    }
}

impl IntoIterator for BindingSet {
    type Item = (String, Accessor);
    type IntoIter = indexmap::map::IntoIter<String, Accessor>;

    fn into_iter(self) -> Self::IntoIter {
        self.accessors.into_iter()
    }
}

// ── Provider ──────────────────────────────────────────────

/// Resolves binding strings into accessors.
///
/// Holds only its options; every call builds its own tokens, AST and
/// binding set.
#[derive(Debug, Clone, Default)]
pub struct SecureBindingProvider {
    options: ProviderOptions,
}

impl SecureBindingProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ProviderOptions) -> Self {
        SecureBindingProvider { options }
    }

    pub fn options(&self) -> &ProviderOptions {
        &self.options
    }

    /// True iff the node carries the binding attribute
    pub fn node_has_bindings<N: BindingNode + ?Sized>(&self, node: &N) -> bool {
        node.attribute(&self.options.attribute).is_some()
    }

    /// Read the node's binding attribute and resolve it. A node without the
    /// attribute has no bindings.
    pub fn get_binding_accessors<N: BindingNode + ?Sized>(
        &self,
        node: &N,
        view_model: &Value,
        context: Option<&Value>,
    ) -> Result<BindingSet> {
        match node.attribute(&self.options.attribute) {
            Some(raw) => self.get_bindings(raw, view_model, context),
            None => Ok(BindingSet::default()),
        }
    }

    /// Tokenize, parse and compile `raw`.
    ///
    /// Root identifiers resolve against `context` first, then `view_model`.
    ///
    /// # Errors
    /// Any lex or parse error, unmodified. No partial set is returned.
    #[tracing::instrument(level = "debug", skip(self, view_model, context))]
    pub fn get_bindings(
        &self,
        raw: &str,
        view_model: &Value,
        context: Option<&Value>,
    ) -> Result<BindingSet> {
        let bindings = self.parse_ast(raw).map_err(|e| {
            tracing::debug!(error = %e, "rejected binding string");
            e
        })?;

        let context = EvaluationContext::new(view_model.clone(), context.cloned());
        let accessors: IndexMap<String, Accessor> = bindings
            .iter()
            .map(|binding| (binding.name.clone(), compile(&binding.value, &context)))
            .collect();

        tracing::debug!(count = accessors.len(), "compiled bindings");
        Ok(BindingSet { accessors })
    }

    /// Tokenize and parse `raw` under these options, without compiling
    pub fn parse_ast(&self, raw: &str) -> Result<Vec<Binding>> {
        let tokens = tokenizer::tokenize(raw)?;
        let bindings = Parser::new(&tokens, self.options.duplicates)
            .with_max_depth(self.options.max_depth)
            .parse()?;
        Ok(bindings)
    }

    /// Resolve `raw` with no view model; only `context` supplies names
    pub fn parse(&self, raw: &str, context: Option<&Value>) -> Result<BindingSet> {
        self.get_bindings(raw, &Value::Undefined, context)
    }

    /// See [`pluck::make_accessor`]
    pub fn make_accessor(&self, path: &str, root: &Value) -> Accessor {
        pluck::make_accessor(path, root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn node(attrs: &[(&str, &str)]) -> HashMap<String, String> {
        attrs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_options_defaults() {
        let options = ProviderOptions::from_json("{}").unwrap();
        assert_eq!(options, ProviderOptions::default());
        assert_eq!(options.attribute, "data-sbind");
        assert_eq!(options.duplicates, DuplicatePolicy::LastWins);
        assert_eq!(options.max_depth, 128);
    }

    #[test]
    fn test_options_from_json() {
        let options =
            ProviderOptions::from_json(r#"{"attribute": "data-bind", "duplicates": "reject"}"#)
                .unwrap();
        assert_eq!(options.attribute, "data-bind");
        assert_eq!(options.duplicates, DuplicatePolicy::Reject);
    }

    #[test]
    fn test_options_errors() {
        assert!(matches!(
            ProviderOptions::from_json(r#"{"attribute": " "}"#),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            ProviderOptions::from_json(r#"{"unknown": 1}"#),
            Err(Error::Config(_))
        ));
        assert!(matches!(ProviderOptions::from_json("not json"), Err(Error::Config(_))));
        assert!(matches!(
            ProviderOptions::from_json(r#"{"max_depth": 0}"#),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_max_depth_option_applies() {
        let provider = SecureBindingProvider::with_options(
            ProviderOptions::from_json(r#"{"max_depth": 2}"#).unwrap(),
        );
        assert!(provider.parse("a: [[1]]", None).is_ok());
        assert!(matches!(
            provider.parse("a: [[[1]]]", None),
            Err(Error::Parse(crate::ParseError::NestingTooDeep { limit: 2, .. }))
        ));
        assert!(SecureBindingProvider::new().parse("a: [[[1]]]", None).is_ok());
    }

    #[test]
    fn test_custom_attribute() {
        let provider = SecureBindingProvider::with_options(ProviderOptions {
            attribute: "data-bind".into(),
            ..ProviderOptions::default()
        });
        assert!(provider.node_has_bindings(&node(&[("data-bind", "x")])));
        assert!(!provider.node_has_bindings(&node(&[("data-sbind", "x")])));
    }

    #[test]
    fn test_get_binding_accessors_reads_attribute() {
        let provider = SecureBindingProvider::new();
        let div = node(&[("data-sbind", r#"alpha: "122.9""#), ("class", "x")]);

        let bindings = provider
            .get_binding_accessors(&div, &Value::from_json(&json!({"vm": true})), None)
            .unwrap();
        assert_eq!(bindings.len(), 1);
        assert_eq!(bindings.get("alpha").unwrap().get(), Some(Value::from("122.9")));
    }

    #[test]
    fn test_get_binding_accessors_without_attribute() {
        let provider = SecureBindingProvider::new();
        let bindings = provider
            .get_binding_accessors(&node(&[("data-bind", "x")]), &Value::Null, None)
            .unwrap();
        assert!(bindings.is_empty());
    }

    #[test]
    fn test_reject_policy_applies() {
        let provider = SecureBindingProvider::with_options(ProviderOptions {
            duplicates: DuplicatePolicy::Reject,
            ..ProviderOptions::default()
        });
        assert!(provider.parse("a: 1, a: 2", None).is_err());
        assert_eq!(SecureBindingProvider::new().parse("a: 1, a: 2", None).unwrap().len(), 1);
    }

    #[test]
    fn test_binding_set_iteration_order() {
        let bindings = SecureBindingProvider::new()
            .parse("z: 1, a: 2, m: 3", None)
            .unwrap();
        assert_eq!(bindings.names().collect::<Vec<_>>(), vec!["z", "a", "m"]);

        let values = bindings.evaluate();
        assert_eq!(values["a"], Some(Value::Integer(2)));

        let owned: Vec<String> = bindings.into_iter().map(|(name, _)| name).collect();
        assert_eq!(owned, vec!["z", "a", "m"]);
    }
}
