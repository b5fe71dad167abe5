//! SBind Core - secure declarative-binding expression engine
//!
//! Parses binding strings such as `text: user.name, css: {"active": on}`
//! and compiles every value into an [`Accessor`] that reads the current
//! state of a host data model. The language is closed: literals, arrays,
//! objects and dotted paths with zero-argument calls. Nothing in a binding
//! string is ever handed to a general-purpose evaluator.
//!
//! # Architecture
//!
//! ```text
//! Binding Text → Tokenizer → Tokens → Parser → {name: AST}
//!                                                  ↓
//!                                 Compiler (+ Path-Pluck) → {name: Accessor}
//! ```
//!
//! # Guarantees
//!
//! - **Closed grammar**: no operators, no arguments, no user functions
//! - **Strict syntax**: a malformed binding string fails as a whole
//! - **Soft data**: a missing path evaluates to `None`, never an error
//! - **Live**: accessors are not memoized; each call re-reads the data
//! - **Reentrant**: no global state or caches

pub mod compiler;
pub mod error;
pub mod parser;
pub mod pluck;
pub mod provider;
pub mod value;

pub use compiler::{compile, Accessor, EvaluationContext};
pub use error::{Error, LexError, ParseError, Result};
pub use parser::ast::*;
pub use parser::{parse_bindings, DuplicatePolicy};
pub use provider::{
    BindingNode, BindingSet, ProviderOptions, SecureBindingProvider, DEFAULT_BINDING_ATTRIBUTE,
};
pub use value::{Function, Value};
