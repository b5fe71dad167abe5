//! SBind Parser — tokenizer, AST types, and recursive descent parser
//!
//! Converts a binding string into one AST per `name: value` pair.
//!
//! ```text
//! bindings       := (binding ("," binding)*)?
//! binding        := identifier ":" value-expr
//! value-expr     := literal | array-literal | object-literal | path-expr
//! literal        := string | number | "true" | "false" | "null" | "undefined"
//! array-literal  := "[" (value-expr ("," value-expr)*)? "]"
//! object-literal := "{" (obj-entry ("," obj-entry)*)? "}"
//! obj-entry      := (string | identifier) ":" value-expr
//! path-expr      := identifier ("(" ")")? ("." identifier ("(" ")")?)*
//! ```
//!
//! Calls take no arguments, so no value from the binding string can reach a
//! host function.

pub mod ast;
pub mod tokenizer;

use serde::{Deserialize, Serialize};

use crate::error::ParseError;
use crate::Result;
use ast::{Binding, Literal, Node, ObjectEntry, PathSegment};
use tokenizer::{Token, TokenKind};

/// Default limit on array/object nesting
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// What to do when a binding string names the same binding twice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// The later definition replaces the earlier one, keeping its position
    #[default]
    LastWins,
    /// Fail with `DuplicateBindingName`
    Reject,
}

/// Parse a binding string into its `name: value` pairs
///
/// # Guarantees
/// - Deterministic: same input always produces same AST
/// - Binding names in the result are unique
///
/// # Errors
/// Returns `Error::Lex` or `Error::Parse` with line:column for syntax
/// violations. Nothing is returned for a string that fails anywhere.
/// Containers nested deeper than [`DEFAULT_MAX_DEPTH`] are rejected.
///
/// # Example
/// ```
/// use sbind_core::parser::{parse_bindings, DuplicatePolicy};
///
/// let bindings = parse_bindings("text: user.name, visible: true", DuplicatePolicy::LastWins)?;
/// assert_eq!(bindings.len(), 2);
/// assert_eq!(bindings[0].value.to_string(), "user.name");
/// # Ok::<(), sbind_core::Error>(())
/// ```
pub fn parse_bindings(input: &str, duplicates: DuplicatePolicy) -> Result<Vec<Binding>> {
    let tokens = tokenizer::tokenize(input)?;
    let bindings = Parser::new(&tokens, duplicates).parse()?;
    Ok(bindings)
}

/// Recursive descent parser over a token slice
pub struct Parser<'a> {
    tokens: &'a [Token],
    position: usize,
    duplicates: DuplicatePolicy,
    depth: usize,
    max_depth: usize,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Token], duplicates: DuplicatePolicy) -> Self {
        Parser {
            tokens,
            position: 0,
            duplicates,
            depth: 0,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Limit how deeply arrays and objects may nest
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Parse the whole token stream as a binding list
    pub fn parse(&mut self) -> std::result::Result<Vec<Binding>, ParseError> {
        let mut bindings: Vec<Binding> = Vec::new();

        if self.tokens.is_empty() {
            return Ok(bindings);
        }

        loop {
            let binding = self.binding()?;

            match bindings.iter().position(|b| b.name == binding.name) {
                Some(_) if self.duplicates == DuplicatePolicy::Reject => {
                    return Err(ParseError::DuplicateBindingName {
                        name: binding.name,
                        span: binding.span,
                    });
                }
                Some(index) => {
                    tracing::debug!(name = %binding.name, "duplicate binding name, last one wins");
                    bindings[index] = binding;
                }
                None => bindings.push(binding),
            }

            match self.peek() {
                None => break,
                Some(token) if token.kind == TokenKind::Comma => {
                    self.position += 1;
                }
                Some(token) => return Err(unexpected("',' or end of input", token)),
            }
        }

        Ok(bindings)
    }

    // ── Token helpers ──────────────────────────────────────

    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.position)
    }

    fn peek_kind(&self) -> Option<TokenKind> {
        self.peek().map(|t| t.kind)
    }

    fn next(&mut self, expected: &str) -> std::result::Result<&'a Token, ParseError> {
        let token = self.peek().ok_or_else(|| ParseError::UnexpectedEndOfInput {
            expected: expected.to_string(),
        })?;
        self.position += 1;
        Ok(token)
    }

    fn expect(
        &mut self,
        kind: TokenKind,
        expected: &str,
    ) -> std::result::Result<&'a Token, ParseError> {
        let token = self.next(expected)?;
        if token.kind == kind {
            Ok(token)
        } else {
            Err(unexpected(expected, token))
        }
    }

    // ── Productions ────────────────────────────────────────

    fn binding(&mut self) -> std::result::Result<Binding, ParseError> {
        let name = self.expect(TokenKind::Identifier, "binding name")?;
        self.expect(TokenKind::Colon, "':'")?;
        let value = self.value()?;

        Ok(Binding {
            name: name.lexeme.clone(),
            value,
            span: name.span.clone(),
        })
    }

    fn value(&mut self) -> std::result::Result<Node, ParseError> {
        let token = self.next("value")?;

        let node = match token.kind {
            TokenKind::String => Node::Literal(Literal::String(token.lexeme.clone())),
            TokenKind::Number => Node::Literal(number_literal(token)?),
            TokenKind::Boolean => Node::Literal(Literal::Boolean(token.lexeme == "true")),
            TokenKind::Null => Node::Literal(Literal::Null),
            TokenKind::Undefined => Node::Literal(Literal::Undefined),
            TokenKind::LBracket | TokenKind::LBrace => self.container(token)?,
            TokenKind::Identifier => self.path(token)?,
            _ => return Err(unexpected("value", token)),
        };

        Ok(node)
    }

    /// Array or object opened by `open`, within the nesting limit
    fn container(&mut self, open: &Token) -> std::result::Result<Node, ParseError> {
        if self.depth >= self.max_depth {
            return Err(ParseError::NestingTooDeep {
                limit: self.max_depth,
                span: open.span.clone(),
            });
        }

        self.depth += 1;
        let node = if open.kind == TokenKind::LBracket {
            self.array()?
        } else {
            self.object()?
        };
        self.depth -= 1;

        Ok(node)
    }

    /// Elements after the opening `[`
    fn array(&mut self) -> std::result::Result<Node, ParseError> {
        let mut items = Vec::new();

        if self.peek_kind() == Some(TokenKind::RBracket) {
            self.position += 1;
            return Ok(Node::Array(items));
        }

        loop {
            items.push(self.value()?);

            let token = self.next("',' or ']'")?;
            match token.kind {
                TokenKind::Comma => continue,
                TokenKind::RBracket => break,
                _ => return Err(unexpected("',' or ']'", token)),
            }
        }

        Ok(Node::Array(items))
    }

    /// Entries after the opening `{`
    fn object(&mut self) -> std::result::Result<Node, ParseError> {
        let mut entries = Vec::new();

        if self.peek_kind() == Some(TokenKind::RBrace) {
            self.position += 1;
            return Ok(Node::Object(entries));
        }

        loop {
            let key = self.next("object key")?;
            if !matches!(key.kind, TokenKind::String | TokenKind::Identifier) {
                return Err(unexpected("object key", key));
            }
            self.expect(TokenKind::Colon, "':'")?;
            let value = self.value()?;

            entries.push(ObjectEntry {
                key: key.lexeme.clone(),
                value,
            });

            let token = self.next("',' or '}'")?;
            match token.kind {
                TokenKind::Comma => continue,
                TokenKind::RBrace => break,
                _ => return Err(unexpected("',' or '}'", token)),
            }
        }

        Ok(Node::Object(entries))
    }

    /// Path starting at an already consumed root identifier
    fn path(&mut self, root: &Token) -> std::result::Result<Node, ParseError> {
        let mut segments = vec![PathSegment {
            name: root.lexeme.clone(),
            invoked: self.call_suffix()?,
        }];

        while self.peek_kind() == Some(TokenKind::Dot) {
            self.position += 1;
            let member = self.expect(TokenKind::Identifier, "member name")?;
            segments.push(PathSegment {
                name: member.lexeme.clone(),
                invoked: self.call_suffix()?,
            });
        }

        Ok(Node::Path(segments))
    }

    /// Consume an optional empty `()`
    fn call_suffix(&mut self) -> std::result::Result<bool, ParseError> {
        if self.peek_kind() != Some(TokenKind::LParen) {
            return Ok(false);
        }
        self.position += 1;
        self.expect(TokenKind::RParen, "')' (calls take no arguments)")?;
        Ok(true)
    }
}

fn unexpected(expected: &str, found: &Token) -> ParseError {
    ParseError::UnexpectedToken {
        expected: expected.to_string(),
        found: found.to_string(),
        span: found.span.clone(),
    }
}

/// Integers stay integers unless they overflow `i64`, in which case they
/// become floats (`9223372036854775808` is `Float`).
///
/// The `f64` parse cannot fail for a lexeme the tokenizer accepted: an
/// out-of-range exponent parses as infinity. The error arm only guards
/// hand-built tokens.
fn number_literal(token: &Token) -> std::result::Result<Literal, ParseError> {
    let text = token.lexeme.as_str();
    let is_float = text.contains(['.', 'e', 'E']);

    if !is_float {
        if let Ok(i) = text.parse::<i64>() {
            return Ok(Literal::Integer(i));
        }
    }

    text.parse::<f64>()
        .map(Literal::Float)
        .map_err(|_| unexpected("number", token))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    fn parse(input: &str) -> Vec<Binding> {
        parse_bindings(input, DuplicatePolicy::LastWins).unwrap()
    }

    fn parse_err(input: &str) -> ParseError {
        match parse_bindings(input, DuplicatePolicy::LastWins).unwrap_err() {
            Error::Parse(err) => err,
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    fn lit(literal: Literal) -> Node {
        Node::Literal(literal)
    }

    // ── Literals ───────────────────────────────────────

    #[test]
    fn test_parse_literals() {
        let bindings = parse(r#"a: "A", b: 1, c: 2.1, t: true, f: false, n: null, u: undefined"#);
        let values: Vec<Node> = bindings.into_iter().map(|b| b.value).collect();
        assert_eq!(
            values,
            vec![
                lit(Literal::String("A".into())),
                lit(Literal::Integer(1)),
                lit(Literal::Float(2.1)),
                lit(Literal::Boolean(true)),
                lit(Literal::Boolean(false)),
                lit(Literal::Null),
                lit(Literal::Undefined),
            ]
        );
    }

    #[test]
    fn test_number_typing() {
        let values: Vec<Node> = parse("a: -3, b: 1e3, c: 9223372036854775808, d: 0.5")
            .into_iter()
            .map(|b| b.value)
            .collect();
        assert_eq!(values[0], lit(Literal::Integer(-3)));
        assert_eq!(values[1], lit(Literal::Float(1000.0)));
        assert_eq!(values[2], lit(Literal::Float(9223372036854775808.0)));
        assert_eq!(values[3], lit(Literal::Float(0.5)));
    }

    // ── Containers ─────────────────────────────────────

    #[test]
    fn test_parse_array_and_object() {
        let bindings = parse(r#"d: ["X", "Y"], e: {"R": "V", k: [1, {}], R: x}"#);
        assert_eq!(
            bindings[0].value,
            Node::Array(vec![
                lit(Literal::String("X".into())),
                lit(Literal::String("Y".into())),
            ])
        );
        assert_eq!(
            bindings[1].value,
            Node::Object(vec![
                ObjectEntry {
                    key: "R".into(),
                    value: lit(Literal::String("V".into())),
                },
                ObjectEntry {
                    key: "k".into(),
                    value: Node::Array(vec![lit(Literal::Integer(1)), Node::Object(vec![])]),
                },
                ObjectEntry {
                    key: "R".into(),
                    value: Node::Path(vec![PathSegment::member("x")]),
                },
            ])
        );
    }

    #[test]
    fn test_parse_empty_containers() {
        let bindings = parse("a: [], b: {}");
        assert_eq!(bindings[0].value, Node::Array(vec![]));
        assert_eq!(bindings[1].value, Node::Object(vec![]));
    }

    // ── Paths ──────────────────────────────────────────

    #[test]
    fn test_parse_paths() {
        let bindings = parse("a: x, b: F2().G(), c: a.b.c.e.1, d: $data.name");
        assert_eq!(bindings[0].value, Node::Path(vec![PathSegment::member("x")]));
        assert_eq!(
            bindings[1].value,
            Node::Path(vec![PathSegment::call("F2"), PathSegment::call("G")])
        );
        assert_eq!(bindings[2].value.to_string(), "a.b.c.e.1");
        assert_eq!(bindings[3].value.to_string(), "$data.name");
    }

    #[test]
    fn test_call_with_arguments_rejected() {
        let err = parse_err("a: f(1)");
        match err {
            ParseError::UnexpectedToken { expected, found, span } => {
                assert!(expected.contains("no arguments"));
                assert_eq!(found, "number 1");
                assert_eq!(span.column, 6);
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    // ── Top level ──────────────────────────────────────

    #[test]
    fn test_parse_empty_string() {
        assert!(parse("").is_empty());
        assert!(parse("   ").is_empty());
    }

    #[test]
    fn test_duplicate_last_wins_keeps_position() {
        let bindings = parse("a: 1, b: 2, a: 3");
        assert_eq!(bindings.len(), 2);
        assert_eq!(bindings[0].name, "a");
        assert_eq!(bindings[0].value, lit(Literal::Integer(3)));
        assert_eq!(bindings[1].name, "b");
    }

    #[test]
    fn test_duplicate_reject() {
        let err = parse_bindings("a: 1, a: 2", DuplicatePolicy::Reject).unwrap_err();
        match err {
            Error::Parse(ParseError::DuplicateBindingName { name, span }) => {
                assert_eq!(name, "a");
                assert_eq!(span.column, 7);
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    // ── Errors ─────────────────────────────────────────

    #[test]
    fn test_stray_colon() {
        let err = parse_err("a: : b");
        assert!(matches!(err, ParseError::UnexpectedToken { ref expected, .. } if expected == "value"));
    }

    #[test]
    fn test_missing_colon() {
        let err = parse_err("a 1");
        assert!(matches!(err, ParseError::UnexpectedToken { ref expected, .. } if expected == "':'"));
    }

    #[test]
    fn test_unexpected_end_of_input() {
        for input in ["a:", "a: [1,", "a: {\"k\":", "a: x.", "a: 1,", "a: f("] {
            let err = parse_err(input);
            assert!(
                matches!(err, ParseError::UnexpectedEndOfInput { .. }),
                "{} gave {:?}",
                input,
                err
            );
        }
    }

    #[test]
    fn test_keyword_binding_name_rejected() {
        let err = parse_err("true: 1");
        assert!(matches!(err, ParseError::UnexpectedToken { .. }));
    }

    #[test]
    fn test_missing_separator() {
        let err = parse_err("a: 1 b: 2");
        assert!(
            matches!(err, ParseError::UnexpectedToken { ref expected, .. } if expected == "',' or end of input")
        );
    }

    #[test]
    fn test_lex_errors_propagate() {
        let err = parse_bindings(r#"a: "open"#, DuplicatePolicy::LastWins).unwrap_err();
        assert!(matches!(err, Error::Lex(_)));
    }

    // ── Nesting limit ──────────────────────────────────

    fn nested(depth: usize) -> String {
        format!("a: {}{}", "[".repeat(depth), "]".repeat(depth))
    }

    #[test]
    fn test_nesting_at_limit_parses() {
        let bindings = parse(&nested(DEFAULT_MAX_DEPTH));
        assert_eq!(bindings.len(), 1);
    }

    #[test]
    fn test_nesting_over_limit_rejected() {
        let err = parse_err(&nested(DEFAULT_MAX_DEPTH + 1));
        match err {
            ParseError::NestingTooDeep { limit, span } => {
                assert_eq!(limit, DEFAULT_MAX_DEPTH);
                assert_eq!(span.column, 4 + DEFAULT_MAX_DEPTH);
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_hostile_nesting_is_an_error() {
        let input = nested(100_000);
        assert!(matches!(parse_err(&input), ParseError::NestingTooDeep { .. }));

        let objects = format!("a: {}1{}", r#"{"k": "#.repeat(100_000), "}".repeat(100_000));
        assert!(matches!(parse_err(&objects), ParseError::NestingTooDeep { .. }));
    }

    #[test]
    fn test_custom_max_depth() {
        let tokens = tokenizer::tokenize(r#"a: [{"k": []}], b: [[]]"#).unwrap();
        let err = Parser::new(&tokens, DuplicatePolicy::LastWins)
            .with_max_depth(2)
            .parse()
            .unwrap_err();
        assert!(matches!(err, ParseError::NestingTooDeep { limit: 2, .. }));

        // Siblings do not add up; only the current chain counts
        let tokens = tokenizer::tokenize("a: [[]], b: [[]], c: [[], []]").unwrap();
        let bindings = Parser::new(&tokens, DuplicatePolicy::LastWins)
            .with_max_depth(2)
            .parse()
            .unwrap();
        assert_eq!(bindings.len(), 3);
    }

    // ── Determinism proof ──────────────────────────────

    #[test]
    fn test_parse_determinism_100_iterations() {
        let input = r#"a: "A", b: [1, 2.5, {"k": v.w()}], c: F2().G"#;
        let first = parse(input);
        for i in 0..100 {
            assert_eq!(first, parse(input), "Non-determinism at iteration {}", i);
        }
    }
}
