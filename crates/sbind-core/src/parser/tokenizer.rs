//! SBind Tokenizer — converts a binding string into a token stream
//!
//! Handles: identifiers, the `true`/`false`/`null`/`undefined` keywords,
//! double-quoted string literals, JSON-style number literals and the
//! punctuation `, : [ ] { } ( ) .`.
//!
//! Guarantees:
//! - Deterministic: same input always produces same token stream
//! - Every token and every error carries a line:column position

use serde::Serialize;

use crate::error::LexError;

/// Token kinds of the binding grammar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TokenKind {
    Identifier,
    String,
    Number,
    Boolean,
    Null,
    Undefined,

    // Punctuation
    Comma,    // ,
    Colon,    // :
    LBracket, // [
    RBracket, // ]
    LBrace,   // {
    RBrace,   // }
    LParen,   // (
    RParen,   // )
    Dot,      // .
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let text = match self {
            TokenKind::Identifier => "identifier",
            TokenKind::String => "string",
            TokenKind::Number => "number",
            TokenKind::Boolean => "boolean",
            TokenKind::Null => "null",
            TokenKind::Undefined => "undefined",
            TokenKind::Comma => "','",
            TokenKind::Colon => "':'",
            TokenKind::LBracket => "'['",
            TokenKind::RBracket => "']'",
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::Dot => "'.'",
        };
        f.write_str(text)
    }
}

/// Position in source text for error reporting
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Span {
    pub line: usize,
    pub column: usize,
    pub offset: usize,
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A token with its source text and position.
///
/// For `String` tokens `lexeme` is the text between the quotes; for every
/// other kind it is the exact source text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub span: Span,
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self.kind {
            TokenKind::String => write!(f, "string \"{}\"", self.lexeme),
            TokenKind::Identifier => write!(f, "identifier '{}'", self.lexeme),
            TokenKind::Number => write!(f, "number {}", self.lexeme),
            _ => write!(f, "'{}'", self.lexeme),
        }
    }
}

/// Tokenize a binding string
pub fn tokenize(input: &str) -> Result<Vec<Token>, LexError> {
    Tokenizer::new(input).tokenize()
}

/// Tokenizer for binding strings
pub struct Tokenizer {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
}

impl Tokenizer {
    /// Create a new tokenizer for the given input text
    pub fn new(text: &str) -> Self {
        Tokenizer {
            input: text.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
        }
    }

    /// Tokenize the entire input
    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens: Vec<Token> = Vec::new();

        loop {
            self.skip_whitespace();

            let Some(ch) = self.peek() else {
                break;
            };

            // A member name follows a dot, even when it starts with a digit (`e.1`)
            let after_dot = tokens.last().is_some_and(|t| t.kind == TokenKind::Dot);
            let token = self.next_token(ch, after_dot)?;
            tokens.push(token);
        }

        tracing::trace!(count = tokens.len(), "tokenized binding string");
        Ok(tokens)
    }

    // ── Character helpers ──────────────────────────────────

    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_ahead(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.input.get(self.position).copied();
        if let Some(c) = ch {
            self.position += 1;
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        ch
    }

    fn current_span(&self) -> Span {
        Span {
            line: self.line,
            column: self.column,
            offset: self.position,
        }
    }

    fn text_from(&self, start: usize) -> String {
        self.input[start..self.position].iter().collect()
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    // ── Main dispatch ──────────────────────────────────────

    fn next_token(&mut self, ch: char, after_dot: bool) -> Result<Token, LexError> {
        let span = self.current_span();

        match ch {
            ',' => Ok(self.punctuation(TokenKind::Comma, span)),
            ':' => Ok(self.punctuation(TokenKind::Colon, span)),
            '[' => Ok(self.punctuation(TokenKind::LBracket, span)),
            ']' => Ok(self.punctuation(TokenKind::RBracket, span)),
            '{' => Ok(self.punctuation(TokenKind::LBrace, span)),
            '}' => Ok(self.punctuation(TokenKind::RBrace, span)),
            '(' => Ok(self.punctuation(TokenKind::LParen, span)),
            ')' => Ok(self.punctuation(TokenKind::RParen, span)),
            '.' => Ok(self.punctuation(TokenKind::Dot, span)),
            '"' => self.read_string(span),
            c if after_dot && is_identifier_char(c) => Ok(self.read_member(span)),
            c if c.is_ascii_digit() => self.read_number(span),
            '-' if self.peek_ahead(1).is_some_and(|c| c.is_ascii_digit()) => self.read_number(span),
            c if is_identifier_start(c) => Ok(self.read_identifier_or_keyword(span)),
            _ => Err(LexError::UnexpectedCharacter { ch, span }),
        }
    }

    fn punctuation(&mut self, kind: TokenKind, span: Span) -> Token {
        let start = self.position;
        self.advance();
        Token {
            kind,
            lexeme: self.text_from(start),
            span,
        }
    }

    // ── String literals ────────────────────────────────────

    fn read_string(&mut self, span: Span) -> Result<Token, LexError> {
        self.advance(); // consume opening "
        let mut value = String::new();

        // No escape sequences: everything up to the next quote is taken verbatim
        loop {
            match self.advance() {
                None => return Err(LexError::UnterminatedString { span }),
                Some('"') => break,
                Some(c) => value.push(c),
            }
        }

        Ok(Token {
            kind: TokenKind::String,
            lexeme: value,
            span,
        })
    }

    // ── Numbers ────────────────────────────────────────────

    /// JSON number: no leading zeros, fraction and exponent need digits
    fn read_number(&mut self, span: Span) -> Result<Token, LexError> {
        let start = self.position;

        if self.peek() == Some('-') {
            self.advance();
        }
        if self.peek() == Some('0') {
            if let Some(ch) = self.peek_ahead(1).filter(|c| c.is_ascii_digit()) {
                self.advance();
                return Err(LexError::UnexpectedCharacter {
                    ch,
                    span: self.current_span(),
                });
            }
        }
        self.consume_digits();

        // Fraction only when a digit follows, so `1.` leaves the dot alone
        if self.peek() == Some('.') && self.peek_ahead(1).is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
            self.consume_digits();
        }

        if matches!(self.peek(), Some('e' | 'E')) {
            let signed = matches!(self.peek_ahead(1), Some('+' | '-'));
            let digit_at = if signed { 2 } else { 1 };
            if self.peek_ahead(digit_at).is_some_and(|c| c.is_ascii_digit()) {
                for _ in 0..digit_at {
                    self.advance();
                }
                self.consume_digits();
            }
        }

        Ok(Token {
            kind: TokenKind::Number,
            lexeme: self.text_from(start),
            span,
        })
    }

    fn consume_digits(&mut self) {
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }
    }

    // ── Identifiers & Keywords ─────────────────────────────

    fn read_identifier_or_keyword(&mut self, span: Span) -> Token {
        let mut token = self.read_member(span);

        token.kind = match token.lexeme.as_str() {
            "true" | "false" => TokenKind::Boolean,
            "null" => TokenKind::Null,
            "undefined" => TokenKind::Undefined,
            _ => TokenKind::Identifier,
        };

        token
    }

    fn read_member(&mut self, span: Span) -> Token {
        let start = self.position;

        while self.peek().is_some_and(is_identifier_char) {
            self.advance();
        }

        Token {
            kind: TokenKind::Identifier,
            lexeme: self.text_from(start),
            span,
        }
    }
}

fn is_identifier_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}
