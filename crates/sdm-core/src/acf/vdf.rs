//! Parser for Valve's KeyValues text format (the ACF serialization).
//!
//! The grammar is a sequence of `"key" "value"` pairs and `"key" { ... }`
//! blocks, nested arbitrarily. Keys and values may be quoted (with `\"`,
//! `\\`, `\n`, `\t` escapes) or bare words; `//` starts a line comment.
//! Duplicate keys resolve last-wins, so a single pass yields a deterministic
//! mapping.

use std::collections::BTreeMap;
use std::iter::Peekable;
use std::str::Chars;

use thiserror::Error;

/// Maximum block nesting accepted before the parse is rejected. Real ACF
/// files nest two or three levels deep.
const MAX_DEPTH: usize = 32;

/// Tokenizer/parser failure with the 1-based line it occurred on.
#[derive(Debug, Error)]
#[error("line {line}: {message}")]
pub struct SyntaxError {
    pub line: usize,
    pub message: String,
}

/// A parsed KeyValues value: a string leaf or a nested block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Str(String),
    Block(Object),
}

/// A KeyValues block: key -> value mapping with deterministic iteration.
pub type Object = BTreeMap<String, Value>;

impl Value {
    /// The string payload, or None for a block.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            Value::Block(_) => None,
        }
    }

    /// The nested block, or None for a string leaf.
    pub fn as_block(&self) -> Option<&Object> {
        match self {
            Value::Str(_) => None,
            Value::Block(b) => Some(b),
        }
    }
}

/// Parses a KeyValues document into its top-level mapping.
///
/// The top level of an ACF file is a single `"AppState" { ... }` pair, but
/// the grammar itself allows any number of top-level pairs; all are kept.
pub fn parse(input: &str) -> Result<Object, SyntaxError> {
    let mut tokens = Tokenizer::new(input);
    parse_pairs(&mut tokens, 0)
}

enum Token {
    Open,
    Close,
    Str(String),
}

fn parse_pairs(tokens: &mut Tokenizer<'_>, depth: usize) -> Result<Object, SyntaxError> {
    if depth > MAX_DEPTH {
        return Err(tokens.error("blocks nested too deeply"));
    }
    let mut object = Object::new();
    loop {
        let key = match tokens.next_token()? {
            None if depth == 0 => return Ok(object),
            None => return Err(tokens.error("unclosed block")),
            Some(Token::Close) if depth > 0 => return Ok(object),
            Some(Token::Close) => return Err(tokens.error("unexpected '}'")),
            Some(Token::Open) => return Err(tokens.error("block has no key")),
            Some(Token::Str(key)) => key,
        };
        let value = match tokens.next_token()? {
            Some(Token::Str(value)) => Value::Str(value),
            Some(Token::Open) => Value::Block(parse_pairs(tokens, depth + 1)?),
            Some(Token::Close) | None => {
                return Err(tokens.error(&format!("key {key:?} has no value")))
            }
        };
        // Last occurrence wins on duplicate keys.
        object.insert(key, value);
    }
}

struct Tokenizer<'a> {
    chars: Peekable<Chars<'a>>,
    line: usize,
}

impl<'a> Tokenizer<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
            line: 1,
        }
    }

    fn error(&self, message: &str) -> SyntaxError {
        SyntaxError {
            line: self.line,
            message: message.to_string(),
        }
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next();
        if c == Some('\n') {
            self.line += 1;
        }
        c
    }

    fn next_token(&mut self) -> Result<Option<Token>, SyntaxError> {
        loop {
            match self.chars.peek() {
                None => return Ok(None),
                Some(c) if c.is_whitespace() => {
                    self.bump();
                }
                Some('/') => {
                    if self.at_comment() {
                        self.skip_comment();
                    } else {
                        return self.bare_word().map(Some);
                    }
                }
                Some('{') => {
                    self.bump();
                    return Ok(Some(Token::Open));
                }
                Some('}') => {
                    self.bump();
                    return Ok(Some(Token::Close));
                }
                Some('"') => return self.quoted().map(Some),
                Some(_) => return self.bare_word().map(Some),
            }
        }
    }

    /// True if the next two characters start a `//` comment. A lone `/` is
    /// the start of a bare word instead.
    fn at_comment(&self) -> bool {
        let mut lookahead = self.chars.clone();
        lookahead.next() == Some('/') && lookahead.next() == Some('/')
    }

    /// Consumes a `//` comment through the end of the line.
    fn skip_comment(&mut self) {
        while let Some(c) = self.bump() {
            if c == '\n' {
                break;
            }
        }
    }

    fn quoted(&mut self) -> Result<Token, SyntaxError> {
        let start_line = self.line;
        self.bump(); // opening quote
        let mut out = String::new();
        loop {
            match self.bump() {
                None => {
                    return Err(SyntaxError {
                        line: start_line,
                        message: "unterminated string".to_string(),
                    })
                }
                Some('"') => return Ok(Token::Str(out)),
                Some('\\') => match self.bump() {
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    // Unknown escapes keep the escaped character as-is.
                    Some(c) => out.push(c),
                    None => {
                        return Err(SyntaxError {
                            line: start_line,
                            message: "unterminated string".to_string(),
                        })
                    }
                },
                Some(c) => out.push(c),
            }
        }
    }

    fn bare_word(&mut self) -> Result<Token, SyntaxError> {
        let mut out = String::new();
        while let Some(&c) = self.chars.peek() {
            if c.is_whitespace() || c == '{' || c == '}' || c == '"' {
                break;
            }
            out.push(c);
            self.bump();
        }
        Ok(Token::Str(out))
    }
}
