//! Scans a formula string into tokens.
//!
//! Identifiers keep their case: they name value bindings, and field names
//! are case-sensitive. Names that are not valid identifiers can be written
//! as `[Unit Price_sum]` or `{Unit Price_sum}`.

use std::fmt;
use std::iter::Peekable;
use std::str::CharIndices;

use super::FormulaError;

/// Tokens recognized by the formula lexer.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Number(f64),
    Identifier(String),
    /// A bracketed or braced name.
    Reference(String),

    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    Equal,
    NotEqual,
    Less,
    Greater,
    LessEqual,
    GreaterEqual,

    LParen,
    RParen,
    Comma,

    Eof,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(n) => write!(f, "{}", n),
            Token::Identifier(s) => write!(f, "{}", s),
            Token::Reference(s) => write!(f, "[{}]", s),
            Token::Plus => f.write_str("+"),
            Token::Minus => f.write_str("-"),
            Token::Star => f.write_str("*"),
            Token::Slash => f.write_str("/"),
            Token::Caret => f.write_str("^"),
            Token::Equal => f.write_str("="),
            Token::NotEqual => f.write_str("<>"),
            Token::Less => f.write_str("<"),
            Token::Greater => f.write_str(">"),
            Token::LessEqual => f.write_str("<="),
            Token::GreaterEqual => f.write_str(">="),
            Token::LParen => f.write_str("("),
            Token::RParen => f.write_str(")"),
            Token::Comma => f.write_str(","),
            Token::Eof => f.write_str("end of formula"),
        }
    }
}

/// A token and the byte offset where it starts.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub position: usize,
}

pub struct Lexer<'a> {
    source: &'a str,
    input: Peekable<CharIndices<'a>>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            input: source.char_indices().peekable(),
        }
    }

    /// Tokenize the whole input. The last token is always [`Token::Eof`].
    pub fn tokenize(mut self) -> Result<Vec<Spanned>, FormulaError> {
        let mut tokens = Vec::new();
        loop {
            let spanned = self.next_token()?;
            let done = spanned.token == Token::Eof;
            tokens.push(spanned);
            if done {
                return Ok(tokens);
            }
        }
    }

    fn next_token(&mut self) -> Result<Spanned, FormulaError> {
        self.skip_whitespace();

        let Some((position, ch)) = self.input.next() else {
            return Ok(Spanned {
                token: Token::Eof,
                position: self.source.len(),
            });
        };

        let token = match ch {
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' => Token::Star,
            '/' => Token::Slash,
            '^' => Token::Caret,
            '(' => Token::LParen,
            ')' => Token::RParen,
            ',' => Token::Comma,
            '=' => {
                // Accept "==" as well.
                self.consume_if('=');
                Token::Equal
            }
            '!' if self.consume_if('=') => Token::NotEqual,
            '<' => {
                if self.consume_if('=') {
                    Token::LessEqual
                } else if self.consume_if('>') {
                    Token::NotEqual
                } else {
                    Token::Less
                }
            }
            '>' => {
                if self.consume_if('=') {
                    Token::GreaterEqual
                } else {
                    Token::Greater
                }
            }
            '[' => self.read_reference(position, ']')?,
            '{' => self.read_reference(position, '}')?,
            c if c.is_ascii_digit() || c == '.' => self.read_number(position)?,
            c if is_identifier_start(c) => self.read_identifier(position, c),
            c => return Err(FormulaError::IllegalCharacter { ch: c, position }),
        };

        Ok(Spanned { token, position })
    }

    fn skip_whitespace(&mut self) {
        while self.input.next_if(|(_, c)| c.is_whitespace()).is_some() {}
    }

    fn consume_if(&mut self, expected: char) -> bool {
        self.input.next_if(|(_, c)| *c == expected).is_some()
    }

    fn read_reference(&mut self, start: usize, close: char) -> Result<Token, FormulaError> {
        let mut name = String::new();
        for (_, ch) in self.input.by_ref() {
            if ch == close {
                let trimmed = name.trim();
                if trimmed.is_empty() {
                    return Err(FormulaError::EmptyReference(start));
                }
                return Ok(Token::Reference(trimmed.to_string()));
            }
            name.push(ch);
        }
        Err(FormulaError::UnterminatedReference(start))
    }

    fn read_number(&mut self, start: usize) -> Result<Token, FormulaError> {
        let mut end = start + 1;
        let mut seen_dot = self.source[start..].starts_with('.');
        let mut seen_exponent = false;

        while let Some(&(idx, ch)) = self.input.peek() {
            let accept = if ch.is_ascii_digit() {
                true
            } else if ch == '.' && !seen_dot && !seen_exponent {
                seen_dot = true;
                true
            } else if (ch == 'e' || ch == 'E') && !seen_exponent {
                seen_exponent = true;
                true
            } else if (ch == '+' || ch == '-') && self.source[..idx].ends_with(['e', 'E']) {
                true
            } else {
                false
            };
            if !accept {
                break;
            }
            self.input.next();
            end = idx + ch.len_utf8();
        }

        let text = &self.source[start..end];
        text.parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .map(Token::Number)
            .ok_or_else(|| FormulaError::InvalidNumber(text.to_string()))
    }

    fn read_identifier(&mut self, start: usize, first: char) -> Token {
        let mut end = start + first.len_utf8();
        while let Some((idx, ch)) = self.input.next_if(|(_, c)| is_identifier_continue(*c)) {
            end = idx + ch.len_utf8();
        }
        Token::Identifier(self.source[start..end].to_string())
    }
}

fn is_identifier_start(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_'
}

fn is_identifier_continue(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '.'
}
