//! Query lexer (tokenizer).
//!
//! Converts a query string into a stream of tokens for the parser. Every positional error
//! (unclosed quotes, dangling negation, bad field prefixes) is reported here, where byte
//! offsets are known.

use std::{iter::Peekable, str::Chars};

use crate::{
    ast::Field,
    error::{QueryError, QueryErrorKind},
};

/// A token in the query language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A bare word (search term).
    Term(String),

    /// A quoted phrase (the quotes are stripped, content preserved).
    Phrase(String),

    /// The OR keyword.
    Or,

    /// Negation prefix (-).
    Not,

    /// Field prefix (e.g., "tags:" produces FieldPrefix(Field::Tags)).
    ///
    /// Always followed by a `Term` or `Phrase` token.
    FieldPrefix(Field),
}

/// Tokenizes a query string.
struct Lexer<'a> {
    /// The original input string.
    input: &'a str,
    /// Character iterator with one-character lookahead.
    chars: Peekable<Chars<'a>>,
    /// Current byte position in input.
    position: usize,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given input.
    fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.chars().peekable(),
            position: 0,
        }
    }

    /// Creates an error at a specific position.
    fn error_at(&self, kind: QueryErrorKind, position: usize) -> QueryError {
        QueryError::new(kind, position, self.input)
    }

    /// Tokenizes the entire input, returning all tokens or an error.
    fn tokenize(mut self) -> Result<Vec<Token>, QueryError> {
        let mut tokens = Vec::new();
        while self.next_tokens(&mut tokens)? {}
        Ok(tokens)
    }

    /// Appends the next token (two for a field clause). Returns false at end of input.
    fn next_tokens(&mut self, tokens: &mut Vec<Token>) -> Result<bool, QueryError> {
        self.skip_whitespace();

        let Some(&ch) = self.chars.peek() else {
            return Ok(false);
        };

        match ch {
            '"' => tokens.push(self.read_phrase()?),
            '-' => {
                let start = self.position;
                self.advance();
                match self.chars.peek() {
                    Some(&next) if !next.is_whitespace() && next != '-' => tokens.push(Token::Not),
                    _ => return Err(self.error_at(QueryErrorKind::DanglingNegation, start)),
                }
            }
            _ => self.read_word(tokens)?,
        }

        Ok(true)
    }

    /// Reads a quoted phrase.
    fn read_phrase(&mut self) -> Result<Token, QueryError> {
        let start_pos = self.position;
        self.advance(); // consume opening quote

        let mut content = String::new();

        loop {
            match self.chars.peek() {
                Some(&'"') => {
                    self.advance(); // consume closing quote
                    return Ok(Token::Phrase(content));
                }
                Some(&ch) => {
                    content.push(ch);
                    self.advance();
                }
                None => return Err(self.error_at(QueryErrorKind::UnterminatedQuote, start_pos)),
            }
        }
    }

    /// Reads a term, the OR keyword, or a field prefix with its value.
    fn read_word(&mut self, tokens: &mut Vec<Token>) -> Result<(), QueryError> {
        let start_pos = self.position;
        let mut word = String::new();

        while let Some(&ch) = self.chars.peek() {
            if ch.is_whitespace() || ch == '"' {
                break;
            }

            // Only alphabetic words form field prefixes, so `10:30` stays a term.
            if ch == ':' && !word.is_empty() && word.chars().all(|c| c.is_ascii_alphabetic()) {
                self.advance(); // consume the colon
                let Some(field) = Field::from_prefix(&word) else {
                    return Err(self.error_at(QueryErrorKind::UnknownField { field: word }, start_pos));
                };
                tokens.push(Token::FieldPrefix(field));
                let value = self.read_field_value(&word, start_pos)?;
                tokens.push(value);
                return Ok(());
            }

            word.push(ch);
            self.advance();
        }

        if word == "OR" {
            tokens.push(Token::Or);
        } else {
            tokens.push(Token::Term(word));
        }
        Ok(())
    }

    /// Reads the term or phrase directly after a field prefix.
    fn read_field_value(&mut self, field: &str, start_pos: usize) -> Result<Token, QueryError> {
        match self.chars.peek() {
            Some(&'"') => self.read_phrase(),
            Some(&ch) if !ch.is_whitespace() => {
                let mut value = String::new();
                while let Some(&ch) = self.chars.peek() {
                    if ch.is_whitespace() || ch == '"' {
                        break;
                    }
                    value.push(ch);
                    self.advance();
                }
                Ok(Token::Term(value))
            }
            _ => Err(self.error_at(
                QueryErrorKind::EmptyFieldValue {
                    field: field.to_string(),
                },
                start_pos,
            )),
        }
    }

    /// Skips whitespace characters.
    fn skip_whitespace(&mut self) {
        while let Some(&ch) = self.chars.peek() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Advances to the next character.
    fn advance(&mut self) {
        if let Some(ch) = self.chars.next() {
            self.position += ch.len_utf8();
        }
    }
}

/// Convenience function to tokenize a query string.
pub fn tokenize(input: &str) -> Result<Vec<Token>, QueryError> {
    Lexer::new(input).tokenize()
}
