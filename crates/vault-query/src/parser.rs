//! Query parser.
//!
//! Turns a token stream into a flat list of clauses.
//!
//! # Grammar
//!
//! ```text
//! query   → clause*
//! clause  → "OR" | "-"? primary
//! primary → TERM | PHRASE | FIELD_PREFIX (TERM | PHRASE)
//! ```

use crate::{
    ast::{Clause, Field, Matcher, Query},
    error::{QueryError, QueryErrorKind},
    lexer::{Token, tokenize},
};

/// Clause builder over a token stream.
struct Parser {
    /// Token stream to parse.
    tokens: Vec<Token>,
    /// Current position in token stream.
    position: usize,
}

impl Parser {
    /// Creates a new parser from a token stream.
    fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            position: 0,
        }
    }

    /// Parses every clause. Empty phrases contribute nothing.
    fn parse(mut self) -> Vec<Clause> {
        let mut clauses = Vec::new();

        while let Some(token) = self.advance() {
            let (negated, token) = match token {
                Token::Or => continue,
                Token::Not => match self.advance() {
                    Some(inner) => (true, inner),
                    None => break,
                },
                other => (false, other),
            };

            let (field, token) = match token {
                Token::FieldPrefix(field) => match self.advance() {
                    Some(value) => (field, value),
                    None => break,
                },
                other => (Field::Body, other),
            };

            if let Some(matcher) = matcher_for(token) {
                clauses.push(Clause {
                    field,
                    matcher,
                    negated,
                });
            }
        }

        clauses
    }

    /// Takes the next token.
    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.position).cloned();
        self.position += 1;
        token
    }
}

/// Converts a value token into a matcher.
///
/// A negated `OR` is the literal word; a phrase with no words yields nothing.
fn matcher_for(token: Token) -> Option<Matcher> {
    match token {
        Token::Term(text) => Some(Matcher::Term(text)),
        Token::Or => Some(Matcher::Term("OR".into())),
        Token::Phrase(text) => {
            let words: Vec<String> = text.split_whitespace().map(String::from).collect();
            match words.len() {
                0 => None,
                1 => words.into_iter().next().map(Matcher::Term),
                _ => Some(Matcher::Phrase(words)),
            }
        }
        Token::Not | Token::FieldPrefix(_) => None,
    }
}

/// Parses a query string.
///
/// Returns an empty [`Query`] for blank input. A query whose every clause is negated is
/// rejected, since it cannot select anything.
pub fn parse(input: &str) -> Result<Query, QueryError> {
    let tokens = tokenize(input)?;
    let clauses = Parser::new(tokens).parse();

    if !clauses.is_empty() && clauses.iter().all(|clause| clause.negated) {
        return Err(QueryError::new(QueryErrorKind::NegationOnly, 0, input));
    }

    Ok(Query { clauses })
}
