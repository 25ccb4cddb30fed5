//! Error types for query parsing.

use std::{error, fmt};

use thiserror::Error;

/// The specific kind of query error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryErrorKind {
    /// A phrase was opened and never closed.
    #[error("unclosed quote")]
    UnterminatedQuote,
    /// A `-` with nothing to negate.
    #[error("'-' must be followed by a term or phrase")]
    DanglingNegation,
    /// A field prefix with no value after it.
    #[error("expected term or phrase after '{field}:'")]
    EmptyFieldValue {
        /// The field name as written.
        field: String,
    },
    /// A field prefix that names no searchable field.
    #[error("unknown field: {field}")]
    UnknownField {
        /// The field name as written.
        field: String,
    },
    /// Every clause is negated, so nothing can be selected.
    #[error("query has only negated clauses")]
    NegationOnly,
}

/// A rejected query, with the byte position of the problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryError {
    /// The kind of error that occurred.
    pub kind: QueryErrorKind,
    /// Byte position in the query where the problem starts.
    pub position: usize,
    /// The original query string.
    pub query: String,
}

impl QueryError {
    /// Creates an error at a byte position of `query`.
    pub fn new(kind: QueryErrorKind, position: usize, query: &str) -> Self {
        Self {
            kind,
            position,
            query: query.to_string(),
        }
    }

    /// Returns a suggestion for common errors.
    pub fn suggestion(&self) -> Option<&'static str> {
        match &self.kind {
            QueryErrorKind::UnterminatedQuote => {
                Some("Add a closing quote (\") to complete the phrase")
            }
            QueryErrorKind::UnknownField { .. } => Some("Valid fields are: body, path, tags"),
            QueryErrorKind::NegationOnly => {
                Some("Add at least one term to search for, e.g. 'rust -draft'")
            }
            QueryErrorKind::DanglingNegation | QueryErrorKind::EmptyFieldValue { .. } => None,
        }
    }
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "query syntax error: {}", self.kind)?;
        writeln!(f, "  {}", self.query)?;
        let column = self
            .query
            .get(..self.position)
            .unwrap_or(&self.query)
            .chars()
            .count();
        write!(f, "  {}^", " ".repeat(column))?;

        if let Some(suggestion) = self.suggestion() {
            write!(f, "\nhint: {suggestion}")?;
        }

        Ok(())
    }
}

impl error::Error for QueryError {}
