//! Query syntax for vault search.
//!
//! A query is a whitespace-separated list of clauses:
//!
//! - **Terms**: `rust` - words to look for
//! - **Phrases**: `"brown fox"` - exact sequences
//! - **Negation**: `-draft` - documents containing this are excluded
//! - **Fields**: `path:journal`, `tags:todo` - match a specific field instead of the body
//!
//! Positive clauses combine disjunctively: a document matches when at least one of them
//! does. The bare keyword `OR` is accepted and ignored.
//!
//! # Example
//!
//! ```
//! use vault_query::{Field, parse};
//!
//! let query = parse("tags:rust \"error handling\" -draft").unwrap();
//! assert_eq!(query.positive().count(), 2);
//! assert_eq!(query.clauses[0].field, Field::Tags);
//! ```

#![warn(missing_docs)]

mod ast;
mod error;
mod lexer;
mod parser;

pub use ast::{Clause, Field, Matcher, Query};
pub use error::{QueryError, QueryErrorKind};
pub use lexer::{Token, tokenize};
pub use parser::parse;
