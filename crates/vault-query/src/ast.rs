//! Parsed query representation.

use std::fmt;

/// Document field a clause is matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// Extracted body text (the default field).
    Body,
    /// The document's relative path.
    Path,
    /// The `tags` structured field.
    Tags,
}

impl Field {
    /// Looks up a field by its query prefix name.
    pub fn from_prefix(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "body" => Some(Self::Body),
            "path" => Some(Self::Path),
            "tags" | "tag" => Some(Self::Tags),
            _ => None,
        }
    }

    /// Returns the prefix name of this field.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Body => "body",
            Self::Path => "path",
            Self::Tags => "tags",
        }
    }
}

/// What a clause looks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Matcher {
    /// A single word.
    Term(String),
    /// An exact sequence of words.
    Phrase(Vec<String>),
}

/// One clause of a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
    /// Field to match.
    pub field: Field,
    /// Term or phrase to look for.
    pub matcher: Matcher,
    /// Whether matching documents are excluded.
    pub negated: bool,
}

impl Clause {
    /// The raw text of the clause, with phrase words joined by spaces.
    pub fn text(&self) -> String {
        match &self.matcher {
            Matcher::Term(term) => term.clone(),
            Matcher::Phrase(words) => words.join(" "),
        }
    }
}

/// A parsed query.
///
/// An empty query (no clauses) matches nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    /// Clauses in the order they appeared.
    pub clauses: Vec<Clause>,
}

impl Query {
    /// Returns true when the query has no clauses.
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Clauses that select documents.
    pub fn positive(&self) -> impl Iterator<Item = &Clause> {
        self.clauses.iter().filter(|clause| !clause.negated)
    }

    /// Clauses that exclude documents.
    pub fn negative(&self) -> impl Iterator<Item = &Clause> {
        self.clauses.iter().filter(|clause| clause.negated)
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, clause) in self.clauses.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            if clause.negated {
                f.write_str("-")?;
            }
            if clause.field != Field::Body {
                write!(f, "{}:", clause.field.as_str())?;
            }
            match &clause.matcher {
                Matcher::Term(term) => f.write_str(term)?,
                Matcher::Phrase(words) => write!(f, "\"{}\"", words.join(" "))?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clause(field: Field, matcher: Matcher, negated: bool) -> Clause {
        Clause {
            field,
            matcher,
            negated,
        }
    }

    #[test]
    fn field_prefixes_are_case_insensitive() {
        assert_eq!(Field::from_prefix("PATH"), Some(Field::Path));
        assert_eq!(Field::from_prefix("tag"), Some(Field::Tags));
        assert_eq!(Field::from_prefix("title"), None);
    }

    #[test]
    fn positive_and_negative_split() {
        let query = Query {
            clauses: vec![
                clause(Field::Body, Matcher::Term("fox".into()), false),
                clause(Field::Body, Matcher::Term("draft".into()), true),
            ],
        };
        assert_eq!(query.positive().count(), 1);
        assert_eq!(query.negative().next().unwrap().text(), "draft");
    }

    #[test]
    fn display_renders_query_syntax() {
        let query = Query {
            clauses: vec![
                clause(Field::Tags, Matcher::Term("rust".into()), false),
                clause(
                    Field::Body,
                    Matcher::Phrase(vec!["brown".into(), "fox".into()]),
                    false,
                ),
                clause(Field::Path, Matcher::Term("archive".into()), true),
            ],
        };
        assert_eq!(query.to_string(), "tags:rust \"brown fox\" -path:archive");
    }
}
