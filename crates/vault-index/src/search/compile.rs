//! Query compiler.
//!
//! Compiles a parsed [`vault_query::Query`] into a Tantivy query. Clause text goes
//! through the same analyzer as document text. A clause that analyzes to several
//! tokens becomes a phrase, so `zzz-nomatch` only matches that exact sequence.

use std::collections::HashSet;

use tantivy::{
    Term,
    query::{BooleanQuery, Occur, PhraseQuery, Query as TantivyQuery, TermQuery},
    schema::{Field as SchemaField, IndexRecordOption},
    tokenizer::TextAnalyzer,
};
use vault_query::{Clause, Field, Query};

use crate::{analyzer::analyze, schema::IndexSchema};

/// Compiles query ASTs into Tantivy queries.
pub struct QueryCompiler {
    /// Index schema for field references.
    schema: IndexSchema,
    /// Text analyzer for tokenizing clause text.
    analyzer: TextAnalyzer,
}

impl QueryCompiler {
    /// Creates a compiler using the given analyzer.
    pub fn new(schema: IndexSchema, analyzer: TextAnalyzer) -> Self {
        Self { schema, analyzer }
    }

    /// Compiles a query.
    ///
    /// Positive clauses are alternatives (`Should`), negated clauses exclude
    /// (`MustNot`). Returns `None` when no positive clause survives analysis.
    pub fn compile(&self, query: &Query) -> Option<Box<dyn TantivyQuery>> {
        let mut subqueries: Vec<(Occur, Box<dyn TantivyQuery>)> = Vec::new();

        for clause in query.positive() {
            if let Some(q) = self.compile_clause(clause) {
                subqueries.push((Occur::Should, q));
            }
        }
        if subqueries.is_empty() {
            return None;
        }

        for clause in query.negative() {
            if let Some(q) = self.compile_clause(clause) {
                subqueries.push((Occur::MustNot, q));
            }
        }

        Some(Box::new(BooleanQuery::new(subqueries)))
    }

    /// Analyzed body terms of the positive clauses, used to locate snippets.
    pub fn highlight_terms(&self, query: &Query) -> HashSet<String> {
        query
            .positive()
            .filter(|clause| clause.field == Field::Body)
            .flat_map(|clause| analyze(&self.analyzer, &clause.text()))
            .collect()
    }

    /// Compiles one clause, ignoring its negation flag.
    fn compile_clause(&self, clause: &Clause) -> Option<Box<dyn TantivyQuery>> {
        let field = self.schema_field(clause.field);
        let mut terms: Vec<Term> = analyze(&self.analyzer, &clause.text())
            .iter()
            .map(|token| Term::from_field_text(field, token))
            .collect();

        match terms.len() {
            0 => None,
            1 => terms.pop().map(|term| {
                Box::new(TermQuery::new(term, IndexRecordOption::WithFreqs))
                    as Box<dyn TantivyQuery>
            }),
            _ => Some(Box::new(PhraseQuery::new(terms))),
        }
    }

    /// Maps a query field to its index field.
    fn schema_field(&self, field: Field) -> SchemaField {
        match field {
            Field::Body => self.schema.body,
            Field::Path => self.schema.path_text,
            Field::Tags => self.schema.tags,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::analyzer::build_analyzer_from_name;

    fn compiler() -> QueryCompiler {
        QueryCompiler::new(
            IndexSchema::new(),
            build_analyzer_from_name("english").unwrap(),
        )
    }

    fn compile_str(input: &str) -> Option<String> {
        let query = vault_query::parse(input).unwrap();
        compiler().compile(&query).map(|q| format!("{q:?}"))
    }

    #[test]
    fn empty_query_compiles_to_none() {
        assert!(compile_str("").is_none());
    }

    #[test]
    fn punctuation_only_compiles_to_none() {
        assert!(compile_str("\"...\" ???").is_none());
    }

    #[test]
    fn single_term_is_term_query() {
        let debug = compile_str("Foxes").unwrap();
        assert!(debug.contains("TermQuery"), "{debug}");
        assert!(debug.contains("\"fox\""), "{debug}");
    }

    #[test]
    fn hyphenated_term_becomes_phrase() {
        let debug = compile_str("zzz-nomatch").unwrap();
        assert!(debug.contains("PhraseQuery"), "{debug}");
    }

    #[test]
    fn negation_is_must_not() {
        let debug = compile_str("fox -draft").unwrap();
        assert!(debug.contains("MustNot"), "{debug}");
        assert!(debug.contains("Should"), "{debug}");
    }

    #[test]
    fn highlight_terms_only_from_positive_body_clauses() {
        let query = vault_query::parse("quick \"brown foxes\" -lazy path:notes tags:draft").unwrap();
        let terms = compiler().highlight_terms(&query);

        let mut sorted: Vec<_> = terms.into_iter().collect();
        sorted.sort();
        assert_eq!(sorted, vec!["brown", "fox", "quick"]);
    }
}
