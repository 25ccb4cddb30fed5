//! Ranked query evaluation over index snapshots.
//!
//! 1. **Parse**: the query string is parsed by `vault-query`. Syntax errors are
//!    returned to the caller as [`IndexError::Query`].
//! 2. **Compile**: clauses are analyzed and turned into a Tantivy boolean query
//!    (see [`compile`]).
//! 3. **Score**: every matching document is scored with BM25.
//! 4. **Rank**: results are ordered by score, then most recent modification, then
//!    path, and truncated to the limit. Scores are divided by the best score so the top
//!    result gets 1.0.
//! 5. **Snippet**: a window of the body around the first matching token (see
//!    [`snippet`]).

mod compile;
mod snippet;

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
pub use compile::QueryCompiler;
use serde::Serialize;
pub use snippet::{build_snippet, first_match};
use tantivy::{TantivyDocument, collector::TopDocs, tokenizer::TextAnalyzer};
use vault_config::Config;

use crate::{
    IndexError,
    analyzer::build_analyzer_from_name,
    schema::IndexSchema,
    snapshot::{IndexSnapshot, date_value, text_value},
};

/// One ranked search hit.
///
/// Serializes as the query API record `{path, content_preview, score, modified}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredResult {
    /// Vault-relative path.
    pub path: String,
    /// Snippet of the body text.
    pub content_preview: String,
    /// Score normalized into (0, 1].
    pub score: f32,
    /// Last modification time.
    pub modified: DateTime<Utc>,
}

/// A scored document before ranking.
struct Hit {
    /// Raw BM25 score.
    score: f32,
    /// Vault-relative path.
    path: String,
    /// Modification time.
    modified: DateTime<Utc>,
    /// Stored body text.
    body: String,
}

/// Orders hits best first.
fn rank(a: &Hit, b: &Hit) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| b.modified.cmp(&a.modified))
        .then_with(|| a.path.cmp(&b.path))
}

/// Evaluates query strings against snapshots.
///
/// Holds no index state; any number of searches may run alongside commits.
pub struct QueryEngine {
    /// Query compiler.
    compiler: QueryCompiler,
    /// Analyzer shared with the index, used for snippet matching.
    analyzer: TextAnalyzer,
    /// Snippet window in characters.
    snippet_chars: usize,
}

impl QueryEngine {
    /// Creates an engine for an index built with `stemmer`.
    pub fn new(stemmer: &str, snippet_chars: usize) -> Result<Self, IndexError> {
        let analyzer = build_analyzer_from_name(stemmer)?;
        Ok(Self {
            compiler: QueryCompiler::new(IndexSchema::new(), analyzer.clone()),
            analyzer,
            snippet_chars,
        })
    }

    /// Creates an engine from a loaded configuration.
    pub fn from_config(config: &Config) -> Result<Self, IndexError> {
        Self::new(&config.index.stemmer, config.search.snippet_chars)
    }

    /// Runs `query` against `snapshot` and returns at most `limit` ranked results.
    ///
    /// An empty query or a zero limit returns no results.
    pub fn search(
        &self,
        query: &str,
        snapshot: &IndexSnapshot,
        limit: usize,
    ) -> Result<Vec<ScoredResult>, IndexError> {
        let parsed = vault_query::parse(query)?;
        if parsed.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }
        let Some(compiled) = self.compiler.compile(&parsed) else {
            return Ok(Vec::new());
        };

        let searcher = snapshot.searcher();
        let num_docs = usize::try_from(searcher.num_docs()).unwrap_or(usize::MAX);
        if num_docs == 0 {
            return Ok(Vec::new());
        }

        // Ties at the limit are resolved by the full ordering, so collect every match.
        let top = searcher
            .search(compiled.as_ref(), &TopDocs::with_limit(num_docs))
            .map_err(|e| IndexError::read(&e))?;

        let schema = snapshot.schema();
        let mut hits = Vec::with_capacity(top.len());
        for (score, address) in top {
            let doc: TantivyDocument = searcher.doc(address).map_err(|e| IndexError::read(&e))?;
            hits.push(Hit {
                score,
                path: text_value(&doc, schema.path),
                modified: date_value(&doc, schema.modified),
                body: text_value(&doc, schema.body),
            });
        }

        hits.sort_by(rank);
        hits.truncate(limit);

        let best = hits.first().map_or(0.0, |hit| hit.score);
        let terms = self.compiler.highlight_terms(&parsed);

        Ok(hits
            .into_iter()
            .map(|hit| {
                let matched = first_match(&self.analyzer, &hit.body, &terms);
                ScoredResult {
                    content_preview: build_snippet(&hit.body, matched, self.snippet_chars),
                    score: if best > 0.0 { hit.score / best } else { 1.0 },
                    path: hit.path,
                    modified: hit.modified,
                }
            })
            .collect())
    }
}
