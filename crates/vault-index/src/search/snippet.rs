//! Snippet windows over body text.

use std::{collections::HashSet, ops::Range};

use tantivy::tokenizer::{TextAnalyzer, TokenStream};

/// Marker for elided text at either end of a snippet.
const ELLIPSIS: char = '…';

/// Finds the byte range of the first body token whose analyzed form is in `terms`.
pub fn first_match(
    analyzer: &TextAnalyzer,
    body: &str,
    terms: &HashSet<String>,
) -> Option<Range<usize>> {
    if terms.is_empty() {
        return None;
    }
    let mut analyzer = analyzer.clone();
    let mut stream = analyzer.token_stream(body);
    while let Some(token) = stream.next() {
        if terms.contains(&token.text) {
            return Some(token.offset_from..token.offset_to);
        }
    }
    None
}

/// Cuts a window of at most `max_chars` characters out of `body`.
///
/// The window is centered on `matched` when given, otherwise it starts at the
/// beginning. Elided text on either side is marked with `…`.
pub fn build_snippet(body: &str, matched: Option<Range<usize>>, max_chars: usize) -> String {
    if body.is_empty() || max_chars == 0 {
        return String::new();
    }

    let total = body.chars().count();
    if total <= max_chars {
        return body.to_string();
    }

    let start = match matched {
        Some(range) if body.is_char_boundary(range.start) && body.is_char_boundary(range.end) => {
            let match_start = body[..range.start].chars().count();
            let match_len = body[range].chars().count();
            let center = match_start + match_len / 2;
            center.saturating_sub(max_chars / 2).min(total - max_chars)
        }
        _ => 0,
    };
    let end = start + max_chars;

    let mut snippet = String::with_capacity(max_chars + 2 * ELLIPSIS.len_utf8());
    if start > 0 {
        snippet.push(ELLIPSIS);
    }
    snippet.extend(body.chars().skip(start).take(max_chars));
    if end < total {
        snippet.push(ELLIPSIS);
    }
    snippet
}
