//! Text analysis shared by documents and queries.
//!
//! Documents and queries must be analyzed identically, otherwise query terms never
//! meet indexed terms. Both sides go through [`build_analyzer`] with the language
//! named by `[index] stemmer`.

use tantivy::tokenizer::{
    Language, LowerCaser, RemoveLongFilter, SimpleTokenizer, Stemmer, TextAnalyzer, TokenStream,
};

use crate::IndexError;

/// Name the analyzer is registered under in the Tantivy index.
pub const VAULT_TOKENIZER: &str = "vault_text";

/// Tokens longer than this many bytes are dropped.
const MAX_TOKEN_LENGTH: usize = 40;

/// Stemmer languages by configuration name.
const LANGUAGES: [(&str, Language); 18] = [
    ("arabic", Language::Arabic),
    ("danish", Language::Danish),
    ("dutch", Language::Dutch),
    ("english", Language::English),
    ("finnish", Language::Finnish),
    ("french", Language::French),
    ("german", Language::German),
    ("greek", Language::Greek),
    ("hungarian", Language::Hungarian),
    ("italian", Language::Italian),
    ("norwegian", Language::Norwegian),
    ("portuguese", Language::Portuguese),
    ("romanian", Language::Romanian),
    ("russian", Language::Russian),
    ("spanish", Language::Spanish),
    ("swedish", Language::Swedish),
    ("tamil", Language::Tamil),
    ("turkish", Language::Turkish),
];

/// Looks up a stemmer language by name, ignoring case.
pub fn parse_language(name: &str) -> Result<Language, IndexError> {
    LANGUAGES
        .iter()
        .find(|(candidate, _)| candidate.eq_ignore_ascii_case(name))
        .map(|(_, language)| *language)
        .ok_or_else(|| IndexError::InvalidLanguage(name.to_string()))
}

/// Tokenizes on non-alphanumerics, lowercases, drops oversized tokens, then stems.
pub fn build_analyzer(language: Language) -> TextAnalyzer {
    TextAnalyzer::builder(SimpleTokenizer::default())
        .filter(LowerCaser)
        .filter(RemoveLongFilter::limit(MAX_TOKEN_LENGTH))
        .filter(Stemmer::new(language))
        .build()
}

/// [`build_analyzer`] for a configured language name.
pub fn build_analyzer_from_name(name: &str) -> Result<TextAnalyzer, IndexError> {
    parse_language(name).map(build_analyzer)
}

/// Runs `text` through the analyzer and returns the token texts.
pub fn analyze(analyzer: &TextAnalyzer, text: &str) -> Vec<String> {
    let mut analyzer = analyzer.clone();
    let mut stream = analyzer.token_stream(text);
    let mut tokens = Vec::new();
    while let Some(token) = stream.next() {
        tokens.push(token.text.clone());
    }
    tokens
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_case_insensitive() {
        assert_eq!(parse_language("English").unwrap(), Language::English);
        assert_eq!(parse_language("FRENCH").unwrap(), Language::French);
    }

    #[test]
    fn parse_invalid_language() {
        let err = parse_language("klingon").unwrap_err();
        assert!(err.to_string().contains("klingon"));
    }

    #[test]
    fn analyzer_lowercases_and_stems() {
        let analyzer = build_analyzer(Language::English);
        assert_eq!(
            analyze(&analyzer, "HELLO Running foxes"),
            vec!["hello", "run", "fox"]
        );
    }

    #[test]
    fn analyzer_removes_long_tokens() {
        let analyzer = build_analyzer(Language::English);
        let text = format!("short {} word", "a".repeat(50));
        assert_eq!(analyze(&analyzer, &text), vec!["short", "word"]);
    }

    #[test]
    fn analyzer_splits_punctuation() {
        let analyzer = build_analyzer(Language::English);
        assert_eq!(
            analyze(&analyzer, "zzz-nomatch, notes/today.md"),
            vec!["zzz", "nomatch", "note", "today", "md"]
        );
    }

    #[test]
    fn build_from_invalid_name() {
        assert!(matches!(
            build_analyzer_from_name("invalid"),
            Err(IndexError::InvalidLanguage(_))
        ));
    }
}
