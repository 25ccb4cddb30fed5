//! Structured block parsing for text documents.
//!
//! A structured block is optional YAML metadata at the start of a document, delimited by
//! `---` lines:
//!
//! ```markdown
//! ---
//! title: My Note
//! tags: [draft]
//! ---
//!
//! Content starts here
//! ```

use serde_yaml::Value;

use crate::{StructuredBlockError, StructuredFields};

/// The result of splitting a structured block from a text document.
#[derive(Debug)]
pub struct BlockSplit<'a> {
    /// Parsed fields; empty when there is no usable block.
    pub fields: StructuredFields,
    /// Text after the block, or the whole text when there is no block.
    pub body: &'a str,
    /// Why the block was ignored, if it was.
    pub error: Option<StructuredBlockError>,
}

/// Splits a leading structured block from `content` and parses it.
///
/// - No block: empty fields, the whole content as body.
/// - Unterminated block: empty fields, the whole content as body, and an error.
/// - Malformed YAML or a non-mapping block: empty fields, the text after the block as
///   body, and an error.
///
/// A leading BOM is stripped. The closing delimiter and one following blank line are
/// removed from the body.
pub fn split_structured_block(content: &str) -> BlockSplit<'_> {
    let content = content.trim_start_matches('\u{feff}');

    let Some(after_opening) = strip_delimiter_line(content) else {
        return BlockSplit {
            fields: StructuredFields::new(),
            body: content,
            error: None,
        };
    };

    let Some((yaml, remaining)) = split_at_closing_delimiter(after_opening) else {
        return BlockSplit {
            fields: StructuredFields::new(),
            body: content,
            error: Some(StructuredBlockError::Unterminated),
        };
    };

    // One blank line after the closing delimiter belongs to the block.
    let body = strip_line_break(remaining).unwrap_or(remaining);

    match parse_block(yaml) {
        Ok(fields) => BlockSplit {
            fields,
            body,
            error: None,
        },
        Err(error) => BlockSplit {
            fields: StructuredFields::new(),
            body,
            error: Some(error),
        },
    }
}

/// Parses block YAML into fields. An empty block yields no fields.
fn parse_block(yaml: &str) -> Result<StructuredFields, StructuredBlockError> {
    match serde_yaml::from_str::<Value>(yaml)? {
        Value::Null => Ok(StructuredFields::new()),
        Value::Mapping(mapping) => Ok(StructuredFields::from_mapping(mapping)),
        _ => Err(StructuredBlockError::NotMapping),
    }
}

/// If `text` starts with a `---` line, returns the text after that line.
fn strip_delimiter_line(text: &str) -> Option<&str> {
    let (line, rest) = match text.find('\n') {
        Some(end) => (&text[..end], &text[end + 1..]),
        None => (text, ""),
    };
    is_delimiter(line).then_some(rest)
}

/// Finds the next `---` line, returning the text before it and the text after it.
fn split_at_closing_delimiter(text: &str) -> Option<(&str, &str)> {
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        let next = offset + line.len();
        if is_delimiter(line.trim_end_matches('\n')) {
            return Some((&text[..offset], &text[next..]));
        }
        offset = next;
    }
    None
}

/// Whether a line (without its `\n`) is a block delimiter.
fn is_delimiter(line: &str) -> bool {
    line.trim_end() == "---"
}

/// Strips one leading line break (`\n` or `\r\n`).
fn strip_line_break(text: &str) -> Option<&str> {
    text.strip_prefix("\r\n").or_else(|| text.strip_prefix('\n'))
}
