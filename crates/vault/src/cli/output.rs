//! Terminal styling for command output.

use syntect::{
    easy::HighlightLines,
    highlighting::Style,
    parsing::SyntaxSet,
    util::{LinesWithEndings, as_24_bit_terminal_escaped},
};
use two_face::{
    syntax::extra_newlines as extra_syntaxes,
    theme::{EmbeddedLazyThemeSet, EmbeddedThemeName, extra as extra_themes},
};

/// Bold text.
const BOLD: &str = "\x1b[1m";
/// Yellow text.
const YELLOW: &str = "\x1b[33m";
/// Dim text.
const DIM: &str = "\x1b[2m";
/// Reset all formatting.
const RESET: &str = "\x1b[0m";

/// Formats text as a subheader (bold).
pub fn subheader(text: &str) -> String {
    format!("{BOLD}{text}{RESET}")
}

/// Formats text as dimmed/less important.
pub fn dim(text: &str) -> String {
    format!("{DIM}{text}{RESET}")
}

/// Formats text as a warning (yellow).
pub fn warning(text: &str) -> String {
    format!("{YELLOW}{text}{RESET}")
}

/// Indents every line of `text` by three spaces.
pub fn indent(text: &str) -> String {
    text.lines()
        .map(|line| format!("   {line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Highlights TOML for terminal output.
pub fn highlight_toml(content: &str) -> String {
    let syntax_set: SyntaxSet = extra_syntaxes();
    let theme_set: EmbeddedLazyThemeSet = extra_themes();
    let syntax = syntax_set
        .find_syntax_by_extension("toml")
        .unwrap_or_else(|| syntax_set.find_syntax_plain_text());
    let mut highlighter = HighlightLines::new(syntax, theme_set.get(EmbeddedThemeName::Dracula));

    let mut output = String::new();
    for line in LinesWithEndings::from(content) {
        let ranges: Vec<(Style, &str)> = highlighter
            .highlight_line(line, &syntax_set)
            .unwrap_or_else(|_| vec![(Style::default(), line)]);
        output.push_str(&as_24_bit_terminal_escaped(&ranges[..], false));
    }
    output.push_str(RESET);
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn highlighting_keeps_text() {
        let highlighted = highlight_toml("[vault]\npath = \".\"\n");
        assert!(highlighted.contains("vault"));
        assert!(highlighted.contains("\x1b["));
    }

    #[test]
    fn indent_prefixes_each_line() {
        assert_eq!(indent("a\nb"), "   a\n   b");
    }
}
