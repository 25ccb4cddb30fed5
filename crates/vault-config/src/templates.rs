//! Configuration template for `vault init`.
//!
//! The template is stored as a valid TOML file holding every default and is returned as a
//! commented-out example configuration.

/// Default configuration template (valid TOML).
const TEMPLATE: &str = include_str!("../templates/vault.toml");

/// Returns the configuration template as a commented-out example.
pub fn init_template() -> String {
    comment_template(TEMPLATE)
}

/// Converts a valid TOML template into a commented-out example config.
///
/// Lines that are already comments are preserved as-is. Non-comment, non-empty
/// lines get a "# " prefix. Empty lines are preserved.
fn comment_template(template: &str) -> String {
    let mut result = String::with_capacity(template.len() + template.lines().count() * 2);
    for line in template.lines() {
        if !line.is_empty() && !line.starts_with('#') {
            result.push_str("# ");
        }
        result.push_str(line);
        result.push('\n');
    }
    result
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::{Config, EnvOverrides, parse::parse_config};

    #[test]
    fn template_parses_as_valid_toml() {
        let result = parse_config(TEMPLATE);
        assert!(result.is_ok(), "template failed to parse: {result:?}");
    }

    #[test]
    fn template_matches_defaults() {
        let raw = parse_config(TEMPLATE).unwrap();
        let base = Path::new("/srv/notes");
        let env = EnvOverrides::default();
        let from_template = Config::from_raw(raw, base, None, &env).unwrap();
        let defaults = Config::from_raw(Default::default(), base, None, &env).unwrap();

        assert_eq!(from_template.vault, defaults.vault);
        assert_eq!(from_template.index, defaults.index);
        assert_eq!(from_template.watch, defaults.watch);
        assert_eq!(from_template.commit, defaults.commit);
        assert_eq!(from_template.search, defaults.search);
        assert_eq!(from_template.logging, defaults.logging);
    }

    #[test]
    fn commented_template_is_empty_config() {
        let raw = parse_config(&init_template()).unwrap();
        assert!(raw.vault.is_none());
        assert!(raw.search.is_none());
    }

    #[test]
    fn comment_template_preserves_existing_comments() {
        let input = "# This is a comment\nkey = \"value\"\n";
        let result = comment_template(input);
        assert_eq!(result, "# This is a comment\n# key = \"value\"\n");
    }

    #[test]
    fn comment_template_handles_section_headers() {
        let input = "[section]\n\nkey = \"value\"\n";
        let result = comment_template(input);
        assert_eq!(result, "# [section]\n\n# key = \"value\"\n");
    }
}
