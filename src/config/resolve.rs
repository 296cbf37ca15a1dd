//! Variable reference resolution for configuration values.
//!
//! Supports `${section.field}` syntax for cross-referencing values within config.
//! Use `$${...}` to escape and produce a literal `${...}`.

use super::section::ConfigSection;
use super::ConfigError;

const MAX_PASSES: usize = 100;

/// Resolves all `${path.to.field}` references in the tree.
///
/// Passes repeat until one makes no substitution, then `$$` escapes are
/// collapsed. Paths are looked up the same way binding looks them up, so keys
/// match case-insensitively and array elements are addressed by index
/// (`${hosts.0}`).
pub fn resolve_references(root: &mut ConfigSection) -> Result<(), ConfigError> {
    for _ in 0..MAX_PASSES {
        let snapshot = root.clone();
        let mut substitutions = 0;
        root.for_each_value_mut(&mut |value| {
            substitutions += resolve_string(value, &snapshot)?;
            Ok::<_, ConfigError>(())
        })?;
        if substitutions == 0 {
            return root.for_each_value_mut(&mut |value| {
                unescape(value);
                Ok(())
            });
        }
    }

    Err(ConfigError::CircularReference)
}

/// Resolves the references of one string, returning how many were replaced.
/// Escapes are kept verbatim so a later pass does not mistake them for references.
fn resolve_string(s: &mut String, root: &ConfigSection) -> Result<usize, ConfigError> {
    if !s.contains('$') {
        return Ok(0);
    }

    let mut result = String::with_capacity(s.len());
    let mut substitutions = 0;
    let mut chars = s.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '$' {
            result.push(ch);
            continue;
        }
        match chars.peek() {
            Some('$') => {
                chars.next();
                result.push_str("$$");
            }
            Some('{') => {
                chars.next();
                let path = consume_until(&mut chars, '}').ok_or(ConfigError::UnclosedReference)?;
                result.push_str(lookup_path(root, &path)?);
                substitutions += 1;
            }
            _ => result.push('$'),
        }
    }

    *s = result;
    Ok(substitutions)
}

fn unescape(s: &mut String) {
    if s.contains("$$") {
        *s = s.replace("$$", "$");
    }
}

fn consume_until(chars: &mut std::iter::Peekable<std::str::Chars>, delim: char) -> Option<String> {
    let mut result = String::new();
    for ch in chars.by_ref() {
        if ch == delim {
            return Some(result);
        }
        result.push(ch);
    }
    None
}

fn lookup_path<'a>(root: &'a ConfigSection, path: &str) -> Result<&'a str, ConfigError> {
    if path.is_empty() || path.split('.').any(str::is_empty) {
        return Err(ConfigError::InvalidReferencePath(path.to_string()));
    }

    let section = root
        .get(path)
        .ok_or_else(|| ConfigError::ReferenceNotFound(path.to_string()))?;

    section
        .value()
        .ok_or_else(|| ConfigError::NonScalarReference(path.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_section(toml_str: &str) -> ConfigSection {
        ConfigSection::from_table(&toml::from_str(toml_str).unwrap())
    }

    fn value_at<'a>(root: &'a ConfigSection, path: &str) -> &'a str {
        root.get(path).and_then(|s| s.value()).unwrap()
    }

    #[test]
    fn test_simple_reference() {
        let mut root = make_section(
            r#"
            host = "localhost"
            url = "http://${host}/api"
            "#,
        );
        resolve_references(&mut root).unwrap();
        assert_eq!(value_at(&root, "url"), "http://localhost/api");
    }

    #[test]
    fn test_nested_path() {
        let mut root = make_section(
            r#"
            [server]
            host = "example.com"
            port = 8080

            [client]
            endpoint = "https://${server.host}:${server.port}"
            "#,
        );
        resolve_references(&mut root).unwrap();
        assert_eq!(value_at(&root, "client.endpoint"), "https://example.com:8080");
    }

    #[test]
    fn test_chained_references() {
        let mut root = make_section(
            r#"
            a = "hello"
            b = "${a} world"
            c = "${b}!"
            "#,
        );
        resolve_references(&mut root).unwrap();
        assert_eq!(value_at(&root, "c"), "hello world!");
    }

    #[test]
    fn test_escape_sequence_survives_later_passes() {
        let mut root = make_section(
            r#"
            other = "x"
            value = "use $${VAR} for env vars, ${other}"
            "#,
        );
        resolve_references(&mut root).unwrap();
        assert_eq!(value_at(&root, "value"), "use ${VAR} for env vars, x");
    }

    #[test]
    fn test_array_element_reference() {
        let mut root = make_section(
            r#"
            hosts = ["alpha", "beta"]
            primary = "${hosts.1}"
            "#,
        );
        resolve_references(&mut root).unwrap();
        assert_eq!(value_at(&root, "primary"), "beta");
    }

    #[test]
    fn test_circular_reference() {
        let mut root = make_section(
            r#"
            a = "${b}"
            b = "${a}"
            "#,
        );
        let result = resolve_references(&mut root);
        assert!(matches!(result, Err(ConfigError::CircularReference)));
    }

    #[test]
    fn test_missing_reference() {
        let mut root = make_section(r#"url = "${nonexistent.path}""#);
        let result = resolve_references(&mut root);
        assert!(matches!(result, Err(ConfigError::ReferenceNotFound(_))));
    }

    #[test]
    fn test_non_scalar_reference() {
        let mut root = make_section(
            r#"
            copy = "${server}"
            [server]
            host = "h"
            "#,
        );
        let result = resolve_references(&mut root);
        assert!(matches!(result, Err(ConfigError::NonScalarReference(_))));
    }

    #[test]
    fn test_unclosed_reference() {
        let mut root = make_section(r#"url = "${host""#);
        let result = resolve_references(&mut root);
        assert!(matches!(result, Err(ConfigError::UnclosedReference)));
    }
}
