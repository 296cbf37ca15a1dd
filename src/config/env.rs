use toml::Value;

use super::source::{ConfigEntry, ConfigSource};
use super::ConfigError;

/// Environment variables under `PREFIX<sep>`, mapped to lowercase paths.
///
/// `MYAPP__DATABASE__PORT=5432` with prefix `MYAPP` and separator `__`
/// becomes the leaf `database.port = "5432"`. Values stay strings; the
/// binder converts them to whatever the target field needs.
#[derive(Debug, Clone)]
pub struct EnvSource {
    prefix: String,
    separator: String,
}

impl EnvSource {
    pub fn new(prefix: impl Into<String>, separator: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            separator: separator.into(),
        }
    }

    fn entries_from<I>(&self, vars: I) -> Vec<ConfigEntry>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        if self.separator.is_empty() {
            log::warn!("ignoring environment source '{}' with empty separator", self.prefix);
            return Vec::new();
        }

        let prefix_with_sep = format!("{}{}", self.prefix, self.separator);
        let mut entries = Vec::new();

        for (key, value) in vars {
            let Some(path_str) = key.strip_prefix(&prefix_with_sep) else {
                continue;
            };
            if path_str.is_empty() {
                continue;
            }

            let path: Vec<String> = path_str
                .split(self.separator.as_str())
                .map(str::to_lowercase)
                .collect();
            log::trace!("environment variable {key} -> {}", path.join("."));
            entries.push(ConfigEntry::at_path(path, Value::String(value)));
        }

        entries
    }
}

impl ConfigSource for EnvSource {
    fn entries(&self) -> Result<Vec<ConfigEntry>, ConfigError> {
        Ok(self.entries_from(std::env::vars()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_prefix_and_separator() {
        let source = EnvSource::new("APP", "__");
        let entries = source.entries_from(vars(&[
            ("APP__DATABASE__PORT", "5432"),
            ("OTHER__X", "1"),
            ("APP__", "ignored"),
        ]));

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].path, ["database", "port"]);
        assert_eq!(entries[0].value.as_str(), Some("5432"));
    }

    #[test]
    fn test_empty_separator_yields_nothing() {
        let source = EnvSource::new("APP", "");
        assert!(source.entries_from(vars(&[("APPX", "1")])).is_empty());
    }
}
