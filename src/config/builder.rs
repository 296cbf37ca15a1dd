use std::path::Path;

use super::env::EnvSource;
use super::file::FileSource;
use super::resolve::resolve_references;
use super::section::ConfigSection;
use super::source::{merge_entry, ConfigSource};
use super::ConfigError;
use crate::binder::{BindReport, Binder, BinderOptions};
use crate::reflect::Reflect;
use crate::Error;

/// Builder for assembling a configuration tree from layered sources.
///
/// Sources are merged in registration order, with later sources overriding
/// earlier ones. Nested tables are merged recursively; other values
/// (including arrays) are replaced entirely.
///
/// ## Variable References
///
/// String values can reference other config values using `${path.to.field}` syntax:
///
/// ```toml
/// [server]
/// host = "localhost"
/// port = 8080
/// url = "http://${server.host}:${server.port}/api"
/// ```
///
/// Use `$$` to escape a literal `$` (e.g., `$${VAR}` becomes `${VAR}`).
///
/// ## Example
///
/// ```no_run
/// use dragon_bind::{Config, ConfigSection};
///
/// let root: ConfigSection = Config::builder()
///     .with_file("config/default.toml", true)
///     .with_env("MYAPP", "__")
///     .with_file("config/local.toml", false)
///     .build()?;
/// assert!(root.key().is_empty());
/// # Ok::<(), dragon_bind::ConfigError>(())
/// ```
#[derive(Debug, Default)]
#[must_use = "builders do nothing until .build() is called"]
pub struct Config {
    sources: Vec<Box<dyn ConfigSource>>,
    options: BinderOptions,
}

impl Config {
    /// Creates a new configuration builder.
    pub fn builder() -> Self {
        Self::default()
    }

    /// Adds a TOML file to be loaded.
    ///
    /// If `required` is `true`, the build will fail if the file doesn't exist.
    /// Optional files that are missing are silently skipped.
    pub fn with_file(self, path: impl AsRef<Path>, required: bool) -> Self {
        self.with_source(FileSource::new(path, required))
    }

    /// Adds a TOML file whose contents are placed below the dotted `key`.
    pub fn with_file_under(self, path: impl AsRef<Path>, key: &str, required: bool) -> Self {
        self.with_source(FileSource::new(path, required).under(key))
    }

    /// Loads configuration from environment variables with the given prefix.
    ///
    /// Environment variables are mapped to config paths by:
    /// 1. Removing the prefix and separator
    /// 2. Splitting remaining segments on the separator
    /// 3. Converting path segments to lowercase
    ///
    /// Values are kept as strings and converted during binding.
    pub fn with_env(self, prefix: impl Into<String>, separator: impl Into<String>) -> Self {
        self.with_source(EnvSource::new(prefix, separator))
    }

    /// Adds any other source.
    pub fn with_source(mut self, source: impl ConfigSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    /// Options used by [`bind`](Self::bind) and [`get`](Self::get).
    pub fn with_options(mut self, options: BinderOptions) -> Self {
        self.options = options;
        self
    }

    /// Loads and merges every source, then resolves references.
    pub fn build(&self) -> Result<ConfigSection, ConfigError> {
        let mut merged = toml::Table::new();

        for source in &self.sources {
            for entry in source.entries()? {
                merge_entry(&mut merged, entry);
            }
        }

        let mut root = ConfigSection::from_table(&merged);
        resolve_references(&mut root)?;
        Ok(root)
    }

    /// Builds the tree and binds it onto `instance`.
    pub fn bind<T: Reflect>(&self, instance: &mut T) -> Result<BindReport, Error> {
        let root = self.build()?;
        let report = Binder::new(self.options).bind(&root, instance)?;
        Ok(report)
    }

    /// Builds the tree and binds it onto `T::default()`.
    pub fn get<T: Reflect + Default>(&self) -> Result<T, Error> {
        let mut instance = T::default();
        self.bind(&mut instance)?;
        Ok(instance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn toml_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{contents}").unwrap();
        file
    }

    #[test]
    fn test_later_files_override() {
        let base = toml_file("[server]\nhost = \"a\"\nport = 1\n");
        let local = toml_file("[server]\nport = 2\n");

        let root = Config::builder()
            .with_file(base.path(), true)
            .with_file(local.path(), true)
            .build()
            .unwrap();

        assert_eq!(root.get("server.host").and_then(|s| s.value()), Some("a"));
        assert_eq!(root.get("server.port").and_then(|s| s.value()), Some("2"));
    }

    #[test]
    fn test_file_under_key() {
        let db = toml_file("port = 5432\n");
        let root = Config::builder()
            .with_file_under(db.path(), "services.db", true)
            .build()
            .unwrap();

        assert_eq!(
            root.get("services.db.port").and_then(|s| s.value()),
            Some("5432")
        );
    }

    #[test]
    fn test_missing_optional_file() {
        let root = Config::builder()
            .with_file("/nonexistent/config.toml", false)
            .build()
            .unwrap();
        assert!(root.is_empty());
    }

    #[test]
    fn test_references_resolved_after_merge() {
        let base = toml_file("host = \"a\"\nurl = \"http://${host}\"\n");
        let local = toml_file("host = \"b\"\n");

        let root = Config::builder()
            .with_file(base.path(), true)
            .with_file(local.path(), true)
            .build()
            .unwrap();

        assert_eq!(root.get("url").and_then(|s| s.value()), Some("http://b"));
    }
}
