//! TOML files as configuration layers.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use toml::{Table, Value};

use super::section::PATH_SEPARATOR;
use super::source::{ConfigEntry, ConfigSource};
use super::ConfigError;

/// A TOML file, merged at the root or mounted below a section.
///
/// A missing required file fails the build; a missing optional file
/// contributes nothing.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
    required: bool,
    mount: Vec<String>,
}

impl FileSource {
    pub fn new(path: impl AsRef<Path>, required: bool) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            required,
            mount: Vec::new(),
        }
    }

    /// Places the file's contents below the dotted `key` instead of at the
    /// root, so `port = 1` in the file becomes `key.port`.
    pub fn under(mut self, key: &str) -> Self {
        self.mount = key
            .split(PATH_SEPARATOR)
            .filter(|segment| !segment.is_empty())
            .map(str::to_string)
            .collect();
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_table(&self) -> Result<Option<Table>, ConfigError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound && !self.required => {
                log::debug!("optional config file {} not found, skipping", self.path.display());
                return Ok(None);
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(ConfigError::FileNotFound(self.path.clone()));
            }
            Err(source) => {
                return Err(ConfigError::ReadError {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        log::debug!("loading config file {}", self.path.display());
        toml::from_str(&contents)
            .map(Some)
            .map_err(|source| ConfigError::ParseError {
                path: self.path.clone(),
                source,
            })
    }
}

impl ConfigSource for FileSource {
    fn entries(&self) -> Result<Vec<ConfigEntry>, ConfigError> {
        let Some(table) = self.read_table()? else {
            return Ok(Vec::new());
        };
        let entry = if self.mount.is_empty() {
            ConfigEntry::root(table)
        } else {
            ConfigEntry::at_path(self.mount.clone(), Value::Table(table))
        };
        Ok(vec![entry])
    }
}
