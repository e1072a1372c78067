//! `.env` configuration loading

use super::keys::SettingKey;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while locating or reading the configuration file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(
        "Configuration file not found: {}\nCreate it from the provided template first: cp {} {}",
        path.display(),
        template.display(),
        path.display()
    )]
    Missing { path: PathBuf, template: PathBuf },

    #[error("Failed to read configuration file {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Ordered key/value settings read from the project's `.env` file.
///
/// Values are kept as raw strings. A key assigned twice keeps the position of
/// its first assignment and the value of its last.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Configuration {
    entries: Vec<(String, String)>,
}

impl Configuration {
    /// Parse `KEY=VALUE` lines. Lines that don't parse are skipped.
    pub fn parse(content: &str) -> Self {
        let mut configuration = Self::default();

        for (number, line) in content.lines().enumerate() {
            match parse_line(line) {
                Some((key, value)) => configuration.set(key, value),
                None => {
                    let trimmed = line.trim();
                    if !trimmed.is_empty() && !trimmed.starts_with('#') {
                        tracing::debug!(line = number + 1, "ignoring unparseable configuration line");
                    }
                }
            }
        }

        configuration
    }

    fn set(&mut self, key: &str, value: String) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key.to_string(), value)),
        }
    }

    /// Raw lookup by key name
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Lookup of a recognized setting
    pub fn setting(&self, key: SettingKey) -> Option<&str> {
        self.get(key.key())
    }

    /// Recognized settings from `keys` that have no entry
    pub fn missing(&self, keys: &[SettingKey]) -> Vec<SettingKey> {
        keys.iter()
            .copied()
            .filter(|k| self.setting(*k).is_none())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Configuration {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut configuration = Self::default();
        for (key, value) in iter {
            let key = key.into();
            configuration.set(&key, value.into());
        }
        configuration
    }
}

/// Load the configuration file at `project_dir/file_name`.
///
/// A missing file is a precondition failure; `template_name` is the file the
/// user should copy it from.
pub fn load(project_dir: &Path, file_name: &str, template_name: &str) -> Result<Configuration, ConfigError> {
    let path = project_dir.join(file_name);

    if !path.is_file() {
        return Err(ConfigError::Missing {
            path,
            template: project_dir.join(template_name),
        });
    }

    let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
        path: path.clone(),
        source,
    })?;

    let configuration = Configuration::parse(&content);
    tracing::debug!(path = %path.display(), entries = configuration.len(), "loaded configuration");

    Ok(configuration)
}

fn parse_line(line: &str) -> Option<(&str, String)> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    let line = line.strip_prefix("export ").map(str::trim_start).unwrap_or(line);
    let (key, value) = line.split_once('=')?;

    let key = key.trim_end();
    if !is_identifier(key) {
        return None;
    }

    Some((key, unquote(value.trim()).to_string()))
}

fn is_identifier(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}
