//! Template manifest types and parsing

use crate::config::SettingKey;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::RenderError;

/// One entry of `templates/template.yaml`, as written on disk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentEntry {
    /// Short label used in progress messages (e.g. "build manifest")
    pub name: String,

    /// Template file name, relative to the template source
    pub source: String,

    /// Output path, relative to the project directory
    pub output: String,

    /// Placeholder tokens the template contains (e.g. `$PROJECT_NAME`)
    #[serde(default)]
    pub placeholders: Vec<String>,
}

/// Root template manifest (templates/template.yaml)
/// Lists the documents to render, in rendering order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateManifest {
    pub documents: Vec<DocumentEntry>,
}

impl TemplateManifest {
    pub fn parse(content: &str) -> Result<Self, RenderError> {
        serde_yaml::from_str(content).map_err(RenderError::Manifest)
    }

    /// Validate every entry into a [`TemplateDocument`].
    ///
    /// Placeholders outside the recognized setting set are rejected here, before
    /// any file is written.
    pub fn documents(&self) -> Result<Vec<TemplateDocument>, RenderError> {
        self.documents.iter().map(TemplateDocument::try_from).collect()
    }
}

/// A template with its validated placeholder set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateDocument {
    pub name: String,
    pub source: String,
    pub output: PathBuf,
    pub placeholders: Vec<SettingKey>,
}

impl TemplateDocument {
    /// Whether `key` is substituted in this document
    pub fn declares(&self, key: SettingKey) -> bool {
        self.placeholders.contains(&key)
    }
}

impl TryFrom<&DocumentEntry> for TemplateDocument {
    type Error = RenderError;

    fn try_from(entry: &DocumentEntry) -> Result<Self, Self::Error> {
        let mut placeholders = Vec::with_capacity(entry.placeholders.len());

        for token in &entry.placeholders {
            let key = token
                .strip_prefix('$')
                .and_then(SettingKey::from_key)
                .ok_or_else(|| RenderError::UnrecognizedPlaceholder {
                    document: entry.name.clone(),
                    token: token.clone(),
                })?;
            if !placeholders.contains(&key) {
                placeholders.push(key);
            }
        }

        Ok(Self {
            name: entry.name.clone(),
            source: entry.source.clone(),
            output: PathBuf::from(&entry.output),
            placeholders,
        })
    }
}
