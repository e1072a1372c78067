//! Placeholder substitution and output writing

use super::manifest::TemplateDocument;
use super::source::TemplateSource;
use super::RenderError;
use crate::config::{Configuration, SettingKey};
use clap::ValueEnum;
use std::path::{Path, PathBuf};
use tokio::fs;

/// What to do when a template references a setting the configuration lacks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum MissingValuePolicy {
    /// Substitute an empty string without reporting it
    Empty,
    /// Substitute an empty string and report a warning
    #[default]
    Warn,
    /// Fail the render
    Error,
}

/// Result of substituting one template in memory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub content: String,
    /// Declared placeholders with no configuration value (rendered empty)
    pub missing: Vec<SettingKey>,
    /// `$UPPER_CASE` tokens that are not recognized settings
    pub unrecognized: Vec<String>,
    /// Declared placeholders that never occur in the template text
    pub unused: Vec<SettingKey>,
}

/// A file written to the project directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub document: String,
    pub path: PathBuf,
    pub missing: Vec<SettingKey>,
    pub unrecognized: Vec<String>,
    pub unused: Vec<SettingKey>,
}

impl GeneratedFile {
    /// Warning lines worth showing to the user, honoring the missing-value policy
    pub fn warnings(&self, policy: MissingValuePolicy) -> Vec<String> {
        let mut warnings = Vec::new();

        if policy == MissingValuePolicy::Warn {
            for key in &self.missing {
                warnings.push(format!(
                    "{}: {} is not set in the configuration, rendered as empty",
                    self.document, key
                ));
            }
        }
        for token in &self.unrecognized {
            warnings.push(format!(
                "{}: left unrecognized placeholder {} as-is",
                self.document, token
            ));
        }
        for key in &self.unused {
            warnings.push(format!(
                "{}: declared placeholder {} does not appear in the template",
                self.document,
                key.placeholder()
            ));
        }

        warnings
    }
}

/// Substitute every declared placeholder of `document` in `template`.
///
/// The scan is a single left-to-right pass: a `$` followed by an identifier is
/// replaced only when the whole identifier is a recognized setting, and
/// substituted values are never scanned again. A recognized setting the
/// document does not declare fails the render, so no placeholder survives.
pub fn render(
    document: &TemplateDocument,
    template: &str,
    configuration: &Configuration,
    policy: MissingValuePolicy,
) -> Result<Rendered, RenderError> {
    let mut content = String::with_capacity(template.len());
    let mut missing = Vec::new();
    let mut unrecognized: Vec<String> = Vec::new();
    let mut seen = Vec::new();
    let mut rest = template;

    while let Some(pos) = rest.find('$') {
        content.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];
        let ident = &after[..identifier_len(after)];

        match SettingKey::from_key(ident) {
            Some(key) if !document.declares(key) => {
                return Err(RenderError::UndeclaredPlaceholder {
                    document: document.name.clone(),
                    key,
                });
            }
            Some(key) => {
                if !seen.contains(&key) {
                    seen.push(key);
                }
                match configuration.setting(key) {
                    Some(value) => content.push_str(value),
                    None => {
                        if policy == MissingValuePolicy::Error {
                            return Err(RenderError::MissingSetting {
                                document: document.name.clone(),
                                key,
                            });
                        }
                        if !missing.contains(&key) {
                            missing.push(key);
                        }
                    }
                }
            }
            None => {
                if looks_like_placeholder(ident) {
                    let token = format!("${ident}");
                    if !unrecognized.contains(&token) {
                        unrecognized.push(token);
                    }
                }
                content.push('$');
                content.push_str(ident);
            }
        }

        rest = &after[ident.len()..];
    }
    content.push_str(rest);

    let unused = document
        .placeholders
        .iter()
        .copied()
        .filter(|k| !seen.contains(k))
        .collect();

    Ok(Rendered {
        content,
        missing,
        unrecognized,
        unused,
    })
}

/// Fail when `template` uses a recognized setting that `document` does not declare
pub fn check_declared(document: &TemplateDocument, template: &str) -> Result<(), RenderError> {
    let mut rest = template;

    while let Some(pos) = rest.find('$') {
        let after = &rest[pos + 1..];
        let ident = &after[..identifier_len(after)];

        if let Some(key) = SettingKey::from_key(ident) {
            if !document.declares(key) {
                return Err(RenderError::UndeclaredPlaceholder {
                    document: document.name.clone(),
                    key,
                });
            }
        }
        rest = &after[ident.len()..];
    }

    Ok(())
}

/// Render one document from `source` and write it under `project_dir`.
///
/// Parent directories are created as needed and an existing file at the
/// output path is overwritten.
pub async fn render_document(
    source: &TemplateSource,
    document: &TemplateDocument,
    project_dir: &Path,
    configuration: &Configuration,
    policy: MissingValuePolicy,
) -> Result<GeneratedFile, RenderError> {
    let template = source.read(&document.source).await?;
    let rendered = render(document, &template, configuration, policy)?;

    let path = project_dir.join(&document.output);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|source| RenderError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
    }
    fs::write(&path, rendered.content.as_bytes())
        .await
        .map_err(|source| RenderError::Write {
            path: path.clone(),
            source,
        })?;

    tracing::debug!(document = %document.name, path = %path.display(), "rendered template");

    Ok(GeneratedFile {
        document: document.name.clone(),
        path,
        missing: rendered.missing,
        unrecognized: rendered.unrecognized,
        unused: rendered.unused,
    })
}

fn identifier_len(s: &str) -> usize {
    let bytes = s.as_bytes();
    match bytes.first() {
        Some(b) if b.is_ascii_alphabetic() || *b == b'_' => {}
        _ => return 0,
    }
    bytes
        .iter()
        .take_while(|b| b.is_ascii_alphanumeric() || **b == b'_')
        .count()
}

fn looks_like_placeholder(ident: &str) -> bool {
    ident.starts_with(|c: char| c.is_ascii_uppercase())
        && ident
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}
