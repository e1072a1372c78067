//! Template loading from the embedded set or a local directory
//!
//! The default templates are compiled into the binary so the installer works
//! from any directory. A local directory with the same layout can replace them
//! for template development.

use super::manifest::{TemplateDocument, TemplateManifest};
use super::renderer::check_declared;
use super::RenderError;
use std::path::PathBuf;
use tokio::fs;

/// Name of the manifest file inside a template source
pub const MANIFEST_FILE: &str = "template.yaml";

/// Name of the example configuration inside a template source
pub const CONFIG_EXAMPLE_FILE: &str = "env.example";

const EMBEDDED: &[(&str, &str)] = &[
    (
        MANIFEST_FILE,
        include_str!("../../../../templates/template.yaml"),
    ),
    (
        CONFIG_EXAMPLE_FILE,
        include_str!("../../../../templates/env.example"),
    ),
    (
        "pyproject.toml.template",
        include_str!("../../../../templates/pyproject.toml.template"),
    ),
    (
        "docker-compose.yml.template",
        include_str!("../../../../templates/docker-compose.yml.template"),
    ),
    (
        "devcontainer.json.template",
        include_str!("../../../../templates/devcontainer.json.template"),
    ),
];

/// Template source - either the embedded set or a local directory
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TemplateSource {
    #[default]
    Embedded,
    Local(PathBuf),
}

impl TemplateSource {
    /// Create a local template source from a path
    pub fn local(path: PathBuf) -> Self {
        Self::Local(path)
    }

    /// Human-readable origin for progress messages
    pub fn describe(&self) -> String {
        match self {
            TemplateSource::Embedded => "built-in templates".to_string(),
            TemplateSource::Local(dir) => format!("local templates from {}", dir.display()),
        }
    }

    /// Read a template file as text
    pub async fn read(&self, file: &str) -> Result<String, RenderError> {
        match self {
            TemplateSource::Embedded => EMBEDDED
                .iter()
                .find(|(name, _)| *name == file)
                .map(|(_, content)| content.to_string())
                .ok_or_else(|| RenderError::EmbeddedMissing(file.to_string())),
            TemplateSource::Local(dir) => {
                let path = dir.join(file);
                fs::read_to_string(&path)
                    .await
                    .map_err(|source| RenderError::ReadTemplate { path, source })
            }
        }
    }

    /// Read and validate the manifest, returning documents in render order.
    ///
    /// Every template is read once here so a recognized setting missing from
    /// the manifest is reported before anything is written.
    pub async fn documents(&self) -> Result<Vec<TemplateDocument>, RenderError> {
        let content = self.read(MANIFEST_FILE).await?;
        let documents = TemplateManifest::parse(&content)?.documents()?;

        for document in &documents {
            let template = self.read(&document.source).await?;
            check_declared(document, &template)?;
        }

        Ok(documents)
    }

    /// Example configuration listing every recognized setting.
    ///
    /// A local source without its own example falls back to the built-in one.
    pub async fn config_example(&self) -> Result<String, RenderError> {
        match self.read(CONFIG_EXAMPLE_FILE).await {
            Ok(content) => Ok(content),
            Err(_) if *self != TemplateSource::Embedded => {
                TemplateSource::Embedded.read(CONFIG_EXAMPLE_FILE).await
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Configuration, SettingKey};
    use crate::templates::{render, MissingValuePolicy};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_embedded_documents_in_fixed_order() {
        let documents = TemplateSource::Embedded.documents().await.unwrap();

        let outputs: Vec<_> = documents
            .iter()
            .map(|d| d.output.to_string_lossy().to_string())
            .collect();
        assert_eq!(
            outputs,
            vec![
                "pyproject.toml",
                "docker-compose.yml",
                ".devcontainer/devcontainer.json"
            ]
        );
        for document in &documents {
            assert!(document.declares(SettingKey::ProjectName));
        }
    }

    #[tokio::test]
    async fn test_embedded_templates_contain_declared_placeholders() {
        let source = TemplateSource::Embedded;
        for document in source.documents().await.unwrap() {
            let content = source.read(&document.source).await.unwrap();
            for key in &document.placeholders {
                assert!(
                    content.contains(key.placeholder()),
                    "{} does not contain {}",
                    document.source,
                    key.placeholder()
                );
            }
        }
    }

    #[tokio::test]
    async fn test_embedded_templates_use_only_declared_settings() {
        let source = TemplateSource::Embedded;
        let configuration: Configuration = SettingKey::ALL
            .into_iter()
            .map(|key| (key.key(), "value"))
            .collect();

        for document in source.documents().await.unwrap() {
            let template = source.read(&document.source).await.unwrap();
            check_declared(&document, &template).unwrap();

            let rendered =
                render(&document, &template, &configuration, MissingValuePolicy::Error).unwrap();
            for key in SettingKey::ALL {
                assert!(
                    !rendered.content.contains(key.placeholder()),
                    "{} kept {}",
                    document.output.display(),
                    key.placeholder()
                );
            }
        }
    }

    #[tokio::test]
    async fn test_local_source_rejects_undeclared_setting() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(MANIFEST_FILE),
            "documents:\n  - name: readme\n    source: README.md.template\n    output: README.md\n    placeholders: [\"$PROJECT_NAME\"]\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("README.md.template"),
            "# $PROJECT_NAME\nPort: $API_PORT\n",
        )
        .unwrap();

        let err = TemplateSource::local(dir.path().to_path_buf())
            .documents()
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            RenderError::UndeclaredPlaceholder { key: SettingKey::ApiPort, .. }
        ));
    }

    #[tokio::test]
    async fn test_config_example_lists_every_setting() {
        let example = TemplateSource::Embedded.config_example().await.unwrap();
        let configuration = Configuration::parse(&example);

        assert!(configuration.missing(&SettingKey::ALL).is_empty());
    }

    #[tokio::test]
    async fn test_local_config_example_falls_back_to_embedded() {
        let dir = TempDir::new().unwrap();
        let source = TemplateSource::local(dir.path().to_path_buf());

        let example = source.config_example().await.unwrap();
        assert!(example.contains("PROJECT_NAME="));
    }

    #[tokio::test]
    async fn test_embedded_unknown_file() {
        let err = TemplateSource::Embedded.read("nope.template").await.unwrap_err();
        assert!(matches!(err, RenderError::EmbeddedMissing(_)));
    }

    #[tokio::test]
    async fn test_local_source() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(MANIFEST_FILE),
            "documents:\n  - name: readme\n    source: README.md.template\n    output: README.md\n    placeholders: [\"$PROJECT_NAME\"]\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("README.md.template"), "# $PROJECT_NAME\n").unwrap();

        let source = TemplateSource::local(dir.path().to_path_buf());
        let documents = source.documents().await.unwrap();
        assert_eq!(documents.len(), 1);
        assert_eq!(source.read("README.md.template").await.unwrap(), "# $PROJECT_NAME\n");
    }

    #[tokio::test]
    async fn test_local_source_missing_manifest() {
        let dir = TempDir::new().unwrap();
        let source = TemplateSource::local(dir.path().to_path_buf());

        assert!(matches!(
            source.documents().await.unwrap_err(),
            RenderError::ReadTemplate { .. }
        ));
    }
}
