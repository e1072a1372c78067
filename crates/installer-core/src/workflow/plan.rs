//! Installation plan preview

use super::InstallOptions;
use crate::config::{Configuration, SettingKey};
use crate::runtime::Provisioned;
use crate::templates::{MissingValuePolicy, TemplateDocument};

/// Ordered, human-readable steps shown before anything is changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallationPlan {
    pub steps: Vec<String>,
    pub warnings: Vec<String>,
}

impl InstallationPlan {
    /// Project the configuration and host state into a list of steps
    pub fn build(
        options: &InstallOptions,
        documents: &[TemplateDocument],
        configuration: &Configuration,
        runtime: Option<Provisioned>,
        runtime_version: Option<&str>,
    ) -> Self {
        let mut steps = Vec::new();
        let mut warnings = Vec::new();

        for document in documents {
            let verb = if options.project_dir.join(&document.output).exists() {
                "Overwrite"
            } else {
                "Create"
            };
            steps.push(format!(
                "{} {} ({})",
                verb,
                document.output.display(),
                document.name
            ));
        }

        if !options.skip_install {
            let tool = &options.tool;
            match runtime {
                None => steps.push(format!(
                    "Install {} with: {}",
                    tool.display_name,
                    tool.install_command()
                )),
                Some(_) => steps.push(match runtime_version {
                    Some(version) => format!("Use the installed {} ({})", tool.display_name, version),
                    None => format!("Use the installed {}", tool.display_name),
                }),
            }

            let version = configuration
                .setting(SettingKey::PythonVersion)
                .unwrap_or_default();
            steps.push(format!("Install Python {}", version));
            steps.push(format!("Pin Python {} for this project", version));
            steps.push("Synchronize the environment".to_string());

            let dependencies = &options.dependencies;
            if !dependencies.required.is_empty() {
                steps.push(format!("Add dependencies: {}", dependencies.required.join(", ")));
            }
            if !dependencies.dev.is_empty() {
                steps.push(format!(
                    "Add development dependencies: {}",
                    dependencies.dev.join(", ")
                ));
            }
            steps.push("Synchronize the environment again".to_string());
        }

        if options.missing_values != MissingValuePolicy::Empty {
            for key in configuration.missing(&SettingKey::CORE) {
                warnings.push(format!(
                    "{} ({}) is not set in {}",
                    key,
                    key.label(),
                    options.config_file
                ));
            }
        }

        Self { steps, warnings }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::options;
    use tempfile::TempDir;

    fn configuration() -> Configuration {
        SettingKey::CORE
            .iter()
            .map(|k| (k.key(), if *k == SettingKey::PythonVersion { "3.12" } else { "x" }))
            .collect()
    }

    #[tokio::test]
    async fn test_plan_lists_files_and_install_steps() {
        let dir = TempDir::new().unwrap();
        let options = options(dir.path());
        let documents = options.templates.documents().await.unwrap();

        let plan = InstallationPlan::build(&options, &documents, &configuration(), None, None);

        assert_eq!(plan.steps[0], "Create pyproject.toml (build manifest)");
        assert!(plan.steps[3].starts_with("Install uv with: curl"));
        assert!(plan.steps.contains(&"Install Python 3.12".to_string()));
        assert_eq!(plan.steps.last().unwrap(), "Synchronize the environment again");
        assert!(plan.warnings.is_empty());
    }

    #[tokio::test]
    async fn test_plan_mentions_overwrite_and_installed_runtime() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("pyproject.toml"), "").unwrap();
        let options = options(dir.path());
        let documents = options.templates.documents().await.unwrap();

        let plan = InstallationPlan::build(
            &options,
            &documents,
            &configuration(),
            Some(Provisioned::Marker),
            Some("uv 0.5.0"),
        );

        assert_eq!(plan.steps[0], "Overwrite pyproject.toml (build manifest)");
        assert_eq!(plan.steps[3], "Use the installed uv (uv 0.5.0)");
    }

    #[tokio::test]
    async fn test_plan_without_install() {
        let dir = TempDir::new().unwrap();
        let mut options = options(dir.path());
        options.skip_install = true;
        let documents = options.templates.documents().await.unwrap();

        let plan = InstallationPlan::build(&options, &documents, &Configuration::default(), None, None);

        assert_eq!(plan.steps.len(), 3);
        assert_eq!(plan.warnings.len(), SettingKey::CORE.len());
    }

    #[tokio::test]
    async fn test_plan_silent_policy_has_no_warnings() {
        let dir = TempDir::new().unwrap();
        let mut options = options(dir.path());
        options.missing_values = MissingValuePolicy::Empty;

        let plan = InstallationPlan::build(&options, &[], &Configuration::default(), None, None);
        assert!(plan.warnings.is_empty());
    }
}
