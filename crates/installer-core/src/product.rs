//! Product configuration trait for CLI binaries
//!
//! This trait defines the interface each installer binary implements to bind
//! the generic installation engine to a concrete project flavor.

use crate::config::Configuration;
use crate::install::DependencySet;
use crate::runtime::ToolConfig;
use crate::templates::{MissingValuePolicy, TemplateSource};
use crate::workflow::InstallOptions;
use std::path::{Path, PathBuf};

/// Configuration trait for different installer products
///
/// Each product implements this trait to define:
/// - Product identity (name, display name)
/// - Where the project configuration lives
/// - The runtime manager and how to install it
/// - The fixed dependency lists
/// - Post-install instructions
pub trait ProductConfig: Clone + Send + Sync + 'static {
    /// Internal product name (used for CLI command, env vars)
    fn name(&self) -> &'static str;

    /// Human-readable display name
    fn display_name(&self) -> &'static str;

    /// Configuration file, relative to the project directory
    fn config_file(&self) -> &'static str {
        ".env"
    }

    /// File users copy the configuration from
    fn config_template(&self) -> &'static str {
        ".env.example"
    }

    /// Runtime manager binary name (e.g. "uv")
    fn tool_name(&self) -> &'static str;

    /// Default URL of the runtime manager install script
    fn default_install_url(&self) -> &'static str;

    /// Environment variable name for overriding the install script URL
    fn install_url_env(&self) -> &'static str;

    /// Marker path of an installed runtime manager, relative to the home directory
    fn tool_marker(&self) -> &'static str;

    /// URL for the runtime manager documentation
    fn tool_docs_url(&self) -> &'static str;

    /// Packages registered in every new project
    fn dependencies(&self) -> DependencySet;

    /// Generate the "next steps" instructions after installation
    fn next_steps(&self, dir: &Path, configuration: &Configuration) -> Vec<String>;

    /// CLI description shown in help text
    fn cli_description(&self) -> &'static str;

    /// User agent string for HTTP requests
    fn user_agent(&self) -> &'static str {
        self.name()
    }

    /// Resolve the runtime manager configuration against the host.
    ///
    /// This is the only place the process environment is consulted.
    fn tool_config(&self) -> ToolConfig {
        let home = std::env::var_os("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        let install_script_url = std::env::var(self.install_url_env())
            .unwrap_or_else(|_| self.default_install_url().to_string());

        ToolConfig {
            name: self.tool_name(),
            display_name: self.tool_name(),
            install_script_url,
            marker_path: home.join(self.tool_marker()),
            docs_url: self.tool_docs_url(),
        }
    }

    /// Default installer options for a project directory
    fn install_options(&self, project_dir: PathBuf) -> InstallOptions {
        InstallOptions {
            project_dir,
            config_file: self.config_file().to_string(),
            config_template: self.config_template().to_string(),
            templates: TemplateSource::Embedded,
            missing_values: MissingValuePolicy::default(),
            tool: self.tool_config(),
            dependencies: self.dependencies(),
            skip_install: false,
            dry_run: false,
        }
    }
}
