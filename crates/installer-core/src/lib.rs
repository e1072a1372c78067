//! Installer Core - Shared library for project installer CLIs
//!
//! This library turns a user-supplied `.env` configuration into a working,
//! dependency-installed project skeleton. It renders a fixed set of template
//! documents, then drives an external runtime manager (`uv`) to provision a
//! Python version and the project's dependencies.
//!
//! # Architecture
//!
//! The library is organized into layers:
//!
//! - **Layer 1: Core Operations** - Configuration loading, template rendering,
//!   runtime manager provisioning and invocation
//! - **Layer 2: Workflow Orchestration** - `ProductConfig` trait and the
//!   `Installer` state machine with injectable gates, checks and runners
//! - **Layer 3: CLI/TUI Interface** - Optional cliclack-based prompts (feature-gated)
//!
//! # Feature Flags
//!
//! - `tui` (default): Enables the cliclack-based TUI prompts module
//!
//! # Example Usage (without TUI)
//!
//! ```ignore
//! use installer_core::{confirm::AssumeYes, report::PlainReporter, runtime, workflow};
//!
//! let options = my_product.install_options(project_dir.clone());
//! let outcome = workflow::Installer::new(options, workflow::Capabilities {
//!     gate: &mut AssumeYes,
//!     host: &runtime::SystemHost,
//!     installer: &mut runtime::CurlInstaller::new("my-installer")?,
//!     manager: &mut runtime::UvManager::new(&tool, &project_dir),
//!     reporter: &mut PlainReporter,
//! })
//! .run()
//! .await;
//! std::process::exit(outcome.exit_code().into());
//! ```

pub mod config;
pub mod confirm;
pub mod install;
pub mod product;
pub mod report;
pub mod runtime;
pub mod templates;
pub mod workflow;

#[cfg(feature = "tui")]
pub mod tui;

#[cfg(test)]
mod testing;

// Re-export main types for convenience
pub use config::{Configuration, SettingKey};
pub use confirm::{ConfirmationGate, Decision, GateKind};
pub use install::{DependencySet, InstallStep};
pub use product::ProductConfig;
pub use runtime::{RuntimeManager, ToolConfig};
pub use templates::{MissingValuePolicy, TemplateSource};
pub use workflow::{Capabilities, InstallOptions, Installer, Outcome, State};

#[cfg(feature = "tui")]
pub use tui::run;
