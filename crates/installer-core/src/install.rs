//! Dependency installation through the runtime manager

use crate::config::{Configuration, SettingKey};
use crate::report::Reporter;
use crate::runtime::{CommandError, RuntimeManager};
use std::fmt;
use thiserror::Error;

/// Packages registered in every new project
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencySet {
    pub required: Vec<String>,
    pub dev: Vec<String>,
}

impl DependencySet {
    pub fn new<I, J>(required: I, dev: J) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
        J: IntoIterator,
        J::Item: Into<String>,
    {
        Self {
            required: required.into_iter().map(Into::into).collect(),
            dev: dev.into_iter().map(Into::into).collect(),
        }
    }
}

/// One step of the installation sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallStep {
    /// Precondition: load the runtime manager's environment
    Activate,
    FetchRuntime,
    PinRuntime,
    Sync,
    AddDependencies,
    SyncAfterAdd,
}

impl InstallStep {
    /// The steps run after activation, in order
    pub const SEQUENCE: [InstallStep; 5] = [
        InstallStep::FetchRuntime,
        InstallStep::PinRuntime,
        InstallStep::Sync,
        InstallStep::AddDependencies,
        InstallStep::SyncAfterAdd,
    ];
}

impl fmt::Display for InstallStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InstallStep::Activate => "activating the runtime manager",
            InstallStep::FetchRuntime => "installing Python",
            InstallStep::PinRuntime => "pinning the Python version",
            InstallStep::Sync => "synchronizing the environment",
            InstallStep::AddDependencies => "adding dependencies",
            InstallStep::SyncAfterAdd => "synchronizing new dependencies",
        };
        f.write_str(name)
    }
}

/// The step that stopped the sequence and why
#[derive(Debug, Error)]
#[error("Failed while {step}: {source}")]
pub struct InstallError {
    pub step: InstallStep,
    #[source]
    pub source: CommandError,
}

trait StepResult {
    fn at(self, step: InstallStep) -> Result<(), InstallError>;
}

impl StepResult for Result<(), CommandError> {
    fn at(self, step: InstallStep) -> Result<(), InstallError> {
        self.map_err(|source| InstallError { step, source })
    }
}

/// Run the full sequence: fetch and pin the configured Python version, sync,
/// register `dependencies`, sync again.
///
/// The first failing step stops the sequence; later steps never run.
pub async fn install_dependencies<M: RuntimeManager>(
    manager: &mut M,
    configuration: &Configuration,
    dependencies: &DependencySet,
    reporter: &mut dyn Reporter,
) -> Result<(), InstallError> {
    manager.activate().await.at(InstallStep::Activate)?;

    // Presence is not validated; an empty version is handed to the manager as-is
    let version = configuration
        .setting(SettingKey::PythonVersion)
        .unwrap_or_default();

    reporter.step(&format!("Installing Python {}", version));
    manager.fetch_runtime(version).await.at(InstallStep::FetchRuntime)?;

    reporter.step(&format!("Pinning Python {}", version));
    manager.pin_runtime(version).await.at(InstallStep::PinRuntime)?;

    reporter.step("Synchronizing environment");
    manager.sync().await.at(InstallStep::Sync)?;

    reporter.step("Adding dependencies");
    add(manager, dependencies).await?;

    reporter.step("Synchronizing new dependencies");
    manager.sync().await.at(InstallStep::SyncAfterAdd)?;

    Ok(())
}

/// Register extra packages in an existing project and sync.
///
/// This is the narrow flow for adding a dependency later; it does not touch
/// templates or the Python version.
pub async fn add_packages<M: RuntimeManager>(
    manager: &mut M,
    packages: &[String],
    dev: bool,
    reporter: &mut dyn Reporter,
) -> Result<(), InstallError> {
    manager.activate().await.at(InstallStep::Activate)?;

    reporter.step(&format!(
        "Adding {}{}",
        if dev { "development dependencies " } else { "" },
        packages.join(", ")
    ));
    manager.add(packages, dev).await.at(InstallStep::AddDependencies)?;

    reporter.step("Synchronizing new dependencies");
    manager.sync().await.at(InstallStep::SyncAfterAdd)?;

    Ok(())
}

async fn add<M: RuntimeManager>(manager: &mut M, dependencies: &DependencySet) -> Result<(), InstallError> {
    if !dependencies.required.is_empty() {
        manager
            .add(&dependencies.required, false)
            .await
            .at(InstallStep::AddDependencies)?;
    }
    if !dependencies.dev.is_empty() {
        manager
            .add(&dependencies.dev, true)
            .await
            .at(InstallStep::AddDependencies)?;
    }
    Ok(())
}
