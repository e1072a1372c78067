//! Installation orchestration
//!
//! The installer is an explicit state machine. Each call to
//! [`Installer::step`] performs exactly one transition:
//!
//! ```text
//! Start -> ConfigChecked -> PlanConfirmed -> FilesGenerated
//!       -> InstallConfirmed -> RuntimeEnsured -> DependenciesInstalled -> Done
//! ```
//!
//! Any failure or declined confirmation moves to `Aborted`. Progress is not
//! persisted, so the next run starts over from `Start`.

pub mod plan;

use crate::config::{self, ConfigError, Configuration};
use crate::confirm::{ConfirmationGate, GateKind};
use crate::install::{self, DependencySet, InstallError};
use crate::report::Reporter;
use crate::runtime::{
    HostChecks, ProvisionError, Provisioned, RuntimeManager, RuntimeProvisioner, ScriptInstaller,
    ToolConfig,
};
use crate::templates::{
    render_document, GeneratedFile, MissingValuePolicy, RenderError, TemplateDocument,
    TemplateSource,
};
use std::error::Error as StdError;
use std::path::PathBuf;
use thiserror::Error;

pub use plan::InstallationPlan;

/// Everything an installer run needs besides its capabilities
#[derive(Debug, Clone)]
pub struct InstallOptions {
    /// Directory holding `.env`, where files are generated
    pub project_dir: PathBuf,
    /// Configuration file name, relative to `project_dir`
    pub config_file: String,
    /// File the user should copy the configuration from
    pub config_template: String,
    pub templates: TemplateSource,
    pub missing_values: MissingValuePolicy,
    pub tool: ToolConfig,
    pub dependencies: DependencySet,
    /// Stop after generating files
    pub skip_install: bool,
    /// Show the plan and stop before any change
    pub dry_run: bool,
}

/// Installer states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Start,
    ConfigChecked,
    PlanConfirmed,
    FilesGenerated,
    InstallConfirmed,
    RuntimeEnsured,
    DependenciesInstalled,
    Done,
    Aborted,
}

impl State {
    pub fn is_terminal(&self) -> bool {
        matches!(self, State::Done | State::Aborted)
    }
}

/// Failure categories, each with its own exit status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Precondition,
    UserDecline,
    Io,
    Network,
    Subprocess,
}

impl FailureKind {
    pub fn exit_code(&self) -> u8 {
        match self {
            FailureKind::Precondition => 2,
            FailureKind::UserDecline => 3,
            FailureKind::Io => 4,
            FailureKind::Network => 5,
            FailureKind::Subprocess => 6,
        }
    }
}

/// Why a run ended in `Aborted`
#[derive(Debug, Error)]
pub enum AbortReason {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("{}", .0.cancelled())]
    Declined(GateKind),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Provision(#[from] ProvisionError),

    #[error(transparent)]
    Install(#[from] InstallError),
}

impl AbortReason {
    pub fn kind(&self) -> FailureKind {
        match self {
            AbortReason::Config(ConfigError::Missing { .. }) => FailureKind::Precondition,
            AbortReason::Config(ConfigError::Read { .. }) => FailureKind::Io,
            AbortReason::Declined(_) => FailureKind::UserDecline,
            AbortReason::Render(
                RenderError::MissingSetting { .. }
                | RenderError::UnrecognizedPlaceholder { .. }
                | RenderError::UndeclaredPlaceholder { .. }
                | RenderError::Manifest(_),
            ) => FailureKind::Precondition,
            AbortReason::Render(_) => FailureKind::Io,
            AbortReason::Provision(
                ProvisionError::InvalidUrl { .. }
                | ProvisionError::Network { .. }
                | ProvisionError::Client(_),
            ) => FailureKind::Network,
            AbortReason::Provision(_) => FailureKind::Subprocess,
            AbortReason::Install(_) => FailureKind::Subprocess,
        }
    }

    /// The message followed by every underlying cause
    pub fn describe(&self) -> String {
        let mut message = self.to_string();
        let mut source = self.source();
        while let Some(cause) = source {
            let cause_text = cause.to_string();
            if !message.contains(&cause_text) {
                message.push_str(&format!("\n  caused by: {}", cause_text));
            }
            source = cause.source();
        }
        message
    }
}

/// Final result of a run
#[derive(Debug)]
pub struct Outcome {
    pub state: State,
    /// The loaded configuration, when the run got past the config check
    pub configuration: Option<Configuration>,
    pub generated: Vec<GeneratedFile>,
    pub runtime: Option<Provisioned>,
    pub error: Option<AbortReason>,
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        self.state == State::Done
    }

    /// Process exit status: zero on success, the failure category otherwise
    pub fn exit_code(&self) -> u8 {
        match &self.error {
            Some(reason) => reason.kind().exit_code(),
            None if self.state == State::Done => 0,
            None => 1,
        }
    }
}

/// Replaceable collaborators of an installer run
pub struct Capabilities<'a, S, M> {
    pub gate: &'a mut dyn ConfirmationGate,
    pub host: &'a dyn HostChecks,
    pub installer: &'a mut S,
    pub manager: &'a mut M,
    pub reporter: &'a mut dyn Reporter,
}

/// One installer run
pub struct Installer<'a, S, M> {
    options: InstallOptions,
    caps: Capabilities<'a, S, M>,
    state: State,
    configuration: Option<Configuration>,
    documents: Vec<TemplateDocument>,
    plan: Option<InstallationPlan>,
    generated: Vec<GeneratedFile>,
    runtime: Option<Provisioned>,
    error: Option<AbortReason>,
}

impl<'a, S: ScriptInstaller, M: RuntimeManager> Installer<'a, S, M> {
    pub fn new(options: InstallOptions, caps: Capabilities<'a, S, M>) -> Self {
        Self {
            options,
            caps,
            state: State::Start,
            configuration: None,
            documents: Vec::new(),
            plan: None,
            generated: Vec::new(),
            runtime: None,
            error: None,
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn plan(&self) -> Option<&InstallationPlan> {
        self.plan.as_ref()
    }

    pub fn generated(&self) -> &[GeneratedFile] {
        &self.generated
    }

    /// Perform one transition. Terminal states are left unchanged.
    pub async fn step(&mut self) -> State {
        let result = match self.state {
            State::Start => self.check_config().await,
            State::ConfigChecked => self.confirm_plan(),
            State::PlanConfirmed => self.generate_files().await,
            State::FilesGenerated => self.confirm_install(),
            State::InstallConfirmed => self.ensure_runtime().await,
            State::RuntimeEnsured => self.install_dependencies().await,
            State::DependenciesInstalled => Ok(State::Done),
            State::Done | State::Aborted => return self.state,
        };

        match result {
            Ok(next) => {
                tracing::debug!(from = ?self.state, to = ?next, "installer transition");
                self.state = next;
            }
            Err(reason) => {
                tracing::debug!(from = ?self.state, error = %reason, "installer aborted");
                self.state = State::Aborted;
                self.error = Some(reason);
            }
        }
        self.state
    }

    /// Run to a terminal state and report the summary line
    pub async fn run(mut self) -> Outcome {
        while !self.step().await.is_terminal() {}

        match &self.error {
            None => {
                let summary = if self.options.dry_run {
                    "Dry run complete. No changes were made.".to_string()
                } else if self.options.skip_install {
                    format!(
                        "Generated {} file(s). Dependency installation skipped.",
                        self.generated.len()
                    )
                } else {
                    format!(
                        "Generated {} file(s) and installed all dependencies.",
                        self.generated.len()
                    )
                };
                self.caps.reporter.success(&summary);
            }
            Some(AbortReason::Declined(gate)) => {
                self.caps.reporter.warning(gate.cancelled());
            }
            Some(reason) => {
                self.caps.reporter.error(&reason.describe());
                if let AbortReason::Provision(_) = reason {
                    self.caps.reporter.info(&format!(
                        "See {} for other ways to install {}",
                        self.options.tool.docs_url, self.options.tool.display_name
                    ));
                }
            }
        }

        Outcome {
            state: self.state,
            configuration: self.configuration,
            generated: self.generated,
            runtime: self.runtime,
            error: self.error,
        }
    }

    async fn check_config(&mut self) -> Result<State, AbortReason> {
        let configuration = match config::load(
            &self.options.project_dir,
            &self.options.config_file,
            &self.options.config_template,
        ) {
            Ok(configuration) => configuration,
            Err(err @ ConfigError::Missing { .. }) => {
                self.provide_config_example().await;
                return Err(err.into());
            }
            Err(err) => return Err(err.into()),
        };
        self.caps.reporter.success(&format!(
            "Loaded {} ({} settings)",
            self.options.config_file,
            configuration.len()
        ));

        self.caps
            .reporter
            .info(&format!("Using {}", self.options.templates.describe()));
        self.documents = self.options.templates.documents().await?;

        let provisioner = RuntimeProvisioner::new(&self.options.tool, self.caps.host);
        let runtime = provisioner.detect();
        let version = if runtime.is_some() && !self.options.skip_install {
            provisioner.version()
        } else {
            None
        };

        self.plan = Some(InstallationPlan::build(
            &self.options,
            &self.documents,
            &configuration,
            runtime,
            version.as_deref(),
        ));
        self.configuration = Some(configuration);

        Ok(State::ConfigChecked)
    }

    /// Put the example configuration next to the missing one so the
    /// remediation command works. A dry run only prints it.
    async fn provide_config_example(&mut self) {
        let path = self.options.project_dir.join(&self.options.config_template);
        if path.exists() {
            return;
        }

        let example = match self.options.templates.config_example().await {
            Ok(example) => example,
            Err(e) => {
                tracing::debug!(error = %e, "no example configuration available");
                return;
            }
        };

        if !self.options.dry_run {
            match tokio::fs::write(&path, &example).await {
                Ok(()) => {
                    self.caps.reporter.info(&format!(
                        "Wrote {} listing every recognized setting",
                        self.options.config_template
                    ));
                    return;
                }
                Err(e) => {
                    tracing::debug!(error = %e, path = %path.display(), "failed to write example configuration");
                }
            }
        }

        self.caps.reporter.info(&format!(
            "Example {}:\n{}",
            self.options.config_template,
            example.trim_end()
        ));
    }

    fn confirm_plan(&mut self) -> Result<State, AbortReason> {
        if let Some(plan) = &self.plan {
            self.caps.reporter.plan(plan);
        }

        if self.options.dry_run {
            return Ok(State::Done);
        }

        self.gate(GateKind::Plan)?;
        Ok(State::PlanConfirmed)
    }

    async fn generate_files(&mut self) -> Result<State, AbortReason> {
        let configuration = self.configuration()?.clone();

        for document in &self.documents {
            self.caps.reporter.step(&format!(
                "Generating {} ({})",
                document.output.display(),
                document.name
            ));

            let generated = render_document(
                &self.options.templates,
                document,
                &self.options.project_dir,
                &configuration,
                self.options.missing_values,
            )
            .await?;

            for warning in generated.warnings(self.options.missing_values) {
                self.caps.reporter.warning(&warning);
            }
            self.generated.push(generated);
        }

        self.caps
            .reporter
            .success(&format!("Generated {} file(s)", self.generated.len()));
        Ok(State::FilesGenerated)
    }

    fn confirm_install(&mut self) -> Result<State, AbortReason> {
        if self.options.skip_install {
            self.caps.reporter.info("Skipping dependency installation");
            return Ok(State::Done);
        }

        self.gate(GateKind::Install)?;
        Ok(State::InstallConfirmed)
    }

    async fn ensure_runtime(&mut self) -> Result<State, AbortReason> {
        let provisioner = RuntimeProvisioner::new(&self.options.tool, self.caps.host);
        let display_name = self.options.tool.display_name;

        if provisioner.detect().is_none() {
            self.caps.reporter.step(&format!(
                "Installing {} with: {}",
                display_name,
                self.options.tool.install_command()
            ));
        }

        let runtime = provisioner.ensure(&mut *self.caps.installer).await?;
        match runtime {
            Provisioned::Installed => {
                self.caps
                    .reporter
                    .success(&format!("{} installed successfully", display_name));
            }
            Provisioned::Marker | Provisioned::OnPath => {
                self.caps
                    .reporter
                    .success(&format!("{} is already installed", display_name));
            }
        }
        self.runtime = Some(runtime);

        Ok(State::RuntimeEnsured)
    }

    async fn install_dependencies(&mut self) -> Result<State, AbortReason> {
        let configuration = self.configuration()?.clone();

        install::install_dependencies(
            &mut *self.caps.manager,
            &configuration,
            &self.options.dependencies,
            &mut *self.caps.reporter,
        )
        .await?;

        self.caps.reporter.success("Dependencies installed");
        Ok(State::DependenciesInstalled)
    }

    fn gate(&mut self, kind: GateKind) -> Result<(), AbortReason> {
        if self.caps.gate.confirm(kind.prompt()) {
            Ok(())
        } else {
            Err(AbortReason::Declined(kind))
        }
    }

    fn configuration(&self) -> Result<&Configuration, AbortReason> {
        // Only reachable after check_config, which always sets it
        self.configuration.as_ref().ok_or_else(|| {
            AbortReason::Config(ConfigError::Missing {
                path: self.options.project_dir.join(&self.options.config_file),
                template: self.options.project_dir.join(&self.options.config_template),
            })
        })
    }
}
