//! In-memory collaborators for unit tests

use crate::confirm::ConfirmationGate;
use crate::install::{DependencySet, InstallStep};
use crate::report::Reporter;
use crate::runtime::{
    CommandError, HostChecks, ProvisionError, RuntimeManager, ScriptInstaller, ToolConfig,
};
use crate::templates::{MissingValuePolicy, TemplateSource};
use crate::workflow::{InstallOptions, InstallationPlan};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

pub fn uv_tool(home: &Path) -> ToolConfig {
    ToolConfig {
        name: "uv",
        display_name: "uv",
        install_script_url: "https://astral.sh/uv/install.sh".to_string(),
        marker_path: home.join(".local/bin/uv"),
        docs_url: "https://docs.astral.sh/uv/",
    }
}

pub fn options(project_dir: &Path) -> InstallOptions {
    InstallOptions {
        project_dir: project_dir.to_path_buf(),
        config_file: ".env".to_string(),
        config_template: ".env.example".to_string(),
        templates: TemplateSource::Embedded,
        missing_values: MissingValuePolicy::Warn,
        tool: uv_tool(&project_dir.join("home")),
        dependencies: DependencySet::new(["fastapi", "uvicorn"], ["pytest"]),
        skip_install: false,
        dry_run: false,
    }
}

/// Gate answering from a fixed script; declines once the script runs out
#[derive(Debug, Default)]
pub struct ScriptedGate {
    answers: VecDeque<bool>,
    pub prompts: Vec<String>,
}

impl ScriptedGate {
    pub fn new(answers: &[bool]) -> Self {
        Self {
            answers: answers.iter().copied().collect(),
            prompts: Vec::new(),
        }
    }
}

impl ConfirmationGate for ScriptedGate {
    fn confirm(&mut self, prompt: &str) -> bool {
        self.prompts.push(prompt.to_string());
        self.answers.pop_front().unwrap_or(false)
    }
}

#[derive(Debug, Default, Clone)]
pub struct FakeHost {
    markers: Vec<PathBuf>,
    on_path: Vec<String>,
}

impl FakeHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_marker(mut self, path: &Path) -> Self {
        self.markers.push(path.to_path_buf());
        self
    }

    pub fn with_path(mut self, name: &str) -> Self {
        self.on_path.push(name.to_string());
        self
    }
}

impl HostChecks for FakeHost {
    fn marker_present(&self, path: &Path) -> bool {
        self.markers.iter().any(|m| m == path)
    }

    fn on_path(&self, name: &str) -> bool {
        self.on_path.iter().any(|n| n == name)
    }

    fn version(&self, _program: &Path) -> Option<String> {
        Some("uv 0.5.0".to_string())
    }
}

/// Counts install attempts instead of touching the network
#[derive(Debug, Default)]
pub struct FakeInstaller {
    calls: usize,
    fail: bool,
}

impl FakeInstaller {
    pub fn succeeding() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self { calls: 0, fail: true }
    }

    pub fn calls(&self) -> usize {
        self.calls
    }
}

impl ScriptInstaller for FakeInstaller {
    async fn install(&mut self, tool: &ToolConfig) -> Result<(), ProvisionError> {
        self.calls += 1;
        if self.fail {
            Err(ProvisionError::ScriptFailed {
                code: Some(1),
                command: tool.install_command(),
            })
        } else {
            Ok(())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManagerCall {
    Activate,
    FetchRuntime(String),
    PinRuntime(String),
    Sync,
    Add(Vec<String>, bool),
}

/// Records runtime manager calls and fails on request at one step
#[derive(Debug, Default)]
pub struct FakeManager {
    calls: Vec<ManagerCall>,
    steps: Vec<InstallStep>,
    fail_at: Option<InstallStep>,
    added: bool,
}

impl FakeManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_at(mut self, step: InstallStep) -> Self {
        self.fail_at = Some(step);
        self
    }

    pub fn calls(&self) -> Vec<ManagerCall> {
        self.calls.clone()
    }

    /// Steps attempted, with repeated adds collapsed into one
    pub fn steps(&self) -> Vec<InstallStep> {
        self.steps.clone()
    }

    fn record(&mut self, call: ManagerCall, step: InstallStep) -> Result<(), CommandError> {
        self.calls.push(call);
        if self.steps.last() != Some(&step) {
            self.steps.push(step);
        }
        if self.fail_at == Some(step) {
            Err(CommandError::Failed {
                command: format!("uv ({step})"),
                code: Some(1),
            })
        } else {
            Ok(())
        }
    }
}

impl RuntimeManager for FakeManager {
    async fn activate(&mut self) -> Result<(), CommandError> {
        self.record(ManagerCall::Activate, InstallStep::Activate)
    }

    async fn fetch_runtime(&mut self, version: &str) -> Result<(), CommandError> {
        self.record(
            ManagerCall::FetchRuntime(version.to_string()),
            InstallStep::FetchRuntime,
        )
    }

    async fn pin_runtime(&mut self, version: &str) -> Result<(), CommandError> {
        self.record(
            ManagerCall::PinRuntime(version.to_string()),
            InstallStep::PinRuntime,
        )
    }

    async fn sync(&mut self) -> Result<(), CommandError> {
        let step = if self.added {
            InstallStep::SyncAfterAdd
        } else {
            InstallStep::Sync
        };
        self.record(ManagerCall::Sync, step)
    }

    async fn add(&mut self, packages: &[String], dev: bool) -> Result<(), CommandError> {
        self.added = true;
        self.record(
            ManagerCall::Add(packages.to_vec(), dev),
            InstallStep::AddDependencies,
        )
    }
}

/// Collects every line the installer would show
#[derive(Debug, Default)]
pub struct RecordingReporter {
    pub lines: Vec<String>,
}

impl RecordingReporter {
    pub fn contains(&self, needle: &str) -> bool {
        self.lines.iter().any(|l| l.contains(needle))
    }
}

impl Reporter for RecordingReporter {
    fn intro(&mut self, title: &str) {
        self.lines.push(format!("intro: {title}"));
    }

    fn info(&mut self, message: &str) {
        self.lines.push(format!("info: {message}"));
    }

    fn step(&mut self, message: &str) {
        self.lines.push(format!("step: {message}"));
    }

    fn success(&mut self, message: &str) {
        self.lines.push(format!("success: {message}"));
    }

    fn warning(&mut self, message: &str) {
        self.lines.push(format!("warning: {message}"));
    }

    fn error(&mut self, message: &str) {
        self.lines.push(format!("error: {message}"));
    }

    fn plan(&mut self, plan: &InstallationPlan) {
        for step in &plan.steps {
            self.lines.push(format!("plan: {step}"));
        }
    }

    fn outro(&mut self, message: &str) {
        self.lines.push(format!("outro: {message}"));
    }
}
