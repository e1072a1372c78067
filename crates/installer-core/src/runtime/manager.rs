//! Runtime manager command surface

use super::process::{command_line, run_streaming, CommandError};
use super::tool::ToolConfig;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::process::Command as TokioCommand;

/// The operations the installer needs from a runtime manager.
///
/// Each call reports success or failure only; no output is parsed.
#[allow(async_fn_in_trait)]
pub trait RuntimeManager {
    /// Load the manager's own environment. Must succeed before any other call.
    async fn activate(&mut self) -> Result<(), CommandError>;

    /// Download the given interpreter version
    async fn fetch_runtime(&mut self, version: &str) -> Result<(), CommandError>;

    /// Pin the interpreter version as the project default
    async fn pin_runtime(&mut self, version: &str) -> Result<(), CommandError>;

    /// Synchronize the project environment with its manifest
    async fn sync(&mut self) -> Result<(), CommandError>;

    /// Register packages, as development-only when `dev` is set
    async fn add(&mut self, packages: &[String], dev: bool) -> Result<(), CommandError>;
}

/// `uv` driven as a subprocess inside the project directory
pub struct UvManager {
    name: &'static str,
    marker_path: PathBuf,
    bin_dir: Option<PathBuf>,
    project_dir: PathBuf,
    program: Option<PathBuf>,
}

impl UvManager {
    pub fn new(tool: &ToolConfig, project_dir: &Path) -> Self {
        Self {
            name: tool.name,
            marker_path: tool.marker_path.clone(),
            bin_dir: tool.bin_dir().map(Path::to_path_buf),
            project_dir: project_dir.to_path_buf(),
            program: None,
        }
    }

    /// Resolved executable, once activated
    pub fn program(&self) -> Option<&Path> {
        self.program.as_deref()
    }

    fn path_with_bin_dir(&self) -> Option<OsString> {
        let bin_dir = self.bin_dir.as_ref()?;
        let current = std::env::var_os("PATH").unwrap_or_default();
        let mut paths = vec![bin_dir.clone()];
        paths.extend(std::env::split_paths(&current));
        std::env::join_paths(paths).ok()
    }

    async fn run(&self, args: &[&str]) -> Result<(), CommandError> {
        let program = self.program.as_deref().ok_or_else(|| CommandError::NotFound {
            program: self.name.to_string(),
        })?;

        let command_display = command_line(Path::new(self.name), args);
        let mut command = TokioCommand::new(program);
        command.args(args).current_dir(&self.project_dir);
        if let Some(path) = self.path_with_bin_dir() {
            command.env("PATH", path);
        }

        tracing::debug!(command = %command_display, dir = %self.project_dir.display(), "running runtime manager");
        run_streaming(&mut command, &command_display).await
    }
}

impl RuntimeManager for UvManager {
    async fn activate(&mut self) -> Result<(), CommandError> {
        // A fresh install lands in the bin dir, which the current PATH may not include yet
        let program = if self.marker_path.is_file() {
            self.marker_path.clone()
        } else {
            let found = TokioCommand::new("which")
                .arg(self.name)
                .output()
                .await
                .map(|output| output.status.success())
                .unwrap_or(false);
            if !found {
                return Err(CommandError::NotFound {
                    program: self.name.to_string(),
                });
            }
            PathBuf::from(self.name)
        };

        tracing::debug!(program = %program.display(), "activated runtime manager");
        self.program = Some(program);
        Ok(())
    }

    async fn fetch_runtime(&mut self, version: &str) -> Result<(), CommandError> {
        self.run(&["python", "install", version]).await
    }

    async fn pin_runtime(&mut self, version: &str) -> Result<(), CommandError> {
        self.run(&["python", "pin", version]).await
    }

    async fn sync(&mut self) -> Result<(), CommandError> {
        self.run(&["sync"]).await
    }

    async fn add(&mut self, packages: &[String], dev: bool) -> Result<(), CommandError> {
        let mut args = vec!["add"];
        if dev {
            args.push("--dev");
        }
        args.extend(packages.iter().map(String::as_str));
        self.run(&args).await
    }
}
