//! Runtime manager provisioning
//!
//! Checks whether the runtime manager is present and, if not, installs it with
//! its official install script. Probing and the network step are separate
//! capabilities so the decision logic can run against fakes.

use super::process::wait_streaming;
use colored::Colorize;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command as TokioCommand;
use tokio::time::timeout;
use url::Url;

/// Configuration for the runtime manager tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolConfig {
    /// Name of the tool binary (e.g., "uv")
    pub name: &'static str,
    /// Display name for user-facing messages
    pub display_name: &'static str,
    /// URL to the install script
    pub install_script_url: String,
    /// File whose presence means the tool is installed
    pub marker_path: PathBuf,
    /// URL to the documentation
    pub docs_url: &'static str,
}

impl ToolConfig {
    /// Get the install command string
    pub fn install_command(&self) -> String {
        format!("curl -LsSf {} | sh", self.install_script_url)
    }

    /// Directory the install script puts the tool in
    pub fn bin_dir(&self) -> Option<&Path> {
        self.marker_path.parent()
    }
}

/// Errors raised while installing the runtime manager
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("Invalid install script URL: {url}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Failed to download the install script from {url}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to initialize the HTTP client")]
    Client(#[source] reqwest::Error),

    #[error("Failed to run the install script")]
    Spawn(#[source] io::Error),

    #[error(
        "Installation failed with exit code: {}\nPlease try installing manually: {command}",
        code.map(|c| c.to_string()).unwrap_or_else(|| "unknown".to_string())
    )]
    ScriptFailed { code: Option<i32>, command: String },

    #[error(
        "Installation timed out after {secs} seconds.\nPlease try again later or install manually:\n{command}"
    )]
    TimedOut { secs: u64, command: String },
}

/// How the runtime manager was found (or made) available
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provisioned {
    /// The marker path exists
    Marker,
    /// The marker is absent but an executable resolves on PATH
    OnPath,
    /// It was just installed by the install script
    Installed,
}

/// Read-only checks against the host
pub trait HostChecks {
    /// Whether `path` exists as a file
    fn marker_present(&self, path: &Path) -> bool;

    /// Whether `name` resolves to an executable on PATH
    fn on_path(&self, name: &str) -> bool;

    /// `<program> --version` output, if it runs
    fn version(&self, program: &Path) -> Option<String>;
}

/// Host checks backed by the real filesystem and PATH
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemHost;

impl HostChecks for SystemHost {
    fn marker_present(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn on_path(&self, name: &str) -> bool {
        std::process::Command::new("which")
            .arg(name)
            .output()
            .map(|output| output.status.success())
            .unwrap_or(false)
    }

    fn version(&self, program: &Path) -> Option<String> {
        std::process::Command::new(program)
            .arg("--version")
            .output()
            .ok()
            .and_then(|output| {
                if output.status.success() {
                    String::from_utf8(output.stdout)
                        .ok()
                        .map(|s| s.trim().to_string())
                } else {
                    None
                }
            })
    }
}

/// Fetches and runs a tool's install script
#[allow(async_fn_in_trait)]
pub trait ScriptInstaller {
    async fn install(&mut self, tool: &ToolConfig) -> Result<(), ProvisionError>;
}

/// Downloads the install script over HTTP and pipes it into `sh`
pub struct CurlInstaller {
    client: reqwest::Client,
    timeout: Option<Duration>,
}

impl CurlInstaller {
    /// Create an installer with a custom user agent and no timeout
    pub fn new(user_agent: &str) -> Result<Self, ProvisionError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(ProvisionError::Client)?;

        Ok(Self {
            client,
            timeout: None,
        })
    }

    /// Give up on the script after `limit`
    pub fn with_timeout(mut self, limit: Duration) -> Self {
        self.timeout = Some(limit);
        self
    }

    async fn fetch(&self, tool: &ToolConfig) -> Result<Vec<u8>, ProvisionError> {
        let url = Url::parse(&tool.install_script_url).map_err(|source| ProvisionError::InvalidUrl {
            url: tool.install_script_url.clone(),
            source,
        })?;

        let network = |source| ProvisionError::Network {
            url: tool.install_script_url.clone(),
            source,
        };

        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(network)?;
        let body = response.bytes().await.map_err(network)?;

        Ok(body.to_vec())
    }

    async fn execute(&self, tool: &ToolConfig, script: &[u8]) -> Result<(), ProvisionError> {
        let cmd = tool.install_command();
        println!();
        println!("{} {}", "Running:".dimmed(), cmd.yellow());
        println!();

        let mut child = TokioCommand::new("sh")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(ProvisionError::Spawn)?;

        // Feed the script while streaming output so neither pipe can fill up
        let stdin = child.stdin.take();
        let feed = async move {
            if let Some(mut stdin) = stdin {
                if let Err(e) = stdin.write_all(script).await {
                    tracing::debug!(error = %e, "install script stdin closed early");
                }
                // Dropping stdin closes the pipe so `sh` sees end of script
            }
        };
        let run = async {
            let ((), status) = tokio::join!(feed, wait_streaming(&mut child));
            status
        };

        let finished = match self.timeout {
            Some(limit) => timeout(limit, run).await.ok(),
            None => Some(run.await),
        };

        let status = match finished {
            Some(status) => status.map_err(ProvisionError::Spawn)?,
            None => {
                let _ = child.kill().await;
                return Err(ProvisionError::TimedOut {
                    secs: self.timeout.map(|t| t.as_secs()).unwrap_or_default(),
                    command: cmd,
                });
            }
        };

        println!();
        if status.success() {
            Ok(())
        } else {
            Err(ProvisionError::ScriptFailed {
                code: status.code(),
                command: cmd,
            })
        }
    }
}

impl ScriptInstaller for CurlInstaller {
    async fn install(&mut self, tool: &ToolConfig) -> Result<(), ProvisionError> {
        let script = self.fetch(tool).await?;
        tracing::debug!(bytes = script.len(), url = %tool.install_script_url, "downloaded install script");
        self.execute(tool, &script).await
    }
}

/// Checks for and installs the runtime manager
pub struct RuntimeProvisioner<'a, H: ?Sized> {
    tool: &'a ToolConfig,
    host: &'a H,
}

impl<'a, H: HostChecks + ?Sized> RuntimeProvisioner<'a, H> {
    pub fn new(tool: &'a ToolConfig, host: &'a H) -> Self {
        Self { tool, host }
    }

    /// Check for an existing installation without side effects.
    ///
    /// The marker path is checked first; PATH resolution is only consulted when
    /// the marker is absent, and the first match wins.
    pub fn detect(&self) -> Option<Provisioned> {
        if self.host.marker_present(&self.tool.marker_path) {
            Some(Provisioned::Marker)
        } else if self.host.on_path(self.tool.name) {
            Some(Provisioned::OnPath)
        } else {
            None
        }
    }

    /// Get the installed tool version (if available)
    pub fn version(&self) -> Option<String> {
        match self.detect()? {
            Provisioned::Marker | Provisioned::Installed => self.host.version(&self.tool.marker_path),
            Provisioned::OnPath => self.host.version(Path::new(self.tool.name)),
        }
    }

    /// Make sure the tool is installed, running the install script only when
    /// neither check finds it
    pub async fn ensure<S: ScriptInstaller>(&self, installer: &mut S) -> Result<Provisioned, ProvisionError> {
        if let Some(found) = self.detect() {
            tracing::debug!(tool = self.tool.name, ?found, "runtime manager already installed");
            return Ok(found);
        }

        installer.install(self.tool).await?;
        Ok(Provisioned::Installed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeInstaller, FakeHost};

    fn uv() -> ToolConfig {
        ToolConfig {
            name: "uv",
            display_name: "uv",
            install_script_url: "https://astral.sh/uv/install.sh".to_string(),
            marker_path: PathBuf::from("/home/dev/.local/bin/uv"),
            docs_url: "https://docs.astral.sh/uv/",
        }
    }

    #[test]
    fn test_install_command() {
        assert_eq!(
            uv().install_command(),
            "curl -LsSf https://astral.sh/uv/install.sh | sh"
        );
        assert_eq!(uv().bin_dir(), Some(Path::new("/home/dev/.local/bin")));
    }

    #[test]
    fn test_detect_prefers_marker() {
        let tool = uv();
        let host = FakeHost::new().with_marker(&tool.marker_path).with_path("uv");
        assert_eq!(RuntimeProvisioner::new(&tool, &host).detect(), Some(Provisioned::Marker));

        let host = FakeHost::new().with_path("uv");
        assert_eq!(RuntimeProvisioner::new(&tool, &host).detect(), Some(Provisioned::OnPath));

        let host = FakeHost::new();
        assert_eq!(RuntimeProvisioner::new(&tool, &host).detect(), None);
    }

    #[tokio::test]
    async fn test_ensure_installs_when_absent() {
        let tool = uv();
        let host = FakeHost::new();
        let mut installer = FakeInstaller::succeeding();

        let result = RuntimeProvisioner::new(&tool, &host).ensure(&mut installer).await.unwrap();
        assert_eq!(result, Provisioned::Installed);
        assert_eq!(installer.calls(), 1);
    }

    #[tokio::test]
    async fn test_ensure_is_idempotent_when_installed() {
        let tool = uv();
        let host = FakeHost::new().with_marker(&tool.marker_path);
        let mut installer = FakeInstaller::succeeding();
        let provisioner = RuntimeProvisioner::new(&tool, &host);

        assert_eq!(provisioner.ensure(&mut installer).await.unwrap(), Provisioned::Marker);
        assert_eq!(provisioner.ensure(&mut installer).await.unwrap(), Provisioned::Marker);
        assert_eq!(installer.calls(), 0);
    }

    #[tokio::test]
    async fn test_ensure_trusts_path_when_marker_missing() {
        let tool = uv();
        let host = FakeHost::new().with_path("uv");
        let mut installer = FakeInstaller::succeeding();

        let result = RuntimeProvisioner::new(&tool, &host).ensure(&mut installer).await.unwrap();
        assert_eq!(result, Provisioned::OnPath);
        assert_eq!(installer.calls(), 0);
    }

    #[tokio::test]
    async fn test_ensure_propagates_install_failure() {
        let tool = uv();
        let host = FakeHost::new();
        let mut installer = FakeInstaller::failing();

        let err = RuntimeProvisioner::new(&tool, &host).ensure(&mut installer).await.unwrap_err();
        assert!(matches!(err, ProvisionError::ScriptFailed { .. }));
    }

    #[tokio::test]
    async fn test_invalid_url_fails_before_network() {
        let mut tool = uv();
        tool.install_script_url = "not a url".to_string();
        let mut installer = CurlInstaller::new("test").unwrap();

        let err = installer.install(&tool).await.unwrap_err();
        assert!(matches!(err, ProvisionError::InvalidUrl { .. }));
    }

    #[test]
    fn test_curl_installer_builds_client() {
        let installer = CurlInstaller::new("hamkee-init")
            .unwrap()
            .with_timeout(Duration::from_secs(30));
        assert_eq!(installer.timeout, Some(Duration::from_secs(30)));
    }
}
