//! Shared testing utilities for hamkee-init CLI tests.

use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const ENV: &str = "\
PROJECT_NAME=billing-api
PROJECT_VERSION=0.2.0
PROJECT_DESCRIPTION=Billing service
AUTHOR_NAME=Jane Doe
AUTHOR_EMAIL=jane@example.com
PYTHON_VERSION=3.12
API_HOST=0.0.0.0
API_PORT=8000
API_PREFIX=/api/v1
ENVIRONMENT=development
";

pub const OUTPUTS: [&str; 3] = [
    "pyproject.toml",
    "docker-compose.yml",
    ".devcontainer/devcontainer.json",
];

/// Isolated project directory and `$HOME` for one CLI invocation.
#[allow(dead_code)]
pub struct TestContext {
    root: TempDir,
    project_dir: PathBuf,
}

#[allow(dead_code)]
impl TestContext {
    pub fn new() -> Self {
        let root = TempDir::new().expect("Failed to create temp directory for tests");
        let project_dir = root.path().join("project");
        fs::create_dir_all(&project_dir).expect("Failed to create project directory");
        fs::create_dir_all(root.path().join("home")).expect("Failed to create home directory");

        Self { root, project_dir }
    }

    /// Context with a complete `.env` already in place.
    pub fn with_env() -> Self {
        let ctx = Self::new();
        ctx.write_env(ENV);
        ctx
    }

    pub fn home(&self) -> PathBuf {
        self.root.path().join("home")
    }

    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    pub fn write_env(&self, content: &str) {
        fs::write(self.project_dir.join(".env"), content).expect("Failed to write .env");
    }

    /// Build a command for invoking the compiled binary inside the project directory.
    pub fn cli(&self) -> Command {
        let mut cmd =
            Command::cargo_bin("hamkee-init").expect("Failed to locate hamkee-init binary");
        cmd.current_dir(&self.project_dir)
            .env("HOME", self.home())
            .env("HAMKEE_UV_INSTALL_URL", "http://127.0.0.1:9/install.sh")
            .env_remove("HAMKEE_LOG");
        cmd
    }

    pub fn exists(&self, path: &str) -> bool {
        self.project_dir.join(path).exists()
    }

    pub fn generated_count(&self) -> usize {
        OUTPUTS
            .iter()
            .filter(|o| self.project_dir.join(o).exists())
            .count()
    }

    pub fn read(&self, output: &str) -> String {
        fs::read_to_string(self.project_dir.join(output)).expect("Failed to read generated file")
    }
}
