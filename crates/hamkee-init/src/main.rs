//! hamkee-init - Interactive installer for Hamkee FastAPI service projects

use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};
use installer_core::install::DependencySet;
use installer_core::tui::{AddArgs, InitArgs};
use installer_core::{Configuration, MissingValuePolicy, ProductConfig, SettingKey};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Environment variable controlling diagnostic log output
const LOG_ENV: &str = "HAMKEE_LOG";

/// Hamkee FastAPI product configuration
#[derive(Clone)]
pub struct HamkeeConfig;

impl ProductConfig for HamkeeConfig {
    fn name(&self) -> &'static str {
        "hamkee-init"
    }

    fn display_name(&self) -> &'static str {
        "Hamkee FastAPI"
    }

    fn tool_name(&self) -> &'static str {
        "uv"
    }

    fn default_install_url(&self) -> &'static str {
        "https://astral.sh/uv/install.sh"
    }

    fn install_url_env(&self) -> &'static str {
        "HAMKEE_UV_INSTALL_URL"
    }

    fn tool_marker(&self) -> &'static str {
        ".local/bin/uv"
    }

    fn tool_docs_url(&self) -> &'static str {
        "https://docs.astral.sh/uv/"
    }

    fn dependencies(&self) -> DependencySet {
        DependencySet::new(
            [
                "fastapi",
                "uvicorn[standard]",
                "pydantic",
                "pydantic-settings",
                "loguru",
                "httpx",
                "result",
            ],
            ["pytest", "pytest-asyncio", "pytest-cov", "ruff", "mypy"],
        )
    }

    fn cli_description(&self) -> &'static str {
        "Interactive installer for Hamkee FastAPI service projects"
    }

    fn next_steps(&self, dir: &Path, configuration: &Configuration) -> Vec<String> {
        let mut steps = Vec::new();
        let current = std::env::current_dir().ok();

        if current.as_deref() != Some(dir) {
            steps.push(format!("cd {}", dir.display()));
        }

        let host = configuration.setting(SettingKey::ApiHost).unwrap_or("0.0.0.0");
        let port = configuration.setting(SettingKey::ApiPort).unwrap_or("8000");
        steps.push(format!(
            "uv run uvicorn main:app --app-dir app --reload --host {} --port {}",
            host, port
        ));
        steps.push("Open README.md to get started".to_string());

        steps
    }
}

#[derive(Parser, Debug)]
#[command(name = "hamkee-init")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Options for the default init command
    #[command(flatten)]
    pub init: CliInitArgs,

    /// Print diagnostic logs (same as HAMKEE_LOG=debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate project files from .env and install dependencies (default)
    Init(CliInitArgs),
    /// Add packages to an existing project
    Add(CliAddArgs),
}

#[derive(clap::Args, Debug, Default)]
pub struct CliInitArgs {
    /// Project directory containing the .env file
    #[arg(short = 'C', long = "project-dir")]
    pub project_dir: Option<PathBuf>,

    /// Local directory to use for templates instead of the built-in set (for development use)
    #[arg(long = "template-dir")]
    pub template_dir: Option<PathBuf>,

    /// How to treat settings a template references but .env does not define
    #[arg(long = "missing-values", value_enum, default_value_t = MissingValuePolicy::Warn)]
    pub missing_values: MissingValuePolicy,

    /// Stop after generating files
    #[arg(long = "skip-install")]
    pub skip_install: bool,

    /// Show the plan without changing anything
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Auto-confirm all prompts (non-interactive mode)
    #[arg(short, long)]
    pub yes: bool,
}

impl From<CliInitArgs> for InitArgs {
    fn from(args: CliInitArgs) -> Self {
        InitArgs {
            project_dir: args.project_dir,
            template_dir: args.template_dir,
            missing_values: args.missing_values,
            skip_install: args.skip_install,
            dry_run: args.dry_run,
            yes: args.yes,
        }
    }
}

#[derive(clap::Args, Debug)]
pub struct CliAddArgs {
    /// Packages to add
    #[arg(required = true)]
    pub packages: Vec<String>,

    /// Add as development dependencies
    #[arg(long)]
    pub dev: bool,

    /// Project directory containing pyproject.toml
    #[arg(short = 'C', long = "project-dir")]
    pub project_dir: Option<PathBuf>,
}

impl From<CliAddArgs> for AddArgs {
    fn from(args: CliAddArgs) -> Self {
        AddArgs {
            project_dir: args.project_dir,
            packages: args.packages,
            dev: args.dev,
        }
    }
}

/// Command definition with the product's description as the about text
fn cli(config: &HamkeeConfig) -> clap::Command {
    Args::command().about(config.cli_description())
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Ensure terminal cursor is restored on panic
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = console::Term::stderr().show_cursor();
        default_panic(info);
    }));

    // Handle Ctrl+C gracefully
    ctrlc::set_handler(move || {
        let _ = console::Term::stderr().show_cursor();
        std::process::exit(130);
    })
    .ok();

    let config = HamkeeConfig;
    let args = Args::from_arg_matches(&cli(&config).get_matches()).unwrap_or_else(|e| e.exit());
    init_tracing(args.verbose);

    let result = match args.command {
        Some(Command::Init(init_args)) => installer_core::run(&config, init_args.into()).await,
        Some(Command::Add(add_args)) => installer_core::tui::add(&config, add_args.into()).await,
        // No subcommand provided, default to init
        None => installer_core::run(&config, args.init.into()).await,
    };

    // Ensure cursor is visible on normal exit
    let _ = console::Term::stderr().show_cursor();

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
