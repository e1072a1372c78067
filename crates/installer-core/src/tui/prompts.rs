//! Charm-style CLI prompts using cliclack

use crate::config::Configuration;
use crate::confirm::{decide, AssumeYes, ConfirmationGate, Decision, LineGate, AFFIRMATIVE};
use crate::install;
use crate::product::ProductConfig;
use crate::report::{PlainReporter, Reporter};
use crate::runtime::{CurlInstaller, RuntimeProvisioner, SystemHost, UvManager};
use crate::templates::{MissingValuePolicy, TemplateSource};
use crate::workflow::{Capabilities, FailureKind, InstallationPlan, Installer};
use anyhow::{Context, Result};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

/// CLI arguments for the init command
#[derive(Debug, Clone, Default)]
pub struct InitArgs {
    /// Project directory containing the `.env` file (defaults to the current directory)
    pub project_dir: Option<PathBuf>,

    /// Local directory to use for templates instead of the built-in set
    pub template_dir: Option<PathBuf>,

    /// How to treat settings referenced by templates but missing from `.env`
    pub missing_values: MissingValuePolicy,

    /// Stop after generating files
    pub skip_install: bool,

    /// Show the plan without changing anything
    pub dry_run: bool,

    /// Auto-confirm all prompts (non-interactive mode)
    pub yes: bool,
}

/// CLI arguments for the add command
#[derive(Debug, Clone, Default)]
pub struct AddArgs {
    pub project_dir: Option<PathBuf>,
    pub packages: Vec<String>,
    pub dev: bool,
}

/// Gate backed by a cliclack text prompt
#[derive(Debug, Default, Clone, Copy)]
pub struct PromptGate;

impl ConfirmationGate for PromptGate {
    fn confirm(&mut self, prompt: &str) -> bool {
        let input: std::io::Result<String> = cliclack::input(prompt)
            .placeholder(&format!("{}/N", AFFIRMATIVE))
            .required(false)
            .interact();

        match input {
            Ok(answer) => decide(&answer) == Decision::Proceed,
            Err(e) => {
                tracing::debug!(error = %e, "confirmation prompt interrupted");
                false
            }
        }
    }
}

/// Reporter writing cliclack log lines
#[derive(Debug, Default, Clone, Copy)]
pub struct ClackReporter;

impl Reporter for ClackReporter {
    fn intro(&mut self, title: &str) {
        let _ = cliclack::intro(title);
    }

    fn info(&mut self, message: &str) {
        let _ = cliclack::log::info(message);
    }

    fn step(&mut self, message: &str) {
        let _ = cliclack::log::step(message);
    }

    fn success(&mut self, message: &str) {
        let _ = cliclack::log::success(message);
    }

    fn warning(&mut self, message: &str) {
        let _ = cliclack::log::warning(message);
    }

    fn error(&mut self, message: &str) {
        let _ = cliclack::log::error(message);
    }

    fn plan(&mut self, plan: &InstallationPlan) {
        let steps: Vec<String> = plan
            .steps
            .iter()
            .enumerate()
            .map(|(i, step)| format!("{}. {}", i + 1, step))
            .collect();
        let _ = cliclack::note("The following changes will be made", steps.join("\n"));
        for warning in &plan.warnings {
            self.warning(warning);
        }
    }

    fn outro(&mut self, message: &str) {
        let _ = cliclack::outro(message);
    }
}

fn reporter() -> Box<dyn Reporter> {
    if console::Term::stderr().is_term() {
        Box::new(ClackReporter)
    } else {
        Box::new(PlainReporter)
    }
}

fn gate(yes: bool) -> Box<dyn ConfirmationGate> {
    if yes {
        Box::new(AssumeYes)
    } else if std::io::stdin().is_terminal() && console::Term::stderr().is_term() {
        Box::new(PromptGate)
    } else {
        Box::new(LineGate::new(std::io::stdin().lock(), std::io::stdout()))
    }
}

fn resolve_project_dir(dir: Option<PathBuf>) -> Result<PathBuf> {
    let current_dir = std::env::current_dir().context("Failed to read the current directory")?;

    let path = match dir {
        Some(p) if p.is_absolute() => p,
        Some(p) => current_dir.join(p),
        None => current_dir,
    };

    if !path.is_dir() {
        anyhow::bail!("Project directory does not exist: {}", path.display());
    }

    Ok(path)
}

/// Run the installer with interactive prompts. Returns the process exit status.
pub async fn run<C: ProductConfig>(config: &C, args: InitArgs) -> Result<u8> {
    let mut reporter = reporter();
    reporter.intro(config.display_name());

    let project_dir = match resolve_project_dir(args.project_dir) {
        Ok(dir) => dir,
        Err(e) => {
            reporter.error(&format!("{:#}", e));
            reporter.outro("Installation aborted.");
            return Ok(FailureKind::Precondition.exit_code());
        }
    };

    let mut options = config.install_options(project_dir.clone());
    options.templates = args
        .template_dir
        .map(TemplateSource::local)
        .unwrap_or_default();
    options.missing_values = args.missing_values;
    options.skip_install = args.skip_install;
    options.dry_run = args.dry_run;

    let mut installer = match CurlInstaller::new(config.user_agent()) {
        Ok(installer) => installer,
        Err(e) => {
            reporter.error(&format!("{:#}", anyhow::Error::new(e)));
            reporter.outro("Installation aborted.");
            return Ok(FailureKind::Network.exit_code());
        }
    };
    let mut gate = gate(args.yes);
    let host = SystemHost;
    let mut manager = UvManager::new(&options.tool, &project_dir);

    let outcome = Installer::new(
        options,
        Capabilities {
            gate: gate.as_mut(),
            host: &host,
            installer: &mut installer,
            manager: &mut manager,
            reporter: reporter.as_mut(),
        },
    )
    .run()
    .await;

    match (&outcome.configuration, outcome.is_success() && !args.dry_run) {
        (Some(configuration), true) => {
            print_next_steps(config, &project_dir, configuration);
            reporter.outro("Happy coding!");
        }
        _ if outcome.is_success() => reporter.outro("Nothing was changed."),
        _ => reporter.outro("Installation aborted."),
    }

    Ok(outcome.exit_code())
}

/// Add packages to an existing project through the runtime manager
pub async fn add<C: ProductConfig>(config: &C, args: AddArgs) -> Result<u8> {
    let mut reporter = reporter();
    reporter.intro(config.display_name());

    if args.packages.is_empty() {
        anyhow::bail!("No packages given.");
    }

    let project_dir = resolve_project_dir(args.project_dir)?;
    let tool = config.tool_config();

    if RuntimeProvisioner::new(&tool, &SystemHost).detect().is_none() {
        reporter.error(&format!(
            "{} is not installed. Run `{} init` first or install it with: {}",
            tool.display_name,
            config.name(),
            tool.install_command()
        ));
        reporter.info(&format!("See {} for other ways to install it", tool.docs_url));
        reporter.outro("Nothing was changed.");
        return Ok(FailureKind::Precondition.exit_code());
    }

    let mut manager = UvManager::new(&tool, &project_dir);
    match install::add_packages(&mut manager, &args.packages, args.dev, reporter.as_mut()).await {
        Ok(()) => {
            reporter.success(&format!("Added {}", args.packages.join(", ")));
            reporter.outro("Done.");
            Ok(0)
        }
        Err(e) => {
            reporter.error(&e.to_string());
            reporter.outro("Installation aborted.");
            Ok(FailureKind::Subprocess.exit_code())
        }
    }
}

fn print_next_steps<C: ProductConfig>(config: &C, project_dir: &Path, configuration: &Configuration) {
    let steps = config.next_steps(project_dir, configuration);

    println!();
    println!("  Next steps");
    println!();

    for (i, step) in steps.iter().enumerate() {
        println!("  {}.  {}", i + 1, step);
    }
    println!();
}
