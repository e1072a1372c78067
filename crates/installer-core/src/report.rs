//! User-facing progress output

use crate::workflow::InstallationPlan;
use colored::Colorize;

/// Sink for human-readable progress and status lines
pub trait Reporter {
    fn intro(&mut self, title: &str);
    fn info(&mut self, message: &str);
    /// A step that is about to run
    fn step(&mut self, message: &str);
    fn success(&mut self, message: &str);
    fn warning(&mut self, message: &str);
    fn error(&mut self, message: &str);
    fn plan(&mut self, plan: &InstallationPlan);
    fn outro(&mut self, message: &str);
}

/// Plain colored lines on stdout/stderr, for non-interactive terminals
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainReporter;

impl Reporter for PlainReporter {
    fn intro(&mut self, title: &str) {
        println!("{}", title.cyan().bold());
        println!();
    }

    fn info(&mut self, message: &str) {
        println!("{}", message);
    }

    fn step(&mut self, message: &str) {
        println!("  {} {}", "->".blue(), message);
    }

    fn success(&mut self, message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    fn warning(&mut self, message: &str) {
        eprintln!("{} {}", "Warning:".yellow(), message);
    }

    fn error(&mut self, message: &str) {
        eprintln!("{} {}", "Error:".red().bold(), message);
    }

    fn plan(&mut self, plan: &InstallationPlan) {
        println!("{}", "The following changes will be made:".bold());
        for (i, step) in plan.steps.iter().enumerate() {
            println!("  {}.  {}", i + 1, step);
        }
        println!();
        for warning in &plan.warnings {
            self.warning(warning);
        }
    }

    fn outro(&mut self, message: &str) {
        println!();
        println!("{}", message.green().bold());
    }
}
