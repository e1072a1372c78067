//! Interactive confirmation gates
//!
//! A gate shows a prompt and blocks on one line of input. Only the exact
//! affirmative token proceeds; anything else, including empty input, a read
//! error or end of input, is a decline. Gates never exit the process.

use std::fmt;
use std::io::{BufRead, Write};

/// The only input accepted as "yes"
pub const AFFIRMATIVE: &str = "y";

/// Outcome of one gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Proceed,
    Abort,
}

/// Compare raw input against [`AFFIRMATIVE`].
///
/// One trailing line terminator is ignored; nothing else is trimmed.
pub fn decide(input: &str) -> Decision {
    let line = input
        .strip_suffix('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .unwrap_or(input);

    if line == AFFIRMATIVE {
        Decision::Proceed
    } else {
        Decision::Abort
    }
}

/// The two checkpoints of an installer run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateKind {
    /// Before any file is generated
    Plan,
    /// Before any external installation command
    Install,
}

impl GateKind {
    pub fn prompt(&self) -> &'static str {
        match self {
            GateKind::Plan => "Proceed with these changes?",
            GateKind::Install => "Proceed with installation?",
        }
    }

    /// Message shown when the user declines
    pub fn cancelled(&self) -> &'static str {
        match self {
            GateKind::Plan => "Setup cancelled. No files were changed.",
            GateKind::Install => "Installation cancelled. Generated files were kept.",
        }
    }
}

impl fmt::Display for GateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateKind::Plan => write!(f, "setup"),
            GateKind::Install => write!(f, "installation"),
        }
    }
}

/// A blocking yes/no checkpoint
pub trait ConfirmationGate {
    /// Show `prompt` and return whether the user answered affirmatively
    fn confirm(&mut self, prompt: &str) -> bool;
}

/// Gate reading one line from any buffered reader (stdin when not a terminal)
pub struct LineGate<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> LineGate<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> ConfirmationGate for LineGate<R, W> {
    fn confirm(&mut self, prompt: &str) -> bool {
        let _ = write!(self.output, "{} [{}/N] ", prompt, AFFIRMATIVE);
        let _ = self.output.flush();

        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) => {
                tracing::debug!("end of input at confirmation prompt");
                false
            }
            Ok(_) => decide(&line) == Decision::Proceed,
            Err(e) => {
                tracing::debug!(error = %e, "failed to read confirmation input");
                false
            }
        }
    }
}

/// Auto-confirm all prompts (non-interactive mode)
#[derive(Debug, Default, Clone, Copy)]
pub struct AssumeYes;

impl ConfirmationGate for AssumeYes {
    fn confirm(&mut self, prompt: &str) -> bool {
        tracing::info!(prompt, "auto-confirmed");
        true
    }
}
