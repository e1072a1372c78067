//! Running external commands with streamed output

use colored::Colorize;
use std::ffi::OsStr;
use std::io;
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command as TokioCommand};

/// A failed external command
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Failed to start `{command}`")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("`{command}` exited with code {}", code.map(|c| c.to_string()).unwrap_or_else(|| "unknown".to_string()))]
    Failed { command: String, code: Option<i32> },

    #[error("{program} was not found. Make sure it is installed and on your PATH")]
    NotFound { program: String },
}

/// Render a program and its arguments as a shell-like command line
pub fn command_line<S: AsRef<OsStr>>(program: &Path, args: &[S]) -> String {
    let mut line = program.display().to_string();
    for arg in args {
        line.push(' ');
        line.push_str(&arg.as_ref().to_string_lossy());
    }
    line
}

/// Run a command to completion, streaming its stdout and stderr
pub async fn run_streaming(command: &mut TokioCommand, display: &str) -> Result<(), CommandError> {
    println!();
    println!("{} {}", "Running:".dimmed(), display.yellow());
    println!();

    let mut child = command
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| CommandError::Spawn {
            command: display.to_string(),
            source,
        })?;

    let status = wait_streaming(&mut child)
        .await
        .map_err(|source| CommandError::Spawn {
            command: display.to_string(),
            source,
        })?;

    println!();
    check_status(status, display)
}

/// Stream a spawned child's piped output line by line, then wait for it
pub async fn wait_streaming(child: &mut Child) -> io::Result<ExitStatus> {
    let mut stdout = child.stdout.take().map(|s| BufReader::new(s).lines());
    let mut stderr = child.stderr.take().map(|s| BufReader::new(s).lines());

    let mut stdout_done = stdout.is_none();
    let mut stderr_done = stderr.is_none();

    while !(stdout_done && stderr_done) {
        tokio::select! {
            line = next_line(&mut stdout), if !stdout_done => {
                match line {
                    Ok(Some(line)) => println!("  {}", line),
                    Ok(None) => stdout_done = true,
                    Err(e) => {
                        eprintln!("{} {}", "Error reading stdout:".red(), e);
                        stdout_done = true;
                    }
                }
            }
            line = next_line(&mut stderr), if !stderr_done => {
                match line {
                    Ok(Some(line)) => eprintln!("  {}", line.yellow()),
                    Ok(None) => stderr_done = true,
                    Err(e) => {
                        eprintln!("{} {}", "Error reading stderr:".red(), e);
                        stderr_done = true;
                    }
                }
            }
        }
    }

    child.wait().await
}

async fn next_line<R>(lines: &mut Option<tokio::io::Lines<R>>) -> io::Result<Option<String>>
where
    R: tokio::io::AsyncBufRead + Unpin,
{
    match lines {
        Some(lines) => lines.next_line().await,
        None => Ok(None),
    }
}

fn check_status(status: ExitStatus, display: &str) -> Result<(), CommandError> {
    if status.success() {
        Ok(())
    } else {
        Err(CommandError::Failed {
            command: display.to_string(),
            code: status.code(),
        })
    }
}
