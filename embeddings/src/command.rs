//! Bounded execution of external programs.
//!
//! Both the CLI embedding provider and the roadmap generator shell out to
//! `ollama`. `ExternalCommand` owns the program, its leading arguments and a
//! timeout, and reports every failure as `ProviderUnavailable` carrying the
//! diagnostic text.

use std::process::Stdio;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::{EmbeddingError, Result};

/// Default bound on a single external call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// An external program invocation template.
#[derive(Debug, Clone)]
pub struct ExternalCommand {
    /// Program to execute.
    program: String,

    /// Arguments placed before the per-call arguments.
    leading_args: Vec<String>,

    /// Maximum time to wait for the program to exit.
    timeout: Duration,
}

impl ExternalCommand {
    /// Create a command template for `program`.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            leading_args: Vec::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Prepend arguments to every invocation.
    pub fn with_leading_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.leading_args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Set the timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The program this template runs.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// The configured timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run the program with `args` appended, optionally feeding `stdin`, and
    /// return its stdout.
    pub async fn run(&self, args: &[&str], stdin: Option<&[u8]>) -> Result<String> {
        let mut command = Command::new(&self.program);
        command
            .args(&self.leading_args)
            .args(args)
            .stdin(if stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        debug!(program = %self.program, "Spawning external command");

        let mut child = command.spawn().map_err(|e| {
            EmbeddingError::ProviderUnavailable(format!("failed to spawn {}: {e}", self.program))
        })?;

        let pipe = child.stdin.take();
        let program = &self.program;
        let feed = async move {
            if let (Some(input), Some(mut pipe)) = (stdin, pipe) {
                match pipe.write_all(input).await {
                    Ok(()) => {}
                    // The child exited or closed stdin early; its status and
                    // stderr are more useful than the pipe error.
                    Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {
                        debug!(program = %program, "Child closed stdin early");
                    }
                    Err(e) => {
                        return Err(EmbeddingError::ProviderUnavailable(format!(
                            "failed to write stdin of {program}: {e}"
                        )));
                    }
                }
                // Closing stdin lets the child see EOF.
                drop(pipe);
            }
            Ok(())
        };
        // Feeding stdin and draining stdout run together, under one timeout.
        let exchange = async move {
            let (fed, output) = tokio::join!(feed, child.wait_with_output());
            fed?;
            output.map_err(|e| {
                EmbeddingError::ProviderUnavailable(format!("failed to wait for {program}: {e}"))
            })
        };

        let output = match tokio::time::timeout(self.timeout, exchange).await {
            Ok(result) => result?,
            Err(_) => {
                warn!(
                    program = %self.program,
                    timeout_secs = self.timeout.as_secs_f64(),
                    "External command timed out"
                );
                return Err(EmbeddingError::ProviderUnavailable(format!(
                    "{} timed out after {:?}",
                    self.program, self.timeout
                )));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(EmbeddingError::ProviderUnavailable(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
