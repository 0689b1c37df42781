//! Layout engine invocation.
//!
//! The [`DotRunner`] trait is the single blocking boundary of a layout pass:
//! it receives the serialized graph and returns the engine's annotated DOT
//! output. [`ProcessRunner`] spawns Graphviz, [`StaticRunner`] replays saved
//! output, and any matching closure works as a runner in tests.

use std::{
    io::{self, Write},
    path::{Path, PathBuf},
    process::{Command, Stdio},
    thread,
};

use log::{debug, info, trace};
use thiserror::Error;

use dotweave_core::engine::LayoutEngine;

/// Failure of the layout engine.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("engine exited with {}: {stderr}", exit_status(.exit_code))]
    Exited {
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("engine produced no output")]
    NoOutput,

    #[error("failed to run engine: {0}")]
    Spawn(#[from] io::Error),
}

fn exit_status(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "a signal".to_owned(),
    }
}

/// Runs a layout engine over DOT text.
pub trait DotRunner {
    /// Lays out `input` with `engine` and returns the annotated output.
    fn run(&self, input: &str, engine: LayoutEngine) -> Result<String, EngineError>;
}

impl<F> DotRunner for F
where
    F: Fn(&str, LayoutEngine) -> Result<String, EngineError>,
{
    fn run(&self, input: &str, engine: LayoutEngine) -> Result<String, EngineError> {
        self(input, engine)
    }
}

/// Spawns the Graphviz executable for every run.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    executable: PathBuf,
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self {
            executable: PathBuf::from("dot"),
        }
    }
}

impl ProcessRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses `executable` instead of `dot` from the search path.
    pub fn with_executable(mut self, executable: impl Into<PathBuf>) -> Self {
        self.executable = executable.into();
        self
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }
}

impl DotRunner for ProcessRunner {
    fn run(&self, input: &str, engine: LayoutEngine) -> Result<String, EngineError> {
        info!(executable:? = self.executable, engine = engine.name(); "Running layout engine");

        let mut child = Command::new(&self.executable)
            .arg("-Tdot")
            .arg(engine.command_flag())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        // Feed stdin from another thread so a large output cannot block the
        // engine while we are still writing.
        let writer = child.stdin.take().map(|mut stdin| {
            let input = input.to_owned();
            thread::spawn(move || stdin.write_all(input.as_bytes()))
        });

        let output = child.wait_with_output()?;
        let written = match writer {
            Some(handle) => handle
                .join()
                .unwrap_or_else(|_| Err(io::Error::other("stdin writer panicked"))),
            None => Ok(()),
        };

        if !output.status.success() {
            return Err(EngineError::Exited {
                exit_code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            });
        }
        written?;

        if output.stdout.is_empty() {
            return Err(EngineError::NoOutput);
        }
        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!(bytes = text.len(); "Layout engine finished");
        Ok(text)
    }
}

/// Logs the input and output of the wrapped runner.
#[derive(Debug, Clone)]
pub struct LoggingRunner<R> {
    inner: R,
}

impl<R: DotRunner> LoggingRunner<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: DotRunner> DotRunner for LoggingRunner<R> {
    fn run(&self, input: &str, engine: LayoutEngine) -> Result<String, EngineError> {
        debug!(engine = engine.name(), bytes = input.len(); "Engine input");
        trace!(input; "Engine input text");
        let result = self.inner.run(input, engine);
        match &result {
            Ok(output) => {
                debug!(bytes = output.len(); "Engine output");
                trace!(output = output.as_str(); "Engine output text");
            }
            Err(err) => debug!(err:%; "Engine failed"),
        }
        result
    }
}

/// Returns previously captured engine output, ignoring the input.
#[derive(Debug, Clone)]
pub struct StaticRunner {
    output: String,
}

impl StaticRunner {
    pub fn new(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
        }
    }
}

impl DotRunner for StaticRunner {
    fn run(&self, _input: &str, engine: LayoutEngine) -> Result<String, EngineError> {
        debug!(engine = engine.name(); "Replaying saved engine output");
        if self.output.trim().is_empty() {
            return Err(EngineError::NoOutput);
        }
        Ok(self.output.clone())
    }
}
