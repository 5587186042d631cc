//! Test utilities and mocks for Quay unit tests.
//!
//! Provides a scripted [`ProcessExecutor`] so the builder can be exercised
//! without a real compiler, plus on-disk project fixtures.
//!
//! # Example
//!
//! ```rust,ignore
//! use quay::test_support::{MockExecutor, MockProcessOutput, ProjectFixture};
//!
//! #[test]
//! fn test_example() {
//!     let fixture = ProjectFixture::hello();
//!
//!     let mut exec = MockExecutor::compiler();
//!     exec.expect_contains("broken.c", MockProcessOutput::failure(1, "error"));
//!
//!     // Hand `&exec` to a NativeBuilder...
//! }
//! ```

pub mod fixtures;

use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{bail, Result};

use crate::util::process::{ProcessBuilder, ProcessExecutor, ProcessOutput};

pub use fixtures::*;

/// Mock process output for testing command execution.
#[derive(Debug, Clone)]
pub struct MockProcessOutput {
    /// Exit status code (0 = success).
    pub status: i32,
    pub stdout: String,
    pub stderr: String,
}

impl MockProcessOutput {
    /// Create a successful output with the given stdout.
    pub fn success(stdout: impl Into<String>) -> Self {
        MockProcessOutput {
            status: 0,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// Create a failure output with the given stderr and status code.
    pub fn failure(status: i32, stderr: impl Into<String>) -> Self {
        MockProcessOutput {
            status,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    /// Create an output with both stdout and stderr.
    pub fn with_output(status: i32, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        MockProcessOutput {
            status,
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }

    fn to_process_output(&self) -> ProcessOutput {
        ProcessOutput {
            code: Some(self.status),
            stdout: self.stdout.clone().into_bytes(),
            stderr: self.stderr.clone().into_bytes(),
        }
    }
}

impl Default for MockProcessOutput {
    fn default() -> Self {
        MockProcessOutput::success("")
    }
}

/// Pattern for matching commands in MockExecutor.
#[derive(Debug, Clone)]
pub enum CommandPattern {
    /// Match if command starts with prefix.
    StartsWith(String),
    /// Match if command contains substring.
    Contains(String),
}

impl CommandPattern {
    pub fn matches(&self, cmd: &str) -> bool {
        match self {
            CommandPattern::StartsWith(s) => cmd.starts_with(s),
            CommandPattern::Contains(s) => cmd.contains(s),
        }
    }
}

#[derive(Debug, Clone)]
enum Reply {
    Output(MockProcessOutput),
    SpawnError,
}

/// Mock process executor.
///
/// Matches each command line against the expectations in the order they
/// were added; the first match wins. Unmatched commands get the default
/// output, or fail to spawn when there is none. Every call is recorded.
#[derive(Debug, Default)]
pub struct MockExecutor {
    expectations: Vec<(CommandPattern, Reply)>,
    default_output: Option<MockProcessOutput>,
    create_outputs: bool,
    calls: Mutex<Vec<String>>,
}

impl MockExecutor {
    /// Create a new mock executor with no expectations.
    pub fn new() -> Self {
        MockExecutor::default()
    }

    /// A well-behaved compiler: every command succeeds and the file named
    /// by `-o` is created, so later globs and existence checks see it.
    pub fn compiler() -> Self {
        let mut exec = MockExecutor::new();
        exec.set_default(MockProcessOutput::success(""));
        exec.create_outputs = true;
        exec
    }

    /// Add an expectation for a command starting with a prefix.
    pub fn expect_prefix(&mut self, prefix: &str, output: MockProcessOutput) -> &mut Self {
        self.expectations.push((
            CommandPattern::StartsWith(prefix.to_string()),
            Reply::Output(output),
        ));
        self
    }

    /// Add an expectation for a command containing a substring.
    pub fn expect_contains(&mut self, substring: &str, output: MockProcessOutput) -> &mut Self {
        self.expectations.push((
            CommandPattern::Contains(substring.to_string()),
            Reply::Output(output),
        ));
        self
    }

    /// Commands containing `substring` fail as if the program did not exist.
    pub fn fail_spawn_containing(&mut self, substring: &str) -> &mut Self {
        self.expectations.push((
            CommandPattern::Contains(substring.to_string()),
            Reply::SpawnError,
        ));
        self
    }

    /// Set a default output for commands that don't match any expectation.
    pub fn set_default(&mut self, output: MockProcessOutput) -> &mut Self {
        self.default_output = Some(output);
        self
    }

    /// All command lines executed so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    fn reply_for(&self, line: &str) -> Option<Reply> {
        self.expectations
            .iter()
            .find(|(pattern, _)| pattern.matches(line))
            .map(|(_, reply)| reply.clone())
            .or_else(|| self.default_output.clone().map(Reply::Output))
    }

    fn touch_output(cmd: &ProcessBuilder) {
        let args = cmd.get_args();
        let Some(pos) = args.iter().position(|a| a == "-o") else {
            return;
        };
        let Some(output) = args.get(pos + 1) else {
            return;
        };
        let output = PathBuf::from(output);
        if let Some(parent) = output.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        let _ = std::fs::write(&output, b"");
    }
}

impl ProcessExecutor for MockExecutor {
    fn exec(&self, cmd: &ProcessBuilder) -> Result<ProcessOutput> {
        let line = cmd.display_command();
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(line.clone());
        }

        match self.reply_for(&line) {
            Some(Reply::Output(output)) => {
                if self.create_outputs && output.status == 0 {
                    Self::touch_output(cmd);
                }
                Ok(output.to_process_output())
            }
            Some(Reply::SpawnError) => {
                bail!("failed to spawn `{}`", cmd.get_program().display())
            }
            None => bail!("unexpected command: {}", line),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_matching_expectation_wins() {
        let mut exec = MockExecutor::new();
        exec.expect_contains("main.c", MockProcessOutput::failure(1, "first"));
        exec.expect_prefix("cc", MockProcessOutput::success("second"));

        let out = exec
            .exec(&ProcessBuilder::new("cc").args(["-c", "main.c"]))
            .unwrap();
        assert_eq!(out.code, Some(1));
        assert_eq!(out.stderr, b"first");

        let out = exec.exec(&ProcessBuilder::new("cc").arg("util.c")).unwrap();
        assert!(out.success());
        assert_eq!(exec.calls(), vec!["cc -c main.c", "cc util.c"]);
    }

    #[test]
    fn test_unexpected_command_fails() {
        let exec = MockExecutor::new();
        assert!(exec.exec(&ProcessBuilder::new("ld")).is_err());
    }

    #[test]
    fn test_compiler_creates_output_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let object = tmp.path().join("obj/main-00000000.o");
        let exec = MockExecutor::compiler();

        exec.exec(&ProcessBuilder::new("cc").arg("-c").arg("-o").arg(&object).arg("main.c"))
            .unwrap();
        assert!(object.exists());
    }
}
