//! Centralized shell output and progress management.
//!
//! The Shell is the one place user-facing messages go through. It is created
//! by the binary and handed by reference to every component that reports
//! anything, so nothing in the library writes to the terminal on its own.
//!
//! Two modes:
//! - `Human`: `{status:>12} {message}` lines on stderr, optional colors,
//!   progress bars (via indicatif)
//! - `Capture`: every message is recorded in memory instead of printed, which
//!   lets tests assert on the diagnostics a component emitted

use std::fmt::Display;
use std::io::{self, IsTerminal};
use std::sync::Mutex;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// Shell output mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellMode {
    /// Human-readable output with optional colors and progress bars.
    Human {
        verbosity: Verbosity,
        color: ColorChoice,
    },
    /// Record messages in memory, print nothing.
    Capture,
}

impl Default for ShellMode {
    fn default() -> Self {
        ShellMode::Human {
            verbosity: Verbosity::Normal,
            color: ColorChoice::Auto,
        }
    }
}

/// Output verbosity level (Human mode only).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// --quiet: errors only, no progress
    Quiet,
    /// Default: status messages + progress bars
    #[default]
    Normal,
    /// --verbose: command lines, per-file progress lines, no progress bars
    Verbose,
}

/// Color output mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorChoice {
    /// Detect TTY and use colors if available.
    #[default]
    Auto,
    /// Always use ANSI colors.
    Always,
    /// Never use ANSI colors.
    Never,
}

impl std::str::FromStr for ColorChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(ColorChoice::Auto),
            "always" => Ok(ColorChoice::Always),
            "never" => Ok(ColorChoice::Never),
            _ => Err(format!(
                "invalid color choice '{}'; expected 'auto', 'always', or 'never'",
                s
            )),
        }
    }
}

/// Status types for output messages.
///
/// Shell handles all formatting - callers just specify the semantic status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    // Success statuses (green)
    Finished,
    Removed,
    Created,

    // In-progress statuses (cyan)
    Compiling,
    Linking,
    Building,
    Resolving,

    // Info statuses (blue/default)
    Info,
    Command,

    // Warning statuses (yellow)
    Warning,

    // Error status (red)
    Error,
}

impl Status {
    /// Get the display text for this status.
    fn as_str(&self) -> &'static str {
        match self {
            Status::Finished => "Finished",
            Status::Removed => "Removed",
            Status::Created => "Created",
            Status::Compiling => "Compiling",
            Status::Linking => "Linking",
            Status::Building => "Building",
            Status::Resolving => "Resolving",
            Status::Info => "Info",
            Status::Command => "Running",
            Status::Warning => "Warning",
            Status::Error => "error",
        }
    }

    /// Get the ANSI color code for this status.
    fn color_code(&self) -> &'static str {
        match self {
            Status::Finished | Status::Removed | Status::Created => "\x1b[1;32m",
            Status::Compiling | Status::Linking | Status::Building | Status::Resolving => {
                "\x1b[1;36m"
            }
            Status::Info | Status::Command => "\x1b[1;34m",
            Status::Warning => "\x1b[1;33m",
            Status::Error => "\x1b[1;31m",
        }
    }

    /// Whether the message is only shown in verbose mode.
    fn is_verbose_only(&self) -> bool {
        matches!(self, Status::Command | Status::Resolving)
    }

    /// Get the width for alignment (12 characters).
    fn width(&self) -> usize {
        12
    }
}

/// A message recorded by a capturing shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedMessage {
    pub status: Status,
    pub message: String,
}

/// Central shell for all CLI output.
#[derive(Debug)]
pub struct Shell {
    mode: ShellMode,
    use_color: bool,
    captured: Mutex<Vec<CapturedMessage>>,
}

impl Shell {
    /// Create a new shell with the given mode.
    pub fn new(mode: ShellMode) -> Self {
        let use_color = match &mode {
            ShellMode::Capture => false,
            ShellMode::Human { color, .. } => match color {
                ColorChoice::Auto => io::stderr().is_terminal(),
                ColorChoice::Always => true,
                ColorChoice::Never => false,
            },
        };

        Shell {
            mode,
            use_color,
            captured: Mutex::new(Vec::new()),
        }
    }

    /// Create a shell that records instead of printing.
    pub fn capture() -> Self {
        Shell::new(ShellMode::Capture)
    }

    /// Create a shell from CLI flags. Quiet wins over verbose.
    pub fn from_flags(quiet: bool, verbose: bool, color: ColorChoice) -> Self {
        let verbosity = if quiet {
            Verbosity::Quiet
        } else if verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Normal
        };
        Shell::new(ShellMode::Human { verbosity, color })
    }

    /// Check if shell is in quiet mode.
    pub fn is_quiet(&self) -> bool {
        matches!(
            self.mode,
            ShellMode::Human {
                verbosity: Verbosity::Quiet,
                ..
            }
        )
    }

    /// Check if shell is in verbose mode.
    pub fn is_verbose(&self) -> bool {
        matches!(
            self.mode,
            ShellMode::Human {
                verbosity: Verbosity::Verbose,
                ..
            }
        )
    }

    /// Check if shell records messages instead of printing them.
    pub fn is_capture(&self) -> bool {
        matches!(self.mode, ShellMode::Capture)
    }

    /// Whether output to stderr is colored.
    pub fn supports_color(&self) -> bool {
        self.use_color
    }

    /// Print a status message.
    ///
    /// Format: `{status:>12} {message}`
    ///
    /// In quiet mode, only Error status is printed. Command and Resolving
    /// lines need verbose mode. A capturing shell records everything.
    pub fn status(&self, status: Status, msg: impl Display) {
        if self.is_capture() {
            if let Ok(mut captured) = self.captured.lock() {
                captured.push(CapturedMessage {
                    status,
                    message: msg.to_string(),
                });
            }
            return;
        }

        if self.is_quiet() && status != Status::Error {
            return;
        }

        if status.is_verbose_only() && !self.is_verbose() {
            return;
        }

        let prefix = self.format_status(status);
        eprintln!("{} {}", prefix, msg);
    }

    /// Print an info message.
    pub fn note(&self, msg: impl Display) {
        self.status(Status::Info, msg);
    }

    /// Print a warning message.
    pub fn warn(&self, msg: impl Display) {
        self.status(Status::Warning, msg);
    }

    /// Print an error message.
    pub fn error(&self, msg: impl Display) {
        self.status(Status::Error, msg);
    }

    /// Print captured child-process output below the current status line.
    pub fn output_block(&self, status: Status, output: &str) {
        let trimmed = output.trim_end();
        if trimmed.is_empty() {
            return;
        }
        self.status(status, format!("captured output:\n{}", trimmed));
    }

    /// Messages recorded so far (empty unless in capture mode).
    pub fn captured(&self) -> Vec<CapturedMessage> {
        self.captured
            .lock()
            .map(|captured| captured.clone())
            .unwrap_or_default()
    }

    /// Whether a message with `status` containing `needle` was recorded.
    pub fn contains(&self, status: Status, needle: &str) -> bool {
        self.captured()
            .iter()
            .any(|m| m.status == status && m.message.contains(needle))
    }

    /// Format a status prefix with optional color.
    fn format_status(&self, status: Status) -> String {
        let text = status.as_str();
        let width = status.width();

        if self.use_color {
            let color = status.color_code();
            format!("{}{:>width$}\x1b[0m", color, text, width = width)
        } else {
            format!("{:>width$}", text, width = width)
        }
    }

    /// Create a progress bar.
    ///
    /// In quiet, verbose or capture mode, returns a no-op progress bar.
    pub fn progress(&self, total: u64, msg: impl Display) -> Progress<'_> {
        Progress::new(self, total, msg.to_string())
    }
}

impl Default for Shell {
    fn default() -> Self {
        Shell::new(ShellMode::default())
    }
}

/// Progress bar wrapper that respects shell mode.
pub struct Progress<'a> {
    shell: &'a Shell,
    pb: Option<ProgressBar>,
    total: u64,
    current: u64,
    message: String,
}

impl<'a> Progress<'a> {
    fn new(shell: &'a Shell, total: u64, message: String) -> Self {
        let pb = if shell.is_quiet() || shell.is_verbose() || shell.is_capture() {
            None
        } else if total > 1 {
            let pb = ProgressBar::new(total);
            if let Ok(style) = ProgressStyle::default_bar()
                .template("{spinner:.green} {msg} [{bar:40.cyan/blue}] {pos}/{len}")
            {
                pb.set_style(style.progress_chars("#>-"));
            }
            pb.set_message(message.clone());
            Some(pb)
        } else {
            None
        };

        Progress {
            shell,
            pb,
            total,
            current: 0,
            message,
        }
    }

    /// Increment progress.
    pub fn inc(&mut self, delta: u64) {
        self.current += delta;

        if let Some(pb) = &self.pb {
            pb.inc(delta);
        }

        if self.shell.is_verbose() {
            eprintln!("  {} [{}/{}]", self.message, self.current, self.total);
        }
    }

    /// Print a status line without tearing the progress bar.
    pub fn suspend<F: FnOnce()>(&self, f: F) {
        match &self.pb {
            Some(pb) => pb.suspend(f),
            None => f(),
        }
    }

    /// Finish and remove the progress bar.
    pub fn finish(&self) {
        if let Some(pb) = &self.pb {
            pb.finish_and_clear();
        }
    }
}

/// Format a duration in a human-readable way.
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs_f64();
    if secs < 60.0 {
        format!("{:.2}s", secs)
    } else {
        let mins = secs / 60.0;
        format!("{:.1}m", mins)
    }
}
