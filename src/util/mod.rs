//! Shared utilities

pub mod diagnostic;
pub mod fs;
pub mod hash;
pub mod process;
pub mod shell;

pub use diagnostic::Diagnostic;
pub use process::{ProcessBuilder, ProcessExecutor, SystemExecutor};
pub use shell::Shell;
