//! Native C/C++ compiler driver.
//!
//! Runs a [`BuildPlan`]: every source is compiled, and only if all of them
//! compiled the objects in the build directory are linked into the binary.

use std::path::PathBuf;

use anyhow::{Context, Result};
use rayon::prelude::*;

use crate::builder::artifact::OBJECT_EXT;
use crate::builder::plan::{BuildPlan, CompileStep};
use crate::util::fs::glob_files;
use crate::util::process::{ProcessBuilder, ProcessExecutor};
use crate::util::shell::{Shell, Status};

/// Outcome of compiling one source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileResult {
    pub source: PathBuf,
    pub object: PathBuf,
    pub success: bool,
    /// Diagnostics printed by the compiler (or the spawn error).
    pub stderr: Vec<u8>,
}

/// Outcome of the link step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkResult {
    pub output: PathBuf,
    pub objects: Vec<PathBuf>,
    pub success: bool,
    pub stderr: Vec<u8>,
}

/// How a build attempt ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildOutcome {
    /// Everything compiled and the binary was linked.
    Finished { binary: PathBuf },
    /// At least one source failed; the link step did not run.
    CompileFailed { failed: Vec<PathBuf> },
    /// All sources compiled but the linker failed.
    LinkFailed { binary: PathBuf },
}

impl BuildOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, BuildOutcome::Finished { .. })
    }
}

/// Native C/C++ builder.
pub struct NativeBuilder<'a> {
    shell: &'a Shell,
    executor: &'a dyn ProcessExecutor,
    jobs: usize,
}

impl<'a> NativeBuilder<'a> {
    /// Create a builder that compiles one file at a time.
    pub fn new(shell: &'a Shell, executor: &'a dyn ProcessExecutor) -> Self {
        NativeBuilder {
            shell,
            executor,
            jobs: 1,
        }
    }

    /// Compile up to `jobs` files concurrently. Zero is treated as one.
    pub fn jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    /// Compile everything, then link if every compile succeeded.
    ///
    /// Objects from failed runs are left in the build directory.
    pub fn build(&self, plan: &BuildPlan) -> Result<BuildOutcome> {
        let results = self.compile_sources(plan)?;

        let failed: Vec<PathBuf> = results
            .iter()
            .filter(|r| !r.success)
            .map(|r| r.source.clone())
            .collect();

        if !failed.is_empty() {
            self.shell.error(format!(
                "{} of {} source file(s) failed to compile, skipping link",
                failed.len(),
                results.len()
            ));
            return Ok(BuildOutcome::CompileFailed { failed });
        }

        let link = self.link_objects(plan)?;
        if link.success {
            Ok(BuildOutcome::Finished {
                binary: link.output,
            })
        } else {
            Ok(BuildOutcome::LinkFailed {
                binary: link.output,
            })
        }
    }

    /// Compile every source of the plan. A failure does not stop the loop.
    ///
    /// Results are returned in plan order regardless of `jobs`.
    pub fn compile_sources(&self, plan: &BuildPlan) -> Result<Vec<CompileResult>> {
        self.shell.status(
            Status::Building,
            format!("\"{}\" ({} file(s))", plan.profile, plan.compile_count()),
        );

        if self.jobs > 1 && plan.compile_count() > 1 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.jobs)
                .build()
                .context("failed to start compile thread pool")?;

            let results: Vec<CompileResult> = pool.install(|| {
                plan.compile
                    .par_iter()
                    .map(|step| self.compile_one(plan, step))
                    .collect()
            });

            for result in &results {
                self.report_compile(result);
            }
            return Ok(results);
        }

        let mut progress = self.shell.progress(plan.compile_count() as u64, "Compiling");
        let mut results = Vec::with_capacity(plan.compile_count());

        for step in &plan.compile {
            let result = self.compile_one(plan, step);
            progress.suspend(|| self.report_compile(&result));
            progress.inc(1);
            results.push(result);
        }

        progress.finish();
        Ok(results)
    }

    /// Link every object currently in the build directory.
    ///
    /// Stale objects from earlier builds are included; clean first to avoid
    /// them.
    pub fn link_objects(&self, plan: &BuildPlan) -> Result<LinkResult> {
        let objects = glob_files(&plan.build_dir, &format!("*.{}", OBJECT_EXT))?;
        let cmd = plan.link_command(&objects);
        let output = plan.output().to_path_buf();

        self.shell
            .status(Status::Linking, format!("\"{}\" {}", plan.profile, output.display()));
        self.shell.status(Status::Command, cmd.display_command());
        tracing::debug!("link command: {}", cmd.display_command());

        let (success, stderr) = self.run(&cmd);

        if success {
            self.shell.status(
                Status::Finished,
                format!("\"{}\" final build complete", plan.profile),
            );
            self.shell
                .output_block(Status::Info, &String::from_utf8_lossy(&stderr));
        } else {
            self.shell
                .error(format!("\"{}\" final build failed", plan.profile));
            self.shell
                .output_block(Status::Error, &String::from_utf8_lossy(&stderr));
        }

        Ok(LinkResult {
            output,
            objects,
            success,
            stderr,
        })
    }

    fn compile_one(&self, plan: &BuildPlan, step: &CompileStep) -> CompileResult {
        let cmd = plan.compile_command(step);
        tracing::debug!(
            "compiling {} -> {}",
            step.source.display(),
            step.object.display()
        );

        let (success, stderr) = self.run(&cmd);

        CompileResult {
            source: step.source.clone(),
            object: step.object.clone(),
            success,
            stderr,
        }
    }

    fn report_compile(&self, result: &CompileResult) {
        let stderr = String::from_utf8_lossy(&result.stderr);

        if result.success {
            self.shell
                .status(Status::Compiling, result.source.display());
            self.shell.output_block(Status::Info, &stderr);
        } else {
            self.shell.error(format!(
                "compilation failed for {}",
                result.source.display()
            ));
            self.shell.output_block(Status::Error, &stderr);
        }
    }

    /// Run `cmd`; a spawn failure counts as a failed run.
    fn run(&self, cmd: &ProcessBuilder) -> (bool, Vec<u8>) {
        match self.executor.exec(cmd) {
            Ok(output) => (output.success(), output.stderr),
            Err(e) => (false, format!("{:#}", e).into_bytes()),
        }
    }
}
