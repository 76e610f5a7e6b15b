//! Orchestration of one build: dependency library, application, optional run.
//!
//! Every step runs one child process at a time and waits for it before the
//! next is issued.

use std::time::Instant;

use anyhow::{Context, Result};

use crate::builder::layout::Layout;
use crate::builder::toolchain::{path_token, Toolchain};
use crate::util::fs::ensure_dir;
use crate::util::process::{ExecError, Runner};
use crate::util::shell::{format_duration, Shell, Status};

/// Drives the toolchain over a layout.
pub struct BuildDriver<R> {
    toolchain: Toolchain,
    layout: Layout,
    runner: R,
    shell: Shell,
}

impl<R: Runner> BuildDriver<R> {
    pub fn new(toolchain: Toolchain, layout: Layout, runner: R) -> Self {
        BuildDriver {
            toolchain,
            layout,
            runner,
            shell: Shell::default(),
        }
    }

    pub fn with_shell(mut self, shell: Shell) -> Self {
        self.shell = shell;
        self
    }

    pub fn toolchain(&self) -> &Toolchain {
        &self.toolchain
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Build the dependency archive unless it already exists.
    ///
    /// Returns whether the archive was built.
    pub fn ensure_dependency_library(&self) -> Result<bool> {
        let lib = self.layout.library_path();
        if lib.exists() {
            tracing::debug!("{} already present", lib.display());
            self.shell.status(Status::Fresh, lib.display());
            return Ok(false);
        }

        let start = Instant::now();
        ensure_dir(&self.layout.dep_lib_dir)?;

        let mut archive = self.toolchain.archive_command(&lib);
        for unit in &self.layout.units {
            let input = self.layout.unit_input(unit);
            self.shell.status(Status::Compiling, input.source.display());
            archive.arg(path_token(&input.output));

            let cmd = self.toolchain.unit_command(&input);
            self.runner
                .execute_or_die(&cmd)
                .with_context(|| format!("failed to compile dependency unit `{}`", unit))?;
        }

        self.runner
            .execute_or_die(&archive)
            .with_context(|| format!("failed to archive {}", lib.display()))?;
        self.shell.status(
            Status::Archived,
            format!(
                "{} ({} units) in {}",
                lib.display(),
                self.layout.units.len(),
                format_duration(start.elapsed())
            ),
        );
        Ok(true)
    }

    /// Compile and link the application.
    pub fn build_target(&self) -> Result<()> {
        let start = Instant::now();
        let input = self.layout.link_input();
        if let Some(parent) = input.output.parent() {
            if !parent.as_os_str().is_empty() {
                ensure_dir(parent)?;
            }
        }

        self.shell.status(Status::Compiling, input.entry.display());
        let cmd = self.toolchain.link_command(&input);
        self.runner
            .execute_or_die(&cmd)
            .with_context(|| format!("failed to build {}", input.output.display()))?;

        self.shell.status(
            Status::Finished,
            format!(
                "{} in {}",
                input.output.display(),
                format_duration(start.elapsed())
            ),
        );
        Ok(())
    }

    /// Launch the built program with `args` if a run was requested.
    ///
    /// The program's exit status is reported, never treated as a build
    /// failure. A program killed by a signal is reported the same way.
    pub fn maybe_run(&self, run: Option<&[String]>) -> Result<Option<i32>> {
        let Some(args) = run else {
            return Ok(None);
        };

        let cmd = self.toolchain.run_command(&self.layout.output, args);
        self.shell.status(Status::Running, &cmd);
        match self.runner.execute(&cmd) {
            Ok(0) => Ok(Some(0)),
            Ok(code) => {
                self.shell
                    .warn(format!("{} exited with status {}", self.layout.output.display(), code));
                Ok(Some(code))
            }
            Err(ExecError::Signaled { program, signal }) => {
                self.shell
                    .warn(format!("`{}` was terminated by signal {}", program, signal));
                Ok(Some(128 + signal))
            }
            Err(e) => Err(e).context("failed to run the built program"),
        }
    }

    /// Run the whole pipeline: dependency library, application, optional run.
    pub fn build(&self, run: Option<&[String]>) -> Result<Option<i32>> {
        self.ensure_dependency_library()?;
        self.build_target()?;
        self.maybe_run(run)
    }
}

/// Commands the driver would run for a fresh build, without running them.
pub fn plan(toolchain: &Toolchain, layout: &Layout) -> Vec<String> {
    let lib = layout.library_path();
    let mut archive = toolchain.archive_command(&lib);
    let mut lines = Vec::new();
    for unit in &layout.units {
        let input = layout.unit_input(unit);
        archive.arg(path_token(&input.output));
        lines.push(toolchain.unit_command(&input).to_string());
    }
    lines.push(archive.to_string());
    lines.push(toolchain.link_command(&layout.link_input()).to_string());
    lines
}
