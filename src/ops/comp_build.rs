//! Implementation of `comp build`, `comp run` and `comp clean`.

use std::path::PathBuf;

use anyhow::Result;

use crate::builder::{plan, BuildDriver, Layout, Platform, Toolchain};
use crate::util::config::Config;
use crate::util::fs::remove_dir_all_if_exists;
use crate::util::process::Runner;
use crate::util::shell::{Shell, Status};

/// Options for the build command.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Platform to build for
    pub platform: Platform,

    /// Run the built program with these arguments afterwards
    pub run: Option<Vec<String>>,

    /// Verify the compiler and archiver are on PATH before building
    pub check_tools: bool,

    /// Print the commands a fresh build would run instead of running them
    pub plan: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        BuildOptions {
            platform: Platform::host(),
            run: None,
            check_tools: true,
            plan: false,
        }
    }
}

/// Build the dependency library if needed, then the application, then
/// optionally run it.
///
/// Returns the exit status of the run, if one was requested.
pub fn build<R: Runner>(
    config: &Config,
    opts: &BuildOptions,
    runner: R,
    shell: Shell,
) -> Result<Option<i32>> {
    let toolchain = Toolchain::configured(opts.platform, &config.toolchain);
    let layout = Layout::configured(opts.platform, config);
    tracing::debug!(platform = %opts.platform, ?toolchain, "building");

    if opts.plan {
        for line in plan(&toolchain, &layout) {
            println!("{}", line);
        }
        return Ok(None);
    }

    if opts.check_tools {
        toolchain.check()?;
    }

    let driver = BuildDriver::new(toolchain, layout, runner).with_shell(shell);
    driver.build(opts.run.as_deref())
}

/// Remove the build output directories for `platform`.
///
/// Returns the directories that were removed.
pub fn clean(config: &Config, platform: Platform, shell: &Shell) -> Result<Vec<PathBuf>> {
    let layout = Layout::configured(platform, config);
    let mut removed = Vec::new();
    for dir in layout.output_dirs() {
        if remove_dir_all_if_exists(&dir)? {
            shell.status(Status::Removed, dir.display());
            removed.push(dir);
        }
    }
    Ok(removed)
}
