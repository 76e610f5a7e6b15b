//! Command implementations

pub mod build;
pub mod clean;
pub mod run;

use std::path::Path;

use anyhow::{Context as _, Result};
use comp::builder::Platform;
use comp::util::config::{self, global_config_path, project_config_path, Config};
use comp::util::shell::{ColorChoice, Shell, Verbosity};

use crate::cli::Cli;

/// State shared by every command.
pub struct Context {
    pub config: Config,
    pub platform: Platform,
    pub shell: Shell,
}

impl Context {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let verbosity = if cli.quiet {
            Verbosity::Quiet
        } else if cli.verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Normal
        };
        let color = if cli.no_color {
            ColorChoice::Never
        } else {
            ColorChoice::Auto
        };

        Ok(Context {
            config: load(cli.config.as_deref())?,
            platform: cli.target.unwrap_or_else(Platform::host),
            shell: Shell::new(verbosity, color),
        })
    }

    /// Default configuration, host platform, normal output.
    pub fn with_defaults() -> Result<Self> {
        Ok(Context {
            config: load(None)?,
            platform: Platform::host(),
            shell: Shell::default(),
        })
    }
}

/// Global config, then the project config. An explicitly named file must
/// load; the default locations are optional.
fn load(explicit: Option<&Path>) -> Result<Config> {
    let global = global_config_path();
    match explicit {
        Some(path) => {
            let mut config = match &global {
                Some(global) => Config::load_or_default(global),
                None => Config::default(),
            };
            config.merge(Config::load(path)?);
            Ok(config)
        }
        None => {
            let cwd = std::env::current_dir().context("could not read the working directory")?;
            Ok(config::load_config(
                global.as_deref(),
                &project_config_path(&cwd),
            ))
        }
    }
}
