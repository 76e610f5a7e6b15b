//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use comp::builder::Platform;

/// comp - build a C application and its vendored static library
#[derive(Parser)]
#[command(name = "comp")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Platform to build for (linux or mingw) [default: host]
    #[arg(long, global = true, env = "COMP_TARGET", value_name = "PLATFORM")]
    pub target: Option<Platform>,

    /// Read configuration from FILE instead of ./comp.toml
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Skip the startup check that rebuilds comp when its source changed
    #[arg(
        long,
        global = true,
        env = "COMP_NO_REBUILD",
        value_parser = clap::builder::FalseyValueParser::new()
    )]
    pub no_rebuild: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build the dependency library (if missing) and the application
    Build(BuildArgs),

    /// Build, then run the application with the given arguments
    Run(RunArgs),

    /// Remove build artifacts
    Clean,
}

#[derive(Args, Default)]
pub struct BuildArgs {
    /// Print the commands a fresh build would run, without running them
    #[arg(long)]
    pub plan: bool,
}

#[derive(Args)]
pub struct RunArgs {
    /// Arguments forwarded to the application
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}
