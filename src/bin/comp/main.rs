//! comp CLI - a self-rebuilding build driver for C projects

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod bootstrap;
mod cli;
mod commands;

use cli::{Cli, Commands};
use commands::Context;

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    // Parse CLI
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        // --help and --version
        Err(e) if !e.use_stderr() => e.exit(),
        Err(e) => return usage_error(e),
    };

    init_logging(cli.verbose);

    let ctx = Context::from_cli(&cli)?;

    if !cli.no_rebuild && bootstrap::rebuild_self(&ctx)? {
        // The rebuilt binary already did the work.
        return Ok(());
    }

    match cli.command.unwrap_or(Commands::Build(Default::default())) {
        Commands::Build(args) => commands::build::execute(args, &ctx),
        Commands::Run(args) => commands::run::execute(args, &ctx),
        Commands::Clean => commands::clean::execute(&ctx),
    }
}

/// Arguments this build rejects may be understood by a newer one, so the
/// startup check still runs with the default configuration before the
/// error is reported.
fn usage_error(e: clap::Error) -> Result<()> {
    init_logging(false);

    let no_rebuild_flag = std::env::args_os().any(|a| a == "--no-rebuild");
    if !no_rebuild_flag && !bootstrap::disabled_by_env() {
        let ctx = Context::with_defaults()?;
        if bootstrap::rebuild_self(&ctx)? {
            return Ok(());
        }
    }

    // Usage errors exit like every other failure.
    let _ = e.print();
    std::process::exit(1);
}

fn init_logging(verbose: bool) {
    // RUST_LOG wins over -v
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("comp=debug")
        } else {
            EnvFilter::new("comp=info")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}
