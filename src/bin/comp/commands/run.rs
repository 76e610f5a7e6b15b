//! `comp run` command

use anyhow::Result;
use comp::ops::comp_build::{build, BuildOptions};
use comp::util::ProcessRunner;

use super::Context;
use crate::cli::RunArgs;

/// Build, then run the application. The application's exit status is
/// reported but does not become comp's.
pub fn execute(args: RunArgs, ctx: &Context) -> Result<()> {
    let opts = BuildOptions {
        platform: ctx.platform,
        run: Some(args.args),
        ..Default::default()
    };

    let status = build(&ctx.config, &opts, ProcessRunner::new(), ctx.shell.clone())?;
    tracing::debug!(?status, "application finished");
    Ok(())
}
