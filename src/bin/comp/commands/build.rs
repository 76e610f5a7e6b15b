//! `comp build` command

use anyhow::Result;
use comp::ops::comp_build::{build, BuildOptions};
use comp::util::ProcessRunner;

use super::Context;
use crate::cli::BuildArgs;

pub fn execute(args: BuildArgs, ctx: &Context) -> Result<()> {
    let opts = BuildOptions {
        platform: ctx.platform,
        run: None,
        check_tools: !args.plan,
        plan: args.plan,
    };

    build(&ctx.config, &opts, ProcessRunner::new(), ctx.shell.clone())?;
    Ok(())
}
