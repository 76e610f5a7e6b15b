//! `comp clean` command

use anyhow::Result;
use comp::ops::comp_build::clean;

use super::Context;

pub fn execute(ctx: &Context) -> Result<()> {
    let removed = clean(&ctx.config, ctx.platform, &ctx.shell)?;
    if removed.is_empty() {
        tracing::info!("nothing to clean");
    }
    Ok(())
}
