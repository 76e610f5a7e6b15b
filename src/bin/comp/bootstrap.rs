//! Startup self-rebuild of the comp binary.

use std::ffi::OsStr;
use std::path::Path;

use anyhow::{Context as _, Result};
use comp::ops::rebuild_self::{configured, RebuildDefaults, RebuildOutcome};
use comp::util::ProcessRunner;

use crate::commands::Context;

/// Environment variable that turns the startup check off. It is also set
/// for the relaunched binary, which never rebuilds again.
pub const NO_REBUILD_ENV: &str = "COMP_NO_REBUILD";

/// Whether the environment disables the startup check. Any value except an
/// empty string or a false literal counts.
pub fn disabled_by_env() -> bool {
    std::env::var_os(NO_REBUILD_ENV).is_some_and(|value| {
        let value = value.to_string_lossy().to_ascii_lowercase();
        !matches!(value.as_str(), "" | "0" | "n" | "no" | "f" | "false" | "off")
    })
}

/// Rebuild and relaunch the running binary if its source is newer.
///
/// Returns `true` when a rebuilt binary was launched and this process must
/// exit successfully without doing anything else.
pub fn rebuild_self(ctx: &Context) -> Result<bool> {
    let exe = std::env::current_exe().context("could not locate the running executable")?;
    let defaults = dev_defaults(&exe);
    let Some(rebuild) = configured(&ctx.config.rebuild, exe, defaults) else {
        return Ok(false);
    };

    let args: Vec<String> = std::env::args_os()
        .skip(1)
        .map(|a| a.to_string_lossy().into_owned())
        .collect();

    let rebuild = rebuild.with_shell(ctx.shell.clone());
    if rebuild.is_stale()? {
        // Inherited by the compiler and the relaunched binary.
        std::env::set_var(NO_REBUILD_ENV, "1");
    }
    match rebuild.rebuild_self(&ProcessRunner::new(), &args)? {
        RebuildOutcome::UpToDate => Ok(false),
        RebuildOutcome::Recovered { code } => {
            ctx.shell
                .warn(format!("rebuild exited with status {}, continuing with this build", code));
            Ok(false)
        }
        RebuildOutcome::Relaunched { code } => {
            tracing::debug!("rebuilt binary exited with status {}", code);
            Ok(true)
        }
    }
}

/// When running from this crate's own `target/` directory, watch the crate
/// sources and rebuild with cargo.
fn dev_defaults(exe: &Path) -> Option<RebuildDefaults> {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    if !exe.starts_with(manifest_dir) {
        return None;
    }

    let manifest = manifest_dir.join("Cargo.toml");
    let mut command = vec![
        "cargo".to_string(),
        "build".to_string(),
        "--manifest-path".to_string(),
        manifest.display().to_string(),
        "--bin".to_string(),
        "comp".to_string(),
    ];
    if exe.parent().and_then(Path::file_name) == Some(OsStr::new("release")) {
        command.push("--release".to_string());
    }

    Some(RebuildDefaults {
        source: manifest_dir.join("src"),
        command,
    })
}
