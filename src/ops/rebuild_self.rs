//! Rebuild the running executable when its source changed, then hand off.
//!
//! On startup the executable's modification time is compared with its
//! source's. If the source is newer:
//!
//! 1. the executable is renamed to `<exe>.old`,
//! 2. the rebuild command is run to produce a new executable at `<exe>`,
//! 3. on failure the backup is moved back and the caller carries on with the
//!    old logic,
//! 4. on success the new executable is run with the original arguments and
//!    the caller must exit with status 0 once it returns.
//!
//! At every point between these steps exactly one runnable executable sits
//! at `<exe>` or at `<exe>.old`, and after the bootstrap returns it is always
//! at `<exe>`.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::{Context, Result};

use crate::util::config::RebuildSettings;
use crate::util::fs::{
    is_stale, last_modified, move_file, newest_modified, set_last_modified, with_suffix,
};
use crate::util::process::{Cmd, Runner};
use crate::util::shell::{Shell, Status};

/// Suffix of the backup kept while a rebuild is in flight.
pub const BACKUP_SUFFIX: &str = ".old";

/// Placeholder replaced by the executable path in rebuild commands.
pub const EXE_PLACEHOLDER: &str = "{exe}";

/// Placeholder replaced by the source path in rebuild commands.
pub const SOURCE_PLACEHOLDER: &str = "{source}";

/// What the bootstrap did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebuildOutcome {
    /// The executable is at least as new as its source.
    UpToDate,
    /// The rebuild failed with `code`; the previous executable was restored.
    Recovered { code: i32 },
    /// The rebuilt executable ran and exited with `code`. The caller must
    /// terminate with status 0 without running its own logic.
    Relaunched { code: i32 },
}

/// A self-rebuild check for one executable.
#[derive(Debug, Clone)]
pub struct SelfRebuild {
    exe: PathBuf,
    source: PathBuf,
    command: Vec<String>,
    shell: Shell,
}

impl SelfRebuild {
    /// Rebuild `exe` from `source` with `<compiler> -o {exe} {source}`.
    pub fn new(exe: impl Into<PathBuf>, source: impl Into<PathBuf>, compiler: &str) -> Self {
        SelfRebuild {
            exe: exe.into(),
            source: source.into(),
            command: vec![
                compiler.to_string(),
                "-o".to_string(),
                EXE_PLACEHOLDER.to_string(),
                SOURCE_PLACEHOLDER.to_string(),
            ],
            shell: Shell::default(),
        }
    }

    /// Replace the rebuild command template.
    pub fn with_command(mut self, command: Vec<String>) -> Self {
        self.command = command;
        self
    }

    pub fn with_shell(mut self, shell: Shell) -> Self {
        self.shell = shell;
        self
    }

    pub fn exe(&self) -> &Path {
        &self.exe
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Where the running executable is parked during a rebuild.
    pub fn backup_path(&self) -> PathBuf {
        with_suffix(&self.exe, BACKUP_SUFFIX)
    }

    /// Whether the source is newer than the executable.
    pub fn is_stale(&self) -> Result<bool> {
        let exe_time = last_modified(&self.exe)?;
        let src_time = newest_modified(&self.source)?;
        Ok(is_stale(src_time, exe_time))
    }

    /// The rebuild command with placeholders substituted.
    pub fn rebuild_command(&self) -> Cmd<'static> {
        let exe = self.exe.display().to_string();
        let source = self.source.display().to_string();
        let mut cmd = Cmd::empty();
        cmd.append(self.command.iter().map(|token| {
            token
                .replace(EXE_PLACEHOLDER, &exe)
                .replace(SOURCE_PLACEHOLDER, &source)
        }));
        cmd
    }

    /// Check the executable and rebuild and relaunch it if stale.
    ///
    /// `args` are the original arguments without the program name.
    pub fn rebuild_self<R: Runner>(&self, runner: &R, args: &[String]) -> Result<RebuildOutcome> {
        if !self.is_stale()? {
            tracing::debug!(
                "{} is up to date with {}",
                self.exe.display(),
                self.source.display()
            );
            return Ok(RebuildOutcome::UpToDate);
        }

        let backup = self.backup_path();
        self.shell.status(
            Status::Rebuilding,
            format!("{} ({} changed)", self.exe.display(), self.source.display()),
        );
        move_file(&self.exe, &backup).context("could not back up the running executable")?;

        let code = match runner.execute(&self.rebuild_command()) {
            Ok(code) => code,
            Err(e) => {
                self.restore(&backup)?;
                return Err(e).context("could not run the rebuild command");
            }
        };

        if code != 0 || !self.exe.is_file() {
            if code == 0 {
                self.shell.warn(format!(
                    "rebuild command succeeded but left nothing at {}",
                    self.exe.display()
                ));
            }
            self.restore(&backup)?;
            return Ok(RebuildOutcome::Recovered { code });
        }

        self.mark_fresh()?;

        if let Err(e) = std::fs::remove_file(&backup) {
            // Windows keeps the image of a running executable locked.
            tracing::debug!("could not remove {}: {}", backup.display(), e);
        }

        let mut relaunch = Cmd::new(self.exe.display().to_string());
        relaunch.append(args.iter().map(String::as_str));
        let code = runner
            .execute(&relaunch)
            .context("could not relaunch the rebuilt executable")?;
        Ok(RebuildOutcome::Relaunched { code })
    }

    /// Make sure the rebuilt executable no longer looks stale.
    ///
    /// A compiler that decides nothing changed may leave an old image at
    /// `exe`; the relaunched process would then rebuild again, forever.
    fn mark_fresh(&self) -> Result<()> {
        let src_time = newest_modified(&self.source)?;
        let exe_time = last_modified(&self.exe)?;
        if is_stale(src_time, exe_time) {
            tracing::debug!("{} is older than its source, touching it", self.exe.display());
            set_last_modified(&self.exe, SystemTime::now().max(src_time))?;
        }
        Ok(())
    }

    fn restore(&self, backup: &Path) -> Result<()> {
        move_file(backup, &self.exe).context("could not restore the previous executable")?;
        self.shell.status(
            Status::Restored,
            format!("{} (rebuild failed, keeping the previous build)", self.exe.display()),
        );
        Ok(())
    }
}

/// Source and command used when no rebuild source is configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RebuildDefaults {
    pub source: PathBuf,
    pub command: Vec<String>,
}

/// Build the self-rebuild check for `exe` from configuration.
///
/// Returns `None` when rebuilding is disabled or there is no source to
/// watch. A configured source must exist; a missing default source only
/// means the binary was installed without its source tree.
pub fn configured(
    settings: &RebuildSettings,
    exe: PathBuf,
    defaults: Option<RebuildDefaults>,
) -> Option<SelfRebuild> {
    if settings.enabled == Some(false) {
        tracing::debug!("self-rebuild disabled by configuration");
        return None;
    }

    let (source, default_command) = match (&settings.source, defaults) {
        (Some(source), defaults) => (source.clone(), defaults.map(|d| d.command)),
        (None, Some(defaults)) if defaults.source.exists() => {
            (defaults.source, Some(defaults.command))
        }
        (None, Some(defaults)) => {
            tracing::debug!(
                "no source at {}, skipping self-rebuild",
                defaults.source.display()
            );
            return None;
        }
        (None, None) => return None,
    };

    let rebuild = match &settings.compiler {
        Some(compiler) => SelfRebuild::new(exe, source, compiler),
        None => SelfRebuild::new(exe, source, DEFAULT_COMPILER),
    };
    let command = if !settings.command.is_empty() {
        Some(settings.command.clone())
    } else if settings.compiler.is_some() {
        None
    } else {
        default_command
    };
    Some(match command {
        Some(command) => rebuild.with_command(command),
        None => rebuild,
    })
}

/// Compiler used when neither a command nor a compiler is configured.
pub const DEFAULT_COMPILER: &str = "rustc";
