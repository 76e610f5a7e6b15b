//! Target platforms and the compiler commands they use.
//!
//! A [`Toolchain`] knows how to spell the three commands the driver needs:
//! compiling one dependency unit to an object, archiving objects into a
//! static library and compiling the application against that library.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{bail, Result};

use crate::util::config::ToolchainSettings;
use crate::util::process::{find_executable, Cmd};

/// Platform the application is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// Native GCC toolchain, program runs directly.
    Linux,
    /// MinGW-w64 cross toolchain, program runs through Wine.
    Mingw,
}

impl Platform {
    /// The platform matching the host.
    pub fn host() -> Self {
        if cfg!(windows) {
            Platform::Mingw
        } else {
            Platform::Linux
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Linux => "linux",
            Platform::Mingw => "mingw",
        }
    }

    /// Default toolchain for this platform.
    pub fn toolchain(&self) -> Toolchain {
        let cflags = ["-Wall", "-Wextra", "-pedantic", "-ggdb", "-std=c11"]
            .map(String::from)
            .to_vec();

        match self {
            Platform::Linux => Toolchain {
                cc: "gcc".into(),
                ar: "ar".into(),
                runner: Vec::new(),
                cflags,
            },
            Platform::Mingw => Toolchain {
                cc: "x86_64-w64-mingw32-gcc".into(),
                ar: "x86_64-w64-mingw32-ar".into(),
                runner: if cfg!(windows) {
                    Vec::new()
                } else {
                    vec!["wine".into()]
                },
                cflags,
            },
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "linux" => Ok(Platform::Linux),
            "mingw" | "windows" => Ok(Platform::Mingw),
            _ => Err(format!(
                "invalid platform '{}'; expected 'linux' or 'mingw'",
                s
            )),
        }
    }
}

/// Input for compiling one dependency unit.
#[derive(Debug, Clone)]
pub struct UnitInput {
    pub source: PathBuf,
    pub output: PathBuf,
    pub include_dirs: Vec<PathBuf>,
    pub defines: Vec<String>,
}

/// Input for compiling and linking the application.
#[derive(Debug, Clone)]
pub struct LinkInput {
    pub entry: PathBuf,
    pub output: PathBuf,
    pub include_dirs: Vec<PathBuf>,
    pub lib_dirs: Vec<PathBuf>,
    /// Libraries to link (without `-l` prefix)
    pub libs: Vec<String>,
}

/// GCC-style toolchain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
    /// C compiler
    pub cc: String,
    /// Archiver
    pub ar: String,
    /// Launcher prefix for running built programs
    pub runner: Vec<String>,
    /// Flags for the application compile
    pub cflags: Vec<String>,
}

impl Toolchain {
    /// Platform defaults with configured overrides applied.
    pub fn configured(platform: Platform, settings: &ToolchainSettings) -> Self {
        let mut tc = platform.toolchain();
        if let Some(cc) = &settings.cc {
            tc.cc = cc.clone();
        }
        if let Some(ar) = &settings.ar {
            tc.ar = ar.clone();
        }
        if let Some(runner) = &settings.runner {
            tc.runner = runner.clone();
        }
        if !settings.cflags.is_empty() {
            tc.cflags = settings.cflags.clone();
        }
        tc
    }

    /// Verify the compiler and archiver can be found.
    pub fn check(&self) -> Result<()> {
        for tool in [&self.cc, &self.ar] {
            if find_executable(tool).is_none() {
                bail!(
                    "`{}` not found in PATH\n\
                     hint: install it or set it in {}",
                    tool,
                    crate::util::config::PROJECT_CONFIG_FILE
                );
            }
        }
        Ok(())
    }

    /// `<cc> -I<dir>... -D<def>... -c <unit.c> -o <unit.o>`
    pub fn unit_command(&self, input: &UnitInput) -> Cmd<'_> {
        let mut cmd = Cmd::new(self.cc.as_str());
        for dir in &input.include_dirs {
            cmd.arg(format!("-I{}", dir.display()));
        }
        for def in &input.defines {
            cmd.arg(format!("-D{}", def));
        }
        cmd.arg("-c").arg(path_token(&input.source));
        cmd.arg("-o").arg(path_token(&input.output));
        cmd
    }

    /// `<ar> -crs <lib>`; object paths are appended by the caller.
    pub fn archive_command(&self, output: &Path) -> Cmd<'_> {
        let mut cmd = Cmd::new(self.ar.as_str());
        cmd.arg("-crs").arg(path_token(output));
        cmd
    }

    /// `<cc> <cflags> -o <exe> <entry> -I<dir>... -L<dir>... -l<lib>...`
    pub fn link_command(&self, input: &LinkInput) -> Cmd<'_> {
        let mut cmd = Cmd::new(self.cc.as_str());
        cmd.append(self.cflags.iter().map(String::as_str));
        cmd.arg("-o").arg(path_token(&input.output));
        cmd.arg(path_token(&input.entry));
        for dir in &input.include_dirs {
            cmd.arg(format!("-I{}", dir.display()));
        }
        for dir in &input.lib_dirs {
            cmd.arg(format!("-L{}", dir.display()));
        }
        for lib in &input.libs {
            cmd.arg(format!("-l{}", lib));
        }
        cmd
    }

    /// `[runner...] <exe> <args...>`
    pub fn run_command<'a>(&'a self, exe: &Path, args: &'a [String]) -> Cmd<'a> {
        let mut cmd = Cmd::empty();
        cmd.append(self.runner.iter().map(String::as_str));
        cmd.arg(path_token(exe));
        cmd.append(args.iter().map(String::as_str));
        cmd
    }
}

/// Render a path as a command token.
pub(crate) fn path_token(path: &Path) -> String {
    path.display().to_string()
}
