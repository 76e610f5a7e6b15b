//! Configuration file support.
//!
//! Two optional locations are read:
//! - Global: `~/.comp/config.toml` - user-wide defaults
//! - Project: `comp.toml` in the working directory - project overrides
//!
//! Project config takes precedence over global config, field by field. Any
//! field left unset falls back to the defaults of the selected platform.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Name of the project configuration file.
pub const PROJECT_CONFIG_FILE: &str = "comp.toml";

/// Build driver configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Compiler, archiver and launcher overrides
    pub toolchain: ToolchainSettings,

    /// The static library built from vendored sources
    pub dependency: DependencySettings,

    /// The application executable
    pub target: TargetSettings,

    /// Self-rebuild of the driver binary
    pub rebuild: RebuildSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolchainSettings {
    /// C compiler (e.g., `gcc`, `x86_64-w64-mingw32-gcc`)
    pub cc: Option<String>,

    /// Archiver (e.g., `ar`)
    pub ar: Option<String>,

    /// Launcher prefix for running the built program (e.g., `["wine"]`).
    /// An empty list runs the program directly.
    pub runner: Option<Vec<String>>,

    /// Warning and language flags for the application compile
    pub cflags: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DependencySettings {
    /// Directory holding the dependency's `.c` units
    pub src_dir: Option<PathBuf>,

    /// Output directory for objects and the archive
    pub lib_dir: Option<PathBuf>,

    /// Archive file name (e.g., `libraylib.a`)
    pub lib_name: Option<String>,

    /// Unit names, compiled in this order
    pub units: Vec<String>,

    /// Include directories for units, relative to `src_dir`
    pub include_dirs: Vec<PathBuf>,

    /// Preprocessor defines for units
    pub defines: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetSettings {
    /// Application entry source file
    pub entry: Option<PathBuf>,

    /// Executable output path
    pub output: Option<PathBuf>,

    /// Libraries to link (without the `-l` prefix)
    pub libs: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RebuildSettings {
    /// Whether the driver checks its own source on startup
    pub enabled: Option<bool>,

    /// Source file or directory of the driver itself
    pub source: Option<PathBuf>,

    /// Compiler used as `<compiler> -o {exe} {source}`
    pub compiler: Option<String>,

    /// Full rebuild command template; `{exe}` and `{source}` are substituted
    pub command: Vec<String>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if the file is absent
    /// or unreadable.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        Self::load(path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
            Self::default()
        })
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        let Config {
            toolchain,
            dependency,
            target,
            rebuild,
        } = other;

        merge_opt(&mut self.toolchain.cc, toolchain.cc);
        merge_opt(&mut self.toolchain.ar, toolchain.ar);
        merge_opt(&mut self.toolchain.runner, toolchain.runner);
        merge_vec(&mut self.toolchain.cflags, toolchain.cflags);

        merge_opt(&mut self.dependency.src_dir, dependency.src_dir);
        merge_opt(&mut self.dependency.lib_dir, dependency.lib_dir);
        merge_opt(&mut self.dependency.lib_name, dependency.lib_name);
        merge_vec(&mut self.dependency.units, dependency.units);
        merge_vec(&mut self.dependency.include_dirs, dependency.include_dirs);
        merge_vec(&mut self.dependency.defines, dependency.defines);

        merge_opt(&mut self.target.entry, target.entry);
        merge_opt(&mut self.target.output, target.output);
        merge_vec(&mut self.target.libs, target.libs);

        merge_opt(&mut self.rebuild.enabled, rebuild.enabled);
        merge_opt(&mut self.rebuild.source, rebuild.source);
        merge_opt(&mut self.rebuild.compiler, rebuild.compiler);
        merge_vec(&mut self.rebuild.command, rebuild.command);
    }
}

fn merge_opt<T>(dst: &mut Option<T>, src: Option<T>) {
    if src.is_some() {
        *dst = src;
    }
}

fn merge_vec<T>(dst: &mut Vec<T>, src: Vec<T>) {
    if !src.is_empty() {
        *dst = src;
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (`comp.toml`)
/// 2. Global config (`~/.comp/config.toml`)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    if let Some(global) = global_path {
        config.merge(Config::load_or_default(global));
    }
    config.merge(Config::load_or_default(project_path));

    config
}

/// Get the global config directory (`~/.comp`).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".comp"))
}

/// Get the global config path (`~/.comp/config.toml`).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (`comp.toml`).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(PROJECT_CONFIG_FILE)
}
