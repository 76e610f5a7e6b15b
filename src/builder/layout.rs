//! Where sources come from and where artifacts go.

use std::path::{Path, PathBuf};

use crate::builder::toolchain::{LinkInput, Platform, UnitInput};
use crate::util::config::Config;

/// Units of raylib 5.0, in build order.
pub const RAYLIB_UNITS: &[&str] = &[
    "rcore",
    "raudio",
    "rglfw",
    "rmodels",
    "rshapes",
    "rtext",
    "rtextures",
    "utils",
];

/// Filesystem layout of one build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    /// Directory holding the dependency's `.c` units
    pub dep_src_dir: PathBuf,
    /// Output directory for unit objects and the archive
    pub dep_lib_dir: PathBuf,
    /// Archive file name inside `dep_lib_dir`
    pub dep_lib_name: String,
    /// Unit names, compiled in order
    pub units: Vec<String>,
    /// Unit include directories, relative to `dep_src_dir`
    pub unit_include_dirs: Vec<PathBuf>,
    /// Unit preprocessor defines
    pub unit_defines: Vec<String>,
    /// Application entry source
    pub entry: PathBuf,
    /// Application executable
    pub output: PathBuf,
    /// Libraries linked into the application
    pub libs: Vec<String>,
}

impl Layout {
    /// Default layout for `platform`.
    pub fn for_platform(platform: Platform) -> Self {
        let (lib_dir, output, libs): (&str, &str, &[&str]) = match platform {
            Platform::Linux => ("./build/raylib-linux", "./build/vocab", &["raylib", "m"][..]),
            Platform::Mingw => (
                "./build/raylib-mingw",
                "./build/vocab.exe",
                &[":libraylib.a", "m", "winmm", "gdi32"][..],
            ),
        };

        Layout {
            dep_src_dir: PathBuf::from("./deps/raylib-5.0/src"),
            dep_lib_dir: PathBuf::from(lib_dir),
            dep_lib_name: "libraylib.a".into(),
            units: RAYLIB_UNITS.iter().map(|u| u.to_string()).collect(),
            unit_include_dirs: vec![PathBuf::from("external/glfw/include")],
            unit_defines: vec!["PLATFORM_DESKTOP".into()],
            entry: PathBuf::from("./main.c"),
            output: PathBuf::from(output),
            libs: libs.iter().map(|l| l.to_string()).collect(),
        }
    }

    /// Platform defaults with configured overrides applied.
    pub fn configured(platform: Platform, config: &Config) -> Self {
        let mut layout = Self::for_platform(platform);
        let dep = &config.dependency;
        let target = &config.target;

        if let Some(dir) = &dep.src_dir {
            layout.dep_src_dir = dir.clone();
        }
        if let Some(dir) = &dep.lib_dir {
            layout.dep_lib_dir = dir.clone();
        }
        if let Some(name) = &dep.lib_name {
            layout.dep_lib_name = name.clone();
        }
        if !dep.units.is_empty() {
            layout.units = dep.units.clone();
        }
        if !dep.include_dirs.is_empty() {
            layout.unit_include_dirs = dep.include_dirs.clone();
        }
        if !dep.defines.is_empty() {
            layout.unit_defines = dep.defines.clone();
        }
        if let Some(entry) = &target.entry {
            layout.entry = entry.clone();
        }
        if let Some(output) = &target.output {
            layout.output = output.clone();
        }
        if !target.libs.is_empty() {
            layout.libs = target.libs.clone();
        }
        layout
    }

    /// Path of the dependency archive.
    pub fn library_path(&self) -> PathBuf {
        self.dep_lib_dir.join(&self.dep_lib_name)
    }

    /// Compile input for dependency unit `unit`.
    pub fn unit_input(&self, unit: &str) -> UnitInput {
        UnitInput {
            source: self.dep_src_dir.join(format!("{unit}.c")),
            output: self.dep_lib_dir.join(format!("{unit}.o")),
            include_dirs: self
                .unit_include_dirs
                .iter()
                .map(|d| self.dep_src_dir.join(d))
                .collect(),
            defines: self.unit_defines.clone(),
        }
    }

    /// Compile-and-link input for the application.
    pub fn link_input(&self) -> LinkInput {
        LinkInput {
            entry: self.entry.clone(),
            output: self.output.clone(),
            include_dirs: vec![self.dep_src_dir.clone()],
            lib_dirs: vec![self.dep_lib_dir.clone()],
            libs: self.libs.clone(),
        }
    }

    /// Directories `clean` removes: the dependency library directory and
    /// the directory holding the executable.
    ///
    /// Only relative directories below the working directory qualify, and
    /// never one that holds the dependency sources or the entry file. A
    /// directory nested in another candidate is covered by its ancestor.
    pub fn output_dirs(&self) -> Vec<PathBuf> {
        let protected = [normalized(&self.dep_src_dir), normalized(&self.entry)];
        let mut candidates: Vec<PathBuf> = [Some(self.dep_lib_dir.as_path()), self.output.parent()]
            .into_iter()
            .flatten()
            .filter(|dir| is_removable(dir))
            .filter(|dir| match normalized(dir) {
                Some(dir) => protected.iter().flatten().all(|p| !p.starts_with(&dir)),
                None => false,
            })
            .map(Path::to_path_buf)
            .collect();
        candidates.sort_by_key(|dir| normalized(dir).map_or(0, |d| d.components().count()));

        let mut dirs: Vec<PathBuf> = Vec::new();
        for dir in candidates {
            let covered = dirs.iter().any(|kept| same_or_inside(&dir, kept));
            if !covered {
                dirs.push(dir);
            }
        }
        dirs
    }
}

/// `path` without `.` components, or `None` if it leaves the working
/// directory.
fn normalized(path: &Path) -> Option<PathBuf> {
    use std::path::Component;

    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::Normal(part) => out.push(part),
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    Some(out)
}

/// A relative directory strictly below the working directory.
fn is_removable(dir: &Path) -> bool {
    normalized(dir).is_some_and(|d| d.components().next().is_some())
}

fn same_or_inside(dir: &Path, ancestor: &Path) -> bool {
    match (normalized(dir), normalized(ancestor)) {
        (Some(dir), Some(ancestor)) => dir.starts_with(ancestor),
        _ => false,
    }
}
