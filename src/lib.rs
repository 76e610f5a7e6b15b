//! comp - a self-rebuilding build driver for small C projects
//!
//! This crate provides the library behind the `comp` binary: a growable
//! buffer, a command builder with a synchronous process runner, the
//! self-rebuild bootstrap, and the build driver that compiles a vendored
//! static library and links an application against it.

pub mod builder;
pub mod ops;
pub mod util;

/// Test utilities and mocks for comp unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides a scripted process runner and filesystem
/// fixtures.
#[cfg(test)]
pub mod test_support;

pub use builder::{BuildDriver, Layout, Platform, Toolchain};
pub use ops::rebuild_self::{RebuildOutcome, SelfRebuild};
pub use util::buffer::GrowBuf;
pub use util::config::Config;
pub use util::process::{Cmd, ExecError, ProcessRunner, Runner};
