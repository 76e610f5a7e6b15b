//! High-level operations.
//!
//! This module contains the implementation of comp commands.

pub mod comp_build;
pub mod rebuild_self;

pub use comp_build::{build, clean, BuildOptions};
pub use rebuild_self::{RebuildDefaults, RebuildOutcome, SelfRebuild};
