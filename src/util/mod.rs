//! Shared utilities

pub mod buffer;
pub mod config;
pub mod fs;
pub mod process;
pub mod shell;

pub use buffer::{ByteBuf, GrowBuf};
pub use config::Config;
pub use process::{Cmd, ExecError, ProcessRunner, Runner};
pub use shell::Shell;
