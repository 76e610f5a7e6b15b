//! C build driver.
//!
//! This module turns a platform's toolchain and file layout into compiler,
//! archiver and linker invocations and runs them in order.

pub mod driver;
pub mod layout;
pub mod toolchain;

pub use driver::{plan, BuildDriver};
pub use layout::Layout;
pub use toolchain::{LinkInput, Platform, Toolchain, UnitInput};
