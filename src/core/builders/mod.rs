//! Generators for component tool statements.
//!
//! Builders only read the build graph. They return the body of a tool
//! script; the preamble and the exit statement are added by the
//! [`ToolExecutor`](crate::core::executor::ToolExecutor).

pub mod build;
pub mod list;
pub mod sync;

pub use build::BuildCommandBuilder;
pub use list::ListCommandBuilder;
pub use sync::{SyncCommandBuilder, SyncRequest, FOUNDATION_COMPARTMENTS};

use crate::utils::error::Result;

pub trait CommandBuilder {
    fn build(&self) -> Result<Vec<String>>;
}
