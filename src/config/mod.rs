#[cfg(feature = "cli")]
pub mod cli;
pub mod descriptor;

pub use descriptor::{GraphDocument, ToolSettings};
