pub mod builders;
pub mod dialect;
pub mod executor;
pub mod parsers;
pub mod selector;

pub use crate::domain::ports::{ProcessRunner, ToolConfigProvider};
pub use crate::utils::error::Result;
