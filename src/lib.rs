pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::SystemProcessRunner;
pub use config::{GraphDocument, ToolSettings};
pub use core::executor::{ToolExecutor, ToolResult};
pub use domain::{
    Compartment, CompartmentState, ComponentKey, ComponentRegistry, DevelopmentComponent,
    DevelopmentConfiguration,
};
pub use utils::error::{Result, ToolError};
