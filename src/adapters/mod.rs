// Adapters layer: concrete implementations of the domain ports.

pub mod process;

pub use process::SystemProcessRunner;
