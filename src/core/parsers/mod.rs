//! Readers for the free-text output of the component and build-space tools.
//!
//! Tool output mixes the lines of interest with timing and log lines; only
//! lines matching a reader's patterns are considered.

pub mod buildspaces;
pub mod compartments;
pub mod components;

pub use buildspaces::parse_build_spaces;
pub use compartments::{apply_compartments, parse_compartments, CompartmentListing};
pub use components::{
    listing_reader, ComponentListingReader, LegacyListingReader, ModernListingReader,
};
