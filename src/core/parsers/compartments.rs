use crate::domain::compartment::{Compartment, CompartmentState};
use crate::domain::configuration::DevelopmentConfiguration;
use crate::utils::error::Result;
use regex::Regex;
use std::sync::LazyLock;

static COMPARTMENT_STATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\S+)[ \t]+\([ \t]*([^()]*?)[ \t]+state[ \t]*\)").expect("compartment pattern")
});

/// A compartment as listed by the build-space tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompartmentListing {
    pub name: String,
    pub state: CompartmentState,
}

/// Reads `<name> (<state> state)` entries. An unrecognized state text fails
/// the whole parse.
pub fn parse_compartments(output: &str) -> Result<Vec<CompartmentListing>> {
    output
        .lines()
        .filter_map(|line| COMPARTMENT_STATE.captures(line))
        .map(|captures| -> Result<CompartmentListing> {
            Ok(CompartmentListing {
                name: captures[1].to_string(),
                state: captures[2].parse::<CompartmentState>()?,
            })
        })
        .collect()
}

/// Adds the listed compartments to the configuration. Known compartments
/// are merged: only the state changes, descriptive fields and components are
/// kept.
pub fn apply_compartments(
    configuration: &mut DevelopmentConfiguration,
    listings: &[CompartmentListing],
) {
    for listing in listings {
        let compartment = match configuration.compartment(&listing.name) {
            Some(existing) => Compartment::new(
                listing.name.clone(),
                listing.state,
                existing.vendor(),
                existing.caption(),
                existing.software_component(),
            ),
            None => Compartment::from_name(listing.name.clone(), listing.state),
        };
        configuration.add_compartment(compartment);
    }
}
