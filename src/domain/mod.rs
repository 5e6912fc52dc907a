// Domain layer: the build graph and the ports to external tools.

pub mod compartment;
pub mod component;
pub mod configuration;
pub mod dependency;
pub mod ports;
pub mod public_part;
pub mod registry;

pub use compartment::{Compartment, CompartmentState};
pub use component::{ComponentKey, ComponentType, DevelopmentComponent};
pub use configuration::{BuildVariant, DevelopmentConfiguration, JDK_HOME_KEY};
pub use dependency::{mark_for_rebuild, using_components, ComponentGraph, DependencySorter};
pub use ports::{ProcessOutput, ProcessRequest, ProcessRunner, ToolConfigProvider};
pub use public_part::{PublicPart, PublicPartReference, PublicPartType};
pub use registry::{ComponentId, ComponentRegistry};
