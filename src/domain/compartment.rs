use crate::domain::component::ComponentKey;
use crate::utils::error::{Result, ToolError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompartmentState {
    /// Sources are available; components may be rebuilt.
    Source,
    /// Pre-built and read-only.
    Archive,
}

impl CompartmentState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompartmentState::Source => "source",
            CompartmentState::Archive => "archive",
        }
    }
}

impl fmt::Display for CompartmentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CompartmentState {
    type Err = ToolError;

    /// Accepts the state texts printed by the build-space tool, in any case
    /// and with arbitrary inner whitespace.
    fn from_str(text: &str) -> Result<Self> {
        let normalized = text
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_ascii_lowercase();

        match normalized.as_str() {
            "source" | "source state" => Ok(CompartmentState::Source),
            "archive" | "archive state" => Ok(CompartmentState::Archive),
            _ => Err(ToolError::UnknownCompartmentState {
                text: text.to_string(),
            }),
        }
    }
}

/// A build area for one software component inside a development
/// configuration.
#[derive(Debug, Clone)]
pub struct Compartment {
    name: String,
    vendor: String,
    software_component: String,
    caption: String,
    state: CompartmentState,
    dtr_url: String,
    inactive_location: String,
    components: Vec<ComponentKey>,
    used_compartments: Vec<String>,
    configuration: Option<String>,
}

impl Compartment {
    pub fn new(
        name: impl Into<String>,
        state: CompartmentState,
        vendor: impl Into<String>,
        caption: impl Into<String>,
        software_component: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            vendor: vendor.into(),
            software_component: software_component.into(),
            caption: caption.into(),
            state,
            dtr_url: String::new(),
            inactive_location: String::new(),
            components: Vec::new(),
            used_compartments: Vec::new(),
            configuration: None,
        }
    }

    /// Creates a compartment from its conventional name
    /// `<vendor>_<software component>_<version>`.
    pub fn from_name(name: impl Into<String>, state: CompartmentState) -> Self {
        let name = name.into();
        let (vendor, software_component) = split_compartment_name(&name);
        Self::new(name, state, vendor, "", software_component)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn vendor(&self) -> &str {
        &self.vendor
    }

    pub fn software_component(&self) -> &str {
        &self.software_component
    }

    pub fn caption(&self) -> &str {
        &self.caption
    }

    pub fn set_caption(&mut self, caption: impl Into<String>) {
        self.caption = caption.into();
    }

    pub fn state(&self) -> CompartmentState {
        self.state
    }

    pub fn is_archive(&self) -> bool {
        self.state == CompartmentState::Archive
    }

    pub fn is_source(&self) -> bool {
        self.state == CompartmentState::Source
    }

    pub fn dtr_url(&self) -> &str {
        &self.dtr_url
    }

    pub fn set_dtr_url(&mut self, dtr_url: impl Into<String>) {
        self.dtr_url = dtr_url.into();
    }

    pub fn inactive_location(&self) -> &str {
        &self.inactive_location
    }

    pub fn set_inactive_location(&mut self, location: impl Into<String>) {
        self.inactive_location = location.into();
    }

    pub fn components(&self) -> &[ComponentKey] {
        &self.components
    }

    pub fn contains(&self, key: &ComponentKey) -> bool {
        self.components.contains(key)
    }

    /// Registers a component key with this compartment. Use
    /// [`DevelopmentConfiguration::attach_component`](crate::domain::configuration::DevelopmentConfiguration::attach_component)
    /// to keep the component's back-reference in step.
    pub(crate) fn add_component(&mut self, key: ComponentKey) -> bool {
        if self.components.contains(&key) {
            return false;
        }
        self.components.push(key);
        true
    }

    pub fn used_compartments(&self) -> &[String] {
        &self.used_compartments
    }

    pub fn add_used_compartment(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if name == self.name || self.used_compartments.contains(&name) {
            return false;
        }
        self.used_compartments.push(name);
        true
    }

    /// Name of the owning development configuration, once added to one.
    pub fn configuration(&self) -> Option<&str> {
        self.configuration.as_deref()
    }

    pub(crate) fn set_configuration(&mut self, configuration: &str) {
        if self.configuration.is_none() {
            self.configuration = Some(configuration.to_string());
        }
    }

    /// Folds another definition of the same compartment into this one.
    pub(crate) fn merge(&mut self, other: Compartment) {
        self.vendor = other.vendor;
        self.software_component = other.software_component;
        self.caption = other.caption;
        self.state = other.state;
        if !other.dtr_url.is_empty() {
            self.dtr_url = other.dtr_url;
        }
        if !other.inactive_location.is_empty() {
            self.inactive_location = other.inactive_location;
        }
        for key in other.components {
            self.add_component(key);
        }
        for used in other.used_compartments {
            self.add_used_compartment(used);
        }
    }

    #[cfg(test)]
    pub(crate) fn set_state(&mut self, state: CompartmentState) {
        self.state = state;
    }
}

impl PartialEq for Compartment {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.configuration == other.configuration
    }
}

impl Eq for Compartment {}

impl Hash for Compartment {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.configuration.hash(state);
    }
}

/// Splits `<vendor>_<sc>_<version>` into vendor and software component.
/// Names without that shape yield empty parts.
fn split_compartment_name(name: &str) -> (String, String) {
    let Some((vendor, rest)) = name.split_once('_') else {
        return (String::new(), String::new());
    };
    let software_component = rest.rsplit_once('_').map(|(sc, _)| sc).unwrap_or(rest);
    (vendor.to_string(), software_component.to_string())
}
