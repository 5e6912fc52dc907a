use crate::domain::compartment::{Compartment, CompartmentState};
use crate::domain::component::{ComponentKey, DevelopmentComponent};
use crate::domain::registry::{ComponentId, ComponentRegistry};
use crate::utils::error::{Result, ToolError};
use crate::utils::validation::validate_non_empty_string;
use std::collections::BTreeMap;

/// Build option holding the JDK home alias that selects the tool dialect.
pub const JDK_HOME_KEY: &str = "com.sap.jdk.home_path_key";

/// Named set of build options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildVariant {
    name: String,
    required_for_activation: bool,
    options: BTreeMap<String, String>,
}

impl BuildVariant {
    pub fn new(name: impl Into<String>, required_for_activation: bool) -> Self {
        Self {
            name: name.into(),
            required_for_activation,
            options: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_required_for_activation(&self) -> bool {
        self.required_for_activation
    }

    pub fn add_option(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.options.insert(key.into(), value.into());
    }

    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.add_option(key, value);
        self
    }

    pub fn option(&self, key: &str) -> Option<&str> {
        self.options.get(key).map(String::as_str)
    }

    pub fn options(&self) -> &BTreeMap<String, String> {
        &self.options
    }

    /// Value of `key`, or a [`ToolError::MissingBuildOption`] naming it.
    pub fn require_option(&self, key: &str) -> Result<&str> {
        self.option(key).ok_or_else(|| ToolError::MissingBuildOption {
            variant: self.name.clone(),
            option: key.to_string(),
        })
    }
}

/// Root of the build graph: the compartments of one development
/// configuration plus its active build variant.
#[derive(Debug, Clone)]
pub struct DevelopmentConfiguration {
    name: String,
    caption: String,
    description: String,
    build_server_url: String,
    cms_url: String,
    build_variant: Option<BuildVariant>,
    compartments: Vec<Compartment>,
}

impl DevelopmentConfiguration {
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        validate_non_empty_string("configuration.name", &name)?;

        Ok(Self {
            name,
            caption: String::new(),
            description: String::new(),
            build_server_url: String::new(),
            cms_url: String::new(),
            build_variant: None,
            compartments: Vec::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Short workspace name: the configuration name up to its second
    /// underscore, e.g. `DI0_Example` for `DI0_Example_D`.
    pub fn workspace(&self) -> &str {
        match self.name.match_indices('_').nth(1) {
            Some((index, _)) => &self.name[..index],
            None => &self.name,
        }
    }

    pub fn caption(&self) -> &str {
        &self.caption
    }

    pub fn set_caption(&mut self, caption: impl Into<String>) {
        self.caption = caption.into();
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    pub fn build_server_url(&self) -> &str {
        &self.build_server_url
    }

    pub fn set_build_server_url(&mut self, url: impl Into<String>) {
        self.build_server_url = url.into();
    }

    pub fn cms_url(&self) -> &str {
        &self.cms_url
    }

    pub fn set_cms_url(&mut self, url: impl Into<String>) {
        self.cms_url = url.into();
    }

    pub fn build_variant(&self) -> Option<&BuildVariant> {
        self.build_variant.as_ref()
    }

    pub fn set_build_variant(&mut self, build_variant: BuildVariant) {
        self.build_variant = Some(build_variant);
    }

    /// Adds a compartment and sets its back-reference to this
    /// configuration. A compartment with a name already present is merged
    /// into the existing one, which keeps its position.
    pub fn add_compartment(&mut self, mut compartment: Compartment) -> &mut Compartment {
        compartment.set_configuration(&self.name);

        match self.position_of(compartment.name()) {
            Some(index) => {
                tracing::debug!("Merging compartment {} into {}", compartment.name(), self.name);
                let existing = &mut self.compartments[index];
                existing.merge(compartment);
                existing
            }
            None => {
                self.compartments.push(compartment);
                let last = self.compartments.len() - 1;
                &mut self.compartments[last]
            }
        }
    }

    pub fn compartment(&self, name: &str) -> Option<&Compartment> {
        self.compartments.iter().find(|sc| sc.name() == name)
    }

    pub fn compartment_mut(&mut self, name: &str) -> Option<&mut Compartment> {
        self.compartments.iter_mut().find(|sc| sc.name() == name)
    }

    /// Compartments in insertion order.
    pub fn compartments(&self) -> &[Compartment] {
        &self.compartments
    }

    pub fn compartments_in_state(
        &self,
        state: CompartmentState,
    ) -> impl Iterator<Item = &Compartment> {
        self.compartments.iter().filter(move |sc| sc.state() == state)
    }

    /// Puts a registered component into the named compartment and records
    /// the compartment on the component.
    ///
    /// A component keeps the first compartment it was attached to; a
    /// conflicting attachment is logged and leaves the graph unchanged.
    pub fn attach_component(
        &mut self,
        registry: &mut ComponentRegistry,
        compartment: &str,
        id: ComponentId,
    ) -> Result<()> {
        let index = self
            .position_of(compartment)
            .ok_or_else(|| ToolError::UnknownCompartment {
                compartment: compartment.to_string(),
            })?;

        let component = registry.component_mut(id);
        if !component.attach_to(compartment) {
            tracing::warn!(
                "Development component {} already belongs to {}, ignoring {}",
                component.key(),
                component.compartment().unwrap_or_default(),
                compartment
            );
            return Ok(());
        }

        self.compartments[index].add_component(component.key().clone());
        Ok(())
    }

    /// Components of every compartment, resolved through `registry`.
    pub fn development_components<'a>(
        &'a self,
        registry: &'a ComponentRegistry,
    ) -> impl Iterator<Item = &'a DevelopmentComponent> + 'a {
        self.compartments
            .iter()
            .flat_map(|sc| sc.components().iter())
            .filter_map(move |key| registry.get_by_key(key))
    }

    pub fn components_needing_rebuild(&self, registry: &ComponentRegistry) -> Vec<ComponentKey> {
        self.development_components(registry)
            .filter(|dc| dc.needs_rebuild())
            .map(|dc| dc.key().clone())
            .collect()
    }

    /// Compartment that owns the given component, if any.
    pub fn compartment_of(&self, component: &DevelopmentComponent) -> Option<&Compartment> {
        component
            .compartment()
            .and_then(|name| self.compartment(name))
    }

    fn position_of(&self, name: &str) -> Option<usize> {
        self.compartments.iter().position(|sc| sc.name() == name)
    }
}
