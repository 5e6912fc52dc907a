use crate::core::builders::CommandBuilder;
use crate::core::dialect::Dialect;
use crate::domain::component::ComponentKey;
use crate::domain::configuration::DevelopmentConfiguration;
use crate::domain::registry::ComponentRegistry;
use crate::utils::error::{Result, ToolError};

/// One `builddc` statement per requested component, in request order.
///
/// Every component must be attached to a compartment of the configuration;
/// the first one that is not aborts the whole build.
pub struct BuildCommandBuilder<'a> {
    configuration: &'a DevelopmentConfiguration,
    registry: &'a ComponentRegistry,
    dialect: &'a Dialect,
    components: &'a [ComponentKey],
}

impl<'a> BuildCommandBuilder<'a> {
    pub fn new(
        configuration: &'a DevelopmentConfiguration,
        registry: &'a ComponentRegistry,
        dialect: &'a Dialect,
        components: &'a [ComponentKey],
    ) -> Self {
        Self {
            configuration,
            registry,
            dialect,
            components,
        }
    }

    fn compartment_of(&self, key: &ComponentKey) -> Result<&'a str> {
        let missing = || ToolError::MissingCompartment {
            vendor: key.vendor.clone(),
            name: key.name.clone(),
        };

        let name = self
            .registry
            .get_by_key(key)
            .and_then(|component| component.compartment())
            .ok_or_else(missing)?;

        self.configuration
            .compartment(name)
            .map(|compartment| compartment.name())
            .ok_or_else(|| ToolError::UnknownCompartment {
                compartment: name.to_string(),
            })
    }
}

impl CommandBuilder for BuildCommandBuilder<'_> {
    fn build(&self) -> Result<Vec<String>> {
        let commands = self
            .components
            .iter()
            .map(|key| {
                let compartment = self.compartment_of(key)?;
                Ok(self.dialect.build_component(compartment, key))
            })
            .collect::<Result<Vec<_>>>()?;

        tracing::info!("Generated {} build statements", commands.len());
        Ok(commands)
    }
}
