use crate::core::builders::CommandBuilder;
use crate::core::dialect::Dialect;
use crate::domain::configuration::DevelopmentConfiguration;
use crate::utils::error::Result;

/// One `listdcs` statement per compartment, in configuration order.
pub struct ListCommandBuilder<'a> {
    configuration: &'a DevelopmentConfiguration,
    dialect: &'a Dialect,
}

impl<'a> ListCommandBuilder<'a> {
    pub fn new(configuration: &'a DevelopmentConfiguration, dialect: &'a Dialect) -> Self {
        Self {
            configuration,
            dialect,
        }
    }
}

impl CommandBuilder for ListCommandBuilder<'_> {
    fn build(&self) -> Result<Vec<String>> {
        Ok(self
            .configuration
            .compartments()
            .iter()
            .map(|compartment| self.dialect.list_components(compartment.name()))
            .collect())
    }
}
