use crate::core::dialect::{Dialect, DialectTable, JdkHomeAlias};
use crate::domain::configuration::{DevelopmentConfiguration, JDK_HOME_KEY};
use crate::utils::error::{Result, ToolError};

/// Dialect chosen for a development configuration.
#[derive(Debug, Clone, Copy)]
pub struct SelectedDialect {
    pub alias: JdkHomeAlias,
    pub dialect: &'static Dialect,
}

/// Picks the tool dialect from the JDK home alias of the active build
/// variant.
pub struct ToolVersionSelector<'a> {
    table: &'a DialectTable,
}

impl<'a> ToolVersionSelector<'a> {
    pub fn new(table: &'a DialectTable) -> Self {
        Self { table }
    }

    pub fn select(&self, configuration: &DevelopmentConfiguration) -> Result<SelectedDialect> {
        let variant = configuration
            .build_variant()
            .ok_or_else(|| ToolError::MissingConfigError {
                field: format!("{}.build_variant", configuration.name()),
            })?;

        let alias: JdkHomeAlias = variant.require_option(JDK_HOME_KEY)?.parse()?;
        let dialect = self.table.dialect_for(alias)?;

        tracing::debug!(
            "Using {:?} dialect for {} ({})",
            dialect.kind(),
            configuration.name(),
            alias
        );

        Ok(SelectedDialect { alias, dialect })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dialect::DialectKind;
    use crate::domain::configuration::BuildVariant;

    fn configuration(alias: Option<&str>) -> DevelopmentConfiguration {
        let mut config = DevelopmentConfiguration::new("DI0_Example_D").unwrap();
        let mut variant = BuildVariant::new("default", true);
        if let Some(alias) = alias {
            variant.add_option(JDK_HOME_KEY, alias);
        }
        config.set_build_variant(variant);
        config
    }

    #[test]
    fn test_selects_dialect_by_alias() {
        let table = DialectTable::standard();
        let selector = ToolVersionSelector::new(&table);

        let legacy = selector.select(&configuration(Some("JDK1.3.1_HOME"))).unwrap();
        let modern = selector.select(&configuration(Some("JDK1.5.0_HOME"))).unwrap();

        assert_eq!(legacy.dialect.kind(), DialectKind::Legacy);
        assert_eq!(modern.alias, JdkHomeAlias::Jdk150);
        assert_eq!(modern.dialect.kind(), DialectKind::Modern);
    }

    #[test]
    fn test_unknown_alias_names_the_value() {
        let table = DialectTable::standard();
        let error = ToolVersionSelector::new(&table)
            .select(&configuration(Some("JDK11_HOME")))
            .unwrap_err();

        assert!(error.to_string().contains("JDK11_HOME"));
    }

    #[test]
    fn test_missing_alias_option() {
        let table = DialectTable::standard();
        let result = ToolVersionSelector::new(&table).select(&configuration(None));

        assert!(matches!(result, Err(ToolError::MissingBuildOption { .. })));
    }

    #[test]
    fn test_missing_build_variant() {
        let table = DialectTable::standard();
        let config = DevelopmentConfiguration::new("DI0_Example_D").unwrap();

        assert!(matches!(
            ToolVersionSelector::new(&table).select(&config),
            Err(ToolError::MissingConfigError { .. })
        ));
    }
}
