use crate::core::dialect::DialectKind;
use crate::domain::configuration::DevelopmentConfiguration;
use crate::domain::registry::ComponentRegistry;
use crate::utils::error::{Result, ToolError};
use regex::Regex;
use std::sync::LazyLock;

static MODERN_COMPONENT_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*\d+\s+(\S+)\s+(\S+)\s+(\S+_\S+_\S+)\s*$").expect("modern listing pattern")
});

static LEGACY_COMPARTMENT_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"compartment\s+'([^']+)'\s+of\s+build\s+space\s+'([^']+)'")
        .expect("legacy header pattern")
});

static LEGACY_COMPONENT_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*\d+\.?\s+DC name:\s*(\S+)\s+DC vendor:\s*(\S+)\s*$")
        .expect("legacy component pattern")
});

/// Reads `listdcs` output and attaches the listed components to their
/// compartments.
///
/// Reading the same output again is harmless: components are looked up
/// through the registry and attachments are idempotent. On error the
/// attachments made so far are kept.
pub trait ComponentListingReader {
    /// Returns the number of component lines read.
    fn read(
        &self,
        output: &str,
        configuration: &mut DevelopmentConfiguration,
        registry: &mut ComponentRegistry,
    ) -> Result<usize>;
}

/// Lines of the form `<ordinal> <name> <vendor> <compartment>`, where the
/// compartment follows the `<vendor>_<software component>_<version>` naming.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModernListingReader;

impl ComponentListingReader for ModernListingReader {
    fn read(
        &self,
        output: &str,
        configuration: &mut DevelopmentConfiguration,
        registry: &mut ComponentRegistry,
    ) -> Result<usize> {
        let mut count = 0;

        for line in output.lines() {
            let Some(captures) = MODERN_COMPONENT_LINE.captures(line) else {
                continue;
            };
            let (name, vendor, compartment) = (&captures[1], &captures[2], &captures[3]);

            let id = registry.get_or_create(vendor, name);
            configuration.attach_component(registry, compartment, id)?;
            count += 1;
        }

        tracing::debug!("Read {} development components from listing", count);
        Ok(count)
    }
}

/// Compartment header lines followed by numbered
/// `DC name: <name> DC vendor: <vendor>` lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyListingReader;

impl ComponentListingReader for LegacyListingReader {
    fn read(
        &self,
        output: &str,
        configuration: &mut DevelopmentConfiguration,
        registry: &mut ComponentRegistry,
    ) -> Result<usize> {
        let mut current_compartment: Option<String> = None;
        let mut count = 0;

        for line in output.lines() {
            if let Some(captures) = LEGACY_COMPARTMENT_HEADER.captures(line) {
                let compartment = &captures[1];
                if configuration.compartment(compartment).is_none() {
                    return Err(ToolError::UnknownCompartment {
                        compartment: compartment.to_string(),
                    });
                }
                tracing::debug!(
                    "Reading components of {} in build space {}",
                    compartment,
                    &captures[2]
                );
                current_compartment = Some(compartment.to_string());
                continue;
            }

            let Some(captures) = LEGACY_COMPONENT_LINE.captures(line) else {
                continue;
            };
            let compartment =
                current_compartment
                    .as_deref()
                    .ok_or_else(|| ToolError::ComponentBeforeCompartment {
                        line: line.trim().to_string(),
                    })?;

            let id = registry.get_or_create(&captures[2], &captures[1]);
            configuration.attach_component(registry, compartment, id)?;
            count += 1;
        }

        tracing::debug!("Read {} development components from listing", count);
        Ok(count)
    }
}

/// Reader matching the output format of a dialect.
pub fn listing_reader(kind: DialectKind) -> &'static dyn ComponentListingReader {
    match kind {
        DialectKind::Legacy => &LegacyListingReader,
        DialectKind::Modern => &ModernListingReader,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::compartment::{Compartment, CompartmentState};
    use crate::domain::component::ComponentKey;

    const MODERN_OUTPUT: &str = "\
Development components in build space DI0_Example_D:
1 dc1 example.com example.com_SC1_1
2 dc2 example.com example.com_SC1_1
3 tc/bi/anttasks sap.com sap.com_SAP_BUILDT_1
Elapsed time: 1234 ms
";

    const LEGACY_OUTPUT: &str = "\
Following are the DCs of compartment 'sap.com_SAP_BUILDT_1' of build space 'DI0_Example_D':
1. DC name: tc/bi/anttasks DC vendor: sap.com
Following are the DCs of compartment 'example.com_SC1_1' of build space 'DI0_Example_D':
1. DC name: dc1 DC vendor: example.com
2. DC name: dc2 DC vendor: example.com
listdcs took 312 ms
";

    fn configuration() -> DevelopmentConfiguration {
        let mut config = DevelopmentConfiguration::new("DI0_Example_D").unwrap();
        config.add_compartment(Compartment::from_name("sap.com_SAP_BUILDT_1", CompartmentState::Archive));
        config.add_compartment(Compartment::from_name("example.com_SC1_1", CompartmentState::Source));
        config
    }

    fn attachments(
        config: &DevelopmentConfiguration,
        registry: &ComponentRegistry,
    ) -> Vec<(String, String, String)> {
        let mut result: Vec<_> = config
            .development_components(registry)
            .map(|dc| {
                (
                    dc.vendor().to_string(),
                    dc.name().to_string(),
                    dc.compartment().unwrap_or_default().to_string(),
                )
            })
            .collect();
        result.sort();
        result
    }

    #[test]
    fn test_modern_reader_attaches_components() {
        let mut config = configuration();
        let mut registry = ComponentRegistry::new();

        let count = ModernListingReader
            .read(MODERN_OUTPUT, &mut config, &mut registry)
            .unwrap();

        assert_eq!(count, 3);
        assert_eq!(registry.len(), 3);
        let sc = config.compartment("example.com_SC1_1").unwrap();
        assert!(sc.contains(&ComponentKey::new("example.com", "dc1")));
        assert_eq!(
            registry.get("sap.com", "tc/bi/anttasks").unwrap().compartment(),
            Some("sap.com_SAP_BUILDT_1")
        );
    }

    #[test]
    fn test_modern_reader_rejects_unknown_compartment() {
        let mut config = configuration();
        let mut registry = ComponentRegistry::new();
        let output = "1 dc1 example.com example.com_SC1_1\n2 dc9 example.com example.com_SC9_1\n";

        let result = ModernListingReader.read(output, &mut config, &mut registry);

        assert!(matches!(
            result,
            Err(ToolError::UnknownCompartment { ref compartment }) if compartment == "example.com_SC9_1"
        ));
        assert_eq!(
            registry.get("example.com", "dc1").unwrap().compartment(),
            Some("example.com_SC1_1")
        );
    }

    #[test]
    fn test_modern_reader_skips_numbered_log_lines() {
        let mut config = configuration();
        let mut registry = ComponentRegistry::new();
        let output = "1 dc1 example.com example.com_SC1_1\n2 DCs were listed\n";

        let count = ModernListingReader
            .read(output, &mut config, &mut registry)
            .unwrap();

        assert_eq!(count, 1);
        assert_eq!(registry.len(), 1);
        assert!(registry.get("were", "DCs").is_none());
    }

    #[test]
    fn test_modern_reading_twice_matches_a_single_read() {
        let mut once_config = configuration();
        let mut once_registry = ComponentRegistry::new();
        ModernListingReader
            .read(MODERN_OUTPUT, &mut once_config, &mut once_registry)
            .unwrap();

        let mut twice_config = configuration();
        let mut twice_registry = ComponentRegistry::new();
        for _ in 0..2 {
            ModernListingReader
                .read(MODERN_OUTPUT, &mut twice_config, &mut twice_registry)
                .unwrap();
        }

        assert_eq!(twice_registry.len(), once_registry.len());
        assert_eq!(
            attachments(&twice_config, &twice_registry),
            attachments(&once_config, &once_registry)
        );
        for name in ["sap.com_SAP_BUILDT_1", "example.com_SC1_1"] {
            assert_eq!(
                twice_config.compartment(name).unwrap().components(),
                once_config.compartment(name).unwrap().components()
            );
        }
    }

    #[test]
    fn test_legacy_reader_follows_headers() {
        let mut config = configuration();
        let mut registry = ComponentRegistry::new();

        let count = LegacyListingReader
            .read(LEGACY_OUTPUT, &mut config, &mut registry)
            .unwrap();

        assert_eq!(count, 3);
        assert_eq!(
            attachments(&config, &registry),
            vec![
                ("example.com".into(), "dc1".into(), "example.com_SC1_1".into()),
                ("example.com".into(), "dc2".into(), "example.com_SC1_1".into()),
                ("sap.com".into(), "tc/bi/anttasks".into(), "sap.com_SAP_BUILDT_1".into()),
            ]
        );
    }

    #[test]
    fn test_legacy_component_before_header_fails() {
        let mut config = configuration();
        let mut registry = ComponentRegistry::new();
        let output = "1. DC name: dc1 DC vendor: example.com\n";

        let result = LegacyListingReader.read(output, &mut config, &mut registry);

        assert!(matches!(result, Err(ToolError::ComponentBeforeCompartment { .. })));
        assert!(config.compartment("example.com_SC1_1").unwrap().components().is_empty());
    }

    #[test]
    fn test_reading_twice_creates_no_duplicates() {
        let mut config = configuration();
        let mut registry = ComponentRegistry::new();

        LegacyListingReader.read(LEGACY_OUTPUT, &mut config, &mut registry).unwrap();
        let once = attachments(&config, &registry);
        LegacyListingReader.read(LEGACY_OUTPUT, &mut config, &mut registry).unwrap();

        assert_eq!(registry.len(), 3);
        assert_eq!(attachments(&config, &registry), once);
        assert_eq!(config.compartment("example.com_SC1_1").unwrap().components().len(), 2);
    }

    #[test]
    fn test_reader_for_dialect() {
        let mut config = configuration();
        let mut registry = ComponentRegistry::new();

        let count = listing_reader(DialectKind::Modern)
            .read(MODERN_OUTPUT, &mut config, &mut registry)
            .unwrap();
        assert_eq!(count, 3);

        let count = listing_reader(DialectKind::Legacy)
            .read(MODERN_OUTPUT, &mut config, &mut registry)
            .unwrap();
        assert_eq!(count, 0);
    }
}
