use crate::core::builders::CommandBuilder;
use crate::core::dialect::Dialect;
use crate::domain::compartment::CompartmentState;
use crate::domain::component::ComponentKey;
use crate::domain::configuration::DevelopmentConfiguration;
use crate::domain::registry::ComponentRegistry;
use crate::utils::error::Result;
use std::collections::HashSet;

/// Build-infrastructure compartments that a clean copy synchronizes as a
/// whole in archive mode.
pub const FOUNDATION_COMPARTMENTS: &[&str] = &[
    "sap.com_SAP_BUILDT_1",
    "sap.com_SAP_JTECHS_1",
    "sap.com_ENGFACADE_1",
    "sap.com_FRAMEWORK_1",
    "sap.com_SAP-JEE_1",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncRequest {
    /// Synchronize archives used by source compartments instead of the
    /// source compartments themselves.
    pub archive_mode: bool,
    /// Replace whole compartments instead of single components.
    pub clean_copy: bool,
}

/// Statements that bring the local workspace in line with the build graph.
///
/// Archive mode syncs, as archives, every archive-compartment component
/// referenced from a source compartment. Source mode syncs the source
/// compartments: per component that needs a rebuild (unsync, then sync
/// inactive), or per compartment for a clean copy.
pub struct SyncCommandBuilder<'a> {
    configuration: &'a DevelopmentConfiguration,
    registry: &'a ComponentRegistry,
    dialect: &'a Dialect,
    request: SyncRequest,
}

impl<'a> SyncCommandBuilder<'a> {
    pub fn new(
        configuration: &'a DevelopmentConfiguration,
        registry: &'a ComponentRegistry,
        dialect: &'a Dialect,
        request: SyncRequest,
    ) -> Self {
        Self {
            configuration,
            registry,
            dialect,
            request,
        }
    }

    fn archive_commands(&self) -> Vec<String> {
        let mut commands = Vec::new();
        let mut synced_compartments: HashSet<&str> = HashSet::new();

        if self.request.clean_copy {
            for name in FOUNDATION_COMPARTMENTS {
                if self.configuration.compartment(name).is_some() {
                    commands.push(self.dialect.sync_all_archive(name));
                    synced_compartments.insert(*name);
                }
            }
        }

        let mut synced_components: HashSet<&ComponentKey> = HashSet::new();
        for (compartment, target) in self.referenced_archive_components() {
            if synced_compartments.contains(compartment) {
                continue;
            }
            if synced_components.insert(target) {
                commands.push(self.dialect.sync_component_archive(compartment, target));
            }
        }

        commands
    }

    /// Archive-compartment components referenced from source compartments,
    /// with their compartment, in discovery order. Unresolvable targets are
    /// skipped.
    fn referenced_archive_components(&self) -> Vec<(&'a str, &'a ComponentKey)> {
        let mut referenced = Vec::new();

        for compartment in self
            .configuration
            .compartments_in_state(CompartmentState::Source)
        {
            for key in compartment.components() {
                let Some(component) = self.registry.get_by_key(key) else {
                    continue;
                };

                for reference in component.dependencies() {
                    let Some(target) = self.registry.resolve(reference) else {
                        tracing::debug!("Skipping unresolved reference {} of {}", reference, key);
                        continue;
                    };
                    match self.configuration.compartment_of(target) {
                        Some(target_compartment) if target_compartment.is_archive() => {
                            referenced.push((target_compartment.name(), target.key()));
                        }
                        _ => continue,
                    }
                }
            }
        }

        referenced
    }

    fn source_commands(&self) -> Vec<String> {
        let mut commands = Vec::new();

        for compartment in self
            .configuration
            .compartments_in_state(CompartmentState::Source)
        {
            if self.request.clean_copy {
                commands.push(self.dialect.sync_all_inactive(compartment.name()));
                continue;
            }

            for key in compartment.components() {
                let needs_rebuild = self
                    .registry
                    .get_by_key(key)
                    .is_some_and(|component| component.needs_rebuild());

                if needs_rebuild {
                    commands.push(self.dialect.unsync_component(compartment.name(), key));
                    commands.push(self.dialect.sync_component_inactive(compartment.name(), key));
                }
            }
        }

        commands
    }
}

impl CommandBuilder for SyncCommandBuilder<'_> {
    fn build(&self) -> Result<Vec<String>> {
        let commands = if self.request.archive_mode {
            self.archive_commands()
        } else {
            self.source_commands()
        };

        tracing::info!(
            "Generated {} sync statements (archive mode: {}, clean copy: {})",
            commands.len(),
            self.request.archive_mode,
            self.request.clean_copy
        );
        Ok(commands)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dialect::{LEGACY, MODERN};
    use crate::domain::compartment::Compartment;
    use crate::domain::public_part::PublicPartReference;

    struct Graph {
        config: DevelopmentConfiguration,
        registry: ComponentRegistry,
    }

    impl Graph {
        fn new() -> Self {
            Self {
                config: DevelopmentConfiguration::new("DI0_Example_D").unwrap(),
                registry: ComponentRegistry::new(),
            }
        }

        fn compartment(&mut self, name: &str, state: CompartmentState) -> &mut Self {
            self.config.add_compartment(Compartment::from_name(name, state));
            self
        }

        fn component(&mut self, compartment: &str, vendor: &str, name: &str) -> &mut Self {
            let id = self.registry.get_or_create(vendor, name);
            self.config
                .attach_component(&mut self.registry, compartment, id)
                .unwrap();
            self
        }

        fn rebuild(&mut self, vendor: &str, name: &str) -> &mut Self {
            self.registry.get_mut(vendor, name).unwrap().set_needs_rebuild(true);
            self
        }

        fn uses(&mut self, from: (&str, &str), to: (&str, &str, &str)) -> &mut Self {
            self.registry
                .get_mut(from.0, from.1)
                .unwrap()
                .add_dependency(PublicPartReference::new(to.0, to.1, to.2).with_build_time(true));
            self
        }

        fn sync(&self, archive_mode: bool, clean_copy: bool) -> Vec<String> {
            SyncCommandBuilder::new(
                &self.config,
                &self.registry,
                &MODERN,
                SyncRequest {
                    archive_mode,
                    clean_copy,
                },
            )
            .build()
            .unwrap()
        }
    }

    #[test]
    fn test_rebuild_pairs_unsync_before_sync() {
        let mut graph = Graph::new();
        graph
            .compartment("example.com_SC1_1", CompartmentState::Source)
            .component("example.com_SC1_1", "example.com", "dc1")
            .rebuild("example.com", "dc1");

        assert_eq!(
            graph.sync(false, false),
            vec![
                "unsyncdc -c example.com_SC1_1 -n dc1 -v example.com -f",
                "syncdc -c example.com_SC1_1 -n dc1 -v example.com -m inactive -f",
            ]
        );
    }

    #[test]
    fn test_pairs_do_not_interleave() {
        let mut graph = Graph::new();
        graph
            .compartment("example.com_SC1_1", CompartmentState::Source)
            .component("example.com_SC1_1", "example.com", "dc1")
            .component("example.com_SC1_1", "example.com", "dc2")
            .component("example.com_SC1_1", "example.com", "dc3")
            .rebuild("example.com", "dc1")
            .rebuild("example.com", "dc3");

        let commands = graph.sync(false, false);

        assert_eq!(commands.len(), 4);
        assert!(commands[0].starts_with("unsyncdc") && commands[0].contains("-n dc1 "));
        assert!(commands[1].starts_with("syncdc") && commands[1].contains("-n dc1 "));
        assert!(commands[2].starts_with("unsyncdc") && commands[2].contains("-n dc3 "));
        assert!(commands[3].starts_with("syncdc") && commands[3].contains("-n dc3 "));
    }

    #[test]
    fn test_source_mode_ignores_archive_compartments() {
        let mut graph = Graph::new();
        graph
            .compartment("sap.com_SAP_BUILDT_1", CompartmentState::Archive)
            .component("sap.com_SAP_BUILDT_1", "sap.com", "tc/bi/anttasks")
            .rebuild("sap.com", "tc/bi/anttasks");

        assert!(graph.sync(false, false).is_empty());
    }

    #[test]
    fn test_clean_copy_syncs_whole_source_compartments() {
        let mut graph = Graph::new();
        graph
            .compartment("example.com_SC1_1", CompartmentState::Source)
            .compartment("sap.com_SAP_BUILDT_1", CompartmentState::Archive)
            .compartment("example.com_SC2_1", CompartmentState::Source)
            .component("example.com_SC1_1", "example.com", "dc1")
            .rebuild("example.com", "dc1");

        assert_eq!(
            graph.sync(false, true),
            vec![
                "syncalldcs -c example.com_SC1_1 -m inactive",
                "syncalldcs -c example.com_SC2_1 -m inactive",
            ]
        );
    }

    #[test]
    fn test_archive_mode_syncs_referenced_archive_components_once() {
        let mut graph = Graph::new();
        graph
            .compartment("example.com_SC1_1", CompartmentState::Source)
            .compartment("sap.com_SAP_JEE_1", CompartmentState::Archive)
            .compartment("example.com_SC2_1", CompartmentState::Source)
            .component("example.com_SC1_1", "example.com", "dc1")
            .component("example.com_SC1_1", "example.com", "dc2")
            .component("example.com_SC2_1", "example.com", "dc3")
            .component("sap.com_SAP_JEE_1", "sap.com", "tc/je/api")
            .component("sap.com_SAP_JEE_1", "sap.com", "tc/je/unused")
            .uses(("example.com", "dc1"), ("sap.com", "tc/je/api", "api"))
            .uses(("example.com", "dc2"), ("sap.com", "tc/je/api", "def"))
            .uses(("example.com", "dc1"), ("example.com", "dc3", ""))
            .uses(("example.com", "dc2"), ("sap.com", "tc/je/missing", "api"));

        assert_eq!(
            graph.sync(true, false),
            vec!["syncdc -c sap.com_SAP_JEE_1 -n tc/je/api -v sap.com -m archive"]
        );
    }

    #[test]
    fn test_archive_clean_copy_adds_present_foundation_compartments() {
        let mut graph = Graph::new();
        graph
            .compartment("example.com_SC1_1", CompartmentState::Source)
            .compartment("sap.com_SAP_BUILDT_1", CompartmentState::Archive)
            .compartment("sap.com_ENGFACADE_1", CompartmentState::Archive)
            .compartment("sap.com_SAP_JEE_1", CompartmentState::Archive)
            .component("example.com_SC1_1", "example.com", "dc1")
            .component("sap.com_SAP_BUILDT_1", "sap.com", "tc/bi/anttasks")
            .component("sap.com_SAP_JEE_1", "sap.com", "tc/je/api")
            .uses(("example.com", "dc1"), ("sap.com", "tc/bi/anttasks", "anttasks"))
            .uses(("example.com", "dc1"), ("sap.com", "tc/je/api", "api"));

        assert_eq!(
            graph.sync(true, true),
            vec![
                "syncalldcs -c sap.com_SAP_BUILDT_1 -m archive",
                "syncalldcs -c sap.com_ENGFACADE_1 -m archive",
                "syncdc -c sap.com_SAP_JEE_1 -n tc/je/api -v sap.com -m archive",
            ]
        );
    }

    #[test]
    fn test_state_change_moves_compartment_between_modes() {
        let mut graph = Graph::new();
        graph
            .compartment("example.com_SC1_1", CompartmentState::Archive)
            .component("example.com_SC1_1", "example.com", "dc1")
            .rebuild("example.com", "dc1");
        assert!(graph.sync(false, false).is_empty());

        graph
            .config
            .compartment_mut("example.com_SC1_1")
            .unwrap()
            .set_state(CompartmentState::Source);
        assert_eq!(graph.sync(false, false).len(), 2);
    }

    #[test]
    fn test_legacy_dialect_terminates_sync_statements() {
        let mut graph = Graph::new();
        graph
            .compartment("example.com_SC1_1", CompartmentState::Source)
            .component("example.com_SC1_1", "example.com", "dc1")
            .rebuild("example.com", "dc1");

        let commands = SyncCommandBuilder::new(
            &graph.config,
            &graph.registry,
            &LEGACY,
            SyncRequest::default(),
        )
        .build()
        .unwrap();

        assert_eq!(
            commands,
            vec![
                "unsyncdc -s example.com_SC1_1 -n dc1 -v example.com -f;",
                "syncdc -s example.com_SC1_1 -n dc1 -v example.com -m inactive -f;",
            ]
        );
    }
}
