use crate::domain::component::ComponentKey;
use crate::domain::registry::ComponentRegistry;
use crate::utils::error::{Result, ToolError};
use petgraph::algo::{kosaraju_scc, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{Bfs, Reversed, VisitMap};
use petgraph::Direction;
use std::collections::HashMap;

/// Dependency graph of the registered components. Edges point from a
/// component to the components it uses; node order is registry order.
pub struct ComponentGraph {
    graph: DiGraph<ComponentKey, ()>,
    nodes: HashMap<ComponentKey, NodeIndex>,
}

impl ComponentGraph {
    pub fn new(registry: &ComponentRegistry) -> Self {
        let mut graph = DiGraph::new();
        let mut nodes = HashMap::new();

        for component in registry.all() {
            let index = graph.add_node(component.key().clone());
            nodes.insert(component.key().clone(), index);
        }

        for component in registry.all() {
            let user = nodes[component.key()];
            for used in component.used_components() {
                match nodes.get(&used) {
                    Some(&target) if target != user => {
                        graph.update_edge(user, target, ());
                    }
                    Some(_) => {}
                    None => tracing::debug!("{} uses unregistered component {}", component.key(), used),
                }
            }
        }

        Self { graph, nodes }
    }

    /// Direct users of `key`, in registry order.
    pub fn users_of(&self, key: &ComponentKey) -> Vec<ComponentKey> {
        let Some(&index) = self.nodes.get(key) else {
            return Vec::new();
        };

        let mut users: Vec<NodeIndex> = self
            .graph
            .neighbors_directed(index, Direction::Incoming)
            .collect();
        users.sort();
        users.into_iter().map(|user| self.graph[user].clone()).collect()
    }

    /// `keys` and every component using one of them, directly or
    /// transitively, breadth first with the known seeds first.
    pub fn affected_by(&self, keys: &[ComponentKey]) -> Vec<ComponentKey> {
        let seeds: Vec<NodeIndex> = keys
            .iter()
            .filter_map(|key| {
                let index = self.nodes.get(key).copied();
                if index.is_none() {
                    tracing::debug!("Skipping unknown development component {}", key);
                }
                index
            })
            .collect();
        let Some(&first) = seeds.first() else {
            return Vec::new();
        };

        let reversed = Reversed(&self.graph);
        let mut bfs = Bfs::new(reversed, first);
        for &seed in &seeds[1..] {
            if bfs.discovered.visit(seed) {
                bfs.stack.push_back(seed);
            }
        }

        let mut affected = Vec::new();
        while let Some(index) = bfs.next(reversed) {
            affected.push(self.graph[index].clone());
        }
        affected
    }
}

/// Orders development components so that each one follows the components
/// it references. Only edges between members of the sorted set count.
pub struct DependencySorter<'a> {
    registry: &'a ComponentRegistry,
}

impl<'a> DependencySorter<'a> {
    pub fn new(registry: &'a ComponentRegistry) -> Self {
        Self { registry }
    }

    /// Unregistered keys have no edges. Duplicates are dropped.
    pub fn sort(&self, keys: &[ComponentKey]) -> Result<Vec<ComponentKey>> {
        // Edges point from a prerequisite to the member needing it.
        let mut graph: DiGraph<&ComponentKey, ()> = DiGraph::new();
        let mut nodes: HashMap<&ComponentKey, NodeIndex> = HashMap::new();
        for key in keys {
            if !nodes.contains_key(key) {
                nodes.insert(key, graph.add_node(key));
            }
        }

        for key in keys {
            let member = nodes[key];
            let Some(component) = self.registry.get_by_key(key) else {
                continue;
            };
            for used in component.used_components() {
                if let Some(&prerequisite) = nodes.get(&used) {
                    if prerequisite != member {
                        graph.update_edge(prerequisite, member, ());
                    }
                }
            }
        }

        match toposort(&graph, None) {
            Ok(order) => Ok(order.into_iter().map(|index| graph[index].clone()).collect()),
            Err(cycle) => {
                let mut members = kosaraju_scc(&graph)
                    .into_iter()
                    .find(|component| component.contains(&cycle.node_id()))
                    .unwrap_or_else(|| vec![cycle.node_id()]);
                members.sort();

                let components = members
                    .iter()
                    .map(|&index| graph[index].to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                Err(ToolError::DependencyCycle { components })
            }
        }
    }
}

/// Components that reference `key` through any public part.
pub fn using_components(registry: &ComponentRegistry, key: &ComponentKey) -> Vec<ComponentKey> {
    ComponentGraph::new(registry).users_of(key)
}

/// Flags the given components and, transitively, all components using
/// them as needing a rebuild. Returns every flagged key, seeds first.
pub fn mark_for_rebuild(registry: &mut ComponentRegistry, keys: &[ComponentKey]) -> Vec<ComponentKey> {
    let flagged = ComponentGraph::new(registry).affected_by(keys);

    for key in &flagged {
        if let Some(dc) = registry.get_mut(&key.vendor, &key.name) {
            dc.set_needs_rebuild(true);
        }
    }

    tracing::info!("{} development components need a rebuild", flagged.len());
    flagged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::public_part::PublicPartReference;

    fn key(name: &str) -> ComponentKey {
        ComponentKey::new("example.com", name)
    }

    fn depends(registry: &mut ComponentRegistry, from: &str, to: &str) {
        registry.get_or_create("example.com", to);
        let id = registry.get_or_create("example.com", from);
        registry
            .component_mut(id)
            .add_dependency(PublicPartReference::new("example.com", to, "api").with_build_time(true));
    }

    #[test]
    fn test_sort_puts_dependencies_first() {
        let mut registry = ComponentRegistry::new();
        depends(&mut registry, "app", "model");
        depends(&mut registry, "model", "util");

        let sorted = DependencySorter::new(&registry)
            .sort(&[key("app"), key("util"), key("model")])
            .unwrap();

        assert_eq!(sorted, vec![key("util"), key("model"), key("app")]);
    }

    #[test]
    fn test_sort_ignores_edges_leaving_the_set() {
        let mut registry = ComponentRegistry::new();
        depends(&mut registry, "app", "model");
        depends(&mut registry, "ui", "util");

        let sorted = DependencySorter::new(&registry)
            .sort(&[key("ui"), key("app"), key("ui")])
            .unwrap();

        assert_eq!(sorted.len(), 2);
        assert!(sorted.contains(&key("ui")));
        assert!(sorted.contains(&key("app")));
    }

    #[test]
    fn test_sort_reports_cycles() {
        let mut registry = ComponentRegistry::new();
        depends(&mut registry, "a", "b");
        depends(&mut registry, "b", "a");

        let result = DependencySorter::new(&registry).sort(&[key("a"), key("b")]);

        match result {
            Err(ToolError::DependencyCycle { components }) => {
                assert!(components.contains("example.com/a"));
                assert!(components.contains("example.com/b"));
            }
            other => panic!("expected a cycle, got {:?}", other),
        }
    }

    #[test]
    fn test_sort_reports_only_the_cycle_members() {
        let mut registry = ComponentRegistry::new();
        depends(&mut registry, "a", "b");
        depends(&mut registry, "b", "c");
        depends(&mut registry, "c", "b");

        let result = DependencySorter::new(&registry).sort(&[key("a"), key("b"), key("c")]);

        match result {
            Err(ToolError::DependencyCycle { components }) => {
                assert_eq!(components, "example.com/b, example.com/c");
            }
            other => panic!("expected a cycle, got {:?}", other),
        }
    }

    #[test]
    fn test_graph_ignores_self_references_and_unknown_targets() {
        let mut registry = ComponentRegistry::new();
        depends(&mut registry, "app", "app");
        let id = registry.get_or_create("example.com", "app");
        registry
            .component_mut(id)
            .add_dependency(PublicPartReference::new("sap.com", "missing", "api"));

        let graph = ComponentGraph::new(&registry);

        assert!(graph.users_of(&key("app")).is_empty());
        assert_eq!(graph.affected_by(&[key("app")]), vec![key("app")]);
        assert!(DependencySorter::new(&registry).sort(&[key("app")]).is_ok());
    }

    #[test]
    fn test_using_components() {
        let mut registry = ComponentRegistry::new();
        depends(&mut registry, "app", "model");
        depends(&mut registry, "ui", "model");

        let users = using_components(&registry, &key("model"));
        assert_eq!(users, vec![key("app"), key("ui")]);
    }

    #[test]
    fn test_mark_for_rebuild_is_transitive() {
        let mut registry = ComponentRegistry::new();
        depends(&mut registry, "model", "util");
        depends(&mut registry, "app", "model");
        registry.get_or_create("example.com", "other");

        let flagged = mark_for_rebuild(&mut registry, &[key("missing"), key("util")]);

        assert_eq!(flagged, vec![key("util"), key("model"), key("app")]);
        assert!(registry.get("example.com", "app").unwrap().needs_rebuild());
        assert!(!registry.get("example.com", "other").unwrap().needs_rebuild());
    }
}
