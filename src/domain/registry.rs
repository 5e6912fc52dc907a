use crate::domain::component::{ComponentKey, ComponentType, DevelopmentComponent};
use crate::domain::public_part::PublicPartReference;
use std::collections::HashMap;

/// Handle to a component owned by a [`ComponentRegistry`].
///
/// Only meaningful for the registry that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(usize);

/// Session-scoped cache of development components keyed by vendor and name.
///
/// The first lookup of a key creates the component; every later lookup,
/// from whichever reader or builder, yields the same handle. Nothing is ever
/// evicted.
#[derive(Debug, Default, Clone)]
pub struct ComponentRegistry {
    components: Vec<DevelopmentComponent>,
    index: HashMap<ComponentKey, ComponentId>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_create(&mut self, vendor: &str, name: &str) -> ComponentId {
        self.get_or_create_typed(vendor, name, ComponentType::Unknown)
    }

    /// Like [`get_or_create`](Self::get_or_create). A known type replaces an
    /// `Unknown` one on an existing component, never the other way round.
    pub fn get_or_create_typed(
        &mut self,
        vendor: &str,
        name: &str,
        component_type: ComponentType,
    ) -> ComponentId {
        let key = ComponentKey::new(vendor, name);

        if let Some(&id) = self.index.get(&key) {
            let component = &mut self.components[id.0];
            if component.component_type() == ComponentType::Unknown
                && component_type != ComponentType::Unknown
            {
                component.set_component_type(component_type);
            }
            return id;
        }

        let id = ComponentId(self.components.len());
        tracing::debug!("Registering development component {}", key);
        self.components
            .push(DevelopmentComponent::new(key.clone(), component_type));
        self.index.insert(key, id);
        id
    }

    pub fn id_of(&self, vendor: &str, name: &str) -> Option<ComponentId> {
        self.index.get(&ComponentKey::new(vendor, name)).copied()
    }

    pub fn get(&self, vendor: &str, name: &str) -> Option<&DevelopmentComponent> {
        self.id_of(vendor, name).map(|id| &self.components[id.0])
    }

    pub fn get_mut(&mut self, vendor: &str, name: &str) -> Option<&mut DevelopmentComponent> {
        let id = self.id_of(vendor, name)?;
        Some(&mut self.components[id.0])
    }

    pub fn get_by_key(&self, key: &ComponentKey) -> Option<&DevelopmentComponent> {
        self.index.get(key).map(|id| &self.components[id.0])
    }

    /// Target component of a dependency edge, if it is known.
    pub fn resolve(&self, reference: &PublicPartReference) -> Option<&DevelopmentComponent> {
        self.get(reference.vendor(), reference.component_name())
    }

    pub fn component(&self, id: ComponentId) -> &DevelopmentComponent {
        &self.components[id.0]
    }

    pub fn component_mut(&mut self, id: ComponentId) -> &mut DevelopmentComponent {
        &mut self.components[id.0]
    }

    /// All known components in registration order.
    pub fn all(&self) -> impl Iterator<Item = &DevelopmentComponent> {
        self.components.iter()
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}
