use crate::domain::public_part::{PublicPart, PublicPartReference};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Identity of a development component: vendor plus name, compared exactly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ComponentKey {
    pub vendor: String,
    pub name: String,
}

impl ComponentKey {
    pub fn new(vendor: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            vendor: vendor.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for ComponentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.vendor, self.name)
    }
}

impl From<&PublicPartReference> for ComponentKey {
    fn from(reference: &PublicPartReference) -> Self {
        ComponentKey::new(reference.vendor(), reference.component_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentType {
    Java,
    BuildPlugin,
    ExternalLibrary,
    Dictionary,
    WebDynpro,
    J2eeEjbModule,
    J2eeWebModule,
    J2eeEnterpriseApplication,
    J2eeServerLibrary,
    J2eeServerPrimaryLibrary,
    J2eeServerService,
    J2eeServerPrimaryService,
    J2eeServerInterface,
    J2eeServerPrimaryInterface,
    PortalApplicationModule,
    PortalApplicationStandalone,
    ProcessComposer,
    CompositeApplication,
    VisualComposer,
    WebServiceDeployableProxy,
    Unknown,
}

const KNOWN_TYPES: &[(ComponentType, &str, &str)] = &[
    (ComponentType::Java, "Java", ""),
    (ComponentType::BuildPlugin, "Build Plugin", ""),
    (ComponentType::ExternalLibrary, "External Library", ""),
    (ComponentType::Dictionary, "Dictionary", ""),
    (ComponentType::WebDynpro, "Web Dynpro", ""),
    (ComponentType::J2eeEjbModule, "J2EE", "EJBModule"),
    (ComponentType::J2eeWebModule, "J2EE", "WebModule"),
    (
        ComponentType::J2eeEnterpriseApplication,
        "J2EE",
        "Enterprise Application",
    ),
    (
        ComponentType::J2eeServerLibrary,
        "J2EE Server Component",
        "Library",
    ),
    (
        ComponentType::J2eeServerPrimaryLibrary,
        "J2EE Server Component",
        "Primary Library",
    ),
    (
        ComponentType::J2eeServerService,
        "J2EE Server Component",
        "Service",
    ),
    (
        ComponentType::J2eeServerPrimaryService,
        "J2EE Server Component",
        "Primary Service",
    ),
    (
        ComponentType::J2eeServerInterface,
        "J2EE Server Component",
        "Interface",
    ),
    (
        ComponentType::J2eeServerPrimaryInterface,
        "J2EE Server Component",
        "Primary Interface",
    ),
    (
        ComponentType::PortalApplicationModule,
        "Enterprise Portal",
        "Portal Application Module",
    ),
    (
        ComponentType::PortalApplicationStandalone,
        "Enterprise Portal",
        "Portal Application Standalone",
    ),
    (
        ComponentType::ProcessComposer,
        "Composite Application",
        "Process Composer",
    ),
    (
        ComponentType::CompositeApplication,
        "Composite Application",
        "",
    ),
    (ComponentType::VisualComposer, "Visual Composer", ""),
    (
        ComponentType::WebServiceDeployableProxy,
        "Web Service",
        "Deployable Proxy",
    ),
];

impl ComponentType {
    /// Maps the tool's (category, subcategory) pair to a type.
    ///
    /// Pairs outside the known set yield [`ComponentType::Unknown`].
    pub fn from_category(category: &str, subcategory: &str) -> Self {
        KNOWN_TYPES
            .iter()
            .find(|(_, known_category, known_subcategory)| {
                *known_category == category && *known_subcategory == subcategory
            })
            .map(|(component_type, _, _)| *component_type)
            .unwrap_or(ComponentType::Unknown)
    }

    pub fn category(&self) -> &'static str {
        self.pair().0
    }

    pub fn subcategory(&self) -> &'static str {
        self.pair().1
    }

    fn pair(&self) -> (&'static str, &'static str) {
        KNOWN_TYPES
            .iter()
            .find(|(component_type, _, _)| component_type == self)
            .map(|(_, category, subcategory)| (*category, *subcategory))
            .unwrap_or(("", ""))
    }
}

/// A buildable unit of the build graph.
///
/// Instances are handed out by the
/// [`ComponentRegistry`](crate::domain::registry::ComponentRegistry) so that
/// every code path works on the same object for a given [`ComponentKey`].
#[derive(Debug, Clone)]
pub struct DevelopmentComponent {
    key: ComponentKey,
    component_type: ComponentType,
    caption: String,
    description: String,
    output_folder: String,
    source_folders: BTreeSet<String>,
    needs_rebuild: bool,
    public_parts: Vec<PublicPart>,
    dependencies: Vec<PublicPartReference>,
    compartment: Option<String>,
}

impl DevelopmentComponent {
    pub(crate) fn new(key: ComponentKey, component_type: ComponentType) -> Self {
        Self {
            key,
            component_type,
            caption: String::new(),
            description: String::new(),
            output_folder: String::new(),
            source_folders: BTreeSet::new(),
            needs_rebuild: false,
            public_parts: Vec::new(),
            dependencies: Vec::new(),
            compartment: None,
        }
    }

    pub fn key(&self) -> &ComponentKey {
        &self.key
    }

    pub fn vendor(&self) -> &str {
        &self.key.vendor
    }

    pub fn name(&self) -> &str {
        &self.key.name
    }

    pub fn component_type(&self) -> ComponentType {
        self.component_type
    }

    pub fn set_component_type(&mut self, component_type: ComponentType) {
        self.component_type = component_type;
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

    pub fn output_folder(&self) -> &str {
        &self.output_folder
    }

    pub fn set_output_folder(&mut self, output_folder: impl Into<String>) {
        self.output_folder = output_folder.into();
    }

    /// Returns `false` when the folder was already known.
    pub fn add_source_folder(&mut self, folder: impl Into<String>) -> bool {
        self.source_folders.insert(folder.into())
    }

    pub fn source_folders(&self) -> impl Iterator<Item = &str> {
        self.source_folders.iter().map(String::as_str)
    }

    pub fn needs_rebuild(&self) -> bool {
        self.needs_rebuild
    }

    pub fn set_needs_rebuild(&mut self, needs_rebuild: bool) {
        self.needs_rebuild = needs_rebuild;
    }

    /// Adds a public part unless one with the same name is already exposed.
    pub fn add_public_part(&mut self, public_part: PublicPart) -> bool {
        if self.public_part(public_part.name()).is_some() {
            return false;
        }
        self.public_parts.push(public_part);
        true
    }

    pub fn public_part(&self, name: &str) -> Option<&PublicPart> {
        self.public_parts.iter().find(|part| part.name() == name)
    }

    pub fn public_part_mut(&mut self, name: &str) -> Option<&mut PublicPart> {
        self.public_parts.iter_mut().find(|part| part.name() == name)
    }

    pub fn public_parts(&self) -> &[PublicPart] {
        &self.public_parts
    }

    /// Adds a dependency edge, or merges its usage flags into the edge that
    /// already targets the same public part. Returns the stored edge.
    pub fn add_dependency(&mut self, reference: PublicPartReference) -> &mut PublicPartReference {
        match self.dependencies.iter().position(|known| *known == reference) {
            Some(index) => {
                let known = &mut self.dependencies[index];
                known.merge_flags(&reference);
                known
            }
            None => {
                self.dependencies.push(reference);
                let last = self.dependencies.len() - 1;
                &mut self.dependencies[last]
            }
        }
    }

    pub fn dependencies(&self) -> &[PublicPartReference] {
        &self.dependencies
    }

    /// Distinct components this one references, in first-reference order.
    pub fn used_components(&self) -> Vec<ComponentKey> {
        let mut used: Vec<ComponentKey> = Vec::new();
        for reference in &self.dependencies {
            let key = ComponentKey::from(reference);
            if !used.contains(&key) {
                used.push(key);
            }
        }
        used
    }

    pub fn uses(&self, key: &ComponentKey) -> bool {
        self.dependencies
            .iter()
            .any(|reference| reference.targets(&key.vendor, &key.name))
    }

    /// Name of the compartment this component belongs to, if attached.
    pub fn compartment(&self) -> Option<&str> {
        self.compartment.as_deref()
    }

    /// Records the owning compartment. The first assignment wins; returns
    /// `false` if the component already belongs to another compartment.
    pub(crate) fn attach_to(&mut self, compartment: &str) -> bool {
        match &self.compartment {
            Some(current) => current == compartment,
            None => {
                self.compartment = Some(compartment.to_string());
                true
            }
        }
    }
}

impl PartialEq for DevelopmentComponent {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for DevelopmentComponent {}

impl std::hash::Hash for DevelopmentComponent {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::public_part::PublicPartType;

    fn component(vendor: &str, name: &str) -> DevelopmentComponent {
        DevelopmentComponent::new(ComponentKey::new(vendor, name), ComponentType::Unknown)
    }

    #[test]
    fn test_known_type_pairs() {
        assert_eq!(
            ComponentType::from_category("J2EE Server Component", "Primary Library"),
            ComponentType::J2eeServerPrimaryLibrary
        );
        assert_eq!(
            ComponentType::from_category("Web Dynpro", ""),
            ComponentType::WebDynpro
        );
        assert_eq!(ComponentType::J2eeWebModule.category(), "J2EE");
        assert_eq!(ComponentType::J2eeWebModule.subcategory(), "WebModule");
    }

    #[test]
    fn test_unknown_type_pair_maps_to_unknown() {
        assert_eq!(
            ComponentType::from_category("J2EE", "Connector"),
            ComponentType::Unknown
        );
        assert_eq!(ComponentType::Unknown.category(), "");
    }

    #[test]
    fn test_identity_is_vendor_and_name() {
        let mut left = component("example.com", "dc1");
        left.set_caption("first");
        left.set_needs_rebuild(true);
        let right = component("example.com", "dc1");

        assert_eq!(left, right);
        assert_ne!(left, component("Example.com", "dc1"));
    }

    #[test]
    fn test_source_folders_suppress_duplicates() {
        let mut dc = component("example.com", "dc1");

        assert!(dc.add_source_folder("src/packages"));
        assert!(dc.add_source_folder("source"));
        assert!(!dc.add_source_folder("src/packages"));
        assert_eq!(dc.source_folders().count(), 2);
    }

    #[test]
    fn test_add_dependency_merges_flags() {
        let mut dc = component("example.com", "dc1");
        dc.add_dependency(PublicPartReference::new("sap.com", "tc/je/api", "api").with_build_time(true));
        dc.add_dependency(PublicPartReference::new("sap.com", "tc/je/api", "api").with_run_time(true))
            .set_at_deploy_time(true);

        assert_eq!(dc.dependencies().len(), 1);
        let edge = &dc.dependencies()[0];
        assert!(edge.is_at_build_time());
        assert!(edge.is_at_run_time());
        assert!(edge.is_at_deploy_time());
    }

    #[test]
    fn test_used_components_are_distinct() {
        let mut dc = component("example.com", "dc1");
        dc.add_dependency(PublicPartReference::new("sap.com", "tc/je/api", "api"));
        dc.add_dependency(PublicPartReference::new("sap.com", "tc/je/api", "def"));
        dc.add_dependency(PublicPartReference::new("example.com", "dc2", ""));

        assert_eq!(
            dc.used_components(),
            vec![
                ComponentKey::new("sap.com", "tc/je/api"),
                ComponentKey::new("example.com", "dc2")
            ]
        );
        assert!(dc.uses(&ComponentKey::new("example.com", "dc2")));
    }

    #[test]
    fn test_public_parts_are_unique_by_name() {
        let mut dc = component("example.com", "dc1");

        assert!(dc.add_public_part(PublicPart::new("api", "", "", PublicPartType::Compilation)));
        assert!(!dc.add_public_part(PublicPart::new("api", "", "", PublicPartType::Assembly)));
        dc.public_part_mut("api").unwrap().set_caption("API");

        assert_eq!(dc.public_parts().len(), 1);
        assert_eq!(dc.public_part("api").unwrap().caption(), "API");
    }

    #[test]
    fn test_compartment_is_set_once() {
        let mut dc = component("example.com", "dc1");

        assert!(dc.attach_to("example.com_SC1_1"));
        assert!(dc.attach_to("example.com_SC1_1"));
        assert!(!dc.attach_to("example.com_SC2_1"));
        assert_eq!(dc.compartment(), Some("example.com_SC1_1"));
    }
}
