use crate::core::dialect::JdkHomeAlias;
use crate::domain::compartment::{Compartment, CompartmentState};
use crate::domain::component::ComponentType;
use crate::domain::configuration::{BuildVariant, DevelopmentConfiguration};
use crate::domain::ports::ToolConfigProvider;
use crate::domain::public_part::{PublicPart, PublicPartReference, PublicPartType};
use crate::domain::registry::ComponentRegistry;
use crate::utils::error::{Result, ToolError};
use crate::utils::validation::{
    validate_non_empty_string, validate_optional_url, validate_path, validate_required_field,
    Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Serialized form of a build graph plus the settings needed to drive the
/// component tool for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool: Option<ToolSettings>,
    pub configuration: ConfigurationSection,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_variant: Option<BuildVariantSection>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub compartments: Vec<CompartmentSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSettings {
    /// Installation directory of the component tool.
    pub home: String,
    /// Launcher below `home`; defaults to `dctool.sh`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executable: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
    pub user: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub workspace_base: String,
    /// JDK installation per JDK home alias, e.g. `"JDK1.6.0_HOME" = "/opt/jdk6"`.
    #[serde(default)]
    pub jdk_homes: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigurationSection {
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub caption: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub build_server_url: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub cms_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildVariantSection {
    pub name: String,
    #[serde(default = "default_required_for_activation")]
    pub required_for_activation: bool,
    #[serde(default)]
    pub options: BTreeMap<String, String>,
}

fn default_required_for_activation() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompartmentSection {
    pub name: String,
    pub state: CompartmentState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub software_component: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub caption: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub dtr_url: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub inactive_location: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub uses: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<ComponentSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentSection {
    pub vendor: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub caption: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub output_folder: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub source_folders: Vec<String>,
    #[serde(default)]
    pub needs_rebuild: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub public_parts: Vec<PublicPartSection>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<DependencySection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicPartSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r#type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencySection {
    pub vendor: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub public_part: String,
    #[serde(default)]
    pub build_time: bool,
    #[serde(default)]
    pub run_time: bool,
    #[serde(default)]
    pub deploy_time: bool,
}

impl GraphDocument {
    /// Loads a descriptor; `.json` files are read as JSON, anything else as
    /// TOML.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;

        if path.extension().is_some_and(|ext| ext == "json") {
            Self::from_json_str(&content)
        } else {
            Self::from_toml_str(&content)
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ToolError::ConfigParseError {
            field: "toml_parsing".to_string(),
            message: e.to_string(),
        })
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;
        Ok(serde_json::from_str(&processed_content)?)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| ToolError::ConfigParseError {
            field: "toml_writing".to_string(),
            message: e.to_string(),
        })
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = if path.extension().is_some_and(|ext| ext == "json") {
            self.to_json_string()?
        } else {
            self.to_toml_string()?
        };
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Replaces `${VAR}` with the value of the environment variable `VAR`.
    /// Unset variables are left as they are.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ToolError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_non_empty_string("configuration.name", &self.configuration.name)?;
        validate_optional_url("configuration.build_server_url", &self.configuration.build_server_url)?;
        validate_optional_url("configuration.cms_url", &self.configuration.cms_url)?;

        if let Some(tool) = &self.tool {
            tool.validate()?;
        }

        for compartment in &self.compartments {
            validate_non_empty_string("compartments.name", &compartment.name)?;
            validate_optional_url("compartments.dtr_url", &compartment.dtr_url)?;
            for component in &compartment.components {
                validate_non_empty_string("components.vendor", &component.vendor)?;
                validate_non_empty_string("components.name", &component.name)?;
            }
        }

        Ok(())
    }

    /// Builds the in-memory graph this document describes.
    pub fn to_graph(&self) -> Result<(DevelopmentConfiguration, ComponentRegistry)> {
        let section = &self.configuration;
        let mut configuration = DevelopmentConfiguration::new(&section.name)?;
        configuration.set_caption(&section.caption);
        configuration.set_description(&section.description);
        configuration.set_build_server_url(&section.build_server_url);
        configuration.set_cms_url(&section.cms_url);

        if let Some(variant) = &self.build_variant {
            let mut build_variant = BuildVariant::new(&variant.name, variant.required_for_activation);
            for (key, value) in &variant.options {
                build_variant.add_option(key, value);
            }
            configuration.set_build_variant(build_variant);
        }

        let mut registry = ComponentRegistry::new();
        for compartment in &self.compartments {
            configuration.add_compartment(compartment.to_compartment());
            for component in &compartment.components {
                component.register(&mut registry, &mut configuration, &compartment.name)?;
            }
        }

        tracing::debug!(
            "Loaded {} compartments with {} development components",
            configuration.compartments().len(),
            registry.len()
        );
        Ok((configuration, registry))
    }

    /// Describes an in-memory graph. Components that are not attached to a
    /// compartment of the configuration are not part of the document.
    pub fn from_graph(
        configuration: &DevelopmentConfiguration,
        registry: &ComponentRegistry,
        tool: Option<ToolSettings>,
    ) -> Self {
        let build_variant = configuration.build_variant().map(|variant| BuildVariantSection {
            name: variant.name().to_string(),
            required_for_activation: variant.is_required_for_activation(),
            options: variant.options().clone(),
        });

        let compartments = configuration
            .compartments()
            .iter()
            .map(|compartment| CompartmentSection {
                name: compartment.name().to_string(),
                state: compartment.state(),
                vendor: Some(compartment.vendor().to_string()),
                software_component: Some(compartment.software_component().to_string()),
                caption: compartment.caption().to_string(),
                dtr_url: compartment.dtr_url().to_string(),
                inactive_location: compartment.inactive_location().to_string(),
                uses: compartment.used_compartments().to_vec(),
                components: compartment
                    .components()
                    .iter()
                    .filter_map(|key| registry.get_by_key(key))
                    .map(ComponentSection::from_component)
                    .collect(),
            })
            .collect();

        Self {
            tool,
            configuration: ConfigurationSection {
                name: configuration.name().to_string(),
                caption: configuration.caption().to_string(),
                description: configuration.description().to_string(),
                build_server_url: configuration.build_server_url().to_string(),
                cms_url: configuration.cms_url().to_string(),
            },
            build_variant,
            compartments,
        }
    }
}

impl Validate for GraphDocument {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

impl CompartmentSection {
    fn to_compartment(&self) -> Compartment {
        let mut compartment = match (&self.vendor, &self.software_component) {
            (Some(vendor), Some(software_component)) => Compartment::new(
                &self.name,
                self.state,
                vendor,
                &self.caption,
                software_component,
            ),
            _ => {
                let mut compartment = Compartment::from_name(&self.name, self.state);
                compartment.set_caption(&self.caption);
                compartment
            }
        };

        compartment.set_dtr_url(&self.dtr_url);
        compartment.set_inactive_location(&self.inactive_location);
        for used in &self.uses {
            compartment.add_used_compartment(used);
        }
        compartment
    }
}

impl ComponentSection {
    fn register(
        &self,
        registry: &mut ComponentRegistry,
        configuration: &mut DevelopmentConfiguration,
        compartment: &str,
    ) -> Result<()> {
        let component_type = ComponentType::from_category(
            self.category.as_deref().unwrap_or_default(),
            self.subcategory.as_deref().unwrap_or_default(),
        );
        let id = registry.get_or_create_typed(&self.vendor, &self.name, component_type);

        let component = registry.component_mut(id);
        component.set_caption(&self.caption);
        component.set_description(&self.description);
        component.set_output_folder(&self.output_folder);
        component.set_needs_rebuild(self.needs_rebuild);
        for folder in &self.source_folders {
            component.add_source_folder(folder);
        }
        for part in &self.public_parts {
            component.add_public_part(part.to_public_part()?);
        }
        for dependency in &self.dependencies {
            component.add_dependency(
                PublicPartReference::new(&dependency.vendor, &dependency.name, &dependency.public_part)
                    .with_build_time(dependency.build_time)
                    .with_run_time(dependency.run_time)
                    .with_deploy_time(dependency.deploy_time),
            );
        }

        configuration.attach_component(registry, compartment, id)
    }

    fn from_component(component: &crate::domain::component::DevelopmentComponent) -> Self {
        let component_type = component.component_type();
        let known = component_type != ComponentType::Unknown;

        Self {
            vendor: component.vendor().to_string(),
            name: component.name().to_string(),
            category: known.then(|| component_type.category().to_string()),
            subcategory: known.then(|| component_type.subcategory().to_string()),
            caption: component.caption().to_string(),
            description: component.description().to_string(),
            output_folder: component.output_folder().to_string(),
            source_folders: component.source_folders().map(String::from).collect(),
            needs_rebuild: component.needs_rebuild(),
            public_parts: component
                .public_parts()
                .iter()
                .map(|part| PublicPartSection {
                    name: Some(part.name().to_string()),
                    r#type: Some(part.part_type().to_string()),
                    caption: Some(part.caption().to_string()),
                    description: Some(part.description().to_string()),
                })
                .collect(),
            dependencies: component
                .dependencies()
                .iter()
                .map(|reference| DependencySection {
                    vendor: reference.vendor().to_string(),
                    name: reference.component_name().to_string(),
                    public_part: reference.public_part_name().to_string(),
                    build_time: reference.is_at_build_time(),
                    run_time: reference.is_at_run_time(),
                    deploy_time: reference.is_at_deploy_time(),
                })
                .collect(),
        }
    }
}

impl PublicPartSection {
    fn to_public_part(&self) -> Result<PublicPart> {
        let part_type = self
            .r#type
            .as_deref()
            .map(str::parse::<PublicPartType>)
            .transpose()?;

        PublicPart::from_optional(
            self.name.as_deref(),
            self.caption.as_deref(),
            self.description.as_deref(),
            part_type,
        )
    }
}

impl ToolSettings {
    pub fn executable_path(&self) -> PathBuf {
        Path::new(&self.home).join(self.executable.as_deref().unwrap_or("dctool.sh"))
    }
}

impl Validate for ToolSettings {
    fn validate(&self) -> Result<()> {
        validate_path("tool.home", &self.home)?;
        validate_path("tool.workspace_base", &self.workspace_base)?;
        validate_non_empty_string("tool.user", &self.user)?;

        for (alias, path) in &self.jdk_homes {
            alias
                .parse::<JdkHomeAlias>()
                .map_err(|_| ToolError::InvalidConfigValueError {
                    field: "tool.jdk_homes".to_string(),
                    value: alias.clone(),
                    reason: "Unknown JDK home alias".to_string(),
                })?;
            validate_path("tool.jdk_homes", path)?;
        }

        Ok(())
    }
}

impl ToolConfigProvider for ToolSettings {
    fn tool_executable(&self) -> PathBuf {
        self.executable_path()
    }

    fn tool_args(&self) -> &[String] {
        &self.args
    }

    fn user(&self) -> &str {
        &self.user
    }

    fn password(&self) -> Result<&str> {
        validate_required_field("tool.password", &self.password).map(String::as_str)
    }

    fn workspace_base(&self) -> &str {
        &self.workspace_base
    }

    fn jdk_home(&self, alias: &str) -> Option<&str> {
        self.jdk_homes.get(alias).map(String::as_str)
    }
}
