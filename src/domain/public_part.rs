use crate::utils::error::{Result, ToolError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// Purpose of a public part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublicPartType {
    /// Classes and resources needed to compile against the component.
    Compilation,
    /// Content packaged into the using component's deployable archive.
    Assembly,
    /// Build-infrastructure only, e.g. ant tasks or build plugins.
    Infrastructure,
}

impl PublicPartType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PublicPartType::Compilation => "compilation",
            PublicPartType::Assembly => "assembly",
            PublicPartType::Infrastructure => "infrastructure",
        }
    }
}

impl fmt::Display for PublicPartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PublicPartType {
    type Err = ToolError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compilation" | "compile" => Ok(PublicPartType::Compilation),
            "assembly" => Ok(PublicPartType::Assembly),
            "infrastructure" => Ok(PublicPartType::Infrastructure),
            _ => Err(ToolError::UnknownPublicPartType {
                value: value.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicPart {
    name: String,
    caption: String,
    description: String,
    part_type: PublicPartType,
}

impl PublicPart {
    pub fn new(
        name: impl Into<String>,
        caption: impl Into<String>,
        description: impl Into<String>,
        part_type: PublicPartType,
    ) -> Self {
        Self {
            name: name.into(),
            caption: caption.into(),
            description: description.into(),
            part_type,
        }
    }

    /// Builds a public part from possibly incomplete descriptor data.
    ///
    /// Absent texts become empty strings; an absent type is rejected.
    pub fn from_optional(
        name: Option<&str>,
        caption: Option<&str>,
        description: Option<&str>,
        part_type: Option<PublicPartType>,
    ) -> Result<Self> {
        let name = name.unwrap_or_default();
        let part_type = part_type.ok_or_else(|| ToolError::MissingPublicPartType {
            name: name.to_string(),
        })?;

        Ok(Self::new(
            name,
            caption.unwrap_or_default(),
            description.unwrap_or_default(),
            part_type,
        ))
    }

    pub fn name(&self) -> &str {
        &self.name
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

    pub fn part_type(&self) -> PublicPartType {
        self.part_type
    }
}

/// Dependency edge to a public part of another development component.
///
/// Two references are the same edge when vendor, component name and public
/// part name match; the usage flags are ignored by `Eq` and `Hash`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicPartReference {
    vendor: String,
    component_name: String,
    public_part_name: String,
    at_build_time: bool,
    at_run_time: bool,
    at_deploy_time: bool,
}

impl PublicPartReference {
    /// An empty `public_part_name` references the component as a whole.
    pub fn new(
        vendor: impl Into<String>,
        component_name: impl Into<String>,
        public_part_name: impl Into<String>,
    ) -> Self {
        Self {
            vendor: vendor.into(),
            component_name: component_name.into(),
            public_part_name: public_part_name.into(),
            at_build_time: false,
            at_run_time: false,
            at_deploy_time: false,
        }
    }

    pub fn with_build_time(mut self, at_build_time: bool) -> Self {
        self.at_build_time = at_build_time;
        self
    }

    pub fn with_run_time(mut self, at_run_time: bool) -> Self {
        self.at_run_time = at_run_time;
        self
    }

    pub fn with_deploy_time(mut self, at_deploy_time: bool) -> Self {
        self.at_deploy_time = at_deploy_time;
        self
    }

    pub fn vendor(&self) -> &str {
        &self.vendor
    }

    pub fn component_name(&self) -> &str {
        &self.component_name
    }

    pub fn public_part_name(&self) -> &str {
        &self.public_part_name
    }

    pub fn is_at_build_time(&self) -> bool {
        self.at_build_time
    }

    pub fn set_at_build_time(&mut self, at_build_time: bool) {
        self.at_build_time = at_build_time;
    }

    pub fn is_at_run_time(&self) -> bool {
        self.at_run_time
    }

    pub fn set_at_run_time(&mut self, at_run_time: bool) {
        self.at_run_time = at_run_time;
    }

    pub fn is_at_deploy_time(&self) -> bool {
        self.at_deploy_time
    }

    pub fn set_at_deploy_time(&mut self, at_deploy_time: bool) {
        self.at_deploy_time = at_deploy_time;
    }

    /// Copies every flag that is set on `other` onto this reference.
    pub fn merge_flags(&mut self, other: &PublicPartReference) {
        self.at_build_time |= other.at_build_time;
        self.at_run_time |= other.at_run_time;
        self.at_deploy_time |= other.at_deploy_time;
    }

    pub fn targets(&self, vendor: &str, component_name: &str) -> bool {
        self.vendor == vendor && self.component_name == component_name
    }
}

impl PartialEq for PublicPartReference {
    fn eq(&self, other: &Self) -> bool {
        self.vendor == other.vendor
            && self.component_name == other.component_name
            && self.public_part_name == other.public_part_name
    }
}

impl Eq for PublicPartReference {}

impl Hash for PublicPartReference {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.vendor.hash(state);
        self.component_name.hash(state);
        self.public_part_name.hash(state);
    }
}

impl fmt::Display for PublicPartReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.public_part_name.is_empty() {
            write!(f, "{}/{}", self.vendor, self.component_name)
        } else {
            write!(
                f,
                "{}/{}:{}",
                self.vendor, self.component_name, self.public_part_name
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_missing_type_is_rejected() {
        let result = PublicPart::from_optional(Some("api"), None, None, None);
        assert!(matches!(
            result,
            Err(ToolError::MissingPublicPartType { ref name }) if name == "api"
        ));
    }

    #[test]
    fn test_missing_texts_default_to_empty() {
        let part =
            PublicPart::from_optional(None, None, None, Some(PublicPartType::Assembly)).unwrap();

        assert_eq!(part.name(), "");
        assert_eq!(part.caption(), "");
        assert_eq!(part.description(), "");
        assert_eq!(part.part_type(), PublicPartType::Assembly);
    }

    #[test]
    fn test_reference_equality_ignores_flags() {
        let build = PublicPartReference::new("sap.com", "tc/bl/logging/api", "api")
            .with_build_time(true);
        let run = PublicPartReference::new("sap.com", "tc/bl/logging/api", "api")
            .with_run_time(true);

        assert_eq!(build, run);

        let mut edges = HashSet::new();
        edges.insert(build);
        assert!(!edges.insert(run));
    }

    #[test]
    fn test_reference_to_other_public_part_is_distinct() {
        let api = PublicPartReference::new("sap.com", "tc/bl/logging/api", "api");
        let default = PublicPartReference::new("sap.com", "tc/bl/logging/api", "");

        assert_ne!(api, default);
        assert_eq!(default.to_string(), "sap.com/tc/bl/logging/api");
    }

    #[test]
    fn test_merge_flags() {
        let mut edge = PublicPartReference::new("sap.com", "dc", "").with_build_time(true);
        edge.merge_flags(&PublicPartReference::new("sap.com", "dc", "").with_deploy_time(true));

        assert!(edge.is_at_build_time());
        assert!(!edge.is_at_run_time());
        assert!(edge.is_at_deploy_time());
    }

    #[test]
    fn test_public_part_type_from_str() {
        assert_eq!(
            "COMPILATION".parse::<PublicPartType>().unwrap(),
            PublicPartType::Compilation
        );
        assert!("runtime".parse::<PublicPartType>().is_err());
    }
}
