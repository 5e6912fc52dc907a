use thiserror::Error;

#[derive(Error, Debug)]
pub enum ToolError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("No dialect known for JDK home alias '{alias}'")]
    DialectResolution { alias: String },

    #[error("Build variant '{variant}' does not define build option '{option}'")]
    MissingBuildOption { variant: String, option: String },

    #[error("Development component {vendor}/{name} is not attached to a compartment")]
    MissingCompartment { vendor: String, name: String },

    #[error("Compartment '{compartment}' does not exist in the development configuration")]
    UnknownCompartment { compartment: String },

    #[error("Development component line read before any compartment header: '{line}'")]
    ComponentBeforeCompartment { line: String },

    #[error("Unknown compartment state '{text}'")]
    UnknownCompartmentState { text: String },

    #[error("Unknown public part type '{value}'")]
    UnknownPublicPartType { value: String },

    #[error("Public part '{name}' has no type")]
    MissingPublicPartType { name: String },

    #[error("Dependency cycle between development components: {components}")]
    DependencyCycle { components: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration parse error in '{field}': {message}")]
    ConfigParseError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration '{field}'")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    ReferentialIntegrity,
    Io,
    Serialization,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ToolError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ToolError::IoError(_) => ErrorCategory::Io,
            ToolError::SerializationError(_) | ToolError::ConfigParseError { .. } => {
                ErrorCategory::Serialization
            }
            ToolError::UnknownCompartment { .. }
            | ToolError::ComponentBeforeCompartment { .. }
            | ToolError::DependencyCycle { .. } => ErrorCategory::ReferentialIntegrity,
            _ => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Io => ErrorSeverity::Critical,
            ErrorCategory::ReferentialIntegrity => ErrorSeverity::High,
            ErrorCategory::Configuration | ErrorCategory::Serialization => ErrorSeverity::High,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            ToolError::DialectResolution { alias } => format!(
                "Set the build variant's JDK home alias to a supported value instead of '{}'",
                alias
            ),
            ToolError::MissingBuildOption { option, .. } => {
                format!("Add the build option '{}' to the active build variant", option)
            }
            ToolError::MissingCompartment { vendor, name } => format!(
                "Refresh the component listing so that {}/{} is assigned to its compartment",
                vendor, name
            ),
            ToolError::UnknownCompartment { compartment } => format!(
                "Add compartment '{}' to the development configuration before parsing tool output",
                compartment
            ),
            ToolError::ComponentBeforeCompartment { .. } => {
                "Discard the graph from this parse and re-run the listing command".to_string()
            }
            ToolError::DependencyCycle { .. } => {
                "Break the cycle in the public part references of the listed components"
                    .to_string()
            }
            ToolError::IoError(_) => "Check file paths and permissions".to_string(),
            ToolError::SerializationError(_) | ToolError::ConfigParseError { .. } => {
                "Check the descriptor syntax".to_string()
            }
            _ => "Check the build graph descriptor".to_string(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::ReferentialIntegrity => format!("Inconsistent build graph: {}", self),
            ErrorCategory::Io => format!("File system problem: {}", self),
            ErrorCategory::Serialization => format!("Could not read descriptor: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, ToolError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_compartment_names_component() {
        let error = ToolError::MissingCompartment {
            vendor: "example.com".to_string(),
            name: "dc1".to_string(),
        };

        assert!(error.to_string().contains("example.com/dc1"));
        assert_eq!(error.category(), ErrorCategory::Configuration);
    }

    #[test]
    fn test_parse_failures_are_referential_integrity() {
        let error = ToolError::ComponentBeforeCompartment {
            line: "1. DC name: dc1 DC vendor: example.com".to_string(),
        };

        assert_eq!(error.category(), ErrorCategory::ReferentialIntegrity);
        assert_eq!(error.severity(), ErrorSeverity::High);
    }
}
