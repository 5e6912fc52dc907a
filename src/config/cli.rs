use crate::core::builders::SyncRequest;
use crate::core::dialect::DialectKind;
use crate::domain::component::ComponentKey;
use crate::utils::error::{Result, ToolError};
use crate::utils::validation::{validate_path, Validate};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

pub const DEFAULT_DESCRIPTOR: &str = "buildspace.toml";

#[derive(Debug, Parser)]
#[command(name = "dc-buildspace")]
#[command(about = "Generate and run component tool scripts for a development configuration")]
pub struct CliArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Write logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the component tool script for an operation without running it
    Script {
        /// Path to the graph descriptor (TOML or JSON)
        #[arg(short, long, default_value = DEFAULT_DESCRIPTOR)]
        descriptor: PathBuf,

        #[command(subcommand)]
        operation: Operation,
    },
    /// Run an operation through the component tool
    Run {
        /// Path to the graph descriptor (TOML or JSON)
        #[arg(short, long, default_value = DEFAULT_DESCRIPTOR)]
        descriptor: PathBuf,

        /// Write the resulting graph to this descriptor file
        #[arg(long)]
        save: Option<PathBuf>,

        #[command(subcommand)]
        operation: Operation,
    },
    /// Read captured tool output
    Parse {
        #[command(subcommand)]
        listing: Listing,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum Operation {
    /// List the components of every compartment
    List,
    /// Build components in dependency order
    Build {
        /// Components as vendor/name; defaults to every component needing a rebuild
        #[arg(value_parser = parse_component_key)]
        components: Vec<ComponentKey>,
    },
    /// Synchronize compartments into the workspace
    Sync {
        /// Sync archive compartments instead of source compartments
        #[arg(long)]
        archive: bool,

        /// Synchronize whole compartments instead of single components
        #[arg(long)]
        clean_copy: bool,
    },
}

impl Operation {
    pub fn sync_request(&self) -> Option<SyncRequest> {
        match self {
            Operation::Sync {
                archive,
                clean_copy,
            } => Some(SyncRequest {
                archive_mode: *archive,
                clean_copy: *clean_copy,
            }),
            _ => None,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Listing {
    /// Build spaces printed by the build-space tool
    Buildspaces { file: PathBuf },
    /// Compartments and their states printed by the build-space tool
    Compartments { file: PathBuf },
    /// Component listing printed by the component tool
    Components {
        file: PathBuf,

        /// Descriptor declaring the compartments of the listing
        #[arg(short, long, default_value = DEFAULT_DESCRIPTOR)]
        descriptor: PathBuf,

        /// Output format of the component tool
        #[arg(long, value_enum, default_value_t = ListingFormat::Modern)]
        format: ListingFormat,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ListingFormat {
    Legacy,
    Modern,
}

impl From<ListingFormat> for DialectKind {
    fn from(format: ListingFormat) -> Self {
        match format {
            ListingFormat::Legacy => DialectKind::Legacy,
            ListingFormat::Modern => DialectKind::Modern,
        }
    }
}

/// Splits `vendor/name` at the first slash; component names may contain
/// further slashes.
pub fn parse_component_key(text: &str) -> Result<ComponentKey> {
    match text.split_once('/') {
        Some((vendor, name)) if !vendor.is_empty() && !name.is_empty() => {
            Ok(ComponentKey::new(vendor, name))
        }
        _ => Err(ToolError::InvalidConfigValueError {
            field: "components".to_string(),
            value: text.to_string(),
            reason: "Expected <vendor>/<component name>".to_string(),
        }),
    }
}

impl Validate for CliArgs {
    fn validate(&self) -> Result<()> {
        match &self.command {
            Command::Script { descriptor, .. } => {
                validate_path("descriptor", &descriptor.to_string_lossy())
            }
            Command::Run {
                descriptor, save, ..
            } => {
                validate_path("descriptor", &descriptor.to_string_lossy())?;
                if let Some(save) = save {
                    validate_path("save", &save.to_string_lossy())?;
                }
                Ok(())
            }
            Command::Parse { listing } => match listing {
                Listing::Buildspaces { file } | Listing::Compartments { file } => {
                    validate_path("file", &file.to_string_lossy())
                }
                Listing::Components {
                    file, descriptor, ..
                } => {
                    validate_path("file", &file.to_string_lossy())?;
                    validate_path("descriptor", &descriptor.to_string_lossy())
                }
            },
        }
    }
}
