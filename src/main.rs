use clap::Parser;
use dc_buildspace::config::cli::{CliArgs, Command, Listing, Operation};
use dc_buildspace::core::parsers::{listing_reader, parse_build_spaces, parse_compartments};
use dc_buildspace::domain::{mark_for_rebuild, ComponentKey, DependencySorter};
use dc_buildspace::utils::error::{ErrorSeverity, Result, ToolError};
use dc_buildspace::utils::{logger, validation::Validate};
use dc_buildspace::{
    ComponentRegistry, DevelopmentConfiguration, GraphDocument, SystemProcessRunner, ToolExecutor,
    ToolSettings,
};
use std::path::Path;

type Executor = ToolExecutor<SystemProcessRunner, ToolSettings>;

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();

    if args.json_logs {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("Starting dc-buildspace");
    if args.verbose {
        tracing::debug!("CLI arguments: {:?}", args);
    }

    if let Err(e) = args.validate() {
        tracing::error!("❌ Argument validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    match run(args.command).await {
        Ok(0) => {}
        Ok(tool_exit_code) => std::process::exit(tool_exit_code),
        Err(e) => {
            tracing::error!(
                "❌ {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };

            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }
}

/// Returns the exit code of the component tool, 0 when it was not started.
async fn run(command: Command) -> Result<i32> {
    match command {
        Command::Script {
            descriptor,
            operation,
        } => {
            print_script(&descriptor, &operation)?;
            Ok(0)
        }
        Command::Run {
            descriptor,
            save,
            operation,
        } => run_operation(&descriptor, save.as_deref(), &operation).await,
        Command::Parse { listing } => {
            print_listing(&listing)?;
            Ok(0)
        }
    }
}

fn load(descriptor: &Path) -> Result<(GraphDocument, DevelopmentConfiguration, ComponentRegistry)> {
    tracing::info!("📁 Loading descriptor from: {}", descriptor.display());

    let document = GraphDocument::from_file(descriptor)?;
    document.validate()?;
    let (configuration, registry) = document.to_graph()?;

    tracing::info!(
        "✅ Loaded {} with {} compartments",
        configuration.name(),
        configuration.compartments().len()
    );
    Ok((document, configuration, registry))
}

fn executor_for(document: &GraphDocument) -> Result<Executor> {
    let tool = document
        .tool
        .clone()
        .ok_or_else(|| ToolError::MissingConfigError {
            field: "tool".to_string(),
        })?;
    Ok(ToolExecutor::new(SystemProcessRunner::new(), tool))
}

/// Requested components, or every component needing a rebuild together with
/// the components using them, in dependency order.
fn build_order(
    configuration: &DevelopmentConfiguration,
    registry: &mut ComponentRegistry,
    requested: &[ComponentKey],
) -> Result<Vec<ComponentKey>> {
    let keys = if requested.is_empty() {
        let flagged = configuration.components_needing_rebuild(registry);
        mark_for_rebuild(registry, &flagged);
        configuration.components_needing_rebuild(registry)
    } else {
        requested.to_vec()
    };

    DependencySorter::new(registry).sort(&keys)
}

fn body_for(
    executor: &Executor,
    operation: &Operation,
    configuration: &DevelopmentConfiguration,
    registry: &mut ComponentRegistry,
) -> Result<Vec<String>> {
    match operation {
        Operation::List => executor.list_commands(configuration),
        Operation::Build { components } => {
            let order = build_order(configuration, registry, components)?;
            executor.build_commands(configuration, registry, &order)
        }
        Operation::Sync { .. } => executor.sync_commands(
            configuration,
            registry,
            operation.sync_request().unwrap_or_default(),
        ),
    }
}

fn print_script(descriptor: &Path, operation: &Operation) -> Result<()> {
    let (document, configuration, mut registry) = load(descriptor)?;
    let executor = executor_for(&document)?;

    let body = body_for(&executor, operation, &configuration, &mut registry)?;
    if body.is_empty() {
        tracing::info!("Nothing to do for {}", configuration.name());
        return Ok(());
    }

    let selected = executor.select_dialect(&configuration)?;
    println!("{}", executor.preview_script(&configuration, &selected, &body));
    Ok(())
}

async fn run_operation(descriptor: &Path, save: Option<&Path>, operation: &Operation) -> Result<i32> {
    let (document, mut configuration, mut registry) = load(descriptor)?;
    let executor = executor_for(&document)?;

    let result = match operation {
        Operation::List => {
            executor
                .list_components(&mut configuration, &mut registry)
                .await?
        }
        Operation::Build { components } => {
            let order = build_order(&configuration, &mut registry, components)?;
            executor
                .build_components(&configuration, &registry, &order)
                .await?
        }
        Operation::Sync { .. } => {
            let request = operation.sync_request().unwrap_or_default();
            executor
                .sync_components(&configuration, &registry, request)
                .await?
        }
    };

    print!("{}", result.output);
    println!(
        "{} statements, exit code {}, {:?}",
        result.statements, result.exit_code, result.duration
    );

    if let Some(save) = save {
        GraphDocument::from_graph(&configuration, &registry, document.tool.clone()).write_file(save)?;
        tracing::info!("📁 Build graph saved to: {}", save.display());
    }

    Ok(result.exit_code)
}

fn print_listing(listing: &Listing) -> Result<()> {
    match listing {
        Listing::Buildspaces { file } => {
            let output = std::fs::read_to_string(file)?;
            for build_space in parse_build_spaces(&output) {
                println!("{}", build_space);
            }
        }
        Listing::Compartments { file } => {
            let output = std::fs::read_to_string(file)?;
            for compartment in parse_compartments(&output)? {
                println!("{} ({})", compartment.name, compartment.state);
            }
        }
        Listing::Components {
            file,
            descriptor,
            format,
        } => {
            let output = std::fs::read_to_string(file)?;
            let (_, mut configuration, mut registry) = load(descriptor)?;

            let count =
                listing_reader((*format).into()).read(&output, &mut configuration, &mut registry)?;
            tracing::info!("📋 Read {} development components", count);

            for compartment in configuration.compartments() {
                for key in compartment.components() {
                    println!("{}\t{}", compartment.name(), key);
                }
            }
        }
    }
    Ok(())
}
