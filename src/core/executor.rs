use crate::core::builders::{
    BuildCommandBuilder, CommandBuilder, ListCommandBuilder, SyncCommandBuilder, SyncRequest,
};
use crate::core::dialect::{DialectTable, LoadConfiguration};
use crate::core::parsers::listing_reader;
use crate::core::selector::{SelectedDialect, ToolVersionSelector};
use crate::domain::component::ComponentKey;
use crate::domain::configuration::DevelopmentConfiguration;
use crate::domain::ports::{ProcessRequest, ProcessRunner, ToolConfigProvider};
use crate::domain::registry::ComponentRegistry;
use crate::utils::error::{Result, ToolError};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::Instrument;

pub const MASKED_PASSWORD: &str = "********";

/// Outcome of one component tool run. A non-zero exit code is a failed
/// operation, but the captured output is kept.
#[derive(Debug, Clone)]
pub struct ToolResult {
    pub exit_code: i32,
    pub output: String,
    pub statements: usize,
    pub started_at: DateTime<Utc>,
    pub duration: Duration,
}

impl ToolResult {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    fn skipped() -> Self {
        Self {
            exit_code: 0,
            output: String::new(),
            statements: 0,
            started_at: Utc::now(),
            duration: Duration::ZERO,
        }
    }
}

/// Runs component tool scripts for a development configuration and feeds
/// listing output back into the build graph.
pub struct ToolExecutor<R: ProcessRunner, C: ToolConfigProvider> {
    runner: R,
    config: C,
    dialects: DialectTable,
}

impl<R: ProcessRunner, C: ToolConfigProvider> ToolExecutor<R, C> {
    pub fn new(runner: R, config: C) -> Self {
        Self::with_dialects(runner, config, DialectTable::standard())
    }

    pub fn with_dialects(runner: R, config: C, dialects: DialectTable) -> Self {
        Self {
            runner,
            config,
            dialects,
        }
    }

    pub fn select_dialect(&self, configuration: &DevelopmentConfiguration) -> Result<SelectedDialect> {
        ToolVersionSelector::new(&self.dialects).select(configuration)
    }

    /// Workspace directory of the configuration below the workspace base.
    pub fn workspace_dir(&self, configuration: &DevelopmentConfiguration) -> PathBuf {
        Path::new(self.config.workspace_base()).join(configuration.workspace())
    }

    /// Wraps body statements into a complete script: timing, loadconfig,
    /// body, exit.
    pub fn render_script(
        &self,
        configuration: &DevelopmentConfiguration,
        selected: &SelectedDialect,
        body: &[String],
    ) -> Result<String> {
        let password = self.config.password()?;
        Ok(self.script_with_password(configuration, selected, body, password))
    }

    /// Like [`render_script`](Self::render_script) with the password masked,
    /// for showing a script instead of running it.
    pub fn preview_script(
        &self,
        configuration: &DevelopmentConfiguration,
        selected: &SelectedDialect,
        body: &[String],
    ) -> String {
        self.script_with_password(configuration, selected, body, MASKED_PASSWORD)
    }

    fn script_with_password(
        &self,
        configuration: &DevelopmentConfiguration,
        selected: &SelectedDialect,
        body: &[String],
        password: &str,
    ) -> String {
        let dialect = selected.dialect;
        let workspace = self.workspace_dir(configuration);
        let workspace = workspace.to_string_lossy();
        let load = LoadConfiguration {
            user: self.config.user(),
            password,
            workspace: &workspace,
            configuration: configuration.name(),
        };

        let mut lines = Vec::with_capacity(body.len() + 3);
        lines.push(dialect.enable_timing());
        lines.push(dialect.load_configuration(&load));
        lines.extend(body.iter().cloned());
        lines.push(dialect.exit());

        lines.join(dialect.line_separator())
    }

    pub fn list_commands(&self, configuration: &DevelopmentConfiguration) -> Result<Vec<String>> {
        let selected = self.select_dialect(configuration)?;
        ListCommandBuilder::new(configuration, selected.dialect).build()
    }

    pub fn build_commands(
        &self,
        configuration: &DevelopmentConfiguration,
        registry: &ComponentRegistry,
        components: &[ComponentKey],
    ) -> Result<Vec<String>> {
        let selected = self.select_dialect(configuration)?;
        BuildCommandBuilder::new(configuration, registry, selected.dialect, components).build()
    }

    pub fn sync_commands(
        &self,
        configuration: &DevelopmentConfiguration,
        registry: &ComponentRegistry,
        request: SyncRequest,
    ) -> Result<Vec<String>> {
        let selected = self.select_dialect(configuration)?;
        SyncCommandBuilder::new(configuration, registry, selected.dialect, request).build()
    }

    /// Lists the components of every compartment and attaches them to the
    /// graph. Output of a failed run is read as well.
    pub async fn list_components(
        &self,
        configuration: &mut DevelopmentConfiguration,
        registry: &mut ComponentRegistry,
    ) -> Result<ToolResult> {
        let selected = self.select_dialect(configuration)?;
        let body = ListCommandBuilder::new(configuration, selected.dialect).build()?;
        let result = self.execute(configuration, &selected, &body).await?;

        let count = listing_reader(selected.dialect.kind()).read(
            &result.output,
            configuration,
            registry,
        )?;
        tracing::info!("📋 Listed {} development components", count);

        Ok(result)
    }

    pub async fn build_components(
        &self,
        configuration: &DevelopmentConfiguration,
        registry: &ComponentRegistry,
        components: &[ComponentKey],
    ) -> Result<ToolResult> {
        let selected = self.select_dialect(configuration)?;
        let body =
            BuildCommandBuilder::new(configuration, registry, selected.dialect, components).build()?;
        self.execute(configuration, &selected, &body).await
    }

    pub async fn sync_components(
        &self,
        configuration: &DevelopmentConfiguration,
        registry: &ComponentRegistry,
        request: SyncRequest,
    ) -> Result<ToolResult> {
        let selected = self.select_dialect(configuration)?;
        let body =
            SyncCommandBuilder::new(configuration, registry, selected.dialect, request).build()?;
        self.execute(configuration, &selected, &body).await
    }

    /// Runs a script around `body`. An empty body does not start the tool.
    pub async fn execute(
        &self,
        configuration: &DevelopmentConfiguration,
        selected: &SelectedDialect,
        body: &[String],
    ) -> Result<ToolResult> {
        if body.is_empty() {
            tracing::info!("Nothing to do for {}, not starting the component tool", configuration.name());
            return Ok(ToolResult::skipped());
        }

        let request = self.process_request(configuration, selected, body)?;
        let span = tracing::info_span!(
            "component_tool",
            configuration = %configuration.name(),
            alias = %selected.alias
        );
        self.run_script(request, body.len()).instrument(span).await
    }

    async fn run_script(&self, request: ProcessRequest, statements: usize) -> Result<ToolResult> {
        tracing::info!("🚀 Running {} statements", statements);
        tracing::debug!("Component tool: {}", request.program.display());

        let started_at = Utc::now();
        let clock = Instant::now();
        let output = self.runner.run(request).await?;
        let duration = clock.elapsed();

        if output.success() {
            tracing::info!("✅ Component tool finished in {:?}", duration);
        } else {
            tracing::error!(
                "❌ Component tool exited with code {} after {:?}",
                output.exit_code,
                duration
            );
        }

        Ok(ToolResult {
            exit_code: output.exit_code,
            output: output.stdout,
            statements,
            started_at,
            duration,
        })
    }

    fn process_request(
        &self,
        configuration: &DevelopmentConfiguration,
        selected: &SelectedDialect,
        body: &[String],
    ) -> Result<ProcessRequest> {
        let alias = selected.alias.as_str();
        let jdk_home = self
            .config
            .jdk_home(alias)
            .ok_or_else(|| ToolError::MissingConfigError {
                field: format!("tool.jdk_homes.\"{}\"", alias),
            })?;

        let mut env = BTreeMap::new();
        env.insert("JAVA_HOME".to_string(), jdk_home.to_string());
        env.insert(alias.to_string(), jdk_home.to_string());

        Ok(ProcessRequest {
            program: self.config.tool_executable(),
            args: self.config.tool_args().to_vec(),
            env,
            working_dir: Some(self.workspace_dir(configuration)),
            stdin: self.render_script(configuration, selected, body)?,
        })
    }
}
