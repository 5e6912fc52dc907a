use crate::utils::error::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// One invocation of an external tool.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessRequest {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub env: BTreeMap<String, String>,
    pub working_dir: Option<PathBuf>,
    pub stdin: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    pub exit_code: i32,
    pub stdout: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Launches a tool, feeds it `stdin` and waits for it to exit.
///
/// Only failures to launch are errors; a non-zero exit code is reported in
/// the output.
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    async fn run(&self, request: ProcessRequest) -> Result<ProcessOutput>;
}

/// Settings the executor needs to launch the component tool.
pub trait ToolConfigProvider: Send + Sync {
    fn tool_executable(&self) -> PathBuf;
    fn tool_args(&self) -> &[String];
    fn user(&self) -> &str;
    fn password(&self) -> Result<&str>;
    /// Directory under which each configuration gets its workspace.
    fn workspace_base(&self) -> &str;
    /// JDK installation registered for a JDK home alias.
    fn jdk_home(&self, alias: &str) -> Option<&str>;
}
