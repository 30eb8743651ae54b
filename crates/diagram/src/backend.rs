use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::error::{DiagramError, Result};

/// Turns graph-description text into SVG markup.
#[async_trait]
pub trait DiagramBackend: Send + Sync {
    async fn render(&self, source: &str) -> Result<String>;

    fn name(&self) -> &str;
}

/// Renders through the mermaid-cli (`mmdc`) binary.
///
/// The source goes in on stdin and the SVG comes back on stdout, so no
/// temporary files are involved.
#[derive(Debug, Clone)]
pub struct MermaidCli {
    program: PathBuf,
    theme: String,
    timeout: Duration,
}

impl MermaidCli {
    pub const DEFAULT_PROGRAM: &'static str = "mmdc";

    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            theme: "default".to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_theme(mut self, theme: impl Into<String>) -> Self {
        self.theme = theme.into();
        self
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(["--input", "-", "--output", "-", "--outputFormat", "svg", "--quiet"])
            .arg("--theme")
            .arg(&self.theme)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }

    async fn run(&self, source: &str) -> Result<String> {
        let mut child = self.command().spawn().map_err(|err| {
            DiagramError::Backend(format!(
                "failed to start {}: {err}",
                self.program.display()
            ))
        })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(source.as_bytes()).await?;
            stdin.shutdown().await?;
        }

        let output = child.wait_with_output().await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let message = stderr
                .lines()
                .map(str::trim)
                .find(|line| !line.is_empty())
                .unwrap_or("no diagnostics");
            return Err(DiagramError::Backend(format!(
                "{} exited with {}: {message}",
                self.program.display(),
                output.status
            )));
        }

        let svg = String::from_utf8_lossy(&output.stdout).into_owned();
        if !svg.contains("<svg") {
            return Err(DiagramError::InvalidOutput(format!(
                "{} bytes without an <svg> element",
                svg.len()
            )));
        }
        Ok(svg)
    }
}

impl Default for MermaidCli {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PROGRAM)
    }
}

#[async_trait]
impl DiagramBackend for MermaidCli {
    async fn render(&self, source: &str) -> Result<String> {
        log::debug!(
            "Rendering {} bytes of diagram source with {}",
            source.len(),
            self.program.display()
        );
        match tokio::time::timeout(self.timeout, self.run(source)).await {
            Ok(result) => result,
            Err(_) => Err(DiagramError::Timeout(self.timeout)),
        }
    }

    fn name(&self) -> &str {
        "mermaid-cli"
    }
}
