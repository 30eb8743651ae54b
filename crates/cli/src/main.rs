use anyhow::{bail, Context as AnyhowContext, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use codelore_client::{
    AnalysisSession, ClientConfig, FetchOrchestrator, RefreshScope, SessionState, Snapshot,
};
use codelore_diagram::{DiagramRenderer, DiagramState, MermaidCli, RenderOutcome};
use codelore_insight::{
    categories, export_summary, recent_changes, CategoryFilter, FileFilter, FilterSummary,
    EXPORT_FILE_NAME,
};
use serde::Serialize;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::time::Duration;

mod report;

#[derive(Parser)]
#[command(name = "codelore")]
#[command(about = "Explore repository analysis results from a CodeLore service", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Print machine-readable JSON on stdout
    #[arg(long, global = true)]
    json: bool,

    /// Analysis service base URL (overrides CODELORE_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Request timeout in seconds (overrides CODELORE_TIMEOUT_SECS)
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    /// Config file (TOML, or JSON with a .json extension)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a repository and list its files
    Analyze(AnalyzeArgs),

    /// Show one file's role, history and connections
    Show(ShowArgs),

    /// Recent changes across all files, newest first
    Timeline(TimelineArgs),

    /// Project summary, key files and dependency diagram
    Architecture(ArchitectureArgs),

    /// Write a Markdown project summary
    Export(ExportArgs),

    /// Check that the analysis service is reachable
    Ping,
}

#[derive(Args)]
struct AnalyzeArgs {
    /// Repository URL
    repository: String,

    /// Case-insensitive substring of the file path
    #[arg(short, long, default_value = "")]
    search: String,

    /// Category label ("all" for every category)
    #[arg(short, long, default_value = "all")]
    category: String,

    /// Which data set to fetch
    #[arg(long, value_enum, default_value_t = ScopeArg::Explorer)]
    scope: ScopeArg,

    /// List the categories present instead of files
    #[arg(long)]
    categories: bool,
}

#[derive(Args)]
struct ShowArgs {
    /// Repository URL
    repository: String,

    /// File path as reported by the service
    path: String,
}

#[derive(Args)]
struct TimelineArgs {
    /// Repository URL
    repository: String,

    /// Maximum number of changes to print
    #[arg(short = 'n', long, default_value_t = 20)]
    limit: usize,
}

#[derive(Args)]
struct ArchitectureArgs {
    /// Repository URL
    repository: String,

    /// Render the diagram to this SVG file
    #[arg(long)]
    svg: Option<PathBuf>,

    /// mermaid-cli binary (overrides CODELORE_MMDC)
    #[arg(long)]
    mmdc: Option<PathBuf>,
}

#[derive(Args)]
struct ExportArgs {
    /// Repository URL
    repository: String,

    /// Output file ("-" for stdout)
    #[arg(short, long, default_value = EXPORT_FILE_NAME)]
    output: PathBuf,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ScopeArg {
    Explorer,
    Dashboard,
}

impl From<ScopeArg> for RefreshScope {
    fn from(scope: ScopeArg) -> Self {
        match scope {
            ScopeArg::Explorer => RefreshScope::Explorer,
            ScopeArg::Dashboard => RefreshScope::Dashboard,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet || cli.json {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    // reqwest/hyper internals are noise unless debugging
    if !cli.verbose {
        builder.filter_module("hyper_util", log::LevelFilter::Warn);
        builder.filter_module("reqwest", log::LevelFilter::Warn);
    }
    builder.target(env_logger::Target::Stderr).init();

    let config = load_config(&cli)?;
    let output = Output {
        json: cli.json,
        color: !cli.json
            && std::io::stdout().is_terminal()
            && std::env::var_os("NO_COLOR").is_none(),
    };

    match cli.command {
        Commands::Analyze(args) => run_analyze(args, &config, output).await?,
        Commands::Show(args) => run_show(args, &config, output).await?,
        Commands::Timeline(args) => run_timeline(args, &config, output).await?,
        Commands::Architecture(args) => run_architecture(args, &config, output).await?,
        Commands::Export(args) => run_export(args, &config, output).await?,
        Commands::Ping => run_ping(&config, output).await?,
    }

    Ok(())
}

#[derive(Clone, Copy)]
struct Output {
    json: bool,
    color: bool,
}

impl Output {
    fn emit<T: Serialize>(self, value: &T, text: impl FnOnce() -> String) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            print!("{}", text());
        }
        Ok(())
    }
}

/// Defaults, config file, environment, then flags.
fn load_config(cli: &Cli) -> Result<ClientConfig> {
    let mut config = ClientConfig::load(cli.config.as_deref()).context("Failed to load config")?;
    if let Some(url) = &cli.api_url {
        config.set_base_url(url).context("Invalid --api-url")?;
    }
    if let Some(secs) = cli.timeout_secs {
        if secs == 0 {
            bail!("--timeout-secs must be greater than zero");
        }
        config.timeout = Duration::from_secs(secs);
    }
    log::debug!("Using analysis service at {}", config.base_url);
    Ok(config)
}

/// Fetch `scope` for `repository` and return the loaded snapshot.
async fn load(
    config: &ClientConfig,
    repository: &str,
    scope: RefreshScope,
) -> Result<(AnalysisSession, Snapshot)> {
    let orchestrator =
        FetchOrchestrator::from_config(config).context("Failed to build HTTP client")?;
    let mut session = AnalysisSession::new();
    session.analyze(&orchestrator, repository, scope).await;
    let snapshot = match session.state() {
        SessionState::Loaded(snapshot) => snapshot.clone(),
        SessionState::Failed(err) => bail!("{err}"),
        SessionState::Idle | SessionState::Loading { .. } => {
            bail!("Analysis of {repository} did not complete")
        }
    };
    Ok((session, snapshot))
}

#[derive(Serialize)]
struct FileListing<'a> {
    repository: &'a str,
    summary: FilterSummary,
    files: Vec<&'a codelore_insight::FileInsight>,
}

async fn run_analyze(args: AnalyzeArgs, config: &ClientConfig, output: Output) -> Result<()> {
    let (_, snapshot) = load(config, &args.repository, args.scope.into()).await?;

    if args.categories {
        let present = categories(&snapshot.insights);
        let labels: Vec<&str> = present.iter().map(|c| c.label()).collect();
        return output.emit(&labels, || report::render_categories(&present, output.color));
    }

    let filter = FileFilter::new(args.search, CategoryFilter::parse(&args.category));
    let files = filter.apply(&snapshot.insights);
    let summary = FilterSummary {
        shown: files.len(),
        total: snapshot.insights.len(),
    };
    let listing = FileListing {
        repository: &snapshot.repository,
        summary,
        files,
    };
    output.emit(&listing, || {
        report::render_file_list(&listing.files, summary, output.color)
    })
}

async fn run_show(args: ShowArgs, config: &ClientConfig, output: Output) -> Result<()> {
    let (mut session, _) = load(config, &args.repository, RefreshScope::Explorer).await?;
    session
        .select(&args.path)
        .with_context(|| format!("No file {} in {}", args.path, args.repository))?;
    let Some(file) = session.selected() else {
        bail!("No file {} in {}", args.path, args.repository);
    };
    output.emit(file, || report::render_file_details(file, output.color))
}

async fn run_timeline(args: TimelineArgs, config: &ClientConfig, output: Output) -> Result<()> {
    let (_, snapshot) = load(config, &args.repository, RefreshScope::Timeline).await?;
    let entries = recent_changes(&snapshot.insights, Some(args.limit));
    output.emit(&entries, || report::render_timeline(&entries, output.color))
}

#[derive(Serialize)]
struct ArchitectureOutput<'a> {
    summary: &'a codelore_insight::ArchitectureSummary,
    diagram: Option<DiagramState>,
}

async fn run_architecture(
    args: ArchitectureArgs,
    config: &ClientConfig,
    output: Output,
) -> Result<()> {
    let (_, snapshot) = load(config, &args.repository, RefreshScope::Architecture).await?;
    let Some(summary) = snapshot.architecture.as_ref() else {
        bail!("The service returned no architecture summary");
    };

    let diagram = match &args.svg {
        Some(path) => {
            let program = args.mmdc.clone().unwrap_or_else(|| config.mermaid_cli.clone());
            let backend = MermaidCli::new(program).with_timeout(config.render_timeout);
            let state = render_diagram(
                DiagramRenderer::with_backend(backend),
                snapshot.diagram_source.as_deref().unwrap_or(""),
            )
            .await;
            if let Some(svg) = state.visible_svg() {
                write_output(path, svg)?;
                log::info!("Diagram written to {}", path.display());
            }
            Some(state)
        }
        None => None,
    };

    let result = ArchitectureOutput {
        summary,
        diagram: diagram.clone(),
    };
    output.emit(&result, || {
        report::render_architecture(summary, diagram.as_ref(), output.color)
    })
}

async fn render_diagram(renderer: DiagramRenderer, source: &str) -> DiagramState {
    match renderer.render(source).await {
        RenderOutcome::Failed => {
            log::warn!("Diagram could not be rendered; showing its source instead");
        }
        RenderOutcome::Empty => log::info!("No diagram for this repository"),
        RenderOutcome::Rendered | RenderOutcome::Superseded => {}
    }
    renderer.state()
}

async fn run_export(args: ExportArgs, config: &ClientConfig, output: Output) -> Result<()> {
    let (_, snapshot) = load(config, &args.repository, RefreshScope::Dashboard).await?;
    let document = export_summary(snapshot.architecture.as_ref(), &snapshot.insights);

    if args.output.as_os_str() == "-" {
        print!("{document}");
        return Ok(());
    }
    write_output(&args.output, &document)?;
    let written = serde_json::json!({
        "path": args.output,
        "files": snapshot.insights.len(),
    });
    output.emit(&written, || {
        format!(
            "Wrote {} ({} files)\n",
            args.output.display(),
            snapshot.insights.len()
        )
    })
}

async fn run_ping(config: &ClientConfig, output: Output) -> Result<()> {
    let orchestrator =
        FetchOrchestrator::from_config(config).context("Failed to build HTTP client")?;
    let health = orchestrator
        .ping()
        .await
        .map_err(|err| anyhow::anyhow!(err.detail()))
        .with_context(|| format!("{} is not reachable", config.base_url))?;
    output.emit(&health, || format!("{}: {}\n", config.base_url, health.message))
}

fn write_output(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Cannot create {}", parent.display()))?;
    }
    std::fs::write(path, contents).with_context(|| format!("Failed to write {}", path.display()))
}
