use clap::{Parser, Subcommand};
use counselor_gateway::GatewayServer;
use counselor_index::build_index;
use counselor_model::{ModelClient, ModelConfig};
use counselor_pipeline::{Orchestrator, PipelineConfig};
use counselor_rules::{GuardrailClassifier, LinkScorer, RuleSet};
use counselor_session::{Janitor, MemorySessionStore};
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "counselor", about = "GLHS AI counselor — chat server")]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "counselor.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the chat server
    Serve {
        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Manage guardrail and link rules
    Rules {
        #[command(subcommand)]
        action: RulesAction,
    },
}

#[derive(Subcommand)]
enum RulesAction {
    /// Load and validate the rule set, then print a summary
    Check,
}

#[derive(Deserialize)]
struct CounselorConfig {
    model: ModelConfig,
    #[serde(default = "default_data_dir")]
    data_dir: PathBuf,
    /// Optional TOML rule-set override; built-in rules apply when unset.
    #[serde(default)]
    rules_path: Option<PathBuf>,
    #[serde(default)]
    server: ServerConfig,
    #[serde(default)]
    session: SessionConfig,
    #[serde(default)]
    pipeline: PipelineConfig,
}

#[derive(Deserialize)]
struct ServerConfig {
    #[serde(default = "default_host")]
    host: String,
    #[serde(default = "default_port")]
    port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Deserialize)]
struct SessionConfig {
    #[serde(default = "default_sweep_interval_secs")]
    sweep_interval_secs: u64,
    #[serde(default = "default_idle_timeout_secs")]
    idle_timeout_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            sweep_interval_secs: default_sweep_interval_secs(),
            idle_timeout_secs: default_idle_timeout_secs(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    5000
}
fn default_sweep_interval_secs() -> u64 {
    300
}
fn default_idle_timeout_secs() -> u64 {
    300
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    let cli = Cli::parse();

    let config_str = tokio::fs::read_to_string(&cli.config).await.map_err(|e| {
        anyhow::anyhow!(
            "Failed to read config file '{}': {}",
            cli.config.display(),
            e
        )
    })?;
    let mut config: CounselorConfig = toml::from_str(&config_str)?;

    if config.model.api_key.is_empty() {
        config.model.api_key = std::env::var("COUNSELOR_API_KEY")
            .or_else(|_| std::env::var("OPENAI_API_KEY"))
            .unwrap_or_default();
    }

    match cli.command {
        Commands::Serve { host, port } => serve(config, host, port).await,
        Commands::Rules { action } => match action {
            RulesAction::Check => rules_check(&config),
        },
    }
}

async fn serve(
    config: CounselorConfig,
    host: Option<String>,
    port: Option<u16>,
) -> anyhow::Result<()> {
    let host = host.unwrap_or(config.server.host);
    let port = port.unwrap_or(config.server.port);

    anyhow::ensure!(
        !config.model.api_key.is_empty(),
        "No model API key: set model.api_key in the config or COUNSELOR_API_KEY in the environment"
    );

    // Rule problems must abort startup, not fall back silently.
    let rules = RuleSet::load(config.rules_path.as_deref())?;
    let guardrails = GuardrailClassifier::new(rules.guardrails)?;
    let links = LinkScorer::new(rules.links);

    let index = build_index(&config.data_dir).await?;

    let sessions = Arc::new(MemorySessionStore::new());
    let janitor = Janitor::new(
        sessions.clone(),
        Duration::from_secs(config.session.sweep_interval_secs),
        Duration::from_secs(config.session.idle_timeout_secs),
    );
    janitor.start().await;

    let orchestrator = Arc::new(Orchestrator::new(
        Arc::new(index),
        ModelClient::new(config.model),
        sessions,
        guardrails,
        links,
        config.pipeline,
    ));

    let app = GatewayServer::build(orchestrator);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Counselor listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    janitor.shutdown().await;
    info!("Counselor stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}

fn rules_check(config: &CounselorConfig) -> anyhow::Result<()> {
    let rules = RuleSet::load(config.rules_path.as_deref())?;
    GuardrailClassifier::new(rules.guardrails.clone())?;

    println!("Rule set OK");
    println!("  safety triggers:   {}", rules.guardrails.safety_triggers.len());
    println!("  greeting patterns: {}", rules.guardrails.greeting_patterns.len());
    println!("  link rules:        {}", rules.links.len());
    for rule in &rules.links {
        println!(
            "    {} -> {} (min score {})",
            rule.category, rule.url, rule.min_score
        );
    }
    Ok(())
}
