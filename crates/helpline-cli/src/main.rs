use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use helpline_core::{Session, TracingObserver};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod repl;

use config::HelplineConfig;

#[derive(Parser)]
#[command(name = "helpline")]
#[command(version)]
#[command(about = "Helpline - a multi-agent support desk")]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the interactive support console (default)
    Chat,

    /// Send a one-shot message to the desk
    Ask {
        /// The message to send
        message: String,

        /// User name to identify as
        #[arg(long)]
        name: Option<String>,

        /// User email; premium is detected from it
        #[arg(long)]
        email: Option<String>,
    },

    /// Initialize config directory and default config
    Init,

    /// Show current configuration
    Config,

    /// Print the registered tools with their input schemas as JSON
    Tools,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command.unwrap_or(Commands::Chat) {
        Commands::Init => cmd_init().await,
        Commands::Config => cmd_config(&cli.config).await,
        Commands::Chat => cmd_chat(&cli.config).await,
        Commands::Tools => cmd_tools(&cli.config).await,
        Commands::Ask {
            message,
            name,
            email,
        } => cmd_ask(&cli.config, &message, name, email).await,
    }
}

async fn cmd_init() -> Result<()> {
    let config_dir = config::config_dir();
    tokio::fs::create_dir_all(&config_dir)
        .await
        .with_context(|| format!("Failed to create config dir: {}", config_dir.display()))?;

    let config_path = config_dir.join("config.toml");
    if config_path.exists() {
        warn!("Config already exists at {}", config_path.display());
    } else {
        let default_config = include_str!("../../../config/default.toml");
        tokio::fs::write(&config_path, default_config).await?;
        info!("Created default config at {}", config_path.display());
    }

    println!("Helpline initialized at {}", config_dir.display());
    println!(
        "Edit {} to configure agents, routing and the guardrail.",
        config_path.display()
    );
    Ok(())
}

async fn cmd_config(config_path: &Option<PathBuf>) -> Result<()> {
    let cfg = HelplineConfig::load(config_path)?;
    println!("{}", toml::to_string_pretty(&cfg)?);
    Ok(())
}

async fn cmd_chat(config_path: &Option<PathBuf>) -> Result<()> {
    let cfg = HelplineConfig::load(config_path)?;
    let desk = cfg
        .build_desk(Arc::new(repl::ConsoleObserver))
        .context("Invalid desk configuration")?;
    info!(
        "Desk ready with {} agents and {} tools",
        desk.router.agents().len(),
        desk.registry.len()
    );

    let mut session = Session::new();
    apply_identity(
        &mut session,
        cfg.desk.user_name.as_deref(),
        cfg.desk.user_email.as_deref(),
    );

    repl::run(&desk, &mut session).await
}

async fn cmd_ask(
    config_path: &Option<PathBuf>,
    message: &str,
    name: Option<String>,
    email: Option<String>,
) -> Result<()> {
    let cfg = HelplineConfig::load(config_path)?;
    let desk = cfg
        .build_desk(Arc::new(TracingObserver))
        .context("Invalid desk configuration")?;

    let mut session = Session::new();
    let name = name.or_else(|| cfg.desk.user_name.clone());
    let email = email.or_else(|| cfg.desk.user_email.clone());
    apply_identity(&mut session, name.as_deref(), email.as_deref());

    let reply = tokio::task::block_in_place(|| session.ask(&desk.router, message));
    println!("[{}] {}", reply.agent, reply.text);
    Ok(())
}

async fn cmd_tools(config_path: &Option<PathBuf>) -> Result<()> {
    let cfg = HelplineConfig::load(config_path)?;
    let desk = cfg
        .build_desk(Arc::new(TracingObserver))
        .context("Invalid desk configuration")?;
    println!("{}", serde_json::to_string_pretty(&desk.registry.definitions())?);
    Ok(())
}

/// Identify with an email when one is known; a name alone is still recorded
fn apply_identity(session: &mut Session, name: Option<&str>, email: Option<&str>) {
    match (name, email) {
        (name, Some(email)) => session.identify(name.unwrap_or("user"), email),
        (Some(name), None) => session.set_name(name),
        (None, None) => {}
    }
}
