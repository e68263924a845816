//! compare-tui - A terminal editor for product comparison tables
//!
//! Runs the interactive editor by default. `compare-tui proxy` runs the
//! completion proxy that holds the upstream API key, and `compare-tui config`
//! prints the resolved configuration.

mod action;
mod app;
mod component;
mod components;
mod config;
mod error;
mod logging;
mod model;
mod services;
mod tui;

use crate::action::Action;
use crate::app::App;
use crate::component::Component;
use crate::config::Config;
use crate::services::HttpCompletionClient;
use crate::tui::Tui;
use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};
use crossterm::event::Event;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "compare-tui")]
#[command(about = "Edit product comparison tables in the terminal")]
#[command(version)]
struct Cli {
    /// Configuration file (defaults to ~/.compare-tui/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Completion endpoint to send generation requests to
    #[arg(long)]
    endpoint: Option<String>,

    /// Generation request timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the completion proxy that holds the upstream API key
    Proxy(ProxyArgs),

    /// Print the resolved configuration
    Config {
        /// Also write it to the configuration file
        #[arg(long)]
        write: bool,
    },
}

#[derive(Args)]
struct ProxyArgs {
    /// Address to listen on
    #[arg(long)]
    listen: Option<String>,

    /// OpenAI-compatible chat completions URL
    #[arg(long)]
    upstream_url: Option<String>,

    /// Model name sent upstream
    #[arg(long)]
    model: Option<String>,

    /// Upstream API key
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().or_else(Config::config_path);
    let mut config = match &config_path {
        Some(path) => Config::load_from(path)?,
        None => Config::default(),
    };

    if let Some(endpoint) = cli.endpoint {
        config.completion_url = endpoint;
    }
    if let Some(timeout) = cli.timeout_secs {
        config.timeout_secs = timeout;
    }
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }

    match cli.command {
        None => run_editor(config),
        Some(Command::Proxy(args)) => run_proxy(config, args),
        Some(Command::Config { write }) => print_config(&config, config_path, write),
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Editor
// ═══════════════════════════════════════════════════════════════════════════════

fn run_editor(config: Config) -> Result<()> {
    let log_guard = logging::init_file_logging(&config.log_level)?;

    let client = HttpCompletionClient::new(
        config.completion_url.clone(),
        Duration::from_secs(config.timeout_secs),
    )?;
    info!(
        log_file = %log_guard.path.display(),
        endpoint = %client.endpoint(),
        timeout_secs = config.timeout_secs,
        "starting editor"
    );
    let mut app = App::new(Arc::new(client));

    let mut tui = Tui::new()?.with_tick_rate(Duration::from_millis(100));
    tui.enter()?;

    let result = run_app(&mut tui, &mut app);

    tui.exit()?;

    match &result {
        Ok(()) => info!("editor closed"),
        Err(e) => error!(error = %e, "editor stopped with an error"),
    }
    result
}

/// Run the main application loop
fn run_app(tui: &mut Tui, app: &mut App) -> Result<()> {
    while !app.should_quit {
        let mut draw_result = Ok(());
        tui.draw(|frame| {
            let area = frame.area();
            draw_result = app.draw(frame, area);
        })?;
        draw_result?;

        let action = match tui.next_event()? {
            Some(Event::Key(key)) => app.handle_key_event(key)?,
            Some(Event::Mouse(mouse)) => app.handle_mouse_event(mouse)?,
            Some(Event::Resize(w, h)) => Some(Action::Resize(w, h)),
            Some(_) => None,
            None => Some(Action::Tick),
        };

        // An action may produce a follow-up action
        let mut current_action = action;
        while let Some(a) = current_action {
            current_action = app.update(a)?;
        }
    }

    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════════════
// Proxy
// ═══════════════════════════════════════════════════════════════════════════════

fn run_proxy(mut config: Config, args: ProxyArgs) -> Result<()> {
    logging::init_stderr_logging(&config.log_level)?;

    if let Some(listen) = args.listen {
        config.proxy.listen = listen;
    }
    if let Some(url) = args.upstream_url {
        config.proxy.upstream_url = url;
    }
    if let Some(model) = args.model {
        config.proxy.model = model;
    }
    if args.api_key.trim().is_empty() {
        bail!("An upstream API key is required (--api-key or OPENAI_API_KEY)");
    }

    info!(
        upstream = %config.proxy.upstream_url,
        model = %config.proxy.model,
        "starting completion proxy"
    );

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(services::proxy::serve(config.proxy, args.api_key))
}

// ═══════════════════════════════════════════════════════════════════════════════
// Config
// ═══════════════════════════════════════════════════════════════════════════════

fn print_config(config: &Config, path: Option<PathBuf>, write: bool) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(config)?);

    if write {
        let Some(path) = path else {
            bail!("Could not determine config path; pass --config");
        };
        config.save_to(&path)?;
        eprintln!("Wrote {}", path.display());
    }
    Ok(())
}
