use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

mod api;
mod app;
mod config;
mod desktop;
mod dispatch;
mod format;
mod handler;
mod logging;
mod models;
mod palette;
mod state;
mod tasks;
#[cfg(test)]
mod test_http;
mod tui;
mod ui;

use api::QuantClient;
use app::App;
use config::Config;
use models::ModelId;
use tasks::Backend;
use tui::EventHandler;

#[derive(Parser, Debug)]
#[command(name = "quantdesk")]
#[command(version, about = "Terminal chat client for a quantitative-finance analysis server")]
struct Cli {
    /// Base URL of the analysis server
    #[arg(long, value_name = "URL")]
    api_base: Option<String>,

    /// Model to start with (deepseek, qwen, qwen_coder, glm)
    #[arg(short, long)]
    model: Option<String>,

    /// Config file to read and save the model choice to
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Where to write logs
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_path = logging::init(cli.log_file.as_deref())?;

    let config_path = match cli.config.clone() {
        Some(path) => Some(path),
        None => Config::default_path().map_err(|err| warn!("{:#}", err)).ok(),
    };
    let mut config = match &config_path {
        Some(path) => Config::load_from(path)?,
        None => Config::default(),
    };
    config.apply_env();
    if let Some(base) = cli.api_base {
        config.api_base = base;
    }
    if let Some(name) = cli.model.as_deref() {
        let model = ModelId::from_str(name)
            .with_context(|| format!("unknown model '{}'", name))?;
        config.default_model = Some(model.as_str().to_string());
    }

    let client = QuantClient::new(
        &config.api_base,
        Duration::from_secs(config.request_timeout_secs.max(1)),
    )?;
    info!(
        api_base = client.base_url(),
        model = config.model().as_str(),
        log = %log_path.display(),
        "starting quantdesk"
    );
    let status_interval = Duration::from_secs(config.status_interval_secs);

    let mut app = App::new(config, config_path);

    tui::install_panic_hook();
    let mut terminal = tui::init().context("initializing terminal")?;

    let mut events = EventHandler::new(status_interval);
    let backend = Backend::new(client, events.sender());
    backend.load_market();

    let result = run(&mut terminal, &mut app, &mut events, &backend).await;

    tui::restore()?;
    info!("exiting");
    result
}

async fn run(
    terminal: &mut tui::Tui,
    app: &mut App,
    events: &mut EventHandler,
    backend: &Backend,
) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        let Some(event) = events.next().await else {
            break;
        };
        handler::handle_event(app, event, backend)?;
    }
    Ok(())
}
