use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use cidian_config::Config;
use tokio::signal;
use tracing_subscriber::EnvFilter;

mod controller;
mod events;
mod io;
mod session;
mod state;
mod ui;

#[cfg(test)]
mod tests;

use controller::AppController;
use state::AppState;

#[derive(Parser, Debug)]
#[command(author, version, about = "English-Chinese dictionary lookup", long_about = None)]
struct Args {
    /// JSON config file; defaults plus environment overrides when absent
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Keyword prefixed to queries that selecting an item rewrites
    #[arg(short, long)]
    keyword: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Logs go to stderr, stdout carries results
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::new(),
    };
    if let Some(keyword) = args.keyword {
        config.action_keyword = keyword;
    }

    let state = Arc::new(AppState::new(config)?);
    tracing::info!(
        "Dictionary at {}, type a word or :N to select, :q to quit",
        state.config.dictionary.path.display()
    );

    let controller = AppController::new(state);
    let mut tasks = controller.spawn_tasks();

    tokio::select! {
        result = signal::ctrl_c() => {
            result?;
            tracing::info!("Shutdown requested");
        }
        _ = controller.cancelled() => {
            tracing::info!("Quit");
        }
        Some(result) = tasks.join_next() => {
            match result {
                Ok(Ok(())) => tracing::warn!("Task exited"),
                Ok(Err(e)) => tracing::error!("Task failed: {e}"),
                Err(e) => tracing::error!("Task panicked: {e}"),
            }
        }
    }

    controller.shutdown();
    tasks.abort_all();

    // A pending stdin read holds a runtime thread that shutdown would wait on
    std::process::exit(0)
}
