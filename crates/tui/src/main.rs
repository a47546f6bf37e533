use std::process::ExitCode;

mod app;
mod config;
mod error;
mod ui;

use app::App;
use error::Result;

/// Set to a file path to enable tracing output. Logs go to a file because
/// stderr belongs to the terminal UI while it runs.
const LOG_ENV: &str = "YNAB_EXPORT_LOG";

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("ynab-export: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let (config, token_flag) = config::load()?;
    init_logging()?;

    let mut app = App::new(&config, token_flag)?;
    app.run().await
}

fn init_logging() -> Result<()> {
    if let Ok(path) = std::env::var(LOG_ENV) {
        let file = std::fs::File::create(path)?;
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .init();
    }
    Ok(())
}
