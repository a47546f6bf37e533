use clap::Parser;
use serde::Deserialize;

use crate::error::Result;

const DEFAULT_CONFIG_PATH: &str = "config/ynab-export.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,
    /// Byte cutoff for the inline document preview on the done screen.
    /// Display-only; the exported file is never truncated.
    pub preview_bytes: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: engine::DEFAULT_BASE_URL.to_string(),
            preview_bytes: 4096,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "ynab-export", version, about = "Export a budget to a JSON snapshot")]
struct Args {
    /// Optional config file path (TOML).
    #[arg(long)]
    config: Option<String>,
    /// Override the API base URL.
    #[arg(long)]
    base_url: Option<String>,
    /// API token (overrides the environment variable and the cached token).
    #[arg(short, long)]
    token: Option<String>,
}

/// Merged settings plus the explicit token flag, which feeds credential
/// resolution rather than the config itself.
pub fn load() -> Result<(AppConfig, Option<String>)> {
    let args = Args::parse();

    let config_path = args.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
    let mut builder = config::Config::builder();
    builder = builder.add_source(config::File::with_name(config_path).required(false));
    builder = builder.add_source(config::Environment::with_prefix("YNAB_EXPORT"));
    let mut settings: AppConfig = builder.build()?.try_deserialize()?;

    if let Some(base_url) = args.base_url {
        settings.base_url = base_url;
    }

    Ok((settings, args.token))
}
