use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use client_core::StateController;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use view::{render, render_to_json, render_to_text};

mod config;

use config::{load_settings, OutputFormat, Settings};

/// Fetch the astronomy picture of the day once and print its view.
#[derive(Parser, Debug)]
struct Args {
    /// Endpoint url; may contain an `{api_key}` placeholder
    #[arg(long)]
    endpoint: Option<String>,
    #[arg(long)]
    api_key: Option<String>,
    #[arg(long, value_enum)]
    output: Option<OutputFormat>,
    /// Config file to read instead of ./viewer.toml
    #[arg(long)]
    config: Option<PathBuf>,
}

impl Args {
    fn apply(self, settings: &mut Settings) {
        if let Some(v) = self.endpoint {
            settings.endpoint = v;
        }
        if let Some(v) = self.api_key {
            settings.api_key = v;
        }
        if let Some(v) = self.output {
            settings.output = v;
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let mut settings = load_settings(args.config.as_deref()).context("failed to load settings")?;
    args.apply(&mut settings);

    let mut controller = StateController::http(settings.request_config());
    debug!(view = %render_to_text(&render(&controller.state())), "initial view");

    let state = controller.activate().await;
    let tree = render(&state);
    match settings.output {
        OutputFormat::Text => print!("{}", render_to_text(&tree)),
        OutputFormat::Json => {
            println!("{}", render_to_json(&tree).context("failed to encode view as json")?)
        }
    }

    Ok(())
}
