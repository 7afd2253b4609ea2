//! scanview - live terminal display for image scans

use anyhow::{Context, Result};
use clap::Parser;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use scanview_cli::demo::{self, DemoOptions};
use scanview_cli::ui::Display;
use scanview_cli::{Cli, Commands, UiConfig};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging; stderr is shared with the frame, so keep it quiet unless asked
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = UiConfig::load(cli.config.as_deref())
        .context("failed to load display settings")?
        .with_no_color(cli.no_color)
        .with_results(cli.results);
    tracing::debug!(?config, "display settings");

    match cli.command {
        Commands::Demo {
            image,
            layers,
            step_ms,
            fail_with,
            violations,
            new_version,
        } => {
            let opts = DemoOptions {
                image,
                layers,
                step: Duration::from_millis(step_ms),
                fail_with,
                violations,
                new_version,
            };
            let (publisher, events) = scanview_bus::channel(scanview_bus::DEFAULT_CAPACITY);
            let producer = tokio::spawn(async move {
                if let Err(e) = demo::run_pipeline(publisher, opts).await {
                    tracing::debug!(error = %e, "pipeline stopped publishing");
                }
            });

            Display::new(&config).display_events(events).await;
            producer.abort();
            Ok(())
        }
    }
}
