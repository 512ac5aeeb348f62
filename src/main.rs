use anyhow::Context;
use clap::Parser;
use scrollshot::{setup_logging, Cli, CliRunner, Config};
use std::time::Duration;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    setup_logging(args.verbose)?;

    info!("Starting scrollshot v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config(&args).await?;
    let runner = CliRunner::new(config);

    if let Err(e) = runner.run(args.command).await {
        error!("Capture failed: {e:#}");
        std::process::exit(1);
    }

    Ok(())
}

async fn load_config(args: &Cli) -> anyhow::Result<Config> {
    let mut config = if let Some(config_path) = &args.config {
        let config_content = tokio::fs::read_to_string(config_path)
            .await
            .with_context(|| format!("Failed to read {}", config_path.display()))?;
        serde_json::from_str(&config_content)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?
    } else {
        Config::default()
    };

    // CLI arguments override the file
    if let Some(timeout) = args.timeout {
        config.navigation_timeout = Duration::from_secs(timeout);
    }

    if let Some(wait_timeout) = args.wait_timeout {
        config.wait_timeout = Duration::from_secs(wait_timeout);
    }

    if let Some(chrome_path) = &args.chrome_path {
        config.chrome_path = Some(chrome_path.clone());
    }

    if args.headed {
        config.headless = false;
    }

    config.validate()?;

    info!("Configuration loaded successfully");
    info!(
        "Viewport: {}x{}",
        config.viewport.width, config.viewport.height
    );
    info!("Navigation timeout: {:?}", config.navigation_timeout);
    info!(
        "Scroll: {}px every {:?}",
        config.scroll.step, config.scroll.step_delay
    );

    Ok(config)
}
