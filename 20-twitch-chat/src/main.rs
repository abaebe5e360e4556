use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;

use twitch_chat::{
    cli::Cli,
    client::{self, ClientOptions},
    config::Config,
};

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = Config::load(&cli.config)?;
    debug!(?config, "loaded config");

    let options = ClientOptions {
        host: cli.host,
        port: cli.port,
        verbose: cli.verbose,
        mode: cli.mode,
    };
    client::run(&config, &options)
        .await
        .context("chat session failed")?;

    Ok(())
}
