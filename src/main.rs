//! Ember Clash Server
//!
//! Binary entrypoint: logging, optional config file, then the server.
//!
//! Usage: `emberclash-server [config.json] [addr]`

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use emberclash::{GameConfig, Server, DEFAULT_ADDR, VERSION};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("reading config file {path}"))?;
            serde_json::from_str(&raw).with_context(|| format!("parsing config file {path}"))?
        }
        None => GameConfig::default(),
    };
    let addr = args.next().unwrap_or_else(|| DEFAULT_ADDR.to_string());

    info!("Ember Clash Server v{}", VERSION);
    info!(
        "arena {}x{}, seed {:?}, {} bots",
        config.world.width, config.world.height, config.world.seed, config.bot.count
    );

    let server = Server::bind(&addr, config).await?;
    server.run().await?;
    Ok(())
}
