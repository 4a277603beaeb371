//! Assayer Shell
//!
//! Development server for the client: serves the built `index.html` and
//! assets, answers page navigations through the route table and forwards
//! API prefixes to the backend.
//!
//! Run with: cargo run --bin assayer

use assayer::config::Config;
use assayer::shell::{self, Shell};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let loaded = Config::load_default();
    assayer::logging::init(&loaded.config.logging);
    loaded.log();
    let config = loaded.config;

    tracing::info!("Assayer shell v{}", env!("CARGO_PKG_VERSION"));

    if config.proxy.enabled {
        tracing::info!(origin = %config.proxy.backend_origin, "Proxying API requests");
    } else {
        tracing::info!("Proxy disabled");
    }

    let shell = Shell::development(&config)?;
    shell::serve(shell, &config.shell).await?;

    Ok(())
}
