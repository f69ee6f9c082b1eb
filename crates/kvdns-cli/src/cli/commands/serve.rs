//! `kvdns serve` - answer DNS queries from the record store.

use anyhow::{Context as _, Result};
use tracing::info;

use super::Context;
use crate::cli::args::ServeArgs;

pub async fn execute(ctx: Context, args: ServeArgs) -> Result<()> {
    let mut config = ctx.config;
    if let Some(listen) = args.listen {
        config.listen = listen;
    }
    if let Some(ttl) = args.ttl {
        config.ttl = ttl;
    }
    if let Some(api_listen) = args.api_listen {
        config.api_listen = api_listen;
    }
    config.disable_tcp |= args.disable_tcp;
    config.disable_udp |= args.disable_udp;
    config.disable_api |= args.disable_api;
    config.validate()?;

    tokio::select! {
        result = kvdns_srv::server::run(&config) => {
            result.context("server stopped")?;
        }
        signal = tokio::signal::ctrl_c() => {
            signal.context("failed to listen for shutdown signal")?;
            info!("shutdown requested");
        }
    }

    Ok(())
}
