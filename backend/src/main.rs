//! Backend entry-point: loads settings, prepares storage and serves the API.

mod server;

use std::time::Duration;

use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use bookhub::outbound::persistence::{DbPool, PoolConfig, apply_migrations};
use bookhub::settings::BookhubSettings;
use server::{ServerConfig, create_server, health_state_for};

const CONNECTION_TIMEOUT: Duration = Duration::from_secs(5);

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = BookhubSettings::load_from_iter(std::env::args_os())
        .map_err(|e| std::io::Error::other(format!("failed to load settings: {e}")))?;
    let bind_addr = settings.bind_addr().map_err(std::io::Error::other)?;
    let page_limits = settings.page_limits().map_err(std::io::Error::other)?;
    let mut config = ServerConfig::new(bind_addr, page_limits);

    match settings.database_url() {
        Some(url) => {
            if settings.skip_migrations {
                info!("skipping schema migrations");
            } else {
                let applied = apply_migrations(url.to_owned())
                    .await
                    .map_err(std::io::Error::other)?;
                info!(applied, "schema migrations complete");
            }
            let pool = DbPool::new(
                PoolConfig::new(url)
                    .with_max_size(settings.pool_max_size())
                    .with_connection_timeout(CONNECTION_TIMEOUT),
            )
            .await
            .map_err(std::io::Error::other)?;
            config = config.with_db_pool(pool);
        }
        None => warn!("no database configured; using in-memory storage"),
    }

    #[cfg(feature = "metrics")]
    {
        config = config.with_metrics(Some(server::make_metrics()?));
    }

    let health_state = health_state_for(&config);
    info!(%bind_addr, "starting server");
    create_server(health_state, config)?.await
}
