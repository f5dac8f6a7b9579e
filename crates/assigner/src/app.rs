use std::sync::Arc;

use anyhow::Context;
use secrecy::ExposeSecret;
use sqlx::{PgPool, postgres::PgPoolOptions};
use tokio::net::TcpListener;
use tracing::info;

use crate::{AppState, config::AssignerConfig, db::MIGRATOR, lifecycle::ReviewService, routes};

pub struct Server;

impl Server {
    /// Connects to the database, applies migrations and serves until Ctrl-C.
    pub async fn run(config: AssignerConfig) -> anyhow::Result<()> {
        if !config.startup_delay.is_zero() {
            info!(
                delay_secs = config.startup_delay.as_secs(),
                "waiting before connecting to database"
            );
            tokio::time::sleep(config.startup_delay).await;
        }

        let pool = Self::connect(&config).await?;
        MIGRATOR
            .run(&pool)
            .await
            .context("failed to run database migrations")?;
        info!("successfully connected to database");

        let state = AppState::new(config.clone(), Arc::new(ReviewService::new(pool.clone())));
        let router = routes::router(state);

        let listener = TcpListener::bind(&config.listen_addr)
            .await
            .with_context(|| format!("failed to bind {}", config.listen_addr))?;
        info!(listen_addr = %config.listen_addr, "server starting");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("server error")?;

        pool.close().await;
        info!("server stopped");
        Ok(())
    }

    async fn connect(config: &AssignerConfig) -> anyhow::Result<PgPool> {
        PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(config.database_url.expose_secret())
            .await
            .context("failed to connect to database")
    }
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(?error, "failed to install shutdown handler");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
