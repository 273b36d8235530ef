//! tablerest server
//!
//! Serves read-only REST queries over tenant schemas in PostgreSQL.

use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use tablerest_postgres::TenantExecutor;
use tablerest_server::{serve, AppState, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let settings = cli.pool_settings();
    let pool = tablerest_postgres::connect(&cli.database_url, &settings).await?;
    info!(
        max_connections = settings.max_connections,
        min_connections = settings.min_connections,
        "connected to database"
    );

    let mut state = AppState::new(TenantExecutor::new(pool, cli.statement_timeout_ms))
        .tenant_header(cli.tenant_header.clone())
        .request_timeout(cli.request_timeout());
    if cli.no_relationship_cache {
        info!("relationship cache disabled");
        state = state.without_cache();
    }

    let listener = TcpListener::bind(cli.listen).await?;
    serve(listener, Arc::new(state)).await?;
    Ok(())
}
