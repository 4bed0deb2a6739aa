//! Gatekey API server binary.

use clap::Parser;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use gatekey_api::config::{ApiConfig, resolve_secret};

/// CLI arguments for the Gatekey server.
#[derive(Parser, Debug)]
#[command(name = "gatekey_server", about = "Gatekey authentication server")]
struct Args {
    /// Port to listen on (0 = ephemeral).
    #[arg(long, env = "PORT", default_value_t = 5000)]
    port: u16,

    /// PostgreSQL connection URL.
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "postgres://localhost:5432/gatekey"
    )]
    database_url: String,

    /// Maximum number of database connections in the pool.
    #[arg(long, default_value_t = 5)]
    max_connections: u32,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,gatekey_api=debug,gatekey_core=debug".parse().unwrap()),
        )
        .init();

    let args = Args::parse();

    info!(port = args.port, "starting gatekey_server");

    let pool = PgPoolOptions::new()
        .max_connections(args.max_connections)
        .acquire_timeout(std::time::Duration::from_secs(30))
        .connect(&args.database_url)
        .await?;

    info!("running database migrations");
    gatekey_api::migrate(&pool).await?;

    let config = ApiConfig {
        bind_addr: format!("127.0.0.1:{}", args.port),
        database_url: args.database_url,
        access_token_secret: resolve_secret("ACCESS_TOKEN_SECRET", "access-secret"),
        refresh_token_secret: resolve_secret("REFRESH_TOKEN_SECRET", "refresh-secret"),
    };

    let state = gatekey_api::AppState {
        pool,
        config: config.clone(),
    };
    let app = gatekey_api::router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    let local_addr = listener.local_addr()?;

    info!(addr = %local_addr, "gatekey API listening");

    axum::serve(listener, app).await?;

    Ok(())
}
