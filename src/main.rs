use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use drinks_api::auth::TokenVerifier;
use drinks_api::config::AppConfig;
use drinks_api::database::{DrinkStore, MemoryDrinkStore, PgDrinkStore};
use drinks_api::{router, AppContext};

#[derive(Parser)]
#[command(name = "drinks-api")]
#[command(about = "Coffee shop drinks catalog API")]
#[command(version)]
struct Args {
    #[arg(long, help = "Port to listen on (overrides DRINKS_PORT)")]
    port: Option<u16>,

    #[arg(long, help = "Keep drinks in memory instead of PostgreSQL")]
    in_memory: bool,

    #[arg(long, help = "Drop and recreate the drinks table, seeding one drink")]
    reset_db: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, AUTH0_DOMAIN, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("drinks_api=info,tower_http=info")),
        )
        .init();

    let args = Args::parse();
    let mut config = AppConfig::from_env().context("invalid configuration")?;
    if let Some(port) = args.port {
        config.server.port = port;
    }
    tracing::info!("Starting drinks API in {:?} mode", config.environment);

    let verifier = TokenVerifier::load(&config.auth)
        .await
        .context("failed to load token signing keys")?;
    tracing::info!("Trusting {} signing key(s)", verifier.key_count());

    let store = connect_store(&args, &config).await?;
    let ctx = AppContext::new(store, verifier);
    let app = router(ctx.clone(), &config.security);

    let bind_addr = format!("{}:{}", config.server.bind, config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    tracing::info!("Listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    ctx.close().await;
    tracing::info!("Shut down cleanly");
    Ok(())
}

async fn connect_store(args: &Args, config: &AppConfig) -> anyhow::Result<Arc<dyn DrinkStore>> {
    if args.in_memory {
        tracing::warn!("Using in-memory store; drinks are lost on exit");
        let store = MemoryDrinkStore::new();
        if args.reset_db {
            store.insert(drinks_api::database::seed_drink()).await?;
        }
        return Ok(Arc::new(store));
    }

    let url = config.database_url()?;
    let store = PgDrinkStore::connect(url, &config.database)
        .await
        .context("failed to connect to database")?;

    if args.reset_db {
        if config.is_production() {
            tracing::warn!("Resetting the drinks table in production");
        }
        store.reset().await.context("failed to reset drinks table")?;
    } else {
        store.ensure_schema().await.context("failed to create drinks table")?;
    }

    Ok(Arc::new(store))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}
