use mimalloc::MiMalloc;
use sqlite_gateway::{Config, GatewayState, gateway_router};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = Config::load()?;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cfg.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false),
        )
        .init();

    info!(
        data_dir = %cfg.data_dir.display(),
        listen_addr = %cfg.listen_addr,
        loglevel = %cfg.loglevel,
        token_ttl_secs = cfg.token_ttl_secs,
        max_upload_bytes = cfg.max_upload_bytes
    );
    if cfg.uses_default_secret() {
        warn!("JWT_SECRET_KEY not set; signing tokens with the built-in development key");
    }

    let state = GatewayState::new(&cfg);
    state
        .users
        .initialize(&cfg.seed_username, &cfg.seed_password)
        .await?;

    let app = gateway_router(state);

    let listener = TcpListener::bind(&cfg.listen_addr).await?;
    info!("HTTP server listening on {}", cfg.listen_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
