use std::net::SocketAddr;
use std::sync::Arc;

use deepseek_gateway::{config::Config, routes, state::AppState};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(f) => f,
        Err(_) => config.log_level.parse::<EnvFilter>().unwrap_or_else(|e| {
            eprintln!(
                "WARN: GATEWAY_LOG='{}' is not a valid tracing filter ({e}); falling back to 'info'",
                config.log_level
            );
            EnvFilter::new("info")
        }),
    };
    let subscriber = tracing_subscriber::fmt().with_env_filter(env_filter).with_target(true);
    if config.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    if config.api_key.is_none() {
        warn!("DEEPSEEK_API_KEY is not set; sendMessage will report a configuration error");
    }

    let addr: SocketAddr = config.bind_address.parse()?;
    let state = Arc::new(AppState::new(config));
    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, version = env!("CARGO_PKG_VERSION"), "gateway listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to install CTRL+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => warn!(error = %e, "failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    info!("shutdown signal received");
}
