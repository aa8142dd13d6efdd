use std::sync::Arc;

use backend::{AppState, build_engine, config::Config, create_router};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "backend=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::parse();
    let engine = build_engine(&config);
    tracing::info!(
        policy = ?engine.policy(),
        live = engine.has_primary(),
        "route engine ready"
    );

    let state = AppState {
        engine: Arc::new(engine),
    };
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    tracing::info!("starting backend on http://{}", config.bind);
    axum::serve(listener, app).await?;
    Ok(())
}
