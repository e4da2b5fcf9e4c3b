mod clock;
mod config;
mod db;
mod errors;
mod garden;
mod models;
mod routes;
mod state;
mod store;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::db::open_store;
use crate::garden::decay::half_life_days;
use crate::garden::recorder::{InteractionRecorder, RetryPolicy};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Garden API v{}", env!("CARGO_PKG_VERSION"));

    let defaults = config.decay_defaults;
    info!(
        "Tier half-lives (days): succulent {:.0}, fern {:.0}, orchid {:.0}, bonsai {:.0}",
        half_life_days(defaults.succulent),
        half_life_days(defaults.fern),
        half_life_days(defaults.orchid),
        half_life_days(defaults.bonsai),
    );

    let store = open_store(&config).await?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let policy = RetryPolicy {
        max_attempts: config.recorder_max_attempts,
        attempt_timeout: config.recorder_attempt_timeout,
        ..RetryPolicy::default()
    };
    info!(
        "Interaction recorder: {} attempt(s), {}ms per attempt",
        policy.max_attempts,
        policy.attempt_timeout.as_millis()
    );
    if config.enable_seed_endpoint {
        info!("History backfill endpoint is ENABLED");
    }

    let state = AppState {
        recorder: InteractionRecorder::new(store.clone(), clock.clone(), policy),
        store,
        clock,
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the mobile client's domains are fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
