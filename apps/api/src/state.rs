use std::sync::Arc;

use crate::clock::Clock;
use crate::config::Config;
use crate::garden::recorder::InteractionRecorder;
use crate::store::GardenStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Postgres in production, in-memory for local runs and tests.
    pub store: Arc<dyn GardenStore>,
    pub clock: Arc<dyn Clock>,
    /// Sole writer of health, counters, stage and last interaction.
    pub recorder: InteractionRecorder,
    pub config: Config,
}
