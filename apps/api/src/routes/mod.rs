pub mod health;

use axum::{
    routing::{delete, get, patch, post},
    Router,
};

use crate::garden::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Read side
        .route("/api/v1/garden", get(handlers::handle_get_garden))
        .route(
            "/api/v1/garden/attention",
            get(handlers::handle_get_attention),
        )
        // Contacts
        .route("/api/v1/contacts", post(handlers::handle_create_contact))
        .route(
            "/api/v1/contacts/:id",
            get(handlers::handle_get_contact).delete(handlers::handle_delete_contact),
        )
        .route(
            "/api/v1/contacts/:id/archive",
            patch(handlers::handle_set_archived),
        )
        // Interactions
        .route("/api/v1/contacts/:id/water", post(handlers::handle_water))
        .route(
            "/api/v1/contacts/:id/interactions",
            get(handlers::handle_list_interactions),
        )
        .route(
            "/api/v1/interactions/:id",
            delete(handlers::handle_delete_interaction),
        )
        // Backfill (gated by ENABLE_SEED_ENDPOINT)
        .route(
            "/api/v1/admin/contacts/:id/seed-interactions",
            post(handlers::handle_seed_interaction),
        )
        .with_state(state)
}
