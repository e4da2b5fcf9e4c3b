//! Axum route handlers for the Garden API.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::garden::contacts;
use crate::garden::ranking::{garden_view, rank, GardenView, PlantHealth, RankedView};
use crate::garden::status::classify;
use crate::models::contact::{Contact, GrowthStage, NewContact, Status};
use crate::models::interaction::{Interaction, InteractionPayload};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub user_id: Uuid,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct ArchiveRequest {
    pub user_id: Uuid,
    pub is_archived: bool,
}

#[derive(Debug, Serialize)]
pub struct ContactResponse {
    pub contact: Contact,
    pub live: PlantHealth,
}

#[derive(Debug, Serialize)]
pub struct WaterResponse {
    pub contact_id: Uuid,
    pub interaction: Interaction,
    pub new_health: f64,
    pub new_stage: GrowthStage,
    pub status: Status,
    pub total_interactions: i32,
    pub last_interaction_at: DateTime<Utc>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/garden
///
/// Every active plant with live-calculated health, most urgent first.
pub async fn handle_get_garden(
    State(state): State<AppState>,
    query: Result<Query<UserIdQuery>, QueryRejection>,
) -> Result<Json<GardenView>, AppError> {
    let Query(params) = query?;
    let contacts = state.store.list_contacts(params.user_id).await?;
    Ok(Json(garden_view(params.user_id, &contacts, state.clock.now())))
}

/// GET /api/v1/garden/attention
pub async fn handle_get_attention(
    State(state): State<AppState>,
    query: Result<Query<UserIdQuery>, QueryRejection>,
) -> Result<Json<RankedView>, AppError> {
    let Query(params) = query?;
    let contacts = state.store.list_contacts(params.user_id).await?;
    Ok(Json(rank(&contacts, state.clock.now())))
}

/// POST /api/v1/contacts
pub async fn handle_create_contact(
    State(state): State<AppState>,
    body: Result<Json<NewContact>, JsonRejection>,
) -> Result<(StatusCode, Json<Contact>), AppError> {
    let Json(req) = body?;
    let contact = contacts::create_contact(
        state.store.as_ref(),
        req,
        &state.config.decay_defaults,
        state.clock.now(),
    )
    .await?;
    Ok((StatusCode::CREATED, Json(contact)))
}

/// GET /api/v1/contacts/:id
pub async fn handle_get_contact(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    query: Result<Query<UserIdQuery>, QueryRejection>,
) -> Result<Json<ContactResponse>, AppError> {
    let Query(params) = query?;
    let contact = contacts::owned_contact(state.store.as_ref(), params.user_id, id).await?;
    let live = PlantHealth::assess(&contact, state.clock.now());
    Ok(Json(ContactResponse { contact, live }))
}

/// PATCH /api/v1/contacts/:id/archive
pub async fn handle_set_archived(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    body: Result<Json<ArchiveRequest>, JsonRejection>,
) -> Result<Json<Contact>, AppError> {
    let Json(req) = body?;
    let contact = contacts::set_archived(
        state.store.as_ref(),
        req.user_id,
        id,
        req.is_archived,
        state.clock.now(),
    )
    .await?;
    Ok(Json(contact))
}

/// DELETE /api/v1/contacts/:id
pub async fn handle_delete_contact(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    query: Result<Query<UserIdQuery>, QueryRejection>,
) -> Result<StatusCode, AppError> {
    let Query(params) = query?;
    contacts::delete_contact(state.store.as_ref(), params.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/contacts/:id/water
///
/// Logs an interaction ("waters" the plant): health back to 1.0, counter
/// and growth stage advanced, all in one transaction.
pub async fn handle_water(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    body: Result<Json<InteractionPayload>, JsonRejection>,
) -> Result<Json<WaterResponse>, AppError> {
    let Json(payload) = body?;
    let watering = state.recorder.record_interaction(id, payload).await?;
    let contact = watering.contact;
    Ok(Json(WaterResponse {
        contact_id: contact.id,
        interaction: watering.interaction,
        new_health: contact.health_score,
        new_stage: contact.growth_stage,
        status: classify(contact.health_score),
        total_interactions: contact.total_interactions,
        last_interaction_at: contact.last_interaction_at,
    }))
}

/// GET /api/v1/contacts/:id/interactions
pub async fn handle_list_interactions(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    query: Result<Query<HistoryQuery>, QueryRejection>,
) -> Result<Json<Vec<Interaction>>, AppError> {
    let Query(params) = query?;
    let history =
        contacts::list_interactions(state.store.as_ref(), params.user_id, id, params.limit).await?;
    Ok(Json(history))
}

/// DELETE /api/v1/interactions/:id
pub async fn handle_delete_interaction(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    query: Result<Query<UserIdQuery>, QueryRejection>,
) -> Result<StatusCode, AppError> {
    let Query(params) = query?;
    contacts::delete_interaction(state.store.as_ref(), params.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/admin/contacts/:id/seed-interactions
///
/// History backfill. Inserts without recomputing the contact; disabled
/// unless ENABLE_SEED_ENDPOINT is set.
pub async fn handle_seed_interaction(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    body: Result<Json<InteractionPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<Interaction>), AppError> {
    if !state.config.enable_seed_endpoint {
        return Err(AppError::Forbidden);
    }
    let Json(payload) = body?;
    let interaction = state.recorder.seed_interaction(id, payload).await?;
    Ok((StatusCode::CREATED, Json(interaction)))
}
