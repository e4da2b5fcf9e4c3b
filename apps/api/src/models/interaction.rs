use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "text", rename_all = "snake_case")]
pub enum InteractionType {
    Text,
    Call,
    Email,
    Meeting,
    Coffee,
    VideoCall,
    SocialMedia,
    Letter,
    Gift,
    #[default]
    Other,
}

/// Provenance of an interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "text", rename_all = "snake_case")]
pub enum InteractionSource {
    #[default]
    Manual,
    Imported,
}

/// A logged contact event. Immutable once inserted: rows are only ever
/// inserted or deleted.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Interaction {
    pub id: Uuid,
    pub contact_id: Uuid,
    pub user_id: Uuid,
    #[serde(rename = "type")]
    pub interaction_type: InteractionType,
    pub source: InteractionSource,
    pub notes: Option<String>,
    pub sentiment: Option<f64>,
    pub happened_at: DateTime<Utc>,
    pub duration_minutes: Option<i32>,
    pub metadata: Option<Value>,
    pub created_at: DateTime<Utc>,
}

/// Request body for watering a plant (or backfilling history).
#[derive(Debug, Clone, Deserialize)]
pub struct InteractionPayload {
    pub user_id: Uuid,
    #[serde(rename = "type", default)]
    pub interaction_type: InteractionType,
    #[serde(default)]
    pub source: InteractionSource,
    pub notes: Option<String>,
    pub sentiment: Option<f64>,
    pub happened_at: Option<DateTime<Utc>>,
    pub duration_minutes: Option<i32>,
    pub metadata: Option<Value>,
}
