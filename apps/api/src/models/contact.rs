use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Relationship category. Controls the default decay rate a contact is
/// created with; the stored per-contact rate wins afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "text", rename_all = "snake_case")]
pub enum Tier {
    /// Low-touch: acquaintances, ~90-day half-life.
    Succulent,
    /// Standard: friends and peers, ~30-day half-life.
    Fern,
    /// High-touch: family, mentors, partner, ~14-day half-life.
    Orchid,
    /// Professional network, ~60-day half-life.
    Bonsai,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Succulent => "succulent",
            Tier::Fern => "fern",
            Tier::Orchid => "orchid",
            Tier::Bonsai => "bonsai",
        }
    }
}

/// Cumulative-interaction milestone. Variant order is the growth order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "text", rename_all = "snake_case")]
pub enum GrowthStage {
    Seed,
    Sprout,
    Sapling,
    Mature,
    Ancient,
}

/// Ordinal health bucket. Variant order is urgency order, so
/// `Dormant > AtRisk > Cooling > Thriving`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Thriving,
    Cooling,
    AtRisk,
    Dormant,
}

impl Status {
    /// At-risk and dormant plants are surfaced in the attention list.
    pub fn needs_attention(&self) -> bool {
        matches!(self, Status::AtRisk | Status::Dormant)
    }
}

/// A tracked relationship, rendered as a plant in the garden.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Contact {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub company: Option<String>,
    pub title: Option<String>,
    pub tier: Tier,
    pub growth_stage: GrowthStage,
    /// Last persisted health. 1.0 right after a watering; read paths
    /// recompute from `last_interaction_at` and `decay_rate` instead.
    pub health_score: f64,
    /// λ, per day.
    pub decay_rate: f64,
    pub last_interaction_at: DateTime<Utc>,
    pub total_interactions: i32,
    pub is_favorite: bool,
    pub is_archived: bool,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields accepted when a contact is created at import/onboarding.
#[derive(Debug, Clone, Deserialize)]
pub struct NewContact {
    pub user_id: Uuid,
    pub name: String,
    pub tier: Tier,
    pub decay_rate: Option<f64>,
    pub email: Option<String>,
    pub company: Option<String>,
    pub title: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_favorite: bool,
}
