//! Contact lifecycle: onboarding, lookup with ownership checks, soft and
//! hard delete, and interaction history.

use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::garden::decay::DecayDefaults;
use crate::models::contact::{Contact, GrowthStage, NewContact};
use crate::models::interaction::Interaction;
use crate::store::GardenStore;

pub const DEFAULT_HISTORY_LIMIT: i64 = 20;
pub const MAX_HISTORY_LIMIT: i64 = 100;

/// Builds a fresh plant: full health, no interactions, `seed` stage.
pub fn new_contact(
    req: NewContact,
    defaults: &DecayDefaults,
    now: DateTime<Utc>,
) -> Result<Contact, AppError> {
    let name = req.name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("name cannot be empty".to_string()));
    }

    let decay_rate = match req.decay_rate {
        Some(rate) if !rate.is_finite() || rate <= 0.0 => {
            return Err(AppError::Validation(format!(
                "decay_rate must be a positive number, got {rate}"
            )))
        }
        Some(rate) => rate,
        None => defaults.rate_for(req.tier),
    };

    Ok(Contact {
        id: Uuid::new_v4(),
        user_id: req.user_id,
        name: name.to_string(),
        email: req.email,
        company: req.company,
        title: req.title,
        tier: req.tier,
        growth_stage: GrowthStage::Seed,
        health_score: 1.0,
        decay_rate,
        last_interaction_at: now,
        total_interactions: 0,
        is_favorite: req.is_favorite,
        is_archived: false,
        tags: req.tags,
        created_at: now,
        updated_at: now,
    })
}

pub async fn create_contact(
    store: &dyn GardenStore,
    req: NewContact,
    defaults: &DecayDefaults,
    now: DateTime<Utc>,
) -> Result<Contact, AppError> {
    let contact = new_contact(req, defaults, now)?;
    store.insert_contact(&contact).await?;
    info!(
        "Planted contact {} ({}) for user {}",
        contact.id,
        contact.tier.as_str(),
        contact.user_id
    );
    Ok(contact)
}

/// Loads a contact and checks it belongs to `user_id`.
pub async fn owned_contact(
    store: &dyn GardenStore,
    user_id: Uuid,
    id: Uuid,
) -> Result<Contact, AppError> {
    let contact = store
        .get_contact(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Contact {id} not found")))?;
    if contact.user_id != user_id {
        return Err(AppError::Forbidden);
    }
    Ok(contact)
}

/// Soft delete (or restore). Health and counters are left untouched.
pub async fn set_archived(
    store: &dyn GardenStore,
    user_id: Uuid,
    id: Uuid,
    archived: bool,
    now: DateTime<Utc>,
) -> Result<Contact, AppError> {
    owned_contact(store, user_id, id).await?;
    let contact = store
        .set_archived(id, archived, now)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Contact {id} not found")))?;
    info!("Contact {id} archived={archived}");
    Ok(contact)
}

pub async fn delete_contact(
    store: &dyn GardenStore,
    user_id: Uuid,
    id: Uuid,
) -> Result<(), AppError> {
    owned_contact(store, user_id, id).await?;
    if !store.delete_contact(id).await? {
        return Err(AppError::NotFound(format!("Contact {id} not found")));
    }
    info!("Deleted contact {id} and its interactions");
    Ok(())
}

pub async fn list_interactions(
    store: &dyn GardenStore,
    user_id: Uuid,
    contact_id: Uuid,
    limit: Option<i64>,
) -> Result<Vec<Interaction>, AppError> {
    owned_contact(store, user_id, contact_id).await?;
    let limit = limit
        .unwrap_or(DEFAULT_HISTORY_LIMIT)
        .clamp(1, MAX_HISTORY_LIMIT);
    store.list_interactions(contact_id, limit).await
}

/// Removes a single interaction row. Counters are monotonic, so the
/// contact's derived state is left as is.
pub async fn delete_interaction(
    store: &dyn GardenStore,
    user_id: Uuid,
    id: Uuid,
) -> Result<(), AppError> {
    let interaction = store
        .get_interaction(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Interaction {id} not found")))?;
    if interaction.user_id != user_id {
        return Err(AppError::Forbidden);
    }
    store.delete_interaction(id).await?;
    Ok(())
}
