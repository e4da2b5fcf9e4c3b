//! InteractionRecorder: the only writer of a contact's derived state.
//!
//! Watering a plant inserts the interaction and, in the same unit of work,
//! bumps `total_interactions`, advances the growth stage, resets health to
//! 1.0 and moves `last_interaction_at`. Lost races are retried with
//! exponential backoff; everything else fails fast.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

use crate::clock::Clock;
use crate::errors::AppError;
use crate::garden::growth;
use crate::models::contact::Contact;
use crate::models::interaction::{Interaction, InteractionPayload};
use crate::store::GardenStore;

pub const MAX_NOTES_CHARS: usize = 4000;

/// How far ahead of the server clock `happened_at` may be.
pub const MAX_CLOCK_SKEW_MINUTES: i64 = 5;

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub attempt_timeout: Duration,
    /// Delay before the second attempt; doubles after each conflict.
    pub base_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            attempt_timeout: Duration::from_secs(5),
            base_backoff: Duration::from_millis(25),
        }
    }
}

/// Result of a watering: the stored interaction and the refreshed contact.
#[derive(Debug, Clone)]
pub struct Watering {
    pub interaction: Interaction,
    pub contact: Contact,
}

#[derive(Clone)]
pub struct InteractionRecorder {
    store: Arc<dyn GardenStore>,
    clock: Arc<dyn Clock>,
    policy: RetryPolicy,
}

impl InteractionRecorder {
    pub fn new(store: Arc<dyn GardenStore>, clock: Arc<dyn Clock>, policy: RetryPolicy) -> Self {
        Self {
            store,
            clock,
            policy,
        }
    }

    /// Logs an interaction and refreshes the owning contact atomically.
    pub async fn record_interaction(
        &self,
        contact_id: Uuid,
        payload: InteractionPayload,
    ) -> Result<Watering, AppError> {
        let now = self.clock.now();
        let interaction = build_interaction(contact_id, payload, now)?;
        let owner = interaction.user_id;

        let transition = |current: &Contact| {
            if current.user_id != owner {
                return Err(AppError::Forbidden);
            }
            if current.is_archived {
                return Err(AppError::Archived(current.id));
            }
            Ok(water(current, interaction.happened_at, now))
        };

        let mut backoff = self.policy.base_backoff;
        for attempt in 1..=self.policy.max_attempts {
            if attempt > 1 {
                tokio::time::sleep(backoff).await;
                backoff = backoff.saturating_mul(2);
            }

            let outcome = tokio::time::timeout(
                self.policy.attempt_timeout,
                self.store.commit_interaction(&interaction, &transition),
            )
            .await;

            match outcome {
                Ok(Ok(contact)) => {
                    info!(
                        "Watered contact {} (total {}, stage {:?})",
                        contact.id, contact.total_interactions, contact.growth_stage
                    );
                    return Ok(Watering {
                        interaction,
                        contact,
                    });
                }
                Ok(Err(e)) if e.is_retryable() => {
                    warn!(
                        "Interaction commit for contact {contact_id} conflicted on attempt {attempt}/{}: {e}",
                        self.policy.max_attempts
                    );
                }
                Ok(Err(e)) => return Err(e),
                // The dropped future rolls the transaction back. The commit may
                // or may not have reached the store, so this is not retried.
                Err(_) => {
                    return Err(AppError::StorageUnavailable(format!(
                        "interaction commit timed out after {}ms",
                        self.policy.attempt_timeout.as_millis()
                    )))
                }
            }
        }

        Err(AppError::ConcurrencyConflict {
            attempts: self.policy.max_attempts,
        })
    }

    /// Backfill-only insert. Stores a historical interaction WITHOUT touching
    /// the contact's counters, stage, health or `last_interaction_at`; used to
    /// load history for contacts whose derived state was set directly. Never
    /// call this from the normal watering path.
    pub async fn seed_interaction(
        &self,
        contact_id: Uuid,
        payload: InteractionPayload,
    ) -> Result<Interaction, AppError> {
        let now = self.clock.now();
        let interaction = build_interaction(contact_id, payload, now)?;

        let contact = self
            .store
            .get_contact(contact_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Contact {contact_id} not found")))?;
        if contact.user_id != interaction.user_id {
            return Err(AppError::Forbidden);
        }

        self.store.insert_interaction_raw(&interaction).await?;
        info!(
            "Seeded historical interaction {} for contact {contact_id}",
            interaction.id
        );
        Ok(interaction)
    }
}

/// Next state of a contact after one watering at `happened_at`.
pub fn water(current: &Contact, happened_at: DateTime<Utc>, now: DateTime<Utc>) -> Contact {
    let total_interactions = current.total_interactions.saturating_add(1);
    Contact {
        total_interactions,
        growth_stage: growth::advance(current.growth_stage, total_interactions),
        health_score: 1.0,
        last_interaction_at: current.last_interaction_at.max(happened_at),
        updated_at: now,
        ..current.clone()
    }
}

/// Validates a payload and turns it into an immutable interaction row.
pub fn build_interaction(
    contact_id: Uuid,
    payload: InteractionPayload,
    now: DateTime<Utc>,
) -> Result<Interaction, AppError> {
    if let Some(sentiment) = payload.sentiment {
        if !sentiment.is_finite() || !(-1.0..=1.0).contains(&sentiment) {
            return Err(AppError::Validation(format!(
                "sentiment must be within [-1, 1], got {sentiment}"
            )));
        }
    }
    if let Some(minutes) = payload.duration_minutes {
        if minutes < 0 {
            return Err(AppError::Validation(format!(
                "duration_minutes must not be negative, got {minutes}"
            )));
        }
    }
    if let Some(notes) = &payload.notes {
        if notes.chars().count() > MAX_NOTES_CHARS {
            return Err(AppError::Validation(format!(
                "notes must be at most {MAX_NOTES_CHARS} characters"
            )));
        }
    }
    if let Some(metadata) = &payload.metadata {
        if !matches!(metadata, Value::Object(_)) {
            return Err(AppError::Validation(
                "metadata must be a JSON object".to_string(),
            ));
        }
    }

    let happened_at = payload.happened_at.unwrap_or(now);
    if happened_at > now + chrono::Duration::minutes(MAX_CLOCK_SKEW_MINUTES) {
        return Err(AppError::Validation(format!(
            "happened_at {happened_at} is in the future"
        )));
    }

    Ok(Interaction {
        id: Uuid::new_v4(),
        contact_id,
        user_id: payload.user_id,
        interaction_type: payload.interaction_type,
        source: payload.source,
        notes: payload.notes,
        sentiment: payload.sentiment,
        happened_at,
        duration_minutes: payload.duration_minutes,
        metadata: payload.metadata,
        created_at: now,
    })
}
