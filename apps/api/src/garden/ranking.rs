//! Read-side projections: the attention list and the full garden view.
//!
//! Health is recomputed on the fly from `last_interaction_at` and
//! `decay_rate`; the stored `health_score` is never read or written here.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::garden::decay::{compute_health, days_until_threshold, elapsed_days};
use crate::garden::status::{classify, COOLING_THRESHOLD};
use crate::models::contact::{Contact, GrowthStage, Status, Tier};

/// A single contact rendered as a plant, with live health.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlantHealth {
    pub id: Uuid,
    pub name: String,
    pub tier: Tier,
    pub growth_stage: GrowthStage,
    pub health_score: f64,
    pub status: Status,
    /// Days until the plant drops out of `thriving`/`cooling` into `at_risk`.
    pub days_until_cooling: Option<f64>,
    pub days_since_interaction: f64,
    pub last_interaction_at: DateTime<Utc>,
    pub total_interactions: i32,
    pub is_favorite: bool,
    pub tags: Vec<String>,
}

impl PlantHealth {
    pub fn assess(contact: &Contact, now: DateTime<Utc>) -> Self {
        let health_score = compute_health(contact.last_interaction_at, contact.decay_rate, now);
        Self {
            id: contact.id,
            name: contact.name.clone(),
            tier: contact.tier,
            growth_stage: contact.growth_stage,
            health_score,
            status: classify(health_score),
            days_until_cooling: days_until_threshold(
                health_score,
                contact.decay_rate,
                COOLING_THRESHOLD,
            ),
            days_since_interaction: elapsed_days(contact.last_interaction_at, now),
            last_interaction_at: contact.last_interaction_at,
            total_interactions: contact.total_interactions,
            is_favorite: contact.is_favorite,
            tags: contact.tags.clone(),
        }
    }
}

/// Attention list stamped with the instant it was computed for.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RankedView {
    pub as_of: DateTime<Utc>,
    pub total_plants: usize,
    pub avg_health: f64,
    /// At-risk and dormant plants, most urgent first.
    pub needs_attention: Vec<PlantHealth>,
}

/// The whole garden for one owner.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GardenView {
    pub user_id: Uuid,
    pub as_of: DateTime<Utc>,
    pub total_plants: usize,
    pub avg_health: f64,
    pub needs_attention: usize,
    /// Every active plant, most urgent first.
    pub plants: Vec<PlantHealth>,
}

/// Lowest health first, then longest-neglected, then id.
fn by_urgency(a: &PlantHealth, b: &PlantHealth) -> Ordering {
    a.health_score
        .total_cmp(&b.health_score)
        .then_with(|| a.last_interaction_at.cmp(&b.last_interaction_at))
        .then_with(|| a.id.cmp(&b.id))
}

/// Live health for every non-archived contact, sorted by urgency.
pub fn assess_garden(contacts: &[Contact], now: DateTime<Utc>) -> Vec<PlantHealth> {
    let mut plants: Vec<PlantHealth> = contacts
        .iter()
        .filter(|c| !c.is_archived)
        .map(|c| PlantHealth::assess(c, now))
        .collect();
    plants.sort_by(by_urgency);
    plants
}

fn average_health(plants: &[PlantHealth]) -> f64 {
    if plants.is_empty() {
        return 0.0;
    }
    plants.iter().map(|p| p.health_score).sum::<f64>() / plants.len() as f64
}

pub fn rank(contacts: &[Contact], now: DateTime<Utc>) -> RankedView {
    let plants = assess_garden(contacts, now);
    RankedView {
        as_of: now,
        total_plants: plants.len(),
        avg_health: average_health(&plants),
        needs_attention: plants
            .into_iter()
            .filter(|p| p.status.needs_attention())
            .collect(),
    }
}

pub fn garden_view(user_id: Uuid, contacts: &[Contact], now: DateTime<Utc>) -> GardenView {
    let plants = assess_garden(contacts, now);
    GardenView {
        user_id,
        as_of: now,
        total_plants: plants.len(),
        avg_health: average_health(&plants),
        needs_attention: plants
            .iter()
            .filter(|p| p.status.needs_attention())
            .count(),
        plants,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2025-06-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    /// Contact whose live health at `now()` is exactly `health` after
    /// `days_ago` days of silence.
    fn plant_with_health(name: &str, health: f64, days_ago: f64) -> Contact {
        let decay_rate = -health.ln() / days_ago;
        let last = now() - Duration::milliseconds((days_ago * 86_400_000.0) as i64);
        Contact {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            name: name.to_string(),
            email: None,
            company: None,
            title: None,
            tier: Tier::Fern,
            growth_stage: GrowthStage::Sprout,
            health_score: 1.0,
            decay_rate,
            last_interaction_at: last,
            total_interactions: 4,
            is_favorite: false,
            is_archived: false,
            tags: vec![],
            created_at: last,
            updated_at: last,
        }
    }

    /// Contact silent for a whole number of days at a given rate.
    fn plant(name: &str, decay_rate: f64, days_ago: i64) -> Contact {
        Contact {
            decay_rate,
            last_interaction_at: now() - Duration::days(days_ago),
            ..plant_with_health(name, 0.5, 1.0)
        }
    }

    #[test]
    fn test_needs_attention_orders_ties_by_neglect() {
        // 0.125 * 24 == 0.25 * 12 == 3.0 exactly, so both sit at e^-3 ≈ 0.05.
        let recent = plant("Kevin Park", 0.25, 12);
        let older = plant("Jake Williams", 0.125, 24);
        let at_risk = plant("Alex Thompson", 0.12, 10);
        let contacts = vec![recent.clone(), at_risk.clone(), older.clone()];

        let view = rank(&contacts, now());

        assert_eq!(
            view.needs_attention[0].health_score.to_bits(),
            view.needs_attention[1].health_score.to_bits()
        );
        let ids: Vec<Uuid> = view.needs_attention.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![older.id, recent.id, at_risk.id]);
        assert_eq!(view.needs_attention[0].status, Status::Dormant);
        assert_eq!(view.needs_attention[2].status, Status::AtRisk);
    }

    #[test]
    fn test_exact_tie_breaks_on_lower_health_then_neglect() {
        // Same rate and same silence produce bit-identical health, so the
        // tie falls through to last_interaction_at and then id.
        let mut a = plant_with_health("Omar Hassan", 0.05, 60.0);
        let mut b = a.clone();
        b.id = Uuid::new_v4();
        let healthy = plant_with_health("Grace Liu", 0.95, 1.0);
        if b.id < a.id {
            std::mem::swap(&mut a, &mut b);
        }

        let view = rank(&[b.clone(), healthy, a.clone()], now());
        let ids: Vec<Uuid> = view.needs_attention.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![a.id, b.id]);
    }

    #[test]
    fn test_thriving_and_cooling_are_excluded() {
        let thriving = plant_with_health("Mom", 0.9, 2.0);
        let cooling = plant_with_health("Dad", 0.5, 30.0);
        let view = rank(&[thriving, cooling], now());
        assert!(view.needs_attention.is_empty());
        assert_eq!(view.total_plants, 2);
    }

    #[test]
    fn test_avg_health_is_mean_of_live_scores() {
        let a = plant_with_health("Sarah Chen", 0.8, 10.0);
        let b = plant_with_health("David Kim", 0.2, 40.0);
        let view = rank(&[a, b], now());
        assert!((view.avg_health - 0.5).abs() < 1e-9, "avg was {}", view.avg_health);
    }

    #[test]
    fn test_empty_garden_averages_zero() {
        let view = rank(&[], now());
        assert_eq!(view.avg_health, 0.0);
        assert!(view.needs_attention.is_empty());
        assert_eq!(view.as_of, now());
    }

    #[test]
    fn test_archiving_removes_from_views_but_keeps_stored_health() {
        let neglected = plant_with_health("Sean Murphy", 0.05, 120.0);
        let fine = plant_with_health("Laura Kim", 0.9, 3.0);
        let mut contacts = vec![neglected.clone(), fine.clone()];

        let before = rank(&contacts, now());
        assert_eq!(before.needs_attention.len(), 1);

        contacts[0].is_archived = true;
        let after = rank(&contacts, now());
        assert!(after.needs_attention.is_empty());
        assert!((after.avg_health - 0.9).abs() < 1e-9);
        assert_eq!(contacts[0].health_score, neglected.health_score);
    }

    #[test]
    fn test_rank_is_idempotent() {
        let contacts = vec![
            plant_with_health("Ryan O'Connor", 0.05, 70.0),
            plant_with_health("Lily Tanaka", 0.15, 50.0),
            plant_with_health("Nadia Volkov", 0.75, 5.0),
        ];
        let snapshot = contacts.clone();
        assert_eq!(rank(&contacts, now()), rank(&contacts, now()));
        assert_eq!(contacts, snapshot);
    }

    #[test]
    fn test_garden_view_lists_every_active_plant() {
        let contacts = vec![
            plant_with_health("Michael Zhang", 0.95, 2.0),
            plant_with_health("Jennifer Wu", 0.05, 80.0),
            Contact {
                is_archived: true,
                ..plant_with_health("Robert Taylor", 0.5, 30.0)
            },
        ];
        let view = garden_view(Uuid::nil(), &contacts, now());

        assert_eq!(view.total_plants, 2);
        assert_eq!(view.needs_attention, 1);
        assert_eq!(view.plants[0].name, "Jennifer Wu");
        assert_eq!(view.plants[0].days_until_cooling, None);
        assert!(view.plants[1].days_until_cooling.unwrap() > 0.0);
    }
}
