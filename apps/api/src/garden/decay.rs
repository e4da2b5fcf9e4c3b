//! Exponential decay: `health = e^(-λ · days_since_last_interaction)`.
//!
//! Shared by the recorder, the ranker and every read path so there is
//! exactly one formula in the service.

use chrono::{DateTime, Utc};

use crate::models::contact::Tier;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Default λ per tier, applied only when a contact is created.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecayDefaults {
    pub succulent: f64,
    pub fern: f64,
    pub orchid: f64,
    pub bonsai: f64,
}

impl Default for DecayDefaults {
    fn default() -> Self {
        Self {
            succulent: 0.0077, // ~90-day half-life
            fern: 0.0231,      // ~30-day half-life
            orchid: 0.0495,    // ~14-day half-life
            bonsai: 0.0116,    // ~60-day half-life
        }
    }
}

impl DecayDefaults {
    pub fn rate_for(&self, tier: Tier) -> f64 {
        match tier {
            Tier::Succulent => self.succulent,
            Tier::Fern => self.fern,
            Tier::Orchid => self.orchid,
            Tier::Bonsai => self.bonsai,
        }
    }
}

/// Days elapsed between the last interaction and `now`, never negative.
/// Future timestamps (clock skew) count as zero elapsed time.
pub fn elapsed_days(last_interaction_at: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let millis = (now - last_interaction_at).num_milliseconds();
    (millis as f64 / MILLIS_PER_DAY).max(0.0)
}

/// Current health in [0.0, 1.0] for a contact last watered at
/// `last_interaction_at` with per-day decay rate `decay_rate`.
pub fn compute_health(
    last_interaction_at: DateTime<Utc>,
    decay_rate: f64,
    now: DateTime<Utc>,
) -> f64 {
    health_after_days(elapsed_days(last_interaction_at, now), decay_rate)
}

/// Same curve keyed directly on elapsed days.
pub fn health_after_days(days: f64, decay_rate: f64) -> f64 {
    (-decay_rate * days.max(0.0)).exp().clamp(0.0, 1.0)
}

/// `t½ = ln 2 / λ`
pub fn half_life_days(decay_rate: f64) -> f64 {
    std::f64::consts::LN_2 / decay_rate
}

/// Days until `current_health` decays to `threshold`, rounded to one
/// decimal. `None` when already at or below the threshold.
pub fn days_until_threshold(current_health: f64, decay_rate: f64, threshold: f64) -> Option<f64> {
    if current_health <= threshold || decay_rate <= 0.0 {
        return None;
    }
    let days = -(threshold / current_health).ln() / decay_rate;
    Some((days * 10.0).round() / 10.0)
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

    #[test]
    fn test_zero_elapsed_is_exactly_one() {
        for rate in [0.0001, 0.0077, 0.0231, 0.0495, 3.0] {
            assert_eq!(compute_health(now(), rate, now()), 1.0, "rate {rate}");
        }
    }

    #[test]
    fn test_decays_over_a_week() {
        let health = compute_health(now() - Duration::days(7), 0.05, now());
        assert!((health - (-0.05f64 * 7.0).exp()).abs() < 1e-9, "health was {health}");
    }

    #[test]
    fn test_fern_thirty_days_is_cooling_range() {
        let health = compute_health(now() - Duration::days(30), 0.0231, now());
        assert!((health - (-0.0231f64 * 30.0).exp()).abs() < 1e-9);
        assert!(health > 0.45 && health < 0.55, "health was {health}");
    }

    #[test]
    fn test_orchid_decays_fast_succulent_slow() {
        let month_ago = now() - Duration::days(30);
        assert!(compute_health(month_ago, 0.0495, now()) < 0.25);
        assert!(compute_health(month_ago, 0.0077, now()) > 0.75);
    }

    #[test]
    fn test_future_interaction_clamps_to_one() {
        let tomorrow = now() + Duration::days(1);
        assert_eq!(compute_health(tomorrow, 0.05, now()), 1.0);
        assert_eq!(elapsed_days(tomorrow, now()), 0.0);
    }

    #[test]
    fn test_bounded_and_strictly_decreasing() {
        for rate in [0.0077, 0.0116, 0.0231, 0.0495, 0.5] {
            let mut prev = health_after_days(0.0, rate);
            for day in 1..=365 {
                let health = health_after_days(day as f64, rate);
                assert!((0.0..=1.0).contains(&health), "out of range: {health}");
                assert!(health < prev, "not decreasing at day {day} for rate {rate}");
                prev = health;
            }
        }
    }

    #[test]
    fn test_never_below_zero_after_long_silence() {
        let health = compute_health(now() - Duration::days(100_000), 0.05, now());
        assert!(health >= 0.0);
    }

    #[test]
    fn test_pure_repeatable() {
        let last = now() - Duration::hours(321);
        assert_eq!(
            compute_health(last, 0.0231, now()).to_bits(),
            compute_health(last, 0.0231, now()).to_bits()
        );
    }

    #[test]
    fn test_half_life_matches_presets() {
        let defaults = DecayDefaults::default();
        assert!((half_life_days(defaults.succulent) - 90.0).abs() < 1.0);
        assert!((half_life_days(defaults.fern) - 30.0).abs() < 1.0);
        assert!((half_life_days(defaults.orchid) - 14.0).abs() < 1.0);
        assert!((half_life_days(defaults.bonsai) - 60.0).abs() < 1.0);
    }

    #[test]
    fn test_rate_for_tier() {
        let defaults = DecayDefaults::default();
        assert_eq!(defaults.rate_for(Tier::Succulent), 0.0077);
        assert_eq!(defaults.rate_for(Tier::Fern), 0.0231);
        assert_eq!(defaults.rate_for(Tier::Orchid), 0.0495);
        assert_eq!(defaults.rate_for(Tier::Bonsai), 0.0116);
    }

    #[test]
    fn test_days_until_threshold_fern() {
        let days = days_until_threshold(1.0, 0.0231, 0.5).unwrap();
        assert!(days > 28.0 && days < 32.0, "days was {days}");
    }

    #[test]
    fn test_days_until_threshold_already_below() {
        assert_eq!(days_until_threshold(0.3, 0.05, 0.5), None);
        assert_eq!(days_until_threshold(0.5, 0.05, 0.5), None);
    }
}
