use crate::models::contact::Status;

/// Inclusive lower bounds. Fixed for every caller; not configurable.
pub const THRIVING_THRESHOLD: f64 = 0.7;
pub const COOLING_THRESHOLD: f64 = 0.4;
pub const AT_RISK_THRESHOLD: f64 = 0.1;

/// Step function from health to status.
pub fn classify(health: f64) -> Status {
    if health >= THRIVING_THRESHOLD {
        Status::Thriving
    } else if health >= COOLING_THRESHOLD {
        Status::Cooling
    } else if health >= AT_RISK_THRESHOLD {
        Status::AtRisk
    } else {
        Status::Dormant
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buckets() {
        assert_eq!(classify(0.85), Status::Thriving);
        assert_eq!(classify(0.55), Status::Cooling);
        assert_eq!(classify(0.25), Status::AtRisk);
        assert_eq!(classify(0.05), Status::Dormant);
    }

    #[test]
    fn test_lower_edges_are_closed() {
        assert_eq!(classify(0.7), Status::Thriving);
        assert_eq!(classify(0.6999), Status::Cooling);
        assert_eq!(classify(0.4), Status::Cooling);
        assert_eq!(classify(0.1), Status::AtRisk);
        assert_eq!(classify(0.0999), Status::Dormant);
    }

    #[test]
    fn test_extremes() {
        assert_eq!(classify(1.0), Status::Thriving);
        assert_eq!(classify(0.0), Status::Dormant);
    }

    #[test]
    fn test_urgency_order() {
        assert!(Status::Dormant > Status::AtRisk);
        assert!(Status::AtRisk > Status::Cooling);
        assert!(Status::Cooling > Status::Thriving);
        assert!(Status::Dormant.needs_attention());
        assert!(Status::AtRisk.needs_attention());
        assert!(!Status::Cooling.needs_attention());
    }
}
