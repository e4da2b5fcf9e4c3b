use crate::models::contact::GrowthStage;

/// Stage reached after `total_interactions` waterings.
pub fn stage_for(total_interactions: i32) -> GrowthStage {
    match total_interactions {
        n if n >= 50 => GrowthStage::Ancient,
        n if n >= 25 => GrowthStage::Mature,
        n if n >= 10 => GrowthStage::Sapling,
        n if n >= 3 => GrowthStage::Sprout,
        _ => GrowthStage::Seed,
    }
}

/// Next stage for a contact currently at `current`. Never regresses, even
/// when the stored stage is ahead of the counter (seeded data).
pub fn advance(current: GrowthStage, total_interactions: i32) -> GrowthStage {
    current.max(stage_for(total_interactions))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_boundaries() {
        assert_eq!(stage_for(0), GrowthStage::Seed);
        assert_eq!(stage_for(2), GrowthStage::Seed);
        assert_eq!(stage_for(3), GrowthStage::Sprout);
        assert_eq!(stage_for(9), GrowthStage::Sprout);
        assert_eq!(stage_for(10), GrowthStage::Sapling);
        assert_eq!(stage_for(24), GrowthStage::Sapling);
        assert_eq!(stage_for(25), GrowthStage::Mature);
        assert_eq!(stage_for(49), GrowthStage::Mature);
        assert_eq!(stage_for(50), GrowthStage::Ancient);
        assert_eq!(stage_for(10_000), GrowthStage::Ancient);
    }

    #[test]
    fn test_stage_non_decreasing_in_count() {
        let mut prev = stage_for(0);
        for n in 1..200 {
            let stage = stage_for(n);
            assert!(stage >= prev, "regressed at {n}");
            prev = stage;
        }
    }

    #[test]
    fn test_advance_never_regresses() {
        assert_eq!(advance(GrowthStage::Mature, 4), GrowthStage::Mature);
        assert_eq!(advance(GrowthStage::Sprout, 10), GrowthStage::Sapling);
    }
}
