//! Cohort classification
//!
//! Maps onboarding scores to simulation tiers. Thresholds are
//! inclusive upper bounds; anything above the applied band is
//! advanced.

use serde::{Deserialize, Serialize};

/// Inclusive upper bound of the foundation tier
pub const FOUNDATION_MAX: u32 = 10;
/// Inclusive upper bound of the applied tier
pub const APPLIED_MAX: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Foundation,
    Applied,
    Advanced,
}

impl Tier {
    /// The simulation track this tier routes into
    pub fn track(self) -> &'static str {
        match self {
            Tier::Foundation => "guided_learning",
            Tier::Applied => "project_simulation",
            Tier::Advanced => "production_simulation",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CohortProfile {
    pub score: u32,
    pub tier: Tier,
}

impl CohortProfile {
    pub fn track(&self) -> &'static str {
        self.tier.track()
    }
}

/// Classify an onboarding score into a cohort profile.
pub fn classify(score: u32) -> CohortProfile {
    let tier = if score <= FOUNDATION_MAX {
        Tier::Foundation
    } else if score <= APPLIED_MAX {
        Tier::Applied
    } else {
        Tier::Advanced
    };
    CohortProfile { score, tier }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_boundaries_are_inclusive() {
        assert_eq!(classify(0).tier, Tier::Foundation);
        assert_eq!(classify(10).tier, Tier::Foundation);
        assert_eq!(classify(11).tier, Tier::Applied);
        assert_eq!(classify(20).tier, Tier::Applied);
        assert_eq!(classify(21).tier, Tier::Advanced);
        assert_eq!(classify(100).tier, Tier::Advanced);
    }

    #[test]
    fn test_tier_routes_to_track() {
        assert_eq!(classify(5).track(), "guided_learning");
        assert_eq!(classify(15).track(), "project_simulation");
        assert_eq!(classify(30).track(), "production_simulation");
    }
}
