//! Tech stakeholders
//!
//! Stakeholders never execute work. They shape priorities, generate
//! pressure, and anchor decision framing.

use serde::Serialize;

/// Influence runs 1 (low) to 5 (critical). Compile-time constant
/// catalog data; serializes for reporting but is never read back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Stakeholder {
    pub id: &'static str,
    pub name: &'static str,
    pub role: &'static str,
    pub influence_level: u8,
    pub expectations: &'static [&'static str],
}

pub const FOUNDER: Stakeholder = Stakeholder {
    id: "founder",
    name: "Company Founder",
    role: "Founder",
    influence_level: 5,
    expectations: &["Product viability", "Speed to market", "Cost control"],
};

pub const JUNIOR_PROJECT_MANAGER: Stakeholder = Stakeholder {
    id: "jpm",
    name: "Junior Project Manager",
    role: "Junior Project Manager",
    influence_level: 3,
    expectations: &["Clear requirements", "On-time delivery", "Minimal rework"],
};

pub const ENGINEERING_TEAM: Stakeholder = Stakeholder {
    id: "engineering",
    name: "Engineering Team",
    role: "Engineers",
    influence_level: 4,
    expectations: &["Clear scope", "Stable requirements", "Adequate resources"],
};

pub const PRODUCT_DESIGNER: Stakeholder = Stakeholder {
    id: "designer",
    name: "Product Designer",
    role: "Designer",
    influence_level: 3,
    expectations: &["User-centered design", "Design consistency"],
};

pub const END_USERS: Stakeholder = Stakeholder {
    id: "users",
    name: "End Users / Client",
    role: "Customer",
    influence_level: 5,
    expectations: &["Reliability", "Ease of use", "Security"],
};

pub const REGULATOR: Stakeholder = Stakeholder {
    id: "regulator",
    name: "Regulatory Authority",
    role: "Regulator",
    influence_level: 4,
    expectations: &["Compliance", "Data protection", "Financial regulations"],
};

pub const INVESTOR: Stakeholder = Stakeholder {
    id: "investor",
    name: "Investor",
    role: "Investor",
    influence_level: 4,
    expectations: &["Growth metrics", "Risk management", "Scalability"],
};

/// Default stakeholder set for a tech simulation.
pub fn default_stakeholders() -> Vec<Stakeholder> {
    vec![
        FOUNDER,
        JUNIOR_PROJECT_MANAGER,
        ENGINEERING_TEAM,
        PRODUCT_DESIGNER,
        END_USERS,
        REGULATOR,
        INVESTOR,
    ]
}

/// Highest influence level among all stakeholders expecting `concern`.
pub fn influence_on(concern: &str) -> u8 {
    default_stakeholders()
        .iter()
        .filter(|s| {
            s.expectations
                .iter()
                .any(|e| e.eq_ignore_ascii_case(concern))
        })
        .map(|s| s.influence_level)
        .max()
        .unwrap_or(0)
}
