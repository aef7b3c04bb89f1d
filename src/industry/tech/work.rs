//! Tech work catalog
//!
//! Defines every work item a tech simulation can carry. The catalog is
//! declarative; the engine and rules decide what becomes active.

use ahash::AHashMap;

use crate::core::types::Amount;
use crate::work::WorkTemplate;

fn template(
    title: &str,
    description: &str,
    effort: u32,
    resources: &[(&str, Amount)],
    priority: u8,
) -> WorkTemplate {
    let mut required = AHashMap::new();
    for (name, amount) in resources {
        required.insert(name.to_string(), *amount);
    }
    WorkTemplate {
        title: title.to_string(),
        description: description.to_string(),
        estimated_effort: effort,
        required_resources: required,
        priority,
    }
}

pub fn discovery_work() -> Vec<WorkTemplate> {
    vec![
        template(
            "Define product requirements",
            "Clarify user needs, constraints, and success metrics.",
            3,
            &[("engineer_hours", 2)],
            1,
        ),
        template(
            "Create work canvas",
            "Define scope, assumptions, risks, and milestones.",
            2,
            &[("engineer_hours", 1)],
            1,
        ),
    ]
}

pub fn architecture_work() -> Vec<WorkTemplate> {
    vec![
        template(
            "Design system architecture",
            "Define services, data flows, and technology stack.",
            5,
            &[("engineer_hours", 4)],
            2,
        ),
        template(
            "Select deployment strategy",
            "Decide hosting, CI/CD, and release model.",
            3,
            &[("engineer_hours", 2), ("infra_capacity", 1)],
            2,
        ),
    ]
}

pub fn implementation_work() -> Vec<WorkTemplate> {
    vec![
        template(
            "Initialize repository",
            "Set up repository structure, linting, and CI.",
            2,
            &[("engineer_hours", 2)],
            3,
        ),
        template(
            "Implement core features",
            "Develop primary application functionality.",
            8,
            &[("engineer_hours", 8), ("budget", 500)],
            3,
        ),
        template(
            "Test release candidate",
            "Run integration and acceptance testing on the build.",
            4,
            &[("engineer_hours", 3)],
            3,
        ),
    ]
}

pub fn delivery_work() -> Vec<WorkTemplate> {
    vec![
        template(
            "Deploy to production",
            "Release application using approved deployment plan.",
            4,
            &[("engineer_hours", 2), ("infra_capacity", 2)],
            4,
        ),
        template(
            "Monitor and stabilize",
            "Observe system health and resolve initial issues.",
            3,
            &[("engineer_hours", 2)],
            4,
        ),
    ]
}

pub fn governance_work() -> Vec<WorkTemplate> {
    vec![template(
        "Governance review",
        "Review progress, risks, and coordination with stakeholders.",
        1,
        &[],
        0,
    )]
}

/// The full tech catalog in phase order.
pub fn catalog() -> Vec<WorkTemplate> {
    let mut work = Vec::new();
    work.extend(discovery_work());
    work.extend(architecture_work());
    work.extend(implementation_work());
    work.extend(delivery_work());
    work.extend(governance_work());
    work
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_titles_are_unique() {
        let catalog = catalog();
        let mut titles: Vec<_> = catalog.iter().map(|w| w.title.as_str()).collect();
        titles.sort_unstable();
        titles.dedup();
        assert_eq!(titles.len(), catalog.len());
    }

    #[test]
    fn test_catalog_instantiates_cleanly() {
        for template in catalog() {
            let item = template.instantiate(0).unwrap();
            assert!(item.estimated_effort > 0);
        }
    }

    #[test]
    fn test_governance_is_most_urgent() {
        let urgent = governance_work();
        assert!(urgent.iter().all(|w| w.priority == 0));
    }
}
