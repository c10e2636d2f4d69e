//! Actionable recommendations for the console report.

use super::aggregate::CompanyMetrics;
use crate::types::Company;
use serde::Serialize;

const INACTIVE_USER_SHARE: f64 = 0.3;
const ACTIVE_INSTANCE_SHARE: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RecommendationKind {
    InactiveUsers,
    LowInstanceUtilization,
    EmptyChannels,
    NoBroadcasts,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub company: String,
    pub kind: RecommendationKind,
    pub message: String,
}

/// Recommendations for one company, in a fixed order: users, instances,
/// channels, broadcasts.
pub fn recommendations_for(company: &Company, metrics: &CompanyMetrics) -> Vec<Recommendation> {
    let mut found = Vec::new();
    let mut push = |kind, message: String| {
        found.push(Recommendation {
            company: company.name.clone(),
            kind,
            message,
        })
    };

    let users = metrics.total_users;
    let inactive = metrics.inactive_users();
    if users > 0 && inactive as f64 > users as f64 * INACTIVE_USER_SHARE {
        push(
            RecommendationKind::InactiveUsers,
            format!("High inactive user rate ({inactive}/{users}). Consider reviewing user accounts."),
        );
    }

    let instances = metrics.total_instances;
    let active = metrics.active_instances;
    if instances > 0 && (active as f64) < instances as f64 * ACTIVE_INSTANCE_SHARE {
        push(
            RecommendationKind::LowInstanceUtilization,
            format!("Low instance utilization ({active}/{instances} active). Review inactive instances."),
        );
    }

    let empty_channels = company.empty_channels();
    if empty_channels > 0 {
        push(
            RecommendationKind::EmptyChannels,
            format!("{empty_channels} channels have no speed messages. Consider adding templates."),
        );
    }

    // Populated list, not broadcasts_count
    if company.broadcasts.is_empty() && instances > 0 {
        push(
            RecommendationKind::NoBroadcasts,
            "No broadcasts configured. Consider creating broadcast campaigns.".to_string(),
        );
    }

    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Broadcast, Channel, Instance, User};

    fn kinds(company: &Company) -> Vec<RecommendationKind> {
        recommendations_for(company, &CompanyMetrics::from_company(company))
            .into_iter()
            .map(|r| r.kind)
            .collect()
    }

    #[test]
    fn test_empty_company_has_no_recommendations() {
        assert!(kinds(&Company::new("Empty")).is_empty());
    }

    #[test]
    fn test_all_recommendations() {
        let mut company = Company::new("Messy");
        company.users = vec![
            User::new("a", "Agent", false),
            User::new("b", "Agent", true),
            User::new("c", "Agent", true),
        ];
        company.instances = vec![Instance::new("i1", false), Instance::new("i2", false)];
        company.channels = vec![
            Channel::new("empty", true),
            Channel {
                speed_messages_count: 3,
                ..Channel::new("used", true)
            },
        ];

        let recs = recommendations_for(&company, &CompanyMetrics::from_company(&company));
        assert_eq!(
            recs.iter().map(|r| r.kind).collect::<Vec<_>>(),
            vec![
                RecommendationKind::InactiveUsers,
                RecommendationKind::LowInstanceUtilization,
                RecommendationKind::EmptyChannels,
                RecommendationKind::NoBroadcasts,
            ]
        );
        assert_eq!(
            recs[0].message,
            "High inactive user rate (1/3). Consider reviewing user accounts."
        );
        assert_eq!(
            recs[2].message,
            "1 channels have no speed messages. Consider adding templates."
        );
    }

    #[test]
    fn test_thresholds_are_strict() {
        let mut company = Company::new("Edge");
        // 3 of 10 inactive is exactly 30%
        company.users = (0..10).map(|i| User::new("u", "Agent", i >= 3)).collect();
        // 1 of 2 active is exactly 50%
        company.instances = vec![Instance::new("a", true), Instance::new("b", false)];
        company.broadcasts.push(Broadcast::new("launch", "Completed"));
        assert!(kinds(&company).is_empty());
    }

    #[test]
    fn test_no_broadcasts_uses_populated_list() {
        let mut company = Company::new("Counted");
        company.instances = vec![Instance::new("a", true)];
        company.broadcasts_count = 40;
        assert_eq!(kinds(&company), vec![RecommendationKind::NoBroadcasts]);

        company.broadcasts_count = 0;
        company.broadcasts.push(Broadcast::new("launch", "Pending"));
        assert!(kinds(&company).is_empty());
    }
}
