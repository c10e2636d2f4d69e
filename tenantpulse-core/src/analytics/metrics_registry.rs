//! Registry of every metric the engine emits, for discovery and documentation.

use serde::Serialize;

/// Type of metric value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricValueType {
    Integer,
    Float,
    Percent,
    Currency,
    Text,
}

impl MetricValueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricValueType::Integer => "integer",
            MetricValueType::Float => "float",
            MetricValueType::Percent => "percent",
            MetricValueType::Currency => "currency",
            MetricValueType::Text => "text",
        }
    }
}

/// Descriptor for one emitted metric.
#[derive(Debug, Clone, Serialize)]
pub struct MetricDescriptor {
    /// Analytics module producing the metric
    pub component: &'static str,
    /// "company" or "platform"
    pub scope: &'static str,
    pub name: &'static str,
    pub value_type: MetricValueType,
    pub summary: &'static str,
}

const fn metric(
    component: &'static str,
    scope: &'static str,
    name: &'static str,
    value_type: MetricValueType,
    summary: &'static str,
) -> MetricDescriptor {
    MetricDescriptor {
        component,
        scope,
        name,
        value_type,
        summary,
    }
}

use MetricValueType::*;

const ALL_METRICS: &[MetricDescriptor] = &[
    // aggregate
    metric("aggregate", "company", "user_activation", Percent, "Active users over populated users."),
    metric("aggregate", "company", "instance_utilization", Percent, "Active instances over populated instances."),
    metric("aggregate", "company", "channel_activity", Percent, "Active channels over populated channels."),
    metric("aggregate", "company", "users_per_channel", Float, "Populated users per populated channel."),
    metric("aggregate", "company", "broadcasts_per_instance", Float, "Broadcast counter per populated instance."),
    metric("aggregate", "company", "broadcasts_per_user", Float, "Broadcast counter per populated user."),
    metric("aggregate", "company", "broadcast_completion_rate", Percent, "Completed share of populated broadcasts."),
    metric("aggregate", "platform", "total_users", Integer, "Sum of users_count across companies."),
    metric("aggregate", "platform", "total_instances", Integer, "Sum of instances_count across companies."),
    metric("aggregate", "platform", "total_broadcasts", Integer, "Sum of broadcasts_count across companies."),
    metric("aggregate", "platform", "user_activation", Percent, "Volume-weighted user activation."),
    metric("aggregate", "platform", "instance_utilization", Percent, "Volume-weighted instance utilization."),
    metric("aggregate", "platform", "efficiency_score", Float, "User activation x 0.4 + instance utilization x 0.6."),
    // health
    metric("health", "company", "engagement_score", Float, "User activation x 0.6 + instance utilization x 0.4."),
    metric("health", "company", "adoption_score", Float, "Type diversity, broadcast and channel presence."),
    metric("health", "company", "growth_potential", Float, "Users per channel and broadcasts per instance, capped at 100."),
    metric("health", "company", "overall_health", Float, "Engagement x 0.4 + adoption x 0.3 + growth x 0.3."),
    metric("health", "company", "health_status", Text, "Healthy, Stable, At Risk or Critical."),
    metric("health", "company", "overall_score", Float, "Performance scorecard score."),
    metric("health", "company", "performance_status", Text, "Excellent, Good, Fair or Poor."),
    // alerts
    metric("alerts", "company", "alert", Text, "Triggered threshold rule with severity and action."),
    metric("alerts", "platform", "alerts_by_severity", Integer, "Alert counts per severity."),
    // benchmark
    metric("benchmark", "platform", "p25", Float, "25th percentile across companies."),
    metric("benchmark", "platform", "median", Float, "50th percentile across companies."),
    metric("benchmark", "platform", "p75", Float, "75th percentile across companies."),
    // revenue
    metric("revenue", "company", "monthly_revenue", Currency, "Unit pricing applied to usage counters."),
    metric("revenue", "company", "annual_revenue", Currency, "Monthly revenue x 12."),
    metric("revenue", "company", "arpu", Currency, "Monthly revenue per user."),
    metric("revenue", "company", "revenue_tier", Text, "Enterprise, Professional, Growth or Starter."),
    metric("revenue", "platform", "total_mrr", Currency, "Monthly recurring revenue across companies."),
    metric("revenue", "platform", "total_arr", Currency, "Annual recurring revenue across companies."),
    // forecast
    metric("forecast", "platform", "forecast", Float, "Linear trend projection over synthetic history."),
    metric("forecast", "platform", "growth_pct", Percent, "Last projected value versus current."),
    metric("forecast", "platform", "period_growth_pct", Percent, "Growth across the synthetic history."),
];

/// List all registered metrics.
pub fn list_metrics() -> Vec<MetricDescriptor> {
    ALL_METRICS.to_vec()
}

/// List metrics produced by one analytics module.
pub fn list_metrics_for_component(component: &str) -> Vec<MetricDescriptor> {
    ALL_METRICS
        .iter()
        .filter(|m| m.component == component)
        .cloned()
        .collect()
}

/// List metrics for a scope ("company" or "platform").
pub fn list_metrics_for_scope(scope: &str) -> Vec<MetricDescriptor> {
    ALL_METRICS
        .iter()
        .filter(|m| m.scope == scope)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_registry_names_unique_per_component_and_scope() {
        let mut seen = HashSet::new();
        for m in list_metrics() {
            assert!(
                seen.insert((m.component, m.scope, m.name)),
                "duplicate metric {}/{}/{}",
                m.component,
                m.scope,
                m.name
            );
        }
    }

    #[test]
    fn test_filters() {
        let health = list_metrics_for_component("health");
        assert!(health.iter().any(|m| m.name == "overall_health"));
        assert!(health.iter().any(|m| m.name == "overall_score"));
        assert!(list_metrics_for_component("nope").is_empty());

        let platform = list_metrics_for_scope("platform");
        assert!(platform.iter().all(|m| m.scope == "platform"));
        assert_eq!(
            platform.len() + list_metrics_for_scope("company").len(),
            list_metrics().len()
        );
    }
}
