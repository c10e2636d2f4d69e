//! Alert rule engine
//!
//! Rules are independent threshold checks over [`CompanyMetrics`]. A company
//! may trigger zero, one or many alerts; no rule suppresses another and
//! evaluation order does not change the result set.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tenantpulse_core::analytics::alerts::create_default_engine;
//!
//! let engine = create_default_engine();
//! let alerts = engine.evaluate_all(&metrics);
//! for (severity, group) in group_by_severity(&alerts) {
//!     println!("{}: {}", severity.as_str(), group.len());
//! }
//! ```

pub mod rules;

use super::aggregate::CompanyMetrics;
use serde::Serialize;
use std::collections::BTreeMap;
use std::str::FromStr;

// ============================================
// Severity
// ============================================

/// Alert severity. Ordering is `Low < Medium < High < Critical` and is used
/// for display grouping only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// All severities from most to least severe.
    pub const DESCENDING: [Severity; 4] = [
        Severity::Critical,
        Severity::High,
        Severity::Medium,
        Severity::Low,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "Low",
            Severity::Medium => "Medium",
            Severity::High => "High",
            Severity::Critical => "Critical",
        }
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(Severity::Low),
            "medium" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            "critical" => Ok(Severity::Critical),
            other => Err(format!("unknown severity: {other}")),
        }
    }
}

// ============================================
// Alert record
// ============================================

/// One triggered rule for one company.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alert {
    pub company: String,
    /// Name of the rule that fired
    pub rule: String,
    pub category: &'static str,
    pub message: String,
    pub severity: Severity,
    /// Short metric detail, e.g. "3/10 active"
    pub metric: String,
    pub action: &'static str,
}

// ============================================
// Rule trait
// ============================================

/// A stateless per-company threshold check.
///
/// ## Example
///
/// ```rust,ignore
/// pub struct DormantCompany;
///
/// impl AlertRule for DormantCompany {
///     fn name(&self) -> &str { "lifecycle.dormant" }
///
///     fn evaluate(&self, metrics: &CompanyMetrics) -> Option<Alert> {
///         (!metrics.is_active).then(|| /* build alert */)
///     }
/// }
/// ```
pub trait AlertRule: Send + Sync {
    /// Unique name, `category.rule` by convention.
    fn name(&self) -> &str;

    /// Return an alert if the rule's condition holds for this company.
    fn evaluate(&self, metrics: &CompanyMetrics) -> Option<Alert>;
}

// ============================================
// Engine
// ============================================

/// Holds the registered rules and runs every one of them per company.
pub struct AlertEngine {
    rules: Vec<Box<dyn AlertRule>>,
}

impl AlertEngine {
    /// Create a new engine with no rules.
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Register a rule with the engine.
    pub fn register(&mut self, rule: Box<dyn AlertRule>) {
        tracing::debug!(rule = rule.name(), "Registered alert rule");
        self.rules.push(rule);
    }

    pub fn rule_names(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    pub fn has_rule(&self, name: &str) -> bool {
        self.rules.iter().any(|r| r.name() == name)
    }

    /// Run every rule against one company.
    pub fn evaluate(&self, metrics: &CompanyMetrics) -> Vec<Alert> {
        let alerts: Vec<Alert> = self
            .rules
            .iter()
            .filter_map(|rule| rule.evaluate(metrics))
            .collect();

        if !alerts.is_empty() {
            tracing::debug!(
                company = %metrics.company,
                count = alerts.len(),
                "Alerts triggered"
            );
        }
        alerts
    }

    /// Run every rule against every company, preserving company order.
    pub fn evaluate_all(&self, metrics: &[CompanyMetrics]) -> Vec<Alert> {
        metrics.iter().flat_map(|m| self.evaluate(m)).collect()
    }
}

impl Default for AlertEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Create an engine with all built-in rules registered.
pub fn create_default_engine() -> AlertEngine {
    let mut engine = AlertEngine::new();
    engine.register(Box::new(rules::LowActivation));
    engine.register(Box::new(rules::ModerateActivation));
    engine.register(Box::new(rules::ZeroBroadcasts));
    engine.register(Box::new(rules::IdleInstances));
    engine.register(Box::new(rules::MissingChannels));
    engine.register(Box::new(rules::HighUserInstanceRatio));
    engine.register(Box::new(rules::NoUsers));
    engine
}

// ============================================
// Summaries
// ============================================

/// Alert counts by severity and by category.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AlertSummary {
    pub total: usize,
    pub by_severity: BTreeMap<Severity, usize>,
    pub by_category: BTreeMap<String, usize>,
    /// Distinct companies with at least one alert
    pub companies_affected: usize,
}

impl AlertSummary {
    pub fn from_alerts(alerts: &[Alert]) -> Self {
        let mut summary = Self {
            total: alerts.len(),
            ..Default::default()
        };
        let mut companies = std::collections::BTreeSet::new();
        for alert in alerts {
            *summary.by_severity.entry(alert.severity).or_insert(0) += 1;
            *summary
                .by_category
                .entry(alert.category.to_string())
                .or_insert(0) += 1;
            companies.insert(alert.company.as_str());
        }
        summary.companies_affected = companies.len();
        summary
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.by_severity.get(&severity).copied().unwrap_or(0)
    }
}

/// Group alerts by severity, most severe first. Empty groups are omitted and
/// alerts keep their original order inside a group.
pub fn group_by_severity(alerts: &[Alert]) -> Vec<(Severity, Vec<&Alert>)> {
    Severity::DESCENDING
        .iter()
        .map(|&severity| {
            let group: Vec<&Alert> = alerts.iter().filter(|a| a.severity == severity).collect();
            (severity, group)
        })
        .filter(|(_, group)| !group.is_empty())
        .collect()
}

/// Keep alerts at or above `min`.
pub fn at_least(alerts: &[Alert], min: Severity) -> Vec<Alert> {
    alerts.iter().filter(|a| a.severity >= min).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Channel, Company, Instance, User};

    fn metrics(company: &Company) -> CompanyMetrics {
        CompanyMetrics::from_company(company)
    }

    fn rules_fired(alerts: &[Alert]) -> Vec<&str> {
        alerts.iter().map(|a| a.rule.as_str()).collect()
    }

    #[test]
    fn test_default_engine_has_rules() {
        let engine = create_default_engine();
        assert_eq!(engine.rule_names().len(), 7);
        assert!(engine.has_rule("churn.no_users"));
        assert!(engine.has_rule("activation.low"));
        assert!(!engine.has_rule("nope"));
    }

    #[test]
    fn test_severity_order() {
        assert!(Severity::Critical > Severity::High);
        assert!(Severity::High > Severity::Medium);
        assert!(Severity::Medium > Severity::Low);
        assert_eq!("HIGH".parse::<Severity>(), Ok(Severity::High));
        assert!("urgent".parse::<Severity>().is_err());
    }

    #[test]
    fn test_no_users_excludes_activation_rules() {
        let engine = create_default_engine();
        let alerts = engine.evaluate(&metrics(&Company::new("Ghost")));

        assert_eq!(rules_fired(&alerts), vec!["churn.no_users"]);
        assert_eq!(alerts[0].severity, Severity::Critical);
        assert_eq!(alerts[0].message, "Company has no users");
    }

    #[test]
    fn test_multiple_alerts_for_one_company() {
        let mut company = Company::new("Sprawl");
        company.users = (0..12).map(|_| User::new("u", "Agent", false)).collect();
        company.users.extend((0..30).map(|_| User::new("v", "Agent", true)));
        company.instances = vec![Instance::new("i1", false), Instance::new("i2", true)];

        let alerts = create_default_engine().evaluate(&metrics(&company));
        let fired = rules_fired(&alerts);
        // 30/42 = 71% active: no activation alert
        assert!(!fired.contains(&"activation.low"));
        assert!(!fired.contains(&"activation.moderate"));
        assert!(fired.contains(&"usage.zero_broadcasts"));
        assert!(fired.contains(&"setup.missing_channels"));
        assert!(fired.contains(&"capacity.high_ratio"));
        // exactly half inactive is not idle
        assert!(!fired.contains(&"resources.idle_instances"));

        let ratio = alerts.iter().find(|a| a.rule == "capacity.high_ratio").unwrap();
        assert_eq!(ratio.message, "High user-to-instance ratio (21.0:1)");
        assert_eq!(ratio.metric, "42 users / 2 instances");
    }

    #[test]
    fn test_activation_bands_are_exclusive() {
        let engine = create_default_engine();
        for active in 0..=10usize {
            let mut company = Company::new("Band");
            company.users = (0..10).map(|i| User::new("u", "Agent", i < active)).collect();
            company.channels = vec![Channel::new("c", true)];
            let alerts = engine.evaluate(&metrics(&company));
            let fired = rules_fired(&alerts);
            let low = fired.contains(&"activation.low");
            let moderate = fired.contains(&"activation.moderate");
            assert!(!(low && moderate));
            assert_eq!(low, active < 5);
            assert_eq!(moderate, (5..7).contains(&active));
        }
    }

    #[test]
    fn test_low_activation_message() {
        let mut company = Company::new("Quiet");
        company.users = vec![
            User::new("a", "Agent", true),
            User::new("b", "Agent", false),
            User::new("c", "Agent", false),
        ];
        let alerts = create_default_engine().evaluate(&metrics(&company));
        let low = alerts.iter().find(|a| a.rule == "activation.low").unwrap();
        assert_eq!(low.message, "Only 33% of users are active");
        assert_eq!(low.metric, "1/3 active");
        assert_eq!(low.severity, Severity::High);
        assert_eq!(low.category, "User Activation");
    }

    #[test]
    fn test_evaluation_is_order_independent() {
        let mut company = Company::new("Mixed");
        company.users = vec![User::new("a", "Agent", false)];
        company.instances = vec![Instance::new("i", false)];
        let m = metrics(&company);

        let forward = create_default_engine().evaluate(&m);
        let mut reversed_engine = AlertEngine::new();
        reversed_engine.register(Box::new(rules::NoUsers));
        reversed_engine.register(Box::new(rules::HighUserInstanceRatio));
        reversed_engine.register(Box::new(rules::MissingChannels));
        reversed_engine.register(Box::new(rules::IdleInstances));
        reversed_engine.register(Box::new(rules::ZeroBroadcasts));
        reversed_engine.register(Box::new(rules::ModerateActivation));
        reversed_engine.register(Box::new(rules::LowActivation));
        let mut reversed = reversed_engine.evaluate(&m);
        reversed.reverse();

        assert_eq!(forward, reversed);
    }

    #[test]
    fn test_summary_and_grouping() {
        let engine = create_default_engine();
        let mut idle = Company::new("Idle");
        idle.users = vec![User::new("a", "Agent", true)];
        idle.instances = vec![Instance::new("i", false)];
        idle.channels = vec![Channel::new("c", true)];
        let all = engine.evaluate_all(&[metrics(&Company::new("Ghost")), metrics(&idle)]);

        let summary = AlertSummary::from_alerts(&all);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.count(Severity::Critical), 1);
        assert_eq!(summary.count(Severity::Medium), 1);
        assert_eq!(summary.count(Severity::Low), 1);
        assert_eq!(summary.count(Severity::High), 0);
        assert_eq!(summary.companies_affected, 2);
        assert_eq!(summary.by_category.get("Churn Risk"), Some(&1));

        let groups = group_by_severity(&all);
        let order: Vec<Severity> = groups.iter().map(|(s, _)| *s).collect();
        assert_eq!(order, vec![Severity::Critical, Severity::Medium, Severity::Low]);

        assert_eq!(at_least(&all, Severity::Medium).len(), 2);
    }
}
