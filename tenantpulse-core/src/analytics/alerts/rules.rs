//! Built-in alert rules.
//!
//! | Rule | Fires when | Severity |
//! |------|------------|----------|
//! | `activation.low` | users present, activation < 50% | High |
//! | `activation.moderate` | users present, 50% <= activation < 70% | Medium |
//! | `usage.zero_broadcasts` | instances present, broadcast counter is 0 | Medium |
//! | `resources.idle_instances` | more than half the instances inactive | Low |
//! | `setup.missing_channels` | more than 10 users, no channels | High |
//! | `capacity.high_ratio` | instances present, users/instances > 20 | Low |
//! | `churn.no_users` | no users | Critical |

use super::{Alert, AlertRule, Severity};
use crate::analytics::aggregate::CompanyMetrics;

const LOW_ACTIVATION_BELOW: f64 = 50.0;
const MODERATE_ACTIVATION_BELOW: f64 = 70.0;
const IDLE_INSTANCE_SHARE: f64 = 0.5;
const MISSING_CHANNELS_MIN_USERS: usize = 10;
const HIGH_USERS_PER_INSTANCE: f64 = 20.0;

fn alert(
    rule: &dyn AlertRule,
    metrics: &CompanyMetrics,
    category: &'static str,
    severity: Severity,
    message: String,
    metric: String,
    action: &'static str,
) -> Alert {
    Alert {
        company: metrics.company.clone(),
        rule: rule.name().to_string(),
        category,
        message,
        severity,
        metric,
        action,
    }
}

fn active_users_detail(metrics: &CompanyMetrics) -> String {
    format!("{}/{} active", metrics.active_users, metrics.total_users)
}

pub struct LowActivation;

impl AlertRule for LowActivation {
    fn name(&self) -> &str {
        "activation.low"
    }

    fn evaluate(&self, metrics: &CompanyMetrics) -> Option<Alert> {
        if metrics.total_users == 0 || metrics.user_activation >= LOW_ACTIVATION_BELOW {
            return None;
        }
        Some(alert(
            self,
            metrics,
            "User Activation",
            Severity::High,
            format!("Only {:.0}% of users are active", metrics.user_activation),
            active_users_detail(metrics),
            "Contact customer success team immediately",
        ))
    }
}

pub struct ModerateActivation;

impl AlertRule for ModerateActivation {
    fn name(&self) -> &str {
        "activation.moderate"
    }

    fn evaluate(&self, metrics: &CompanyMetrics) -> Option<Alert> {
        let rate = metrics.user_activation;
        if metrics.total_users == 0
            || !(LOW_ACTIVATION_BELOW..MODERATE_ACTIVATION_BELOW).contains(&rate)
        {
            return None;
        }
        Some(alert(
            self,
            metrics,
            "User Activation",
            Severity::Medium,
            format!("User activation rate at {rate:.0}%"),
            active_users_detail(metrics),
            "Schedule training session",
        ))
    }
}

pub struct ZeroBroadcasts;

impl AlertRule for ZeroBroadcasts {
    fn name(&self) -> &str {
        "usage.zero_broadcasts"
    }

    fn evaluate(&self, metrics: &CompanyMetrics) -> Option<Alert> {
        if metrics.total_instances == 0 || metrics.broadcasts_count > 0 {
            return None;
        }
        Some(alert(
            self,
            metrics,
            "Usage",
            Severity::Medium,
            format!("{} instances but no broadcasts", metrics.total_instances),
            "0 broadcasts".to_string(),
            "Check if customer needs help setting up campaigns",
        ))
    }
}

pub struct IdleInstances;

impl AlertRule for IdleInstances {
    fn name(&self) -> &str {
        "resources.idle_instances"
    }

    fn evaluate(&self, metrics: &CompanyMetrics) -> Option<Alert> {
        let total = metrics.total_instances;
        if total == 0 {
            return None;
        }
        let inactive = metrics.inactive_instances();
        if inactive as f64 / total as f64 <= IDLE_INSTANCE_SHARE {
            return None;
        }
        Some(alert(
            self,
            metrics,
            "Resource Optimization",
            Severity::Low,
            format!("{inactive} of {total} instances are inactive"),
            format!("{inactive}/{total} inactive"),
            "Consider downsizing or reactivating instances",
        ))
    }
}

pub struct MissingChannels;

impl AlertRule for MissingChannels {
    fn name(&self) -> &str {
        "setup.missing_channels"
    }

    fn evaluate(&self, metrics: &CompanyMetrics) -> Option<Alert> {
        if metrics.total_users <= MISSING_CHANNELS_MIN_USERS || metrics.total_channels > 0 {
            return None;
        }
        Some(alert(
            self,
            metrics,
            "Setup",
            Severity::High,
            format!("{} users but no channels configured", metrics.total_users),
            "0 channels".to_string(),
            "Urgent: Complete onboarding process",
        ))
    }
}

pub struct HighUserInstanceRatio;

impl AlertRule for HighUserInstanceRatio {
    fn name(&self) -> &str {
        "capacity.high_ratio"
    }

    fn evaluate(&self, metrics: &CompanyMetrics) -> Option<Alert> {
        if metrics.total_instances == 0 {
            return None;
        }
        let ratio = metrics.total_users as f64 / metrics.total_instances as f64;
        if ratio <= HIGH_USERS_PER_INSTANCE {
            return None;
        }
        Some(alert(
            self,
            metrics,
            "Capacity",
            Severity::Low,
            format!("High user-to-instance ratio ({ratio:.1}:1)"),
            format!(
                "{} users / {} instances",
                metrics.total_users, metrics.total_instances
            ),
            "May need additional instances for optimal performance",
        ))
    }
}

pub struct NoUsers;

impl AlertRule for NoUsers {
    fn name(&self) -> &str {
        "churn.no_users"
    }

    fn evaluate(&self, metrics: &CompanyMetrics) -> Option<Alert> {
        if metrics.total_users > 0 {
            return None;
        }
        Some(alert(
            self,
            metrics,
            "Churn Risk",
            Severity::Critical,
            "Company has no users".to_string(),
            "0 users".to_string(),
            "Potential churn - reach out immediately",
        ))
    }
}
