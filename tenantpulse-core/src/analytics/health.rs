//! Customer health scoring and the performance scorecard.
//!
//! Two composite scores live here and are deliberately kept apart:
//!
//! | Score | Formula |
//! |-------|---------|
//! | Overall Health | engagement x 0.4 + adoption x 0.3 + growth x 0.3 |
//! | Overall Score (scorecard) | userActivity x 0.3 + instanceActivity x 0.3 + min(resourceUsage, 100) x 0.4 |
//!
//! They feed different views and are tiered differently; merging them would
//! change what both views report.

use super::aggregate::CompanyMetrics;
use serde::Serialize;

/// Companies scoring at or above this health with fewer users than
/// [`GROWTH_OPPORTUNITY_MAX_USERS`] are flagged as growth opportunities.
pub const GROWTH_OPPORTUNITY_MIN_HEALTH: f64 = 70.0;
pub const GROWTH_OPPORTUNITY_MAX_USERS: usize = 100;

/// Scorecard upsell candidates: Overall Score at or above this with fewer
/// than [`UPSELL_MAX_USERS`] users.
pub const UPSELL_MIN_SCORE: f64 = 70.0;
pub const UPSELL_MAX_USERS: usize = 50;

// ============================================
// Health tiers
// ============================================

/// Health tier, matched high to low with inclusive lower bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum HealthStatus {
    Critical,
    AtRisk,
    Stable,
    Healthy,
}

impl HealthStatus {
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            HealthStatus::Healthy
        } else if score >= 60.0 {
            HealthStatus::Stable
        } else if score >= 40.0 {
            HealthStatus::AtRisk
        } else {
            HealthStatus::Critical
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "Healthy",
            HealthStatus::Stable => "Stable",
            HealthStatus::AtRisk => "At Risk",
            HealthStatus::Critical => "Critical",
        }
    }

    pub fn risk_level(&self) -> RiskLevel {
        match self {
            HealthStatus::Healthy => RiskLevel::Low,
            HealthStatus::Stable => RiskLevel::Medium,
            HealthStatus::AtRisk => RiskLevel::High,
            HealthStatus::Critical => RiskLevel::Critical,
        }
    }

    pub fn recommendation(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "Explore upsell opportunities",
            HealthStatus::Stable => "Monitor engagement trends",
            HealthStatus::AtRisk => "Increase engagement, provide training",
            HealthStatus::Critical => "Immediate intervention required",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
            RiskLevel::Critical => "Critical",
        }
    }
}

// ============================================
// Health record
// ============================================

/// Multi-factor health of one company. All scores are in `[0, 100]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthRecord {
    pub company: String,
    pub engagement_score: f64,
    pub adoption_score: f64,
    pub growth_potential: f64,
    pub overall_health: f64,
    pub status: HealthStatus,
    pub risk_level: RiskLevel,
    pub recommendation: &'static str,
    pub user_activation: f64,
    pub instance_utilization: f64,
    pub total_users: usize,
    pub total_instances: usize,
    pub broadcasts: u64,
}

/// userActivation x 0.6 + instanceUtilization x 0.4
pub fn engagement_score(metrics: &CompanyMetrics) -> f64 {
    metrics.user_activation * 0.6 + metrics.instance_utilization * 0.4
}

/// typeDiversity x 0.4 + (broadcasts exist ? 100 : 0) x 0.3 + (channels exist ? 100 : 0) x 0.3
pub fn adoption_score(metrics: &CompanyMetrics) -> f64 {
    let has_broadcasts = if metrics.broadcasts_count > 0 { 100.0 } else { 0.0 };
    let has_channels = if metrics.total_channels > 0 { 100.0 } else { 0.0 };
    metrics.type_diversity() * 0.4 + has_broadcasts * 0.3 + has_channels * 0.3
}

/// min(usersPerChannel / 10 x 50 + broadcastsPerInstance / 5 x 50, 100)
pub fn growth_potential(metrics: &CompanyMetrics) -> f64 {
    let users_component = metrics.users_per_channel / 10.0 * 50.0;
    let broadcast_component = metrics.broadcasts_per_instance / 5.0 * 50.0;
    (users_component + broadcast_component).min(100.0)
}

/// Weighted combination of the three health components.
pub fn overall_health(engagement: f64, adoption: f64, growth: f64) -> f64 {
    engagement * 0.4 + adoption * 0.3 + growth * 0.3
}

impl HealthRecord {
    pub fn score(metrics: &CompanyMetrics) -> Self {
        let engagement = engagement_score(metrics);
        let adoption = adoption_score(metrics);
        let growth = growth_potential(metrics);
        let overall = overall_health(engagement, adoption, growth);
        let status = HealthStatus::from_score(overall);

        tracing::debug!(
            company = %metrics.company,
            engagement,
            adoption,
            growth,
            overall,
            status = status.as_str(),
            "Scored company health"
        );

        Self {
            company: metrics.company.clone(),
            engagement_score: engagement,
            adoption_score: adoption,
            growth_potential: growth,
            overall_health: overall,
            status,
            risk_level: status.risk_level(),
            recommendation: status.recommendation(),
            user_activation: metrics.user_activation,
            instance_utilization: metrics.instance_utilization,
            total_users: metrics.total_users,
            total_instances: metrics.total_instances,
            broadcasts: metrics.broadcasts_count,
        }
    }

    pub fn is_growth_opportunity(&self) -> bool {
        self.overall_health >= GROWTH_OPPORTUNITY_MIN_HEALTH
            && self.total_users < GROWTH_OPPORTUNITY_MAX_USERS
    }
}

/// Aggregate view over a set of health records.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HealthOverview {
    pub healthy: usize,
    pub stable: usize,
    pub at_risk: usize,
    pub critical: usize,
    /// Mean overall health, `0.0` for an empty set
    pub average_health: f64,
}

impl HealthOverview {
    pub fn from_records(records: &[HealthRecord]) -> Self {
        let mut overview = records.iter().fold(Self::default(), |mut acc, r| {
            match r.status {
                HealthStatus::Healthy => acc.healthy += 1,
                HealthStatus::Stable => acc.stable += 1,
                HealthStatus::AtRisk => acc.at_risk += 1,
                HealthStatus::Critical => acc.critical += 1,
            }
            acc
        });
        if !records.is_empty() {
            overview.average_health =
                records.iter().map(|r| r.overall_health).sum::<f64>() / records.len() as f64;
        }
        overview
    }
}

// ============================================
// Performance scorecard
// ============================================

/// Scorecard tier, matched high to low with inclusive lower bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum PerformanceStatus {
    Poor,
    Fair,
    Good,
    Excellent,
}

impl PerformanceStatus {
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            PerformanceStatus::Excellent
        } else if score >= 60.0 {
            PerformanceStatus::Good
        } else if score >= 40.0 {
            PerformanceStatus::Fair
        } else {
            PerformanceStatus::Poor
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PerformanceStatus::Excellent => "Excellent",
            PerformanceStatus::Good => "Good",
            PerformanceStatus::Fair => "Fair",
            PerformanceStatus::Poor => "Poor",
        }
    }

    pub fn churn_risk(&self) -> &'static str {
        match self {
            PerformanceStatus::Excellent => "Low",
            PerformanceStatus::Good => "Medium",
            PerformanceStatus::Fair => "Medium-High",
            PerformanceStatus::Poor => "High",
        }
    }
}

/// One row of the company performance scorecard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceScore {
    pub company: String,
    pub overall_score: f64,
    pub status: PerformanceStatus,
    pub churn_risk: &'static str,
    pub user_activity: f64,
    pub instance_activity: f64,
    /// (users + instances + broadcasts) / 3, uncapped
    pub resource_usage: f64,
    pub total_users: usize,
    pub total_instances: usize,
    pub broadcasts: u64,
}

/// userActivity x 0.3 + instanceActivity x 0.3 + min(resourceUsage, 100) x 0.4
pub fn overall_score(user_activity: f64, instance_activity: f64, resource_usage: f64) -> f64 {
    user_activity * 0.3 + instance_activity * 0.3 + resource_usage.min(100.0) * 0.4
}

impl PerformanceScore {
    pub fn score(metrics: &CompanyMetrics) -> Self {
        let resource_usage = (metrics.total_users as f64
            + metrics.total_instances as f64
            + metrics.broadcasts_count as f64)
            / 3.0;
        let overall = overall_score(
            metrics.user_activation,
            metrics.instance_utilization,
            resource_usage,
        );
        let status = PerformanceStatus::from_score(overall);

        Self {
            company: metrics.company.clone(),
            overall_score: overall,
            status,
            churn_risk: status.churn_risk(),
            user_activity: metrics.user_activation,
            instance_activity: metrics.instance_utilization,
            resource_usage,
            total_users: metrics.total_users,
            total_instances: metrics.total_instances,
            broadcasts: metrics.broadcasts_count,
        }
    }

    pub fn is_upsell_candidate(&self) -> bool {
        self.overall_score >= UPSELL_MIN_SCORE && self.total_users < UPSELL_MAX_USERS
    }
}
