//! Counts, rates and ratios per company and platform-wide.
//!
//! Every rate here short-circuits to `0.0` on an empty denominator, so
//! downstream scoring never sees NaN or infinity. Rates are computed from
//! the populated collections; volumes come from the denormalized counters.

use crate::types::{Company, KNOWN_USER_TYPES};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Percentage of `entities` satisfying `predicate`, `0.0` when empty.
pub fn activation_rate<T>(entities: &[T], predicate: impl Fn(&T) -> bool) -> f64 {
    let active = entities.iter().filter(|e| predicate(*e)).count();
    percentage(active as f64, entities.len() as f64)
}

/// `part / whole * 100`, `0.0` when `whole` is zero.
pub fn percentage(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        part / whole * 100.0
    } else {
        0.0
    }
}

/// `numerator / denominator`, `0.0` when `denominator` is zero.
pub fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

// ============================================
// Per-company metrics
// ============================================

/// Derived counts and rates for a single company.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyMetrics {
    pub company: String,
    pub is_active: bool,

    // Populated collection sizes
    pub total_users: usize,
    pub active_users: usize,
    pub total_instances: usize,
    pub active_instances: usize,
    pub total_channels: usize,
    pub active_channels: usize,
    /// Distinct `user_type_name` values among the populated users
    pub distinct_user_types: usize,

    // Counters
    pub users_count: u64,
    pub instances_count: u64,
    pub broadcasts_count: u64,

    // Rates (percent)
    pub user_activation: f64,
    pub instance_utilization: f64,
    pub channel_activity: f64,

    // Ratios
    pub users_per_channel: f64,
    pub broadcasts_per_instance: f64,
    pub broadcasts_per_user: f64,
}

impl CompanyMetrics {
    pub fn from_company(company: &Company) -> Self {
        let total_users = company.users.len();
        let total_instances = company.instances.len();
        let total_channels = company.channels.len();

        let active_users = company.users.iter().filter(|u| u.is_active()).count();
        let active_instances = company.instances.iter().filter(|i| i.active).count();
        let active_channels = company.channels.iter().filter(|c| c.is_active).count();

        let distinct_user_types = company
            .users
            .iter()
            .map(|u| u.user_type_name.as_str())
            .collect::<BTreeSet<_>>()
            .len();

        let broadcasts = company.broadcasts_count as f64;

        let metrics = Self {
            company: company.name.clone(),
            is_active: company.is_active,
            total_users,
            active_users,
            total_instances,
            active_instances,
            total_channels,
            active_channels,
            distinct_user_types,
            users_count: company.users_count,
            instances_count: company.instances_count,
            broadcasts_count: company.broadcasts_count,
            user_activation: activation_rate(&company.users, |u| u.is_active()),
            instance_utilization: activation_rate(&company.instances, |i| i.active),
            channel_activity: activation_rate(&company.channels, |c| c.is_active),
            users_per_channel: ratio(total_users as f64, total_channels as f64),
            broadcasts_per_instance: ratio(broadcasts, total_instances as f64),
            broadcasts_per_user: ratio(broadcasts, total_users as f64),
        };

        tracing::trace!(
            company = %metrics.company,
            user_activation = metrics.user_activation,
            instance_utilization = metrics.instance_utilization,
            "Computed company metrics"
        );
        metrics
    }

    pub fn inactive_users(&self) -> usize {
        self.total_users - self.active_users
    }

    pub fn inactive_instances(&self) -> usize {
        self.total_instances - self.active_instances
    }

    /// Type diversity as a percentage of the known user types, capped at 100.
    pub fn type_diversity(&self) -> f64 {
        (self.distinct_user_types as f64 / KNOWN_USER_TYPES.len() as f64 * 100.0).min(100.0)
    }
}

/// Compute [`CompanyMetrics`] for every company, preserving order.
pub fn company_metrics(companies: &[Company]) -> Vec<CompanyMetrics> {
    companies.iter().map(CompanyMetrics::from_company).collect()
}

// ============================================
// Per-company breakdowns
// ============================================

/// Categorical distributions inside one company.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CompanyBreakdown {
    pub company: String,
    pub users_by_type: BTreeMap<String, usize>,
    pub instances_by_type: BTreeMap<String, usize>,
    pub instances_by_status: BTreeMap<String, usize>,
    /// Keys use canonical capitalization so "completed" and "Completed" merge
    pub broadcasts_by_status: BTreeMap<String, usize>,
    pub completed_broadcasts: usize,
    /// Completed share of populated broadcasts (percent)
    pub broadcast_completion_rate: f64,
    /// Speed messages summed over populated channels
    pub speed_messages: u64,
    /// Channels without any speed message
    pub empty_channels: usize,
    /// Channels ranked by speed messages (name, count)
    pub top_channels: Vec<(String, u64)>,
}

impl CompanyBreakdown {
    pub fn from_company(company: &Company, top_n: usize) -> Self {
        let mut breakdown = Self {
            company: company.name.clone(),
            ..Default::default()
        };

        for user in &company.users {
            *breakdown
                .users_by_type
                .entry(user.user_type_name.clone())
                .or_insert(0) += 1;
        }

        for instance in &company.instances {
            *breakdown
                .instances_by_type
                .entry(instance.type_name().to_string())
                .or_insert(0) += 1;
            *breakdown
                .instances_by_status
                .entry(instance.status.clone())
                .or_insert(0) += 1;
        }

        for broadcast in &company.broadcasts {
            *breakdown
                .broadcasts_by_status
                .entry(broadcast.normalized_status())
                .or_insert(0) += 1;
        }
        breakdown.completed_broadcasts = company.broadcasts.iter().filter(|b| b.is_completed()).count();
        breakdown.broadcast_completion_rate =
            activation_rate(&company.broadcasts, |b| b.is_completed());

        breakdown.speed_messages = company.channels.iter().map(|c| c.speed_messages_count).sum();
        breakdown.empty_channels = company.empty_channels();

        // Stable sort keeps input order among ties
        let mut ranked: Vec<(String, u64)> = company
            .channels
            .iter()
            .map(|c| (c.name.clone(), c.speed_messages_count))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(top_n);
        breakdown.top_channels = ranked;

        breakdown
    }
}

// ============================================
// Platform-wide
// ============================================

/// Sums of the denormalized counters across the company set.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlatformTotals {
    pub companies: u64,
    pub active_companies: u64,
    pub users: u64,
    pub channels: u64,
    pub instances: u64,
    pub broadcasts: u64,
    pub speed_messages: u64,
}

impl PlatformTotals {
    pub fn from_companies(companies: &[Company]) -> Self {
        companies.iter().fold(Self::default(), |mut acc, c| {
            acc.companies += 1;
            acc.active_companies += u64::from(c.is_active);
            acc.users += c.users_count;
            acc.channels += c.channels_count;
            acc.instances += c.instances_count;
            acc.broadcasts += c.broadcasts_count;
            acc.speed_messages += c.speed_messages_count;
            acc
        })
    }
}

/// Volume-weighted activity across all populated collections.
///
/// This is active entities over total entities across every company, not an
/// average of per-company percentages.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlatformActivity {
    pub total_users: usize,
    pub active_users: usize,
    pub total_instances: usize,
    pub active_instances: usize,
    pub total_channels: usize,
    pub active_channels: usize,
    pub user_activation: f64,
    pub instance_utilization: f64,
    pub channel_activity: f64,
}

impl PlatformActivity {
    pub fn from_metrics(metrics: &[CompanyMetrics]) -> Self {
        let mut activity = metrics.iter().fold(Self::default(), |mut acc, m| {
            acc.total_users += m.total_users;
            acc.active_users += m.active_users;
            acc.total_instances += m.total_instances;
            acc.active_instances += m.active_instances;
            acc.total_channels += m.total_channels;
            acc.active_channels += m.active_channels;
            acc
        });

        activity.user_activation =
            percentage(activity.active_users as f64, activity.total_users as f64);
        activity.instance_utilization =
            percentage(activity.active_instances as f64, activity.total_instances as f64);
        activity.channel_activity =
            percentage(activity.active_channels as f64, activity.total_channels as f64);
        activity
    }
}

/// Headline indicators for the business summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlatformKpis {
    pub user_activation: f64,
    pub instance_utilization: f64,
    pub avg_users_per_company: f64,
    pub broadcasts_per_instance: f64,
    /// userActivation x 0.4 + instanceUtilization x 0.6
    pub efficiency_score: f64,
}

impl PlatformKpis {
    pub fn compute(totals: &PlatformTotals, activity: &PlatformActivity) -> Self {
        Self {
            user_activation: activity.user_activation,
            instance_utilization: activity.instance_utilization,
            avg_users_per_company: ratio(totals.users as f64, totals.companies as f64),
            broadcasts_per_instance: ratio(totals.broadcasts as f64, totals.instances as f64),
            efficiency_score: activity.user_activation * 0.4
                + activity.instance_utilization * 0.6,
        }
    }
}
