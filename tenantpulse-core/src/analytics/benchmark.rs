//! Cross-company percentile benchmarks.
//!
//! Percentiles use linear interpolation between closest ranks: for sorted
//! values `v` and fraction `p`, the rank is `p * (n - 1)` and the result
//! interpolates between the two neighbouring values. A single company yields
//! that company's value for every percentile; no companies is an error.

use super::aggregate::CompanyMetrics;
use crate::error::{Error, Result};
use serde::Serialize;
use std::str::FromStr;

/// Metrics that can be benchmarked across companies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BenchmarkMetric {
    UserActivation,
    InstanceUtilization,
    BroadcastsPerUser,
    BroadcastsPerInstance,
    UsersPerChannel,
}

impl BenchmarkMetric {
    pub const ALL: [BenchmarkMetric; 5] = [
        BenchmarkMetric::UserActivation,
        BenchmarkMetric::InstanceUtilization,
        BenchmarkMetric::BroadcastsPerUser,
        BenchmarkMetric::BroadcastsPerInstance,
        BenchmarkMetric::UsersPerChannel,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BenchmarkMetric::UserActivation => "user_activation",
            BenchmarkMetric::InstanceUtilization => "instance_utilization",
            BenchmarkMetric::BroadcastsPerUser => "broadcasts_per_user",
            BenchmarkMetric::BroadcastsPerInstance => "broadcasts_per_instance",
            BenchmarkMetric::UsersPerChannel => "users_per_channel",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BenchmarkMetric::UserActivation => "User Activation %",
            BenchmarkMetric::InstanceUtilization => "Instance Utilization %",
            BenchmarkMetric::BroadcastsPerUser => "Broadcasts per User",
            BenchmarkMetric::BroadcastsPerInstance => "Broadcasts per Instance",
            BenchmarkMetric::UsersPerChannel => "Users per Channel",
        }
    }

    /// Whether values are percentages.
    pub fn is_percentage(&self) -> bool {
        matches!(
            self,
            BenchmarkMetric::UserActivation | BenchmarkMetric::InstanceUtilization
        )
    }

    pub fn value(&self, metrics: &CompanyMetrics) -> f64 {
        match self {
            BenchmarkMetric::UserActivation => metrics.user_activation,
            BenchmarkMetric::InstanceUtilization => metrics.instance_utilization,
            BenchmarkMetric::BroadcastsPerUser => metrics.broadcasts_per_user,
            BenchmarkMetric::BroadcastsPerInstance => metrics.broadcasts_per_instance,
            BenchmarkMetric::UsersPerChannel => metrics.users_per_channel,
        }
    }
}

impl FromStr for BenchmarkMetric {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let normalized = s.to_ascii_lowercase().replace('-', "_");
        BenchmarkMetric::ALL
            .into_iter()
            .find(|m| m.as_str() == normalized)
            .ok_or_else(|| format!("unknown benchmark metric: {s}"))
    }
}

/// Linear-interpolation percentile of `values` at fraction `p` in `[0, 1]`.
///
/// Returns `None` for an empty slice. `values` need not be sorted.
pub fn percentile(values: &[f64], p: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let rank = p.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let weight = rank - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * weight)
}

/// Where a company sits relative to a benchmark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Standing {
    TopQuartile,
    AboveMedian,
    BelowMedian,
    BottomQuartile,
}

impl Standing {
    pub fn as_str(&self) -> &'static str {
        match self {
            Standing::TopQuartile => "Top quartile",
            Standing::AboveMedian => "Above median",
            Standing::BelowMedian => "Below median",
            Standing::BottomQuartile => "Bottom quartile",
        }
    }
}

/// Percentile table for one metric over one company set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchmarkTable {
    pub metric: BenchmarkMetric,
    pub companies: usize,
    pub p25: f64,
    pub median: f64,
    pub p75: f64,
    pub min: f64,
    pub max: f64,
}

impl BenchmarkTable {
    /// Build a table from raw values.
    pub fn from_values(metric: BenchmarkMetric, values: &[f64]) -> Result<Self> {
        let insufficient = || Error::InsufficientData {
            metric: metric.as_str().to_string(),
        };
        let p25 = percentile(values, 0.25).ok_or_else(insufficient)?;
        let median = percentile(values, 0.5).ok_or_else(insufficient)?;
        let p75 = percentile(values, 0.75).ok_or_else(insufficient)?;
        let min = percentile(values, 0.0).ok_or_else(insufficient)?;
        let max = percentile(values, 1.0).ok_or_else(insufficient)?;

        Ok(Self {
            metric,
            companies: values.len(),
            p25,
            median,
            p75,
            min,
            max,
        })
    }

    pub fn standing(&self, value: f64) -> Standing {
        if value >= self.p75 {
            Standing::TopQuartile
        } else if value >= self.median {
            Standing::AboveMedian
        } else if value >= self.p25 {
            Standing::BelowMedian
        } else {
            Standing::BottomQuartile
        }
    }
}

/// Benchmark one metric across the given companies.
///
/// Fails with [`Error::InsufficientData`] when `metrics` is empty.
pub fn compute_benchmark(metric: BenchmarkMetric, metrics: &[CompanyMetrics]) -> Result<BenchmarkTable> {
    let values: Vec<f64> = metrics.iter().map(|m| metric.value(m)).collect();
    let table = BenchmarkTable::from_values(metric, &values)?;
    tracing::debug!(
        metric = metric.as_str(),
        companies = table.companies,
        p25 = table.p25,
        median = table.median,
        p75 = table.p75,
        "Computed benchmark"
    );
    Ok(table)
}

/// Benchmark every [`BenchmarkMetric`].
pub fn compute_all(metrics: &[CompanyMetrics]) -> Result<Vec<BenchmarkTable>> {
    BenchmarkMetric::ALL
        .iter()
        .map(|&metric| compute_benchmark(metric, metrics))
        .collect()
}

/// A company's standing on one benchmark.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyStanding {
    pub company: String,
    pub metric: BenchmarkMetric,
    pub value: f64,
    pub standing: Standing,
}

pub fn standings(table: &BenchmarkTable, metrics: &[CompanyMetrics]) -> Vec<CompanyStanding> {
    metrics
        .iter()
        .map(|m| {
            let value = table.metric.value(m);
            CompanyStanding {
                company: m.company.clone(),
                metric: table.metric,
                value,
                standing: table.standing(value),
            }
        })
        .collect()
}
