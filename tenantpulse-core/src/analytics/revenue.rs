//! Revenue estimates from unit pricing.
//!
//! Monthly revenue is `users_count x price_per_user + instances_count x
//! price_per_instance + broadcasts_count x price_per_broadcast`. Volumes come
//! from the company counters, not the populated collections, and users are
//! billed whether or not they are active.

use super::benchmark::percentile;
use crate::config::PricingConfig;
use crate::types::Company;
use serde::Serialize;
use std::collections::BTreeMap;

/// Revenue tier by monthly revenue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum RevenueTier {
    Starter,
    Growth,
    Professional,
    Enterprise,
}

impl RevenueTier {
    /// Match thresholds high to low, lower bound inclusive.
    pub fn from_monthly(monthly: f64, pricing: &PricingConfig) -> Self {
        if monthly >= pricing.enterprise_threshold {
            RevenueTier::Enterprise
        } else if monthly >= pricing.professional_threshold {
            RevenueTier::Professional
        } else if monthly >= pricing.growth_threshold {
            RevenueTier::Growth
        } else {
            RevenueTier::Starter
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RevenueTier::Starter => "Starter",
            RevenueTier::Growth => "Growth",
            RevenueTier::Professional => "Professional",
            RevenueTier::Enterprise => "Enterprise",
        }
    }
}

/// Estimated revenue for one company.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RevenueRecord {
    pub company: String,
    pub users: u64,
    pub instances: u64,
    pub broadcasts: u64,
    pub user_revenue: f64,
    pub instance_revenue: f64,
    pub broadcast_revenue: f64,
    pub monthly_revenue: f64,
    pub annual_revenue: f64,
    /// Monthly revenue per user, `0.0` without users
    pub arpu: f64,
    pub tier: RevenueTier,
}

pub fn compute_revenue(company: &Company, pricing: &PricingConfig) -> RevenueRecord {
    let user_revenue = company.users_count as f64 * pricing.price_per_user;
    let instance_revenue = company.instances_count as f64 * pricing.price_per_instance;
    let broadcast_revenue = company.broadcasts_count as f64 * pricing.price_per_broadcast;
    let monthly = user_revenue + instance_revenue + broadcast_revenue;
    let arpu = if company.users_count > 0 {
        monthly / company.users_count as f64
    } else {
        0.0
    };

    RevenueRecord {
        company: company.name.clone(),
        users: company.users_count,
        instances: company.instances_count,
        broadcasts: company.broadcasts_count,
        user_revenue,
        instance_revenue,
        broadcast_revenue,
        monthly_revenue: monthly,
        annual_revenue: monthly * 12.0,
        arpu,
        tier: RevenueTier::from_monthly(monthly, pricing),
    }
}

/// Revenue for every company, preserving order.
pub fn compute_all(companies: &[Company], pricing: &PricingConfig) -> Vec<RevenueRecord> {
    companies.iter().map(|c| compute_revenue(c, pricing)).collect()
}

/// Platform-wide revenue rollup.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RevenueSummary {
    pub total_mrr: f64,
    pub total_arr: f64,
    pub average_revenue: f64,
    pub average_arpu: f64,
    pub by_tier: BTreeMap<RevenueTier, TierRollup>,
    pub user_revenue: f64,
    pub instance_revenue: f64,
    pub broadcast_revenue: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TierRollup {
    pub companies: usize,
    pub monthly_revenue: f64,
}

impl RevenueSummary {
    pub fn from_records(records: &[RevenueRecord]) -> Self {
        let mut summary = records.iter().fold(Self::default(), |mut acc, r| {
            acc.total_mrr += r.monthly_revenue;
            acc.user_revenue += r.user_revenue;
            acc.instance_revenue += r.instance_revenue;
            acc.broadcast_revenue += r.broadcast_revenue;
            let tier = acc.by_tier.entry(r.tier).or_default();
            tier.companies += 1;
            tier.monthly_revenue += r.monthly_revenue;
            acc
        });
        summary.total_arr = summary.total_mrr * 12.0;
        if !records.is_empty() {
            let n = records.len() as f64;
            summary.average_revenue = summary.total_mrr / n;
            summary.average_arpu = records.iter().map(|r| r.arpu).sum::<f64>() / n;
        }
        summary
    }
}

/// Companies paying below the mean ARPU while broadcasting above the median
/// volume.
pub fn upsell_targets(records: &[RevenueRecord]) -> Vec<&RevenueRecord> {
    if records.is_empty() {
        return Vec::new();
    }
    let mean_arpu = records.iter().map(|r| r.arpu).sum::<f64>() / records.len() as f64;
    let volumes: Vec<f64> = records.iter().map(|r| r.broadcasts as f64).collect();
    let Some(median_broadcasts) = percentile(&volumes, 0.5) else {
        return Vec::new();
    };

    records
        .iter()
        .filter(|r| r.arpu < mean_arpu && r.broadcasts as f64 > median_broadcasts)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn company(name: &str, users: u64, instances: u64, broadcasts: u64) -> Company {
        let mut company = Company::new(name);
        company.users_count = users;
        company.instances_count = instances;
        company.broadcasts_count = broadcasts;
        company
    }

    #[test]
    fn test_revenue_formula() {
        let record = compute_revenue(&company("Acme", 100, 2, 500), &PricingConfig::default());
        assert!((record.monthly_revenue - 1105.0).abs() < 1e-9);
        assert!((record.annual_revenue - 13260.0).abs() < 1e-9);
        assert!((record.arpu - 11.05).abs() < 1e-9);
        assert_eq!(record.tier, RevenueTier::Professional);
        assert!((record.broadcast_revenue - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_users_arpu() {
        let record = compute_revenue(&company("Bare", 0, 1, 0), &PricingConfig::default());
        assert_eq!(record.arpu, 0.0);
        assert_eq!(record.monthly_revenue, 50.0);
        assert_eq!(record.tier, RevenueTier::Starter);
    }

    #[test]
    fn test_tier_boundaries() {
        let pricing = PricingConfig::default();
        assert_eq!(RevenueTier::from_monthly(5000.0, &pricing), RevenueTier::Enterprise);
        assert_eq!(RevenueTier::from_monthly(4999.99, &pricing), RevenueTier::Professional);
        assert_eq!(RevenueTier::from_monthly(1000.0, &pricing), RevenueTier::Professional);
        assert_eq!(RevenueTier::from_monthly(100.0, &pricing), RevenueTier::Growth);
        assert_eq!(RevenueTier::from_monthly(99.99, &pricing), RevenueTier::Starter);
    }

    #[test]
    fn test_custom_pricing() {
        let pricing = PricingConfig {
            price_per_user: 20.0,
            ..Default::default()
        };
        let record = compute_revenue(&company("Acme", 10, 0, 0), &pricing);
        assert_eq!(record.monthly_revenue, 200.0);
    }

    #[test]
    fn test_summary() {
        let records = compute_all(
            &[company("a", 100, 2, 500), company("b", 5, 0, 0)],
            &PricingConfig::default(),
        );
        let summary = RevenueSummary::from_records(&records);
        assert!((summary.total_mrr - 1155.0).abs() < 1e-9);
        assert!((summary.total_arr - 13860.0).abs() < 1e-9);
        assert!((summary.average_revenue - 577.5).abs() < 1e-9);
        assert!((summary.user_revenue - 1050.0).abs() < 1e-9);
        assert_eq!(summary.by_tier[&RevenueTier::Professional].companies, 1);
        assert_eq!(summary.by_tier[&RevenueTier::Starter].companies, 1);

        assert_eq!(RevenueSummary::from_records(&[]), RevenueSummary::default());
    }

    #[test]
    fn test_upsell_targets() {
        let records = compute_all(
            &[
                // arpu 10.5, heavy broadcaster
                company("Heavy", 100, 0, 5000),
                // arpu 60, no broadcasts
                company("Light", 1, 1, 0),
                // arpu 10, few broadcasts
                company("Small", 10, 0, 10),
            ],
            &PricingConfig::default(),
        );
        let targets: Vec<&str> = upsell_targets(&records)
            .iter()
            .map(|r| r.company.as_str())
            .collect();
        assert_eq!(targets, vec!["Heavy"]);
        assert!(upsell_targets(&[]).is_empty());
    }
}
