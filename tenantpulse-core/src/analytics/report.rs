//! Full analysis run over one company set.
//!
//! Runs in two stages. The map stage scores each company independently
//! (metrics, breakdowns, health, scorecard, alerts, revenue and
//! recommendations). The reduce stage needs every per-company result and
//! produces the platform totals, benchmarks, revenue rollup and forecast.

use super::aggregate::{
    company_metrics, CompanyBreakdown, CompanyMetrics, PlatformActivity, PlatformKpis,
    PlatformTotals,
};
use super::alerts::{self, Alert, AlertSummary};
use super::benchmark::{self, BenchmarkTable};
use super::forecast::ForecastReport;
use super::health::{HealthOverview, HealthRecord, PerformanceScore};
use super::insights::{recommendations_for, Recommendation};
use super::revenue::{self, RevenueRecord, RevenueSummary};
use crate::config::Config;
use crate::error::Error;
use crate::types::Company;
use chrono::NaiveDate;
use rand::Rng;
use serde::Serialize;

/// Channels listed per company in the breakdowns.
pub const TOP_CHANNELS: usize = 5;

/// Everything the engine derives from one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub companies: Vec<CompanyMetrics>,
    pub breakdowns: Vec<CompanyBreakdown>,
    pub health: Vec<HealthRecord>,
    pub health_overview: HealthOverview,
    pub scorecard: Vec<PerformanceScore>,
    pub alerts: Vec<Alert>,
    pub alert_summary: AlertSummary,
    pub revenue: Vec<RevenueRecord>,
    pub revenue_summary: RevenueSummary,
    pub recommendations: Vec<Recommendation>,
    pub totals: PlatformTotals,
    pub activity: PlatformActivity,
    pub kpis: PlatformKpis,
    /// Absent when the company set is empty
    pub benchmarks: Option<Vec<BenchmarkTable>>,
    pub forecast: ForecastReport,
}

impl AnalysisReport {
    pub fn build<R: Rng + ?Sized>(
        companies: &[Company],
        config: &Config,
        rng: &mut R,
        as_of: NaiveDate,
    ) -> Self {
        tracing::info!(companies = companies.len(), "Starting analysis");

        // Map
        let metrics = company_metrics(companies);
        let breakdowns: Vec<CompanyBreakdown> = companies
            .iter()
            .map(|c| CompanyBreakdown::from_company(c, TOP_CHANNELS))
            .collect();
        let health: Vec<HealthRecord> = metrics.iter().map(HealthRecord::score).collect();
        let scorecard: Vec<PerformanceScore> =
            metrics.iter().map(PerformanceScore::score).collect();
        let alerts = alerts::create_default_engine().evaluate_all(&metrics);
        let revenue = revenue::compute_all(companies, &config.pricing);
        let recommendations: Vec<Recommendation> = companies
            .iter()
            .zip(&metrics)
            .flat_map(|(company, m)| recommendations_for(company, m))
            .collect();
        tracing::info!(
            health = health.len(),
            alerts = alerts.len(),
            recommendations = recommendations.len(),
            "Per-company stage complete"
        );

        // Reduce
        let totals = PlatformTotals::from_companies(companies);
        let activity = PlatformActivity::from_metrics(&metrics);
        let kpis = PlatformKpis::compute(&totals, &activity);
        let benchmarks = match benchmark::compute_all(&metrics) {
            Ok(tables) => Some(tables),
            Err(Error::InsufficientData { metric }) => {
                tracing::warn!(metric = %metric, "Skipping benchmarks: no companies in scope");
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "Skipping benchmarks");
                None
            }
        };
        let forecast = ForecastReport::build(&totals, &config.forecast, rng, as_of);
        let revenue_summary = RevenueSummary::from_records(&revenue);
        tracing::info!(
            users = totals.users,
            mrr = revenue_summary.total_mrr,
            "Platform stage complete"
        );

        Self {
            health_overview: HealthOverview::from_records(&health),
            alert_summary: AlertSummary::from_alerts(&alerts),
            revenue_summary,
            companies: metrics,
            breakdowns,
            health,
            scorecard,
            alerts,
            revenue,
            recommendations,
            totals,
            activity,
            kpis,
            benchmarks,
            forecast,
        }
    }

    /// Health-based growth opportunities.
    pub fn growth_opportunities(&self) -> Vec<&HealthRecord> {
        self.health.iter().filter(|h| h.is_growth_opportunity()).collect()
    }

    /// Scorecard-based upsell candidates.
    pub fn upsell_candidates(&self) -> Vec<&PerformanceScore> {
        self.scorecard
            .iter()
            .filter(|s| s.is_upsell_candidate())
            .collect()
    }

    /// Revenue-based upsell targets.
    pub fn upsell_targets(&self) -> Vec<&RevenueRecord> {
        revenue::upsell_targets(&self.revenue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ForecastConfig;
    use crate::types::{Channel, Instance, User};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 31).unwrap()
    }

    fn sample() -> Vec<Company> {
        let mut acme = Company::new("Acme");
        acme.is_active = true;
        acme.users_count = 3;
        acme.instances_count = 1;
        acme.broadcasts_count = 10;
        acme.users = vec![
            User::new("a", "Agent", true),
            User::new("b", "Admin", true),
            User::new("c", "Agent", false),
        ];
        acme.instances = vec![Instance::new("i", true)];
        acme.channels = vec![Channel::new("c", true)];

        vec![acme, Company::new("Ghost")]
    }

    #[test]
    fn test_build_report() {
        let companies = sample();
        let report = AnalysisReport::build(
            &companies,
            &Config::default(),
            &mut StdRng::seed_from_u64(1),
            as_of(),
        );

        assert_eq!(report.companies.len(), 2);
        assert_eq!(report.breakdowns.len(), 2);
        assert_eq!(report.breakdowns[0].users_by_type.get("Agent"), Some(&2));
        assert_eq!(report.health.len(), 2);
        assert_eq!(report.scorecard.len(), 2);
        assert_eq!(report.revenue.len(), 2);
        assert_eq!(report.totals.users, 3);
        assert!(report.alerts.iter().any(|a| a.company == "Ghost" && a.rule == "churn.no_users"));
        assert_eq!(report.benchmarks.as_ref().map(Vec::len), Some(5));
        assert_eq!(report.forecast.metrics.len(), 4);
        let overview = &report.health_overview;
        assert_eq!(
            overview.critical + overview.at_risk + overview.stable + overview.healthy,
            2
        );
    }

    #[test]
    fn test_empty_company_set() {
        let report = AnalysisReport::build(
            &[],
            &Config::default(),
            &mut StdRng::seed_from_u64(1),
            as_of(),
        );
        assert!(report.companies.is_empty());
        assert!(report.alerts.is_empty());
        assert!(report.benchmarks.is_none());
        assert_eq!(report.revenue_summary.total_mrr, 0.0);
    }

    #[test]
    fn test_report_is_deterministic_for_a_seed() {
        let companies = sample();
        let config = Config::default();
        let a = AnalysisReport::build(&companies, &config, &mut StdRng::seed_from_u64(9), as_of());
        let b = AnalysisReport::build(&companies, &config, &mut StdRng::seed_from_u64(9), as_of());
        assert_eq!(a, b);
    }

    #[test]
    fn test_flat_forecast_in_report() {
        let config = Config {
            forecast: ForecastConfig::flat(),
            ..Default::default()
        };
        let report = AnalysisReport::build(
            &sample(),
            &config,
            &mut StdRng::seed_from_u64(0),
            as_of(),
        );
        for metric in &report.forecast.metrics {
            assert!(metric.forecast.iter().all(|v| *v == metric.current));
        }
    }
}
