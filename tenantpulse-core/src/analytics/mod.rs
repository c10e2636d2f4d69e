//! Analytics engine for tenantpulse
//!
//! Pure computations over an in-memory company set:
//! - Counts, rates and ratios ([`aggregate`])
//! - Health scores and the performance scorecard ([`health`])
//! - Threshold alerts ([`alerts`])
//! - Cross-company percentile benchmarks ([`benchmark`])
//! - Revenue estimates ([`revenue`])
//! - Linear trend forecasts over synthetic history ([`forecast`])
//! - Console recommendations ([`insights`])
//!
//! Per-company results are independent of each other. Benchmarks, platform
//! totals and forecasts need the whole set and run afterwards; see
//! [`report::AnalysisReport`] for the assembled run.

pub mod aggregate;
pub mod alerts;
pub mod benchmark;
pub mod forecast;
pub mod health;
pub mod insights;
pub mod metrics_registry;
pub mod report;
pub mod revenue;

pub use aggregate::{
    activation_rate, company_metrics, CompanyBreakdown, CompanyMetrics, PlatformActivity,
    PlatformKpis, PlatformTotals,
};
pub use alerts::{create_default_engine, Alert, AlertEngine, AlertRule, AlertSummary, Severity};
pub use benchmark::{compute_benchmark, percentile, BenchmarkMetric, BenchmarkTable, Standing};
pub use forecast::{ForecastMetric, ForecastReport, LinearFit, MetricForecast};
pub use health::{HealthRecord, HealthStatus, PerformanceScore, PerformanceStatus};
pub use report::AnalysisReport;
pub use revenue::{compute_revenue, RevenueRecord, RevenueSummary, RevenueTier};
