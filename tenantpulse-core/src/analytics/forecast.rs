//! Linear trend forecast of platform totals.
//!
//! # The history is synthetic
//!
//! No historical telemetry is retained. The "history" each forecast is fitted
//! to is fabricated from the current snapshot: for `i` periods ago the value
//! is `floor(current / (1 + growth_step * i + e))` with `e` drawn uniformly
//! from `[0, max_jitter)`. The true current value is appended as the final
//! period. The result is an illustrative trend projection, not a calibrated
//! prediction, and consumers must not present it as measured growth.
//!
//! The random source is injected. Pass a seeded
//! [`StdRng`](rand::rngs::StdRng) for reproducible output, or use
//! [`ForecastConfig::flat`] to disable both growth and jitter, in which case
//! the forecast equals the current value exactly.
//!
//! # Algorithm
//!
//! 1. Synthesize `history_periods` backward periods and append the current value.
//! 2. Fit `y = slope * x + intercept` by ordinary least squares, `x = 1..=n`.
//! 3. Evaluate at `x = n + 1 ..= n + horizon`, clamping negatives to 0.

use super::aggregate::PlatformTotals;
use crate::config::ForecastConfig;
use chrono::{Duration, NaiveDate};
use rand::Rng;
use serde::Serialize;

/// Days between consecutive periods.
pub const PERIOD_DAYS: i64 = 30;

const STRONG_GROWTH_PCT: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ForecastMetric {
    Users,
    Companies,
    Instances,
    Broadcasts,
}

impl ForecastMetric {
    pub const ALL: [ForecastMetric; 4] = [
        ForecastMetric::Users,
        ForecastMetric::Companies,
        ForecastMetric::Instances,
        ForecastMetric::Broadcasts,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ForecastMetric::Users => "Users",
            ForecastMetric::Companies => "Companies",
            ForecastMetric::Instances => "Instances",
            ForecastMetric::Broadcasts => "Broadcasts",
        }
    }

    /// Current total for this metric from the platform counters.
    pub fn current(&self, totals: &PlatformTotals) -> f64 {
        match self {
            ForecastMetric::Users => totals.users as f64,
            ForecastMetric::Companies => totals.companies as f64,
            ForecastMetric::Instances => totals.instances as f64,
            ForecastMetric::Broadcasts => totals.broadcasts as f64,
        }
    }
}

// ============================================
// Backfill and fit
// ============================================

/// Fabricate `history_periods` backward values ending with `current`.
///
/// Oldest first. The returned series has `history_periods + 1` points.
pub fn synthesize_history<R: Rng + ?Sized>(
    current: f64,
    config: &ForecastConfig,
    rng: &mut R,
) -> Vec<f64> {
    let mut series: Vec<f64> = (1..=config.history_periods)
        .rev()
        .map(|periods_ago| {
            let jitter = if config.max_jitter > 0.0 {
                rng.gen_range(0.0..config.max_jitter)
            } else {
                0.0
            };
            let factor = 1.0 + config.growth_step * periods_ago as f64 + jitter;
            (current / factor).floor()
        })
        .collect();
    series.push(current);
    series
}

/// Least-squares line through `(1, y[0]), (2, y[1]), ...`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearFit {
    /// Fit a line to `values`. Fewer than two points give a flat line through
    /// the mean (or zero when empty).
    pub fn fit(values: &[f64]) -> Self {
        let n = values.len() as f64;
        if values.is_empty() {
            return Self {
                slope: 0.0,
                intercept: 0.0,
            };
        }
        let mean_x = (n + 1.0) / 2.0;
        let mean_y = values.iter().sum::<f64>() / n;

        let (sxy, sxx) = values
            .iter()
            .enumerate()
            .fold((0.0, 0.0), |(sxy, sxx), (i, &y)| {
                let dx = (i + 1) as f64 - mean_x;
                (sxy + dx * (y - mean_y), sxx + dx * dx)
            });

        let slope = if sxx > 0.0 { sxy / sxx } else { 0.0 };
        Self {
            slope,
            intercept: mean_y - slope * mean_x,
        }
    }

    pub fn at(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }

    /// Evaluate the next `horizon` steps after a series of length `len`,
    /// clamping negatives to 0.
    pub fn project(&self, len: usize, horizon: usize) -> Vec<f64> {
        (1..=horizon)
            .map(|step| self.at((len + step) as f64).max(0.0))
            .collect()
    }
}

// ============================================
// Forecast records
// ============================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Trend {
    Growing,
    Declining,
}

impl Trend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Growing => "Growing",
            Trend::Declining => "Declining",
        }
    }
}

/// Forecast for one metric.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricForecast {
    pub metric: ForecastMetric,
    pub current: f64,
    /// Synthetic history, oldest first, ending with `current`
    pub history: Vec<f64>,
    pub fit: LinearFit,
    pub forecast: Vec<f64>,
    /// Last forecast value vs current (percent), `0.0` when current is 0
    pub growth_pct: f64,
    /// First to last history point (percent), `0.0` when the first is 0
    pub period_growth_pct: f64,
    pub trend: Trend,
}

fn pct_change(from: f64, to: f64) -> f64 {
    if from > 0.0 {
        (to - from) / from * 100.0
    } else {
        0.0
    }
}

pub fn forecast_metric<R: Rng + ?Sized>(
    metric: ForecastMetric,
    current: f64,
    config: &ForecastConfig,
    rng: &mut R,
) -> MetricForecast {
    let history = synthesize_history(current, config, rng);
    let fit = LinearFit::fit(&history);
    let forecast = fit.project(history.len(), config.horizon);

    let last = forecast.last().copied().unwrap_or(current);
    let first = history.first().copied().unwrap_or(current);
    let period_growth_pct = pct_change(first, current);
    let trend = if period_growth_pct > 0.0 {
        Trend::Growing
    } else {
        Trend::Declining
    };

    tracing::debug!(
        metric = metric.as_str(),
        current,
        slope = fit.slope,
        projected = last,
        "Fitted forecast trend"
    );

    MetricForecast {
        metric,
        current,
        history,
        fit,
        forecast,
        growth_pct: pct_change(current, last),
        period_growth_pct,
        trend,
    }
}

/// Provisioning advice when a forecast exceeds current capacity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CapacityRecommendation {
    pub resource: &'static str,
    pub current: f64,
    pub needed: f64,
    pub gap: u64,
    pub action: String,
}

fn capacity_for(forecast: &MetricForecast) -> Option<CapacityRecommendation> {
    let needed = forecast.forecast.last().copied()?;
    let gap = (needed - forecast.current).floor();
    if gap < 1.0 {
        return None;
    }
    let gap = gap as u64;
    let (resource, action) = match forecast.metric {
        ForecastMetric::Instances => ("Instances", format!("Provision {gap} more instances")),
        ForecastMetric::Users => ("User Licenses", format!("Plan for {gap} more users")),
        ForecastMetric::Companies | ForecastMetric::Broadcasts => return None,
    };
    Some(CapacityRecommendation {
        resource,
        current: forecast.current,
        needed,
        gap,
        action,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Outlook {
    Strong,
    Positive,
    Negative,
}

impl Outlook {
    pub fn from_growth(average_pct: f64) -> Self {
        if average_pct > STRONG_GROWTH_PCT {
            Outlook::Strong
        } else if average_pct > 0.0 {
            Outlook::Positive
        } else {
            Outlook::Negative
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Outlook::Strong => "Strong",
            Outlook::Positive => "Positive",
            Outlook::Negative => "Negative",
        }
    }
}

/// Cross-metric view of the period growth rates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrowthSummary {
    pub average_growth_pct: f64,
    pub fastest: ForecastMetric,
    pub slowest: ForecastMetric,
    pub outlook: Outlook,
}

impl GrowthSummary {
    pub fn from_forecasts(forecasts: &[MetricForecast]) -> Option<Self> {
        let fastest = forecasts
            .iter()
            .max_by(|a, b| a.period_growth_pct.total_cmp(&b.period_growth_pct))?;
        let slowest = forecasts
            .iter()
            .min_by(|a, b| a.period_growth_pct.total_cmp(&b.period_growth_pct))?;
        let average = forecasts.iter().map(|f| f.period_growth_pct).sum::<f64>()
            / forecasts.len() as f64;
        Some(Self {
            average_growth_pct: average,
            fastest: fastest.metric,
            slowest: slowest.metric,
            outlook: Outlook::from_growth(average),
        })
    }
}

/// Full forecast over the platform totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastReport {
    pub as_of: NaiveDate,
    /// `%Y-%m` labels for the history, oldest first, ending at `as_of`
    pub history_labels: Vec<String>,
    /// `%Y-%m` labels for the projected periods
    pub forecast_labels: Vec<String>,
    pub metrics: Vec<MetricForecast>,
    pub capacity: Vec<CapacityRecommendation>,
    pub summary: Option<GrowthSummary>,
}

impl ForecastReport {
    pub fn build<R: Rng + ?Sized>(
        totals: &PlatformTotals,
        config: &ForecastConfig,
        rng: &mut R,
        as_of: NaiveDate,
    ) -> Self {
        let metrics: Vec<MetricForecast> = ForecastMetric::ALL
            .iter()
            .map(|&metric| forecast_metric(metric, metric.current(totals), config, rng))
            .collect();

        let capacity = metrics.iter().filter_map(capacity_for).collect();
        let summary = GrowthSummary::from_forecasts(&metrics);

        Self {
            as_of,
            history_labels: period_labels(as_of, -(config.history_periods as i64), 0),
            forecast_labels: period_labels(as_of, 1, config.horizon as i64),
            metrics,
            capacity,
            summary,
        }
    }

    pub fn get(&self, metric: ForecastMetric) -> Option<&MetricForecast> {
        self.metrics.iter().find(|m| m.metric == metric)
    }
}

/// Labels for period offsets `from..=to` relative to `as_of`.
fn period_labels(as_of: NaiveDate, from: i64, to: i64) -> Vec<String> {
    (from..=to)
        .map(|offset| {
            (as_of + Duration::days(offset * PERIOD_DAYS))
                .format("%Y-%m")
                .to_string()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn totals() -> PlatformTotals {
        PlatformTotals {
            companies: 40,
            active_companies: 30,
            users: 1200,
            channels: 90,
            instances: 75,
            broadcasts: 5000,
            speed_messages: 0,
        }
    }

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    #[test]
    fn test_fit_constant_series() {
        let fit = LinearFit::fit(&[7.0; 13]);
        assert_eq!(fit.slope, 0.0);
        assert_eq!(fit.intercept, 7.0);
        assert_eq!(fit.project(13, 3), vec![7.0, 7.0, 7.0]);
    }

    #[test]
    fn test_fit_exact_line() {
        let values: Vec<f64> = (1..=5).map(|x| 2.0 * x as f64 + 1.0).collect();
        let fit = LinearFit::fit(&values);
        assert!((fit.slope - 2.0).abs() < 1e-9);
        assert!((fit.intercept - 1.0).abs() < 1e-9);
        let next = fit.project(5, 2);
        assert!((next[0] - 13.0).abs() < 1e-9);
        assert!((next[1] - 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_fit_degenerate_inputs() {
        assert_eq!(LinearFit::fit(&[]).at(10.0), 0.0);
        let single = LinearFit::fit(&[4.0]);
        assert_eq!(single.slope, 0.0);
        assert_eq!(single.at(3.0), 4.0);
    }

    #[test]
    fn test_projection_clamps_negative() {
        let fit = LinearFit::fit(&[10.0, 5.0, 0.0]);
        assert_eq!(fit.project(3, 3), vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_flat_config_forecast_equals_input() {
        let mut rng = StdRng::seed_from_u64(1);
        let forecast =
            forecast_metric(ForecastMetric::Users, 1200.0, &ForecastConfig::flat(), &mut rng);
        assert_eq!(forecast.history.len(), 13);
        assert!(forecast.history.iter().all(|&v| v == 1200.0));
        assert_eq!(forecast.forecast, vec![1200.0, 1200.0, 1200.0]);
        assert_eq!(forecast.growth_pct, 0.0);
        assert_eq!(forecast.period_growth_pct, 0.0);
        assert_eq!(forecast.trend, Trend::Declining);
    }

    #[test]
    fn test_history_grows_towards_current() {
        let config = ForecastConfig::default();
        let mut rng = StdRng::seed_from_u64(7);
        let history = synthesize_history(1000.0, &config, &mut rng);
        assert_eq!(history.len(), config.history_periods + 1);
        assert_eq!(*history.last().unwrap(), 1000.0);
        // divisor is at least 1 + 0.05 * i, at most 1 + 0.05 * i + 0.1
        for (idx, &value) in history[..12].iter().enumerate() {
            let periods_ago = (12 - idx) as f64;
            assert!(value <= (1000.0 / (1.0 + 0.05 * periods_ago)).floor());
            assert!(value >= (1000.0 / (1.1 + 0.05 * periods_ago)).floor());
        }
    }

    #[test]
    fn test_seeded_forecast_is_deterministic() {
        let config = ForecastConfig::default();
        let a = ForecastReport::build(&totals(), &config, &mut StdRng::seed_from_u64(42), as_of());
        let b = ForecastReport::build(&totals(), &config, &mut StdRng::seed_from_u64(42), as_of());
        assert_eq!(a, b);

        let users = a.get(ForecastMetric::Users).unwrap();
        assert_eq!(users.trend, Trend::Growing);
        assert!(users.fit.slope > 0.0);
        assert!(users.forecast.iter().all(|v| *v >= 0.0));
    }

    #[test]
    fn test_report_labels_and_capacity() {
        let config = ForecastConfig {
            max_jitter: 0.0,
            ..Default::default()
        };
        let report =
            ForecastReport::build(&totals(), &config, &mut StdRng::seed_from_u64(3), as_of());
        assert_eq!(report.history_labels.len(), 13);
        assert_eq!(report.history_labels.last().unwrap(), "2024-06");
        assert_eq!(report.history_labels[0], "2023-06");
        assert_eq!(report.forecast_labels, vec!["2024-07", "2024-08", "2024-09"]);

        let resources: Vec<&str> = report.capacity.iter().map(|c| c.resource).collect();
        assert_eq!(resources, vec!["User Licenses", "Instances"]);
        assert_eq!(report.capacity[0].gap, 74);
        assert_eq!(report.capacity[0].action, "Plan for 74 more users");
        assert_eq!(report.capacity[1].gap, 4);
        assert_eq!(report.capacity[1].action, "Provision 4 more instances");

        let users = report.get(ForecastMetric::Users).unwrap();
        assert!((users.period_growth_pct - 60.0).abs() < 1e-9);
        assert!(users.growth_pct > 6.0);

        let summary = report.summary.unwrap();
        assert_eq!(summary.outlook, Outlook::Strong);
    }

    #[test]
    fn test_flat_report_has_no_capacity_gap() {
        let report = ForecastReport::build(
            &totals(),
            &ForecastConfig::flat(),
            &mut StdRng::seed_from_u64(0),
            as_of(),
        );
        assert!(report.capacity.is_empty());
        let summary = report.summary.unwrap();
        assert_eq!(summary.average_growth_pct, 0.0);
        assert_eq!(summary.outlook, Outlook::Negative);
    }

    #[test]
    fn test_zero_totals() {
        let report = ForecastReport::build(
            &PlatformTotals::default(),
            &ForecastConfig::default(),
            &mut StdRng::seed_from_u64(0),
            as_of(),
        );
        for metric in &report.metrics {
            assert_eq!(metric.forecast, vec![0.0, 0.0, 0.0]);
            assert_eq!(metric.growth_pct, 0.0);
        }
    }

    #[test]
    fn test_outlook_thresholds() {
        assert_eq!(Outlook::from_growth(10.5), Outlook::Strong);
        assert_eq!(Outlook::from_growth(10.0), Outlook::Positive);
        assert_eq!(Outlook::from_growth(0.0), Outlook::Negative);
    }
}
