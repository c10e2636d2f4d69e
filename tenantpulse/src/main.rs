//! tenantpulse - tenant analytics for a messaging platform
//!
//! Loads a platform snapshot, narrows it with the global filters and renders
//! one view of the analysis as text or JSON.

mod render;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use tenantpulse_core::analytics::alerts::{self, Severity};
use tenantpulse_core::analytics::benchmark::{self, BenchmarkMetric};
use tenantpulse_core::analytics::metrics_registry::{self, MetricDescriptor};
use tenantpulse_core::analytics::AnalysisReport;
use tenantpulse_core::{ingest, Config, SnapshotFilter};

#[derive(Parser)]
#[command(name = "tenantpulse")]
#[command(about = "Health, alerts, revenue and forecasts for platform tenants")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    scope: ScopeArgs,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Platform totals, KPIs and recommendations
    Summary,
    /// Multi-factor health score per company
    Health,
    /// Performance scorecard per company
    Scorecard,
    /// User, instance, broadcast and channel composition per company
    Breakdown,
    /// Threshold alerts grouped by severity
    Alerts {
        /// Hide alerts below this severity (low, medium, high, critical)
        #[arg(long, default_value = "low")]
        min_severity: Severity,
    },
    /// Estimated revenue per company and tier
    Revenue,
    /// Cross-company percentile benchmarks
    Benchmark {
        /// Benchmark a single metric, e.g. user_activation
        #[arg(short, long)]
        metric: Option<BenchmarkMetric>,
    },
    /// Linear trend forecast over synthetic history
    Forecast {
        /// Seed for the synthetic history (overrides [forecast].seed)
        #[arg(long)]
        seed: Option<u64>,

        /// Date the current snapshot represents (YYYY-MM-DD, default today)
        #[arg(long)]
        as_of: Option<NaiveDate>,
    },
    /// List every metric the engine emits
    Metrics {
        /// Only metrics from this module (aggregate, health, alerts, ...)
        #[arg(long)]
        component: Option<String>,

        /// Only company or platform metrics
        #[arg(long)]
        scope: Option<String>,
    },
}

/// Snapshot filters shared by every view.
#[derive(Args)]
struct ScopeArgs {
    /// Snapshot JSON to analyze (defaults to [snapshot].path in the config)
    #[arg(short, long, global = true)]
    input: Option<PathBuf>,

    /// Analyze a single company by exact name
    #[arg(short, long, global = true)]
    company: Option<String>,

    /// Keep only users of this type (repeatable)
    #[arg(long = "user-type", global = true)]
    user_types: Vec<String>,

    /// Keep only active companies, users, instances and channels
    #[arg(long, global = true)]
    active_only: bool,
}

/// A finished analysis plus the digest of the snapshot it came from.
struct Analysis {
    report: AnalysisReport,
    source_digest: Option<String>,
}

fn analyze(
    scope: &ScopeArgs,
    config: &Config,
    seed: Option<u64>,
    as_of: Option<NaiveDate>,
) -> Result<Analysis> {
    let input = scope
        .input
        .clone()
        .or_else(|| config.snapshot.path.clone())
        .with_context(|| {
            format!(
                "no snapshot given: pass --input or set [snapshot].path in {}",
                Config::config_path().display()
            )
        })?;

    tracing::info!(path = %input.display(), "Analyzing snapshot");
    let snapshot = ingest::load_snapshot(&input)
        .with_context(|| format!("failed to load snapshot {}", input.display()))?;

    let known = SnapshotFilter::available_user_types(&snapshot);
    for user_type in &scope.user_types {
        if !known.contains(user_type) {
            tracing::warn!(user_type = %user_type, known = ?known, "User type not present in snapshot");
            eprintln!(
                "warning: no users of type {user_type:?} (known types: {})",
                known.join(", ")
            );
        }
    }

    let filter = SnapshotFilter {
        company: scope.company.clone(),
        user_types: scope.user_types.clone(),
        active_only: scope.active_only,
    };
    let companies = filter.apply(&snapshot.companies)?;

    let seed = seed.or(config.forecast.seed);
    tracing::debug!(?seed, "Seeding forecast backfill");
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let as_of = as_of.unwrap_or_else(|| chrono::Local::now().date_naive());

    Ok(Analysis {
        report: AnalysisReport::build(&companies, config, &mut rng, as_of),
        source_digest: snapshot.source_digest,
    })
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let (config, config_source) = Config::load().context("failed to load configuration")?;

    // Initialize logging
    let _log_guard = tenantpulse_core::logging::init(&config.logging)
        .context("failed to initialize logging")?;
    config_source.log();

    tracing::info!("tenantpulse starting");

    let json = cli.format == OutputFormat::Json;
    let scope = &cli.scope;

    match cli.command {
        Commands::Summary => {
            let Analysis {
                report,
                source_digest,
            } = analyze(scope, &config, None, None)?;
            if json {
                render::print_json(&serde_json::json!({
                    "source_digest": source_digest,
                    "totals": report.totals,
                    "activity": report.activity,
                    "kpis": report.kpis,
                    "health_overview": report.health_overview,
                    "alert_summary": report.alert_summary,
                    "revenue_summary": report.revenue_summary,
                    "recommendations": report.recommendations,
                }))?;
            } else {
                render::print_summary(&report, source_digest.as_deref());
            }
        }
        Commands::Health => {
            let report = analyze(scope, &config, None, None)?.report;
            if json {
                render::print_json(&serde_json::json!({
                    "overview": report.health_overview,
                    "companies": report.health,
                    "growth_opportunities": report.growth_opportunities(),
                }))?;
            } else {
                render::print_health(&report);
            }
        }
        Commands::Scorecard => {
            let report = analyze(scope, &config, None, None)?.report;
            if json {
                render::print_json(&serde_json::json!({
                    "companies": report.scorecard,
                    "upsell_candidates": report.upsell_candidates(),
                }))?;
            } else {
                render::print_scorecard(&report);
            }
        }
        Commands::Breakdown => {
            let report = analyze(scope, &config, None, None)?.report;
            if json {
                render::print_json(&report.breakdowns)?;
            } else {
                render::print_breakdowns(&report);
            }
        }
        Commands::Alerts { min_severity } => {
            let report = analyze(scope, &config, None, None)?.report;
            let shown = alerts::at_least(&report.alerts, min_severity);
            if json {
                render::print_json(&serde_json::json!({
                    "summary": report.alert_summary,
                    "alerts": shown,
                }))?;
            } else {
                render::print_alerts(&shown, min_severity);
            }
        }
        Commands::Revenue => {
            let report = analyze(scope, &config, None, None)?.report;
            if json {
                render::print_json(&serde_json::json!({
                    "summary": report.revenue_summary,
                    "companies": report.revenue,
                    "upsell_targets": report.upsell_targets(),
                }))?;
            } else {
                render::print_revenue(&report);
            }
        }
        Commands::Benchmark { metric } => {
            let report = analyze(scope, &config, None, None)?.report;
            let selected: Vec<BenchmarkMetric> = match metric {
                Some(metric) => vec![metric],
                None => BenchmarkMetric::ALL.to_vec(),
            };
            let tables = selected
                .into_iter()
                .map(|metric| benchmark::compute_benchmark(metric, &report.companies))
                .collect::<tenantpulse_core::Result<Vec<_>>>()?;
            if json {
                let standings: Vec<_> = tables
                    .iter()
                    .flat_map(|table| benchmark::standings(table, &report.companies))
                    .collect();
                render::print_json(&serde_json::json!({
                    "benchmarks": tables,
                    "standings": standings,
                }))?;
            } else {
                render::print_benchmarks(&tables, &report);
            }
        }
        Commands::Forecast { seed, as_of } => {
            let report = analyze(scope, &config, seed, as_of)?.report;
            if json {
                render::print_json(&report.forecast)?;
            } else {
                render::print_forecast(&report.forecast);
            }
        }
        Commands::Metrics {
            component,
            scope: metric_scope,
        } => {
            if let Some(requested) = metric_scope.as_deref() {
                if !matches!(requested, "company" | "platform") {
                    bail!("unknown metric scope {requested:?}: expected company or platform");
                }
            }
            let metrics: Vec<MetricDescriptor> = match (component.as_deref(), metric_scope.as_deref()) {
                (Some(component), Some(metric_scope)) => {
                    metrics_registry::list_metrics_for_component(component)
                        .into_iter()
                        .filter(|m| m.scope == metric_scope)
                        .collect()
                }
                (Some(component), None) => metrics_registry::list_metrics_for_component(component),
                (None, Some(metric_scope)) => metrics_registry::list_metrics_for_scope(metric_scope),
                (None, None) => metrics_registry::list_metrics(),
            };
            if json {
                render::print_json(&metrics)?;
            } else {
                render::print_metrics(&metrics);
            }
        }
    }

    Ok(())
}
