//! Text and JSON rendering of analysis records.
//!
//! Nothing here computes new values; every number comes from the report.

use anyhow::Result;
use serde::Serialize;
use std::collections::BTreeMap;
use tenantpulse_core::analytics::alerts::{group_by_severity, Alert, Severity};
use tenantpulse_core::analytics::benchmark::{standings, BenchmarkTable};
use tenantpulse_core::analytics::forecast::ForecastReport;
use tenantpulse_core::analytics::metrics_registry::MetricDescriptor;
use tenantpulse_core::analytics::AnalysisReport;
use tenantpulse_core::format::{
    format_change, format_count, format_currency, format_percent, truncate,
};

const NAME_WIDTH: usize = 28;

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn heading(title: &str) {
    println!("{title}");
    println!("{}", "=".repeat(title.len()));
}

fn name(text: &str) -> String {
    truncate(text, NAME_WIDTH)
}

// ============================================
// Summary
// ============================================

pub fn print_summary(report: &AnalysisReport, digest: Option<&str>) {
    let totals = &report.totals;
    let kpis = &report.kpis;

    heading("Platform Summary");
    if let Some(digest) = digest {
        println!("Snapshot:               {}", &digest[..12.min(digest.len())]);
    }
    println!(
        "Companies:              {} ({} active)",
        format_count(totals.companies),
        format_count(totals.active_companies)
    );
    println!("Users:                  {}", format_count(totals.users));
    println!("Channels:               {}", format_count(totals.channels));
    println!("Instances:              {}", format_count(totals.instances));
    println!("Broadcasts:             {}", format_count(totals.broadcasts));
    println!("Speed messages:         {}", format_count(totals.speed_messages));
    println!();

    heading("Key Indicators");
    println!("User activation:        {}", format_percent(kpis.user_activation));
    println!("Instance utilization:   {}", format_percent(kpis.instance_utilization));
    println!("Avg users per company:  {:.1}", kpis.avg_users_per_company);
    println!("Broadcasts per instance: {:.1}", kpis.broadcasts_per_instance);
    println!("Efficiency score:       {:.1}", kpis.efficiency_score);
    println!();

    let overview = &report.health_overview;
    heading("Health");
    println!(
        "Healthy {} | Stable {} | At Risk {} | Critical {} | average {:.1}",
        overview.healthy, overview.stable, overview.at_risk, overview.critical, overview.average_health
    );
    let alerts = &report.alert_summary;
    println!(
        "Alerts: {} (critical {}, high {}, medium {}, low {})",
        alerts.total,
        alerts.count(Severity::Critical),
        alerts.count(Severity::High),
        alerts.count(Severity::Medium),
        alerts.count(Severity::Low)
    );
    println!(
        "Revenue: {} MRR, {} ARR",
        format_currency(report.revenue_summary.total_mrr),
        format_currency(report.revenue_summary.total_arr)
    );

    if !report.recommendations.is_empty() {
        println!();
        heading("Recommendations");
        let mut current: Option<&str> = None;
        for rec in &report.recommendations {
            if current != Some(rec.company.as_str()) {
                println!("{}:", rec.company);
                current = Some(rec.company.as_str());
            }
            println!("  - {}", rec.message);
        }
    }
}

// ============================================
// Health, scorecard and breakdowns
// ============================================

pub fn print_health(report: &AnalysisReport) {
    heading("Customer Health");
    if report.health.is_empty() {
        println!("No companies in scope.");
        return;
    }

    let mut records: Vec<_> = report.health.iter().collect();
    records.sort_by(|a, b| b.overall_health.total_cmp(&a.overall_health));

    println!(
        "{:<w$} {:>7} {:>7} {:>7} {:>7}  {:<9} {:<9} Recommendation",
        "Company",
        "Health",
        "Engage",
        "Adopt",
        "Growth",
        "Status",
        "Risk",
        w = NAME_WIDTH
    );
    for r in records {
        println!(
            "{:<w$} {:>7.1} {:>7.1} {:>7.1} {:>7.1}  {:<9} {:<9} {}",
            name(&r.company),
            r.overall_health,
            r.engagement_score,
            r.adoption_score,
            r.growth_potential,
            r.status.as_str(),
            r.risk_level.as_str(),
            r.recommendation,
            w = NAME_WIDTH
        );
    }

    let opportunities = report.growth_opportunities();
    if !opportunities.is_empty() {
        println!();
        println!("Growth opportunities:");
        for r in opportunities {
            println!("  {} (health {:.1}, {} users)", r.company, r.overall_health, r.total_users);
        }
    }
}

pub fn print_scorecard(report: &AnalysisReport) {
    heading("Performance Scorecard");
    if report.scorecard.is_empty() {
        println!("No companies in scope.");
        return;
    }

    let mut scores: Vec<_> = report.scorecard.iter().collect();
    scores.sort_by(|a, b| b.overall_score.total_cmp(&a.overall_score));

    println!(
        "{:<w$} {:>7} {:>7} {:>9} {:>8}  {:<10} Churn risk",
        "Company",
        "Score",
        "Users%",
        "Instance%",
        "Usage",
        "Status",
        w = NAME_WIDTH
    );
    for s in scores {
        println!(
            "{:<w$} {:>7.1} {:>7.1} {:>9.1} {:>8.1}  {:<10} {}",
            name(&s.company),
            s.overall_score,
            s.user_activity,
            s.instance_activity,
            s.resource_usage,
            s.status.as_str(),
            s.churn_risk,
            w = NAME_WIDTH
        );
    }

    let candidates = report.upsell_candidates();
    if !candidates.is_empty() {
        println!();
        println!("Upsell candidates:");
        for s in candidates {
            println!("  {} (score {:.1}, {} users)", s.company, s.overall_score, s.total_users);
        }
    }
}

fn counts(map: &BTreeMap<String, usize>) -> String {
    if map.is_empty() {
        return "-".to_string();
    }
    map.iter()
        .map(|(key, count)| format!("{key} {count}"))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn print_breakdowns(report: &AnalysisReport) {
    heading("Company Breakdown");
    if report.breakdowns.is_empty() {
        println!("No companies in scope.");
        return;
    }

    for b in &report.breakdowns {
        println!();
        println!("{}", b.company);
        println!("  Users by type:      {}", counts(&b.users_by_type));
        println!("  Instances by type:  {}", counts(&b.instances_by_type));
        println!("  Instance status:    {}", counts(&b.instances_by_status));
        println!(
            "  Broadcasts:         {} ({} completed, {})",
            counts(&b.broadcasts_by_status),
            b.completed_broadcasts,
            format_percent(b.broadcast_completion_rate)
        );
        println!(
            "  Speed messages:     {} ({} empty channels)",
            format_count(b.speed_messages),
            b.empty_channels
        );
        if !b.top_channels.is_empty() {
            let top: Vec<String> = b
                .top_channels
                .iter()
                .map(|(channel, count)| format!("{channel} ({count})"))
                .collect();
            println!("  Top channels:       {}", top.join(", "));
        }
    }
}

// ============================================
// Alerts
// ============================================

pub fn print_alerts(alerts: &[Alert], min_severity: Severity) {
    heading("Alerts");
    if alerts.is_empty() {
        println!("No alerts at or above {}.", min_severity.as_str());
        return;
    }

    for (severity, group) in group_by_severity(alerts) {
        println!();
        println!("[{}] {} alert(s)", severity.as_str(), group.len());
        for alert in group {
            println!("  {} - {}: {}", alert.company, alert.category, alert.message);
            println!("      metric: {}  action: {}", alert.metric, alert.action);
        }
    }
}

// ============================================
// Revenue
// ============================================

pub fn print_revenue(report: &AnalysisReport) {
    let summary = &report.revenue_summary;

    heading("Revenue");
    println!("Total MRR:        {}", format_currency(summary.total_mrr));
    println!("Total ARR:        {}", format_currency(summary.total_arr));
    println!("Avg per company:  {}", format_currency(summary.average_revenue));
    println!("Avg ARPU:         {}", format_currency(summary.average_arpu));
    println!(
        "By source:        users {}, instances {}, broadcasts {}",
        format_currency(summary.user_revenue),
        format_currency(summary.instance_revenue),
        format_currency(summary.broadcast_revenue)
    );
    for (tier, rollup) in summary.by_tier.iter().rev() {
        println!(
            "  {:<13} {:>4} companies  {}",
            tier.as_str(),
            rollup.companies,
            format_currency(rollup.monthly_revenue)
        );
    }

    if report.revenue.is_empty() {
        return;
    }
    println!();
    let mut records: Vec<_> = report.revenue.iter().collect();
    records.sort_by(|a, b| b.monthly_revenue.total_cmp(&a.monthly_revenue));
    println!(
        "{:<w$} {:>14} {:>16} {:>10}  Tier",
        "Company",
        "Monthly",
        "Annual",
        "ARPU",
        w = NAME_WIDTH
    );
    for r in records {
        println!(
            "{:<w$} {:>14} {:>16} {:>10}  {}",
            name(&r.company),
            format_currency(r.monthly_revenue),
            format_currency(r.annual_revenue),
            format_currency(r.arpu),
            r.tier.as_str(),
            w = NAME_WIDTH
        );
    }

    let targets = report.upsell_targets();
    if !targets.is_empty() {
        println!();
        println!("Upsell targets (low ARPU, high broadcast volume):");
        for r in targets {
            println!(
                "  {} (ARPU {}, {} broadcasts)",
                r.company,
                format_currency(r.arpu),
                format_count(r.broadcasts)
            );
        }
    }
}

// ============================================
// Benchmarks
// ============================================

pub fn print_benchmarks(tables: &[BenchmarkTable], report: &AnalysisReport) {
    heading("Benchmarks");
    println!(
        "{:<24} {:>9} {:>9} {:>9} {:>9} {:>9}",
        "Metric", "Min", "P25", "Median", "P75", "Max"
    );
    for t in tables {
        println!(
            "{:<24} {:>9.1} {:>9.1} {:>9.1} {:>9.1} {:>9.1}",
            t.metric.label(),
            t.min,
            t.p25,
            t.median,
            t.p75,
            t.max
        );
    }

    if let [table] = tables {
        println!();
        for s in standings(table, &report.companies) {
            println!("  {:<w$} {:>9.1}  {}", name(&s.company), s.value, s.standing.as_str(), w = NAME_WIDTH);
        }
    }
}

// ============================================
// Forecast
// ============================================

pub fn print_forecast(forecast: &ForecastReport) {
    heading("Forecast");
    println!("Projection from synthetic history; not measured growth.");
    println!("As of {} ({} periods back)", forecast.as_of, forecast.history_labels.len().saturating_sub(1));
    println!();

    print!("{:<12} {:>12}", "Metric", "Current");
    for label in &forecast.forecast_labels {
        print!(" {:>12}", label);
    }
    println!(" {:>9} {:>9}  Trend", "Change", "Period");

    for m in &forecast.metrics {
        print!("{:<12} {:>12}", m.metric.as_str(), format_count(m.current as u64));
        for value in &m.forecast {
            print!(" {:>12}", format_count(value.round() as u64));
        }
        println!(
            " {:>9} {:>9}  {}",
            format_change(m.growth_pct),
            format_change(m.period_growth_pct),
            m.trend.as_str()
        );
    }

    println!();
    if forecast.capacity.is_empty() {
        println!("Current capacity covers the forecast horizon.");
    } else {
        println!("Capacity planning:");
        for c in &forecast.capacity {
            println!("  {}: {} (gap {})", c.resource, c.action, format_count(c.gap));
        }
    }

    if let Some(summary) = &forecast.summary {
        println!();
        println!(
            "Outlook: {} (average {}, fastest {}, slowest {})",
            summary.outlook.as_str(),
            format_change(summary.average_growth_pct),
            summary.fastest.as_str(),
            summary.slowest.as_str()
        );
    }
}

// ============================================
// Metrics registry
// ============================================

pub fn print_metrics(metrics: &[MetricDescriptor]) {
    heading("Metrics");
    println!(
        "{:<11} {:<9} {:<26} {:<9} Summary",
        "Component", "Scope", "Name", "Type"
    );
    for m in metrics {
        println!(
            "{:<11} {:<9} {:<26} {:<9} {}",
            m.component,
            m.scope,
            m.name,
            m.value_type.as_str(),
            m.summary
        );
    }
}
