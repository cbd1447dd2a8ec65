//! Terminal output formatting.

use colored::{ColoredString, Colorize};
use koinonia_core::consolidation::model::{ConsolidationStats, Convert, ConvertStatus, FunnelData};
use koinonia_core::supervision::model::{
    AlertSeverity, HealthStatus, SupervisionAlert, SupervisionDashboard,
};

/// Print converts as a table.
pub fn print_converts_table(converts: &[Convert]) {
    if converts.is_empty() {
        println!("{}", "No converts found.".dimmed());
        return;
    }

    println!("{:<36} {:<12} {:<12} {:<6}", "ID", "Decision", "Status", "Risk");
    println!("{}", "-".repeat(70));

    for convert in converts {
        println!(
            "{:<36} {:<12} {:<12} {}",
            &convert.id[..8],
            convert.decision_date,
            status_colored(convert.status),
            format_risk(convert.evasion_risk_score)
        );
    }
}

fn status_colored(status: ConvertStatus) -> ColoredString {
    match status {
        ConvertStatus::New => "new".yellow(),
        ConvertStatus::Contacted => "contacted".cyan(),
        ConvertStatus::Connected => "connected".blue(),
        ConvertStatus::Integrated => "integrated".green(),
        ConvertStatus::Lost => "lost".red(),
    }
}

/// Color a risk score by severity.
pub fn format_risk(score: f64) -> ColoredString {
    let text = format!("{:.2}", score);
    if score >= koinonia_core::consolidation::HIGH_RISK_THRESHOLD {
        text.red().bold()
    } else if score >= 0.4 {
        text.yellow()
    } else {
        text.green()
    }
}

/// Print the funnel buckets.
pub fn print_funnel(funnel: &FunnelData) {
    println!("{}", "Consolidation Funnel".bold());
    println!("  {:<12} {}", "new", funnel.new);
    println!("  {:<12} {}", "contacted", funnel.contacted);
    println!("  {:<12} {}", "connected", funnel.connected);
    println!("  {:<12} {}", "integrated", funnel.integrated);
    println!("  {:<12} {}", "lost", funnel.lost.to_string().red());
    println!("  {:<12} {}", "total".bold(), funnel.total());
}

/// Print consolidation stats.
pub fn print_stats(stats: &ConsolidationStats) {
    print_funnel(&stats.funnel);
    println!();
    println!("{}: {}", "Average risk".bold(), format_risk(stats.avg_risk_score));
    println!("{}: {}", "High risk".bold(), stats.high_risk_count);
}

/// Print a supervision dashboard.
pub fn print_dashboard(dashboard: &SupervisionDashboard) {
    println!("{}", "Supervision Dashboard".bold());
    println!("  {:<14} {}", "cells", dashboard.total_cells);
    println!("  {:<14} {}", "members", dashboard.total_members);
    println!("  {:<14} {}%", "active rate", dashboard.active_rate);
    println!("  {:<14} {}%", "avg presence", dashboard.avg_presence);

    if dashboard.cell_stats.is_empty() {
        return;
    }

    println!();
    println!("{:<30} {:<10} {:<12} {}", "Cell", "Presence", "Last met", "Members");
    println!("{}", "-".repeat(62));

    // Ranked by presence; the aggregator leaves ordering to us
    let mut ranked: Vec<_> = dashboard.cell_stats.iter().collect();
    ranked.sort_by_key(|c| std::cmp::Reverse(c.avg_presence));
    for cell in ranked {
        println!(
            "{:<30} {:<10} {:<12} {}",
            truncate(&cell.name, 28),
            format!("{}%", cell.avg_presence),
            cell.last_meeting_date.as_deref().unwrap_or("never"),
            cell.member_count
        );
    }
}

/// Print raised alerts.
pub fn print_alerts(alerts: &[SupervisionAlert]) {
    if alerts.is_empty() {
        println!("{} No alerts raised.", "✓".green().bold());
        return;
    }

    for alert in alerts {
        let severity = match alert.severity {
            AlertSeverity::Medium => "medium".yellow(),
            AlertSeverity::High => "high".red(),
            AlertSeverity::Critical => "critical".red().bold(),
        };
        println!("[{}] {}", severity, alert.message);
    }
}

/// Color a traffic-light health status.
pub fn format_health(status: HealthStatus) -> ColoredString {
    match status {
        HealthStatus::Green => "green".green().bold(),
        HealthStatus::Yellow => "yellow".yellow().bold(),
        HealthStatus::Red => "red".red().bold(),
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", head)
    }
}
