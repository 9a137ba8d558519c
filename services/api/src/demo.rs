use crate::infra::{demo_manager, seed_demo_leads, seed_directory};
use chrono::Utc;
use clap::Args;
use realty_crm::crm::access::VisibilityScope;
use realty_crm::crm::leads::{InMemoryLeadRepository, LeadFilter, LeadService, TimeRange};
use realty_crm::error::AppError;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Time range for the daily series: week, month, or year
    #[arg(long)]
    pub(crate) time_range: Option<String>,
    /// Optional CSV of extra leads to import before reporting
    #[arg(long)]
    pub(crate) import_csv: Option<PathBuf>,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let now = Utc::now();
    let directory = Arc::new(seed_directory());
    let repository = Arc::new(InMemoryLeadRepository::new());
    seed_demo_leads(&repository, now);
    let service = LeadService::new(repository, directory);
    let manager = demo_manager();
    let scope = VisibilityScope::for_actor(&manager);

    println!("Realty CRM demo (acting as {})", manager.display_name());

    if let Some(path) = args.import_csv {
        let bytes = std::fs::read(&path)?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| "import.csv".to_string());
        let report = service.import(&manager, &file_name, &bytes)?;
        println!("\nImported {}:", file_name);
        println!("- {}", report.message());
        for skipped in &report.skipped {
            println!("  - row {}: {:?}", skipped.row_number, skipped.errors.0);
        }
    }

    let range = TimeRange::parse_or_default(args.time_range.as_deref());
    let stats = service.dashboard_stats(&scope, range, now)?;

    println!("\nDashboard");
    println!(
        "- {} leads | {} new | {} qualified | {} converted | conversion rate {:.1}%",
        stats.total_leads,
        stats.new_leads,
        stats.qualified_leads,
        stats.converted_leads,
        stats.conversion_rate
    );
    println!(
        "- this month {} leads ({} converted) | last month {} leads ({} converted)",
        stats.current_month.total_leads,
        stats.current_month.converted_leads,
        stats.previous_month.total_leads,
        stats.previous_month.converted_leads
    );
    println!("Status mix:");
    for entry in &stats.status_distribution {
        println!("  - {}: {}", entry.status_label, entry.count);
    }
    println!("Source mix:");
    for entry in &stats.source_distribution {
        println!("  - {}: {}", entry.source_label, entry.count);
    }
    println!("Daily leads added ({} days):", stats.daily_leads_added.len());
    for day in &stats.daily_leads_added {
        if day.count > 0 {
            println!("  - {}: {}", day.date, day.count);
        }
    }

    let team = service.team_performance(&scope)?;
    println!("\nTeam performance");
    for entry in &team {
        println!(
            "- {}: {} deals / {} leads | revenue {} | {}% conversion",
            entry.agent, entry.deals, entry.total_leads, entry.revenue, entry.conversion_rate
        );
    }

    let revenue = service.revenue_overview(&scope)?;
    println!("\nRevenue by month (sales column is simulated at 60% of revenue)");
    for point in &revenue {
        println!(
            "- {}: revenue {} | sales {:.0}",
            point.name, point.revenue, point.sales
        );
    }

    let exported = service.export(&scope, &LeadFilter::default())?;
    println!(
        "\nExport: {} bytes of CSV across {} leads (leads_export.csv)",
        exported.len(),
        stats.total_leads
    );

    Ok(())
}
