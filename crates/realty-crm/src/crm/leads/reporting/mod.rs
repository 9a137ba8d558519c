//! Read-only aggregation over the scoped lead collection. Every operation
//! tolerates an empty collection and issues a bounded number of grouped
//! repository calls.

pub mod views;

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};

use super::repository::{LeadRepository, RepositoryError, TimeWindow};
use crate::crm::access::{ActorDirectory, DirectoryError, VisibilityScope};
use views::{
    DailyCount, DashboardStats, PeriodCounts, RevenuePoint, SourceDistributionEntry,
    StatusDistributionEntry, TeamPerformanceEntry,
};

/// Trailing window for the daily lead-creation series, ending today.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeRange {
    Week,
    Month,
    Year,
}

impl TimeRange {
    pub const fn days(self) -> i64 {
        match self {
            Self::Week => 7,
            Self::Month => 30,
            Self::Year => 365,
        }
    }

    /// Unrecognized values fall back to a week, matching the query default.
    pub fn parse_or_default(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("year") => Self::Year,
            Some("month") => Self::Month,
            _ => Self::Week,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Directory(#[from] DirectoryError),
}

fn first_of_month(year: i32, month: u32) -> DateTime<Utc> {
    let date = NaiveDate::from_ymd_opt(year, month, 1).expect("first of month is a valid date");
    Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0).expect("midnight is a valid time"))
}

fn month_boundaries(now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let current_start = first_of_month(now.year(), now.month());
    let previous_start = if now.month() == 1 {
        first_of_month(now.year() - 1, 12)
    } else {
        first_of_month(now.year(), now.month() - 1)
    };
    (current_start, previous_start)
}

fn conversion_rate_pct(converted: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let rate = converted as f64 / total as f64 * 100.0;
    (rate * 10.0).round() / 10.0
}

fn period_counts<R>(
    repo: &R,
    scope: &VisibilityScope,
    window: TimeWindow,
) -> Result<PeriodCounts, RepositoryError>
where
    R: LeadRepository + ?Sized,
{
    let counts = repo.status_counts(scope, Some(window))?;
    Ok(PeriodCounts {
        total_leads: counts.total,
        new_leads: counts.new,
        qualified_leads: counts.qualified,
        converted_leads: counts.converted,
    })
}

/// Dashboard snapshot: overall and month-over-month headline counts,
/// distributions, the zero-filled daily series, and the five most recent
/// leads in the caller's scope.
pub fn dashboard_stats<R>(
    repo: &R,
    scope: &VisibilityScope,
    range: TimeRange,
    now: DateTime<Utc>,
) -> Result<DashboardStats, ReportError>
where
    R: LeadRepository + ?Sized,
{
    let overall = repo.status_counts(scope, None)?;
    let (current_start, previous_start) = month_boundaries(now);
    let current_month = period_counts(repo, scope, TimeWindow::since(current_start))?;
    let previous_month =
        period_counts(repo, scope, TimeWindow::between(previous_start, current_start))?;

    let status_distribution = repo
        .status_distribution(scope)?
        .into_iter()
        .map(|(status, count)| StatusDistributionEntry {
            status,
            status_label: status.label(),
            count,
        })
        .collect();

    let source_distribution = repo
        .source_distribution(scope)?
        .into_iter()
        .map(|(source, count)| SourceDistributionEntry {
            source,
            source_label: source.label(),
            count,
        })
        .collect();

    let today = now.date_naive();
    let window_start = today - Duration::days(range.days() - 1);
    let counted = repo.daily_created(scope, window_start, today)?;
    let daily_leads_added = window_start
        .iter_days()
        .take_while(|date| *date <= today)
        .map(|date| DailyCount {
            date,
            count: counted.get(&date).copied().unwrap_or(0),
        })
        .collect();

    let recent_leads = repo.recent(scope, 5)?;

    Ok(DashboardStats {
        total_leads: overall.total,
        new_leads: overall.new,
        qualified_leads: overall.qualified,
        converted_leads: overall.converted,
        conversion_rate: conversion_rate_pct(overall.converted, overall.total),
        current_month,
        previous_month,
        status_distribution,
        source_distribution,
        daily_leads_added,
        recent_leads,
    })
}

/// One entry per directory agent, zero-filled for agents without leads,
/// ordered by revenue descending.
pub fn team_performance<R, D>(
    repo: &R,
    directory: &D,
    scope: &VisibilityScope,
) -> Result<Vec<TeamPerformanceEntry>, ReportError>
where
    R: LeadRepository + ?Sized,
    D: ActorDirectory + ?Sized,
{
    let aggregates = repo.assignee_aggregates(scope)?;
    let mut entries: Vec<TeamPerformanceEntry> = directory
        .agents()?
        .into_iter()
        .map(|agent| {
            let aggregate = aggregates.get(&agent.id).copied().unwrap_or_default();
            let conversion_rate = if aggregate.total_leads == 0 {
                0
            } else {
                (aggregate.deals as f64 / aggregate.total_leads as f64 * 100.0).round() as u8
            };
            TeamPerformanceEntry {
                agent: agent.display_name(),
                deals: aggregate.deals,
                total_leads: aggregate.total_leads,
                revenue: aggregate.revenue,
                conversion_rate,
                avatar: agent.avatar_url,
            }
        })
        .collect();

    entries.sort_by(|a, b| {
        b.revenue
            .cmp(&a.revenue)
            .then_with(|| a.agent.cmp(&b.agent))
    });
    Ok(entries)
}

/// Converted revenue grouped by calendar month of last update, ascending.
/// The `sales` figure is simulated as 60% of revenue.
pub fn revenue_overview<R>(
    repo: &R,
    scope: &VisibilityScope,
) -> Result<Vec<RevenuePoint>, ReportError>
where
    R: LeadRepository + ?Sized,
{
    let months = repo.monthly_converted_revenue(scope)?;
    Ok(months
        .into_iter()
        .map(|bucket| {
            let label = NaiveDate::from_ymd_opt(bucket.year, bucket.month, 1)
                .expect("bucketed month is a valid date")
                .format("%b")
                .to_string();
            RevenuePoint {
                name: label,
                revenue: bucket.revenue,
                sales: bucket.revenue as f64 * 0.6,
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::super::domain::{
        Lead, LeadId, LeadPriority, LeadSource, LeadStatus, PropertyLink,
    };
    use super::super::memory::InMemoryLeadRepository;
    use super::*;
    use crate::crm::access::{Actor, ActorId, ActorRole, InMemoryActorDirectory};

    fn agent(id: u64, first: &str, last: &str) -> Actor {
        Actor {
            id: ActorId(id),
            username: format!("{}{}", first.to_lowercase(), id),
            first_name: first.to_string(),
            last_name: last.to_string(),
            email: format!("{}@example.com", first.to_lowercase()),
            role: ActorRole::Agent,
            avatar_url: None,
        }
    }

    fn lead(id: u64, status: LeadStatus, assigned: Option<u64>, created: &str) -> Lead {
        let created_at = format!("{created}T12:00:00Z")
            .parse::<DateTime<Utc>>()
            .expect("valid timestamp");
        Lead {
            id: LeadId(id),
            name: format!("Lead {id}"),
            email: format!("lead{id}@example.com"),
            phone: format!("555-01{id:02}"),
            status,
            source: LeadSource::Website,
            priority: LeadPriority::Medium,
            interest: String::new(),
            company: String::new(),
            position: String::new(),
            budget: String::new(),
            timeline: String::new(),
            requirements: String::new(),
            notes: String::new(),
            tags: Vec::new(),
            property: None,
            assigned_to: assigned.map(ActorId),
            created_by: ActorId(1),
            created_at,
            updated_at: created_at,
        }
    }

    fn with_price(mut lead: Lead, price: u64) -> Lead {
        lead.property = Some(PropertyLink {
            id: lead.id.0,
            title: format!("Unit {}", lead.id.0),
            price: Some(price),
        });
        lead
    }

    fn now() -> DateTime<Utc> {
        "2025-06-15T10:30:00Z".parse().expect("valid timestamp")
    }

    #[test]
    fn empty_scope_yields_zeroed_dashboard() {
        let repo = InMemoryLeadRepository::new();
        let stats = dashboard_stats(&repo, &VisibilityScope::All, TimeRange::Week, now())
            .expect("dashboard builds");

        assert_eq!(stats.total_leads, 0);
        assert_eq!(stats.conversion_rate, 0.0);
        assert!(stats.status_distribution.is_empty());
        assert!(stats.source_distribution.is_empty());
        assert!(stats.recent_leads.is_empty());
        assert_eq!(stats.daily_leads_added.len(), 7);
        assert!(stats.daily_leads_added.iter().all(|day| day.count == 0));
    }

    #[test]
    fn week_series_is_zero_filled_and_ascending() {
        let repo = InMemoryLeadRepository::new();
        repo.seed(lead(1, LeadStatus::New, None, "2025-06-15"));
        repo.seed(lead(2, LeadStatus::New, None, "2025-06-13"));
        repo.seed(lead(3, LeadStatus::New, None, "2025-06-13"));
        // Outside the trailing week, must not appear.
        repo.seed(lead(4, LeadStatus::New, None, "2025-06-01"));

        let stats = dashboard_stats(&repo, &VisibilityScope::All, TimeRange::Week, now())
            .expect("dashboard builds");
        let series = &stats.daily_leads_added;

        assert_eq!(series.len(), 7);
        assert_eq!(
            series.first().map(|day| day.date),
            "2025-06-09".parse().ok()
        );
        assert_eq!(series.last().map(|day| day.date), "2025-06-15".parse().ok());
        assert!(series.windows(2).all(|pair| pair[0].date < pair[1].date));
        let counts: Vec<u64> = series.iter().map(|day| day.count).collect();
        assert_eq!(counts, vec![0, 0, 0, 0, 2, 0, 1]);
    }

    #[test]
    fn month_over_month_counts_use_first_of_month_boundaries() {
        let repo = InMemoryLeadRepository::new();
        repo.seed(lead(1, LeadStatus::New, None, "2025-06-01"));
        repo.seed(lead(2, LeadStatus::Converted, None, "2025-06-14"));
        repo.seed(lead(3, LeadStatus::Qualified, None, "2025-05-31"));
        repo.seed(lead(4, LeadStatus::New, None, "2025-05-01"));
        repo.seed(lead(5, LeadStatus::New, None, "2025-04-30"));

        let stats = dashboard_stats(&repo, &VisibilityScope::All, TimeRange::Week, now())
            .expect("dashboard builds");

        assert_eq!(stats.current_month.total_leads, 2);
        assert_eq!(stats.current_month.converted_leads, 1);
        assert_eq!(stats.previous_month.total_leads, 2);
        assert_eq!(stats.previous_month.qualified_leads, 1);
        assert_eq!(stats.total_leads, 5);
    }

    #[test]
    fn conversion_rate_is_rounded_to_one_decimal() {
        let repo = InMemoryLeadRepository::new();
        repo.seed(lead(1, LeadStatus::Converted, None, "2025-06-10"));
        repo.seed(lead(2, LeadStatus::New, None, "2025-06-10"));
        repo.seed(lead(3, LeadStatus::New, None, "2025-06-10"));

        let stats = dashboard_stats(&repo, &VisibilityScope::All, TimeRange::Week, now())
            .expect("dashboard builds");
        assert_eq!(stats.conversion_rate, 33.3);
    }

    #[test]
    fn agent_scope_restricts_every_aggregate() {
        let repo = InMemoryLeadRepository::new();
        repo.seed(lead(1, LeadStatus::Converted, Some(7), "2025-06-10"));
        repo.seed(lead(2, LeadStatus::New, Some(7), "2025-06-11"));
        repo.seed(lead(3, LeadStatus::Converted, Some(8), "2025-06-12"));
        repo.seed(lead(4, LeadStatus::New, None, "2025-06-12"));

        let scope = VisibilityScope::Assigned(ActorId(7));
        let stats = dashboard_stats(&repo, &scope, TimeRange::Week, now())
            .expect("dashboard builds");

        assert_eq!(stats.total_leads, 2);
        assert_eq!(stats.converted_leads, 1);
        assert_eq!(stats.conversion_rate, 50.0);
        assert!(stats
            .recent_leads
            .iter()
            .all(|lead| lead.assigned_to == Some(ActorId(7))));
    }

    #[test]
    fn team_performance_orders_by_revenue_and_zero_fills() {
        let repo = InMemoryLeadRepository::new();
        repo.seed(with_price(
            lead(1, LeadStatus::Converted, Some(7), "2025-06-01"),
            250_000,
        ));
        repo.seed(lead(2, LeadStatus::New, Some(7), "2025-06-02"));
        repo.seed(with_price(
            lead(3, LeadStatus::Converted, Some(8), "2025-06-03"),
            400_000,
        ));

        let directory = InMemoryActorDirectory::new(vec![
            agent(7, "Amira", "Hassan"),
            agent(8, "Ben", "Okafor"),
            agent(9, "Cleo", "Park"),
        ]);

        let entries = team_performance(&repo, &directory, &VisibilityScope::All)
            .expect("report builds");

        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].agent, "Ben Okafor");
        assert_eq!(entries[0].revenue, 400_000);
        assert_eq!(entries[0].conversion_rate, 100);
        assert_eq!(entries[1].agent, "Amira Hassan");
        assert_eq!(entries[1].deals, 1);
        assert_eq!(entries[1].total_leads, 2);
        assert_eq!(entries[1].conversion_rate, 50);
        assert_eq!(entries[2].agent, "Cleo Park");
        assert_eq!(entries[2].total_leads, 0);
        assert_eq!(entries[2].conversion_rate, 0);
        assert_eq!(entries[2].revenue, 0);
    }

    #[test]
    fn revenue_overview_groups_by_update_month_with_simulated_sales() {
        let repo = InMemoryLeadRepository::new();
        repo.seed(with_price(
            lead(1, LeadStatus::Converted, None, "2025-03-10"),
            100_000,
        ));
        repo.seed(with_price(
            lead(2, LeadStatus::Converted, None, "2025-03-25"),
            50_000,
        ));
        repo.seed(with_price(
            lead(3, LeadStatus::Converted, None, "2025-05-02"),
            200_000,
        ));
        // Converted without a priced property contributes nothing.
        repo.seed(lead(4, LeadStatus::Converted, None, "2025-05-09"));
        // Not converted, priced: contributes nothing.
        repo.seed(with_price(lead(5, LeadStatus::New, None, "2025-05-10"), 75_000));

        let points = revenue_overview(&repo, &VisibilityScope::All).expect("report builds");

        assert_eq!(points.len(), 2);
        assert_eq!(points[0].name, "Mar");
        assert_eq!(points[0].revenue, 150_000);
        assert_eq!(points[0].sales, 90_000.0);
        assert_eq!(points[1].name, "May");
        assert_eq!(points[1].revenue, 200_000);
    }

    #[test]
    fn time_range_parsing_defaults_to_week() {
        assert_eq!(TimeRange::parse_or_default(Some("year")), TimeRange::Year);
        assert_eq!(TimeRange::parse_or_default(Some("month")), TimeRange::Month);
        assert_eq!(TimeRange::parse_or_default(Some("fortnight")), TimeRange::Week);
        assert_eq!(TimeRange::parse_or_default(None), TimeRange::Week);
    }
}
