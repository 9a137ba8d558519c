use super::super::domain::{Lead, LeadSource, LeadStatus};
use chrono::NaiveDate;
use serde::Serialize;

/// Headline counts for one calendar period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PeriodCounts {
    pub total_leads: u64,
    pub new_leads: u64,
    pub qualified_leads: u64,
    pub converted_leads: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusDistributionEntry {
    pub status: LeadStatus,
    pub status_label: &'static str,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SourceDistributionEntry {
    pub source: LeadSource,
    pub source_label: &'static str,
    pub count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: u64,
}

/// Point-in-time dashboard snapshot, recomputed per request.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    pub total_leads: u64,
    pub new_leads: u64,
    pub qualified_leads: u64,
    pub converted_leads: u64,
    pub conversion_rate: f64,
    pub current_month: PeriodCounts,
    pub previous_month: PeriodCounts,
    pub status_distribution: Vec<StatusDistributionEntry>,
    pub source_distribution: Vec<SourceDistributionEntry>,
    pub daily_leads_added: Vec<DailyCount>,
    pub recent_leads: Vec<Lead>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TeamPerformanceEntry {
    pub agent: String,
    pub deals: u64,
    pub total_leads: u64,
    pub revenue: u64,
    pub conversion_rate: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// One month of converted revenue. `sales` is a simulated figure (60% of
/// revenue), kept for dashboard parity; it is not a real sales count.
#[derive(Debug, Clone, Serialize)]
pub struct RevenuePoint {
    pub name: String,
    pub revenue: u64,
    pub sales: f64,
}
