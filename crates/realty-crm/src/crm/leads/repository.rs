use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};

use super::domain::{Lead, LeadId, LeadPriority, LeadSource, LeadStatus, ValidatedLead};
use crate::crm::access::{ActorId, VisibilityScope};

/// A validated candidate plus the attribution the persistence layer needs.
#[derive(Debug, Clone)]
pub struct NewLead {
    pub lead: ValidatedLead,
    pub assigned_to: Option<ActorId>,
    pub created_by: ActorId,
}

/// Half-open creation-time window: `from <= created_at < until`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub from: DateTime<Utc>,
    pub until: Option<DateTime<Utc>>,
}

impl TimeWindow {
    pub fn since(from: DateTime<Utc>) -> Self {
        Self { from, until: None }
    }

    pub fn between(from: DateTime<Utc>, until: DateTime<Utc>) -> Self {
        Self {
            from,
            until: Some(until),
        }
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.from && self.until.map_or(true, |until| instant < until)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeadOrderKey {
    CreatedAt,
    UpdatedAt,
    Name,
    Status,
    Priority,
}

/// Ordering in the query-string convention: a leading `-` means
/// descending. The collection default is newest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeadOrdering {
    pub key: LeadOrderKey,
    pub descending: bool,
}

impl Default for LeadOrdering {
    fn default() -> Self {
        Self {
            key: LeadOrderKey::CreatedAt,
            descending: true,
        }
    }
}

impl LeadOrdering {
    pub fn parse(raw: &str) -> Option<Self> {
        let (descending, field) = match raw.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, raw),
        };
        let key = match field.trim() {
            "created_at" => LeadOrderKey::CreatedAt,
            "updated_at" => LeadOrderKey::UpdatedAt,
            "name" => LeadOrderKey::Name,
            "status" => LeadOrderKey::Status,
            "priority" => LeadOrderKey::Priority,
            _ => return None,
        };
        Some(Self { key, descending })
    }
}

/// Filter predicates for retrieval and export. `search` matches name, email,
/// phone, company, and interest case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct LeadFilter {
    pub status: Option<LeadStatus>,
    pub source: Option<LeadSource>,
    pub priority: Option<LeadPriority>,
    pub assigned_to: Option<ActorId>,
    pub created_by: Option<ActorId>,
    pub search: Option<String>,
    pub ordering: LeadOrdering,
}

impl LeadFilter {
    pub fn matches(&self, lead: &Lead) -> bool {
        if self.status.is_some_and(|status| lead.status != status) {
            return false;
        }
        if self.source.is_some_and(|source| lead.source != source) {
            return false;
        }
        if self.priority.is_some_and(|priority| lead.priority != priority) {
            return false;
        }
        if self
            .assigned_to
            .is_some_and(|actor| lead.assigned_to != Some(actor))
        {
            return false;
        }
        if self.created_by.is_some_and(|actor| lead.created_by != actor) {
            return false;
        }
        if let Some(needle) = self.search.as_deref() {
            let needle = needle.to_lowercase();
            let haystacks = [
                &lead.name,
                &lead.email,
                &lead.phone,
                &lead.company,
                &lead.interest,
            ];
            if !haystacks
                .iter()
                .any(|field| field.to_lowercase().contains(&needle))
            {
                return false;
            }
        }
        true
    }
}

/// Overall / per-window headline counts for the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub total: u64,
    pub new: u64,
    pub qualified: u64,
    pub converted: u64,
}

/// Per-assignee rollup feeding the team performance report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssigneeAggregate {
    pub deals: u64,
    pub total_leads: u64,
    pub revenue: u64,
}

/// Converted-lead revenue bucketed by the calendar month of `updated_at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthlyRevenue {
    pub year: i32,
    pub month: u32,
    pub revenue: u64,
}

/// Storage abstraction over the lead collection. Every method maps to a
/// single (possibly grouped) query in a SQL-backed implementation so the
/// reporting engine never loads the full collection for an aggregate.
pub trait LeadRepository: Send + Sync {
    fn insert(&self, lead: NewLead) -> Result<Lead, RepositoryError>;
    fn update(&self, lead: Lead) -> Result<(), RepositoryError>;
    fn fetch(&self, id: LeadId) -> Result<Option<Lead>, RepositoryError>;
    fn search(
        &self,
        scope: &VisibilityScope,
        filter: &LeadFilter,
    ) -> Result<Vec<Lead>, RepositoryError>;
    fn status_counts(
        &self,
        scope: &VisibilityScope,
        window: Option<TimeWindow>,
    ) -> Result<StatusCounts, RepositoryError>;
    fn status_distribution(
        &self,
        scope: &VisibilityScope,
    ) -> Result<Vec<(LeadStatus, u64)>, RepositoryError>;
    fn source_distribution(
        &self,
        scope: &VisibilityScope,
    ) -> Result<Vec<(LeadSource, u64)>, RepositoryError>;
    fn daily_created(
        &self,
        scope: &VisibilityScope,
        from: NaiveDate,
        until: NaiveDate,
    ) -> Result<BTreeMap<NaiveDate, u64>, RepositoryError>;
    fn recent(
        &self,
        scope: &VisibilityScope,
        limit: usize,
    ) -> Result<Vec<Lead>, RepositoryError>;
    fn assignee_aggregates(
        &self,
        scope: &VisibilityScope,
    ) -> Result<BTreeMap<ActorId, AssigneeAggregate>, RepositoryError>;
    fn monthly_converted_revenue(
        &self,
        scope: &VisibilityScope,
    ) -> Result<Vec<MonthlyRevenue>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
