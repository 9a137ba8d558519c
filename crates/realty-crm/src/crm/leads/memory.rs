use std::cmp::Ordering as CmpOrdering;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{Datelike, NaiveDate, Utc};

use super::domain::{Lead, LeadId, LeadSource, LeadStatus};
use super::repository::{
    AssigneeAggregate, LeadFilter, LeadOrderKey, LeadRepository, MonthlyRevenue, NewLead,
    RepositoryError, StatusCounts, TimeWindow,
};
use crate::crm::access::{ActorId, VisibilityScope};

/// In-memory lead store used by the bundled server and the test suites. A
/// SQL-backed implementation would satisfy each aggregate method with one
/// grouped query; this one filters clones under a mutex.
#[derive(Default, Clone)]
pub struct InMemoryLeadRepository {
    leads: Arc<Mutex<HashMap<LeadId, Lead>>>,
    sequence: Arc<AtomicU64>,
}

impl InMemoryLeadRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a fully-formed lead as-is, keeping the id sequence ahead of
    /// seeded ids. Used for demo fixtures and tests that pin timestamps.
    pub fn seed(&self, lead: Lead) {
        let mut guard = self.leads.lock().expect("repository mutex poisoned");
        self.sequence.fetch_max(lead.id.0, Ordering::Relaxed);
        guard.insert(lead.id, lead);
    }

    fn scoped(&self, scope: &VisibilityScope) -> Vec<Lead> {
        let guard = self.leads.lock().expect("repository mutex poisoned");
        guard
            .values()
            .filter(|lead| scope.permits(lead.assigned_to))
            .cloned()
            .collect()
    }
}

fn compare(a: &Lead, b: &Lead, key: LeadOrderKey) -> CmpOrdering {
    match key {
        LeadOrderKey::CreatedAt => a.created_at.cmp(&b.created_at),
        LeadOrderKey::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        LeadOrderKey::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        LeadOrderKey::Status => a.status.cmp(&b.status),
        LeadOrderKey::Priority => a.priority.cmp(&b.priority),
    }
}

impl LeadRepository for InMemoryLeadRepository {
    fn insert(&self, lead: NewLead) -> Result<Lead, RepositoryError> {
        let id = LeadId(self.sequence.fetch_add(1, Ordering::Relaxed) + 1);
        let now = Utc::now();
        let NewLead {
            lead: candidate,
            assigned_to,
            created_by,
        } = lead;

        let record = Lead {
            id,
            name: candidate.name,
            email: candidate.email,
            phone: candidate.phone,
            status: candidate.status,
            source: candidate.source,
            priority: candidate.priority,
            interest: candidate.interest,
            company: candidate.company,
            position: candidate.position,
            budget: candidate.budget,
            timeline: candidate.timeline,
            requirements: candidate.requirements,
            notes: candidate.notes,
            tags: candidate.tags,
            property: candidate.property,
            assigned_to,
            created_by,
            created_at: now,
            updated_at: now,
        };

        let mut guard = self.leads.lock().expect("repository mutex poisoned");
        guard.insert(record.id, record.clone());
        Ok(record)
    }

    fn update(&self, lead: Lead) -> Result<(), RepositoryError> {
        let mut guard = self.leads.lock().expect("repository mutex poisoned");
        if guard.contains_key(&lead.id) {
            guard.insert(lead.id, lead);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn fetch(&self, id: LeadId) -> Result<Option<Lead>, RepositoryError> {
        let guard = self.leads.lock().expect("repository mutex poisoned");
        Ok(guard.get(&id).cloned())
    }

    fn search(
        &self,
        scope: &VisibilityScope,
        filter: &LeadFilter,
    ) -> Result<Vec<Lead>, RepositoryError> {
        let mut leads: Vec<Lead> = self
            .scoped(scope)
            .into_iter()
            .filter(|lead| filter.matches(lead))
            .collect();

        let ordering = filter.ordering;
        leads.sort_by(|a, b| {
            let primary = compare(a, b, ordering.key);
            let primary = if ordering.descending {
                primary.reverse()
            } else {
                primary
            };
            primary.then_with(|| a.id.cmp(&b.id))
        });

        Ok(leads)
    }

    fn status_counts(
        &self,
        scope: &VisibilityScope,
        window: Option<TimeWindow>,
    ) -> Result<StatusCounts, RepositoryError> {
        let mut counts = StatusCounts::default();
        for lead in self.scoped(scope) {
            if window.is_some_and(|window| !window.contains(lead.created_at)) {
                continue;
            }
            counts.total += 1;
            match lead.status {
                LeadStatus::New => counts.new += 1,
                LeadStatus::Qualified => counts.qualified += 1,
                LeadStatus::Converted => counts.converted += 1,
                _ => {}
            }
        }
        Ok(counts)
    }

    fn status_distribution(
        &self,
        scope: &VisibilityScope,
    ) -> Result<Vec<(LeadStatus, u64)>, RepositoryError> {
        let mut buckets: BTreeMap<LeadStatus, u64> = BTreeMap::new();
        for lead in self.scoped(scope) {
            *buckets.entry(lead.status).or_default() += 1;
        }
        Ok(LeadStatus::ordered()
            .into_iter()
            .filter_map(|status| buckets.get(&status).map(|count| (status, *count)))
            .collect())
    }

    fn source_distribution(
        &self,
        scope: &VisibilityScope,
    ) -> Result<Vec<(LeadSource, u64)>, RepositoryError> {
        let mut buckets: BTreeMap<LeadSource, u64> = BTreeMap::new();
        for lead in self.scoped(scope) {
            *buckets.entry(lead.source).or_default() += 1;
        }
        Ok(LeadSource::ordered()
            .into_iter()
            .filter_map(|source| buckets.get(&source).map(|count| (source, *count)))
            .collect())
    }

    fn daily_created(
        &self,
        scope: &VisibilityScope,
        from: NaiveDate,
        until: NaiveDate,
    ) -> Result<BTreeMap<NaiveDate, u64>, RepositoryError> {
        let mut buckets: BTreeMap<NaiveDate, u64> = BTreeMap::new();
        for lead in self.scoped(scope) {
            let date = lead.created_at.date_naive();
            if date >= from && date <= until {
                *buckets.entry(date).or_default() += 1;
            }
        }
        Ok(buckets)
    }

    fn recent(
        &self,
        scope: &VisibilityScope,
        limit: usize,
    ) -> Result<Vec<Lead>, RepositoryError> {
        let mut leads = self.scoped(scope);
        leads.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        leads.truncate(limit);
        Ok(leads)
    }

    fn assignee_aggregates(
        &self,
        scope: &VisibilityScope,
    ) -> Result<BTreeMap<ActorId, AssigneeAggregate>, RepositoryError> {
        let mut aggregates: BTreeMap<ActorId, AssigneeAggregate> = BTreeMap::new();
        for lead in self.scoped(scope) {
            let Some(assignee) = lead.assigned_to else {
                continue;
            };
            let entry = aggregates.entry(assignee).or_default();
            entry.total_leads += 1;
            if lead.status == LeadStatus::Converted {
                entry.deals += 1;
                if let Some(price) = lead.property.as_ref().and_then(|link| link.price) {
                    entry.revenue += price;
                }
            }
        }
        Ok(aggregates)
    }

    fn monthly_converted_revenue(
        &self,
        scope: &VisibilityScope,
    ) -> Result<Vec<MonthlyRevenue>, RepositoryError> {
        let mut buckets: BTreeMap<(i32, u32), u64> = BTreeMap::new();
        for lead in self.scoped(scope) {
            if lead.status != LeadStatus::Converted {
                continue;
            }
            let Some(price) = lead.property.as_ref().and_then(|link| link.price) else {
                continue;
            };
            let key = (lead.updated_at.year(), lead.updated_at.month());
            *buckets.entry(key).or_default() += price;
        }
        Ok(buckets
            .into_iter()
            .map(|((year, month), revenue)| MonthlyRevenue {
                year,
                month,
                revenue,
            })
            .collect())
    }
}
