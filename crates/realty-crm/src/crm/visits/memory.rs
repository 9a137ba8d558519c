use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::Utc;

use super::domain::{SiteVisit, ValidatedVisit, VisitId, VisitStatus};
use super::repository::{RepositoryError, SiteVisitRepository};

/// In-memory visit store used by the bundled server and the test suites.
#[derive(Default, Clone)]
pub struct InMemorySiteVisitRepository {
    visits: Arc<Mutex<HashMap<VisitId, SiteVisit>>>,
    sequence: Arc<AtomicU64>,
}

impl InMemorySiteVisitRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SiteVisitRepository for InMemorySiteVisitRepository {
    fn insert(&self, visit: ValidatedVisit) -> Result<SiteVisit, RepositoryError> {
        let id = VisitId(self.sequence.fetch_add(1, Ordering::Relaxed) + 1);
        let now = Utc::now();
        let record = SiteVisit {
            id,
            property_id: visit.property_id,
            property_title: visit.property_title,
            agent: visit.agent,
            client: visit.client,
            client_name: visit.client_name,
            client_phone: visit.client_phone,
            date: visit.date,
            time: visit.time,
            status: VisitStatus::Scheduled,
            feedback: None,
            created_at: now,
            updated_at: now,
        };

        let mut guard = self.visits.lock().expect("visit mutex poisoned");
        guard.insert(record.id, record.clone());
        Ok(record)
    }

    fn fetch(&self, id: VisitId) -> Result<Option<SiteVisit>, RepositoryError> {
        let guard = self.visits.lock().expect("visit mutex poisoned");
        Ok(guard.get(&id).cloned())
    }

    fn update(&self, visit: SiteVisit) -> Result<(), RepositoryError> {
        let mut guard = self.visits.lock().expect("visit mutex poisoned");
        if guard.contains_key(&visit.id) {
            guard.insert(visit.id, visit);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn list(&self) -> Result<Vec<SiteVisit>, RepositoryError> {
        let guard = self.visits.lock().expect("visit mutex poisoned");
        let mut visits: Vec<SiteVisit> = guard.values().cloned().collect();
        visits.sort_by(|a, b| {
            b.date
                .cmp(&a.date)
                .then_with(|| b.time.cmp(&a.time))
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(visits)
    }
}
