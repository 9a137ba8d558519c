use std::sync::Arc;

use chrono::Utc;

use super::domain::{SiteVisit, VisitId, VisitRequest, VisitStatus};
use super::repository::{RepositoryError, SiteVisitRepository};
use crate::crm::leads::domain::ValidationErrors;

/// Service wrapping visit scheduling and the status lifecycle.
pub struct VisitService<R> {
    repository: Arc<R>,
}

impl<R> VisitService<R>
where
    R: SiteVisitRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    pub fn schedule(&self, request: VisitRequest) -> Result<SiteVisit, VisitServiceError> {
        let visit = request.validate().map_err(VisitServiceError::Validation)?;
        Ok(self.repository.insert(visit)?)
    }

    pub fn list(&self) -> Result<Vec<SiteVisit>, VisitServiceError> {
        Ok(self.repository.list()?)
    }

    /// Moves a visit along its lifecycle, optionally attaching feedback.
    /// Terminal visits reject every further transition.
    pub fn update_status(
        &self,
        id: VisitId,
        next: VisitStatus,
        feedback: Option<String>,
    ) -> Result<SiteVisit, VisitServiceError> {
        let mut visit = self
            .repository
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;

        if !visit.status.can_transition_to(next) {
            return Err(VisitServiceError::InvalidTransition {
                from: visit.status,
                to: next,
            });
        }

        visit.status = next;
        if let Some(feedback) = feedback.filter(|text| !text.trim().is_empty()) {
            visit.feedback = Some(feedback.trim().to_string());
        }
        visit.updated_at = Utc::now();

        self.repository.update(visit.clone())?;
        Ok(visit)
    }
}

/// Error raised by the visit service.
#[derive(Debug, thiserror::Error)]
pub enum VisitServiceError {
    #[error("validation failed")]
    Validation(ValidationErrors),
    #[error("cannot move a {} visit to {}", from.label(), to.label())]
    InvalidTransition { from: VisitStatus, to: VisitStatus },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crm::visits::memory::InMemorySiteVisitRepository;

    fn service() -> VisitService<InMemorySiteVisitRepository> {
        VisitService::new(Arc::new(InMemorySiteVisitRepository::new()))
    }

    fn request(title: &str, date: &str, time: &str) -> VisitRequest {
        VisitRequest {
            property_id: 11,
            property_title: title.to_string(),
            client_name: Some("Walk-in couple".to_string()),
            date: date.parse().ok(),
            time: time.to_string(),
            ..VisitRequest::default()
        }
    }

    #[test]
    fn schedules_and_lists_newest_first() {
        let service = service();
        service
            .schedule(request("Marina Heights 4B", "2025-07-01", "09:00"))
            .expect("first visit schedules");
        service
            .schedule(request("Marina Heights 4B", "2025-07-02", "10:30"))
            .expect("second visit schedules");
        service
            .schedule(request("Marina Heights 4B", "2025-07-02", "15:00"))
            .expect("third visit schedules");

        let visits = service.list().expect("listing succeeds");
        assert_eq!(visits.len(), 3);
        assert_eq!(visits[0].time, "15:00");
        assert_eq!(visits[1].time, "10:30");
        assert_eq!(visits[2].time, "09:00");
        assert!(visits.iter().all(|visit| visit.status == VisitStatus::Scheduled));
    }

    #[test]
    fn lifecycle_allows_confirm_then_complete_with_feedback() {
        let service = service();
        let visit = service
            .schedule(request("Marina Heights 4B", "2025-07-01", "09:00"))
            .expect("visit schedules");

        let visit = service
            .update_status(visit.id, VisitStatus::Confirmed, None)
            .expect("confirm succeeds");
        assert_eq!(visit.status, VisitStatus::Confirmed);

        let visit = service
            .update_status(
                visit.id,
                VisitStatus::Completed,
                Some("Liked the layout, asked about parking.".to_string()),
            )
            .expect("complete succeeds");
        assert_eq!(visit.status, VisitStatus::Completed);
        assert_eq!(
            visit.feedback.as_deref(),
            Some("Liked the layout, asked about parking.")
        );
    }

    #[test]
    fn terminal_visits_reject_further_transitions() {
        let service = service();
        let visit = service
            .schedule(request("Marina Heights 4B", "2025-07-01", "09:00"))
            .expect("visit schedules");
        service
            .update_status(visit.id, VisitStatus::Cancelled, None)
            .expect("cancel succeeds");

        let error = service
            .update_status(visit.id, VisitStatus::Confirmed, None)
            .expect_err("terminal visit refuses");
        assert!(matches!(
            error,
            VisitServiceError::InvalidTransition {
                from: VisitStatus::Cancelled,
                to: VisitStatus::Confirmed,
            }
        ));
    }

    #[test]
    fn unknown_visits_report_not_found() {
        let error = service()
            .update_status(VisitId(99), VisitStatus::Confirmed, None)
            .expect_err("missing visit");
        assert!(matches!(
            error,
            VisitServiceError::Repository(RepositoryError::NotFound)
        ));
    }
}
