use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::domain::{Lead, LeadDraft, ValidationErrors};
use super::reporting::views::{DashboardStats, RevenuePoint, TeamPerformanceEntry};
use super::reporting::{self, ReportError, TimeRange};
use super::repository::{LeadFilter, LeadRepository, NewLead, RepositoryError};
use super::transfer::{self, ExportError, ImportError, ImportReport};
use crate::crm::access::{Actor, ActorDirectory, DirectoryError, VisibilityScope};

/// Service composing the repository, directory, reporting engine, and bulk
/// transfer pipeline behind one seam for the HTTP layer. The visibility
/// scope is computed once per request by the caller and passed in.
pub struct LeadService<R, D> {
    repository: Arc<R>,
    directory: Arc<D>,
}

impl<R, D> LeadService<R, D>
where
    R: LeadRepository + 'static,
    D: ActorDirectory + 'static,
{
    pub fn new(repository: Arc<R>, directory: Arc<D>) -> Self {
        Self {
            repository,
            directory,
        }
    }

    pub fn directory(&self) -> &D {
        self.directory.as_ref()
    }

    /// Creates a lead through the same validation routine the importer uses.
    /// New leads default to the creating actor as both assignee and author.
    pub fn create(&self, actor: &Actor, draft: LeadDraft) -> Result<Lead, LeadServiceError> {
        let lead = draft.validate().map_err(LeadServiceError::Validation)?;
        let created = self.repository.insert(NewLead {
            lead,
            assigned_to: Some(actor.id),
            created_by: actor.id,
        })?;
        Ok(created)
    }

    pub fn list(
        &self,
        scope: &VisibilityScope,
        filter: &LeadFilter,
    ) -> Result<Vec<Lead>, LeadServiceError> {
        Ok(self.repository.search(scope, filter)?)
    }

    pub fn dashboard_stats(
        &self,
        scope: &VisibilityScope,
        range: TimeRange,
        now: DateTime<Utc>,
    ) -> Result<DashboardStats, LeadServiceError> {
        Ok(reporting::dashboard_stats(
            self.repository.as_ref(),
            scope,
            range,
            now,
        )?)
    }

    pub fn team_performance(
        &self,
        scope: &VisibilityScope,
    ) -> Result<Vec<TeamPerformanceEntry>, LeadServiceError> {
        Ok(reporting::team_performance(
            self.repository.as_ref(),
            self.directory.as_ref(),
            scope,
        )?)
    }

    pub fn revenue_overview(
        &self,
        scope: &VisibilityScope,
    ) -> Result<Vec<RevenuePoint>, LeadServiceError> {
        Ok(reporting::revenue_overview(self.repository.as_ref(), scope)?)
    }

    pub fn import(
        &self,
        actor: &Actor,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<ImportReport, ImportError> {
        transfer::import_leads(self.repository.as_ref(), actor, file_name, bytes)
    }

    pub fn export(
        &self,
        scope: &VisibilityScope,
        filter: &LeadFilter,
    ) -> Result<Vec<u8>, LeadServiceError> {
        let leads = self.repository.search(scope, filter)?;
        Ok(transfer::export_csv(&leads, self.directory.as_ref())?)
    }
}

/// Error raised by the lead service.
#[derive(Debug, thiserror::Error)]
pub enum LeadServiceError {
    #[error("validation failed")]
    Validation(ValidationErrors),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Directory(#[from] DirectoryError),
    #[error(transparent)]
    Report(#[from] ReportError),
    #[error(transparent)]
    Export(#[from] ExportError),
}
