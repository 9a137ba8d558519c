use super::domain::{SiteVisit, ValidatedVisit, VisitId};

/// Storage abstraction for scheduled visits.
pub trait SiteVisitRepository: Send + Sync {
    fn insert(&self, visit: ValidatedVisit) -> Result<SiteVisit, RepositoryError>;
    fn fetch(&self, id: VisitId) -> Result<Option<SiteVisit>, RepositoryError>;
    fn update(&self, visit: SiteVisit) -> Result<(), RepositoryError>;
    /// Ordered by date descending, then time descending.
    fn list(&self) -> Result<Vec<SiteVisit>, RepositoryError>;
}

/// Error enumeration for visit repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
