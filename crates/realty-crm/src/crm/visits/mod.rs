//! Site-visit scheduling: showing appointments for properties with a
//! status lifecycle from scheduled through completion.

pub mod domain;
pub mod memory;
pub mod repository;
pub mod router;
pub mod service;

pub use domain::{SiteVisit, ValidatedVisit, VisitId, VisitRequest, VisitStatus};
pub use memory::InMemorySiteVisitRepository;
pub use repository::{RepositoryError, SiteVisitRepository};
pub use router::visit_router;
pub use service::{VisitService, VisitServiceError};
