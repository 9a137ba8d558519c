//! Lead management: the domain record and shared validation routine, the
//! repository contract with its grouped aggregates, the reporting engine,
//! and the bulk import/export pipeline.

pub mod domain;
pub mod memory;
pub mod reporting;
pub mod repository;
pub mod router;
pub mod service;
pub mod transfer;

pub use domain::{
    Lead, LeadDraft, LeadId, LeadPriority, LeadSource, LeadStatus, PropertyLink,
    ValidatedLead, ValidationErrors,
};
pub use memory::InMemoryLeadRepository;
pub use reporting::views::{
    DailyCount, DashboardStats, PeriodCounts, RevenuePoint, SourceDistributionEntry,
    StatusDistributionEntry, TeamPerformanceEntry,
};
pub use reporting::{ReportError, TimeRange};
pub use repository::{
    AssigneeAggregate, LeadFilter, LeadOrderKey, LeadOrdering, LeadRepository,
    MonthlyRevenue, NewLead, RepositoryError, StatusCounts, TimeWindow,
};
pub use router::lead_router;
pub use service::{LeadService, LeadServiceError};
pub use transfer::{
    export_csv, import_leads, ExportError, FileKind, ImportError, ImportReport, SkippedRow,
    EXPORT_FILE_NAME,
};
