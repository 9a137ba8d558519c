//! Bulk movement between the lead collection and flat tabular files. Import
//! isolates faults per row; only file-level problems abort a batch.

pub mod export;
pub mod import;
pub(crate) mod tabular;

pub use export::{export_csv, ExportError, EXPORT_FILE_NAME};
pub use import::{import_leads, ImportReport, SkippedRow};
pub use tabular::FileKind;

use super::repository::RepositoryError;

/// File-level import failures. Everything here aborts before any row is
/// processed, except `Repository`, which surfaces a mid-batch persistence
/// fault without un-creating earlier rows.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("No file provided")]
    MissingFile,
    #[error("Unsupported file format. Please use CSV, XLSX, or XLS.")]
    UnsupportedFormat,
    #[error("The uploaded file is empty or not a valid spreadsheet.")]
    Empty,
    #[error("Missing essential columns in the file. Required columns include at least: name, email, phone.")]
    MissingColumns,
    #[error("invalid CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("unreadable spreadsheet: {0}")]
    Spreadsheet(#[from] calamine::Error),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl ImportError {
    /// True for faults of the file itself, reported as client errors.
    pub fn is_client_fault(&self) -> bool {
        !matches!(self, Self::Repository(_))
    }
}
