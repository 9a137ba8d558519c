use serde::Serialize;

use super::tabular::{self, FileKind, TabularFile};
use super::ImportError;
use crate::crm::access::Actor;
use crate::crm::leads::domain::{split_tags, LeadDraft, ValidationErrors};
use crate::crm::leads::repository::{LeadRepository, NewLead};

const REQUIRED_COLUMNS: [&str; 3] = ["name", "email", "phone"];

/// One rejected data row. Row numbers are 1-based and account for the
/// header occupying row 1, so the first data row reports as 2.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedRow {
    pub row_number: usize,
    pub errors: ValidationErrors,
}

/// Outcome of a whole import batch.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportReport {
    pub created_count: usize,
    pub skipped: Vec<SkippedRow>,
}

impl ImportReport {
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    pub fn all_rows_failed(&self) -> bool {
        self.created_count == 0 && !self.skipped.is_empty()
    }

    pub fn message(&self) -> String {
        let mut message = format!("{} leads imported successfully.", self.created_count);
        if !self.skipped.is_empty() {
            message.push_str(&format!(" {} rows were skipped.", self.skipped.len()));
        }
        message
    }
}

/// Runs the row pipeline over an uploaded file. File-level faults abort
/// before any row is processed; row-level validation failures accumulate in
/// the report and never stop the batch. Every created lead is assigned to
/// and attributed to the importing actor.
pub fn import_leads<R>(
    repo: &R,
    importer: &Actor,
    file_name: &str,
    bytes: &[u8],
) -> Result<ImportReport, ImportError>
where
    R: LeadRepository + ?Sized,
{
    let kind = FileKind::from_name(file_name).ok_or(ImportError::UnsupportedFormat)?;
    let table = tabular::parse(kind, bytes)?;

    if REQUIRED_COLUMNS
        .iter()
        .any(|column| table.column(column).is_none())
    {
        return Err(ImportError::MissingColumns);
    }

    let mut report = ImportReport::default();
    for (index, row) in table.rows.iter().enumerate() {
        let row_number = index + 2;
        let draft = draft_from_row(&table, row);

        if draft.missing_required_fields() {
            report.skipped.push(SkippedRow {
                row_number,
                errors: ValidationErrors::required_fields(),
            });
            continue;
        }

        match draft.validate() {
            Ok(lead) => {
                repo.insert(NewLead {
                    lead,
                    assigned_to: Some(importer.id),
                    created_by: importer.id,
                })?;
                report.created_count += 1;
            }
            Err(errors) => {
                report.skipped.push(SkippedRow { row_number, errors });
            }
        }
    }

    Ok(report)
}

fn draft_from_row(table: &TabularFile, row: &[String]) -> LeadDraft {
    let cell = |name: &str| table.cell(row, name).trim().to_string();
    let choice = |name: &str| {
        let value = cell(name);
        if value.is_empty() {
            None
        } else {
            Some(value)
        }
    };

    LeadDraft {
        name: cell("name"),
        email: cell("email"),
        phone: cell("phone"),
        status: choice("status"),
        source: choice("source"),
        priority: choice("priority"),
        interest: cell("interest"),
        company: cell("company"),
        position: cell("position"),
        budget: cell("budget"),
        timeline: cell("timeline"),
        requirements: cell("requirements"),
        notes: cell("notes"),
        tags: split_tags(table.cell(row, "tags")),
        property: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crm::access::{ActorId, ActorRole, VisibilityScope};
    use crate::crm::leads::domain::{LeadPriority, LeadSource, LeadStatus};
    use crate::crm::leads::memory::InMemoryLeadRepository;
    use crate::crm::leads::repository::LeadFilter;

    fn importer() -> Actor {
        Actor {
            id: ActorId(3),
            username: "mona".to_string(),
            first_name: "Mona".to_string(),
            last_name: "Vale".to_string(),
            email: "mona@example.com".to_string(),
            role: ActorRole::Manager,
            avatar_url: None,
        }
    }

    fn all_leads(repo: &InMemoryLeadRepository) -> Vec<crate::crm::leads::domain::Lead> {
        repo.search(&VisibilityScope::All, &LeadFilter::default())
            .expect("search succeeds")
    }

    #[test]
    fn imports_rows_with_defaults_and_attribution() {
        let repo = InMemoryLeadRepository::new();
        let csv = "name,email,phone,tags\n\
                   Ada Lovelace,ada@x.com,555-0100,\"vip, riverfront\"\n\
                   Grace Hopper,grace@x.com,555-0101,\n";

        let report =
            import_leads(&repo, &importer(), "leads.csv", csv.as_bytes()).expect("imports");

        assert_eq!(report.created_count, 2);
        assert_eq!(report.skipped_count(), 0);
        assert_eq!(report.message(), "2 leads imported successfully.");

        let leads = all_leads(&repo);
        assert_eq!(leads.len(), 2);
        for lead in &leads {
            assert_eq!(lead.status, LeadStatus::New);
            assert_eq!(lead.source, LeadSource::Website);
            assert_eq!(lead.priority, LeadPriority::Medium);
            assert_eq!(lead.assigned_to, Some(ActorId(3)));
            assert_eq!(lead.created_by, ActorId(3));
        }
        let ada = leads
            .iter()
            .find(|lead| lead.name == "Ada Lovelace")
            .expect("ada imported");
        assert_eq!(ada.tags, vec!["vip", "riverfront"]);
    }

    #[test]
    fn blank_required_fields_skip_the_row_only() {
        let repo = InMemoryLeadRepository::new();
        let csv = "name,email,phone\n\
                   ,a@x.com,1\n\
                   Bob,b@x.com,2\n";

        let report =
            import_leads(&repo, &importer(), "leads.csv", csv.as_bytes()).expect("imports");

        assert_eq!(report.created_count, 1);
        assert_eq!(report.skipped_count(), 1);
        assert_eq!(report.skipped[0].row_number, 2);
        assert_eq!(
            report.skipped[0].errors.0["Required fields"],
            vec!["Name, Email, and Phone are mandatory.".to_string()]
        );
        assert_eq!(
            report.message(),
            "1 leads imported successfully. 1 rows were skipped."
        );
        assert_eq!(all_leads(&repo).len(), 1);
    }

    #[test]
    fn invalid_choices_skip_with_field_errors_and_ascending_rows() {
        let repo = InMemoryLeadRepository::new();
        let csv = "name,email,phone,status,source\n\
                   Ada,ada@x.com,1,Abducted,Website\n\
                   Bob,b@x.com,2,New,Website\n\
                   Cam,not-an-email,3,New,Website\n";

        let report =
            import_leads(&repo, &importer(), "leads.csv", csv.as_bytes()).expect("imports");

        assert_eq!(report.created_count, 1);
        assert_eq!(report.skipped_count(), 2);
        assert_eq!(report.skipped[0].row_number, 2);
        assert!(report.skipped[0].errors.0.contains_key("status"));
        assert_eq!(report.skipped[1].row_number, 4);
        assert!(report.skipped[1].errors.0.contains_key("email"));
        assert!(!report.all_rows_failed());
    }

    #[test]
    fn all_failing_rows_mark_the_batch_failed() {
        let repo = InMemoryLeadRepository::new();
        let csv = "name,email,phone\n,,\n,,\n";

        let report =
            import_leads(&repo, &importer(), "leads.csv", csv.as_bytes()).expect("imports");

        assert_eq!(report.created_count, 0);
        assert_eq!(report.skipped_count(), 2);
        assert!(report.all_rows_failed());
    }

    #[test]
    fn unsupported_extension_aborts_before_rows() {
        let repo = InMemoryLeadRepository::new();
        let error = import_leads(&repo, &importer(), "leads.pdf", b"name,email,phone\n")
            .expect_err("rejected");
        assert!(matches!(error, ImportError::UnsupportedFormat));
        assert!(all_leads(&repo).is_empty());
    }

    #[test]
    fn missing_mandatory_columns_abort_before_rows() {
        let repo = InMemoryLeadRepository::new();
        let csv = "name,email\nAda,ada@x.com\n";
        let error = import_leads(&repo, &importer(), "leads.csv", csv.as_bytes())
            .expect_err("rejected");
        assert!(matches!(error, ImportError::MissingColumns));
        assert!(all_leads(&repo).is_empty());
    }

    #[test]
    fn header_matching_ignores_case_and_padding() {
        let repo = InMemoryLeadRepository::new();
        let csv = " NAME ,Email, PHONE \nAda,ada@x.com,555\n";
        let report =
            import_leads(&repo, &importer(), "leads.csv", csv.as_bytes()).expect("imports");
        assert_eq!(report.created_count, 1);
    }

    #[test]
    fn explicit_choice_cells_override_defaults() {
        let repo = InMemoryLeadRepository::new();
        let csv = "name,email,phone,status,source,priority\n\
                   Ada,ada@x.com,555,Converted,Social Media,High\n";
        import_leads(&repo, &importer(), "leads.csv", csv.as_bytes()).expect("imports");

        let leads = all_leads(&repo);
        assert_eq!(leads[0].status, LeadStatus::Converted);
        assert_eq!(leads[0].source, LeadSource::SocialMedia);
        assert_eq!(leads[0].priority, LeadPriority::High);
    }
}
