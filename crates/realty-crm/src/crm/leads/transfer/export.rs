use std::collections::HashMap;

use crate::crm::access::{Actor, ActorDirectory, ActorId, DirectoryError};
use crate::crm::leads::domain::Lead;

pub const EXPORT_FILE_NAME: &str = "leads_export.csv";

/// Stable export column set. Actor references are flattened to name/email
/// pairs; the raw id columns are intentionally absent.
const COLUMNS: [&str; 23] = [
    "id",
    "name",
    "email",
    "phone",
    "company",
    "position",
    "status",
    "source",
    "interest",
    "priority",
    "budget",
    "timeline",
    "requirements",
    "notes",
    "tags",
    "property_title",
    "property_price",
    "assigned_to_name",
    "assigned_to_email",
    "created_by_name",
    "created_by_email",
    "created_at",
    "updated_at",
];

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error(transparent)]
    Directory(#[from] DirectoryError),
    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to flush CSV: {0}")]
    Io(#[from] std::io::Error),
}

/// Writes the collection as UTF-8 CSV prefixed with a byte-order mark so
/// spreadsheet applications pick the right encoding. There is no row-level
/// failure mode: unresolvable references flatten to their defaults.
pub fn export_csv<D>(leads: &[Lead], directory: &D) -> Result<Vec<u8>, ExportError>
where
    D: ActorDirectory + ?Sized,
{
    let mut resolved: HashMap<ActorId, Option<Actor>> = HashMap::new();
    let mut resolve = |id: ActorId| -> Result<Option<Actor>, DirectoryError> {
        if let Some(actor) = resolved.get(&id) {
            return Ok(actor.clone());
        }
        let actor = directory.fetch(id)?;
        resolved.insert(id, actor.clone());
        Ok(actor)
    };

    let mut buffer: Vec<u8> = vec![0xEF, 0xBB, 0xBF];
    {
        let mut writer = csv::Writer::from_writer(&mut buffer);
        writer.write_record(COLUMNS)?;

        for lead in leads {
            let (assigned_to_name, assigned_to_email) = match lead.assigned_to {
                Some(id) => match resolve(id)? {
                    Some(actor) => (actor.display_name(), actor.email),
                    None => ("Unassigned".to_string(), String::new()),
                },
                None => ("Unassigned".to_string(), String::new()),
            };
            let (created_by_name, created_by_email) = match resolve(lead.created_by)? {
                Some(actor) => (actor.display_name(), actor.email),
                None => (String::new(), String::new()),
            };
            let (property_title, property_price) = match &lead.property {
                Some(link) => (
                    link.title.clone(),
                    link.price.map(|price| price.to_string()).unwrap_or_default(),
                ),
                None => (String::new(), String::new()),
            };

            writer.write_record([
                lead.id.0.to_string(),
                lead.name.clone(),
                lead.email.clone(),
                lead.phone.clone(),
                lead.company.clone(),
                lead.position.clone(),
                lead.status.label().to_string(),
                lead.source.label().to_string(),
                lead.interest.clone(),
                lead.priority.label().to_string(),
                lead.budget.clone(),
                lead.timeline.clone(),
                lead.requirements.clone(),
                lead.notes.clone(),
                lead.tags.join(","),
                property_title,
                property_price,
                assigned_to_name,
                assigned_to_email,
                created_by_name,
                created_by_email,
                lead.created_at.to_rfc3339(),
                lead.updated_at.to_rfc3339(),
            ])?;
        }

        writer.flush()?;
    }

    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crm::access::{ActorRole, InMemoryActorDirectory};
    use crate::crm::leads::domain::{
        LeadId, LeadPriority, LeadSource, LeadStatus, PropertyLink,
    };
    use chrono::{DateTime, Utc};

    fn directory() -> InMemoryActorDirectory {
        InMemoryActorDirectory::new(vec![Actor {
            id: ActorId(5),
            username: "nadia".to_string(),
            first_name: "Nadia".to_string(),
            last_name: "Reyes".to_string(),
            email: "nadia@example.com".to_string(),
            role: ActorRole::Agent,
            avatar_url: None,
        }])
    }

    fn lead(id: u64, assigned_to: Option<ActorId>) -> Lead {
        let stamp: DateTime<Utc> = "2025-06-01T09:00:00Z".parse().expect("valid timestamp");
        Lead {
            id: LeadId(id),
            name: format!("Lead {id}"),
            email: format!("lead{id}@example.com"),
            phone: "555-0100".to_string(),
            status: LeadStatus::Qualified,
            source: LeadSource::SocialMedia,
            priority: LeadPriority::High,
            interest: "3BR condo".to_string(),
            company: String::new(),
            position: String::new(),
            budget: "450000".to_string(),
            timeline: String::new(),
            requirements: String::new(),
            notes: String::new(),
            tags: vec!["vip".to_string(), "riverfront".to_string()],
            property: Some(PropertyLink {
                id: 9,
                title: "Marina Heights 4B".to_string(),
                price: Some(450_000),
            }),
            assigned_to,
            created_by: ActorId(5),
            created_at: stamp,
            updated_at: stamp,
        }
    }

    fn rows(bytes: &[u8]) -> Vec<Vec<String>> {
        let text = std::str::from_utf8(bytes).expect("utf-8 output");
        let text = text.strip_prefix('\u{feff}').expect("BOM present");
        csv::Reader::from_reader(text.as_bytes())
            .records()
            .map(|record| {
                record
                    .expect("valid record")
                    .iter()
                    .map(str::to_string)
                    .collect()
            })
            .collect()
    }

    #[test]
    fn starts_with_byte_order_mark_and_stable_header() {
        let bytes = export_csv(&[], &directory()).expect("exports");
        assert_eq!(&bytes[..3], &[0xEF, 0xBB, 0xBF]);
        let text = std::str::from_utf8(&bytes).expect("utf-8 output");
        assert!(text
            .trim_start_matches('\u{feff}')
            .starts_with("id,name,email,phone,"));
        assert!(text.contains("assigned_to_name"));
        assert!(!text.contains("assigned_to_id"));
    }

    #[test]
    fn flattens_actor_references_and_tags() {
        let directory = directory();
        let bytes =
            export_csv(&[lead(1, Some(ActorId(5)))], &directory).expect("exports");
        let data = rows(&bytes);
        let row = &data[0];

        assert_eq!(row[14], "vip,riverfront");
        assert_eq!(row[15], "Marina Heights 4B");
        assert_eq!(row[16], "450000");
        assert_eq!(row[17], "Nadia Reyes");
        assert_eq!(row[18], "nadia@example.com");
        assert_eq!(row[19], "Nadia Reyes");
        assert_eq!(row[6], "Qualified");
        assert_eq!(row[7], "Social Media");
    }

    #[test]
    fn unassigned_leads_export_the_placeholder() {
        let bytes = export_csv(&[lead(1, None)], &directory()).expect("exports");
        let data = rows(&bytes);
        assert_eq!(data[0][17], "Unassigned");
        assert_eq!(data[0][18], "");
    }

    #[test]
    fn unresolvable_references_flatten_to_defaults() {
        let empty = InMemoryActorDirectory::default();
        let bytes = export_csv(&[lead(1, Some(ActorId(41)))], &empty).expect("exports");
        let data = rows(&bytes);
        assert_eq!(data[0][17], "Unassigned");
        assert_eq!(data[0][19], "");
        assert_eq!(data[0][20], "");
    }
}
