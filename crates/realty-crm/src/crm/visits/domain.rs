use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::crm::access::ActorId;
use crate::crm::leads::domain::ValidationErrors;

/// Identifier wrapper for scheduled visits.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct VisitId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisitStatus {
    Scheduled,
    Confirmed,
    Completed,
    Cancelled,
    NoShow,
}

impl VisitStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Scheduled => "Scheduled",
            Self::Confirmed => "Confirmed",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
            Self::NoShow => "No Show",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let key: String = value
            .trim()
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match key.as_str() {
            "scheduled" => Some(Self::Scheduled),
            "confirmed" => Some(Self::Confirmed),
            "completed" => Some(Self::Completed),
            "cancelled" => Some(Self::Cancelled),
            "noshow" => Some(Self::NoShow),
            _ => None,
        }
    }

    /// Completed, cancelled, and no-show visits are terminal.
    pub const fn can_transition_to(self, next: Self) -> bool {
        match self {
            Self::Scheduled => !matches!(next, Self::Scheduled),
            Self::Confirmed => matches!(next, Self::Completed | Self::Cancelled | Self::NoShow),
            Self::Completed | Self::Cancelled | Self::NoShow => false,
        }
    }
}

/// A scheduled showing of a property to a prospective client. The client is
/// either a linked account or a manually captured name/phone pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteVisit {
    pub id: VisitId,
    pub property_id: u64,
    pub property_title: String,
    pub agent: Option<ActorId>,
    pub client: Option<ActorId>,
    pub client_name: Option<String>,
    pub client_phone: Option<String>,
    pub date: NaiveDate,
    pub time: String,
    pub status: VisitStatus,
    pub feedback: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Scheduling payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VisitRequest {
    #[serde(default)]
    pub property_id: u64,
    #[serde(default)]
    pub property_title: String,
    #[serde(default)]
    pub agent: Option<u64>,
    #[serde(default)]
    pub client: Option<u64>,
    #[serde(default)]
    pub client_name: Option<String>,
    #[serde(default)]
    pub client_phone: Option<String>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub time: String,
}

impl VisitRequest {
    pub fn validate(self) -> Result<ValidatedVisit, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let property_title = self.property_title.trim().to_string();
        if property_title.is_empty() {
            errors.push("property_title", "This field may not be blank.");
        }

        let time = self.time.trim().to_string();
        if time.is_empty() {
            errors.push("time", "This field may not be blank.");
        } else if time.chars().count() > 20 {
            errors.push("time", "Ensure this field has no more than 20 characters.");
        }

        let date = match self.date {
            Some(date) => Some(date),
            None => {
                errors.push("date", "This field is required.");
                None
            }
        };

        let client_name = self
            .client_name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());
        if self.client.is_none() && client_name.is_none() {
            errors.push(
                "client",
                "Provide a linked client or a manual client name.",
            );
        }

        let client_phone = self
            .client_phone
            .map(|phone| phone.trim().to_string())
            .filter(|phone| !phone.is_empty());
        if client_phone
            .as_ref()
            .is_some_and(|phone| phone.chars().count() > 20)
        {
            errors.push("client_phone", "Ensure this field has no more than 20 characters.");
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(ValidatedVisit {
            property_id: self.property_id,
            property_title,
            agent: self.agent.map(ActorId),
            client: self.client.map(ActorId),
            client_name,
            client_phone,
            date: date.expect("date checked above"),
            time,
        })
    }
}

/// A scheduling request that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedVisit {
    pub property_id: u64,
    pub property_title: String,
    pub agent: Option<ActorId>,
    pub client: Option<ActorId>,
    pub client_name: Option<String>,
    pub client_phone: Option<String>,
    pub date: NaiveDate,
    pub time: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_statuses_do_not_transition() {
        assert!(VisitStatus::Scheduled.can_transition_to(VisitStatus::Confirmed));
        assert!(VisitStatus::Scheduled.can_transition_to(VisitStatus::NoShow));
        assert!(VisitStatus::Confirmed.can_transition_to(VisitStatus::Completed));
        assert!(!VisitStatus::Confirmed.can_transition_to(VisitStatus::Scheduled));
        assert!(!VisitStatus::Completed.can_transition_to(VisitStatus::Cancelled));
        assert!(!VisitStatus::Cancelled.can_transition_to(VisitStatus::Scheduled));
        assert!(!VisitStatus::NoShow.can_transition_to(VisitStatus::Completed));
    }

    #[test]
    fn status_parsing_accepts_labels() {
        assert_eq!(VisitStatus::parse("No Show"), Some(VisitStatus::NoShow));
        assert_eq!(VisitStatus::parse("no_show"), Some(VisitStatus::NoShow));
        assert_eq!(VisitStatus::parse("CONFIRMED"), Some(VisitStatus::Confirmed));
        assert_eq!(VisitStatus::parse("postponed"), None);
    }

    #[test]
    fn request_requires_some_client_identity() {
        let request = VisitRequest {
            property_id: 4,
            property_title: "Marina Heights 4B".to_string(),
            date: "2025-07-01".parse().ok(),
            time: "10:30".to_string(),
            ..VisitRequest::default()
        };
        let errors = request.validate().expect_err("no client given");
        assert!(errors.0.contains_key("client"));

        let request = VisitRequest {
            property_id: 4,
            property_title: "Marina Heights 4B".to_string(),
            client_name: Some("Walk-in couple".to_string()),
            date: "2025-07-01".parse().ok(),
            time: "10:30".to_string(),
            ..VisitRequest::default()
        };
        let visit = request.validate().expect("manual client accepted");
        assert_eq!(visit.client_name.as_deref(), Some("Walk-in couple"));
    }
}
