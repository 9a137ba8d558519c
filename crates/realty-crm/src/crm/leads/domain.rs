use crate::crm::access::ActorId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Identifier wrapper for stored leads.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct LeadId(pub u64);

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    New,
    Contacted,
    Qualified,
    Proposal,
    Negotiation,
    Converted,
    Dropped,
}

impl LeadStatus {
    pub const fn ordered() -> [Self; 7] {
        [
            Self::New,
            Self::Contacted,
            Self::Qualified,
            Self::Proposal,
            Self::Negotiation,
            Self::Converted,
            Self::Dropped,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::New => "New",
            Self::Contacted => "Contacted",
            Self::Qualified => "Qualified",
            Self::Proposal => "Proposal",
            Self::Negotiation => "Negotiation",
            Self::Converted => "Converted",
            Self::Dropped => "Dropped",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match normalize_choice(value).as_str() {
            "new" => Some(Self::New),
            "contacted" => Some(Self::Contacted),
            "qualified" => Some(Self::Qualified),
            "proposal" => Some(Self::Proposal),
            "negotiation" => Some(Self::Negotiation),
            "converted" => Some(Self::Converted),
            "dropped" => Some(Self::Dropped),
            _ => None,
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum LeadSource {
    Website,
    Referral,
    SocialMedia,
    Advertisement,
    ColdCall,
    WalkIn,
    Other,
}

impl LeadSource {
    pub const fn ordered() -> [Self; 7] {
        [
            Self::Website,
            Self::Referral,
            Self::SocialMedia,
            Self::Advertisement,
            Self::ColdCall,
            Self::WalkIn,
            Self::Other,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Website => "Website",
            Self::Referral => "Referral",
            Self::SocialMedia => "Social Media",
            Self::Advertisement => "Advertisement",
            Self::ColdCall => "Cold Call",
            Self::WalkIn => "Walk-In",
            Self::Other => "Other",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match normalize_choice(value).as_str() {
            "website" => Some(Self::Website),
            "referral" => Some(Self::Referral),
            "socialmedia" => Some(Self::SocialMedia),
            "advertisement" => Some(Self::Advertisement),
            "coldcall" => Some(Self::ColdCall),
            "walkin" => Some(Self::WalkIn),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum LeadPriority {
    Low,
    Medium,
    High,
}

impl LeadPriority {
    pub const fn ordered() -> [Self; 3] {
        [Self::Low, Self::Medium, Self::High]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match normalize_choice(value).as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

/// Choice matching is forgiving so exported labels ("Social Media",
/// "Walk-In") re-import without editing.
fn normalize_choice(value: &str) -> String {
    value
        .trim()
        .chars()
        .filter(|c| !matches!(c, ' ' | '_' | '-'))
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Denormalized snapshot of the property a lead is interested in. The price
/// feeds the revenue rollups; leads without one contribute nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyLink {
    pub id: u64,
    pub title: String,
    pub price: Option<u64>,
}

/// A stored sales prospect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lead {
    pub id: LeadId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub status: LeadStatus,
    pub source: LeadSource,
    pub priority: LeadPriority,
    pub interest: String,
    pub company: String,
    pub position: String,
    pub budget: String,
    pub timeline: String,
    pub requirements: String,
    pub notes: String,
    pub tags: Vec<String>,
    pub property: Option<PropertyLink>,
    pub assigned_to: Option<ActorId>,
    pub created_by: ActorId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Field-level validation failures, keyed by field name. The map form is the
/// wire shape reported per skipped import row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(pub BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn required_fields() -> Self {
        let mut errors = Self::default();
        errors.push("Required fields", "Name, Email, and Phone are mandatory.");
        errors
    }
}

const BLANK: &str = "This field may not be blank.";

fn too_long(max: usize) -> String {
    format!("Ensure this field has no more than {max} characters.")
}

fn bad_choice(value: &str) -> String {
    format!("\"{value}\" is not a valid choice.")
}

/// Fixed-shape candidate record shared by CRUD creation and bulk import.
/// Blank choice fields fall back to the documented defaults during
/// validation; everything else is carried as entered.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LeadDraft {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub interest: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub budget: String,
    #[serde(default)]
    pub timeline: String,
    #[serde(default)]
    pub requirements: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub property: Option<PropertyLink>,
}

impl LeadDraft {
    /// True when any of the mandatory contact fields is blank after trimming.
    pub fn missing_required_fields(&self) -> bool {
        self.name.trim().is_empty()
            || self.email.trim().is_empty()
            || self.phone.trim().is_empty()
    }

    /// The shared validation routine. Returns either a fully-typed candidate
    /// or the accumulated field-level error map.
    pub fn validate(self) -> Result<ValidatedLead, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let name = self.name.trim().to_string();
        if name.is_empty() {
            errors.push("name", BLANK);
        } else if name.chars().count() > 255 {
            errors.push("name", too_long(255));
        }

        let email = self.email.trim().to_string();
        if email.is_empty() {
            errors.push("email", BLANK);
        } else if email.chars().count() > 254 {
            errors.push("email", too_long(254));
        } else if !looks_like_email(&email) {
            errors.push("email", "Enter a valid email address.");
        }

        let phone = self.phone.trim().to_string();
        if phone.is_empty() {
            errors.push("phone", BLANK);
        } else if phone.chars().count() > 20 {
            errors.push("phone", too_long(20));
        }

        let status = match choice_or_default(self.status.as_deref()) {
            None => LeadStatus::New,
            Some(raw) => LeadStatus::parse(raw).unwrap_or_else(|| {
                errors.push("status", bad_choice(raw.trim()));
                LeadStatus::New
            }),
        };

        let source = match choice_or_default(self.source.as_deref()) {
            None => LeadSource::Website,
            Some(raw) => LeadSource::parse(raw).unwrap_or_else(|| {
                errors.push("source", bad_choice(raw.trim()));
                LeadSource::Website
            }),
        };

        let priority = match choice_or_default(self.priority.as_deref()) {
            None => LeadPriority::Medium,
            Some(raw) => LeadPriority::parse(raw).unwrap_or_else(|| {
                errors.push("priority", bad_choice(raw.trim()));
                LeadPriority::Medium
            }),
        };

        for (field, value) in [
            ("interest", &self.interest),
            ("company", &self.company),
            ("position", &self.position),
        ] {
            if value.trim().chars().count() > 255 {
                errors.push(field, too_long(255));
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(ValidatedLead {
            name,
            email,
            phone,
            status,
            source,
            priority,
            interest: self.interest.trim().to_string(),
            company: self.company.trim().to_string(),
            position: self.position.trim().to_string(),
            budget: self.budget.trim().to_string(),
            timeline: self.timeline.trim().to_string(),
            requirements: self.requirements.trim().to_string(),
            notes: self.notes.trim().to_string(),
            tags: normalize_tags(self.tags),
            property: self.property,
        })
    }
}

/// A draft that passed validation, ready for the repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedLead {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub status: LeadStatus,
    pub source: LeadSource,
    pub priority: LeadPriority,
    pub interest: String,
    pub company: String,
    pub position: String,
    pub budget: String,
    pub timeline: String,
    pub requirements: String,
    pub notes: String,
    pub tags: Vec<String>,
    pub property: Option<PropertyLink>,
}

fn choice_or_default(raw: Option<&str>) -> Option<&str> {
    raw.filter(|value| !value.trim().is_empty())
}

fn looks_like_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !value.contains(char::is_whitespace)
        }
        None => false,
    }
}

/// Tags live internally as an ordered list of non-empty trimmed strings; the
/// comma-joined form only exists at the file-format edge.
pub fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    tags.into_iter()
        .map(|tag| tag.trim().to_string())
        .filter(|tag| !tag.is_empty())
        .collect()
}

/// Splits a comma-joined tag cell, dropping empty fragments.
pub fn split_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|tag| tag.trim().to_string())
        .filter(|tag| !tag.is_empty())
        .collect()
}
