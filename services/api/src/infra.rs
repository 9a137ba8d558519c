use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use realty_crm::crm::access::{Actor, ActorId, ActorRole, InMemoryActorDirectory};
use realty_crm::crm::leads::{
    InMemoryLeadRepository, Lead, LeadId, LeadPriority, LeadSource, LeadStatus, PropertyLink,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

fn actor(
    id: u64,
    username: &str,
    first: &str,
    last: &str,
    role: ActorRole,
    avatar: Option<&str>,
) -> Actor {
    Actor {
        id: ActorId(id),
        username: username.to_string(),
        first_name: first.to_string(),
        last_name: last.to_string(),
        email: format!("{username}@realty.example.com"),
        role,
        avatar_url: avatar.map(str::to_string),
    }
}

/// The manager account the demo command acts as.
pub(crate) fn demo_manager() -> Actor {
    actor(2, "mona", "Mona", "Vale", ActorRole::Manager, None)
}

/// Stand-in user store. A deployment would back `ActorDirectory` with the
/// identity system; ids are stable so clients can pin them in the
/// `x-actor-id` header.
pub(crate) fn seed_directory() -> InMemoryActorDirectory {
    InMemoryActorDirectory::new(vec![
        actor(1, "priya", "Priya", "Shah", ActorRole::Admin, None),
        actor(2, "mona", "Mona", "Vale", ActorRole::Manager, None),
        actor(
            3,
            "amira",
            "Amira",
            "Hassan",
            ActorRole::Agent,
            Some("https://cdn.realty.example.com/avatars/amira.png"),
        ),
        actor(
            4,
            "ben",
            "Ben",
            "Okafor",
            ActorRole::Agent,
            Some("https://cdn.realty.example.com/avatars/ben.png"),
        ),
        actor(5, "cleo", "Cleo", "Park", ActorRole::Agent, None),
        actor(9, "walkin", "", "", ActorRole::Client, None),
    ])
}

struct SeedLead {
    name: &'static str,
    email: &'static str,
    phone: &'static str,
    status: LeadStatus,
    source: LeadSource,
    priority: LeadPriority,
    interest: &'static str,
    tags: &'static [&'static str],
    property: Option<(&'static str, u64)>,
    assigned_to: Option<u64>,
    days_ago: i64,
}

const SEED_LEADS: [SeedLead; 8] = [
    SeedLead {
        name: "Ada Lovelace",
        email: "ada@clients.example.com",
        phone: "555-0100",
        status: LeadStatus::Converted,
        source: LeadSource::Referral,
        priority: LeadPriority::High,
        interest: "Marina Heights 4B",
        tags: &["vip", "repeat-buyer"],
        property: Some(("Marina Heights 4B", 450_000)),
        assigned_to: Some(3),
        days_ago: 40,
    },
    SeedLead {
        name: "Grace Hopper",
        email: "grace@clients.example.com",
        phone: "555-0101",
        status: LeadStatus::Converted,
        source: LeadSource::Website,
        priority: LeadPriority::Medium,
        interest: "Cedar Row Townhome",
        tags: &[],
        property: Some(("Cedar Row Townhome", 320_000)),
        assigned_to: Some(4),
        days_ago: 12,
    },
    SeedLead {
        name: "Linus Pauling",
        email: "linus@clients.example.com",
        phone: "555-0102",
        status: LeadStatus::Qualified,
        source: LeadSource::SocialMedia,
        priority: LeadPriority::High,
        interest: "Downtown loft",
        tags: &["hot"],
        property: None,
        assigned_to: Some(3),
        days_ago: 9,
    },
    SeedLead {
        name: "Rosalind Franklin",
        email: "rosalind@clients.example.com",
        phone: "555-0103",
        status: LeadStatus::Negotiation,
        source: LeadSource::Advertisement,
        priority: LeadPriority::Medium,
        interest: "Garden duplex",
        tags: &[],
        property: Some(("Garden Duplex 2A", 280_000)),
        assigned_to: Some(4),
        days_ago: 6,
    },
    SeedLead {
        name: "Alan Turing",
        email: "alan@clients.example.com",
        phone: "555-0104",
        status: LeadStatus::Contacted,
        source: LeadSource::ColdCall,
        priority: LeadPriority::Low,
        interest: "Starter condo",
        tags: &[],
        property: None,
        assigned_to: Some(5),
        days_ago: 4,
    },
    SeedLead {
        name: "Katherine Johnson",
        email: "katherine@clients.example.com",
        phone: "555-0105",
        status: LeadStatus::New,
        source: LeadSource::Website,
        priority: LeadPriority::Medium,
        interest: "Riverfront plot",
        tags: &["riverfront"],
        property: None,
        assigned_to: Some(3),
        days_ago: 2,
    },
    SeedLead {
        name: "Mae Jemison",
        email: "mae@clients.example.com",
        phone: "555-0106",
        status: LeadStatus::New,
        source: LeadSource::WalkIn,
        priority: LeadPriority::Medium,
        interest: "Open house follow-up",
        tags: &[],
        property: None,
        assigned_to: Some(5),
        days_ago: 1,
    },
    SeedLead {
        name: "Edwin Hubble",
        email: "edwin@clients.example.com",
        phone: "555-0107",
        status: LeadStatus::Dropped,
        source: LeadSource::Other,
        priority: LeadPriority::Low,
        interest: "Relocated out of state",
        tags: &[],
        property: None,
        assigned_to: None,
        days_ago: 30,
    },
];

/// Demo fixture: a small lead book spread over the trailing weeks so the
/// dashboard, team, and revenue reports all have something to show.
pub(crate) fn seed_demo_leads(repository: &InMemoryLeadRepository, now: DateTime<Utc>) {
    for (index, seed) in SEED_LEADS.iter().enumerate() {
        let stamp = now - Duration::days(seed.days_ago);
        repository.seed(Lead {
            id: LeadId(index as u64 + 1),
            name: seed.name.to_string(),
            email: seed.email.to_string(),
            phone: seed.phone.to_string(),
            status: seed.status,
            source: seed.source,
            priority: seed.priority,
            interest: seed.interest.to_string(),
            company: String::new(),
            position: String::new(),
            budget: String::new(),
            timeline: String::new(),
            requirements: String::new(),
            notes: String::new(),
            tags: seed.tags.iter().map(|tag| tag.to_string()).collect(),
            property: seed.property.map(|(title, price)| PropertyLink {
                id: index as u64 + 100,
                title: title.to_string(),
                price: Some(price),
            }),
            assigned_to: seed.assigned_to.map(ActorId),
            created_by: ActorId(2),
            created_at: stamp,
            updated_at: stamp,
        });
    }
}
