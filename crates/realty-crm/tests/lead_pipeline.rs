use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Utc;
use realty_crm::crm::access::{
    Actor, ActorId, ActorRole, InMemoryActorDirectory, VisibilityScope,
};
use realty_crm::crm::leads::{
    InMemoryLeadRepository, LeadFilter, LeadService, LeadStatus, TimeRange,
};

fn actor(id: u64, first: &str, last: &str, role: ActorRole) -> Actor {
    Actor {
        id: ActorId(id),
        username: first.to_lowercase(),
        first_name: first.to_string(),
        last_name: last.to_string(),
        email: format!("{}@example.com", first.to_lowercase()),
        role,
        avatar_url: None,
    }
}

fn setup() -> (
    LeadService<InMemoryLeadRepository, InMemoryActorDirectory>,
    Actor,
) {
    let manager = actor(1, "Mona", "Vale", ActorRole::Manager);
    let directory = InMemoryActorDirectory::new(vec![
        manager.clone(),
        actor(7, "Amira", "Hassan", ActorRole::Agent),
    ]);
    let service = LeadService::new(
        Arc::new(InMemoryLeadRepository::new()),
        Arc::new(directory),
    );
    (service, manager)
}

const MIXED_CSV: &str = "\
name,email,phone,status,source,priority,tags
Ada Lovelace,ada@x.com,555-0100,Converted,Referral,High,\"vip, repeat-buyer\"
Grace Hopper,grace@x.com,555-0101,Qualified,Website,,
,missing-name@x.com,555-0102,,,,
Linus Pauling,linus@x.com,555-0103,,Walk-In,Low,
";

#[test]
fn import_feeds_the_dashboard() {
    let (service, manager) = setup();

    let report = service
        .import(&manager, "leads.csv", MIXED_CSV.as_bytes())
        .expect("import succeeds");
    assert_eq!(report.created_count, 3);
    assert_eq!(report.skipped_count(), 1);
    assert_eq!(report.skipped[0].row_number, 4);

    let stats = service
        .dashboard_stats(&VisibilityScope::All, TimeRange::Week, Utc::now())
        .expect("dashboard builds");
    assert_eq!(stats.total_leads, 3);
    assert_eq!(stats.qualified_leads, 1);
    assert_eq!(stats.converted_leads, 1);
    assert_eq!(stats.conversion_rate, 33.3);
    assert_eq!(stats.daily_leads_added.len(), 7);
    assert_eq!(
        stats.daily_leads_added.last().map(|day| day.count),
        Some(3)
    );
    assert_eq!(stats.recent_leads.len(), 3);

    let statuses: Vec<&str> = stats
        .status_distribution
        .iter()
        .map(|entry| entry.status_label)
        .collect();
    assert_eq!(statuses, vec!["New", "Qualified", "Converted"]);
}

#[test]
fn export_reimports_the_same_contact_triples() {
    let (service, manager) = setup();
    service
        .import(&manager, "leads.csv", MIXED_CSV.as_bytes())
        .expect("import succeeds");

    let exported = service
        .export(&VisibilityScope::All, &LeadFilter::default())
        .expect("export succeeds");
    assert_eq!(&exported[..3], &[0xEF, 0xBB, 0xBF]);

    let (second, manager_again) = setup();
    let report = second
        .import(&manager_again, "leads_export.csv", &exported)
        .expect("re-import succeeds");
    assert_eq!(report.created_count, 3);
    assert_eq!(report.skipped_count(), 0);

    let triples = |svc: &LeadService<InMemoryLeadRepository, InMemoryActorDirectory>| {
        svc.list(&VisibilityScope::All, &LeadFilter::default())
            .expect("listing succeeds")
            .into_iter()
            .map(|lead| (lead.name, lead.email, lead.phone))
            .collect::<BTreeSet<_>>()
    };
    assert_eq!(triples(&service), triples(&second));
}

#[test]
fn exported_choice_labels_survive_reimport() {
    let (service, manager) = setup();
    service
        .import(&manager, "leads.csv", MIXED_CSV.as_bytes())
        .expect("import succeeds");

    let exported = service
        .export(&VisibilityScope::All, &LeadFilter::default())
        .expect("export succeeds");

    let (second, manager_again) = setup();
    second
        .import(&manager_again, "leads_export.csv", &exported)
        .expect("re-import succeeds");

    let mut filter = LeadFilter::default();
    filter.status = Some(LeadStatus::Converted);
    let converted = second
        .list(&VisibilityScope::All, &filter)
        .expect("listing succeeds");
    assert_eq!(converted.len(), 1);
    assert_eq!(converted[0].name, "Ada Lovelace");
    assert_eq!(converted[0].tags, vec!["vip", "repeat-buyer"]);
}

#[test]
fn agent_scope_sees_only_assigned_leads() {
    let (service, manager) = setup();
    service
        .import(&manager, "leads.csv", MIXED_CSV.as_bytes())
        .expect("import succeeds");

    // Imported leads all belong to the importing manager; the agent's
    // scoped dashboard must stay empty.
    let agent_scope = VisibilityScope::Assigned(ActorId(7));
    let stats = service
        .dashboard_stats(&agent_scope, TimeRange::Week, Utc::now())
        .expect("dashboard builds");
    assert_eq!(stats.total_leads, 0);
    assert_eq!(stats.conversion_rate, 0.0);
    assert!(stats.status_distribution.is_empty());

    let entries = service
        .team_performance(&agent_scope)
        .expect("report builds");
    let amira = entries
        .iter()
        .find(|entry| entry.agent == "Amira Hassan")
        .expect("agent listed");
    assert_eq!(amira.total_leads, 0);
    assert_eq!(amira.conversion_rate, 0);
}
