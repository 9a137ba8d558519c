use serde::{Deserialize, Serialize};

/// Identifier wrapper for directory actors.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct ActorId(pub u64);

/// Role assigned to a directory actor. Admins and managers operate on the
/// whole lead collection; everyone else only sees what is assigned to them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorRole {
    Admin,
    Manager,
    Agent,
    Client,
}

impl ActorRole {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Manager => "manager",
            Self::Agent => "agent",
            Self::Client => "client",
        }
    }

    pub const fn is_back_office(self) -> bool {
        matches!(self, Self::Admin | Self::Manager)
    }
}

/// Directory record for a system user. Identity verification happens
/// upstream; the core only consumes id, role, and display metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: ActorId,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: ActorRole,
    pub avatar_url: Option<String>,
}

impl Actor {
    /// Full name, falling back to the username when both name parts are blank.
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }
}

/// Visibility predicate computed once per request from the calling actor and
/// passed explicitly into reporting and transfer calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibilityScope {
    All,
    Assigned(ActorId),
}

impl VisibilityScope {
    pub fn for_actor(actor: &Actor) -> Self {
        if actor.role.is_back_office() {
            Self::All
        } else {
            Self::Assigned(actor.id)
        }
    }

    pub fn permits(&self, assigned_to: Option<ActorId>) -> bool {
        match self {
            Self::All => true,
            Self::Assigned(id) => assigned_to == Some(*id),
        }
    }
}

/// Lookup abstraction over the user store. Backed by the identity system in
/// production; tests and the bundled server use the in-memory directory.
pub trait ActorDirectory: Send + Sync {
    fn fetch(&self, id: ActorId) -> Result<Option<Actor>, DirectoryError>;
    fn agents(&self) -> Result<Vec<Actor>, DirectoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("directory unavailable: {0}")]
    Unavailable(String),
}

/// In-memory directory used by the bundled server and the test suites.
#[derive(Debug, Default, Clone)]
pub struct InMemoryActorDirectory {
    actors: Vec<Actor>,
}

impl InMemoryActorDirectory {
    pub fn new(actors: Vec<Actor>) -> Self {
        Self { actors }
    }
}

impl ActorDirectory for InMemoryActorDirectory {
    fn fetch(&self, id: ActorId) -> Result<Option<Actor>, DirectoryError> {
        Ok(self.actors.iter().find(|actor| actor.id == id).cloned())
    }

    fn agents(&self) -> Result<Vec<Actor>, DirectoryError> {
        Ok(self
            .actors
            .iter()
            .filter(|actor| actor.role == ActorRole::Agent)
            .cloned()
            .collect())
    }
}
