// Layer 1: Standard library imports
use std::fmt::{self, Display};

// Layer 2: Third-party crate imports
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Layer 3: Internal module imports
// (none)

/// Unique identifier for actors in the system.
///
/// UUID-backed so ids never collide across independently-constructed
/// systems; [`ActorId::nil`] is the reserved "no sender" value referenced
/// throughout the messaging and supervision APIs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActorId(Uuid);

impl ActorId {
    /// Generate a new random `ActorId`.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create an `ActorId` from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// The reserved "no sender" / "no receiver" sentinel. System-originated
    /// messages (timers, supervisor notifications) use this as `sender`.
    pub fn nil() -> Self {
        Self(Uuid::nil())
    }

    /// True for [`ActorId::nil`].
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ActorId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for messages in the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(Uuid);

impl MessageId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a supervisor node in a supervision tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SupervisorId(Uuid);

impl SupervisorId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SupervisorId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for SupervisorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Actor address for lookup by name, used by `ActorSystem::createActor` and
/// group membership. Anonymous actors are reachable only via their
/// [`ActorId`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActorAddress {
    Named { id: ActorId, name: String },
    Anonymous { id: ActorId },
}

impl ActorAddress {
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named {
            id: ActorId::new(),
            name: name.into(),
        }
    }

    pub fn anonymous() -> Self {
        Self::Anonymous { id: ActorId::new() }
    }

    pub fn id(&self) -> ActorId {
        match self {
            Self::Named { id, .. } => *id,
            Self::Anonymous { id } => *id,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Named { name, .. } => Some(name),
            Self::Anonymous { .. } => None,
        }
    }
}

impl Display for ActorAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named { id, name } => write!(f, "{name}@{id}"),
            Self::Anonymous { id } => write!(f, "anonymous@{id}"),
        }
    }
}
