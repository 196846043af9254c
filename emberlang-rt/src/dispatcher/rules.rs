//! Route table: `msgType → DispatchRule`.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
// (none)

// Layer 3: Internal module imports
use crate::message::MessagePriority;
use crate::util::ActorId;

/// Where a message type gets routed, and the priority floor applied once
/// it is. Last `add_route` for a given type wins.
#[derive(Debug, Clone, Copy)]
pub struct DispatchRule {
    pub target: ActorId,
    pub priority: MessagePriority,
}

impl DispatchRule {
    pub fn new(target: ActorId, priority: MessagePriority) -> Self {
        Self { target, priority }
    }
}
