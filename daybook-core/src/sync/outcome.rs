use std::fmt;

use serde::Serialize;

use crate::entity::{EntityId, EntityKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RemoteOp {
    Create,
    CreateMultiple,
    Update,
    Delete,
    DeleteMultiple,
}

impl fmt::Display for RemoteOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RemoteOp::Create => "create",
            RemoteOp::CreateMultiple => "bulk create",
            RemoteOp::Update => "update",
            RemoteOp::Delete => "delete",
            RemoteOp::DeleteMultiple => "bulk delete",
        };
        write!(f, "{name}")
    }
}

/// How a background remote write settled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncOutcome {
    pub kind: EntityKind,
    pub op: RemoteOp,
    pub ids: Vec<EntityId>,
    /// `None` on success.
    pub error: Option<String>,
}

impl SyncOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

impl fmt::Display for SyncOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let target = match self.ids.as_slice() {
            [id] => format!("{} {id}", self.kind),
            ids => format!("{} {}s", ids.len(), self.kind),
        };
        match &self.error {
            None => write!(f, "{} of {target} synced", self.op),
            Some(error) => write!(f, "{} of {target} failed: {error}", self.op),
        }
    }
}
