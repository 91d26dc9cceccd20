use serde::{Deserialize, Serialize};

use crate::entity::{Entity, EntityId};
use crate::error::{CoreError, CoreResult};

/// Which stores an Add should reach.
///
/// `Local` only touches the in-memory view, `Cloud` only the durable store
/// (remote when authenticated, mirror otherwise), `Both` does both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageTarget {
    Local,
    Cloud,
    #[default]
    Both,
}

impl StorageTarget {
    pub fn updates_memory(self) -> bool {
        matches!(self, StorageTarget::Local | StorageTarget::Both)
    }

    pub fn updates_storage(self) -> bool {
        matches!(self, StorageTarget::Cloud | StorageTarget::Both)
    }
}

/// A change to one collection.
///
/// Serialized as `{"type": "ADD", "payload": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action<E> {
    Add {
        #[serde(rename = "addedItem")]
        item: E,
        #[serde(rename = "whereTo", default)]
        target: StorageTarget,
    },
    AddMultiple {
        #[serde(rename = "addedItems")]
        items: Vec<E>,
        #[serde(rename = "whereTo", default)]
        target: StorageTarget,
    },
    /// Full replacement of the item with the same id.
    Edit(E),
    Remove {
        id: EntityId,
    },
    RemoveMultiple(#[serde(with = "id_refs")] Vec<EntityId>),
    Clear,
    ReplaceAll(Vec<E>),
}

const ACTION_KINDS: &[&str] = &[
    "ADD",
    "ADD_MULTIPLE",
    "EDIT",
    "REMOVE",
    "REMOVE_MULTIPLE",
    "CLEAR",
    "REPLACE_ALL",
];

impl<E: Entity> Action<E> {
    pub fn add(item: E) -> Self {
        Action::Add {
            item,
            target: StorageTarget::Both,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Action::Add { .. } => "ADD",
            Action::AddMultiple { .. } => "ADD_MULTIPLE",
            Action::Edit(_) => "EDIT",
            Action::Remove { .. } => "REMOVE",
            Action::RemoveMultiple(_) => "REMOVE_MULTIPLE",
            Action::Clear => "CLEAR",
            Action::ReplaceAll(_) => "REPLACE_ALL",
        }
    }

    /// Decode an action received as JSON, e.g. from a script or another
    /// front-end. Unknown `type`s are `UnrecognizedAction`.
    pub fn from_json(value: serde_json::Value) -> CoreResult<Self> {
        let kind = value
            .get("type")
            .and_then(|t| t.as_str())
            .ok_or_else(|| CoreError::Validation("Action is missing its 'type'".into()))?;

        if !ACTION_KINDS.contains(&kind) {
            return Err(CoreError::UnrecognizedAction(kind.to_string()));
        }

        serde_json::from_value(value)
            .map_err(|e| CoreError::Validation(format!("Malformed action payload: {e}")))
    }
}

/// `RemoveMultiple` payloads are `[{"id": 1}, {"id": 2}]`.
mod id_refs {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use crate::entity::EntityId;

    #[derive(Serialize, Deserialize)]
    struct IdRef {
        id: EntityId,
    }

    pub fn serialize<S: Serializer>(ids: &[EntityId], serializer: S) -> Result<S::Ok, S::Error> {
        let refs: Vec<IdRef> = ids.iter().map(|&id| IdRef { id }).collect();
        refs.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<EntityId>, D::Error> {
        let refs = Vec::<IdRef>::deserialize(deserializer)?;
        Ok(refs.into_iter().map(|r| r.id).collect())
    }
}
