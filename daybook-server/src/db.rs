//! JSON-file database of users and their collections.
//!
//! The whole database is kept in memory and written back to disk after
//! every change (temp file, then rename).

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use daybook_core::CoreError;
use daybook_core::entity::{Calendar, Entity, EntityId, Schedule};
use daybook_core::remote::{User, UserProfile};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserCollections {
    #[serde(default)]
    calendars: BTreeMap<EntityId, Calendar>,
    #[serde(default)]
    schedules: BTreeMap<EntityId, Schedule>,
}

/// An entity kind the database can hold.
pub trait Stored: Entity {
    fn collection(data: &UserCollections) -> &BTreeMap<EntityId, Self>;
    fn collection_mut(data: &mut UserCollections) -> &mut BTreeMap<EntityId, Self>;
}

impl Stored for Calendar {
    fn collection(data: &UserCollections) -> &BTreeMap<EntityId, Self> {
        &data.calendars
    }

    fn collection_mut(data: &mut UserCollections) -> &mut BTreeMap<EntityId, Self> {
        &mut data.calendars
    }
}

impl Stored for Schedule {
    fn collection(data: &UserCollections) -> &BTreeMap<EntityId, Self> {
        &data.schedules
    }

    fn collection_mut(data: &mut UserCollections) -> &mut BTreeMap<EntityId, Self> {
        &mut data.schedules
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Contents {
    #[serde(default)]
    users: BTreeMap<String, User>,
    #[serde(default)]
    collections: BTreeMap<String, UserCollections>,
}

pub struct Database {
    path: Option<PathBuf>,
    contents: Mutex<Contents>,
}

impl Database {
    /// Open the database at `path`, starting empty if the file does not exist.
    pub fn open(path: &Path) -> Result<Self> {
        let contents = if path.exists() {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("Failed to parse {}", path.display()))?
        } else {
            Contents::default()
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        Ok(Database {
            path: Some(path.to_path_buf()),
            contents: Mutex::new(contents),
        })
    }

    /// A database that is never written to disk.
    pub fn in_memory() -> Self {
        Database {
            path: None,
            contents: Mutex::new(Contents::default()),
        }
    }

    /// Run `f` on a copy of the contents, persist the copy, then swap it in.
    ///
    /// Memory only changes once the file on disk has been replaced.
    fn write<T>(&self, f: impl FnOnce(&mut Contents) -> Result<T>) -> Result<T> {
        let mut contents = self.contents.lock().unwrap_or_else(PoisonError::into_inner);
        let mut next = contents.clone();
        let result = f(&mut next)?;

        if let Some(path) = &self.path {
            let temp = path.with_extension("json.tmp");
            let raw = serde_json::to_string_pretty(&next)?;
            std::fs::write(&temp, raw)
                .with_context(|| format!("Failed to write {}", temp.display()))?;
            std::fs::rename(&temp, path)
                .with_context(|| format!("Failed to replace {}", path.display()))?;
        }
        *contents = next;
        Ok(result)
    }

    fn read<T>(&self, f: impl FnOnce(&Contents) -> T) -> T {
        let contents = self.contents.lock().unwrap_or_else(PoisonError::into_inner);
        f(&contents)
    }

    /// All of a user's items, ordered by id.
    pub fn list<E: Stored>(&self, user_id: &str) -> Vec<E> {
        self.read(|c| {
            c.collections
                .get(user_id)
                .map(|data| E::collection(data).values().cloned().collect())
                .unwrap_or_default()
        })
    }

    /// Insert new items. Fails without inserting anything if an id is taken.
    pub fn insert<E: Stored>(&self, user_id: &str, items: Vec<E>) -> Result<Vec<E>> {
        self.write(|c| {
            let collection = E::collection_mut(c.collections.entry(user_id.to_string()).or_default());

            let mut seen = std::collections::HashSet::new();
            if let Some(item) = items
                .iter()
                .find(|i| collection.contains_key(&i.id()) || !seen.insert(i.id()))
            {
                return Err(CoreError::Validation(format!(
                    "A {} with id {} already exists",
                    E::KIND,
                    item.id()
                ))
                .into());
            }

            for item in &items {
                collection.insert(item.id(), item.clone());
            }
            Ok(items)
        })
    }

    /// Shallow-merge `patch` into the stored item. `None` if there is no such item.
    pub fn update<E: Stored>(&self, user_id: &str, id: EntityId, patch: Value) -> Result<Option<E>> {
        let Value::Object(patch) = patch else {
            return Err(CoreError::Validation("Update body must be a JSON object".into()).into());
        };

        self.write(|c| {
            let Some(existing) = c
                .collections
                .get_mut(user_id)
                .and_then(|data| E::collection_mut(data).get_mut(&id))
            else {
                return Ok(None);
            };

            let mut merged = serde_json::to_value(&*existing)?;
            if let Value::Object(fields) = &mut merged {
                fields.extend(patch);
                fields.insert("id".to_string(), serde_json::to_value(id)?);
            }
            let updated: E = serde_json::from_value(merged)
                .map_err(|e| CoreError::Validation(format!("Invalid {}: {e}", E::KIND)))?;

            *existing = updated.clone();
            Ok(Some(updated))
        })
    }

    /// Returns whether the item existed.
    pub fn delete<E: Stored>(&self, user_id: &str, id: EntityId) -> Result<bool> {
        self.delete_many::<E>(user_id, &[id]).map(|n| n > 0)
    }

    /// Returns how many items were deleted.
    pub fn delete_many<E: Stored>(&self, user_id: &str, ids: &[EntityId]) -> Result<usize> {
        self.write(|c| {
            let Some(data) = c.collections.get_mut(user_id) else {
                return Ok(0);
            };
            let collection = E::collection_mut(data);
            Ok(ids.iter().filter(|id| collection.remove(id).is_some()).count())
        })
    }

    pub fn user(&self, user_id: &str) -> Option<User> {
        self.read(|c| c.users.get(user_id).cloned())
    }

    /// Create the user on first sign-in; afterwards only a non-empty name
    /// and photo are updated.
    pub fn upsert_user(&self, user_id: &str, profile: UserProfile) -> Result<User> {
        self.write(|c| {
            let now = Utc::now();

            if let Some(user) = c.users.get_mut(user_id) {
                if let Some(name) = profile.name.filter(|n| !n.is_empty()) {
                    user.name = Some(name);
                }
                if let Some(photo_url) = profile.photo_url.filter(|p| !p.is_empty()) {
                    user.photo_url = Some(photo_url);
                }
                user.updated_at = now;
                return Ok(user.clone());
            }

            if !profile.email.is_empty()
                && c.users.values().any(|u| u.email == profile.email)
            {
                return Err(CoreError::Validation(format!(
                    "Email {} is already registered",
                    profile.email
                ))
                .into());
            }

            let user = User {
                id: user_id.to_string(),
                email: profile.email,
                name: profile.name,
                photo_url: profile.photo_url,
                created_at: now,
                updated_at: now,
            };
            c.users.insert(user_id.to_string(), user.clone());
            Ok(user)
        })
    }
}
