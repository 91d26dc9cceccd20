//! Local mirror of the user's collections.
//!
//! A key-namespaced store that keeps one JSON document per key under a data
//! directory. It backs the collections whenever no authenticated user is
//! available. All operations are synchronous.

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::entity::{Entity, EntityId};
use crate::error::{CoreError, CoreResult};

#[derive(Debug, Clone)]
pub struct LocalMirror {
    root: PathBuf,
}

impl LocalMirror {
    pub fn open(root: impl Into<PathBuf>) -> CoreResult<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(LocalMirror { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path(&self, key: &str) -> CoreResult<PathBuf> {
        if key.is_empty() || key.contains(['/', '\\']) || key.starts_with('.') {
            return Err(CoreError::Validation(format!("Invalid mirror key '{key}'")));
        }
        Ok(self.root.join(format!("{key}.json")))
    }

    /// Read any value stored under `key`; `None` when the key is absent.
    pub fn get_value<T: DeserializeOwned>(&self, key: &str) -> CoreResult<Option<T>> {
        let path = self.path(key)?;
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    pub fn set_value<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> CoreResult<()> {
        let path = self.path(key)?;
        let temp = path.with_extension("json.tmp");
        let content = serde_json::to_string_pretty(value)?;

        std::fs::write(&temp, content)?;
        std::fs::rename(&temp, &path)?;
        Ok(())
    }

    /// Stored collection under `key`. An absent key is `None`, not an empty list.
    pub fn get<E: Entity>(&self, key: &str) -> CoreResult<Option<Vec<E>>> {
        self.get_value(key)
    }

    /// Delete the key entirely.
    pub fn remove(&self, key: &str) -> CoreResult<()> {
        let path = self.path(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn append<E: Entity>(&self, key: &str, item: &E) -> CoreResult<()> {
        self.append_bulk(key, std::slice::from_ref(item))
    }

    pub fn append_bulk<E: Entity>(&self, key: &str, items: &[E]) -> CoreResult<()> {
        let mut stored: Vec<E> = self.get(key)?.unwrap_or_default();
        stored.extend_from_slice(items);
        self.set_value(key, &stored)
    }

    /// Replace the stored item with the same id. A missing key is left alone.
    pub fn edit<E: Entity>(&self, key: &str, item: &E) -> CoreResult<()> {
        let Some(mut stored) = self.get::<E>(key)? else {
            return Ok(());
        };
        for existing in stored.iter_mut().filter(|e| e.id() == item.id()) {
            *existing = item.clone();
        }
        self.set_value(key, &stored)
    }

    pub fn remove_by_id<E: Entity>(&self, key: &str, id: EntityId) -> CoreResult<()> {
        self.remove_by_ids::<E>(key, &[id])
    }

    pub fn remove_by_ids<E: Entity>(&self, key: &str, ids: &[EntityId]) -> CoreResult<()> {
        let Some(mut stored) = self.get::<E>(key)? else {
            return Ok(());
        };
        stored.retain(|e| !ids.contains(&e.id()));
        self.set_value(key, &stored)
    }
}
