//! Applies actions to one collection.
//!
//! `execute` returns the new in-memory view right away. Durable writes go
//! to exactly one backing store: the remote gateway when a user is signed
//! in, the local mirror otherwise. Edit is the exception and always writes
//! the mirror as well. Remote writes run in the background; their results
//! are only logged and published as [`SyncOutcome`]s, never rolled back.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::runtime::Handle;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use super::action::Action;
use super::context::SyncContext;
use super::outcome::{RemoteOp, SyncOutcome};
use crate::entity::{Entity, EntityId};
use crate::error::{CoreError, CoreResult};
use crate::mirror::LocalMirror;
use crate::remote::{Gateway, RemoteCall};

pub struct Dispatcher<E: Entity> {
    mirror: LocalMirror,
    gateway: Arc<dyn Gateway<E>>,
    outcomes: broadcast::Sender<SyncOutcome>,
    in_flight: Mutex<Vec<JoinHandle<()>>>,
}

impl<E: Entity> Dispatcher<E> {
    pub fn new(
        mirror: LocalMirror,
        gateway: Arc<dyn Gateway<E>>,
        outcomes: broadcast::Sender<SyncOutcome>,
    ) -> Self {
        Dispatcher {
            mirror,
            gateway,
            outcomes,
            in_flight: Mutex::new(Vec::new()),
        }
    }

    /// Apply `action` to `state` and return the new collection.
    ///
    /// Remote writes are spawned on the current Tokio runtime, so this must
    /// be called from within one whenever `ctx` is authenticated.
    pub fn execute(&self, ctx: &SyncContext, state: &[E], action: Action<E>) -> CoreResult<Vec<E>> {
        let key = ctx.collection_key(E::KIND);
        tracing::debug!(kind = %E::KIND, action = action.kind(), %key, "executing action");

        match action {
            Action::Add { item, target } => {
                ensure_new_ids(state, std::slice::from_ref(&item))?;
                if target.updates_storage() {
                    match ctx.user_id() {
                        Some(user_id) => {
                            let call = self.gateway.create(user_id, &item)?;
                            self.spawn(RemoteOp::Create, vec![item.id()], call)?;
                        }
                        None => self.mirror.append(&key, &item)?,
                    }
                }
                Ok(if target.updates_memory() {
                    appended(state, vec![item])
                } else {
                    state.to_vec()
                })
            }

            Action::AddMultiple { items, target } => {
                ensure_new_ids(state, &items)?;
                if target.updates_storage() && !items.is_empty() {
                    match ctx.user_id() {
                        Some(user_id) => {
                            let call = self.gateway.create_multiple(user_id, &items)?;
                            self.spawn(RemoteOp::CreateMultiple, ids_of(&items), call)?;
                        }
                        None => self.mirror.append_bulk(&key, &items)?,
                    }
                }
                Ok(if target.updates_memory() {
                    appended(state, items)
                } else {
                    state.to_vec()
                })
            }

            Action::Edit(item) => {
                let id = item.id();
                // Both remote preconditions are checked before the mirror is touched.
                let remote = match ctx.user_id() {
                    Some(user_id) => {
                        let runtime = current_runtime()?;
                        Some((runtime, self.gateway.update(user_id, id, &item)?))
                    }
                    None => None,
                };
                // Mirror is written whether or not a user is signed in.
                self.mirror.edit(&key, &item)?;
                if let Some((runtime, call)) = remote {
                    self.spawn_on(&runtime, RemoteOp::Update, vec![id], call);
                }
                Ok(state
                    .iter()
                    .map(|e| if e.id() == id { item.clone() } else { e.clone() })
                    .collect())
            }

            Action::Remove { id } => {
                if !state.iter().any(|e| e.id() == id) {
                    return Ok(state.to_vec());
                }
                let remaining: Vec<E> = state.iter().filter(|e| e.id() != id).cloned().collect();
                match ctx.user_id() {
                    Some(user_id) => {
                        let call = self.gateway.delete(user_id, id)?;
                        self.spawn(RemoteOp::Delete, vec![id], call)?;
                    }
                    None if remaining.is_empty() => self.mirror.remove(&key)?,
                    None => self.mirror.remove_by_id::<E>(&key, id)?,
                }
                Ok(remaining)
            }

            Action::RemoveMultiple(ids) => {
                let remaining: Vec<E> = state
                    .iter()
                    .filter(|e| !ids.contains(&e.id()))
                    .cloned()
                    .collect();
                if !ids.is_empty() {
                    match ctx.user_id() {
                        Some(user_id) => {
                            let call = self.gateway.delete_multiple(user_id, &ids)?;
                            self.spawn(RemoteOp::DeleteMultiple, ids, call)?;
                        }
                        None => self.mirror.remove_by_ids::<E>(&key, &ids)?,
                    }
                }
                Ok(remaining)
            }

            Action::Clear => Ok(Vec::new()),

            Action::ReplaceAll(items) => Ok(items),
        }
    }

    /// A receiver for the outcomes of remote writes issued after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<SyncOutcome> {
        self.outcomes.subscribe()
    }

    /// Wait for every remote write issued so far to settle.
    pub async fn settle(&self) {
        let handles = std::mem::take(&mut *self.in_flight.lock().unwrap_or_else(PoisonError::into_inner));
        for handle in handles {
            if let Err(e) = handle.await {
                tracing::error!(kind = %E::KIND, error = %e, "remote write task aborted");
            }
        }
    }

    fn spawn<T: Send + 'static>(
        &self,
        op: RemoteOp,
        ids: Vec<EntityId>,
        call: RemoteCall<T>,
    ) -> CoreResult<()> {
        self.spawn_on(&current_runtime()?, op, ids, call);
        Ok(())
    }

    fn spawn_on<T: Send + 'static>(
        &self,
        runtime: &Handle,
        op: RemoteOp,
        ids: Vec<EntityId>,
        call: RemoteCall<T>,
    ) {
        let outcomes = self.outcomes.clone();

        let handle = runtime.spawn(async move {
            let error = match call.await {
                Ok(_) => {
                    tracing::debug!(kind = %E::KIND, %op, count = ids.len(), "remote write succeeded");
                    None
                }
                Err(e) => {
                    tracing::warn!(kind = %E::KIND, %op, ?ids, error = %e, "remote write failed");
                    Some(e.to_string())
                }
            };
            // No subscribers is fine
            let _ = outcomes.send(SyncOutcome {
                kind: E::KIND,
                op,
                ids,
                error,
            });
        });

        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        in_flight.retain(|h| !h.is_finished());
        in_flight.push(handle);
    }
}

fn current_runtime() -> CoreResult<Handle> {
    Handle::try_current()
        .map_err(|e| CoreError::Config(format!("Remote writes need a Tokio runtime: {e}")))
}

fn ids_of<E: Entity>(items: &[E]) -> Vec<EntityId> {
    items.iter().map(Entity::id).collect()
}

fn appended<E: Entity>(state: &[E], items: Vec<E>) -> Vec<E> {
    let mut next = Vec::with_capacity(state.len() + items.len());
    next.extend_from_slice(state);
    next.extend(items);
    next
}

/// Ids are never reused within a collection.
fn ensure_new_ids<E: Entity>(state: &[E], items: &[E]) -> CoreResult<()> {
    let mut seen: HashSet<EntityId> = state.iter().map(Entity::id).collect();
    for item in items {
        if !seen.insert(item.id()) {
            return Err(CoreError::Validation(format!(
                "Duplicate {} id {}",
                E::KIND,
                item.id()
            )));
        }
    }
    Ok(())
}
