//! Cloud persistence for the user's collections.
//!
//! A gateway call has two phases. Building it validates the input and
//! fails synchronously. The returned future owns everything it needs, so
//! it can be awaited directly or spawned.

mod auth;
mod http;

pub use auth::{AuthApi, User, UserProfile};
pub use http::HttpGateway;
pub(crate) use http::read_json;

use futures::future::BoxFuture;

use crate::entity::{Entity, EntityId};
use crate::error::{CoreError, CoreResult};

/// Header carrying the authenticated user's identifier.
pub const USER_HEADER: &str = "x-user-id";

/// A remote call that has been validated but not yet sent.
pub type RemoteCall<T> = BoxFuture<'static, CoreResult<T>>;

/// Typed CRUD client for one entity kind.
pub trait Gateway<E: Entity>: Send + Sync {
    fn list(&self, user_id: &str) -> CoreResult<RemoteCall<Vec<E>>>;

    fn create(&self, user_id: &str, entity: &E) -> CoreResult<RemoteCall<E>>;

    fn create_multiple(&self, user_id: &str, entities: &[E]) -> CoreResult<RemoteCall<Vec<E>>>;

    fn update(&self, user_id: &str, id: EntityId, entity: &E) -> CoreResult<RemoteCall<E>>;

    fn delete(&self, user_id: &str, id: EntityId) -> CoreResult<RemoteCall<()>>;

    fn delete_multiple(&self, user_id: &str, ids: &[EntityId]) -> CoreResult<RemoteCall<()>>;
}

pub(crate) fn require_user(user_id: &str) -> CoreResult<()> {
    if user_id.trim().is_empty() {
        return Err(CoreError::Validation("User ID is required".into()));
    }
    Ok(())
}
