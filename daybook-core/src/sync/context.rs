//! Who is syncing, and under which namespace.

use crate::entity::EntityKind;
use crate::error::{CoreError, CoreResult};
use crate::mirror::LocalMirror;

/// Synchronous lookup of the currently authenticated user.
pub trait AuthResolver {
    fn authenticated_user(&self) -> Option<String>;
}

/// Everything a dispatch needs to know about the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncContext {
    namespace: String,
    user_id: Option<String>,
}

impl SyncContext {
    pub fn anonymous(namespace: &str) -> Self {
        SyncContext {
            namespace: namespace.to_string(),
            user_id: None,
        }
    }

    pub fn authenticated(namespace: &str, user_id: &str) -> Self {
        SyncContext {
            namespace: namespace.to_string(),
            user_id: Some(user_id.to_string()),
        }
    }

    pub fn resolve(namespace: &str, resolver: &dyn AuthResolver) -> Self {
        SyncContext {
            namespace: namespace.to_string(),
            user_id: resolver.authenticated_user(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user_id.is_some()
    }

    /// Local mirror key of a collection: `{namespace}_{collection}`.
    pub fn collection_key(&self, kind: EntityKind) -> String {
        format!("{}_{}", self.namespace, kind.collection())
    }
}

/// The signed-in user, remembered in the local mirror.
pub struct Session {
    mirror: LocalMirror,
    namespace: String,
}

impl Session {
    pub fn new(mirror: LocalMirror, namespace: &str) -> Self {
        Session {
            mirror,
            namespace: namespace.to_string(),
        }
    }

    fn key(&self) -> String {
        format!("{}_authenticatedUserId", self.namespace)
    }

    pub fn sign_in(&self, user_id: &str) -> CoreResult<()> {
        if user_id.trim().is_empty() {
            return Err(CoreError::Validation("User ID is required".into()));
        }
        self.mirror.set_value(&self.key(), user_id)
    }

    pub fn sign_out(&self) -> CoreResult<()> {
        self.mirror.remove(&self.key())
    }

    pub fn context(&self) -> SyncContext {
        SyncContext::resolve(&self.namespace, self)
    }
}

impl AuthResolver for Session {
    fn authenticated_user(&self) -> Option<String> {
        match self.mirror.get_value::<String>(&self.key()) {
            Ok(user_id) => user_id.filter(|id| !id.is_empty()),
            Err(e) => {
                tracing::warn!(error = %e, "could not read session, continuing signed out");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityKind;

    #[test]
    fn test_collection_key() {
        let ctx = SyncContext::anonymous("daybook");
        assert_eq!(ctx.collection_key(EntityKind::Calendar), "daybook_calendars");
        assert_eq!(ctx.collection_key(EntityKind::Schedule), "daybook_schedules");
    }

    #[test]
    fn test_session_sign_in_and_out() {
        let dir = tempfile::tempdir().unwrap();
        let mirror = LocalMirror::open(dir.path()).unwrap();
        let session = Session::new(mirror, "daybook");

        assert!(!session.context().is_authenticated());

        session.sign_in("uid-123").unwrap();
        assert_eq!(session.context().user_id(), Some("uid-123"));

        session.sign_out().unwrap();
        assert_eq!(session.context(), SyncContext::anonymous("daybook"));

        assert!(matches!(session.sign_in(""), Err(CoreError::Validation(_))));
    }
}
