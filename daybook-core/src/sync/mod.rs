//! Keeping the in-memory view, the local mirror and the server in step.

mod action;
mod context;
mod dispatcher;
mod outcome;
mod store;

pub use action::{Action, StorageTarget};
pub use context::{AuthResolver, Session, SyncContext};
pub use dispatcher::Dispatcher;
pub use outcome::{RemoteOp, SyncOutcome};
pub use store::Store;
