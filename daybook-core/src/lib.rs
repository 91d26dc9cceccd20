//! Core library for daybook.
//!
//! Provides the calendar and schedule model, the local mirror used while
//! signed out, the HTTP gateway used while signed in, and the sync layer
//! that keeps an in-memory view of both collections in step with them:
//! - `sync` for actions, the dispatcher and the store
//! - `holiday` for regional holiday calendars and their reconciler

pub mod client_config;
pub mod entity;
pub mod error;
pub mod holiday;
pub mod mirror;
pub mod remote;
pub mod sync;

#[cfg(test)]
pub(crate) mod test_support;

pub use client_config::ClientConfig;
pub use error::{CoreError, CoreResult};
