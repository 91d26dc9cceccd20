//! Calendar and schedule entities.
//!
//! Both entity kinds are scoped to a single user and identified by an
//! integer id that the client generates itself, so the same id is valid in
//! the local mirror and in the cloud without a round-trip.

mod calendar;
mod color;
mod schedule;

pub use calendar::{Calendar, CalendarType};
pub use color::ColorOption;
pub use schedule::{DateTimeInputs, Schedule, ScheduleType, TimeRange};

use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

static LAST_GENERATED_ID: AtomicI64 = AtomicI64::new(0);

/// Identifier of a calendar or schedule, unique per (user, kind).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct EntityId(i64);

impl EntityId {
    pub fn new(value: i64) -> CoreResult<Self> {
        if value <= 0 {
            return Err(CoreError::Validation(format!(
                "Malformed id '{value}': ids must be positive"
            )));
        }
        Ok(EntityId(value))
    }

    /// Parse an id from user or URL input.
    pub fn parse(s: &str) -> CoreResult<Self> {
        let value = s
            .trim()
            .parse::<i64>()
            .map_err(|_| CoreError::Validation(format!("Malformed id '{s}'")))?;
        Self::new(value)
    }

    /// Generate a fresh id from the current time in microseconds.
    ///
    /// Ids are strictly increasing within the process, so two entities
    /// created in the same microsecond still get distinct ids.
    pub fn generate() -> Self {
        let now = chrono::Utc::now().timestamp_micros();
        let previous = LAST_GENERATED_ID
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(now.max(last + 1))
            })
            .unwrap_or(now);
        EntityId(now.max(previous + 1))
    }

    pub fn value(self) -> i64 {
        self.0
    }
}

impl TryFrom<i64> for EntityId {
    type Error = CoreError;

    fn try_from(value: i64) -> CoreResult<Self> {
        EntityId::new(value)
    }
}

impl From<EntityId> for i64 {
    fn from(id: EntityId) -> i64 {
        id.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The two entity collections a user owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Calendar,
    Schedule,
}

impl EntityKind {
    /// Collection name, used for REST paths and local mirror keys.
    pub fn collection(self) -> &'static str {
        match self {
            EntityKind::Calendar => "calendars",
            EntityKind::Schedule => "schedules",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Calendar => write!(f, "calendar"),
            EntityKind::Schedule => write!(f, "schedule"),
        }
    }
}

/// An item of one of the user's collections.
pub trait Entity: Clone + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static {
    const KIND: EntityKind;

    fn id(&self) -> EntityId;
}

impl Entity for Calendar {
    const KIND: EntityKind = EntityKind::Calendar;

    fn id(&self) -> EntityId {
        self.id
    }
}

impl Entity for Schedule {
    const KIND: EntityKind = EntityKind::Schedule;

    fn id(&self) -> EntityId {
        self.id
    }
}
