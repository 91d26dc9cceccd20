//! Fakes shared by the unit tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::entity::{
    Calendar, CalendarType, DateTimeInputs, Entity, EntityId, EntityKind, Schedule, ScheduleType,
    TimeRange,
};
use crate::error::{CoreError, CoreResult};
use crate::holiday::{
    ExternalCalendar, ExternalDate, ExternalEvent, ExternalOrganizer, HolidaySource,
};
use crate::mirror::LocalMirror;
use crate::remote::{Gateway, RemoteCall, require_user};
use crate::sync::{RemoteOp, Store};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RecordedCall {
    pub kind: EntityKind,
    pub op: RemoteOp,
    pub user_id: String,
    pub ids: Vec<EntityId>,
}

/// Remote writes in the order they were issued, shared across gateways.
#[derive(Debug, Clone, Default)]
pub(crate) struct CallLog(Arc<Mutex<Vec<RecordedCall>>>);

impl CallLog {
    fn push(&self, call: RecordedCall) {
        self.0.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.0.lock().unwrap().clone()
    }

    pub fn ops(&self) -> Vec<RemoteOp> {
        self.calls().into_iter().map(|c| c.op).collect()
    }
}

/// Gateway that records writes when they are issued and answers from memory.
pub(crate) struct RecordingGateway<E> {
    log: CallLog,
    listed: Vec<E>,
    fail_with: Option<u16>,
}

impl<E: Entity> RecordingGateway<E> {
    pub fn new(log: CallLog) -> Self {
        RecordingGateway {
            log,
            listed: Vec::new(),
            fail_with: None,
        }
    }

    pub fn with_items(mut self, items: Vec<E>) -> Self {
        self.listed = items;
        self
    }

    /// Every call settles with this HTTP status.
    pub fn failing(mut self, status: u16) -> Self {
        self.fail_with = Some(status);
        self
    }

    fn record(&self, user_id: &str, op: RemoteOp, ids: Vec<EntityId>) -> CoreResult<()> {
        require_user(user_id)?;
        self.log.push(RecordedCall {
            kind: E::KIND,
            op,
            user_id: user_id.to_string(),
            ids,
        });
        Ok(())
    }

    fn respond<T: Send + 'static>(&self, value: T) -> RemoteCall<T> {
        let fail_with = self.fail_with;
        Box::pin(async move {
            match fail_with {
                Some(status) => Err(CoreError::Status {
                    status,
                    message: "recorded failure".to_string(),
                }),
                None => Ok(value),
            }
        })
    }
}

impl<E: Entity> Gateway<E> for RecordingGateway<E> {
    fn list(&self, user_id: &str) -> CoreResult<RemoteCall<Vec<E>>> {
        require_user(user_id)?;
        Ok(self.respond(self.listed.clone()))
    }

    fn create(&self, user_id: &str, entity: &E) -> CoreResult<RemoteCall<E>> {
        self.record(user_id, RemoteOp::Create, vec![entity.id()])?;
        Ok(self.respond(entity.clone()))
    }

    fn create_multiple(&self, user_id: &str, entities: &[E]) -> CoreResult<RemoteCall<Vec<E>>> {
        let ids = entities.iter().map(Entity::id).collect();
        self.record(user_id, RemoteOp::CreateMultiple, ids)?;
        Ok(self.respond(entities.to_vec()))
    }

    fn update(&self, user_id: &str, id: EntityId, entity: &E) -> CoreResult<RemoteCall<E>> {
        self.record(user_id, RemoteOp::Update, vec![id])?;
        Ok(self.respond(entity.clone()))
    }

    fn delete(&self, user_id: &str, id: EntityId) -> CoreResult<RemoteCall<()>> {
        self.record(user_id, RemoteOp::Delete, vec![id])?;
        Ok(self.respond(()))
    }

    fn delete_multiple(&self, user_id: &str, ids: &[EntityId]) -> CoreResult<RemoteCall<()>> {
        self.record(user_id, RemoteOp::DeleteMultiple, ids.to_vec())?;
        Ok(self.respond(()))
    }
}

/// A store over a fresh mirror directory, with recording gateways that list
/// the given items.
pub(crate) fn make_test_store(
    calendars: Vec<Calendar>,
    schedules: Vec<Schedule>,
) -> (tempfile::TempDir, Store, CallLog) {
    let dir = tempfile::tempdir().unwrap();
    let mirror = LocalMirror::open(dir.path()).unwrap();
    let log = CallLog::default();
    let store = Store::new(
        mirror,
        Arc::new(RecordingGateway::new(log.clone()).with_items(calendars)),
        Arc::new(RecordingGateway::new(log.clone()).with_items(schedules)),
    );
    (dir, store, log)
}

pub(crate) fn make_test_schedule(title: &str, calendar_id: EntityId) -> Schedule {
    Schedule {
        id: EntityId::generate(),
        title: title.to_string(),
        description: String::new(),
        calendar_id,
        calendar_type: CalendarType::Default,
        date_time: DateTimeInputs {
            all_day: false,
            once: true,
            date: "20240704".to_string(),
            time: TimeRange {
                start: 540,
                end: 570,
            },
        },
        schedule_type: ScheduleType::Event,
        is_external: false,
        location: None,
        color_option: None,
        completed: None,
    }
}

/// Holiday payload with one event per `(summary, date)`.
pub(crate) fn make_holiday_payload(summary: &str, events: &[(&str, Option<&str>)]) -> ExternalCalendar {
    ExternalCalendar {
        summary: Some(summary.to_string()),
        description: Some(format!("{summary} and observances")),
        time_zone: Some("UTC".to_string()),
        items: events
            .iter()
            .map(|(title, date)| ExternalEvent {
                summary: Some(title.to_string()),
                description: None,
                start: Some(ExternalDate {
                    date: date.map(String::from),
                }),
                organizer: Some(ExternalOrganizer {
                    display_name: Some(summary.to_string()),
                }),
            })
            .collect(),
    }
}

/// Holiday source answering from a fixed map and recording each fetch.
#[derive(Default)]
pub(crate) struct FakeHolidaySource {
    calendars: HashMap<String, ExternalCalendar>,
    fetched: Mutex<Vec<String>>,
}

impl FakeHolidaySource {
    pub fn with_region(mut self, region: &str, calendar: ExternalCalendar) -> Self {
        self.calendars.insert(region.to_string(), calendar);
        self
    }

    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }
}

impl HolidaySource for FakeHolidaySource {
    fn fetch_by_region(&self, region: &str) -> RemoteCall<ExternalCalendar> {
        self.fetched.lock().unwrap().push(region.to_string());
        let result = self.calendars.get(region).cloned().ok_or_else(|| {
            CoreError::HolidaySource(region.to_string(), "Server responded with 404".to_string())
        });
        Box::pin(async move { result })
    }
}
