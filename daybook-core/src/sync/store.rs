use std::sync::Arc;

use tokio::sync::broadcast;

use super::action::Action;
use super::context::SyncContext;
use super::dispatcher::Dispatcher;
use super::outcome::SyncOutcome;
use crate::entity::{Calendar, CalendarType, ColorOption, EntityId, EntityKind, Schedule};
use crate::error::{CoreError, CoreResult};
use crate::mirror::LocalMirror;
use crate::remote::Gateway;

const OUTCOME_CAPACITY: usize = 64;

/// The in-memory calendars and schedules, plus a dispatcher for each.
pub struct Store {
    calendars: Vec<Calendar>,
    schedules: Vec<Schedule>,
    mirror: LocalMirror,
    calendar_gateway: Arc<dyn Gateway<Calendar>>,
    schedule_gateway: Arc<dyn Gateway<Schedule>>,
    calendar_dispatcher: Dispatcher<Calendar>,
    schedule_dispatcher: Dispatcher<Schedule>,
    outcomes: broadcast::Sender<SyncOutcome>,
}

impl Store {
    pub fn new(
        mirror: LocalMirror,
        calendar_gateway: Arc<dyn Gateway<Calendar>>,
        schedule_gateway: Arc<dyn Gateway<Schedule>>,
    ) -> Self {
        let (outcomes, _) = broadcast::channel(OUTCOME_CAPACITY);
        Store {
            calendars: Vec::new(),
            schedules: Vec::new(),
            calendar_dispatcher: Dispatcher::new(
                mirror.clone(),
                calendar_gateway.clone(),
                outcomes.clone(),
            ),
            schedule_dispatcher: Dispatcher::new(
                mirror.clone(),
                schedule_gateway.clone(),
                outcomes.clone(),
            ),
            mirror,
            calendar_gateway,
            schedule_gateway,
            outcomes,
        }
    }

    pub fn calendars(&self) -> &[Calendar] {
        &self.calendars
    }

    pub fn schedules(&self) -> &[Schedule] {
        &self.schedules
    }

    pub fn calendar(&self, id: EntityId) -> Option<&Calendar> {
        self.calendars.iter().find(|c| c.id == id)
    }

    pub fn schedule(&self, id: EntityId) -> Option<&Schedule> {
        self.schedules.iter().find(|s| s.id == id)
    }

    pub fn schedules_of(&self, calendar_id: EntityId) -> impl Iterator<Item = &Schedule> {
        self.schedules.iter().filter(move |s| s.calendar_id == calendar_id)
    }

    pub fn dispatch_calendars(&mut self, ctx: &SyncContext, action: Action<Calendar>) -> CoreResult<()> {
        self.calendars = self.calendar_dispatcher.execute(ctx, &self.calendars, action)?;
        Ok(())
    }

    pub fn dispatch_schedules(&mut self, ctx: &SyncContext, action: Action<Schedule>) -> CoreResult<()> {
        self.schedules = self.schedule_dispatcher.execute(ctx, &self.schedules, action)?;
        Ok(())
    }

    /// Populate both collections from the backing store of `ctx`: the
    /// server when signed in, the local mirror otherwise.
    pub async fn load(&mut self, ctx: &SyncContext) -> CoreResult<()> {
        let (calendars, schedules) = match ctx.user_id() {
            Some(user_id) => {
                let calendars = self.calendar_gateway.list(user_id)?.await?;
                let schedules = self.schedule_gateway.list(user_id)?.await?;
                (calendars, schedules)
            }
            None => (
                self.mirror
                    .get(&ctx.collection_key(EntityKind::Calendar))?
                    .unwrap_or_default(),
                self.mirror
                    .get(&ctx.collection_key(EntityKind::Schedule))?
                    .unwrap_or_default(),
            ),
        };
        tracing::debug!(
            calendars = calendars.len(),
            schedules = schedules.len(),
            authenticated = ctx.is_authenticated(),
            "loaded store"
        );

        self.dispatch_calendars(ctx, Action::ReplaceAll(calendars))?;
        self.dispatch_schedules(ctx, Action::ReplaceAll(schedules))
    }

    /// Make sure the user has a non-removable default calendar. Returns the
    /// id of the calendar created, if any.
    pub fn ensure_default_calendar(&mut self, ctx: &SyncContext, name: &str) -> CoreResult<Option<EntityId>> {
        if self
            .calendars
            .iter()
            .any(|c| c.calendar_type == CalendarType::Default && !c.removable)
        {
            return Ok(None);
        }

        let mut calendar = Calendar::new(name, ColorOption::default());
        calendar.removable = false;
        let id = calendar.id;
        self.dispatch_calendars(ctx, Action::add(calendar))?;
        Ok(Some(id))
    }

    /// Remove a calendar together with all of its schedules, schedules
    /// first. Returns how many schedules were removed.
    pub fn remove_calendar(&mut self, ctx: &SyncContext, id: EntityId) -> CoreResult<usize> {
        let calendar = self
            .calendar(id)
            .ok_or_else(|| CoreError::Validation(format!("No calendar with id {id}")))?;
        if !calendar.removable {
            return Err(CoreError::Validation(format!(
                "Calendar '{}' cannot be removed",
                calendar.name
            )));
        }

        let schedule_ids: Vec<EntityId> = self.schedules_of(id).map(|s| s.id).collect();
        let removed = schedule_ids.len();

        self.dispatch_schedules(ctx, Action::RemoveMultiple(schedule_ids))?;
        self.dispatch_calendars(ctx, Action::Remove { id })?;
        Ok(removed)
    }

    /// Outcomes of remote writes issued from now on, for both collections.
    pub fn subscribe(&self) -> broadcast::Receiver<SyncOutcome> {
        self.outcomes.subscribe()
    }

    /// Wait for all in-flight remote writes.
    pub async fn settle(&self) {
        self.calendar_dispatcher.settle().await;
        self.schedule_dispatcher.settle().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::outcome::RemoteOp;
    use crate::test_support::{make_test_schedule, make_test_store};

    #[tokio::test]
    async fn test_load_anonymous_reads_mirror() {
        let (dir, mut store, _log) = make_test_store(vec![], vec![]);
        let ctx = SyncContext::anonymous("daybook");
        let work = Calendar::new("Work", ColorOption::default());
        let mirror = LocalMirror::open(dir.path()).unwrap();
        mirror.append("daybook_calendars", &work).unwrap();

        store.load(&ctx).await.unwrap();

        assert_eq!(store.calendars(), &[work]);
        assert!(store.schedules().is_empty());
    }

    #[tokio::test]
    async fn test_load_signed_in_reads_gateway() {
        let work = Calendar::new("Work", ColorOption::default());
        let standup = make_test_schedule("Standup", work.id);
        let (_dir, mut store, _log) = make_test_store(vec![work.clone()], vec![standup.clone()]);

        store.load(&SyncContext::authenticated("daybook", "uid-1")).await.unwrap();

        assert_eq!(store.calendars(), &[work]);
        assert_eq!(store.schedules(), &[standup]);
    }

    #[test]
    fn test_ensure_default_calendar_is_idempotent() {
        let (_dir, mut store, _log) = make_test_store(vec![], vec![]);
        let ctx = SyncContext::anonymous("daybook");

        let created = store.ensure_default_calendar(&ctx, "Personal").unwrap();
        assert!(created.is_some());
        assert_eq!(store.ensure_default_calendar(&ctx, "Personal").unwrap(), None);

        assert_eq!(store.calendars().len(), 1);
        let default = store.calendars()[0].clone();
        assert!(!default.removable);
        assert!(matches!(
            store.remove_calendar(&ctx, default.id),
            Err(CoreError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_remove_calendar_cascades_schedules_first() {
        let work = Calendar::new("Work", ColorOption::default());
        let home = Calendar::new("Home", ColorOption::default());
        let schedules = vec![
            make_test_schedule("Standup", work.id),
            make_test_schedule("Laundry", home.id),
            make_test_schedule("Review", work.id),
        ];
        let (_dir, mut store, log) = make_test_store(vec![], vec![]);
        let ctx = SyncContext::authenticated("daybook", "uid-1");
        store
            .dispatch_calendars(&ctx, Action::ReplaceAll(vec![work.clone(), home.clone()]))
            .unwrap();
        store
            .dispatch_schedules(&ctx, Action::ReplaceAll(schedules.clone()))
            .unwrap();

        let removed = store.remove_calendar(&ctx, work.id).unwrap();
        store.settle().await;

        assert_eq!(removed, 2);
        assert_eq!(store.calendars(), &[home]);
        assert_eq!(store.schedules(), &[schedules[1].clone()]);

        let calls = log.calls();
        assert_eq!(log.ops(), vec![RemoteOp::DeleteMultiple, RemoteOp::Delete]);
        assert_eq!(calls[0].kind, EntityKind::Schedule);
        assert_eq!(calls[0].ids, vec![schedules[0].id, schedules[2].id]);
        assert_eq!(calls[1].kind, EntityKind::Calendar);
    }

    #[test]
    fn test_remove_unknown_calendar() {
        let (_dir, mut store, _log) = make_test_store(vec![], vec![]);
        let result = store.remove_calendar(&SyncContext::anonymous("daybook"), EntityId::new(9).unwrap());
        assert!(matches!(result, Err(CoreError::Validation(_))));
    }
}
