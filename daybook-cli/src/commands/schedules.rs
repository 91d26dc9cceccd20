use anyhow::{Result, anyhow, bail};
use owo_colors::OwoColorize;

use daybook_core::entity::{DateTimeInputs, EntityId, Schedule, ScheduleType};
use daybook_core::sync::Action;

use super::resolve_calendar;
use crate::app::App;
use crate::input::{parse_date, parse_time_range};
use crate::render::Render;

/// Arguments of `daybook add`.
pub struct NewSchedule {
    pub title: String,
    pub date: String,
    pub start: Option<String>,
    pub end: Option<String>,
    pub calendar: Option<String>,
    pub task: bool,
    pub location: Option<String>,
}

pub fn add(app: &mut App, new: NewSchedule) -> Result<()> {
    let title = new.title.trim();
    if title.is_empty() {
        bail!("Title must not be empty");
    }
    let date = parse_date(&new.date)?;
    let time = parse_time_range(new.start.as_deref(), new.end.as_deref())?;

    let calendar = match new.calendar.as_deref() {
        Some(query) => resolve_calendar(&app.store, query)?,
        None => app
            .store
            .calendars()
            .iter()
            .find(|c| !c.removable && !c.is_holiday())
            .or_else(|| app.store.calendars().iter().find(|c| !c.is_holiday()))
            .ok_or_else(|| anyhow!("No calendar to add to, create one with `daybook calendar add`"))?,
    };
    if calendar.is_holiday() {
        bail!("Holiday calendars are read-only");
    }

    let schedule_type = if new.task { ScheduleType::Task } else { ScheduleType::Event };
    let schedule = Schedule {
        id: EntityId::generate(),
        title: title.to_string(),
        description: String::new(),
        calendar_id: calendar.id,
        calendar_type: calendar.calendar_type,
        date_time: DateTimeInputs {
            all_day: time.is_unset(),
            once: true,
            date,
            time,
        },
        schedule_type,
        is_external: false,
        location: new.location.filter(|l| !l.trim().is_empty()),
        color_option: None,
        completed: new.task.then_some(false),
    };

    println!("{} {}", "+".green(), schedule.render());
    app.store.dispatch_schedules(&app.ctx, Action::add(schedule))?;
    Ok(())
}

fn find(app: &App, id: &str) -> Result<Schedule> {
    let id = EntityId::parse(id)?;
    app.store
        .schedule(id)
        .cloned()
        .ok_or_else(|| anyhow!("No event or task with id {id}"))
}

pub fn complete(app: &mut App, id: &str) -> Result<()> {
    let mut schedule = find(app, id)?;
    if schedule.schedule_type != ScheduleType::Task {
        bail!("'{}' is an event, only tasks can be completed", schedule.title);
    }
    if schedule.completed == Some(true) {
        println!("{}", "Already completed".dimmed());
        return Ok(());
    }

    schedule.completed = Some(true);
    println!("{} {}", "~".yellow(), schedule.render());
    app.store.dispatch_schedules(&app.ctx, Action::Edit(schedule))?;
    Ok(())
}

pub fn remove(app: &mut App, id: &str) -> Result<()> {
    let schedule = find(app, id)?;
    if schedule.is_external {
        bail!("Holidays cannot be removed one by one, deselect the region instead");
    }

    println!("{} {}", "-".red(), schedule.render());
    app.store
        .dispatch_schedules(&app.ctx, Action::Remove { id: schedule.id })?;
    Ok(())
}
