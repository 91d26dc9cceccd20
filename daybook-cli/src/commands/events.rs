use anyhow::Result;
use chrono::Local;
use owo_colors::OwoColorize;

use daybook_core::entity::{EntityId, Schedule};

use super::resolve_calendar;
use crate::app::App;
use crate::input::{day_label, day_of};
use crate::render::{Render, swatch};
use crate::utils::tui;

pub async fn run(app: &mut App, calendar: Option<&str>) -> Result<()> {
    // Holiday schedules only live in memory, rebuild them first
    if app.store.calendars().iter().any(|c| c.is_holiday()) {
        let spinner = tui::create_spinner("Loading holidays".to_string());
        let added = app.reconciler.rehydrate(&mut app.store, &app.ctx).await;
        spinner.finish_and_clear();
        let added = added?;
        tracing::debug!(added, "rehydrated holiday schedules");
    }

    let visible: Vec<EntityId> = match calendar {
        Some(query) => vec![resolve_calendar(&app.store, query)?.id],
        None => app
            .store
            .calendars()
            .iter()
            .filter(|c| c.selected)
            .map(|c| c.id)
            .collect(),
    };

    let mut schedules: Vec<&Schedule> = app
        .store
        .schedules()
        .iter()
        .filter(|s| visible.contains(&s.calendar_id))
        .collect();
    // Compact dates sort chronologically as strings; all-day (-1) first
    schedules.sort_by(|a, b| {
        (&a.date_time.date, a.date_time.time.start).cmp(&(&b.date_time.date, b.date_time.time.start))
    });

    if schedules.is_empty() {
        println!("{}", "No events found".dimmed());
        return Ok(());
    }

    let today = Local::now().date_naive();
    let mut current_date: Option<&str> = None;

    for schedule in schedules {
        if current_date != Some(schedule.date_time.date.as_str()) {
            if current_date.is_some() {
                println!();
            }
            let label = day_of(&schedule.date_time.date)
                .map(|day| day_label(day, today))
                .unwrap_or_else(|| schedule.date_time.date.clone());
            println!("{}", label.bold());
            current_date = Some(schedule.date_time.date.as_str());
        }

        let color = schedule
            .color_option
            .as_ref()
            .or_else(|| app.store.calendar(schedule.calendar_id).map(|c| &c.color_option));
        let dot = color.map(swatch).unwrap_or_else(|| " ".to_string());
        println!("  {} {}", dot, schedule.render());
    }

    Ok(())
}
