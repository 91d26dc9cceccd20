use anyhow::{Result, anyhow};
use dialoguer::Confirm;
use owo_colors::OwoColorize;

use daybook_core::entity::{Calendar, ColorOption};
use daybook_core::sync::Action;

use super::resolve_calendar;
use crate::app::App;
use crate::render::{Render, pluralize};

pub fn list(app: &App) -> Result<()> {
    let calendars = app.store.calendars();
    if calendars.is_empty() {
        println!("{}", "No calendars".dimmed());
        return Ok(());
    }

    for calendar in calendars {
        let count = app.store.schedules_of(calendar.id).count();
        println!(
            "{} {}",
            calendar.render(),
            format!("{count} {}", pluralize("schedule", count)).dimmed()
        );
    }
    Ok(())
}

pub fn add(app: &mut App, name: &str, color: Option<&str>) -> Result<()> {
    let name = name.trim();
    if name.is_empty() {
        return Err(anyhow!("Calendar name must not be empty"));
    }
    let color_option = match color {
        Some(color) => ColorOption::named(color).ok_or_else(|| {
            let names: Vec<_> = ColorOption::palette().into_iter().map(|c| c.name).collect();
            anyhow!("Unknown color '{color}'. Available: {}", names.join(", "))
        })?,
        None => ColorOption::random(),
    };

    let calendar = Calendar::new(name, color_option);
    println!("{} {}", "+".green(), calendar.render());
    app.store.dispatch_calendars(&app.ctx, Action::add(calendar))?;
    Ok(())
}

pub fn rename(app: &mut App, query: &str, name: &str) -> Result<()> {
    let mut calendar = resolve_calendar(&app.store, query)?.clone();
    if name.trim().is_empty() {
        return Err(anyhow!("Calendar name must not be empty"));
    }

    calendar.name = name.trim().to_string();
    println!("{} {}", "~".yellow(), calendar.render());
    app.store.dispatch_calendars(&app.ctx, Action::Edit(calendar))?;
    Ok(())
}

/// Remove a calendar together with its schedules.
pub fn remove(app: &mut App, query: &str, force: bool) -> Result<()> {
    let calendar = resolve_calendar(&app.store, query)?.clone();
    if !calendar.removable {
        return Err(anyhow!("Calendar '{}' cannot be removed", calendar.name));
    }
    if calendar.is_holiday() {
        let region = calendar.region.as_deref().unwrap_or_default();
        return Err(anyhow!(
            "'{}' is a holiday calendar, deselect it with `daybook holidays toggle {region}`",
            calendar.name
        ));
    }

    let count = app.store.schedules_of(calendar.id).count();
    if !force && count > 0 {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Remove {} and its {} {}?",
                calendar.name,
                count,
                pluralize("schedule", count)
            ))
            .default(false)
            .interact()?;

        if !confirmed {
            return Ok(());
        }
    }

    let removed = app.store.remove_calendar(&app.ctx, calendar.id)?;
    println!(
        "{} {} {}",
        "-".red(),
        calendar.name,
        format!("({removed} {})", pluralize("schedule", removed)).dimmed()
    );
    Ok(())
}
