//! TUI rendering traits for daybook types.
//!
//! This module provides an extension trait that adds colored terminal
//! rendering to daybook-core types using owo_colors.

use daybook_core::entity::{Calendar, ColorOption, Schedule, ScheduleType};
use daybook_core::holiday::{HolidayRegion, Reconciliation};
use daybook_core::sync::SyncOutcome;
use owo_colors::OwoColorize;

use crate::input::format_minutes;

/// Extension trait for TUI rendering with colors.
pub trait Render {
    fn render(&self) -> String;
}

/// `#rrggbb` -> (r, g, b)
fn rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}

/// A dot in the given color, plain when the color is not a hex value.
pub fn swatch(color: &ColorOption) -> String {
    match rgb(&color.value) {
        Some((r, g, b)) => "●".truecolor(r, g, b).to_string(),
        None => "●".to_string(),
    }
}

impl Render for ColorOption {
    fn render(&self) -> String {
        format!("{} {}", swatch(self), self.name)
    }
}

impl Render for Calendar {
    fn render(&self) -> String {
        let mut line = format!("{} {}", swatch(&self.color_option), self.name);
        if let Some(region) = &self.region {
            line.push_str(&format!(" {}", format!("(holidays, {region})").dimmed()));
        }
        if !self.selected {
            line.push_str(&format!(" {}", "hidden".dimmed()));
        }
        line.push_str(&format!(" {}", format!("#{}", self.id).dimmed()));
        line
    }
}

impl Render for Schedule {
    fn render(&self) -> String {
        let time = if self.date_time.all_day || self.date_time.time.is_unset() {
            format!("{:>13}", "all-day")
        } else {
            format!(
                "{:>13}",
                format!(
                    "{}-{}",
                    format_minutes(self.date_time.time.start),
                    format_minutes(self.date_time.time.end)
                )
            )
        };

        let title = match (self.schedule_type, self.completed) {
            (ScheduleType::Task, Some(true)) => format!("☑ {}", self.title.strikethrough()),
            (ScheduleType::Task, _) => format!("☐ {}", self.title),
            (ScheduleType::Event, _) => self.title.clone(),
        };

        let mut line = format!("{} {}", time, title);
        if let Some(location) = &self.location {
            line.push_str(&format!(" {}", format!("@ {location}").dimmed()));
        }
        if !self.is_external {
            line.push_str(&format!(" {}", format!("#{}", self.id).dimmed()));
        }
        line
    }
}

impl Render for SyncOutcome {
    fn render(&self) -> String {
        if self.is_success() {
            format!("{} {}", "✓".green(), self.to_string().dimmed())
        } else {
            format!("{} {}", "✗".red(), self.to_string().red())
        }
    }
}

impl Render for HolidayRegion {
    fn render(&self) -> String {
        if self.selected {
            format!("{} {} {}", "[x]".green(), self.name, self.code.dimmed())
        } else {
            format!("[ ] {} {}", self.name, self.code.dimmed())
        }
    }
}

impl Render for Reconciliation {
    fn render(&self) -> String {
        match self {
            Reconciliation::Unchanged => "Holiday calendars are up to date".dimmed().to_string(),
            Reconciliation::Added {
                region, schedules, ..
            } => format!(
                "{} Added holidays for {} ({} {})",
                "+".green(),
                region,
                schedules,
                pluralize("day", *schedules)
            ),
            Reconciliation::Removed {
                region, schedules, ..
            } => format!(
                "{} Removed holidays for {} ({} {})",
                "-".red(),
                region,
                schedules,
                pluralize("schedule", *schedules)
            ),
        }
    }
}

/// Simple pluralization helper
pub fn pluralize(word: &str, count: usize) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{word}s")
    }
}
