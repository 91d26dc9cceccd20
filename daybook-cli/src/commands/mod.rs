pub mod auth;
pub mod calendars;
pub mod config;
pub mod events;
pub mod holidays;
pub mod schedules;

use anyhow::{Result, bail};

use daybook_core::entity::{Calendar, EntityId};
use daybook_core::sync::Store;

/// Find a calendar by id, or by case-insensitive name.
pub fn resolve_calendar<'a>(store: &'a Store, query: &str) -> Result<&'a Calendar> {
    if let Ok(id) = EntityId::parse(query)
        && let Some(calendar) = store.calendar(id)
    {
        return Ok(calendar);
    }

    let matches: Vec<&Calendar> = store
        .calendars()
        .iter()
        .filter(|c| c.name.eq_ignore_ascii_case(query.trim()))
        .collect();

    match matches.as_slice() {
        [calendar] => Ok(calendar),
        [] => {
            let available: Vec<_> = store.calendars().iter().map(|c| c.name.as_str()).collect();
            bail!(
                "Calendar '{}' not found. Available: {}",
                query,
                available.join(", ")
            );
        }
        _ => bail!("Several calendars are named '{query}', use the id instead"),
    }
}
