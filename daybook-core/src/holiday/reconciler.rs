//! Converges materialized holiday calendars with the selected regions.
//!
//! Every run handles at most one region: the first selected region without
//! a calendar, or the first holiday calendar whose region is no longer
//! selected. Which case applies is decided by comparing counts only, so a
//! selection that changed by more than one region converges over several
//! runs, and a swap (one region in, another out) is not noticed at all.

use std::sync::Arc;

use super::convert::{calendar_from_external, schedule_from_external};
use super::{ExternalCalendar, HolidaySource, RegionSelection};
use crate::entity::EntityId;
use crate::error::CoreResult;
use crate::sync::{Action, StorageTarget, Store, SyncContext};

/// What a reconciliation run changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciliation {
    Unchanged,
    Added {
        region: String,
        calendar_id: EntityId,
        schedules: usize,
    },
    Removed {
        region: String,
        calendar_id: EntityId,
        schedules: usize,
    },
}

pub struct HolidayReconciler {
    source: Arc<dyn HolidaySource>,
}

impl HolidayReconciler {
    pub fn new(source: Arc<dyn HolidaySource>) -> Self {
        HolidayReconciler { source }
    }

    pub async fn reconcile(
        &self,
        store: &mut Store,
        ctx: &SyncContext,
        selection: &RegionSelection,
    ) -> CoreResult<Reconciliation> {
        let selected = selection.selected_codes();
        let saved: Vec<(EntityId, String)> = store
            .calendars()
            .iter()
            .filter(|c| c.is_holiday())
            .map(|c| (c.id, c.region.clone().unwrap_or_default()))
            .collect();

        if saved.len() < selected.len() {
            let Some(region) = selected
                .iter()
                .find(|code| !saved.iter().any(|(_, region)| region.as_str() == **code))
            else {
                return Ok(Reconciliation::Unchanged);
            };
            return self.add_region(store, ctx, region).await;
        }

        if saved.len() > selected.len() {
            let Some((calendar_id, region)) = saved
                .into_iter()
                .find(|(_, region)| !selected.contains(&region.as_str()))
            else {
                return Ok(Reconciliation::Unchanged);
            };
            let schedules = store.remove_calendar(ctx, calendar_id)?;
            tracing::info!(%region, %calendar_id, schedules, "removed holiday calendar");
            return Ok(Reconciliation::Removed {
                region,
                calendar_id,
                schedules,
            });
        }

        Ok(Reconciliation::Unchanged)
    }

    /// Rebuild the local-only schedules of saved holiday calendars that
    /// have none. Returns how many schedules were added.
    ///
    /// Regions whose payload cannot be fetched are skipped.
    pub async fn rehydrate(&self, store: &mut Store, ctx: &SyncContext) -> CoreResult<usize> {
        let empty: Vec<(EntityId, String)> = store
            .calendars()
            .iter()
            .filter(|c| c.is_holiday())
            .filter(|c| store.schedules_of(c.id).next().is_none())
            .filter_map(|c| c.region.clone().map(|region| (c.id, region)))
            .collect();

        let mut added = 0;
        for (calendar_id, region) in empty {
            match self.source.fetch_by_region(&region).await {
                Ok(external) => added += add_schedules(store, ctx, &external, calendar_id)?,
                Err(e) => tracing::warn!(%region, error = %e, "could not rehydrate holiday calendar"),
            }
        }
        Ok(added)
    }

    async fn add_region(
        &self,
        store: &mut Store,
        ctx: &SyncContext,
        region: &str,
    ) -> CoreResult<Reconciliation> {
        // Nothing is dispatched until the payload is in hand.
        let external = self.source.fetch_by_region(region).await?;

        let calendar_id = EntityId::generate();
        let calendar = calendar_from_external(&external, calendar_id, region);
        store.dispatch_calendars(
            ctx,
            Action::Add {
                item: calendar,
                target: StorageTarget::Both,
            },
        )?;
        let schedules = add_schedules(store, ctx, &external, calendar_id)?;

        tracing::info!(%region, %calendar_id, schedules, "added holiday calendar");
        Ok(Reconciliation::Added {
            region: region.to_string(),
            calendar_id,
            schedules,
        })
    }
}

/// Holiday schedules are only ever added to the in-memory view.
fn add_schedules(
    store: &mut Store,
    ctx: &SyncContext,
    external: &ExternalCalendar,
    calendar_id: EntityId,
) -> CoreResult<usize> {
    let mut added = 0;
    for event in &external.items {
        let Some(schedule) = schedule_from_external(event, calendar_id) else {
            tracing::debug!(summary = ?event.summary, "skipping holiday without a start date");
            continue;
        };
        store.dispatch_schedules(
            ctx,
            Action::Add {
                item: schedule,
                target: StorageTarget::Local,
            },
        )?;
        added += 1;
    }
    Ok(added)
}
