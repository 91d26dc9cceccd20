use anyhow::Result;
use owo_colors::OwoColorize;

use daybook_core::holiday::RegionSelection;

use crate::app::App;
use crate::render::Render;
use crate::utils::tui;

pub fn list(app: &App, all: bool) -> Result<()> {
    let selection = RegionSelection::bundled(app.store.calendars())?;
    let regions: Vec<_> = selection
        .regions()
        .iter()
        .filter(|r| all || r.selected)
        .collect();

    if regions.is_empty() {
        println!("{}", "No holiday regions selected".dimmed());
        println!(
            "{}",
            "Run `daybook holidays --all` to see the available regions.".dimmed()
        );
        return Ok(());
    }

    for region in regions {
        println!("{}", region.render());
    }
    Ok(())
}

/// Flip one region and materialize or remove its holiday calendar.
pub async fn toggle(app: &mut App, code: &str) -> Result<()> {
    let mut selection = RegionSelection::bundled(app.store.calendars())?;
    let selected = selection.toggle(code)?;
    tracing::debug!(%code, selected, "toggled holiday region");

    let spinner = tui::create_spinner(format!("Updating holidays for {code}"));
    let result = app
        .reconciler
        .reconcile(&mut app.store, &app.ctx, &selection)
        .await;
    spinner.finish_and_clear();

    println!("{}", result?.render());
    Ok(())
}
