//! Selectable holiday regions.

use crate::entity::Calendar;
use crate::error::{CoreError, CoreResult};

static BUNDLED_REGIONS: &str = include_str!("regions.txt");

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HolidayRegion {
    pub name: String,
    pub code: String,
    pub selected: bool,
}

/// The user's holiday region checkboxes.
#[derive(Debug, Clone)]
pub struct RegionSelection {
    regions: Vec<HolidayRegion>,
}

impl RegionSelection {
    /// Bundled region list, with the regions of `calendars`' holiday
    /// calendars pre-selected.
    pub fn bundled(calendars: &[Calendar]) -> CoreResult<Self> {
        Self::parse(BUNDLED_REGIONS, calendars)
    }

    /// Parse a `name,code` per line region list.
    pub fn parse(list: &str, calendars: &[Calendar]) -> CoreResult<Self> {
        let saved_regions: Vec<&str> = calendars
            .iter()
            .filter(|c| c.is_holiday())
            .filter_map(|c| c.region.as_deref())
            .collect();

        let regions = list
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with('#'))
            .map(|line| {
                let (name, code) = line.rsplit_once(',').ok_or_else(|| {
                    CoreError::Config(format!("Malformed region line '{line}'"))
                })?;
                let code = code.trim().to_string();
                Ok(HolidayRegion {
                    name: name.trim().to_string(),
                    selected: saved_regions.contains(&code.as_str()),
                    code,
                })
            })
            .collect::<CoreResult<Vec<_>>>()?;

        Ok(RegionSelection { regions })
    }

    pub fn regions(&self) -> &[HolidayRegion] {
        &self.regions
    }

    pub fn selected_codes(&self) -> Vec<&str> {
        self.regions
            .iter()
            .filter(|r| r.selected)
            .map(|r| r.code.as_str())
            .collect()
    }

    /// Flip one region's checkbox and return its new state.
    pub fn toggle(&mut self, code: &str) -> CoreResult<bool> {
        let region = self
            .regions
            .iter_mut()
            .find(|r| r.code == code)
            .ok_or_else(|| CoreError::Validation(format!("Unknown holiday region '{code}'")))?;
        region.selected = !region.selected;
        Ok(region.selected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{CalendarType, ColorOption};

    fn make_holiday_calendar(region: &str) -> Calendar {
        let mut calendar = Calendar::new("Holidays", ColorOption::default());
        calendar.calendar_type = CalendarType::Holiday;
        calendar.region = Some(region.to_string());
        calendar
    }

    #[test]
    fn test_bundled_list_parses() {
        let selection = RegionSelection::bundled(&[]).unwrap();
        assert!(selection.regions().len() > 10);
        assert!(selection.regions().iter().any(|r| r.code == "en.usa"));
        assert!(selection.selected_codes().is_empty());
    }

    #[test]
    fn test_saved_holiday_calendars_are_preselected() {
        let mut personal = Calendar::new("Personal", ColorOption::default());
        personal.region = Some("en.uk".to_string());
        let calendars = vec![make_holiday_calendar("en.japanese"), personal];

        let selection = RegionSelection::bundled(&calendars).unwrap();
        assert_eq!(selection.selected_codes(), vec!["en.japanese"]);
    }

    #[test]
    fn test_toggle() {
        let mut selection = RegionSelection::parse("Holidays in A, a\nHolidays in B,b\n", &[]).unwrap();
        assert!(selection.toggle("a").unwrap());
        assert_eq!(selection.selected_codes(), vec!["a"]);
        assert!(!selection.toggle("a").unwrap());
        assert!(matches!(selection.toggle("zz"), Err(CoreError::Validation(_))));
    }
}
