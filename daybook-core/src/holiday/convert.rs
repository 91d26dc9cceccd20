//! Conversion from the external holiday payload into daybook entities.

use chrono::NaiveDate;

use super::{ExternalCalendar, ExternalEvent};
use crate::entity::{
    Calendar, CalendarType, ColorOption, DateTimeInputs, EntityId, Schedule, ScheduleType,
    TimeRange,
};

const LOCATION_SEPARATOR: &str = " in ";

/// Build the holiday calendar for `region` from the external payload.
pub fn calendar_from_external(external: &ExternalCalendar, id: EntityId, region: &str) -> Calendar {
    Calendar {
        id,
        name: external.summary.clone().unwrap_or_default(),
        calendar_type: CalendarType::Holiday,
        selected: true,
        removable: true,
        color_option: ColorOption::random(),
        region: Some(region.to_string()),
        time_zone: Some(external.time_zone.clone().unwrap_or_default()),
        description: Some(external.description.clone().unwrap_or_default()),
    }
}

/// Build a holiday schedule belonging to `calendar_id`.
///
/// Returns `None` when the event has no usable `start.date`.
pub fn schedule_from_external(event: &ExternalEvent, calendar_id: EntityId) -> Option<Schedule> {
    let date = event
        .start
        .as_ref()
        .and_then(|s| s.date.as_deref())
        .and_then(compact_date)?;

    let location = event
        .organizer
        .as_ref()
        .and_then(|o| o.display_name.as_deref())
        .and_then(location_from_organizer);

    Some(Schedule {
        id: EntityId::generate(),
        title: event.summary.clone().unwrap_or_default(),
        description: event.description.clone().unwrap_or_default(),
        calendar_id,
        calendar_type: CalendarType::Holiday,
        date_time: DateTimeInputs {
            all_day: false,
            once: true,
            date,
            time: TimeRange::unset(),
        },
        schedule_type: ScheduleType::Event,
        is_external: true,
        location,
        color_option: Some(ColorOption::random()),
        completed: None,
    })
}

/// `YYYY-MM-DD` -> `YYYYMMDD`
fn compact_date(date: &str) -> Option<String> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .ok()
        .map(|d| d.format("%Y%m%d").to_string())
}

/// "Holidays in United States" -> "United States"
fn location_from_organizer(display_name: &str) -> Option<String> {
    display_name
        .split(LOCATION_SEPARATOR)
        .nth(1)
        .map(|s| s.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::holiday::{ExternalDate, ExternalOrganizer};

    fn make_test_event(date: Option<&str>, organizer: Option<&str>) -> ExternalEvent {
        ExternalEvent {
            summary: Some("Independence Day".to_string()),
            description: Some("Public holiday".to_string()),
            start: Some(ExternalDate {
                date: date.map(String::from),
            }),
            organizer: Some(ExternalOrganizer {
                display_name: organizer.map(String::from),
            }),
        }
    }

    #[test]
    fn test_compact_date() {
        assert_eq!(compact_date("2024-07-04").as_deref(), Some("20240704"));
        assert_eq!(compact_date("July 4th"), None);
    }

    #[test]
    fn test_location_from_organizer() {
        assert_eq!(
            location_from_organizer("Holidays in United States").as_deref(),
            Some("United States")
        );
        assert_eq!(location_from_organizer("Jewish Holidays"), None);
    }

    #[test]
    fn test_schedule_from_external() {
        let calendar_id = EntityId::new(77).unwrap();
        let event = make_test_event(Some("2024-07-04"), Some("Holidays in United States"));

        let schedule = schedule_from_external(&event, calendar_id).unwrap();
        assert_eq!(schedule.calendar_id, calendar_id);
        assert_eq!(schedule.date_time.date, "20240704");
        assert!(schedule.date_time.once);
        assert!(!schedule.date_time.all_day);
        assert!(schedule.date_time.time.is_unset());
        assert!(schedule.is_external);
        assert_eq!(schedule.calendar_type, CalendarType::Holiday);
        assert_eq!(schedule.location.as_deref(), Some("United States"));
        assert_eq!(schedule.title, "Independence Day");
    }

    #[test]
    fn test_event_without_date_is_skipped() {
        let event = make_test_event(None, None);
        assert!(schedule_from_external(&event, EntityId::new(1).unwrap()).is_none());
    }

    #[test]
    fn test_calendar_from_external() {
        let external = ExternalCalendar {
            summary: Some("Holidays in United States".to_string()),
            description: None,
            time_zone: Some("UTC".to_string()),
            items: vec![],
        };
        let id = EntityId::new(3).unwrap();

        let calendar = calendar_from_external(&external, id, "en.usa");
        assert_eq!(calendar.id, id);
        assert!(calendar.is_holiday());
        assert_eq!(calendar.region.as_deref(), Some("en.usa"));
        assert_eq!(calendar.description.as_deref(), Some(""));
        assert!(calendar.selected && calendar.removable);
    }
}
