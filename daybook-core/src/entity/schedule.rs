use std::fmt;

use serde::{Deserialize, Serialize};

use super::{CalendarType, ColorOption, EntityId, color};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleType {
    Task,
    Event,
}

/// Start/end of a schedule in minutes since midnight; `-1` means unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: i32,
    pub end: i32,
}

impl TimeRange {
    pub const UNSET: i32 = -1;

    pub fn unset() -> Self {
        TimeRange {
            start: Self::UNSET,
            end: Self::UNSET,
        }
    }

    pub fn is_unset(&self) -> bool {
        self.start == Self::UNSET
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateTimeInputs {
    pub all_day: bool,
    pub once: bool,
    /// Compact `YYYYMMDD` date.
    pub date: String,
    pub time: TimeRange,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    pub id: EntityId,
    pub title: String,
    pub description: String,
    pub calendar_id: EntityId,
    pub calendar_type: CalendarType,
    pub date_time: DateTimeInputs,
    #[serde(rename = "type")]
    pub schedule_type: ScheduleType,
    /// Set for schedules sourced from an external holiday calendar.
    #[serde(default)]
    pub is_external: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(
        default,
        deserialize_with = "color::deserialize_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub color_option: Option<ColorOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}
