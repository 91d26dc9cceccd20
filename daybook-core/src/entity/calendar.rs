use std::fmt;

use serde::{Deserialize, Serialize};

use super::{ColorOption, EntityId, color};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalendarType {
    Default,
    Holiday,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Calendar {
    pub id: EntityId,
    pub name: String,
    #[serde(rename = "type")]
    pub calendar_type: CalendarType,
    #[serde(default = "default_true")]
    pub selected: bool,
    #[serde(default = "default_true")]
    pub removable: bool,
    #[serde(deserialize_with = "color::deserialize")]
    pub color_option: ColorOption,
    /// Holiday region code, set for `type = holiday` calendars only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Calendar {
    /// A new, selected and removable personal calendar.
    pub fn new(name: &str, color_option: ColorOption) -> Self {
        Calendar {
            id: EntityId::generate(),
            name: name.to_string(),
            calendar_type: CalendarType::Default,
            selected: true,
            removable: true,
            color_option,
            region: None,
            time_zone: None,
            description: None,
        }
    }

    pub fn is_holiday(&self) -> bool {
        self.calendar_type == CalendarType::Holiday
    }
}

impl fmt::Display for Calendar {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
