//! Color descriptors for calendars and schedules.
//!
//! Older stores transported `colorOption` as a JSON-encoded string. Every
//! read path accepts both encodings and normalizes to the structured value;
//! writes always produce the structured form.

use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorOption {
    pub name: String,
    pub value: String,
}

const PALETTE: &[(&str, &str)] = &[
    ("Tomato", "#d50000"),
    ("Flamingo", "#e67c73"),
    ("Tangerine", "#f4511e"),
    ("Banana", "#f6bf26"),
    ("Sage", "#33b679"),
    ("Basil", "#0b8043"),
    ("Peacock", "#039be5"),
    ("Blueberry", "#3f51b5"),
    ("Lavender", "#7986cb"),
    ("Grape", "#8e24aa"),
    ("Graphite", "#616161"),
];

impl ColorOption {
    pub fn new(name: &str, value: &str) -> Self {
        ColorOption {
            name: name.to_string(),
            value: value.to_string(),
        }
    }

    /// All palette colors, in display order.
    pub fn palette() -> Vec<ColorOption> {
        PALETTE.iter().map(|(n, v)| ColorOption::new(n, v)).collect()
    }

    /// Look up a palette color by (case-insensitive) name.
    pub fn named(name: &str) -> Option<ColorOption> {
        PALETTE
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(n, v)| ColorOption::new(n, v))
    }

    /// Pick a palette color at random.
    pub fn random() -> Self {
        let index = (uuid::Uuid::new_v4().as_u128() % PALETTE.len() as u128) as usize;
        let (name, value) = PALETTE[index];
        ColorOption::new(name, value)
    }
}

impl Default for ColorOption {
    fn default() -> Self {
        let (name, value) = PALETTE[6];
        ColorOption::new(name, value)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Encoded {
    Structured(ColorOption),
    Json(String),
}

fn decode<E: serde::de::Error>(encoded: Encoded) -> Result<Option<ColorOption>, E> {
    match encoded {
        Encoded::Structured(color) => Ok(Some(color)),
        Encoded::Json(s) if s.is_empty() => Ok(None),
        Encoded::Json(s) => serde_json::from_str(&s)
            .map(Some)
            .map_err(|e| E::custom(format!("invalid colorOption '{s}': {e}"))),
    }
}

/// Deserialize a required color that may arrive as an object or a JSON string.
pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<ColorOption, D::Error>
where
    D: Deserializer<'de>,
{
    let encoded = Encoded::deserialize(deserializer)?;
    decode(encoded)?.ok_or_else(|| serde::de::Error::custom("colorOption must not be empty"))
}

/// Deserialize an optional color; an empty string means no color.
pub(crate) fn deserialize_opt<'de, D>(deserializer: D) -> Result<Option<ColorOption>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Encoded>::deserialize(deserializer)? {
        Some(encoded) => decode(encoded),
        None => Ok(None),
    }
}
