//! Regional holiday calendars.
//!
//! Holiday calendars come from an external events API (proxied by the
//! daybook server). Selecting a region materializes one holiday calendar
//! plus one schedule per holiday; deselecting it removes them again.

mod convert;
mod reconciler;
mod regions;

pub use convert::{calendar_from_external, schedule_from_external};
pub use reconciler::{HolidayReconciler, Reconciliation};
pub use regions::{HolidayRegion, RegionSelection};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{CoreError, CoreResult};
use crate::remote::{RemoteCall, read_json};

/// Holiday calendar payload as returned by the events API.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalCalendar {
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub time_zone: Option<String>,
    #[serde(default)]
    pub items: Vec<ExternalEvent>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalEvent {
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub start: Option<ExternalDate>,
    #[serde(default)]
    pub organizer: Option<ExternalOrganizer>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExternalDate {
    /// `YYYY-MM-DD`
    #[serde(default)]
    pub date: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalOrganizer {
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Where holiday calendars are fetched from.
pub trait HolidaySource: Send + Sync {
    fn fetch_by_region(&self, region: &str) -> RemoteCall<ExternalCalendar>;
}

/// Fetches holiday calendars through the daybook server's `/holiday` proxy.
pub struct HttpHolidaySource {
    http: reqwest::Client,
    base_url: String,
}

impl HttpHolidaySource {
    pub fn new(http: reqwest::Client, api_url: &str) -> Self {
        HttpHolidaySource {
            http,
            base_url: api_url.trim_end_matches('/').to_string(),
        }
    }

    fn url_for(&self, region: &str) -> CoreResult<Url> {
        if region.trim().is_empty() {
            return Err(CoreError::Validation("Region code is required".into()));
        }

        let mut url = Url::parse(&self.base_url)
            .map_err(|e| CoreError::Config(format!("Invalid API URL '{}': {e}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|_| CoreError::Config(format!("Invalid API URL '{}'", self.base_url)))?
            .pop_if_empty()
            .push("holiday")
            .push(region);
        Ok(url)
    }
}

impl HolidaySource for HttpHolidaySource {
    /// GET /holiday/{region}
    fn fetch_by_region(&self, region: &str) -> RemoteCall<ExternalCalendar> {
        let region = region.to_string();
        let request = self.url_for(&region).map(|url| self.http.get(url));

        Box::pin(async move {
            let fetch = async {
                let resp = request?.send().await?;
                read_json::<ExternalCalendar>(resp).await
            };
            fetch.await.map_err(|e| {
                tracing::error!(%region, error = %e, "error fetching holiday events");
                CoreError::HolidaySource(region.clone(), e.to_string())
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_is_a_single_encoded_segment() {
        let source = HttpHolidaySource::new(reqwest::Client::new(), "http://localhost:5001/api/");
        let url = source.url_for("en.usa#holiday").unwrap();
        assert_eq!(url.as_str(), "http://localhost:5001/api/holiday/en.usa%23holiday");
    }

    #[test]
    fn test_blank_region_is_rejected() {
        let source = HttpHolidaySource::new(reqwest::Client::new(), "http://localhost:5001/api");
        assert!(matches!(source.url_for(" "), Err(CoreError::Validation(_))));
    }

    #[test]
    fn test_parses_events_api_payload() {
        let json = r#"{
            "kind": "calendar#events",
            "summary": "Holidays in United States",
            "timeZone": "UTC",
            "items": [{
                "summary": "Independence Day",
                "start": { "date": "2024-07-04" },
                "organizer": { "displayName": "Holidays in United States", "self": true }
            }]
        }"#;
        let calendar: ExternalCalendar = serde_json::from_str(json).unwrap();
        assert_eq!(calendar.time_zone.as_deref(), Some("UTC"));
        assert_eq!(calendar.items.len(), 1);
        assert_eq!(calendar.items[0].description, None);
    }
}
