use std::path::PathBuf;

use anyhow::{Context, Result};

const DEFAULT_HOLIDAY_API_URL: &str = "https://www.googleapis.com/calendar/v3";
const DEFAULT_CALENDAR_ID: &str = "holiday@group.v.calendar.google.com";
const DEFAULT_CALENDAR_REGION: &str = "en.usa";

/// Upstream events API behind `/api/holiday`.
#[derive(Debug, Clone)]
pub struct HolidayConfig {
    pub api_url: String,
    pub api_key: String,
    /// Suffix of every holiday calendar id, `{region}#{calendar_id}`.
    pub calendar_id: String,
    /// Region served by `/api/holiday` without a region.
    pub default_region: String,
}

impl Default for HolidayConfig {
    fn default() -> Self {
        HolidayConfig {
            api_url: DEFAULT_HOLIDAY_API_URL.to_string(),
            api_key: String::new(),
            calendar_id: DEFAULT_CALENDAR_ID.to_string(),
            default_region: DEFAULT_CALENDAR_REGION.to_string(),
        }
    }
}

/// Server configuration loaded from environment variables.
///
/// | Env Var                   | Default                                    |
/// |---------------------------|--------------------------------------------|
/// | `HOST`                    | `127.0.0.1`                                |
/// | `PORT`                    | `5001`                                     |
/// | `DATA_FILE`               | `<data dir>/daybook-server/db.json`        |
/// | `CORS_ORIGINS`            | `http://localhost:3000`                    |
/// | `API_KEY`                 | empty                                      |
/// | `CALENDAR_ID`             | `holiday@group.v.calendar.google.com`      |
/// | `CALENDAR_REGION`         | `en.usa`                                   |
/// | `GOOGLE_CALENDAR_API_URL` | `https://www.googleapis.com/calendar/v3`   |
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub data_file: PathBuf,
    /// Allowed origins; `*` allows any.
    pub cors_origins: Vec<String>,
    pub holiday: HolidayConfig,
}

fn var_or(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        let host = var_or("HOST", "127.0.0.1");

        let port: u16 = var_or("PORT", "5001")
            .parse()
            .context("PORT must be a valid port number")?;

        let data_file = match std::env::var("DATA_FILE") {
            Ok(path) if !path.trim().is_empty() => PathBuf::from(path),
            _ => dirs::data_dir()
                .context("Could not determine data directory, set DATA_FILE")?
                .join("daybook-server")
                .join("db.json"),
        };

        let cors_origins = var_or("CORS_ORIGINS", "http://localhost:3000")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let holiday = HolidayConfig {
            api_url: var_or("GOOGLE_CALENDAR_API_URL", DEFAULT_HOLIDAY_API_URL),
            api_key: var_or("API_KEY", ""),
            calendar_id: var_or("CALENDAR_ID", DEFAULT_CALENDAR_ID),
            default_region: var_or("CALENDAR_REGION", DEFAULT_CALENDAR_REGION),
        };
        if holiday.api_key.is_empty() {
            tracing::warn!("API_KEY is not set, holiday requests will be rejected upstream");
        }

        Ok(ServerConfig {
            host,
            port,
            data_file,
            cors_origins,
            holiday,
        })
    }
}
