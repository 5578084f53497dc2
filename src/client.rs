use crate::config::ApiConfig;
use crate::error::{Result, WeatherError};
use log::{debug, error, warn};
use reqwest::blocking::Client as HttpClient;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::Deserialize;
use serde_json::Value;
use std::fmt::Write;
use std::thread;
use std::time::Duration;

pub const MAX_RETRIES: u32 = 3;
pub const RETRY_DELAY: Duration = Duration::from_secs(5);
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

const API_SECRET_HEADER: &str = "x-api-secret";

/// Blocking client for the WeatherLink v2 API.
///
/// The API secret travels in the `x-api-secret` header on every request, the
/// key as the `api-key` query parameter.
#[derive(Debug, Clone)]
pub struct WeatherLinkClient {
    base_url: String,
    key: String,
    station_id: String,
    retry_max: u32,
    retry_delay: Duration,
    http: HttpClient,
}

impl WeatherLinkClient {
    pub fn new(api: &ApiConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let secret = HeaderValue::from_str(&api.secret)
            .map_err(|e| WeatherError::Config(format!("invalid api secret: {}", e)))?;
        headers.insert(API_SECRET_HEADER, secret);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = HttpClient::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            base_url: api.base_url.trim_end_matches('/').to_string(),
            key: api.key.clone(),
            station_id: api.station_id.clone(),
            retry_max: MAX_RETRIES,
            retry_delay: RETRY_DELAY,
            http,
        })
    }

    pub fn with_retry_max(mut self, retry_max: u32) -> Self {
        self.retry_max = retry_max;
        self
    }

    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    pub fn stations_url(&self) -> String {
        format!("{}/stations", self.base_url)
    }

    pub fn current_url(&self) -> String {
        format!("{}/current/{}", self.base_url, self.station_id)
    }

    /// Fetches the stations visible to this API key. Single attempt.
    pub fn station_list(&self) -> Option<StationList> {
        let url = self.stations_url();
        debug!("Requesting station list: {}", url);

        let list = self
            .get_json(&url)
            .and_then(|v| serde_json::from_value::<StationList>(v).map_err(WeatherError::from));
        match list {
            Ok(list) => Some(list),
            Err(e) => {
                error!("Failed to fetch station list: {}", e);
                None
            }
        }
    }

    /// Fetches current conditions for the configured station, retrying on any
    /// failure. `None` means every attempt failed.
    pub fn current_conditions(&self) -> Option<Value> {
        let url = self.current_url();
        debug!("Requesting current conditions: {}", url);

        retry(self.retry_max, self.retry_delay, thread::sleep, |_| {
            self.get_json(&url)
        })
    }

    fn get_json(&self, url: &str) -> Result<Value> {
        // without_url keeps the api-key query parameter out of error messages
        let resp = self
            .http
            .get(url)
            .query(&[("api-key", self.key.as_str())])
            .send()
            .map_err(|e| e.without_url())?;

        let status = resp.status();
        if !status.is_success() {
            return Err(WeatherError::Status(status, url.to_string()));
        }

        Ok(resp.json::<Value>().map_err(|e| e.without_url())?)
    }
}

/// Runs `op` up to `attempts` times, sleeping `delay` between failed attempts.
///
/// `op` receives the 1-based attempt number. Failures are logged; after the
/// last one the error is dropped and `None` returned.
pub fn retry<T, S, F>(attempts: u32, delay: Duration, mut sleep: S, mut op: F) -> Option<T>
where
    S: FnMut(Duration),
    F: FnMut(u32) -> Result<T>,
{
    for attempt in 1..=attempts {
        match op(attempt) {
            Ok(value) => return Some(value),
            Err(e) if attempt < attempts => {
                warn!("API request failed (attempt {}): {}", attempt, e);
                sleep(delay);
            }
            Err(e) => {
                error!("Failed to fetch data after {} attempts: {}", attempts, e);
            }
        }
    }
    None
}

#[derive(Debug, Deserialize)]
pub struct StationList {
    #[serde(default)]
    pub stations: Option<Vec<Station>>,
}

/// One entry of the station listing. Every field is read leniently: a
/// missing or oddly typed value only affects how that field is shown.
#[derive(Debug, Deserialize)]
pub struct Station {
    #[serde(default)]
    pub station_id: Option<Value>,
    #[serde(default)]
    pub station_name: Option<Value>,
    #[serde(default)]
    pub location: Option<Value>,
    #[serde(default)]
    pub active: Option<Value>,
}

impl Station {
    pub fn is_active(&self) -> bool {
        match &self.active {
            Some(Value::Bool(b)) => *b,
            Some(Value::Number(n)) => n.as_f64().is_some_and(|v| v != 0.0),
            Some(Value::String(s)) => !s.is_empty(),
            _ => false,
        }
    }

    fn location_part(&self, key: &str) -> String {
        let part = self.location.as_ref().and_then(|l| l.get(key));
        text_or(part, "N/A")
    }
}

fn text_or(value: Option<&Value>, missing: &str) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => missing.to_string(),
        Some(other) => other.to_string(),
    }
}

/// Formats a station listing for the terminal.
pub fn render_stations(list: &StationList) -> String {
    let stations = match &list.stations {
        Some(stations) => stations,
        None => return "Could not retrieve station list. Check your API credentials.\n".to_string(),
    };
    if stations.is_empty() {
        return "No stations found for this API account.\n".to_string();
    }

    let mut out = format!("\nFound {} station(s):\n\n", stations.len());
    for (i, station) in stations.iter().enumerate() {
        let _ = writeln!(
            out,
            "{}. Station ID: {}",
            i + 1,
            text_or(station.station_id.as_ref(), "None")
        );
        let _ = writeln!(out, "   Name: {}", text_or(station.station_name.as_ref(), "N/A"));
        let _ = writeln!(
            out,
            "   Location: {}, {}, {}",
            station.location_part("city"),
            station.location_part("state"),
            station.location_part("country"),
        );
        let status = if station.is_active() { "Active" } else { "Inactive" };
        let _ = writeln!(out, "   Status: {}\n", status);
    }
    out
}
