use crate::structs::WeatherRecord;
use chrono::{DateTime, Local};
use log::{debug, warn};
use serde_json::{Map, Value};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// The two payload layouts WeatherLink has served for current conditions.
///
/// Newer stations report a list of sensors, each with its own `data` array;
/// older ones report a single flat `data` array. Both are still seen in the
/// wild, so neither supersedes the other.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StationResponse<'a> {
    /// `{"sensors": [...]}`
    Sensors(&'a Value),
    /// `{"data": [...]}`
    Flat(&'a Value),
}

impl<'a> StationResponse<'a> {
    /// Detects which layout `payload` uses.
    ///
    /// `sensors` is checked first and wins when both keys are present. Returns
    /// `None` when the payload is not an object or has neither key.
    pub fn detect(payload: &'a Value) -> Option<Self> {
        let obj = payload.as_object()?;
        if let Some(sensors) = obj.get("sensors") {
            Some(Self::Sensors(sensors))
        } else {
            obj.get("data").map(Self::Flat)
        }
    }

    /// Picks the object the readings are copied from.
    ///
    /// # Sensors
    ///
    /// The first sensor whose `data` array is non-empty and whose first data
    /// entry carries both `temp` and `hum` keys.
    ///
    /// # Flat
    ///
    /// The first element of `data`, or `data` itself when it is not an array.
    /// An empty or null `data` selects nothing.
    pub fn select(&self) -> Option<&'a Map<String, Value>> {
        match *self {
            Self::Sensors(sensors) => sensors
                .as_array()?
                .iter()
                .filter_map(|sensor| sensor.get("data")?.as_array()?.first())
                .filter_map(Value::as_object)
                .find(|data| data.contains_key("temp") && data.contains_key("hum")),
            Self::Flat(data) => {
                if is_empty(data) {
                    return None;
                }
                match data {
                    Value::Array(items) => items.first()?.as_object(),
                    other => other.as_object(),
                }
            }
        }
    }
}

/// Mirrors JSON "falsy" values: null, false, 0, "", [] and {}.
fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

/// Extracts a [`WeatherRecord`] from a current-conditions payload, stamped with
/// the current local time.
///
/// # Arguments
///
/// * `response` - Parsed API response, or `None` if the fetch produced nothing
///
/// # Returns
///
/// Returns `Some(WeatherRecord)` when a qualifying data object was found, `None`
/// for absent, malformed, or empty payloads.
pub fn extract_record(response: Option<&Value>) -> Option<WeatherRecord> {
    extract_record_at(response, Local::now())
}

/// Same as [`extract_record`] with an explicit extraction time.
///
/// The payload's own timestamps (`ts`, `generated_at`) are ignored: the record
/// is stamped with `now`.
///
/// # Arguments
///
/// * `response` - Parsed API response, or `None`
/// * `now` - Local time written to the record's `timestamp` field
///
/// # Returns
///
/// Returns `Some(WeatherRecord)` with every field set; readings missing from the
/// selected object, and the wind/pressure/rain/solar/UV readings which the sensor
/// payload does not carry, are `None`.
pub fn extract_record_at(response: Option<&Value>, now: DateTime<Local>) -> Option<WeatherRecord> {
    let response = response?;

    match response.as_object() {
        Some(obj) => debug!(
            "API Response keys: {:?}",
            obj.keys().map(String::as_str).collect::<Vec<_>>()
        ),
        None => debug!("API Response keys: Not an object"),
    }

    let shape = match StationResponse::detect(response) {
        Some(shape) => shape,
        None => {
            warn!("Unexpected response structure: {}", response);
            return None;
        }
    };

    let data = shape.select()?;
    Some(map_fields(data, now))
}

/// Copies the known readings out of the selected data object.
fn map_fields(data: &Map<String, Value>, now: DateTime<Local>) -> WeatherRecord {
    // Numbers are kept as sent; anything else counts as absent.
    let number = |key: &str| match data.get(key) {
        Some(Value::Number(n)) => Some(n.clone()),
        _ => None,
    };

    let mut record = WeatherRecord::empty(now.format(TIMESTAMP_FORMAT).to_string());
    record.temp = number("temp");
    record.humidity = number("hum");
    record.dew_point = number("dew_point");
    record.heat_index = number("heat_index");
    record.wet_bulb = number("wet_bulb");
    record.pm_1 = number("pm_1");
    record.pm_2p5 = number("pm_2p5");
    record.pm_10 = number("pm_10");
    record.aqi_val = number("aqi_val");
    record.aqi_desc = data
        .get("aqi_desc")
        .and_then(Value::as_str)
        .map(str::to_owned);
    record
}
