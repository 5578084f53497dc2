use crate::error::{Result, WeatherError};
use serde::Deserialize;
use std::{fs, path::Path};

pub const DEFAULT_BASE_URL: &str = "https://api.weatherlink.com/v2";
pub const PLACEHOLDER_STATION_ID: &str = "YOUR_STATION_ID";
pub const PLACEHOLDER_SENDER: &str = "your_email@gmail.com";

/// Top-level configuration, read once from `config.json` at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    /// Only needed to send reports.
    #[serde(default)]
    pub email: Option<EmailConfig>,
}

/// WeatherLink credentials and target station.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub key: String,
    pub secret: String,
    #[serde(rename = "stationId")]
    pub station_id: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    pub sender_email: String,
    pub sender_password: String,
    pub recipient_email: Vec<String>,
    pub smtp_server: String,
    pub smtp_port: u16,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl Config {
    /// Reads and parses the JSON configuration file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            WeatherError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json(&contents)
            .map_err(|e| WeatherError::Config(format!("failed to parse {}: {}", path.display(), e)))
    }

    pub fn from_json(contents: &str) -> Result<Self> {
        Ok(serde_json::from_str(contents)?)
    }

    pub fn email(&self) -> Result<&EmailConfig> {
        self.email
            .as_ref()
            .ok_or_else(|| WeatherError::Config("missing \"email\" section".to_string()))
    }
}

impl ApiConfig {
    pub fn has_placeholder_station(&self) -> bool {
        self.station_id == PLACEHOLDER_STATION_ID
    }
}

impl EmailConfig {
    pub fn has_placeholder_sender(&self) -> bool {
        self.sender_email == PLACEHOLDER_SENDER
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"{
        "api": {"key": "k", "secret": "s", "stationId": "12345"},
        "email": {
            "sender_email": "logger@example.com",
            "sender_password": "pw",
            "recipient_email": ["a@example.com", "b@example.com"],
            "smtp_server": "smtp.example.com",
            "smtp_port": 587
        }
    }"#;

    #[test]
    fn parses_full_config() {
        let cfg = Config::from_json(FULL).unwrap();
        assert_eq!(cfg.api.station_id, "12345");
        assert_eq!(cfg.api.base_url, DEFAULT_BASE_URL);
        assert!(!cfg.api.has_placeholder_station());

        let email = cfg.email().unwrap();
        assert_eq!(email.recipient_email.len(), 2);
        assert_eq!(email.smtp_port, 587);
        assert!(!email.has_placeholder_sender());
    }

    #[test]
    fn email_section_is_optional_until_needed() {
        let cfg = Config::from_json(
            r#"{"api": {"key": "k", "secret": "s", "stationId": "YOUR_STATION_ID"}}"#,
        )
        .unwrap();
        assert!(cfg.api.has_placeholder_station());

        let err = cfg.email().unwrap_err();
        assert!(err.to_string().contains("missing \"email\" section"));
    }

    #[test]
    fn missing_station_id_is_an_error() {
        assert!(Config::from_json(r#"{"api": {"key": "k", "secret": "s"}}"#).is_err());
    }

    #[test]
    fn load_reports_missing_file_as_config_error() {
        let err = Config::load(Path::new("/nonexistent/weather/config.json")).unwrap_err();
        assert!(matches!(err, WeatherError::Config(_)));
    }
}
