use std::path::PathBuf;

use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("I/O Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV Error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON Error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("HTTP Error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("HTTP Error: unexpected status {0} for {1}")]
    Status(StatusCode, String),
    #[error("Config Error: {0}")]
    Config(String),
    #[error("Data Error: {0}")]
    Data(String),
    #[error("Error: {} not found", .0.display())]
    FileNotFound(PathBuf),
    #[error("Address Error: {0}")]
    Address(#[from] lettre::address::AddressError),
    #[error("Message Error: {0}")]
    Message(#[from] lettre::error::Error),
    #[error("Message Error: {0}")]
    ContentType(#[from] lettre::message::header::ContentTypeErr),
    #[error("SMTP Error: {0}")]
    Relay(String),
    #[error("SMTP Error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

pub type Result<T> = std::result::Result<T, WeatherError>;
