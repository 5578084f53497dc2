pub mod client;
pub mod config;
pub mod error;
pub mod load;
pub mod report;
pub mod structs;
pub mod transform;

// Re-export public API
pub use client::{StationList, WeatherLinkClient, render_stations};
pub use config::{ApiConfig, Config, EmailConfig};
pub use error::{Result, WeatherError};
pub use load::{AppendOutcome, LogPaths, append_csv, append_json, append_record, ensure_dir, read_json_log};
pub use report::send_report;
pub use structs::{FIELDS, SimpleLogger, WeatherRecord};
pub use transform::{StationResponse, extract_record, extract_record_at};
