use crate::error::Result;
use crate::structs::WeatherRecord;
use chrono::{DateTime, Local};
use csv::WriterBuilder;
use log::{error, info};
use serde_json::Value;
use std::{
    fs::{self, File, OpenOptions},
    io::BufReader,
    path::{Path, PathBuf},
};

/// The pair of monthly log files a poll cycle appends to.
#[derive(Debug, Clone, PartialEq)]
pub struct LogPaths {
    pub csv: PathBuf,
    pub json: PathBuf,
}

impl LogPaths {
    /// `<dir>/weather_data_<Mon>_<YYYY>.{csv,json}` for the month containing `now`.
    pub fn for_month(dir: &Path, now: DateTime<Local>) -> Self {
        let stem = format!("weather_data_{}", now.format("%b_%Y"));
        Self {
            csv: dir.join(format!("{}.csv", stem)),
            json: dir.join(format!("{}.json", stem)),
        }
    }
}

/// Outcome of writing one record to both destinations.
#[derive(Debug)]
pub struct AppendOutcome {
    pub csv: Result<()>,
    pub json: Result<()>,
}

impl AppendOutcome {
    pub fn is_complete(&self) -> bool {
        self.csv.is_ok() && self.json.is_ok()
    }
}

/// Appends `record` to both the CSV and the JSON log.
///
/// A failure on one destination is logged and does not prevent the write to
/// the other.
pub fn append_record(record: &WeatherRecord, paths: &LogPaths) -> AppendOutcome {
    let csv = append_csv(record, &paths.csv);
    match &csv {
        Ok(()) => info!("Data saved to {}", paths.csv.display()),
        Err(e) => error!("Error writing to CSV: {}", e),
    }

    let json = append_json(record, &paths.json);
    match &json {
        Ok(()) => info!("Data saved to {}", paths.json.display()),
        Err(e) => error!("Error writing to JSON: {}", e),
    }

    AppendOutcome { csv, json }
}

/// Appends one row to a CSV log, writing the header first if the file is new.
///
/// # Errors
/// Returns error if the file cannot be opened or written to.
pub fn append_csv(record: &WeatherRecord, output_path: &Path) -> Result<()> {
    let is_new = !output_path.is_file();
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(output_path)?;

    // Header comes from the struct's field names, in declaration order.
    let mut writer = WriterBuilder::new().has_headers(is_new).from_writer(file);
    writer.serialize(record)?;
    writer.flush()?;
    Ok(())
}

/// Appends one record to a JSON log holding a single array.
///
/// The whole file is read, extended and rewritten pretty-printed, so the cost
/// grows with the number of records already logged.
///
/// # Errors
/// Returns error if an existing file cannot be read or is not a JSON array,
/// or the file cannot be rewritten.
pub fn append_json(record: &WeatherRecord, output_path: &Path) -> Result<()> {
    // Earlier entries are carried over untyped so one odd row cannot block
    // every later append.
    let mut records: Vec<Value> = if output_path.is_file() {
        let file = File::open(output_path)?;
        serde_json::from_reader(BufReader::new(file))?
    } else {
        Vec::new()
    };
    records.push(serde_json::to_value(record)?);

    let file = File::create(output_path)?;
    serde_json::to_writer_pretty(file, &records)?;
    Ok(())
}

/// Reads every record from a JSON log.
pub fn read_json_log(path: &Path) -> Result<Vec<WeatherRecord>> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

/// Creates the logs directory if needed.
pub fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structs::FIELDS;
    use chrono::TimeZone;
    use serde_json::Number;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static COUNTER: AtomicUsize = AtomicUsize::new(0);

    fn scratch_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "weather_logger_load_{}_{}",
            std::process::id(),
            COUNTER.fetch_add(1, Ordering::SeqCst)
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn record(n: u32) -> WeatherRecord {
        let mut record = WeatherRecord::empty(format!("2024-03-05T14:{:02}:00.000000", n));
        record.temp = Number::from_f64(20.0 + n as f64);
        record.humidity = Some(Number::from(50));
        record.aqi_desc = Some("Good".to_string());
        record
    }

    #[test]
    fn monthly_file_names() {
        let now = Local.with_ymd_and_hms(2024, 3, 5, 14, 30, 0).unwrap();
        let paths = LogPaths::for_month(Path::new("LOGS"), now);
        assert_eq!(paths.csv, Path::new("LOGS/weather_data_Mar_2024.csv"));
        assert_eq!(paths.json, Path::new("LOGS/weather_data_Mar_2024.json"));
    }

    #[test]
    fn csv_header_written_once() {
        let dir = scratch_dir();
        let path = dir.join("log.csv");

        append_csv(&record(1), &path).unwrap();
        append_csv(&record(2), &path).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], FIELDS.join(","));
        assert_eq!(
            lines[1],
            "2024-03-05T14:01:00.000000,21.0,50,,,,,,,,Good,,,,,,,"
        );
        assert!(lines[2].starts_with("2024-03-05T14:02:00.000000,22.0,"));
        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn json_round_trip_keeps_order_and_fields() {
        let dir = scratch_dir();
        let path = dir.join("log.json");

        for n in 0..5 {
            append_json(&record(n), &path).unwrap();
        }

        let records = read_json_log(&path).unwrap();
        assert_eq!(records.len(), 5);
        for (n, r) in records.iter().enumerate() {
            assert_eq!(*r, record(n as u32));
        }

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        for entry in raw.as_array().unwrap() {
            let obj = entry.as_object().unwrap();
            assert_eq!(obj.len(), FIELDS.len());
            assert!(FIELDS.iter().all(|f| obj.contains_key(*f)));
            assert!(obj["wind_speed"].is_null());
        }
        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn json_append_keeps_prior_entries_of_any_shape() {
        let dir = scratch_dir();
        let path = dir.join("log.json");
        fs::write(
            &path,
            r#"[{"timestamp":"2024-01-01T00:00:00","temp":21.5,"humidity":60,"aqi_val":"n/a"}]"#,
        )
        .unwrap();

        append_json(&record(1), &path).unwrap();
        append_json(&record(2), &path).unwrap();

        let raw: Vec<Value> = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw.len(), 3);
        assert_eq!(raw[0]["aqi_val"], "n/a");
        assert_eq!(raw[0]["humidity"], 60);
        assert_eq!(raw[1]["timestamp"], "2024-03-05T14:01:00.000000");
        assert_eq!(raw[2]["timestamp"], "2024-03-05T14:02:00.000000");
        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn json_failure_does_not_block_csv() {
        let dir = scratch_dir();
        let paths = LogPaths {
            csv: dir.join("log.csv"),
            json: dir.join("log.json"),
        };
        fs::write(&paths.json, "not json").unwrap();

        let outcome = append_record(&record(1), &paths);
        assert!(outcome.csv.is_ok());
        assert!(outcome.json.is_err());
        assert!(!outcome.is_complete());
        assert_eq!(fs::read_to_string(&paths.csv).unwrap().lines().count(), 2);
        assert_eq!(fs::read_to_string(&paths.json).unwrap(), "not json");
        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn csv_failure_does_not_block_json() {
        let dir = scratch_dir();
        // a directory where the CSV file should be makes the open fail
        let paths = LogPaths {
            csv: dir.join("blocked.csv"),
            json: dir.join("log.json"),
        };
        fs::create_dir_all(&paths.csv).unwrap();

        let outcome = append_record(&record(1), &paths);
        assert!(outcome.csv.is_err());
        assert!(outcome.json.is_ok());
        assert_eq!(read_json_log(&paths.json).unwrap().len(), 1);
        fs::remove_dir_all(dir).unwrap();
    }
}
