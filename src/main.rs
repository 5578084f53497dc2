use chrono::{DateTime, Local};
use clap::Parser;
use lib::{
    Config, LogPaths, SimpleLogger, WeatherError, WeatherLinkClient, append_record, ensure_dir,
    extract_record, render_stations, send_report,
};
use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};
use std::time::Instant;

static LOGGER: SimpleLogger = SimpleLogger;

/// Logs WeatherLink current conditions to monthly CSV/JSON files, and emails
/// the CSV log. Meant to be run from cron, one cycle per invocation.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON configuration file with `api` and `email` sections
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// Print the stations available to the configured API key and exit
    #[arg(long, default_value_t = false, conflicts_with = "send_report")]
    list_stations: bool,

    /// Email the CSV report file to the configured recipients instead of polling
    #[arg(long, default_value_t = false)]
    send_report: bool,

    /// Directory holding the monthly log files (created if missing)
    #[arg(long, default_value = "LOGS")]
    logs_dir: PathBuf,

    /// CSV file attached by --send-report
    #[arg(long, default_value = "weather_data.csv")]
    report_file: PathBuf,

    /// Log level for output
    #[arg(long, default_value = "false")]
    debug: bool,
}

fn main() -> Result<(), WeatherError> {
    // Log file names are fixed by the month at process start.
    let started_at = Local::now();
    let total_start = Instant::now();
    log::set_logger(&LOGGER).map_err(|e| WeatherError::Config(e.to_string()))?;

    let args = Args::parse();
    if args.debug {
        log::set_max_level(log::LevelFilter::Debug);
    } else {
        log::set_max_level(log::LevelFilter::Info);
    }

    debug!("Loading configuration from {}", args.config.display());
    let config = Config::load(&args.config)?;

    if args.list_stations {
        list_stations(&config);
    } else if args.send_report {
        report(&config, &args.report_file);
    } else {
        poll_cycle(&config, &args.logs_dir, started_at);
    }

    debug!("Finished in {:.2?}", total_start.elapsed());
    Ok(())
}

fn list_stations(config: &Config) {
    println!("\nFetching available weather stations...");
    println!("{}", "-".repeat(80));

    match connect(config).and_then(|client| client.station_list()) {
        Some(list) => print!("{}", render_stations(&list)),
        None => println!("Could not retrieve station list. Check your API credentials."),
    }
}

/// Builds the API client, logging instead of failing the run.
fn connect(config: &Config) -> Option<WeatherLinkClient> {
    match WeatherLinkClient::new(&config.api) {
        Ok(client) => Some(client),
        Err(e) => {
            error!("Could not set up the API client: {}", e);
            None
        }
    }
}

/// One fetch, extract, log cycle.
fn poll_cycle(config: &Config, logs_dir: &Path, started_at: DateTime<Local>) {
    if config.api.has_placeholder_station() {
        println!("Error: Please configure api.stationId");
        println!("Use: weather_logger --list-stations");
        println!("to see all available station IDs");
        return;
    }

    info!("[{}] Fetching weather data...", Local::now());
    let Some(client) = connect(config) else {
        return;
    };

    let fetch_start = Instant::now();
    let response = match client.current_conditions() {
        Some(response) => response,
        None => {
            error!("Failed to fetch data from API");
            return;
        }
    };
    debug!("Fetch took {:.2?}", fetch_start.elapsed());

    let record = match extract_record(Some(&response)) {
        Some(record) => record,
        None => {
            warn!("No data extracted from API response");
            return;
        }
    };
    println!("{}", record.summary());

    if let Err(e) = ensure_dir(logs_dir) {
        error!("Could not create {}: {}", logs_dir.display(), e);
    }
    let paths = LogPaths::for_month(logs_dir, started_at);
    debug!("  - {}", paths.csv.display());
    debug!("  - {}", paths.json.display());

    if append_record(&record, &paths).is_complete() {
        info!("Data logged successfully");
    } else {
        warn!("Data logged with errors");
    }
}

fn report(config: &Config, report_file: &Path) {
    let email = match config.email() {
        Ok(email) => email,
        Err(e) => {
            error!("{}", e);
            return;
        }
    };

    if email.has_placeholder_sender() {
        println!("Error: Please configure email.sender_email and email.sender_password");
        println!("Instructions:");
        println!("1. Update sender_email with your Gmail address");
        println!("2. Generate an app-specific password at: https://support.google.com/accounts/answer/185833");
        println!("3. Update sender_password with the generated password");
        println!("4. Update recipient_email with a list of destination emails");
        return;
    }

    match send_report(email, report_file) {
        Ok(sent) => debug!("{} report(s) sent", sent),
        Err(e) => error!("Error sending email: {}", e),
    }
}
