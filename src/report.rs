use crate::config::EmailConfig;
use crate::error::{Result, WeatherError};
use chrono::{DateTime, Local};
use lettre::message::header::{ContentTransferEncoding, ContentType};
use lettre::message::{Attachment, Body, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::PoolConfig;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use log::{error, info};
use std::{fs, path::Path};

/// Emails the CSV log at `csv_path` to every configured recipient.
///
/// Nothing is sent if the file is missing. One authenticated STARTTLS
/// connection is shared by all sends, and the first error aborts the rest.
///
/// # Returns
/// Number of messages sent.
pub fn send_report(email: &EmailConfig, csv_path: &Path) -> Result<usize> {
    if !csv_path.is_file() {
        return Err(WeatherError::FileNotFound(csv_path.to_path_buf()));
    }
    let contents = fs::read(csv_path)?;
    let filename = csv_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "weather_data.csv".to_string());

    info!("Connecting to {}:{}...", email.smtp_server, email.smtp_port);
    let mailer = SmtpTransport::starttls_relay(&email.smtp_server)?
        .port(email.smtp_port)
        .credentials(Credentials::new(
            email.sender_email.clone(),
            email.sender_password.clone(),
        ))
        .pool_config(PoolConfig::new().max_size(1))
        .build();

    // Connects, upgrades and authenticates before any message is built.
    match mailer.test_connection() {
        Ok(true) => {}
        Ok(false) => {
            return Err(WeatherError::Relay(format!(
                "{}:{} did not accept the connection",
                email.smtp_server, email.smtp_port
            )));
        }
        Err(e) => {
            if e.is_permanent() {
                error!("Invalid email or password. Check your credentials.");
                error!("For Gmail, use an app-specific password.");
            }
            return Err(e.into());
        }
    }

    let now = Local::now();
    let mut sent = 0;
    for recipient in &email.recipient_email {
        let message = build_message(email, recipient, &filename, contents.clone(), now)?;
        mailer.send(&message)?;
        info!("Email sent successfully to {}", recipient);
        sent += 1;
    }

    info!("All emails sent with attachment: {}", csv_path.display());
    Ok(sent)
}

/// Builds the report message for one recipient: a plain-text note plus the
/// CSV as a base64 `application/octet-stream` attachment.
pub fn build_message(
    email: &EmailConfig,
    recipient: &str,
    filename: &str,
    contents: Vec<u8>,
    now: DateTime<Local>,
) -> Result<Message> {
    let body = Body::new_with_encoding(contents, ContentTransferEncoding::Base64)
        .map_err(|_| WeatherError::Data("attachment cannot be base64 encoded".to_string()))?;
    let attachment = Attachment::new(filename.to_string())
        .body(body, ContentType::parse("application/octet-stream")?);

    let message = Message::builder()
        .from(email.sender_email.parse::<Mailbox>()?)
        .to(recipient.parse::<Mailbox>()?)
        .subject(format!("Weather Data Report - {}", now.format("%Y-%m-%d")))
        .multipart(
            MultiPart::mixed()
                .singlepart(SinglePart::plain(report_text(now)))
                .singlepart(attachment),
        )?;
    Ok(message)
}

fn report_text(now: DateTime<Local>) -> String {
    format!(
        "Hi,

Please find attached your weather data log from {}.

This file contains all recorded weather measurements including:
- Temperature
- Humidity
- Dew Point
- Heat Index
- Particulate Matter (PM1, PM2.5, PM10)
- Air Quality Index (AQI)

Best regards,
Your Weather Logger
",
        now.format("%Y-%m-%d %H:%M:%S")
    )
}
