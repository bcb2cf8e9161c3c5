//! Main entry point for the campsite availability checker.
//! Loads the campground calendar in a browser, finds sites open for every
//! requested night and texts the result.

use std::sync::Arc;

use anyhow::Context;
use campground_scan::{ScanExecutor, ScanRequest, SmsNotificationService, TwilioSmsService};
use clap::Parser;
use rec_gov::{BrowserConfig, RecGovBrowser};

mod cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let args = cli::Args::parse();
    let request = ScanRequest::new(args.campsite_url, args.start_date, args.end_date)?;

    log::info!(
        "🚀 Checking {} night(s): {}",
        request.dates.len(),
        request.dates.formatted_days().join(", ")
    );

    let browser_config = BrowserConfig::from_env();
    log::info!("🌐 WebDriver endpoint: {}", browser_config.webdriver_url);

    let executor = ScanExecutor::new(
        Arc::new(RecGovBrowser::new(Some(browser_config))),
        Arc::new(SmsNotificationService::new(Arc::new(TwilioSmsService::new()))),
    );

    let availability = executor
        .execute(&request)
        .await
        .with_context(|| format!("Availability check for {} failed", request.campsite_url))?;

    if availability.is_empty() {
        log::info!("⛺ No campsites available for {}", request.dates.describe());
    } else {
        log::info!(
            "🏕️ Found {} campsites: {}",
            availability.count(),
            availability.available_sites.join(" ")
        );
    }

    Ok(())
}
