use campground_scan::parse_date;
use chrono::NaiveDate;
use clap::Parser;

/// Check a recreation.gov campground for sites open on every night of a date range
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Args {
    /// recreation.gov url to reservation site of campsite
    pub campsite_url: String,

    /// Camping start date - format MM/DD/YYYY
    #[arg(value_parser = parse_date_arg)]
    pub start_date: NaiveDate,

    /// Camping end date - format MM/DD/YYYY
    #[arg(value_parser = parse_date_arg)]
    pub end_date: NaiveDate,
}

fn parse_date_arg(input: &str) -> Result<NaiveDate, String> {
    parse_date(input).map_err(|e| e.to_string())
}
