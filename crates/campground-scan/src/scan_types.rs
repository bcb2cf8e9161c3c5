use validator::Validate;

use crate::date_range::RequestedDateRange;
use crate::executor::NotificationError;

/// A single availability check, as requested on the command line
#[derive(Debug, Clone, Validate)]
pub struct ScanRequest {
    /// recreation.gov campground page to check
    #[validate(url(message = "Campsite URL must be a valid URL"))]
    pub campsite_url: String,

    /// Nights the caller wants to camp
    pub dates: RequestedDateRange,
}

impl ScanRequest {
    /// Build and validate a request for the inclusive range `start..=end`
    pub fn new(
        campsite_url: impl Into<String>,
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    ) -> Result<Self, ScanError> {
        let request = Self {
            campsite_url: campsite_url.into(),
            dates: RequestedDateRange::new(start, end)?,
        };

        request
            .validate()
            .map_err(|e| ScanError::Validation(e.to_string()))?;

        Ok(request)
    }
}

/// Custom error type for scan operations
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// A date argument did not match `MM/DD/YYYY`
    #[error("Not a valid date: {0}")]
    InvalidDate(String),

    /// Start date falls after end date, leaving nothing to check
    #[error(
        "Unable to find any dates to verify reservations for. Start date is {start} and end date is {end}"
    )]
    EmptyDateRange {
        /// Requested start date, as typed
        start: String,
        /// Requested end date, as typed
        end: String,
    },

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// An element the calendar page must contain is missing
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    /// Data format error
    #[error("Data format error: {0}")]
    DataFormat(String),

    /// Browser automation failed
    #[error("Browser error: {0}")]
    Browser(String),

    /// Delivering the availability message failed
    #[error("Notification error: {0}")]
    Notification(#[from] NotificationError),
}
