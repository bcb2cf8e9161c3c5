use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::scan_types::ScanError;

/// Cell text recreation.gov uses for an open night
pub const AVAILABLE_LABEL: &str = "A";

const TABLE: &str = "table#availability-table";
const HEADER_ROW: &str = "thead tr";
const HEADER_DATE: &str = "span.date";
const BODY_ROW: &str = "tbody tr";
const SITE_BUTTON: &str = "button.rec-availability-item";
const DATE_BUTTON: &str = "button.rec-availability-date";
const MONTH_TITLE: &str = "div.rec-month-availability-date-title";

/// Availability of one campsite on one displayed night
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvailabilityMark {
    /// The night can be booked
    Available,
    /// Reserved, walk-up, closed or anything else
    Unavailable,
}

impl AvailabilityMark {
    /// Interpret the text of an availability cell
    pub fn from_label(label: &str) -> Self {
        if label.trim() == AVAILABLE_LABEL {
            AvailabilityMark::Available
        } else {
            AvailabilityMark::Unavailable
        }
    }

    /// Whether the night can be booked
    pub fn is_available(self) -> bool {
        self == AvailabilityMark::Available
    }
}

/// One campsite and its marks, one per header column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CampsiteRow {
    /// Site identifier as shown on the page (e.g. "014")
    pub site: String,
    /// Marks in column order
    pub marks: Vec<AvailabilityMark>,
}

impl CampsiteRow {
    /// Build a row from raw cell labels
    pub fn from_labels<S: AsRef<str>>(site: impl Into<String>, labels: &[S]) -> Self {
        Self {
            site: site.into(),
            marks: labels
                .iter()
                .map(|l| AvailabilityMark::from_label(l.as_ref()))
                .collect(),
        }
    }
}

/// Raw availability grid scraped from the campground page.
///
/// Day labels are unresolved; the month title gives the context needed to
/// turn them into dates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarGrid {
    /// Month/year title above the grid, e.g. "Mar / Apr 2024"
    pub month_title: String,
    /// Day-of-month label of every column, left to right
    pub day_labels: Vec<String>,
    /// Every loaded campsite row
    pub rows: Vec<CampsiteRow>,
}

fn selector(css: &str) -> Result<Selector, ScanError> {
    Selector::parse(css)
        .map_err(|e| ScanError::DataFormat(format!("Invalid selector {}: {:?}", css, e)))
}

fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Parse the fully loaded availability page into a [`CalendarGrid`]
pub fn extract_calendar(markup: &str) -> Result<CalendarGrid, ScanError> {
    let document = Html::parse_document(markup);

    let table = document
        .select(&selector(TABLE)?)
        .next()
        .ok_or_else(|| ScanError::ElementNotFound(TABLE.to_string()))?;

    let header_row = table
        .select(&selector(HEADER_ROW)?)
        .next()
        .ok_or_else(|| ScanError::ElementNotFound(format!("{} {}", TABLE, HEADER_ROW)))?;

    let day_labels: Vec<String> = header_row
        .select(&selector(HEADER_DATE)?)
        .map(text_of)
        .collect();

    let month_title = document
        .select(&selector(MONTH_TITLE)?)
        .next()
        .map(text_of)
        .ok_or_else(|| ScanError::ElementNotFound(MONTH_TITLE.to_string()))?;

    let site_selector = selector(SITE_BUTTON)?;
    let date_selector = selector(DATE_BUTTON)?;
    let mut rows = Vec::new();

    for (index, row) in table.select(&selector(BODY_ROW)?).enumerate() {
        let site = row
            .select(&site_selector)
            .next()
            .map(text_of)
            .ok_or_else(|| {
                ScanError::ElementNotFound(format!("{} in availability row {}", SITE_BUTTON, index))
            })?;

        let labels: Vec<String> = row.select(&date_selector).map(text_of).collect();

        if labels.len() != day_labels.len() {
            return Err(ScanError::DataFormat(format!(
                "Site {} has {} availability cells but the header has {} dates",
                site,
                labels.len(),
                day_labels.len()
            )));
        }

        rows.push(CampsiteRow::from_labels(site, &labels));
    }

    debug!(
        "Extracted {} campsite rows across {} columns ({})",
        rows.len(),
        day_labels.len(),
        month_title
    );

    Ok(CalendarGrid {
        month_title,
        day_labels,
        rows,
    })
}
