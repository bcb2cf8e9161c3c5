//! Resolves the scraped calendar header into absolute dates and decides which
//! campsites are open for every requested night.

use chrono::{Month, NaiveDate};
use tracing::{debug, warn};

use crate::calendar::{CalendarGrid, CampsiteRow};
use crate::date_range::{RequestedDateRange, format_date};
use crate::scan_types::ScanError;

/// Label of the first column that belongs to the later month of a split header
pub const FIRST_DAY_LABEL: &str = "1";

/// Month/year context printed above the availability grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonthContext {
    /// "April 2024": every column is in this month
    Single {
        /// Displayed month
        month: Month,
        /// Displayed year
        year: i32,
    },
    /// "March / April 2024": the grid crosses a month boundary
    Spanning {
        /// Month the grid starts in
        ending: Month,
        /// Year of the earlier month. Same as `starting_year` unless the
        /// title spells out its own year.
        ending_year: i32,
        /// Month that starts at the column labelled "1"
        starting: Month,
        /// Year printed after the later month
        starting_year: i32,
    },
}

fn parse_segment(segment: &str, title: &str) -> Result<(Month, Option<i32>), ScanError> {
    let invalid = || ScanError::DataFormat(format!("Unrecognised month title: {:?}", title));

    let mut words = segment.split_whitespace();
    let month = words
        .next()
        .and_then(|word| word.trim_end_matches(',').parse::<Month>().ok())
        .ok_or_else(invalid)?;
    let year = match words.next() {
        Some(word) => Some(word.parse::<i32>().map_err(|_| invalid())?),
        None => None,
    };

    if words.next().is_some() {
        return Err(invalid());
    }

    Ok((month, year))
}

impl MonthContext {
    /// Parse a title such as "April 2024", "Mar / Apr 2024" or
    /// "December 2024 / January 2025".
    ///
    /// A spanning title without its own year for the earlier month takes
    /// the later month's year as printed. No year rollover is inferred.
    pub fn parse(title: &str) -> Result<Self, ScanError> {
        let missing_year =
            || ScanError::DataFormat(format!("Month title has no year: {:?}", title));

        match title.split_once('/') {
            Some((ending, starting)) => {
                let (starting, starting_year) = parse_segment(starting, title)?;
                let starting_year = starting_year.ok_or_else(missing_year)?;
                let (ending, ending_year) = parse_segment(ending, title)?;

                Ok(MonthContext::Spanning {
                    ending,
                    ending_year: ending_year.unwrap_or(starting_year),
                    starting,
                    starting_year,
                })
            }
            None => {
                let (month, year) = parse_segment(title, title)?;
                Ok(MonthContext::Single {
                    month,
                    year: year.ok_or_else(missing_year)?,
                })
            }
        }
    }
}

/// One displayed column and the date it stands for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderColumn {
    /// Day-of-month label as scraped
    pub day_label: String,
    /// Absolute date of the column
    pub date: NaiveDate,
}

/// Header columns resolved to absolute dates, in display order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarHeader {
    columns: Vec<HeaderColumn>,
}

impl CalendarHeader {
    /// Resolve every day label against the month/year title.
    ///
    /// For a spanning title the column labelled "1" starts the later month;
    /// every column before it belongs to the earlier month.
    pub fn resolve<S: AsRef<str>>(title: &str, day_labels: &[S]) -> Result<Self, ScanError> {
        let context = MonthContext::parse(title)?;

        let split = match context {
            MonthContext::Single { .. } => 0,
            MonthContext::Spanning { .. } => day_labels
                .iter()
                .position(|label| label.as_ref().trim() == FIRST_DAY_LABEL)
                .ok_or_else(|| {
                    ScanError::DataFormat(format!(
                        "Month title {:?} spans two months but no column is labelled {}",
                        title, FIRST_DAY_LABEL
                    ))
                })?,
        };

        let columns = day_labels
            .iter()
            .enumerate()
            .map(|(index, label)| -> Result<HeaderColumn, ScanError> {
                let label = label.as_ref().trim();
                let (month, year) = match context {
                    MonthContext::Single { month, year } => (month, year),
                    MonthContext::Spanning {
                        ending,
                        ending_year,
                        ..
                    } if index < split => (ending, ending_year),
                    MonthContext::Spanning {
                        starting,
                        starting_year,
                        ..
                    } => (starting, starting_year),
                };

                let day = label.parse::<u32>().map_err(|_| {
                    ScanError::DataFormat(format!("Column {} has no day number: {:?}", index, label))
                })?;

                let date = NaiveDate::from_ymd_opt(year, month.number_from_month(), day)
                    .ok_or_else(|| {
                        ScanError::DataFormat(format!(
                            "Day {} does not exist in {} {}",
                            day,
                            month.name(),
                            year
                        ))
                    })?;

                Ok(HeaderColumn {
                    day_label: label.to_string(),
                    date,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { columns })
    }

    /// Resolved columns in display order
    pub fn columns(&self) -> &[HeaderColumn] {
        &self.columns
    }

    /// Number of displayed columns
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether the grid shows no columns at all
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Whether any column stands for `date`
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.columns.iter().any(|column| column.date == date)
    }
}

/// Outcome of checking every campsite row against the requested nights
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AvailabilityResult {
    /// Sites open on every requested night, in page order
    pub available_sites: Vec<String>,
    /// Requested nights the grid never displayed. No site can match while
    /// this is non-empty.
    pub unrendered_dates: Vec<NaiveDate>,
}

impl AvailabilityResult {
    /// Number of matching sites
    pub fn count(&self) -> usize {
        self.available_sites.len()
    }

    /// Whether no site matched
    pub fn is_empty(&self) -> bool {
        self.available_sites.is_empty()
    }
}

/// Whether `row` is open on every requested night.
///
/// Walks the row's marks in column order and crosses off each requested date
/// found available; stops as soon as nothing is left to find.
pub fn row_is_eligible(
    header: &CalendarHeader,
    row: &CampsiteRow,
    dates: &RequestedDateRange,
) -> bool {
    let mut remaining = dates.working_set();

    for (column, mark) in header.columns().iter().zip(&row.marks) {
        if mark.is_available() {
            remaining.remove(&column.date);
        }

        if remaining.is_empty() {
            return true;
        }
    }

    false
}

/// Check every row against the requested nights
pub fn find_available_sites(
    header: &CalendarHeader,
    rows: &[CampsiteRow],
    dates: &RequestedDateRange,
) -> AvailabilityResult {
    let unrendered_dates: Vec<NaiveDate> = dates
        .days()
        .iter()
        .copied()
        .filter(|date| !header.covers(*date))
        .collect();

    let available_sites = rows
        .iter()
        .filter(|row| row_is_eligible(header, row, dates))
        .map(|row| row.site.clone())
        .collect();

    AvailabilityResult {
        available_sites,
        unrendered_dates,
    }
}

/// Resolve the grid's header and check all of its rows
pub fn reconcile(
    grid: &CalendarGrid,
    dates: &RequestedDateRange,
) -> Result<AvailabilityResult, ScanError> {
    let header = CalendarHeader::resolve(&grid.month_title, &grid.day_labels)?;

    if let (Some(first), Some(last)) = (header.columns().first(), header.columns().last()) {
        debug!(
            "Calendar shows {} to {}",
            format_date(first.date),
            format_date(last.date)
        );
    }

    let result = find_available_sites(&header, &grid.rows, dates);

    if !result.unrendered_dates.is_empty() {
        let missing: Vec<String> = result
            .unrendered_dates
            .iter()
            .copied()
            .map(format_date)
            .collect();
        warn!(
            "Requested dates not shown on the calendar, no site can match: {}",
            missing.join(", ")
        );
    }

    Ok(result)
}
