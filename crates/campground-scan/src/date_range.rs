use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::scan_types::ScanError;

/// Date format used on the command line, in the date picker and in messages
pub const DATE_FORMAT: &str = "%m/%d/%Y";

/// Parse a `MM/DD/YYYY` date
pub fn parse_date(input: &str) -> Result<NaiveDate, ScanError> {
    NaiveDate::parse_from_str(input.trim(), DATE_FORMAT)
        .map_err(|_| ScanError::InvalidDate(input.to_string()))
}

/// Format a date as `MM/DD/YYYY`
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Every day from `start` to `end` inclusive, in order.
///
/// Empty when `start` falls after `end`.
pub fn days_between(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    start
        .iter_days()
        .take_while(|day| *day <= end)
        .collect()
}

/// The nights a caller wants checked, never empty
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestedDateRange {
    start: NaiveDate,
    end: NaiveDate,
    days: Vec<NaiveDate>,
}

impl RequestedDateRange {
    /// Build the inclusive range, failing when it would be empty
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ScanError> {
        let days = days_between(start, end);

        if days.is_empty() {
            return Err(ScanError::EmptyDateRange {
                start: format_date(start),
                end: format_date(end),
            });
        }

        Ok(Self { start, end, days })
    }

    /// Parse both bounds from `MM/DD/YYYY` strings
    pub fn parse(start: &str, end: &str) -> Result<Self, ScanError> {
        Self::new(parse_date(start)?, parse_date(end)?)
    }

    /// First requested day
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last requested day
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of requested days
    pub fn len(&self) -> usize {
        self.days.len()
    }

    /// Whether no days are requested; never true for a constructed range
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Requested days in chronological order
    pub fn days(&self) -> &[NaiveDate] {
        &self.days
    }

    /// Whether `date` is one of the requested days
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Requested days formatted `MM/DD/YYYY`
    pub fn formatted_days(&self) -> Vec<String> {
        self.days.iter().copied().map(format_date).collect()
    }

    /// Fresh working set for one campsite row
    pub fn working_set(&self) -> BTreeSet<NaiveDate> {
        self.days.iter().copied().collect()
    }

    /// Human form used in messages: `06/01/2024` or `06/01/2024 to 06/03/2024`
    pub fn describe(&self) -> String {
        if self.start == self.end {
            format_date(self.start)
        } else {
            format!("{} to {}", format_date(self.start), format_date(self.end))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Days;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("06/15/2024").unwrap(), date(2024, 6, 15));
        assert!(matches!(
            parse_date("2024-06-15"),
            Err(ScanError::InvalidDate(s)) if s == "2024-06-15"
        ));
        assert!(parse_date("13/01/2024").is_err());
        assert!(parse_date("").is_err());
    }

    #[test]
    fn test_range_counts_every_day_inclusive() {
        let range = RequestedDateRange::new(date(2024, 2, 27), date(2024, 3, 2)).unwrap();

        // 2024 is a leap year
        assert_eq!(range.len(), 5);
        assert_eq!(
            range.formatted_days(),
            vec![
                "02/27/2024",
                "02/28/2024",
                "02/29/2024",
                "03/01/2024",
                "03/02/2024"
            ]
        );
        assert!(range.days().windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_range_length_matches_span() {
        let start = date(2023, 12, 20);
        for span in 0..40u64 {
            let end = start.checked_add_days(Days::new(span)).unwrap();
            let range = RequestedDateRange::new(start, end).unwrap();
            assert_eq!(range.len() as u64, span + 1);
            assert_eq!(range.days().first(), Some(&start));
            assert_eq!(range.days().last(), Some(&end));
        }
    }

    #[test]
    fn test_reversed_range_is_fatal() {
        assert!(days_between(date(2024, 6, 3), date(2024, 6, 1)).is_empty());

        let err = RequestedDateRange::parse("06/03/2024", "06/01/2024").unwrap_err();
        assert!(matches!(err, ScanError::EmptyDateRange { .. }));
    }

    #[test]
    fn test_single_day_range() {
        let range = RequestedDateRange::parse("07/04/2024", "07/04/2024").unwrap();

        assert_eq!(range.len(), 1);
        assert_eq!(range.describe(), "07/04/2024");
        assert!(range.contains(date(2024, 7, 4)));
        assert!(!range.contains(date(2024, 7, 5)));
    }

    #[test]
    fn test_describe_multi_day_range() {
        let range = RequestedDateRange::parse("07/04/2024", "07/06/2024").unwrap();
        assert_eq!(range.describe(), "07/04/2024 to 07/06/2024");
    }
}
