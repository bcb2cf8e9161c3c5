use std::sync::Arc;

use chrono::NaiveDate;
use tracing::info;

use crate::calendar::extract_calendar;
use crate::date_range::RequestedDateRange;
use crate::reconciler::{AvailabilityResult, reconcile};
use crate::scan_types::*;

/// Something that can produce the fully loaded availability page
#[async_trait::async_trait]
pub trait CalendarSource: Send + Sync {
    /// Open `url`, show the calendar starting at `start` and return the page
    /// markup once every campsite row is loaded
    async fn fetch_calendar_markup(&self, url: &str, start: NaiveDate)
    -> Result<String, ScanError>;
}

/// Trait for delivering availability results
#[async_trait::async_trait]
pub trait NotificationService: Send + Sync {
    /// Tell the user about `availability`. Must send nothing when it is empty.
    async fn send_availability_notification(
        &self,
        availability: &AvailabilityResult,
        dates: &RequestedDateRange,
        campsite_url: &str,
    ) -> Result<(), NotificationError>;
}

/// Errors raised while delivering a notification
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    /// The SMS provider rejected the message or could not be reached
    #[error("SMS error: {0}")]
    Sms(String),
    /// Provider credentials or numbers are missing
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<notification_services::NotificationError> for NotificationError {
    fn from(error: notification_services::NotificationError) -> Self {
        match error {
            notification_services::NotificationError::MissingCredential(name) => {
                NotificationError::Configuration(format!("{} environment variable not set", name))
            }
            other => NotificationError::Sms(other.to_string()),
        }
    }
}

/// Runs one availability check from page load to notification
pub struct ScanExecutor {
    calendar_source: Arc<dyn CalendarSource>,
    notification_service: Arc<dyn NotificationService>,
}

impl ScanExecutor {
    /// Create an executor over the given page source and notifier
    pub fn new(
        calendar_source: Arc<dyn CalendarSource>,
        notification_service: Arc<dyn NotificationService>,
    ) -> Self {
        Self {
            calendar_source,
            notification_service,
        }
    }

    /// Check `request` once and notify if any site is open for every night
    pub async fn execute(&self, request: &ScanRequest) -> Result<AvailabilityResult, ScanError> {
        info!(
            "Checking {} for {}",
            request.campsite_url,
            request.dates.describe()
        );

        let markup = self
            .calendar_source
            .fetch_calendar_markup(&request.campsite_url, request.dates.start())
            .await?;

        let grid = extract_calendar(&markup)?;
        let availability = reconcile(&grid, &request.dates)?;

        info!(
            "{} of {} campsites are available for {}",
            availability.count(),
            grid.rows.len(),
            request.dates.describe()
        );

        self.notification_service
            .send_availability_notification(&availability, &request.dates, &request.campsite_url)
            .await?;

        Ok(availability)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::tests::availability_page;
    use crate::notification_service::{SmsNotificationService, SmsService};
    use crate::sms_service::MockSmsService;

    const URL: &str = "https://www.recreation.gov/camping/campgrounds/232447/availability";

    struct StaticPage {
        markup: String,
    }

    #[async_trait::async_trait]
    impl CalendarSource for StaticPage {
        async fn fetch_calendar_markup(
            &self,
            url: &str,
            _start: NaiveDate,
        ) -> Result<String, ScanError> {
            assert_eq!(url, URL);
            Ok(self.markup.clone())
        }
    }

    struct BrokenPage;

    #[async_trait::async_trait]
    impl CalendarSource for BrokenPage {
        async fn fetch_calendar_markup(
            &self,
            _url: &str,
            _start: NaiveDate,
        ) -> Result<String, ScanError> {
            Err(ScanError::ElementNotFound("single-date-picker".to_string()))
        }
    }

    struct RejectingSms;

    #[async_trait::async_trait]
    impl SmsService for RejectingSms {
        async fn send_sms(&self, _message: &str) -> Result<String, NotificationError> {
            Err(NotificationError::Sms("21211: invalid 'To' phone number".to_string()))
        }
    }

    fn executor(
        source: impl CalendarSource + 'static,
        sms: Arc<dyn SmsService>,
    ) -> ScanExecutor {
        ScanExecutor::new(
            Arc::new(source),
            Arc::new(SmsNotificationService::new(sms)),
        )
    }

    #[tokio::test]
    async fn test_execute_notifies_matching_sites() {
        let markup = availability_page(
            "Jun / Jul 2024",
            &["29", "30", "1", "2"],
            &[
                ("011", &["R", "A", "A", "A"]),
                ("012", &["A", "A", "R", "A"]),
                ("013", &["A", "A", "A", "R"]),
            ],
        );
        let sms = Arc::new(MockSmsService::new());
        let request = ScanRequest::new(
            URL,
            NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
            NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
        )
        .unwrap();

        let result = executor(StaticPage { markup }, sms.clone())
            .execute(&request)
            .await
            .unwrap();

        assert_eq!(result.available_sites, vec!["011", "013"]);

        let sent = sms.sent_messages();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].contains("2 campsites"));
        assert!(sent[0].contains("06/30/2024 to 07/01/2024"));
        assert!(sent[0].contains("(sites 011 013)"));
        assert!(sent[0].contains(URL));
    }

    #[tokio::test]
    async fn test_execute_without_matches_sends_nothing() {
        let markup = availability_page("July 2024", &["1", "2"], &[("011", &["A", "R"])]);
        let sms = Arc::new(MockSmsService::new());
        let request = ScanRequest::new(
            URL,
            NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 7, 2).unwrap(),
        )
        .unwrap();

        let result = executor(StaticPage { markup }, sms.clone())
            .execute(&request)
            .await
            .unwrap();

        assert!(result.is_empty());
        assert!(sms.sent_messages().is_empty());
    }

    #[tokio::test]
    async fn test_execute_propagates_page_errors() {
        let sms = Arc::new(MockSmsService::new());
        let request = ScanRequest::new(
            URL,
            NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 7, 2).unwrap(),
        )
        .unwrap();

        let err = executor(BrokenPage, sms.clone())
            .execute(&request)
            .await
            .unwrap_err();

        assert!(matches!(err, ScanError::ElementNotFound(_)));
        assert!(sms.sent_messages().is_empty());
    }

    #[tokio::test]
    async fn test_execute_propagates_delivery_errors() {
        let markup = availability_page("July 2024", &["1"], &[("011", &["A"])]);
        let sms = Arc::new(RejectingSms);
        let request = ScanRequest::new(
            URL,
            NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
        )
        .unwrap();

        let err = executor(StaticPage { markup }, sms)
            .execute(&request)
            .await
            .unwrap_err();

        assert!(matches!(err, ScanError::Notification(NotificationError::Sms(_))));
    }

    #[test]
    fn test_missing_credential_maps_to_configuration_error() {
        let error: NotificationError =
            notification_services::NotificationError::MissingCredential("TWILIO_TO".to_string())
                .into();

        assert!(matches!(error, NotificationError::Configuration(ref m) if m.contains("TWILIO_TO")));
    }
}
