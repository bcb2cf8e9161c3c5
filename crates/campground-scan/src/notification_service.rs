use std::sync::Arc;

use tracing::{debug, info};

use crate::date_range::RequestedDateRange;
use crate::executor::{NotificationError, NotificationService};
use crate::reconciler::AvailabilityResult;

/// Most site identifiers a message lists before it only gives the count
pub const MAX_LISTED_SITES: usize = 5;

/// Trait for SMS service implementations.
///
/// The recipient is part of the implementation's configuration.
#[async_trait::async_trait]
pub trait SmsService: Send + Sync {
    /// Send `message`, returning the provider's message id
    async fn send_sms(&self, message: &str) -> Result<String, NotificationError>;
}

/// Text for an availability alert, or `None` when nothing matched
pub fn compose_availability_message(
    availability: &AvailabilityResult,
    dates: &RequestedDateRange,
    campsite_url: &str,
) -> Option<String> {
    if availability.is_empty() {
        return None;
    }

    let count = availability.count();
    let noun = if count == 1 { "campsite" } else { "campsites" };

    let specific_sites = if count <= MAX_LISTED_SITES {
        format!(" (sites {})", availability.available_sites.join(" "))
    } else {
        String::new()
    };

    Some(format!(
        "I found {} {} available for the dates {}{}. Go to {} to reserve!",
        count,
        noun,
        dates.describe(),
        specific_sites,
        campsite_url
    ))
}

/// Sends availability alerts as a single text message
pub struct SmsNotificationService {
    sms_service: Arc<dyn SmsService>,
}

impl SmsNotificationService {
    /// Create a notifier that delivers through `sms_service`
    pub fn new(sms_service: Arc<dyn SmsService>) -> Self {
        Self { sms_service }
    }
}

#[async_trait::async_trait]
impl NotificationService for SmsNotificationService {
    async fn send_availability_notification(
        &self,
        availability: &AvailabilityResult,
        dates: &RequestedDateRange,
        campsite_url: &str,
    ) -> Result<(), NotificationError> {
        let Some(message) = compose_availability_message(availability, dates, campsite_url) else {
            debug!("No campsites available, not sending a message");
            return Ok(());
        };

        let external_id = self.sms_service.send_sms(&message).await?;
        info!(
            "Availability message for {} campsites sent ({})",
            availability.count(),
            external_id
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sms_service::MockSmsService;

    const URL: &str = "https://www.recreation.gov/camping/campgrounds/232447/availability";

    fn dates() -> RequestedDateRange {
        RequestedDateRange::parse("08/09/2024", "08/11/2024").unwrap()
    }

    fn result(sites: &[&str]) -> AvailabilityResult {
        AvailabilityResult {
            available_sites: sites.iter().map(|s| s.to_string()).collect(),
            unrendered_dates: Vec::new(),
        }
    }

    #[test]
    fn test_message_lists_up_to_five_sites() {
        let message =
            compose_availability_message(&result(&["003", "017", "042"]), &dates(), URL).unwrap();

        assert_eq!(
            message,
            format!(
                "I found 3 campsites available for the dates 08/09/2024 to 08/11/2024 (sites 003 017 042). Go to {} to reserve!",
                URL
            )
        );

        let five = result(&["1", "2", "3", "4", "5"]);
        let message = compose_availability_message(&five, &dates(), URL).unwrap();
        assert!(message.contains("(sites 1 2 3 4 5)"));
    }

    #[test]
    fn test_message_omits_sites_above_five() {
        let sites = ["101", "102", "103", "104", "105", "106", "107"];
        let message = compose_availability_message(&result(&sites), &dates(), URL).unwrap();

        assert!(message.contains("I found 7 campsites"));
        assert!(!message.contains("(sites"));
        assert!(sites.iter().all(|site| !message.contains(site)));
        assert!(message.contains(URL));
    }

    #[test]
    fn test_message_for_single_night_and_site() {
        let dates = RequestedDateRange::parse("08/09/2024", "08/09/2024").unwrap();
        let message = compose_availability_message(&result(&["B7"]), &dates, URL).unwrap();

        assert!(message.starts_with("I found 1 campsite available for the dates 08/09/2024 (sites B7)."));
    }

    #[test]
    fn test_no_message_without_matches() {
        assert!(compose_availability_message(&result(&[]), &dates(), URL).is_none());
    }

    #[tokio::test]
    async fn test_notifier_skips_empty_result() {
        let sms = Arc::new(MockSmsService::new());
        let notifier = SmsNotificationService::new(sms.clone());

        notifier
            .send_availability_notification(&result(&[]), &dates(), URL)
            .await
            .unwrap();

        assert!(sms.sent_messages().is_empty());
    }

    #[tokio::test]
    async fn test_notifier_sends_one_message() {
        let sms = Arc::new(MockSmsService::new());
        let notifier = SmsNotificationService::new(sms.clone());

        notifier
            .send_availability_notification(&result(&["003", "017"]), &dates(), URL)
            .await
            .unwrap();

        let sent = sms.sent_messages();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].contains("I found 2 campsites"));
        assert!(sent[0].contains("(sites 003 017)"));
    }
}
