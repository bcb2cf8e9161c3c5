use std::sync::Mutex;

use async_trait::async_trait;
use notification_services::{TwilioOptions, TwilioService};
use tracing::info;

use crate::{NotificationError, SmsService};

/// Twilio SMS service implementation.
///
/// Credentials and numbers are read from the environment when a message is
/// sent, so a missing variable only surfaces if there is something to send.
pub struct TwilioSmsService;

impl TwilioSmsService {
    /// Create a new Twilio SMS service
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SmsService for TwilioSmsService {
    async fn send_sms(&self, message: &str) -> Result<String, NotificationError> {
        let options = TwilioOptions::from_env()?;
        info!("Sending SMS to {} with message: {}", options.to, message);

        let service = TwilioService::new(options)?;
        let sid = service.send_message(message).await?;

        Ok(sid)
    }
}

/// Mock SMS service for development/testing
pub struct MockSmsService {
    sent: Mutex<Vec<String>>,
}

impl MockSmsService {
    /// Create a mock that keeps every message it is asked to send
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
        }
    }

    /// Messages "sent" so far, oldest first
    pub fn sent_messages(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl SmsService for MockSmsService {
    async fn send_sms(&self, message: &str) -> Result<String, NotificationError> {
        info!("📱 [MOCK SMS] Message: {}", message);

        self.sent
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(message.to_string());

        let mock_id = format!("mock-sms-{}", uuid::Uuid::new_v4());
        Ok(mock_id)
    }
}
