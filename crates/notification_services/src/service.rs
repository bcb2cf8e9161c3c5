use crate::types::*;
use reqwest::Client;
use std::time::Duration;

/// Client for Twilio's Messages API.
#[derive(Debug, Clone)]
pub struct TwilioService {
    client: Client,
    options: TwilioOptions,
}

impl TwilioService {
    /// Creates a new instance of the TwilioService for the given sender and recipient.
    pub fn new(options: TwilioOptions) -> Result<Self, NotificationError> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        Ok(Self { client, options })
    }

    /// Creates a service that sends through an existing HTTP client.
    pub fn with_client(client: Client, options: TwilioOptions) -> Self {
        Self { client, options }
    }

    /// URL of the account's message collection.
    pub fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.options.api_base_url.trim_end_matches('/'),
            self.options.account_sid
        )
    }

    /// Sends `body` as a text message to the configured recipient and returns the message SID.
    pub async fn send_message(&self, body: &str) -> Result<String, NotificationError> {
        let form = [
            ("To", format_phone_number(&self.options.to)),
            ("From", format_phone_number(&self.options.from)),
            ("Body", body.to_string()),
        ];

        let response = self
            .client
            .post(self.messages_url())
            .basic_auth(&self.options.account_sid, Some(&self.options.auth_token))
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            log::error!("❌ Twilio error ({}): {}", status, error_body);

            let message = match serde_json::from_str::<TwilioErrorResponse>(&error_body) {
                Ok(TwilioErrorResponse {
                    code: Some(code),
                    message,
                }) => format!("{}: {}", code, message),
                Ok(TwilioErrorResponse { message, .. }) => message,
                Err(_) => error_body,
            };

            return Err(NotificationError::Twilio {
                status: status.as_u16(),
                message,
            });
        }

        let message: MessageResponse = response.json().await?;
        log::info!(
            "📱 SMS sent to {} (sid {}, status {})",
            self.options.to,
            message.sid,
            message.status.as_deref().unwrap_or("unknown")
        );

        Ok(message.sid)
    }
}

/// Normalises a phone number to E.164 (`+` followed by digits).
pub fn format_phone_number(phone: &str) -> String {
    let phone = phone.trim();
    if phone.starts_with('+') {
        phone.to_string()
    } else {
        format!("+{}", phone.replace(['(', ')', '-', ' ', '.'], ""))
    }
}
