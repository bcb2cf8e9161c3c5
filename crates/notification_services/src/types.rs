use serde::Deserialize;

/// Environment variable holding the Twilio account SID
pub const TWILIO_ACCOUNT: &str = "TWILIO_ACCOUNT";
/// Environment variable holding the Twilio auth token
pub const TWILIO_ID: &str = "TWILIO_ID";
/// Environment variable holding the sending phone number
pub const TWILIO_FROM: &str = "TWILIO_FROM";
/// Environment variable holding the recipient phone number
pub const TWILIO_TO: &str = "TWILIO_TO";

/// Default Twilio REST API host
pub const TWILIO_API_BASE_URL: &str = "https://api.twilio.com";

/// Errors for sending text messages.
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    /// A required environment variable is unset or empty.
    #[error("{0} environment variable not set")]
    MissingCredential(String),

    /// The request never got a usable response.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Twilio answered with an error status.
    #[error("Twilio error ({status}): {message}")]
    Twilio {
        /// HTTP status code
        status: u16,
        /// Error message from the response body
        message: String,
    },
}

/// Credentials and numbers for one sender/recipient pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TwilioOptions {
    /// Account SID, also the basic-auth user
    pub account_sid: String,
    /// Auth token, the basic-auth password
    pub auth_token: String,
    /// Phone number messages are sent from
    pub from: String,
    /// Phone number messages are sent to
    pub to: String,
    /// REST API host, overridable for tests
    pub api_base_url: String,
}

impl TwilioOptions {
    /// Read the options from `TWILIO_ACCOUNT`, `TWILIO_ID`, `TWILIO_FROM` and `TWILIO_TO`.
    pub fn from_env() -> Result<Self, NotificationError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the options through `lookup`, treating empty values as missing.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, NotificationError> {
        let require = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .ok_or_else(|| NotificationError::MissingCredential(key.to_string()))
        };

        Ok(Self {
            account_sid: require(TWILIO_ACCOUNT)?,
            auth_token: require(TWILIO_ID)?,
            from: require(TWILIO_FROM)?,
            to: require(TWILIO_TO)?,
            api_base_url: TWILIO_API_BASE_URL.to_string(),
        })
    }
}

/// The part of Twilio's message resource we use.
#[derive(Debug, Deserialize)]
pub struct MessageResponse {
    /// Message SID, e.g. `SM...`
    pub sid: String,
    /// Delivery status at creation time (`queued`, `accepted`, ...)
    pub status: Option<String>,
}

/// Error body returned by Twilio.
#[derive(Debug, Deserialize)]
pub struct TwilioErrorResponse {
    /// Twilio error code
    pub code: Option<i64>,
    /// Human readable message
    pub message: String,
}
