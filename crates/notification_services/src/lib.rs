//! # Notification Services
//!
//! This crate provides a minimal client for sending text messages through the
//! Twilio REST API. Credentials and phone numbers come from the environment.

/// Twilio messaging client.
pub mod service;
/// Configuration, response and error types for the messaging client.
pub mod types;

pub use service::{TwilioService, format_phone_number};
pub use types::{NotificationError, TwilioOptions};
