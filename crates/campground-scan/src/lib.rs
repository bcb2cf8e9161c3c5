//! # Campground Scan
//!
//! This crate checks a recreation.gov availability calendar for campsites that
//! are open on every night of a requested date range. It parses the loaded
//! calendar page, resolves its column headers to dates, and sends a text
//! message when any campsite matches.

/// Types for campground scan operations
mod scan_types;
pub use scan_types::*;

/// Requested date ranges and the `MM/DD/YYYY` format
mod date_range;
pub use date_range::*;

/// Parsing the availability grid out of the page markup
mod calendar;
pub use calendar::*;

/// Resolving header columns to dates and matching campsite rows
mod reconciler;
pub use reconciler::*;

/// Pipeline that runs a single scan
mod executor;
pub use executor::*;

/// Availability message composition and delivery
mod notification_service;
pub use notification_service::*;

/// SMS delivery backends
mod sms_service;
pub use sms_service::*;
