//! # RecGov
//!
//! This crate drives a browser through the recreation.gov campground
//! availability page and hands back the fully loaded markup.

/// WebDriver session and page interactions for the availability calendar.
mod browser;
pub use browser::*;
