//! Sanity check trigger
//!
//! A wall-clock hour:minute at which the run also sends a "still alive"
//! letter, so a silent scheduler is noticed.

use crate::error::{Error, Result};
use chrono::Timelike;
use std::fmt;

/// Time of day at which the sanity letter goes out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SanityTrigger {
    hour: u32,
    minute: u32,
}

impl SanityTrigger {
    /// Create a trigger, rejecting out-of-range values
    pub fn new(hour: u32, minute: u32) -> Result<Self> {
        if hour > 23 {
            return Err(Error::ConfigValidation(format!(
                "sanity_hour must be between 0 and 23, got {}",
                hour
            )));
        }
        if minute > 59 {
            return Err(Error::ConfigValidation(format!(
                "sanity_minute must be between 0 and 59, got {}",
                minute
            )));
        }
        Ok(Self { hour, minute })
    }

    /// Exact hour:minute match; seconds are ignored
    pub fn is_due<T: Timelike>(&self, now: &T) -> bool {
        now.hour() == self.hour && now.minute() == self.minute
    }
}

impl fmt::Display for SanityTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}
