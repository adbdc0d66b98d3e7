//! User-visible messages raised by the dashboard workflows.

use serde::Serialize;

pub const LOAD_FAILED: &str = "Failed to load seat bookings. Please refresh the page.";
pub const SEAT_TAKEN: &str = "This seat may already be booked. Please try another seat.";
pub const BOOKING_FAILED: &str = "Failed to book seat. Please try again.";
pub const INVALID_CODE: &str = "Invalid code. Please contact the administrator.";
pub const RESET_FAILED: &str = "Failed to reset all buses. Please try again.";
pub const RESET_DONE: &str = "All seat bookings have been cleared successfully.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }
}
