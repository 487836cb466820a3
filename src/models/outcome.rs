use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use super::ParsedDateTime;

/// Body of every `/book` response.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingOutcome {
    Success,
    Timeout,
    DateUnavailable,
    TimeSlotUnavailable,
    Error,
}

impl BookingOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingOutcome::Success => "success",
            BookingOutcome::Timeout => "timeout",
            BookingOutcome::DateUnavailable => "date_unavailable",
            BookingOutcome::TimeSlotUnavailable => "time_slot_unavailable",
            BookingOutcome::Error => "error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            BookingOutcome::Success => StatusCode::OK,
            BookingOutcome::DateUnavailable | BookingOutcome::TimeSlotUnavailable => {
                StatusCode::NOT_FOUND
            }
            BookingOutcome::Timeout | BookingOutcome::Error => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self, slot: &ParsedDateTime) -> String {
        match self {
            BookingOutcome::Success => "Appointment booked successfully!".to_string(),
            BookingOutcome::Timeout => "Failed to book appointment due to timeout.".to_string(),
            BookingOutcome::DateUnavailable => {
                format!("Date '{}' not available.", slot.date_label)
            }
            BookingOutcome::TimeSlotUnavailable => {
                format!("Time slot '{}' not available.", slot.time_label)
            }
            BookingOutcome::Error => "An unexpected error occurred.".to_string(),
        }
    }

    pub fn to_response(self, slot: &ParsedDateTime) -> Response {
        let body = MessageResponse::new(self.message(slot));
        (self.status(), axum::Json(body)).into_response()
    }
}
