use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::response::Response;
use chrono::Local;
use serde_json::Value;
use tracing::Instrument;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{BookingOutcome, BookingRequest};
use crate::services::booking::book_appointment;
use crate::services::datetime::convert_iso;
use crate::state::AppState;

/// `POST /book`. The body is read as JSON whatever the `Content-Type` says,
/// and the response is only sent once the browser run has finished.
/// Dropping the request does not cancel the run.
pub async fn book(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Response, AppError> {
    let payload: Value = serde_json::from_slice(&body).map_err(|e| {
        tracing::error!(error = %e, "JSON decoding error");
        AppError::InvalidJson
    })?;
    tracing::debug!(payload = %payload, "received booking request");

    let request = BookingRequest::from_value(&payload);
    let slot = request.date.as_deref().and_then(convert_iso);

    let (Some(contact), Some(slot)) = (request.contact(), slot) else {
        tracing::error!(
            has_name = request.name.is_some(),
            has_email = request.email.is_some(),
            has_phone = request.phone.is_some(),
            has_details = request.details.is_some(),
            has_date = request.date.is_some(),
            "invalid request, missing required data"
        );
        return Err(AppError::MissingData);
    };

    let span = tracing::info_span!(
        "booking",
        attempt = %Uuid::new_v4(),
        booking_target = %state.config.target.name,
        date = %slot.date_label,
        time = %slot.time_label
    );

    let task_state = Arc::clone(&state);
    let task_slot = slot.clone();
    let today = Local::now().date_naive();
    let attempt = tokio::spawn(
        async move {
            book_appointment(
                task_state.browser.as_ref(),
                &task_state.config.target,
                &task_state.config.automation,
                &contact,
                &task_slot,
                today,
            )
            .await
        }
        .instrument(span),
    );

    let outcome = attempt.await.unwrap_or_else(|e| {
        tracing::error!(error = %e, "booking task aborted");
        BookingOutcome::Error
    });

    Ok(outcome.to_response(&slot))
}
