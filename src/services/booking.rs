use std::fmt;

use chrono::NaiveDate;

use crate::config::AutomationSettings;
use crate::models::{BookingOutcome, BookingTarget, ContactDetails, ParsedDateTime};
use crate::services::browser::{BrowserError, BrowserProvider, BrowserSession};
use crate::services::datetime::months_to_advance;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    OpenPage,
    NextMonth,
    SelectDate,
    SelectTime,
    OpenForm,
    FillForm,
    Submit,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::OpenPage => "open scheduling page",
            Step::NextMonth => "go to next month",
            Step::SelectDate => "select date",
            Step::SelectTime => "select time",
            Step::OpenForm => "open contact form",
            Step::FillForm => "fill contact form",
            Step::Submit => "submit booking",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error)]
#[error("{step} failed: {source}")]
pub struct StepFailure {
    pub step: Step,
    #[source]
    pub source: BrowserError,
}

impl StepFailure {
    pub fn outcome(&self) -> BookingOutcome {
        match (self.step, self.source.is_timeout()) {
            (Step::SelectDate, true) => BookingOutcome::DateUnavailable,
            (Step::SelectTime, true) => BookingOutcome::TimeSlotUnavailable,
            (_, true) => BookingOutcome::Timeout,
            (_, false) => BookingOutcome::Error,
        }
    }
}

fn at(step: Step) -> impl FnOnce(BrowserError) -> StepFailure {
    move |source| StepFailure { step, source }
}

/// Runs one booking attempt against `target`. `today` decides which month the
/// calendar opens on. The browser session is closed on every path once it
/// has been opened.
pub async fn book_appointment(
    browser: &dyn BrowserProvider,
    target: &BookingTarget,
    settings: &AutomationSettings,
    contact: &ContactDetails,
    slot: &ParsedDateTime,
    today: NaiveDate,
) -> BookingOutcome {
    let mut session = match browser.open_session(target.headless).await {
        Ok(session) => session,
        Err(e) => {
            tracing::error!(error = %e, "failed to start browser session");
            return if e.is_timeout() {
                BookingOutcome::Timeout
            } else {
                BookingOutcome::Error
            };
        }
    };

    let result = run_steps(session.as_mut(), target, settings, contact, slot, today).await;

    if let Err(e) = session.close().await {
        tracing::warn!(error = %e, "failed to close browser session");
    }

    match result {
        Ok(()) => {
            tracing::info!("appointment booked successfully");
            BookingOutcome::Success
        }
        Err(failure) => {
            let outcome = failure.outcome();
            tracing::error!(outcome = outcome.as_str(), error = %failure, "booking attempt failed");
            outcome
        }
    }
}

async fn run_steps(
    session: &mut dyn BrowserSession,
    target: &BookingTarget,
    settings: &AutomationSettings,
    contact: &ContactDetails,
    slot: &ParsedDateTime,
    today: NaiveDate,
) -> Result<(), StepFailure> {
    session.goto(&target.url).await.map_err(at(Step::OpenPage))?;
    session
        .wait_for_network_idle()
        .await
        .map_err(at(Step::OpenPage))?;

    let clicks = months_to_advance(today, slot.date_time.date());
    for _ in 0..clicks {
        tracing::info!("navigating to the next month");
        session
            .click_label(&target.next_month_label)
            .await
            .map_err(at(Step::NextMonth))?;
    }

    tracing::info!(date = %slot.date_label, "selecting date");
    session
        .click_label(&target.date_cell_label(&slot.date_label))
        .await
        .map_err(at(Step::SelectDate))?;

    tracing::info!(time = %slot.time_label, "selecting time");
    session
        .click_button(&slot.time_label, target.exact_time_match)
        .await
        .map_err(at(Step::SelectTime))?;

    session
        .click_label(&target.next_button_label(&slot.time_label))
        .await
        .map_err(at(Step::OpenForm))?;
    session
        .wait_for_network_idle()
        .await
        .map_err(at(Step::OpenForm))?;

    tracing::info!(fields = target.fields.len(), "filling in the booking form");
    for field in &target.fields {
        session
            .click_label(&field.label)
            .await
            .map_err(at(Step::FillForm))?;
        session
            .fill_label(&field.label, field.source.value(contact))
            .await
            .map_err(at(Step::FillForm))?;
    }

    session
        .click_button(&target.submit_button, false)
        .await
        .map_err(at(Step::Submit))?;

    // Nothing on the page confirms the booking; give it time to go through.
    tokio::time::sleep(settings.post_submit_delay).await;

    Ok(())
}
