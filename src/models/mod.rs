pub mod booking;
pub mod outcome;
pub mod target;

pub use booking::{BookingRequest, ContactDetails, ParsedDateTime};
pub use outcome::{BookingOutcome, MessageResponse};
pub use target::{BookingTarget, FieldSource, FormField};
