pub mod booking;
pub mod browser;
pub mod datetime;
