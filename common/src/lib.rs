//! Shared types for the court usage heatmap: bookings, the court table,
//! configuration, errors and the HTTP wire format.

pub mod booking;
pub mod config;
pub mod court;
pub mod error;
pub mod protocol;
