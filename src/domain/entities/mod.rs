//! Core domain entities.
//!
//! - [`ExternalData`] - A persisted, immutable fetch record
//! - [`WeatherReport`] - The canonical weather document stored in each record
//! - [`Source`] - Which provider (or the placeholder) produced a record
//!
//! Creation input is kept separate from the stored entity
//! ([`NewExternalData`]), so ids and timestamps are always store-assigned.

pub mod external_data;
pub mod source;
pub mod weather_report;

pub use external_data::{ExternalData, NewExternalData};
pub use source::Source;
pub use weather_report::WeatherReport;
