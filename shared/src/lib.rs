//! Platform-neutral pieces of the AirControl dashboard: the API's JSON
//! shapes, response decoding, form validation and chart shaping.

pub mod api;
pub mod dates;
pub mod forms;
pub mod models;
pub mod optimistic;
pub mod stats;
pub mod thresholds;

pub use api::{ApiEnvelope, ApiError, ApiMessage, ListPayload};
pub use models::*;
