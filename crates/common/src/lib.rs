//! Shared helpers for the booking portal crates: logging setup, data
//! directory checks and the health response type.

pub mod env;
pub mod types;
pub mod utils;
