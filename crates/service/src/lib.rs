//! Service layer for the booking portal.
//! - `auth`: accounts, session tokens and request verification.
//! - `guard`: the route guard for protected page prefixes.
//! - `service_form`: validation schema for bookable services.
//! - `catalog`: persisted services, fed through the schema.
//! - `storage`: JSON map store and blob storage.

pub mod auth;
pub mod catalog;
pub mod errors;
pub mod guard;
pub mod runtime;
pub mod service_form;
pub mod storage;
