//! Auth module: domain types, account repository, service, token signing and
//! request-level session verification.

pub mod domain;
pub mod errors;
pub mod repo;
pub mod repository;
pub mod service;
pub mod token;
pub mod verifier;

pub use domain::{AuthToken, Role};
pub use service::AuthService;
pub use verifier::{verify_or_absent, JwtSessionVerifier, SessionVerifier};
