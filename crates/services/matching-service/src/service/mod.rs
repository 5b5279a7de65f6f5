//! Service layer - business operations over the unit of work.

mod auth_service;
mod matching_engine;

#[cfg(test)]
mod test_support;

pub use auth_service::{AuthService, Authenticator, Claims, Registration, TokenResponse};
pub use matching_engine::{Confirmation, Dashboard, MatchingEngine, MatchingService};
