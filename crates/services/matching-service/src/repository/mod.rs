//! Repository layer for data access.
//!
//! Each table has a connection-generic ledger holding its queries, so the
//! same SQL runs on the pool and inside a unit-of-work transaction, plus a
//! pool-backed store implementing the mockable repository trait.

pub mod entities;
mod donation_repository;
mod request_repository;
mod user_repository;

pub use donation_repository::{DonationLedger, DonationRepository, DonationStore};
pub use request_repository::{RequestLedger, RequestRepository, RequestStore};
pub use user_repository::{UserRepository, UserStore};

#[cfg(any(test, feature = "test-utils"))]
pub use donation_repository::MockDonationRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use request_repository::MockRequestRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use user_repository::MockUserRepository;
