//! Domain layer - Core business entities and value objects.
//!
//! This crate contains pure domain logic with no infrastructure dependencies:
//! users and their roles, food requests, donations, and the matching rules
//! that connect them.

pub mod constants;
pub mod donation;
pub mod error;
pub mod food_request;
pub mod matching;
pub mod password;
pub mod user;

pub use constants::*;
pub use donation::{Donation, DonationStatus, DonorDonation};
pub use error::{DomainError, DomainResult};
pub use food_request::{
    FoodRequest, NewFoodRequest, OpenRequest, ReceiverRequest, ReceiverRequests, RequestStatus,
};
pub use matching::RequestState;
pub use password::Password;
pub use user::{Actor, NewUser, Role, User, UserResponse};
