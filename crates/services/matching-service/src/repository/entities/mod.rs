//! SeaORM entity definitions.

pub mod donation;
pub mod food_request;
pub mod user;
