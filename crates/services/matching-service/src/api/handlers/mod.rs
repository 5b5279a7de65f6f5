//! HTTP request handlers.

pub mod auth_handler;
pub mod dashboard_handler;
pub mod donation_handler;
pub mod request_handler;

pub use auth_handler::auth_routes;
pub use dashboard_handler::dashboard_routes;
pub use donation_handler::donation_routes;
pub use request_handler::request_routes;
