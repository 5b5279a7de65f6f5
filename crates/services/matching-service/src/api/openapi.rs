//! OpenAPI documentation configuration.
//!
//! Provides Swagger UI for API exploration and testing.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{auth_handler, dashboard_handler, donation_handler, request_handler};
use crate::api::middleware::CurrentUser;
use crate::service::{Confirmation, Dashboard, TokenResponse};
use domain::{
    Donation, DonationStatus, DonorDonation, FoodRequest, OpenRequest, ReceiverRequest,
    ReceiverRequests, RequestStatus, Role, UserResponse,
};

/// OpenAPI documentation for the matching service
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Food Donation Matching API",
        version = "0.1.0",
        description = "Receivers post food requests, donors claim them, receivers confirm delivery",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    ),
    paths(
        // Authentication endpoints
        auth_handler::register,
        auth_handler::login,
        // Session endpoints
        dashboard_handler::get_current_user,
        dashboard_handler::get_dashboard,
        // Request endpoints
        request_handler::submit_request,
        request_handler::list_own_requests,
        request_handler::list_open_requests,
        // Donation endpoints
        donation_handler::donate,
        donation_handler::list_own_donations,
        donation_handler::confirm_donation,
    ),
    components(
        schemas(
            // Domain types
            Role,
            UserResponse,
            RequestStatus,
            FoodRequest,
            OpenRequest,
            ReceiverRequest,
            ReceiverRequests,
            DonationStatus,
            Donation,
            DonorDonation,
            // Service types
            TokenResponse,
            Confirmation,
            Dashboard,
            CurrentUser,
            // Request bodies
            auth_handler::RegisterRequest,
            auth_handler::LoginRequest,
            request_handler::CreateFoodRequest,
            donation_handler::CreateDonation,
            donation_handler::ConfirmDonation,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Registration and login"),
        (name = "Session", description = "Current user and role dashboard"),
        (name = "Requests", description = "Food requests posted by receivers"),
        (name = "Donations", description = "Donations and delivery confirmation")
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for JWT Bearer authentication
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT token obtained from /auth/login"))
                        .build(),
                ),
            );
        }
    }
}
