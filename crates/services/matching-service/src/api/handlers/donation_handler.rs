//! Donation handlers.

use axum::{
    extract::{Extension, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::service::Confirmation;
use common::AppResult;
use domain::{Donation, DonorDonation};

/// A donor's offer for one open request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateDonation {
    /// Request being claimed
    #[validate(range(min = 1, message = "Invalid request id"))]
    #[schema(example = 1)]
    pub request_id: i32,
    /// Note for the receiver
    #[schema(example = "Can drop off Saturday morning")]
    pub message: Option<String>,
}

/// A receiver confirming that a donation arrived
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ConfirmDonation {
    #[validate(range(min = 1, message = "Invalid donation id"))]
    #[schema(example = 1)]
    pub donation_id: i32,
    #[validate(range(min = 1, message = "Invalid request id"))]
    #[schema(example = 1)]
    pub request_id: i32,
}

/// Create donation routes
pub fn donation_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(donate))
        .route("/mine", get(list_own_donations))
        .route("/confirm", post(confirm_donation))
}

/// Claim an open request (donors only)
#[utoipa::path(
    post,
    path = "/donations",
    tag = "Donations",
    security(("bearer_auth" = [])),
    request_body = CreateDonation,
    responses(
        (status = 201, description = "Donation created", body = Donation),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Donors only"),
        (status = 404, description = "Request not found"),
        (status = 409, description = "Request already claimed or fulfilled")
    )
)]
pub async fn donate(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateDonation>,
) -> AppResult<(StatusCode, Json<Donation>)> {
    let donation = state
        .matching_service
        .donate(current_user.actor(), payload.request_id, payload.message)
        .await?;

    Ok((StatusCode::CREATED, Json(donation)))
}

/// The caller's own donations (donors only)
#[utoipa::path(
    get,
    path = "/donations/mine",
    tag = "Donations",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Own donations, newest first", body = Vec<DonorDonation>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Donors only")
    )
)]
pub async fn list_own_donations(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<DonorDonation>>> {
    let donations = state
        .matching_service
        .list_own_donations(current_user.actor())
        .await?;

    Ok(Json(donations))
}

/// Confirm a donation, fulfilling it and its request (owning receiver only)
#[utoipa::path(
    post,
    path = "/donations/confirm",
    tag = "Donations",
    security(("bearer_auth" = [])),
    request_body = ConfirmDonation,
    responses(
        (status = 200, description = "Donation and request fulfilled", body = Confirmation),
        (status = 400, description = "Donation does not belong to the request"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Not the request owner"),
        (status = 404, description = "Request or donation not found")
    )
)]
pub async fn confirm_donation(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<ConfirmDonation>,
) -> AppResult<Json<Confirmation>> {
    let confirmation = state
        .matching_service
        .confirm_donation(current_user.actor(), payload.donation_id, payload.request_id)
        .await?;

    Ok(Json(confirmation))
}
