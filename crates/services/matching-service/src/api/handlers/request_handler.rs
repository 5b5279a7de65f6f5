//! Food request handlers.

use axum::{
    extract::{Extension, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use common::AppResult;
use domain::{FoodRequest, NewFoodRequest, OpenRequest, ReceiverRequests};

/// New food request posted by a receiver
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateFoodRequest {
    /// What kind of food is needed
    #[validate(length(min = 1, message = "Food type is required"))]
    #[schema(example = "Canned vegetables")]
    pub food_type: String,
    /// How much is needed
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    #[schema(example = 20, minimum = 1)]
    pub quantity: i32,
    /// Where the food should go
    #[validate(length(min = 1, message = "Location is required"))]
    #[schema(example = "Springfield")]
    pub location: String,
    /// Free-text details
    #[serde(default)]
    #[schema(example = "For the Friday community dinner")]
    pub description: String,
}

/// Filter for the open request listing
#[derive(Debug, Deserialize, IntoParams)]
pub struct OpenRequestsQuery {
    /// Case-insensitive substring of the location
    pub location: Option<String>,
}

/// Create food request routes
pub fn request_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(submit_request))
        .route("/mine", get(list_own_requests))
        .route("/open", get(list_open_requests))
}

/// Post a new food request (receivers only)
#[utoipa::path(
    post,
    path = "/requests",
    tag = "Requests",
    security(("bearer_auth" = [])),
    request_body = CreateFoodRequest,
    responses(
        (status = 201, description = "Request created", body = FoodRequest),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Receivers only")
    )
)]
pub async fn submit_request(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateFoodRequest>,
) -> AppResult<(StatusCode, Json<FoodRequest>)> {
    let request = state
        .matching_service
        .submit_request(
            current_user.actor(),
            NewFoodRequest {
                food_type: payload.food_type,
                quantity: payload.quantity,
                location: payload.location,
                description: payload.description,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(request)))
}

/// The caller's own requests, split into open and fulfilled (receivers only)
#[utoipa::path(
    get,
    path = "/requests/mine",
    tag = "Requests",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Own requests", body = ReceiverRequests),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Receivers only")
    )
)]
pub async fn list_own_requests(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
) -> AppResult<Json<ReceiverRequests>> {
    let requests = state
        .matching_service
        .list_own_requests(current_user.actor())
        .await?;

    Ok(Json(requests))
}

/// Requests still waiting for a donor (donors only)
#[utoipa::path(
    get,
    path = "/requests/open",
    tag = "Requests",
    security(("bearer_auth" = [])),
    params(OpenRequestsQuery),
    responses(
        (status = 200, description = "Open requests, newest first", body = Vec<OpenRequest>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Donors only")
    )
)]
pub async fn list_open_requests(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Query(query): Query<OpenRequestsQuery>,
) -> AppResult<Json<Vec<OpenRequest>>> {
    let requests = state
        .matching_service
        .list_open_requests(current_user.actor(), query.location)
        .await?;

    Ok(Json(requests))
}
