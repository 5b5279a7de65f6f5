//! Session-scoped handlers: who am I, and my landing page.

use axum::{
    extract::{Extension, State},
    response::Json,
    routing::get,
    Router,
};

use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::service::Dashboard;
use common::AppResult;

/// Create routes for the current session
pub fn dashboard_routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(get_current_user))
        .route("/dashboard", get(get_dashboard))
}

/// Get current authenticated user
#[utoipa::path(
    get,
    path = "/me",
    tag = "Session",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user", body = CurrentUser),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn get_current_user(
    Extension(current_user): Extension<CurrentUser>,
) -> Json<CurrentUser> {
    Json(current_user)
}

/// Role-specific dashboard.
///
/// Donors get the open requests plus their donations; receivers get their
/// requests split into open and fulfilled.
#[utoipa::path(
    get,
    path = "/dashboard",
    tag = "Session",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Dashboard for the caller's role", body = Dashboard),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn get_dashboard(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
) -> AppResult<Json<Dashboard>> {
    let dashboard = state
        .matching_service
        .dashboard(current_user.actor())
        .await?;

    Ok(Json(dashboard))
}
