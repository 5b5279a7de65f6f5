//! Session middleware: bearer token to `CurrentUser`.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::api::AppState;
use common::AppError;
use domain::{Actor, Role, BEARER_TOKEN_PREFIX};

/// Authenticated user, reloaded from the store on every request.
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct CurrentUser {
    pub id: i32,
    pub name: String,
    pub role: Role,
}

impl CurrentUser {
    /// Identity handed to the matching engine
    pub fn actor(&self) -> Actor {
        Actor::new(self.id, self.role)
    }
}

/// JWT authentication middleware.
///
/// Extracts the bearer token, verifies it, loads the user it names and
/// injects the CurrentUser into the request extensions. The role always
/// comes from the stored user, never from the token.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(AppError::Unauthorized)?;

    let token = auth_header
        .strip_prefix(BEARER_TOKEN_PREFIX)
        .ok_or(AppError::Unauthorized)?;

    let user = state.auth_service.resolve_session(token).await?;

    request.extensions_mut().insert(CurrentUser {
        id: user.id,
        name: user.name,
        role: user.role,
    });

    Ok(next.run(request).await)
}
