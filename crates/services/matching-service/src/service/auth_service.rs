//! Authentication service - registration, login and session tokens.
//!
//! Sessions are stateless HS256 tokens naming the user id. The role is
//! never trusted from the token: every request reloads the user.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::infra::UnitOfWork;
use common::{AppError, AppResult, JwtConfig};
use domain::password::DUMMY_HASH;
use domain::{NewUser, Password, Role, User, SECONDS_PER_HOUR, TOKEN_TYPE_BEARER};

/// JWT claims payload
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: i32,
    pub role: String,
    pub exp: i64,
    pub iat: i64,
}

/// Token response returned after successful authentication
#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    /// JWT access token
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub access_token: String,
    /// Token type (always "Bearer")
    #[schema(example = "Bearer")]
    pub token_type: String,
    /// Token expiration time in seconds
    #[schema(example = 86400)]
    pub expires_in: i64,
    /// Role of the logged-in user, so clients can pick the right dashboard
    pub role: Role,
}

/// Everything needed to open an account.
#[derive(Debug, Clone)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    pub organization_name: Option<String>,
    pub location: String,
}

/// Authentication service trait for dependency injection.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Register a new user
    async fn register(&self, registration: Registration) -> AppResult<User>;

    /// Login and return JWT token
    async fn login(&self, email: String, password: String) -> AppResult<TokenResponse>;

    /// Verify JWT token and extract claims
    fn verify_token(&self, token: &str) -> AppResult<Claims>;

    /// Verify the token and load the user it names.
    async fn resolve_session(&self, token: &str) -> AppResult<User>;
}

fn generate_token(user: &User, config: &JwtConfig) -> AppResult<TokenResponse> {
    let now = Utc::now();
    let expires_at = now + Duration::hours(config.expiration_hours);

    let claims = Claims {
        sub: user.id,
        role: user.role.to_string(),
        exp: expires_at.timestamp(),
        iat: now.timestamp(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret_bytes()),
    )?;

    Ok(TokenResponse {
        access_token: token,
        token_type: TOKEN_TYPE_BEARER.to_string(),
        expires_in: config.expiration_hours * SECONDS_PER_HOUR,
        role: user.role,
    })
}

impl Registration {
    /// Trim the free-text fields, then require the mandatory ones.
    fn validated(self) -> AppResult<Self> {
        let name = self.name.trim().to_string();
        let location = self.location.trim().to_string();

        if name.is_empty() {
            return Err(AppError::validation("Name is required"));
        }
        if location.is_empty() {
            return Err(AppError::validation("Location is required"));
        }

        Ok(Self {
            name,
            location,
            organization_name: non_blank(self.organization_name),
            ..self
        })
    }
}

/// Blank optional text is the same as no text.
fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Concrete implementation of AuthService using Unit of Work.
pub struct Authenticator<U: UnitOfWork> {
    uow: Arc<U>,
    jwt: JwtConfig,
}

impl<U: UnitOfWork> Authenticator<U> {
    /// Create new auth service instance with Unit of Work
    pub fn new(uow: Arc<U>, jwt: JwtConfig) -> Self {
        Self { uow, jwt }
    }
}

#[async_trait]
impl<U: UnitOfWork> AuthService for Authenticator<U> {
    async fn register(&self, registration: Registration) -> AppResult<User> {
        // Email format is validated by the handler's ValidatedJson extractor
        let registration = registration.validated()?;

        if self
            .uow
            .users()
            .find_by_email(&registration.email)
            .await?
            .is_some()
        {
            return Err(AppError::already_exists("Email"));
        }

        let password_hash = Password::new(&registration.password)?.into_string();
        let user = self
            .uow
            .users()
            .create(NewUser {
                name: registration.name,
                email: registration.email,
                password_hash,
                role: registration.role,
                organization_name: registration.organization_name,
                location: registration.location,
            })
            .await?;

        tracing::info!(user_id = user.id, role = %user.role, "User registered");
        Ok(user)
    }

    async fn login(&self, email: String, password: String) -> AppResult<TokenResponse> {
        let user = self.uow.users().find_by_email(&email).await?;

        // Verify against a dummy hash when the email is unknown so both
        // failure paths cost the same.
        let stored_hash = user
            .as_ref()
            .map(|u| u.password_hash.clone())
            .unwrap_or_else(|| DUMMY_HASH.to_string());
        let password_valid = Password::from_hash(stored_hash).verify(&password);

        match user {
            Some(user) if password_valid => {
                tracing::info!(user_id = user.id, role = %user.role, "User logged in");
                generate_token(&user, &self.jwt)
            }
            _ => Err(AppError::InvalidCredentials),
        }
    }

    fn verify_token(&self, token: &str) -> AppResult<Claims> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt.secret_bytes()),
            &Validation::default(),
        )?;

        Ok(token_data.claims)
    }

    async fn resolve_session(&self, token: &str) -> AppResult<User> {
        let claims = self.verify_token(token)?;

        // The account behind a still-valid token may be gone
        self.uow
            .users()
            .find_by_id(claims.sub)
            .await?
            .ok_or(AppError::Unauthorized)
    }
}
