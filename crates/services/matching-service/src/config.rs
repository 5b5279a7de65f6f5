//! Service configuration loaded from environment variables.

use std::env;

use common::{AppError, AppResult, DatabaseConfig, JwtConfig, ServiceConfig};
use domain::{DEFAULT_JWT_EXPIRATION_HOURS, MAX_JWT_EXPIRATION_HOURS, MIN_JWT_SECRET_LENGTH};

/// Secret used by debug builds when `JWT_SECRET` is unset
const DEV_JWT_SECRET: &str = "dev-secret-key-minimum-32-chars!!";

/// Matching service configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServiceConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
}

impl Config {
    /// Load configuration from environment variables (and `.env`).
    ///
    /// # Errors
    /// Fails if `JWT_SECRET` is missing in a release build or shorter than
    /// [`MIN_JWT_SECRET_LENGTH`], or if `JWT_EXPIRATION_HOURS` is outside
    /// `1..=`[`MAX_JWT_EXPIRATION_HOURS`].
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();

        let jwt_secret = match env::var("JWT_SECRET") {
            Ok(secret) => secret,
            Err(_) if cfg!(debug_assertions) => {
                tracing::warn!("JWT_SECRET not set, using insecure default for development");
                DEV_JWT_SECRET.to_string()
            }
            Err(_) => {
                return Err(AppError::internal(
                    "JWT_SECRET environment variable must be set in production",
                ))
            }
        };

        if jwt_secret.len() < MIN_JWT_SECRET_LENGTH {
            return Err(AppError::internal(format!(
                "JWT_SECRET must be at least {} characters long",
                MIN_JWT_SECRET_LENGTH
            )));
        }

        let expiration_hours = check_expiration_hours(
            parse_var("JWT_EXPIRATION_HOURS").unwrap_or(DEFAULT_JWT_EXPIRATION_HOURS),
        )?;

        let server_defaults = ServiceConfig::default();
        let database_defaults = DatabaseConfig::default();

        Ok(Self {
            server: ServiceConfig {
                host: env::var("SERVER_HOST").unwrap_or(server_defaults.host),
                port: parse_var("SERVER_PORT").unwrap_or(server_defaults.port),
                ..server_defaults
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").unwrap_or(database_defaults.url),
                max_connections: parse_var("DATABASE_MAX_CONNECTIONS")
                    .unwrap_or(database_defaults.max_connections),
                min_connections: parse_var("DATABASE_MIN_CONNECTIONS")
                    .unwrap_or(database_defaults.min_connections),
            },
            jwt: JwtConfig {
                secret: jwt_secret,
                expiration_hours,
            },
        })
    }
}

/// Parse an optional variable; unset or unparsable means "use the default".
fn parse_var<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.parse().ok())
}

/// Token lifetimes must be positive and small enough for timestamp math.
fn check_expiration_hours(hours: i64) -> AppResult<i64> {
    if (1..=MAX_JWT_EXPIRATION_HOURS).contains(&hours) {
        Ok(hours)
    } else {
        Err(AppError::internal(format!(
            "JWT_EXPIRATION_HOURS must be between 1 and {}, got {}",
            MAX_JWT_EXPIRATION_HOURS, hours
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expiration_hours_bounds() {
        assert_eq!(check_expiration_hours(1).unwrap(), 1);
        assert_eq!(
            check_expiration_hours(MAX_JWT_EXPIRATION_HOURS).unwrap(),
            MAX_JWT_EXPIRATION_HOURS
        );

        for hours in [0, -24, MAX_JWT_EXPIRATION_HOURS + 1, i64::MAX] {
            assert!(
                matches!(check_expiration_hours(hours), Err(AppError::Internal(_))),
                "{} hours accepted",
                hours
            );
        }
    }
}
