//! Domain-level constants.
//!
//! These constants define business rules and validation requirements.

// =============================================================================
// User Roles
// =============================================================================

/// Role of users who claim food requests
pub const ROLE_DONOR: &str = "donor";

/// Role of users who post food requests
pub const ROLE_RECEIVER: &str = "receiver";

/// All valid role values
pub const VALID_ROLES: &[&str] = &[ROLE_DONOR, ROLE_RECEIVER];

// =============================================================================
// Statuses
// =============================================================================

/// Waiting for a donor (requests) or for confirmation (donations)
pub const STATUS_PENDING: &str = "pending";

/// Donation accepted and on its way
pub const STATUS_IN_PROGRESS: &str = "in_progress";

/// Terminal status for both requests and donations
pub const STATUS_FULFILLED: &str = "fulfilled";

// =============================================================================
// Validation
// =============================================================================

/// Minimum password length requirement
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Smallest quantity a receiver may ask for
pub const MIN_QUANTITY: i32 = 1;

// =============================================================================
// Authentication
// =============================================================================

/// Default JWT token expiration in hours
pub const DEFAULT_JWT_EXPIRATION_HOURS: i64 = 24;

/// Longest accepted session lifetime in hours (one year)
pub const MAX_JWT_EXPIRATION_HOURS: i64 = 24 * 365;

/// Minimum JWT secret length (security requirement)
pub const MIN_JWT_SECRET_LENGTH: usize = 32;

/// Seconds per hour (for token expiration calculation)
pub const SECONDS_PER_HOUR: i64 = 3600;

/// Authorization header prefix for Bearer tokens
pub const BEARER_TOKEN_PREFIX: &str = "Bearer ";

/// JWT token type identifier
pub const TOKEN_TYPE_BEARER: &str = "Bearer";
