// =============================================================================
// DevMatch Backend Constants
// =============================================================================
// This file contains all constants used throughout the backend to enable
// easy tuning and configuration from a single location.

// =============================================================================
// SERVER CONFIGURATION
// =============================================================================

/// Default server port if not specified in environment
pub const DEFAULT_SERVER_PORT: u16 = 3000;

/// Default pool size when DB_MAX_CONNECTIONS is not set
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;

// =============================================================================
// SESSIONS
// =============================================================================

/// How long (in hours) an issued session token stays valid
pub const DEFAULT_SESSION_TTL_HOURS: i64 = 24 * 7;

/// Number of random bytes behind a session token (hex encoded, so 64 chars)
pub const SESSION_TOKEN_BYTES: usize = 32;

/// Cookie carrying the session token
pub const SESSION_COOKIE_NAME: &str = "token";

// =============================================================================
// PROFILE DEFAULTS & LIMITS
// =============================================================================

/// Photo assigned to new profiles until the owner sets one
pub const DEFAULT_PHOTO_URL: &str =
    "https://encrypted-tbn0.gstatic.com/images?q=tbn:ANd9GcR4MagXl-Ujf1jacWRXoGNsLM6KAJCH-9eBDg&s";

/// Bio assigned to new profiles until the owner sets one
pub const DEFAULT_ABOUT: &str = "Hey there! I am using DevMatch.";

/// Minimum length of a first name
pub const FIRST_NAME_MIN_LEN: usize = 2;

/// Maximum length of a first or last name
pub const NAME_MAX_LEN: usize = 100;

/// Users must be adults
pub const MIN_AGE: i32 = 18;

/// Minimum password length for a strong password
pub const MIN_PASSWORD_LEN: usize = 8;

/// Profile fields an owner may change through the edit endpoint
pub const EDITABLE_PROFILE_FIELDS: [&str; 5] = ["age", "gender", "photoUrl", "about", "skills"];

// =============================================================================
// STORE CONSTRAINT NAMES
// =============================================================================

/// Unique index over the normalized (smaller, larger) user pair
pub const PAIR_UNIQUE_CONSTRAINT: &str = "connection_requests_pair_key";

/// Unique index over lowercase emails
pub const EMAIL_UNIQUE_CONSTRAINT: &str = "users_email_key";
