//! Storage keys for persisted credentials
//!
//! These match the keys the browser front-end kept in local storage, so a
//! credential file exported from it loads unchanged.

/// Key holding the user session token.
pub const USER_TOKEN: &str = "userToken";

/// Key holding the admin session token.
pub const ADMIN_TOKEN: &str = "adminToken";

/// Older key for the user token. Read once for migration and always removed
/// together with `USER_TOKEN`, so a user logout never leaves it behind.
pub const LEGACY_USER_TOKEN: &str = "token";
