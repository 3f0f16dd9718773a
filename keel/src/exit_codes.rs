//! Stable exit codes for keel CLI commands.

/// Command succeeded.
pub const OK: i32 = 0;
/// Command failed due to invalid layout/config/arguments or other errors.
pub const INVALID: i32 = 1;
/// `keel artifact get` found no registered artifact with that identity.
pub const NOT_FOUND: i32 = 2;
/// `keel artifact record` targeted an artifact that is not registered.
pub const NOT_REGISTERED: i32 = 3;
