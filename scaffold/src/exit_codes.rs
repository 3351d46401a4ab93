//! Stable exit codes for scaffold CLI commands.

/// Project created (possibly without a remote).
pub const OK: i32 = 0;
/// A pipeline stage failed or any other error occurred.
pub const FAILED: i32 = 1;
/// The destination path argument was missing or invalid.
pub const INVALID_ARGUMENT: i32 = 2;
/// Something already exists at the destination path.
pub const PATH_CONFLICT: i32 = 3;
/// The settings file could not be read, parsed or written.
pub const CONFIG: i32 = 4;
