//! Standard exit codes for CLI operations
//!
//! These exit codes follow Unix conventions and mirror the rollout status
//! contract (success / in progress / failure) for the status command.

#![allow(dead_code)]

/// Success - operation completed without errors
pub const SUCCESS: i32 = 0;

/// General error - unspecified failure
pub const ERROR: i32 = 1;

/// Validation error - the manifest violated one or more rules
pub const VALIDATION_ERROR: i32 = 2;

/// Rollout still in progress (status command only)
pub const IN_PROGRESS: i32 = 3;

/// Configuration error - platform config missing or invalid
pub const CONFIG_ERROR: i32 = 4;

/// IO error - file not found, permission denied, etc.
pub const IO_ERROR: i32 = 5;

/// Usage error - invalid arguments or options (following sysexits.h convention)
pub const USAGE_ERROR: i32 = 64;
