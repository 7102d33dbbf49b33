// Error types for the FFI fixture crate
//
// This module defines the error taxonomy for platform resolution, enum decoding,
// binding verification and document handling, with error codes suitable for
// reporting across the FFI boundary.

mod fixture;

pub use fixture::{log_fixture_error, FixtureError, FixtureErrorCodes};

/// Error codes for structured error reporting
///
/// This trait provides a standard way to get error codes and messages
/// from custom error types, enabling consistent error handling across
/// the FFI boundary.
pub trait ErrorCode {
    /// Get the numeric error code
    fn code(&self) -> i32;

    /// Get the human-readable error message
    fn message(&self) -> String;
}
