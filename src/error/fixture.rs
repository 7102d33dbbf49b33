// Fixture error types and constants

use crate::error::ErrorCode;
use log::error;
use std::fmt;

/// Fixture error code constants shared with native callers.
///
/// Error code range: 3001-3006
pub struct FixtureErrorCodes {}

impl FixtureErrorCodes {
    /// Target platform could not be resolved to one of the known layouts
    pub const UNKNOWN_PLATFORM: i32 = 3001;

    /// Raw value is not one of the declared enum constants
    pub const UNRECOGNIZED_DISCRIMINANT: i32 = 3002;

    /// A generated artifact contains a symbol of an excluded declaration
    pub const EXCLUDED_DECLARATION_EMITTED: i32 = 3003;

    /// AST document or configuration failed validation
    pub const INVALID_DOCUMENT: i32 = 3004;

    /// Reading or writing a document failed
    pub const IO: i32 = 3005;

    /// Opaque aggregate fields do not match the platform layout
    pub const LAYOUT_MISMATCH: i32 = 3006;
}

/// Log a fixture error with structured context
///
/// Fields logged: error_code, component, message, and the caller-supplied
/// context string.
pub fn log_fixture_error(err: &FixtureError, context: &str) {
    error!(
        "Fixture error in {}: code={}, component=Fixtures, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Fixture-related errors
///
/// Error code range: 3001-3006
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FixtureError {
    /// Platform name does not map to linux, macos, ios or windows
    UnknownPlatform { name: String },

    /// Checked decode of a raw enum value failed
    UnrecognizedDiscriminant { type_name: String, value: i128 },

    /// Generated bindings contain a symbol derived from an excluded declaration
    ExcludedDeclarationEmitted { declaration: String, symbol: String },

    /// Document contents are structurally invalid
    InvalidDocument { reason: String },

    /// Underlying I/O failure
    Io { details: String },

    /// Field count given for the opaque aggregate does not fit the platform
    LayoutMismatch {
        platform: String,
        expected: usize,
        actual: usize,
    },
}

impl ErrorCode for FixtureError {
    fn code(&self) -> i32 {
        match self {
            FixtureError::UnknownPlatform { .. } => FixtureErrorCodes::UNKNOWN_PLATFORM,
            FixtureError::UnrecognizedDiscriminant { .. } => {
                FixtureErrorCodes::UNRECOGNIZED_DISCRIMINANT
            }
            FixtureError::ExcludedDeclarationEmitted { .. } => {
                FixtureErrorCodes::EXCLUDED_DECLARATION_EMITTED
            }
            FixtureError::InvalidDocument { .. } => FixtureErrorCodes::INVALID_DOCUMENT,
            FixtureError::Io { .. } => FixtureErrorCodes::IO,
            FixtureError::LayoutMismatch { .. } => FixtureErrorCodes::LAYOUT_MISMATCH,
        }
    }

    fn message(&self) -> String {
        match self {
            FixtureError::UnknownPlatform { name } => {
                format!("Unknown platform: {:?}", name)
            }
            FixtureError::UnrecognizedDiscriminant { type_name, value } => {
                format!("Unrecognized discriminant {} for {}", value, type_name)
            }
            FixtureError::ExcludedDeclarationEmitted {
                declaration,
                symbol,
            } => {
                format!(
                    "Excluded declaration {} was emitted as symbol {}",
                    declaration, symbol
                )
            }
            FixtureError::InvalidDocument { reason } => {
                format!("Invalid document: {}", reason)
            }
            FixtureError::Io { details } => format!("I/O error: {}", details),
            FixtureError::LayoutMismatch {
                platform,
                expected,
                actual,
            } => {
                format!(
                    "Opaque layout for {} has {} fields (got {})",
                    platform, expected, actual
                )
            }
        }
    }
}

impl fmt::Display for FixtureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FixtureError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for FixtureError {}

impl From<std::io::Error> for FixtureError {
    fn from(err: std::io::Error) -> Self {
        FixtureError::Io {
            details: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for FixtureError {
    fn from(err: serde_json::Error) -> Self {
        FixtureError::InvalidDocument {
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_error_codes() {
        assert_eq!(
            FixtureError::UnknownPlatform {
                name: "beos".to_string()
            }
            .code(),
            3001
        );
        assert_eq!(
            FixtureError::UnrecognizedDiscriminant {
                type_name: "Enum_Force_UInt8".to_string(),
                value: 9
            }
            .code(),
            3002
        );
        assert_eq!(
            FixtureError::ExcludedDeclarationEmitted {
                declaration: "EnumIgnored".to_string(),
                symbol: "EnumIgnored".to_string()
            }
            .code(),
            3003
        );
        assert_eq!(
            FixtureError::InvalidDocument {
                reason: "test".to_string()
            }
            .code(),
            3004
        );
        assert_eq!(
            FixtureError::Io {
                details: "test".to_string()
            }
            .code(),
            3005
        );
        assert_eq!(
            FixtureError::LayoutMismatch {
                platform: "linux".to_string(),
                expected: 1,
                actual: 2
            }
            .code(),
            3006
        );
    }

    #[test]
    fn test_fixture_error_display() {
        let err = FixtureError::UnrecognizedDiscriminant {
            type_name: "Enum_Force_SInt16".to_string(),
            value: 42,
        };
        assert!(err.message().contains("42"));
        assert!(err.message().contains("Enum_Force_SInt16"));
        assert!(err.to_string().contains("code 3002"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing ast");
        let err: FixtureError = io_err.into();

        match err {
            FixtureError::Io { details } => assert!(details.contains("missing ast")),
            other => panic!("Expected Io variant, got {other:?}"),
        }
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<u8>("not json").unwrap_err();
        let err: FixtureError = json_err.into();
        assert_eq!(err.code(), FixtureErrorCodes::INVALID_DOCUMENT);
    }
}
