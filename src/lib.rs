// FFI Fixtures - native test bed for C binding generators
// Width-forced enums, an excluded enum and a platform-sized aggregate,
// plus the tooling that describes, merges and checks their bindings.

// Module declarations
pub mod ast;
pub mod catalog;
pub mod config;
pub mod enums;
pub mod error;
pub mod ffi;
pub mod ignored;
pub mod merge;
pub mod opaque;
pub mod oracle;
pub mod platform;
pub mod sink;
pub mod verify;

// Re-exports for convenience
pub use config::FixtureConfig;
pub use enums::{ForcedWidthEnum, IntegerType};
pub use error::{ErrorCode, FixtureError};
pub use platform::TargetPlatform;

/// Install a `tracing` fmt subscriber on stderr that also receives `log`
/// records: warnings and up, or everything from debug with `verbose`.
/// Safe to call more than once.
pub fn init_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
