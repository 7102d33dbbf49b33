// Build script resolving the fixture target platform.
//
// The opaque aggregate carries a different field layout per operating system.
// The platform is taken from `FFI_TARGET_OS` when set, otherwise from the
// target being compiled for, and exported as `cfg(fixture_os = "...")`.
// Anything else aborts the build before any artifact is produced.

const KNOWN_PLATFORMS: [&str; 4] = ["linux", "macos", "ios", "windows"];

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=FFI_TARGET_OS");

    let requested = std::env::var("FFI_TARGET_OS")
        .ok()
        .filter(|value| !value.trim().is_empty())
        .or_else(|| std::env::var("CARGO_CFG_TARGET_OS").ok())
        .unwrap_or_default();
    let platform = requested.trim().to_ascii_lowercase();

    if !KNOWN_PLATFORMS.contains(&platform.as_str()) {
        eprintln!("error: Unknown platform. ({platform:?})");
        std::process::exit(1);
    }

    println!("cargo:rustc-cfg=fixture_os=\"{platform}\"");
    println!("cargo:rustc-env=FFI_FIXTURES_PLATFORM={platform}");
}
