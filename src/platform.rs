//! Target platform resolution.
//!
//! The platform is fixed when the crate is compiled (see `build.rs`); the
//! runtime parser exists so AST documents and CLI arguments can name other
//! platforms than the one this library was built for.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::FixtureError;

/// Operating systems with a known opaque aggregate layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetPlatform {
    Linux,
    Macos,
    Ios,
    Windows,
}

impl TargetPlatform {
    /// Every known platform, in layout order (1 to 4 fields).
    pub const ALL: [TargetPlatform; 4] = [
        TargetPlatform::Linux,
        TargetPlatform::Macos,
        TargetPlatform::Ios,
        TargetPlatform::Windows,
    ];

    /// Platform this library was compiled for.
    pub const fn current() -> Self {
        CURRENT
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TargetPlatform::Linux => "linux",
            TargetPlatform::Macos => "macos",
            TargetPlatform::Ios => "ios",
            TargetPlatform::Windows => "windows",
        }
    }

    /// Number of `int` fields the opaque aggregate carries on this platform.
    pub const fn opaque_field_count(&self) -> usize {
        match self {
            TargetPlatform::Linux => 1,
            TargetPlatform::Macos => 2,
            TargetPlatform::Ios => 3,
            TargetPlatform::Windows => 4,
        }
    }

    /// Byte size of the opaque aggregate on this platform.
    pub const fn opaque_size_of(&self) -> usize {
        self.opaque_field_count() * std::mem::size_of::<std::os::raw::c_int>()
    }
}

cfg_if::cfg_if! {
    if #[cfg(fixture_os = "linux")] {
        const CURRENT: TargetPlatform = TargetPlatform::Linux;
    } else if #[cfg(fixture_os = "macos")] {
        const CURRENT: TargetPlatform = TargetPlatform::Macos;
    } else if #[cfg(fixture_os = "ios")] {
        const CURRENT: TargetPlatform = TargetPlatform::Ios;
    } else if #[cfg(fixture_os = "windows")] {
        const CURRENT: TargetPlatform = TargetPlatform::Windows;
    } else {
        compile_error!("Unknown platform.");
    }
}

impl fmt::Display for TargetPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetPlatform {
    type Err = FixtureError;

    /// Accepts short names (`linux`, `macos`, `ios`, `windows` and common
    /// aliases) as well as target triples such as `aarch64-apple-darwin`.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        if let Some(platform) = from_short_name(&normalized) {
            return Ok(platform);
        }

        let components: Vec<&str> = normalized.split('-').collect();
        if components.len() >= 2 {
            if components.contains(&"ios") {
                return Ok(TargetPlatform::Ios);
            }
            if components.contains(&"darwin") || components.contains(&"macos") {
                return Ok(TargetPlatform::Macos);
            }
            if components.contains(&"windows") {
                return Ok(TargetPlatform::Windows);
            }
            if components.contains(&"linux") && !components.contains(&"android") {
                return Ok(TargetPlatform::Linux);
            }
        }

        Err(FixtureError::UnknownPlatform {
            name: value.to_string(),
        })
    }
}

fn from_short_name(name: &str) -> Option<TargetPlatform> {
    match name {
        "linux" => Some(TargetPlatform::Linux),
        "macos" | "osx" | "darwin" => Some(TargetPlatform::Macos),
        "ios" => Some(TargetPlatform::Ios),
        "windows" | "win32" | "win64" => Some(TargetPlatform::Windows),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_short_names() {
        assert_eq!("linux".parse::<TargetPlatform>().unwrap(), TargetPlatform::Linux);
        assert_eq!("MacOS".parse::<TargetPlatform>().unwrap(), TargetPlatform::Macos);
        assert_eq!("ios".parse::<TargetPlatform>().unwrap(), TargetPlatform::Ios);
        assert_eq!("win32".parse::<TargetPlatform>().unwrap(), TargetPlatform::Windows);
    }

    #[test]
    fn parses_target_triples() {
        let cases = [
            ("x86_64-unknown-linux-gnu", TargetPlatform::Linux),
            ("aarch64-apple-darwin", TargetPlatform::Macos),
            ("aarch64-apple-ios", TargetPlatform::Ios),
            ("x86_64-pc-windows-msvc", TargetPlatform::Windows),
        ];
        for (triple, expected) in cases {
            assert_eq!(triple.parse::<TargetPlatform>().unwrap(), expected, "{triple}");
        }
    }

    #[test]
    fn rejects_unknown_platforms() {
        for name in ["", "beos", "aarch64-linux-android", "wasm32-unknown-unknown"] {
            let err = name.parse::<TargetPlatform>().unwrap_err();
            assert!(
                matches!(err, FixtureError::UnknownPlatform { .. }),
                "{name}: {err:?}"
            );
        }
    }

    #[test]
    fn layout_sizes_grow_with_field_count() {
        let sizes: Vec<usize> = TargetPlatform::ALL
            .iter()
            .map(|platform| platform.opaque_size_of())
            .collect();
        assert_eq!(sizes, vec![4, 8, 12, 16]);
    }

    #[test]
    fn current_platform_matches_build_script() {
        assert_eq!(
            TargetPlatform::current().as_str(),
            env!("FFI_FIXTURES_PLATFORM")
        );
    }

    #[test]
    fn serializes_lowercase() {
        let json = serde_json::to_string(&TargetPlatform::Windows).unwrap();
        assert_eq!(json, "\"windows\"");
    }
}
