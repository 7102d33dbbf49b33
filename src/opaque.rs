//! `OpaqueType_PlatformSpecificSize`: an aggregate whose field count depends
//! on the target operating system.
//!
//! [`PlatformLayout`] models all four layouts so they can be reasoned about on
//! any host. [`OpaqueTypePlatformSpecificSize`] is the `#[repr(C)]` value for
//! the platform this crate was compiled for; its fields are private and only
//! reachable through [`PlatformLayout`].
//!
//! `calc` returns the clean sum of the platform fields. The native fixture
//! reads its accumulator before initializing it; that read is not reproduced.

use serde::Serialize;
use std::os::raw::c_int;

use crate::error::FixtureError;
use crate::platform::TargetPlatform;

/// The four mutually exclusive field layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "platform", rename_all = "lowercase")]
pub enum PlatformLayout {
    Linux {
        a: c_int,
    },
    Macos {
        a: c_int,
        b: c_int,
    },
    Ios {
        a: c_int,
        b: c_int,
        c: c_int,
    },
    Windows {
        a: c_int,
        b: c_int,
        c: c_int,
        d: c_int,
    },
}

impl PlatformLayout {
    /// Build the layout for `platform`; `fields` must hold exactly as many
    /// values as that platform declares.
    pub fn from_fields(platform: TargetPlatform, fields: &[c_int]) -> Result<Self, FixtureError> {
        let expected = platform.opaque_field_count();
        let layout = match (platform, fields) {
            (TargetPlatform::Linux, &[a]) => PlatformLayout::Linux { a },
            (TargetPlatform::Macos, &[a, b]) => PlatformLayout::Macos { a, b },
            (TargetPlatform::Ios, &[a, b, c]) => PlatformLayout::Ios { a, b, c },
            (TargetPlatform::Windows, &[a, b, c, d]) => PlatformLayout::Windows { a, b, c, d },
            _ => {
                return Err(FixtureError::LayoutMismatch {
                    platform: platform.to_string(),
                    expected,
                    actual: fields.len(),
                })
            }
        };
        Ok(layout)
    }

    pub fn platform(&self) -> TargetPlatform {
        match self {
            PlatformLayout::Linux { .. } => TargetPlatform::Linux,
            PlatformLayout::Macos { .. } => TargetPlatform::Macos,
            PlatformLayout::Ios { .. } => TargetPlatform::Ios,
            PlatformLayout::Windows { .. } => TargetPlatform::Windows,
        }
    }

    pub fn fields(&self) -> Vec<c_int> {
        match *self {
            PlatformLayout::Linux { a } => vec![a],
            PlatformLayout::Macos { a, b } => vec![a, b],
            PlatformLayout::Ios { a, b, c } => vec![a, b, c],
            PlatformLayout::Windows { a, b, c, d } => vec![a, b, c, d],
        }
    }

    /// Sum of the platform-selected fields, wrapping on overflow.
    pub fn calc(&self) -> c_int {
        self.fields()
            .into_iter()
            .fold(0, |sum: c_int, field| sum.wrapping_add(field))
    }
}

cfg_if::cfg_if! {
    if #[cfg(fixture_os = "linux")] {
        #[repr(C)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        struct PlatformSpecific {
            a: c_int,
        }

        impl PlatformSpecific {
            fn to_layout(self) -> PlatformLayout {
                PlatformLayout::Linux { a: self.a }
            }
        }
    } else if #[cfg(fixture_os = "macos")] {
        #[repr(C)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        struct PlatformSpecific {
            a: c_int,
            b: c_int,
        }

        impl PlatformSpecific {
            fn to_layout(self) -> PlatformLayout {
                PlatformLayout::Macos { a: self.a, b: self.b }
            }
        }
    } else if #[cfg(fixture_os = "ios")] {
        #[repr(C)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        struct PlatformSpecific {
            a: c_int,
            b: c_int,
            c: c_int,
        }

        impl PlatformSpecific {
            fn to_layout(self) -> PlatformLayout {
                PlatformLayout::Ios { a: self.a, b: self.b, c: self.c }
            }
        }
    } else if #[cfg(fixture_os = "windows")] {
        #[repr(C)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        struct PlatformSpecific {
            a: c_int,
            b: c_int,
            c: c_int,
            d: c_int,
        }

        impl PlatformSpecific {
            fn to_layout(self) -> PlatformLayout {
                PlatformLayout::Windows { a: self.a, b: self.b, c: self.c, d: self.d }
            }
        }
    } else {
        compile_error!("Unknown platform.");
    }
}

// The native declaration wraps the fields in a single-member union, which
// has the same layout as the member itself.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PlatformUnion {
    platform_specific: PlatformSpecific,
}

/// Native-layout aggregate for the compiled platform. Passed by value.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpaqueTypePlatformSpecificSize {
    platform_union: PlatformUnion,
}

impl OpaqueTypePlatformSpecificSize {
    /// C declaration name.
    pub const C_NAME: &'static str = "OpaqueType_PlatformSpecificSize";

    /// Construct from field values for the compiled platform.
    pub fn from_fields(fields: &[c_int]) -> Result<Self, FixtureError> {
        Self::from_layout(PlatformLayout::from_fields(TargetPlatform::current(), fields)?)
    }

    /// Construct from a layout; it must belong to the compiled platform.
    pub fn from_layout(layout: PlatformLayout) -> Result<Self, FixtureError> {
        let current = TargetPlatform::current();
        let platform_specific = match layout {
            #[cfg(fixture_os = "linux")]
            PlatformLayout::Linux { a } => PlatformSpecific { a },
            #[cfg(fixture_os = "macos")]
            PlatformLayout::Macos { a, b } => PlatformSpecific { a, b },
            #[cfg(fixture_os = "ios")]
            PlatformLayout::Ios { a, b, c } => PlatformSpecific { a, b, c },
            #[cfg(fixture_os = "windows")]
            PlatformLayout::Windows { a, b, c, d } => PlatformSpecific { a, b, c, d },
            other => {
                return Err(FixtureError::LayoutMismatch {
                    platform: current.to_string(),
                    expected: current.opaque_field_count(),
                    actual: other.platform().opaque_field_count(),
                })
            }
        };
        Ok(Self {
            platform_union: PlatformUnion { platform_specific },
        })
    }

    /// View the native value through the platform-independent layout.
    pub fn layout(&self) -> PlatformLayout {
        self.platform_union.platform_specific.to_layout()
    }

    pub fn calc(&self) -> c_int {
        self.layout().calc()
    }

    pub const fn size_of() -> usize {
        std::mem::size_of::<Self>()
    }
}
