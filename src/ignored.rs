//! The ignored enum fixture and the declaration exclusion list.
//!
//! `EnumIgnored` is exported natively like every other fixture, but binding
//! generators must skip it. A generated artifact that mentions it, its
//! function prefix, or its constant prefix is a regression.

use convert_case::{Boundary, Case, Casing};

use crate::enums::{forced_width_enum, IntegerType};

forced_width_enum! {
    /// `EnumIgnored`: same shape as `Enum_Force_SInt8`, never bound.
    pub struct EnumIgnored(i8) {
        c_name: "EnumIgnored",
        prefix: "ENUM_IGNORED",
        integer_type: IntegerType::SINT8,
        sentinel: "_ENUM_IGNORED_SINT8" = 0x7F,
    }
}

/// Declarations generators must not bind.
pub const EXCLUDED_DECLARATIONS: &[&str] = &["EnumIgnored"];

/// Exclusion rule for one declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exclusion {
    pub declaration: String,
}

impl Exclusion {
    pub fn new(declaration: impl Into<String>) -> Self {
        Self {
            declaration: declaration.into(),
        }
    }

    /// Prefix of native oracle function names (`EnumIgnored__`).
    pub fn function_prefix(&self) -> String {
        format!("{}__", self.declaration)
    }

    /// Prefix of C constant names (`ENUM_IGNORED_`).
    pub fn constant_prefix(&self) -> String {
        format!("{}_", screaming_snake(&self.declaration))
    }

    /// True when `symbol` is derived from this declaration.
    pub fn matches(&self, symbol: &str) -> bool {
        let trimmed = symbol.trim_start_matches('_');
        symbol == self.declaration
            || symbol.starts_with(&self.function_prefix())
            || trimmed.starts_with(&self.constant_prefix())
            || trimmed == screaming_snake(&self.declaration)
    }
}

/// Exclusion list: the built-in declarations plus any configured extras.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExclusionList {
    rules: Vec<Exclusion>,
}

impl Default for ExclusionList {
    fn default() -> Self {
        Self::with_extra(std::iter::empty::<String>())
    }
}

impl ExclusionList {
    pub fn with_extra<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut rules: Vec<Exclusion> = EXCLUDED_DECLARATIONS
            .iter()
            .map(|name| Exclusion::new(*name))
            .collect();
        for name in extra {
            let name = name.into();
            let name = name.trim();
            if name.is_empty() || rules.iter().any(|rule| rule.declaration == name) {
                continue;
            }
            rules.push(Exclusion::new(name));
        }
        Self { rules }
    }

    pub fn is_excluded(&self, declaration: &str) -> bool {
        self.rules.iter().any(|rule| rule.declaration == declaration)
    }

    /// Exclusion whose declaration `symbol` is derived from, if any.
    pub fn matching(&self, symbol: &str) -> Option<&Exclusion> {
        self.rules.iter().find(|rule| rule.matches(symbol))
    }

    pub fn declarations(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|rule| rule.declaration.as_str())
    }
}

/// `EnumIgnored` -> `ENUM_IGNORED`, `Enum_Force_UInt8` -> `ENUM_FORCE_UINT8`.
///
/// Only underscores and lower-to-upper transitions split words, so `UInt8`
/// and `SInt16` stay whole.
fn screaming_snake(name: &str) -> String {
    name.set_boundaries(&[Boundary::Underscore, Boundary::LowerUpper])
        .to_case(Case::Constant)
}
