//! Width-forced enum fixtures.
//!
//! Each family declares the symbolic days `UNKNOWN..FRIDAY` (0..5) and one
//! sentinel constant whose value forces the storage width. The families are
//! sized-integer newtypes rather than Rust enums: values cross the C boundary
//! unchecked, and [`ForcedWidthEnum::try_decode`] is the checked path.
//!
//! The two 64-bit families carry 32-bit range sentinels (`0x7FFFFFFF`,
//! `0xFFFFFFFF`) exactly as the native fixtures declare them; their storage
//! is still 64 bits wide.

use serde::Serialize;
use std::fmt;

use crate::error::FixtureError;
use crate::sink::OracleSink;

/// Description of an enum's underlying C integer type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegerType {
    pub name: &'static str,
    pub size_of: usize,
    pub is_signed: bool,
}

impl IntegerType {
    pub const SINT8: IntegerType = IntegerType::new("int8_t", 1, true);
    pub const UINT8: IntegerType = IntegerType::new("uint8_t", 1, false);
    pub const SINT16: IntegerType = IntegerType::new("int16_t", 2, true);
    pub const UINT16: IntegerType = IntegerType::new("uint16_t", 2, false);
    pub const SINT32: IntegerType = IntegerType::new("int32_t", 4, true);
    pub const UINT32: IntegerType = IntegerType::new("uint32_t", 4, false);
    pub const SINT64: IntegerType = IntegerType::new("int64_t", 8, true);
    pub const UINT64: IntegerType = IntegerType::new("uint64_t", 8, false);

    const fn new(name: &'static str, size_of: usize, is_signed: bool) -> Self {
        Self {
            name,
            size_of,
            is_signed,
        }
    }

    pub fn min_value(&self) -> i128 {
        if self.is_signed {
            -(1i128 << (self.size_of * 8 - 1))
        } else {
            0
        }
    }

    pub fn max_value(&self) -> i128 {
        if self.is_signed {
            (1i128 << (self.size_of * 8 - 1)) - 1
        } else {
            (1i128 << (self.size_of * 8)) - 1
        }
    }

    /// True when `value` is representable without truncation.
    pub fn holds(&self, value: i128) -> bool {
        value >= self.min_value() && value <= self.max_value()
    }

    /// Narrowest integer type of the given signedness that holds `value`.
    pub fn narrowest_for(value: i128, is_signed: bool) -> Option<IntegerType> {
        let candidates = if is_signed {
            [Self::SINT8, Self::SINT16, Self::SINT32, Self::SINT64]
        } else {
            [Self::UINT8, Self::UINT16, Self::UINT32, Self::UINT64]
        };
        candidates.into_iter().find(|candidate| candidate.holds(value))
    }

    /// Look up a type by its C name (`int8_t`, `uint32_t`, ...).
    pub fn from_c_name(name: &str) -> Option<IntegerType> {
        [
            Self::SINT8,
            Self::UINT8,
            Self::SINT16,
            Self::UINT16,
            Self::SINT32,
            Self::UINT32,
            Self::SINT64,
            Self::UINT64,
        ]
        .into_iter()
        .find(|candidate| candidate.name == name.trim())
    }
}

/// One named constant of an enum fixture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EnumConstant {
    pub name: &'static str,
    pub value: i64,
}

/// Behaviour shared by every width-forced enum fixture.
pub trait ForcedWidthEnum: Copy + Eq + fmt::Debug + fmt::Display + Send + Sync + 'static {
    /// Declaration name as it appears in the C header.
    const C_NAME: &'static str;
    const INTEGER_TYPE: IntegerType;
    /// Six named days followed by the sentinel, in declaration order.
    const CONSTANTS: [EnumConstant; 7];

    fn to_i128(self) -> i128;

    /// Width-checked construction; membership is not checked.
    fn from_i128(value: i128) -> Option<Self>;

    /// Checked decode: only the seven declared values are accepted.
    fn try_decode(value: i128) -> Result<Self, FixtureError> {
        let declared = Self::CONSTANTS
            .iter()
            .any(|constant| i128::from(constant.value) == value);
        match Self::from_i128(value) {
            Some(decoded) if declared => Ok(decoded),
            _ => Err(FixtureError::UnrecognizedDiscriminant {
                type_name: Self::C_NAME.to_string(),
                value,
            }),
        }
    }

    /// C constant name of this value, if it is one of the declared ones.
    fn constant_name(self) -> Option<&'static str> {
        let value = self.to_i128();
        Self::CONSTANTS
            .iter()
            .find(|constant| i128::from(constant.value) == value)
            .map(|constant| constant.name)
    }

    fn sentinel() -> EnumConstant {
        Self::CONSTANTS[6]
    }

    /// Render the underlying integer as decimal text on `sink`.
    fn print(self, sink: &dyn OracleSink) {
        sink.emit(&self.to_string());
    }

    fn identity(self) -> Self {
        self
    }
}

macro_rules! forced_width_enum {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident($repr:ty) {
            c_name: $c_name:literal,
            prefix: $prefix:literal,
            integer_type: $integer_type:expr,
            sentinel: $sentinel_name:literal = $sentinel:expr $(,)?
        }
    ) => {
        $(#[$meta])*
        #[repr(transparent)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        $vis struct $name(pub $repr);

        impl $name {
            pub const UNKNOWN: Self = Self(0);
            pub const MONDAY: Self = Self(1);
            pub const TUESDAY: Self = Self(2);
            pub const WEDNESDAY: Self = Self(3);
            pub const THURSDAY: Self = Self(4);
            pub const FRIDAY: Self = Self(5);
            /// Width-forcing sentinel.
            pub const FORCE: Self = Self($sentinel);

            pub const fn from_raw(raw: $repr) -> Self {
                Self(raw)
            }

            pub const fn raw(self) -> $repr {
                self.0
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<$repr> for $name {
            fn from(raw: $repr) -> Self {
                Self(raw)
            }
        }

        impl From<$name> for $repr {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl $crate::enums::ForcedWidthEnum for $name {
            const C_NAME: &'static str = $c_name;
            const INTEGER_TYPE: $crate::enums::IntegerType = $integer_type;
            const CONSTANTS: [$crate::enums::EnumConstant; 7] = [
                $crate::enums::EnumConstant { name: concat!($prefix, "_DAY_UNKNOWN"), value: 0 },
                $crate::enums::EnumConstant { name: concat!($prefix, "_DAY_MONDAY"), value: 1 },
                $crate::enums::EnumConstant { name: concat!($prefix, "_DAY_TUESDAY"), value: 2 },
                $crate::enums::EnumConstant { name: concat!($prefix, "_DAY_WEDNESDAY"), value: 3 },
                $crate::enums::EnumConstant { name: concat!($prefix, "_DAY_THURSDAY"), value: 4 },
                $crate::enums::EnumConstant { name: concat!($prefix, "_DAY_FRIDAY"), value: 5 },
                $crate::enums::EnumConstant { name: $sentinel_name, value: $sentinel as i64 },
            ];

            fn to_i128(self) -> i128 {
                i128::from(self.0)
            }

            fn from_i128(value: i128) -> Option<Self> {
                <$repr>::try_from(value).ok().map(Self)
            }
        }
    };
}

pub(crate) use forced_width_enum;

forced_width_enum! {
    /// `Enum_Force_SInt8`: signed 8-bit storage, sentinel `0x7F`.
    pub struct EnumForceSInt8(i8) {
        c_name: "Enum_Force_SInt8",
        prefix: "ENUM_FORCE_SINT8",
        integer_type: IntegerType::SINT8,
        sentinel: "_ENUM_FORCE_SINT8" = 0x7F,
    }
}

forced_width_enum! {
    /// `Enum_Force_UInt8`: unsigned 8-bit storage, sentinel `0xFF`.
    pub struct EnumForceUInt8(u8) {
        c_name: "Enum_Force_UInt8",
        prefix: "ENUM_FORCE_UINT8",
        integer_type: IntegerType::UINT8,
        sentinel: "_ENUM_FORCE_UINT8" = 0xFF,
    }
}

forced_width_enum! {
    /// `Enum_Force_SInt16`: signed 16-bit storage, sentinel `0x7FFF`.
    pub struct EnumForceSInt16(i16) {
        c_name: "Enum_Force_SInt16",
        prefix: "ENUM_FORCE_SINT16",
        integer_type: IntegerType::SINT16,
        sentinel: "_ENUM_FORCE_SINT16" = 0x7FFF,
    }
}

forced_width_enum! {
    /// `Enum_Force_UInt16`: unsigned 16-bit storage, sentinel `0xFFFF`.
    pub struct EnumForceUInt16(u16) {
        c_name: "Enum_Force_UInt16",
        prefix: "ENUM_FORCE_UINT16",
        integer_type: IntegerType::UINT16,
        sentinel: "_ENUM_FORCE_UINT16" = 0xFFFF,
    }
}

forced_width_enum! {
    /// `Enum_Force_SInt32`: signed 32-bit storage, sentinel `0x7FFFFFFF`.
    pub struct EnumForceSInt32(i32) {
        c_name: "Enum_Force_SInt32",
        prefix: "ENUM_FORCE_SINT32",
        integer_type: IntegerType::SINT32,
        sentinel: "_ENUM_FORCE_SINT32" = 0x7FFF_FFFF,
    }
}

forced_width_enum! {
    /// `Enum_Force_UInt32`: unsigned 32-bit storage, sentinel `0xFFFFFFFF`.
    pub struct EnumForceUInt32(u32) {
        c_name: "Enum_Force_UInt32",
        prefix: "ENUM_FORCE_UINT32",
        integer_type: IntegerType::UINT32,
        sentinel: "_ENUM_FORCE_UINT32" = 0xFFFF_FFFF,
    }
}

forced_width_enum! {
    /// `Enum_Force_SInt64`: signed 64-bit storage, sentinel `0x7FFFFFFF`.
    pub struct EnumForceSInt64(i64) {
        c_name: "Enum_Force_SInt64",
        prefix: "ENUM_FORCE_SINT64",
        integer_type: IntegerType::SINT64,
        sentinel: "_ENUM_FORCE_SINT64" = 0x7FFF_FFFF,
    }
}

forced_width_enum! {
    /// `Enum_Force_UInt64`: unsigned 64-bit storage, sentinel `0xFFFFFFFF`.
    pub struct EnumForceUInt64(u64) {
        c_name: "Enum_Force_UInt64",
        prefix: "ENUM_FORCE_UINT64",
        integer_type: IntegerType::UINT64,
        sentinel: "_ENUM_FORCE_UINT64" = 0xFFFF_FFFF,
    }
}

#[cfg(test)]
mod tests;
