//! Native entry points.
//!
//! Symbol names match the fixture headers exactly, including the
//! `Enum_ForceSInt8__return_Enum_Force_SInt8` spelling. All functions are
//! total: enum values pass through unchecked, and `print` writes the decimal
//! value and a newline to stdout.

#![allow(non_snake_case)]

use std::os::raw::c_int;

use crate::enums::{
    EnumForceSInt16, EnumForceSInt32, EnumForceSInt64, EnumForceSInt8, EnumForceUInt16,
    EnumForceUInt32, EnumForceUInt64, EnumForceUInt8, ForcedWidthEnum,
};
use crate::ignored::EnumIgnored;
use crate::opaque::OpaqueTypePlatformSpecificSize;
use crate::sink::{OracleSink, StdoutSink};

/// Exported oracle pair for one enum declaration.
#[derive(Debug, Clone, Copy)]
pub struct EnumOracleExport {
    pub c_name: &'static str,
    pub print_symbol: &'static str,
    pub return_symbol: &'static str,
    /// Calls the exported `print` function's body with an explicit sink.
    pub print: fn(i128, &dyn OracleSink) -> bool,
    /// Calls the exported `print` function itself, which writes to stdout.
    pub print_native: fn(i128) -> bool,
    /// Calls the exported `return` function; `None` when the value does not
    /// fit the storage width.
    pub identity: fn(i128) -> Option<i128>,
}

macro_rules! export_enum_oracles {
    ($($ty:ty => $print:ident, $ret:ident;)+) => {
        $(
            #[no_mangle]
            pub extern "C" fn $print(e: $ty) {
                e.print(&StdoutSink);
            }

            #[no_mangle]
            pub extern "C" fn $ret(e: $ty) -> $ty {
                e.identity()
            }
        )+

        /// Every enum oracle pair exported by this library.
        pub const ENUM_ORACLE_EXPORTS: &[EnumOracleExport] = &[
            $(
                EnumOracleExport {
                    c_name: <$ty as ForcedWidthEnum>::C_NAME,
                    print_symbol: stringify!($print),
                    return_symbol: stringify!($ret),
                    print: |raw, sink| match <$ty as ForcedWidthEnum>::from_i128(raw) {
                        Some(value) => {
                            value.print(sink);
                            true
                        }
                        None => false,
                    },
                    print_native: |raw| match <$ty as ForcedWidthEnum>::from_i128(raw) {
                        Some(value) => {
                            $print(value);
                            true
                        }
                        None => false,
                    },
                    identity: |raw| {
                        <$ty as ForcedWidthEnum>::from_i128(raw)
                            .map(|value| $ret(value).to_i128())
                    },
                },
            )+
        ];
    };
}

export_enum_oracles! {
    EnumForceSInt8 => Enum_Force_SInt8__print_Enum_Force_SInt8, Enum_ForceSInt8__return_Enum_Force_SInt8;
    EnumForceSInt16 => Enum_Force_SInt16__print_Enum_Force_SInt16, Enum_Force_SInt16__return_Enum_Force_SInt16;
    EnumForceSInt32 => Enum_Force_SInt32__print_Enum_Force_SInt32, Enum_Force_SInt32__return_Enum_Force_SInt32;
    EnumForceSInt64 => Enum_Force_SInt64__print_Enum_Force_SInt64, Enum_Force_SInt64__return_Enum_Force_SInt64;
    EnumForceUInt8 => Enum_Force_UInt8__print_Enum_Force_UInt8, Enum_Force_UInt8__return_Enum_Force_UInt8;
    EnumForceUInt16 => Enum_Force_UInt16__print_Enum_Force_UInt16, Enum_Force_UInt16__return_Enum_Force_UInt16;
    EnumForceUInt32 => Enum_Force_UInt32__print_Enum_Force_UInt32, Enum_Force_UInt32__return_Enum_Force_UInt32;
    EnumForceUInt64 => Enum_Force_UInt64__print_Enum_Force_UInt64, Enum_Force_UInt64__return_Enum_Force_UInt64;
    EnumIgnored => EnumIgnored__print_EnumIgnored, EnumIgnored__return_EnumIgnored;
}

/// Symbol of the opaque aggregate's accessor.
pub const OPAQUE_CALC_SYMBOL: &str = "calc_OpaqueType_PlatformSpecificSize";

#[no_mangle]
pub extern "C" fn calc_OpaqueType_PlatformSpecificSize(
    data: OpaqueTypePlatformSpecificSize,
) -> c_int {
    data.calc()
}

/// Export entry for a declaration, if it has one.
pub fn enum_export(c_name: &str) -> Option<&'static EnumOracleExport> {
    ENUM_ORACLE_EXPORTS
        .iter()
        .find(|export| export.c_name == c_name)
}
