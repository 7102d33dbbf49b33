//! Built-in description of every fixture declaration.
//!
//! The catalog is the source of the per-platform AST documents: it knows the
//! header each declaration lives in, the exported symbols, and the integer
//! type backing each enum.

use once_cell::sync::Lazy;
use std::collections::BTreeMap;

use crate::ast::{
    CAbstractSyntaxTree, CEnum, CEnumValue, CFunction, CFunctionCallingConvention,
    CFunctionParameter, CLocation, COpaqueType, CTypeInfo,
};
use crate::enums::{
    EnumConstant, EnumForceSInt16, EnumForceSInt32, EnumForceSInt64, EnumForceSInt8,
    EnumForceUInt16, EnumForceUInt32, EnumForceUInt64, EnumForceUInt8, ForcedWidthEnum,
    IntegerType,
};
use crate::ffi::{enum_export, EnumOracleExport, OPAQUE_CALC_SYMBOL};
use crate::ignored::{EnumIgnored, ExclusionList};
use crate::opaque::OpaqueTypePlatformSpecificSize;
use crate::platform::TargetPlatform;

/// Header every document claims to describe.
pub const ROOT_HEADER: &str = "ffi_fixtures.h";

const ENUM_TYPEDEF_LINE: u32 = 3;
const ENUM_PRINT_LINE: u32 = 13;
const ENUM_RETURN_LINE: u32 = 18;
const OPAQUE_TYPEDEF_LINE: u32 = 3;
const OPAQUE_CALC_LINE: u32 = 39;

/// One enum declaration and its exported oracle pair.
#[derive(Debug, Clone)]
pub struct EnumFixture {
    pub c_name: &'static str,
    pub header: String,
    pub integer_type: IntegerType,
    pub constants: Vec<EnumConstant>,
    pub export: &'static EnumOracleExport,
}

impl EnumFixture {
    fn of<E: ForcedWidthEnum>(directory: &str) -> Option<Self> {
        let export = enum_export(E::C_NAME)?;
        Some(Self {
            c_name: E::C_NAME,
            header: format!("{directory}/{}.h", E::C_NAME),
            integer_type: E::INTEGER_TYPE,
            constants: E::CONSTANTS.to_vec(),
            export,
        })
    }

    pub fn sentinel(&self) -> Option<&EnumConstant> {
        self.constants.last()
    }

    fn location(&self, line: u32) -> CLocation {
        CLocation {
            file_name: self.header.clone(),
            line,
            column: 1,
        }
    }

    fn to_ast_enum(&self) -> CEnum {
        CEnum {
            location: Some(self.location(ENUM_TYPEDEF_LINE)),
            type_integer: CTypeInfo {
                name: self.integer_type.name.to_string(),
                size_of: self.integer_type.size_of,
                is_signed: Some(self.integer_type.is_signed),
            },
            values: self
                .constants
                .iter()
                .map(|constant| CEnumValue {
                    name: constant.name.to_string(),
                    value: constant.value,
                })
                .collect(),
        }
    }

    fn to_ast_functions(&self) -> [(String, CFunction); 2] {
        let parameter = vec![CFunctionParameter {
            name: "e".to_string(),
            type_name: self.c_name.to_string(),
        }];
        [
            (
                self.export.print_symbol.to_string(),
                CFunction {
                    location: Some(self.location(ENUM_PRINT_LINE)),
                    calling_convention: CFunctionCallingConvention::Cdecl,
                    return_type: "void".to_string(),
                    parameters: parameter.clone(),
                },
            ),
            (
                self.export.return_symbol.to_string(),
                CFunction {
                    location: Some(self.location(ENUM_RETURN_LINE)),
                    calling_convention: CFunctionCallingConvention::Cdecl,
                    return_type: self.c_name.to_string(),
                    parameters: parameter,
                },
            ),
        ]
    }
}

/// Every enum fixture, ignored one included.
pub static ENUM_FIXTURES: Lazy<Vec<EnumFixture>> = Lazy::new(|| {
    [
        EnumFixture::of::<EnumForceSInt8>("enums"),
        EnumFixture::of::<EnumForceUInt8>("enums"),
        EnumFixture::of::<EnumForceSInt16>("enums"),
        EnumFixture::of::<EnumForceUInt16>("enums"),
        EnumFixture::of::<EnumForceSInt32>("enums"),
        EnumFixture::of::<EnumForceUInt32>("enums"),
        EnumFixture::of::<EnumForceSInt64>("enums"),
        EnumFixture::of::<EnumForceUInt64>("enums"),
        EnumFixture::of::<EnumIgnored>("ignored"),
    ]
    .into_iter()
    .flatten()
    .collect()
});

pub fn find_enum(c_name: &str) -> Option<&'static EnumFixture> {
    ENUM_FIXTURES.iter().find(|fixture| fixture.c_name == c_name)
}

fn opaque_header() -> String {
    format!("opaque_types/{}.h", OpaqueTypePlatformSpecificSize::C_NAME)
}

/// Build the AST document for `platform`, withholding excluded declarations.
pub fn build_ast(platform: TargetPlatform, exclusions: &ExclusionList) -> CAbstractSyntaxTree {
    let mut enums = BTreeMap::new();
    let mut functions = BTreeMap::new();
    let mut opaque_types = BTreeMap::new();
    let mut excluded = Vec::new();

    for fixture in ENUM_FIXTURES.iter() {
        if exclusions.is_excluded(fixture.c_name) {
            log::info!("[Catalog] Withholding excluded declaration {}", fixture.c_name);
            excluded.push(fixture.c_name.to_string());
            continue;
        }
        enums.insert(fixture.c_name.to_string(), fixture.to_ast_enum());
        for (symbol, function) in fixture.to_ast_functions() {
            functions.insert(symbol, function);
        }
    }

    let opaque_name = OpaqueTypePlatformSpecificSize::C_NAME;
    if exclusions.is_excluded(opaque_name) {
        excluded.push(opaque_name.to_string());
    } else {
        opaque_types.insert(
            opaque_name.to_string(),
            COpaqueType {
                location: Some(CLocation {
                    file_name: opaque_header(),
                    line: OPAQUE_TYPEDEF_LINE,
                    column: 1,
                }),
                size_of: platform.opaque_size_of(),
            },
        );
        functions.insert(
            OPAQUE_CALC_SYMBOL.to_string(),
            CFunction {
                location: Some(CLocation {
                    file_name: opaque_header(),
                    line: OPAQUE_CALC_LINE,
                    column: 1,
                }),
                calling_convention: CFunctionCallingConvention::Cdecl,
                return_type: "int".to_string(),
                parameters: vec![CFunctionParameter {
                    name: "data".to_string(),
                    type_name: opaque_name.to_string(),
                }],
            },
        );
    }

    // Functions named after a configured exclusion or taking an excluded type.
    functions.retain(|symbol, function| {
        let touches_excluded = exclusions.matching(symbol).is_some()
            || exclusions.is_excluded(&function.return_type)
            || function
                .parameters
                .iter()
                .any(|parameter| exclusions.is_excluded(&parameter.type_name));
        !touches_excluded
    });

    excluded.sort();
    excluded.dedup();

    CAbstractSyntaxTree {
        file_name: ROOT_HEADER.to_string(),
        platform_requested: Some(platform),
        platform_actual: Some(platform),
        functions,
        enums,
        opaque_types,
        excluded,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_lists_every_enum_fixture() {
        assert_eq!(ENUM_FIXTURES.len(), 9);
        let uint8 = find_enum("Enum_Force_UInt8").unwrap();
        assert_eq!(uint8.header, "enums/Enum_Force_UInt8.h");
        assert_eq!(uint8.sentinel().unwrap().value, 0xFF);
        assert_eq!(find_enum("EnumIgnored").unwrap().header, "ignored/EnumIgnored.h");
    }

    #[test]
    fn ast_withholds_ignored_enum() {
        for platform in TargetPlatform::ALL {
            let ast = build_ast(platform, &ExclusionList::default());
            assert!(!ast.enums.contains_key("EnumIgnored"), "{platform}");
            assert!(
                !ast.functions.keys().any(|name| name.starts_with("EnumIgnored")),
                "{platform}"
            );
            assert_eq!(ast.excluded, vec!["EnumIgnored".to_string()]);
            assert_eq!(ast.enums.len(), 8);
            // Two oracles per enum plus calc.
            assert_eq!(ast.functions.len(), 17);
        }
    }

    #[test]
    fn ast_keeps_exact_symbol_spelling() {
        let ast = build_ast(TargetPlatform::Linux, &ExclusionList::default());
        assert!(ast
            .functions
            .contains_key("Enum_ForceSInt8__return_Enum_Force_SInt8"));
        assert!(!ast
            .functions
            .contains_key("Enum_Force_SInt8__return_Enum_Force_SInt8"));
    }

    #[test]
    fn opaque_size_follows_platform() {
        let windows = build_ast(TargetPlatform::Windows, &ExclusionList::default());
        let linux = build_ast(TargetPlatform::Linux, &ExclusionList::default());
        let name = OpaqueTypePlatformSpecificSize::C_NAME;
        assert_eq!(windows.opaque_types[name].size_of, 16);
        assert_eq!(linux.opaque_types[name].size_of, 4);
        assert_eq!(windows.functions[OPAQUE_CALC_SYMBOL].return_type, "int");
    }

    #[test]
    fn configured_exclusion_drops_dependent_functions() {
        let exclusions = ExclusionList::with_extra(["OpaqueType_PlatformSpecificSize"]);
        let ast = build_ast(TargetPlatform::Macos, &exclusions);
        assert!(ast.opaque_types.is_empty());
        assert!(!ast.functions.contains_key(OPAQUE_CALC_SYMBOL));
        assert_eq!(
            ast.excluded,
            vec![
                "EnumIgnored".to_string(),
                "OpaqueType_PlatformSpecificSize".to_string()
            ]
        );
    }

    #[test]
    fn enum_nodes_carry_integer_type() {
        let ast = build_ast(TargetPlatform::Ios, &ExclusionList::default());
        let sint16 = &ast.enums["Enum_Force_SInt16"];
        assert_eq!(sint16.type_integer.name, "int16_t");
        assert_eq!(sint16.type_integer.size_of, 2);
        assert_eq!(sint16.type_integer.is_signed, Some(true));
        assert_eq!(sint16.values.len(), 7);
        assert_eq!(sint16.values[6].name, "_ENUM_FORCE_SINT16");
        assert_eq!(
            sint16.location.as_ref().unwrap().file_name,
            "enums/Enum_Force_SInt16.h"
        );
    }
}
