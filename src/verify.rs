//! Inspection of generated binding artifacts.
//!
//! The verifier reads any text artifact a binding generator produced (Rust,
//! C#, Zig...) and reports:
//! - identifiers derived from an excluded declaration;
//! - enums whose declared integer type, or the storage the artifact picked
//!   for them, cannot hold every value;
//! - declarations from the AST the artifact never mentions.

use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use crate::ast::{CAbstractSyntaxTree, CEnum};
use crate::enums::IntegerType;
use crate::error::FixtureError;
use crate::ignored::ExclusionList;

#[derive(Debug, Clone)]
pub struct VerifyOptions {
    pub exclusions: ExclusionList,
    /// Match function and constant prefixes, not only exact declaration names.
    pub symbol_prefix_matching: bool,
    /// Report AST declarations missing from the artifact.
    pub require_coverage: bool,
}

impl Default for VerifyOptions {
    fn default() -> Self {
        Self {
            exclusions: ExclusionList::default(),
            symbol_prefix_matching: true,
            require_coverage: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BindingAnomalyKind {
    ExcludedDeclaration,
    WidthTooNarrow,
    UnknownIntegerType,
    MissingDeclaration,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BindingAnomaly {
    pub kind: BindingAnomalyKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub declaration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub integer_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<i64>,
}

impl BindingAnomaly {
    fn excluded(declaration: &str, symbol: &str, line: usize) -> Self {
        Self {
            kind: BindingAnomalyKind::ExcludedDeclaration,
            message: format!(
                "Symbol {symbol} on line {line} is derived from excluded declaration {declaration}"
            ),
            declaration: Some(declaration.to_string()),
            symbol: Some(symbol.to_string()),
            line: Some(line),
            integer_type: None,
            value: None,
        }
    }

    fn width_too_narrow(declaration: &str, integer_type: &str, value_name: &str, value: i64) -> Self {
        Self {
            kind: BindingAnomalyKind::WidthTooNarrow,
            message: format!(
                "{declaration} is backed by {integer_type}, which cannot hold {value_name} = {value}"
            ),
            declaration: Some(declaration.to_string()),
            symbol: Some(value_name.to_string()),
            line: None,
            integer_type: Some(integer_type.to_string()),
            value: Some(value),
        }
    }

    fn binding_too_narrow(
        declaration: &str,
        storage: &BindingStorage,
        value_name: &str,
        value: i64,
    ) -> Self {
        Self {
            kind: BindingAnomalyKind::WidthTooNarrow,
            message: format!(
                "Binding for {declaration} on line {} stores it as {}, which cannot hold {value_name} = {value}",
                storage.line, storage.spelling
            ),
            declaration: Some(declaration.to_string()),
            symbol: Some(value_name.to_string()),
            line: Some(storage.line),
            integer_type: Some(storage.spelling.clone()),
            value: Some(value),
        }
    }

    fn unknown_integer_type(declaration: &str, integer_type: &str) -> Self {
        Self {
            kind: BindingAnomalyKind::UnknownIntegerType,
            message: format!("{declaration} declares unrecognized integer type {integer_type}"),
            declaration: Some(declaration.to_string()),
            symbol: None,
            line: None,
            integer_type: Some(integer_type.to_string()),
            value: None,
        }
    }

    fn missing(declaration: &str) -> Self {
        Self {
            kind: BindingAnomalyKind::MissingDeclaration,
            message: format!("Artifact never mentions {declaration}"),
            declaration: Some(declaration.to_string()),
            symbol: None,
            line: None,
            integer_type: None,
            value: None,
        }
    }
}

/// Result of inspecting one artifact.
#[derive(Debug, Clone, Serialize)]
pub struct BindingReport {
    pub artifact: String,
    pub identifiers_scanned: usize,
    pub anomalies: Vec<BindingAnomaly>,
}

impl BindingReport {
    pub fn has_anomalies(&self) -> bool {
        !self.anomalies.is_empty()
    }

    pub fn count(&self, kind: BindingAnomalyKind) -> usize {
        self.anomalies
            .iter()
            .filter(|anomaly| anomaly.kind == kind)
            .count()
    }

    /// First excluded-declaration finding as an error, if any.
    pub fn exclusion_result(&self) -> Result<(), FixtureError> {
        match self
            .anomalies
            .iter()
            .find(|anomaly| anomaly.kind == BindingAnomalyKind::ExcludedDeclaration)
        {
            Some(anomaly) => Err(FixtureError::ExcludedDeclarationEmitted {
                declaration: anomaly.declaration.clone().unwrap_or_default(),
                symbol: anomaly.symbol.clone().unwrap_or_default(),
            }),
            None => Ok(()),
        }
    }
}

/// Identifiers in `text` with the 1-based line of their first occurrence.
pub fn scan_identifiers(text: &str) -> BTreeMap<String, usize> {
    let mut identifiers = BTreeMap::new();
    for (index, line) in text.lines().enumerate() {
        for (_, word) in line_identifiers(line) {
            identifiers.entry(word.to_string()).or_insert(index + 1);
        }
    }
    identifiers
}

/// Identifiers on one line with their byte offsets, in order.
fn line_identifiers(line: &str) -> Vec<(usize, &str)> {
    let mut words = Vec::new();
    let mut start: Option<usize> = None;
    for (offset, ch) in line.char_indices().chain(std::iter::once((line.len(), ' '))) {
        let is_ident = ch == '_' || ch.is_ascii_alphanumeric();
        match (start, is_ident) {
            (None, true) => start = Some(offset),
            (Some(begin), false) => {
                let word = &line[begin..offset];
                if !word.starts_with(|c: char| c.is_ascii_digit()) {
                    words.push((begin, word));
                }
                start = None;
            }
            _ => {}
        }
    }
    words
}

/// Integer storage a generated binding picked for an enum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingStorage {
    pub integer_type: IntegerType,
    /// Type as written in the artifact (`u8`, `byte`, `uint8_t`...).
    pub spelling: String,
    pub line: usize,
}

/// Map a Rust, C# or C integer type name to its descriptor.
pub fn binding_integer_type(name: &str) -> Option<IntegerType> {
    let integer_type = match name {
        "i8" | "sbyte" | "c_schar" => IntegerType::SINT8,
        "u8" | "byte" | "c_uchar" => IntegerType::UINT8,
        "i16" | "short" | "c_short" => IntegerType::SINT16,
        "u16" | "ushort" | "c_ushort" => IntegerType::UINT16,
        "i32" | "int" | "c_int" => IntegerType::SINT32,
        "u32" | "uint" | "c_uint" => IntegerType::UINT32,
        "i64" | "long" | "c_longlong" => IntegerType::SINT64,
        "u64" | "ulong" | "c_ulonglong" => IntegerType::UINT64,
        other => return IntegerType::from_c_name(other),
    };
    Some(integer_type)
}

/// Find where the artifact declares `name` and the storage it chose.
///
/// Recognized forms:
/// - `#[repr(u8)]` followed by `enum Name` (same line or up to three above);
/// - C# `enum Name : byte`;
/// - `type Name = u8;` and `struct Name(pub u8);`;
/// - C `typedef uint8_t Name;`.
pub fn find_binding_storage(text: &str, name: &str) -> Option<BindingStorage> {
    let lines: Vec<&str> = text.lines().collect();
    for (index, line) in lines.iter().enumerate() {
        let words = line_identifiers(line);
        let Some(position) = words.iter().position(|(_, word)| *word == name) else {
            continue;
        };
        let (offset, _) = words[position];
        let rest = line[offset + name.len()..].trim_start();
        let previous = position.checked_sub(1).map(|before| words[before].1);
        let next = |skip: usize| words.get(position + 1 + skip).map(|(_, word)| *word);

        let spelling = match previous {
            Some("enum") if rest.starts_with(':') => next(0),
            Some("enum") => {
                let first = index.saturating_sub(3);
                repr_integer(&line[..offset]).or_else(|| {
                    lines[first..index]
                        .iter()
                        .rev()
                        .find_map(|candidate| repr_integer(candidate))
                })
            }
            // Paths such as `::std::os::raw::c_short` end in the type name.
            Some("type") if rest.starts_with('=') => words[position + 1..]
                .iter()
                .map(|(_, word)| *word)
                .find(|word| binding_integer_type(word).is_some()),
            Some("struct") if rest.starts_with('(') => match next(0) {
                Some("pub") => next(1),
                other => other,
            },
            Some(ctype) if words[0].1 == "typedef" && position + 1 == words.len() => Some(ctype),
            _ => None,
        };

        if let Some(spelling) = spelling {
            if let Some(integer_type) = binding_integer_type(spelling) {
                return Some(BindingStorage {
                    integer_type,
                    spelling: spelling.to_string(),
                    line: index + 1,
                });
            }
        }
    }
    None
}

fn repr_integer(line: &str) -> Option<&str> {
    let words = line_identifiers(line);
    let repr = words.iter().position(|(_, word)| *word == "repr")?;
    words[repr + 1..]
        .iter()
        .map(|(_, word)| *word)
        .find(|word| binding_integer_type(word).is_some())
}

/// Every value of `node` must fit the storage the artifact gave `name`.
pub fn check_binding_width(text: &str, name: &str, node: &CEnum) -> Vec<BindingAnomaly> {
    let Some(storage) = find_binding_storage(text, name) else {
        return Vec::new();
    };
    node.values
        .iter()
        .filter(|value| !storage.integer_type.holds(i128::from(value.value)))
        .map(|value| BindingAnomaly::binding_too_narrow(name, &storage, &value.name, value.value))
        .collect()
}

/// Inspect `text` against `ast` (the declarations the generator was given).
pub fn verify_bindings(
    artifact: &str,
    text: &str,
    ast: &CAbstractSyntaxTree,
    options: &VerifyOptions,
) -> BindingReport {
    let identifiers = scan_identifiers(text);
    let mut anomalies = Vec::new();

    let mut by_line: Vec<(&String, &usize)> = identifiers.iter().collect();
    by_line.sort_by_key(|(name, line)| (**line, (*name).clone()));
    for (symbol, line) in by_line {
        let declaration = if options.symbol_prefix_matching {
            options
                .exclusions
                .matching(symbol)
                .map(|rule| rule.declaration.clone())
        } else if options.exclusions.is_excluded(symbol) {
            Some(symbol.clone())
        } else {
            None
        };
        if let Some(declaration) = declaration {
            log::warn!(
                "[Verify] {}: excluded symbol {} on line {}",
                artifact,
                symbol,
                line
            );
            anomalies.push(BindingAnomaly::excluded(&declaration, symbol, *line));
        }
    }

    for (name, node) in &ast.enums {
        anomalies.extend(check_enum_width(name, node));
        if !options.exclusions.is_excluded(name) {
            anomalies.extend(check_binding_width(text, name, node));
        }
    }

    if options.require_coverage {
        let present: HashSet<&str> = identifiers.keys().map(String::as_str).collect();
        let expected = ast
            .enums
            .keys()
            .chain(ast.functions.keys())
            .chain(ast.opaque_types.keys())
            .filter(|name| !options.exclusions.is_excluded(name));
        for name in expected {
            if !present.contains(name.as_str()) {
                anomalies.push(BindingAnomaly::missing(name));
            }
        }
    }

    log::info!(
        "[Verify] {}: {} identifiers, {} anomalies",
        artifact,
        identifiers.len(),
        anomalies.len()
    );

    BindingReport {
        artifact: artifact.to_string(),
        identifiers_scanned: identifiers.len(),
        anomalies,
    }
}

pub fn verify_bindings_file(
    path: &Path,
    ast: &CAbstractSyntaxTree,
    options: &VerifyOptions,
) -> Result<BindingReport, FixtureError> {
    let text = std::fs::read_to_string(path)?;
    Ok(verify_bindings(
        &path.display().to_string(),
        &text,
        ast,
        options,
    ))
}

/// Every value of `node` must fit the integer type it declares.
pub fn check_enum_width(name: &str, node: &CEnum) -> Vec<BindingAnomaly> {
    let declared = &node.type_integer;
    let integer_type = IntegerType::from_c_name(&declared.name).or_else(|| {
        let is_signed = declared.is_signed?;
        [
            IntegerType::SINT8,
            IntegerType::UINT8,
            IntegerType::SINT16,
            IntegerType::UINT16,
            IntegerType::SINT32,
            IntegerType::UINT32,
            IntegerType::SINT64,
            IntegerType::UINT64,
        ]
        .into_iter()
        .find(|candidate| candidate.size_of == declared.size_of && candidate.is_signed == is_signed)
    });

    let Some(integer_type) = integer_type else {
        return vec![BindingAnomaly::unknown_integer_type(name, &declared.name)];
    };

    node.values
        .iter()
        .filter(|value| !integer_type.holds(i128::from(value.value)))
        .map(|value| BindingAnomaly::width_too_narrow(name, &declared.name, &value.name, value.value))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{CEnumValue, CTypeInfo};
    use crate::catalog::build_ast;
    use crate::platform::TargetPlatform;

    fn linux_ast() -> CAbstractSyntaxTree {
        build_ast(TargetPlatform::Linux, &ExclusionList::default())
    }

    fn complete_artifact(ast: &CAbstractSyntaxTree) -> String {
        ast.enums
            .keys()
            .chain(ast.functions.keys())
            .chain(ast.opaque_types.keys())
            .map(|name| format!("pub fn {name}();"))
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn scans_identifiers_with_first_line() {
        let identifiers = scan_identifiers("a b_1 9x\n_c a\nfoo::bar");
        assert_eq!(identifiers["a"], 1);
        assert_eq!(identifiers["b_1"], 1);
        assert_eq!(identifiers["_c"], 2);
        assert_eq!(identifiers["bar"], 3);
        assert!(!identifiers.contains_key("9x"));
    }

    #[test]
    fn clean_artifact_has_no_anomalies() {
        let ast = linux_ast();
        let report = verify_bindings("clean.rs", &complete_artifact(&ast), &ast, &VerifyOptions::default());
        assert!(!report.has_anomalies(), "{:?}", report.anomalies);
        assert!(report.exclusion_result().is_ok());
    }

    #[test]
    fn flags_excluded_declaration_and_prefixes() {
        let ast = linux_ast();
        let text = format!(
            "{}\npub enum EnumIgnored {{}}\nextern fn EnumIgnored__print_EnumIgnored();\nconst ENUM_IGNORED_DAY_MONDAY: i8 = 1;",
            complete_artifact(&ast)
        );
        let report = verify_bindings("dirty.rs", &text, &ast, &VerifyOptions::default());
        assert_eq!(report.count(BindingAnomalyKind::ExcludedDeclaration), 3);
        assert_eq!(
            report.exclusion_result(),
            Err(FixtureError::ExcludedDeclarationEmitted {
                declaration: "EnumIgnored".to_string(),
                symbol: "EnumIgnored".to_string(),
            })
        );
    }

    #[test]
    fn exact_matching_ignores_prefixed_symbols() {
        let ast = linux_ast();
        let options = VerifyOptions {
            symbol_prefix_matching: false,
            ..VerifyOptions::default()
        };
        let text = format!(
            "{}\nconst ENUM_IGNORED_DAY_MONDAY: i8 = 1;",
            complete_artifact(&ast)
        );
        let report = verify_bindings("prefixed.rs", &text, &ast, &options);
        assert_eq!(report.count(BindingAnomalyKind::ExcludedDeclaration), 0);
    }

    #[test]
    fn reports_missing_declarations() {
        let ast = linux_ast();
        let report = verify_bindings("empty.rs", "", &ast, &VerifyOptions::default());
        assert_eq!(
            report.count(BindingAnomalyKind::MissingDeclaration),
            ast.enums.len() + ast.functions.len() + ast.opaque_types.len()
        );
    }

    #[test]
    fn flags_binding_storage_narrower_than_values() {
        let ast = linux_ast();
        let options = VerifyOptions {
            require_coverage: false,
            ..VerifyOptions::default()
        };
        let text = "#[repr(u8)] pub enum Enum_Force_UInt16 { _ENUM_FORCE_UINT16 = 0xFFFF }";
        let report = verify_bindings("narrow.rs", text, &ast, &options);

        assert_eq!(report.count(BindingAnomalyKind::WidthTooNarrow), 1);
        let anomaly = &report.anomalies[0];
        assert_eq!(anomaly.declaration.as_deref(), Some("Enum_Force_UInt16"));
        assert_eq!(anomaly.symbol.as_deref(), Some("_ENUM_FORCE_UINT16"));
        assert_eq!(anomaly.integer_type.as_deref(), Some("u8"));
        assert_eq!(anomaly.line, Some(1));
    }

    #[test]
    fn accepts_bindings_wide_enough_for_sentinels() {
        let ast = linux_ast();
        let options = VerifyOptions {
            require_coverage: false,
            ..VerifyOptions::default()
        };
        let text = [
            "#[repr(u16)]",
            "#[derive(Clone, Copy)]",
            "pub enum Enum_Force_UInt16 { Friday = 5 }",
            "public enum Enum_Force_UInt8 : byte { }",
            "pub type Enum_Force_SInt32 = i32;",
            "pub struct Enum_Force_UInt64(pub u64);",
            "typedef int16_t Enum_Force_SInt16;",
        ]
        .join("\n");
        let report = verify_bindings("wide.rs", &text, &ast, &options);
        assert!(!report.has_anomalies(), "{:?}", report.anomalies);
    }

    #[test]
    fn finds_storage_in_each_binding_form() {
        let cases = [
            ("#[repr(i8)]\npub enum Enum_Force_SInt16 {}", "i8", 2),
            ("enum Enum_Force_SInt16 : sbyte {}", "sbyte", 1),
            ("pub type Enum_Force_SInt16 = ::std::os::raw::c_short;", "c_short", 1),
            ("pub struct Enum_Force_SInt16(pub u8);", "u8", 1),
            ("typedef uint8_t Enum_Force_SInt16;", "uint8_t", 1),
        ];
        for (text, spelling, line) in cases {
            let storage = find_binding_storage(text, "Enum_Force_SInt16")
                .unwrap_or_else(|| panic!("no storage found in {text:?}"));
            assert_eq!(storage.spelling, spelling, "{text}");
            assert_eq!(storage.line, line, "{text}");
        }
        assert!(find_binding_storage("pub fn Enum_Force_SInt16();", "Enum_Force_SInt16").is_none());
    }

    #[test]
    fn narrowed_c_sharp_binding_is_reported() {
        let ast = linux_ast();
        let options = VerifyOptions {
            require_coverage: false,
            ..VerifyOptions::default()
        };
        let report = verify_bindings(
            "narrow.cs",
            "public enum Enum_Force_UInt32 : ushort { }",
            &ast,
            &options,
        );
        assert_eq!(report.count(BindingAnomalyKind::WidthTooNarrow), 1);
        assert_eq!(report.anomalies[0].value, Some(0xFFFF_FFFF));
    }

    #[test]
    fn flags_undersized_integer_type() {
        let node = CEnum {
            location: None,
            type_integer: CTypeInfo {
                name: "int8_t".to_string(),
                size_of: 1,
                is_signed: Some(true),
            },
            values: vec![
                CEnumValue {
                    name: "ENUM_FORCE_UINT8_DAY_UNKNOWN".to_string(),
                    value: 0,
                },
                CEnumValue {
                    name: "_ENUM_FORCE_UINT8".to_string(),
                    value: 0xFF,
                },
            ],
        };
        let anomalies = check_enum_width("Enum_Force_UInt8", &node);
        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].kind, BindingAnomalyKind::WidthTooNarrow);
        assert_eq!(anomalies[0].value, Some(0xFF));
    }

    #[test]
    fn falls_back_to_size_and_signedness() {
        let node = CEnum {
            location: None,
            type_integer: CTypeInfo {
                name: "unsigned short".to_string(),
                size_of: 2,
                is_signed: Some(false),
            },
            values: vec![CEnumValue {
                name: "_ENUM_FORCE_UINT16".to_string(),
                value: 0xFFFF,
            }],
        };
        assert!(check_enum_width("Enum_Force_UInt16", &node).is_empty());

        let unknown = CEnum {
            type_integer: CTypeInfo {
                name: "mystery".to_string(),
                size_of: 3,
                is_signed: None,
            },
            ..node
        };
        assert_eq!(
            check_enum_width("Enum_Force_UInt16", &unknown)[0].kind,
            BindingAnomalyKind::UnknownIntegerType
        );
    }

    #[test]
    fn catalog_enums_pass_width_check() {
        let ast = linux_ast();
        for (name, node) in &ast.enums {
            assert!(check_enum_width(name, node).is_empty(), "{name}");
        }
    }
}
