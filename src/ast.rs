//! C abstract-syntax-tree documents describing the fixture declarations.
//!
//! A [`CAbstractSyntaxTree`] lists what one target platform sees; a
//! [`CAbstractSyntaxTreeCrossPlatform`] is the subset shared by several
//! platforms (see [`crate::merge`]). Both are plain JSON with camelCase keys.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::Path;

use crate::error::FixtureError;
use crate::platform::TargetPlatform;

/// Source position of a declaration.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CLocation {
    pub file_name: String,
    pub line: u32,
    #[serde(default)]
    pub column: u32,
}

impl fmt::Display for CLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.line == 0 && self.column == 0 {
            return f.write_str(&self.file_name);
        }
        write!(f, "{}:{}:{}", self.file_name, self.line, self.column)
    }
}

/// Integer type backing an enum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CTypeInfo {
    pub name: String,
    pub size_of: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_signed: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CEnumValue {
    pub name: String,
    pub value: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CEnum {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<CLocation>,
    pub type_integer: CTypeInfo,
    pub values: Vec<CEnumValue>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CFunctionCallingConvention {
    #[default]
    Cdecl,
    Stdcall,
    Fastcall,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CFunctionParameter {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CFunction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<CLocation>,
    #[serde(default)]
    pub calling_convention: CFunctionCallingConvention,
    pub return_type: String,
    #[serde(default)]
    pub parameters: Vec<CFunctionParameter>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct COpaqueType {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<CLocation>,
    pub size_of: usize,
}

/// Node kinds a document can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CKind {
    Enum,
    Function,
    OpaqueType,
}

impl fmt::Display for CKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CKind::Enum => "Enum",
            CKind::Function => "Function",
            CKind::OpaqueType => "OpaqueType",
        };
        f.write_str(label)
    }
}

/// Any declaration, tagged with its kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CNode {
    Enum(CEnum),
    Function(CFunction),
    OpaqueType(COpaqueType),
}

impl CNode {
    pub fn kind(&self) -> CKind {
        match self {
            CNode::Enum(_) => CKind::Enum,
            CNode::Function(_) => CKind::Function,
            CNode::OpaqueType(_) => CKind::OpaqueType,
        }
    }

    /// Copy of the node with every location cleared.
    pub fn without_location(&self) -> CNode {
        match self {
            CNode::Enum(node) => CNode::Enum(CEnum {
                location: None,
                ..node.clone()
            }),
            CNode::Function(node) => CNode::Function(CFunction {
                location: None,
                ..node.clone()
            }),
            CNode::OpaqueType(node) => CNode::OpaqueType(COpaqueType {
                location: None,
                ..node.clone()
            }),
        }
    }

    /// Equality that ignores source locations.
    pub fn same_definition(&self, other: &CNode) -> bool {
        self.without_location() == other.without_location()
    }
}

/// Declarations visible to one target platform.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CAbstractSyntaxTree {
    #[serde(default)]
    pub file_name: String,
    #[serde(default, with = "optional_platform")]
    pub platform_requested: Option<TargetPlatform>,
    #[serde(default, with = "optional_platform")]
    pub platform_actual: Option<TargetPlatform>,
    #[serde(default)]
    pub functions: BTreeMap<String, CFunction>,
    #[serde(default)]
    pub enums: BTreeMap<String, CEnum>,
    #[serde(default)]
    pub opaque_types: BTreeMap<String, COpaqueType>,
    /// Declarations present in the headers but withheld from bindings.
    #[serde(default)]
    pub excluded: Vec<String>,
}

impl CAbstractSyntaxTree {
    /// Parse a document and validate its invariants.
    pub fn from_json(data: &str) -> Result<Self, FixtureError> {
        let ast: CAbstractSyntaxTree = serde_json::from_str(data).map_err(|err| {
            document_error(format!("failed to parse abstract syntax tree JSON: {err}"))
        })?;
        ast.validate()?;
        Ok(ast)
    }

    pub fn read_from_path(path: &Path) -> Result<Self, FixtureError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    pub fn to_json_pretty(&self) -> Result<String, FixtureError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_to_path(&self, path: &Path) -> Result<(), FixtureError> {
        write_document(path, &self.to_json_pretty()?)
    }

    /// Every node keyed by name. Names used by more than one kind appear
    /// once per kind.
    pub fn nodes(&self) -> Vec<(String, CNode)> {
        let mut nodes = Vec::with_capacity(
            self.functions.len() + self.enums.len() + self.opaque_types.len(),
        );
        nodes.extend(
            self.enums
                .iter()
                .map(|(name, node)| (name.clone(), CNode::Enum(node.clone()))),
        );
        nodes.extend(
            self.functions
                .iter()
                .map(|(name, node)| (name.clone(), CNode::Function(node.clone()))),
        );
        nodes.extend(
            self.opaque_types
                .iter()
                .map(|(name, node)| (name.clone(), CNode::OpaqueType(node.clone()))),
        );
        nodes
    }

    /// True when neither requested nor actual platform is known.
    pub fn is_unknown_platform(&self) -> bool {
        self.platform_requested.is_none() && self.platform_actual.is_none()
    }

    pub fn validate(&self) -> Result<(), FixtureError> {
        for (name, node) in &self.enums {
            validate_name(name, "enum")?;
            validate_enum(name, node)?;
        }
        for (name, node) in &self.functions {
            validate_name(name, "function")?;
            if node.return_type.trim().is_empty() {
                return Err(document_error(format!(
                    "function {name} must declare a return type"
                )));
            }
        }
        for (name, node) in &self.opaque_types {
            validate_name(name, "opaque type")?;
            if node.size_of == 0 {
                return Err(document_error(format!(
                    "opaque type {name} must have non-zero size"
                )));
            }
        }
        Ok(())
    }
}

/// Declarations shared by every merged platform.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CAbstractSyntaxTreeCrossPlatform {
    pub platforms: Vec<TargetPlatform>,
    #[serde(default)]
    pub functions: BTreeMap<String, CFunction>,
    #[serde(default)]
    pub enums: BTreeMap<String, CEnum>,
    #[serde(default)]
    pub opaque_types: BTreeMap<String, COpaqueType>,
}

impl CAbstractSyntaxTreeCrossPlatform {
    pub fn from_json(data: &str) -> Result<Self, FixtureError> {
        serde_json::from_str(data).map_err(|err| {
            document_error(format!(
                "failed to parse cross-platform abstract syntax tree JSON: {err}"
            ))
        })
    }

    pub fn to_json_pretty(&self) -> Result<String, FixtureError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_to_path(&self, path: &Path) -> Result<(), FixtureError> {
        write_document(path, &self.to_json_pretty()?)
    }
}

/// `"unknown"` (or null) on the wire, `None` in memory.
mod optional_platform {
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::platform::TargetPlatform;

    const UNKNOWN: &str = "unknown";

    pub fn serialize<S>(value: &Option<TargetPlatform>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(value.map(|platform| platform.as_str()).unwrap_or(UNKNOWN))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<TargetPlatform>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(name) if name.eq_ignore_ascii_case(UNKNOWN) => Ok(None),
            Some(name) => name.parse().map(Some).map_err(serde::de::Error::custom),
        }
    }
}

fn validate_name(name: &str, label: &str) -> Result<(), FixtureError> {
    if name.trim().is_empty() {
        return Err(document_error(format!("{label} name cannot be empty")));
    }
    Ok(())
}

fn validate_enum(name: &str, node: &CEnum) -> Result<(), FixtureError> {
    if node.values.is_empty() {
        return Err(document_error(format!(
            "enum {name} must declare at least one value"
        )));
    }
    if node.type_integer.size_of == 0 {
        return Err(document_error(format!(
            "enum {name} has invalid integer size"
        )));
    }
    let mut seen = HashSet::new();
    for value in &node.values {
        if value.name.trim().is_empty() {
            return Err(document_error(format!(
                "enum {name} has a value with an empty name"
            )));
        }
        if !seen.insert(value.name.as_str()) {
            return Err(document_error(format!(
                "duplicate enum value {} in {name}",
                value.name
            )));
        }
    }
    Ok(())
}

fn write_document(path: &Path, json: &str) -> Result<(), FixtureError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, json)?;
    Ok(())
}

fn document_error(reason: impl Into<String>) -> FixtureError {
    FixtureError::InvalidDocument {
        reason: reason.into(),
    }
}
