//! Canonical result model shared by every language engine.
//!
//! Each `analyze_file` call produces one [`CodeAnalysisResult`] tree. The
//! four sequence fields are always present (possibly empty) so callers never
//! need null checks; `error` is set only when parsing failed, in which case
//! all sequences are empty. Results are plain data: no caching, no identity
//! beyond the call that produced them.

use serde::{Deserialize, Serialize};

/// Structural summary of one analyzed source file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeAnalysisResult {
    /// Basename of the analyzed path.
    pub file_name: String,
    /// Tag of the engine that produced this result, e.g. "typescript".
    pub language: String,
    #[serde(default)]
    pub functions: Vec<FunctionInfo>,
    #[serde(default)]
    pub classes: Vec<ClassInfo>,
    #[serde(default)]
    pub dependencies: Vec<DependencyInfo>,
    #[serde(default)]
    pub imports: Vec<ImportInfo>,
    /// Diagnostic set when parsing failed; the sequences above are empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CodeAnalysisResult {
    pub fn new(file_name: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            language: language.into(),
            functions: Vec::new(),
            classes: Vec::new(),
            dependencies: Vec::new(),
            imports: Vec::new(),
            error: None,
        }
    }

    /// Degraded result for a file that could not be parsed. The batch
    /// continues; only this file carries a diagnostic.
    pub fn parse_failure(
        file_name: impl Into<String>,
        language: impl Into<String>,
        diagnostic: impl Into<String>,
    ) -> Self {
        let mut result = Self::new(file_name, language);
        result.error = Some(diagnostic.into());
        result
    }
}

/// A standalone function, a closure bound to a variable, or (inside
/// [`ClassInfo::methods`]) a method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionInfo {
    /// Binding name, or "anonymous" when no identifier exists.
    pub name: String,
    #[serde(default)]
    pub params: Vec<ParameterInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docstring: Option<String>,
    /// Cyclomatic-style score, always >= 1.
    pub complexity: u32,
    pub start_line: u32,
    pub end_line: u32,
    pub is_async: bool,
    /// True only for module-top-level bindings reachable through the
    /// language's export mechanism. Always false for methods.
    pub is_exported: bool,
}

/// One declared parameter, in source order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterInfo {
    /// Identifier, or a synthesized form for patterns ("{a, b}", "[a, b]")
    /// and variadics ("...rest").
    pub name: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub ty: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    /// False exactly when a default value exists.
    pub is_required: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassInfo {
    pub name: String,
    #[serde(default)]
    pub methods: Vec<FunctionInfo>,
    #[serde(default)]
    pub properties: Vec<PropertyInfo>,
    /// Usually 0 or 1 entries; multiple for interface/trait lists.
    #[serde(default)]
    pub super_classes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docstring: Option<String>,
    pub start_line: u32,
    pub end_line: u32,
    pub is_exported: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyInfo {
    pub name: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub ty: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    /// Explicit private modifier or the language's private-naming convention.
    pub is_private: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportInfo {
    /// Local binding name.
    pub name: String,
    /// Module specifier as written.
    pub path: String,
    pub is_default: bool,
    pub is_namespace: bool,
    /// Present only when one or more named bindings were imported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub named_imports: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyInfo {
    pub name: String,
    /// Version as declared in the manifest, including any range operator.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub is_dev_dependency: bool,
}

impl DependencyInfo {
    pub fn new(name: impl Into<String>, version: Option<String>, is_dev: bool) -> Self {
        Self {
            name: name.into(),
            version,
            is_dev_dependency: is_dev,
        }
    }
}
