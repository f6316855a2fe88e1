//! Python engine.
//!
//! Python's own tree-building facility is not available in-process, so this
//! engine delegates: it stages a small extraction program (stdlib `ast`) at
//! a unique temp path, runs the external interpreter with the target file as
//! its only argument, and reads one JSON document back from stdout. The
//! bridge program implements the same extraction and counting rules as the
//! TypeScript engine, so results from the two are structurally
//! indistinguishable to callers.
//!
//! Every bridge failure (missing interpreter, non-zero exit, malformed
//! payload) degrades to the same empty-sequences-plus-error result a syntax
//! error produces; nothing from the bridge propagates as a fault.

use std::fs;
use std::path::Path;
use std::process::Command;

use serde::Deserialize;
use uuid::Uuid;

use crate::error::Result;
use crate::manifest::{self, PythonManifest};
use crate::model::{
    ClassInfo, CodeAnalysisResult, FunctionInfo, ImportInfo, ParameterInfo, PropertyInfo,
};

use super::{file_basename, Analyzer};

const LANGUAGE: &str = "python";

const BRIDGE_PROGRAM: &str = include_str!("python_bridge.py");

pub struct PythonAnalyzer {
    interpreter: String,
    manifest: PythonManifest,
}

impl PythonAnalyzer {
    pub fn new() -> Self {
        Self::with_interpreter("python3")
    }

    pub fn with_interpreter(interpreter: impl Into<String>) -> Self {
        Self {
            interpreter: interpreter.into(),
            manifest: PythonManifest::new(),
        }
    }

    /// Stages the bridge program, runs it against `target`, and parses the
    /// payload. The staged file gets a unique name per invocation so
    /// concurrent calls never collide.
    fn run_bridge(&self, target: &Path) -> std::result::Result<BridgePayload, String> {
        let program = std::env::temp_dir().join(format!("code-analyzer-bridge-{}.py", Uuid::new_v4()));
        fs::write(&program, BRIDGE_PROGRAM)
            .map_err(|e| format!("failed to stage bridge program: {}", e))?;

        let output = Command::new(&self.interpreter)
            .arg(&program)
            .arg(target)
            .output();
        let _ = fs::remove_file(&program);

        let output =
            output.map_err(|e| format!("failed to launch {}: {}", self.interpreter, e))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(format!(
                "{} exited with {}: {}",
                self.interpreter,
                output.status,
                stderr.trim()
            ));
        }

        serde_json::from_slice(&output.stdout)
            .map_err(|e| format!("malformed bridge payload: {}", e))
    }
}

impl Default for PythonAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl Analyzer for PythonAnalyzer {
    fn language(&self) -> &'static str {
        LANGUAGE
    }

    fn supported_extensions(&self) -> &[&'static str] {
        &["py"]
    }

    fn analyze_file(&self, path: &Path) -> Result<CodeAnalysisResult> {
        // An unreadable target is the caller's problem; check before
        // spawning so it surfaces as an IO error, not a bridge diagnostic.
        fs::File::open(path)?;

        let file_name = file_basename(path);
        match self.run_bridge(path) {
            Ok(payload) => {
                let mut result = payload.into_result(file_name);
                if result.error.is_none() {
                    result.dependencies = manifest::resolve_dependencies(path, &self.manifest);
                }
                Ok(result)
            }
            Err(diagnostic) => {
                tracing::warn!("python bridge failed for {}: {}", path.display(), diagnostic);
                Ok(CodeAnalysisResult::parse_failure(
                    file_name, LANGUAGE, diagnostic,
                ))
            }
        }
    }
}

// Wire shapes of the bridge payload (snake_case on the wire); mapped onto
// the canonical model here, at the process boundary.

#[derive(Debug, Deserialize)]
struct BridgePayload {
    #[serde(default)]
    functions: Vec<BridgeFunction>,
    #[serde(default)]
    classes: Vec<BridgeClass>,
    #[serde(default)]
    imports: Vec<BridgeImport>,
    #[serde(default)]
    error: Option<String>,
}

impl BridgePayload {
    fn into_result(self, file_name: String) -> CodeAnalysisResult {
        if let Some(error) = self.error {
            return CodeAnalysisResult::parse_failure(file_name, LANGUAGE, error);
        }

        let mut result = CodeAnalysisResult::new(file_name, LANGUAGE);
        result.functions = self.functions.into_iter().map(Into::into).collect();
        result.classes = self.classes.into_iter().map(Into::into).collect();
        result.imports = self.imports.into_iter().map(Into::into).collect();
        result
    }
}

#[derive(Debug, Deserialize)]
struct BridgeFunction {
    name: String,
    #[serde(default)]
    params: Vec<BridgeParameter>,
    #[serde(default)]
    return_type: Option<String>,
    #[serde(default)]
    docstring: Option<String>,
    complexity: u32,
    start_line: u32,
    end_line: u32,
    #[serde(default)]
    is_async: bool,
    #[serde(default)]
    is_exported: bool,
}

impl From<BridgeFunction> for FunctionInfo {
    fn from(raw: BridgeFunction) -> Self {
        Self {
            name: raw.name,
            params: raw.params.into_iter().map(Into::into).collect(),
            return_type: raw.return_type,
            docstring: raw.docstring,
            complexity: raw.complexity,
            start_line: raw.start_line,
            end_line: raw.end_line,
            is_async: raw.is_async,
            is_exported: raw.is_exported,
        }
    }
}

#[derive(Debug, Deserialize)]
struct BridgeParameter {
    name: String,
    #[serde(rename = "type", default)]
    ty: Option<String>,
    #[serde(default)]
    default_value: Option<String>,
    #[serde(default = "default_true")]
    is_required: bool,
}

fn default_true() -> bool {
    true
}

impl From<BridgeParameter> for ParameterInfo {
    fn from(raw: BridgeParameter) -> Self {
        Self {
            name: raw.name,
            ty: raw.ty,
            default_value: raw.default_value,
            is_required: raw.is_required,
        }
    }
}

#[derive(Debug, Deserialize)]
struct BridgeClass {
    name: String,
    #[serde(default)]
    methods: Vec<BridgeFunction>,
    #[serde(default)]
    properties: Vec<BridgeProperty>,
    #[serde(default)]
    super_classes: Vec<String>,
    #[serde(default)]
    docstring: Option<String>,
    start_line: u32,
    end_line: u32,
    #[serde(default)]
    is_exported: bool,
}

impl From<BridgeClass> for ClassInfo {
    fn from(raw: BridgeClass) -> Self {
        Self {
            name: raw.name,
            methods: raw.methods.into_iter().map(Into::into).collect(),
            properties: raw.properties.into_iter().map(Into::into).collect(),
            super_classes: raw.super_classes,
            docstring: raw.docstring,
            start_line: raw.start_line,
            end_line: raw.end_line,
            is_exported: raw.is_exported,
        }
    }
}

#[derive(Debug, Deserialize)]
struct BridgeProperty {
    name: String,
    #[serde(rename = "type", default)]
    ty: Option<String>,
    #[serde(default)]
    default_value: Option<String>,
    #[serde(default)]
    is_private: bool,
}

impl From<BridgeProperty> for PropertyInfo {
    fn from(raw: BridgeProperty) -> Self {
        Self {
            name: raw.name,
            ty: raw.ty,
            default_value: raw.default_value,
            is_private: raw.is_private,
        }
    }
}

#[derive(Debug, Deserialize)]
struct BridgeImport {
    name: String,
    path: String,
    #[serde(default)]
    is_default: bool,
    #[serde(default)]
    is_namespace: bool,
    #[serde(default)]
    named_imports: Option<Vec<String>>,
}

impl From<BridgeImport> for ImportInfo {
    fn from(raw: BridgeImport) -> Self {
        Self {
            name: raw.name,
            path: raw.path,
            is_default: raw.is_default,
            is_namespace: raw.is_namespace,
            named_imports: raw.named_imports,
        }
    }
}
