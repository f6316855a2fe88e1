//! Structured manifest dialect: package.json.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{AnalyzerError, Result};
use crate::model::DependencyInfo;

use super::ManifestParser;

/// Parser for package.json `dependencies` / `devDependencies` sections.
pub struct NpmManifest;

impl NpmManifest {
    pub fn new() -> Self {
        Self
    }

    fn parse_content(&self, content: &str) -> Result<Vec<DependencyInfo>> {
        let pkg: PackageJson = serde_json::from_str(content)
            .map_err(|e| AnalyzerError::Parse(format!("invalid package.json: {}", e)))?;

        let mut deps = Vec::new();
        for (name, version) in pkg.dependencies {
            deps.push(DependencyInfo::new(name, Some(version), false));
        }
        for (name, version) in pkg.dev_dependencies {
            deps.push(DependencyInfo::new(name, Some(version), true));
        }
        Ok(deps)
    }
}

impl Default for NpmManifest {
    fn default() -> Self {
        Self::new()
    }
}

impl ManifestParser for NpmManifest {
    fn manifest_names(&self) -> &[&'static str] {
        &["package.json"]
    }

    fn parse(&self, path: &Path) -> Result<Vec<DependencyInfo>> {
        let content = fs::read_to_string(path)?;
        self.parse_content(&content)
    }
}

/// Minimal representation of package.json
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PackageJson {
    #[serde(default)]
    dependencies: BTreeMap<String, String>,
    #[serde(default)]
    dev_dependencies: BTreeMap<String, String>,
}
