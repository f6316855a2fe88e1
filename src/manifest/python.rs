//! Python manifest dialects: requirements.txt and setup.py.
//!
//! requirements.txt is line-oriented (`name[<op><version>]`, `#` comments and
//! pip option lines ignored). setup.py is treated as a code-embedded
//! manifest: the quoted entries of `install_requires` / `tests_require` list
//! expressions are extracted by pattern matching, not by executing the file.

use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::Result;
use crate::model::DependencyInfo;

use super::ManifestParser;

static INSTALL_REQUIRES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"install_requires\s*=\s*\[([^\]]*)\]").unwrap());
static TESTS_REQUIRE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"tests_require\s*=\s*\[([^\]]*)\]").unwrap());
static QUOTED_ENTRY: Lazy<Regex> = Lazy::new(|| Regex::new(r#""([^"]+)"|'([^']+)'"#).unwrap());

/// Names a sibling of requirements.txt may use for development dependencies.
const DEV_REQUIREMENTS: &[&str] = &["requirements-dev.txt", "dev-requirements.txt"];

/// Parser for Python dependency manifests.
pub struct PythonManifest;

impl PythonManifest {
    pub fn new() -> Self {
        Self
    }

    fn parse_requirements(content: &str, is_dev: bool) -> Vec<DependencyInfo> {
        content
            .lines()
            .filter_map(|line| Self::parse_requirement_line(line, is_dev))
            .collect()
    }

    /// Parses one `name[<op><version>]` line. Blank lines, `#` comments, and
    /// pip option lines (`-r`, `--index-url`, ...) yield nothing.
    fn parse_requirement_line(line: &str, is_dev: bool) -> Option<DependencyInfo> {
        let line = line.split(" #").next().unwrap_or(line).trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with('-') {
            return None;
        }

        let split_at = line
            .find(|c| matches!(c, '<' | '>' | '=' | '!' | '~'))
            .unwrap_or(line.len());
        let (raw_name, raw_version) = line.split_at(split_at);

        // "package[extra]" declares the same package
        let name = raw_name.split('[').next().unwrap_or(raw_name).trim();
        if name.is_empty() {
            return None;
        }

        let version = {
            let v = raw_version.trim();
            (!v.is_empty()).then(|| v.to_string())
        };

        Some(DependencyInfo::new(name, version, is_dev))
    }

    fn parse_setup_py(content: &str) -> Vec<DependencyInfo> {
        let mut deps = Self::extract_list(content, &INSTALL_REQUIRES, false);
        deps.extend(Self::extract_list(content, &TESTS_REQUIRE, true));
        deps
    }

    fn extract_list(content: &str, section: &Regex, is_dev: bool) -> Vec<DependencyInfo> {
        let Some(captures) = section.captures(content) else {
            return Vec::new();
        };
        let body = captures.get(1).map(|m| m.as_str()).unwrap_or("");

        QUOTED_ENTRY
            .captures_iter(body)
            .filter_map(|entry| {
                let literal = entry.get(1).or_else(|| entry.get(2))?.as_str();
                Self::parse_requirement_line(literal, is_dev)
            })
            .collect()
    }
}

impl Default for PythonManifest {
    fn default() -> Self {
        Self::new()
    }
}

impl ManifestParser for PythonManifest {
    fn manifest_names(&self) -> &[&'static str] {
        &["requirements.txt", "setup.py"]
    }

    fn parse(&self, path: &Path) -> Result<Vec<DependencyInfo>> {
        let content = fs::read_to_string(path)?;
        let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");

        if file_name == "setup.py" {
            return Ok(Self::parse_setup_py(&content));
        }

        let mut deps = Self::parse_requirements(&content, false);

        // requirements.txt projects usually keep dev pins in a sibling file
        if let Some(dir) = path.parent() {
            for dev_name in DEV_REQUIREMENTS {
                if let Ok(dev_content) = fs::read_to_string(dir.join(dev_name)) {
                    deps.extend(Self::parse_requirements(&dev_content, true));
                    break;
                }
            }
        }

        Ok(deps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_requirement_line_with_version() {
        let dep = PythonManifest::parse_requirement_line("requests>=2.31.0", false).unwrap();
        assert_eq!(dep.name, "requests");
        assert_eq!(dep.version.as_deref(), Some(">=2.31.0"));
        assert!(!dep.is_dev_dependency);
    }

    #[test]
    fn test_requirement_line_bare_name() {
        let dep = PythonManifest::parse_requirement_line("flask", false).unwrap();
        assert_eq!(dep.name, "flask");
        assert!(dep.version.is_none());
    }

    #[test]
    fn test_requirement_line_with_extras() {
        let dep = PythonManifest::parse_requirement_line("uvicorn[standard]==0.27.0", true).unwrap();
        assert_eq!(dep.name, "uvicorn");
        assert_eq!(dep.version.as_deref(), Some("==0.27.0"));
        assert!(dep.is_dev_dependency);
    }

    #[test]
    fn test_requirement_lines_skipped() {
        assert!(PythonManifest::parse_requirement_line("", false).is_none());
        assert!(PythonManifest::parse_requirement_line("   ", false).is_none());
        assert!(PythonManifest::parse_requirement_line("# comment", false).is_none());
        assert!(PythonManifest::parse_requirement_line("-r base.txt", false).is_none());
    }

    #[test]
    fn test_requirements_file_with_dev_sibling() {
        let dir = tempdir().unwrap();
        let req = dir.path().join("requirements.txt");
        fs::write(&req, "requests>=2.31.0\n\n# tooling\nclick==8.1.7\n").unwrap();
        fs::write(dir.path().join("requirements-dev.txt"), "pytest~=8.0\n").unwrap();

        let deps = PythonManifest::new().parse(&req).unwrap();
        assert_eq!(deps.len(), 3);
        assert_eq!(deps.iter().filter(|d| d.is_dev_dependency).count(), 1);

        let pytest = deps.iter().find(|d| d.name == "pytest").unwrap();
        assert_eq!(pytest.version.as_deref(), Some("~=8.0"));
    }

    #[test]
    fn test_setup_py_install_requires() {
        let content = r#"
from setuptools import setup

setup(
    name="sample",
    install_requires=[
        "requests>=2.28",
        'pyyaml',
    ],
    tests_require=["pytest"],
)
"#;
        let deps = PythonManifest::parse_setup_py(content);
        assert_eq!(deps.len(), 3);

        let requests = deps.iter().find(|d| d.name == "requests").unwrap();
        assert_eq!(requests.version.as_deref(), Some(">=2.28"));
        assert!(!requests.is_dev_dependency);

        let pytest = deps.iter().find(|d| d.name == "pytest").unwrap();
        assert!(pytest.is_dev_dependency);
    }

    #[test]
    fn test_setup_py_without_lists() {
        let deps = PythonManifest::parse_setup_py("from setuptools import setup\nsetup(name='x')\n");
        assert!(deps.is_empty());
    }
}
