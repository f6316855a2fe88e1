//! Manifest discovery and parsing.
//!
//! Each engine resolves the dependencies declared for a source file by
//! walking parent directories until a manifest is found. A missing manifest
//! is not an error; an unreadable or unparseable one is downgraded to "no
//! manifest" with a warning so a single bad manifest never fails a batch.

pub mod npm;
pub mod python;

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::model::DependencyInfo;

pub use npm::NpmManifest;
pub use python::PythonManifest;

/// One manifest dialect: which file names it claims and how to parse them.
pub trait ManifestParser: Send + Sync {
    /// Manifest file names this parser can handle, in probe order.
    fn manifest_names(&self) -> &[&'static str];

    /// Parses a manifest file into dependency entries.
    fn parse(&self, path: &Path) -> Result<Vec<DependencyInfo>>;
}

/// Walks from the source file's directory toward the filesystem root and
/// returns the first manifest the parser claims.
pub fn find_manifest(source: &Path, parser: &dyn ManifestParser) -> Option<PathBuf> {
    for dir in source.parent()?.ancestors() {
        for name in parser.manifest_names() {
            let candidate = dir.join(name);
            if candidate.is_file() {
                return Some(candidate);
            }
        }
    }
    None
}

/// Resolves declared dependencies for a source file. Absence of a manifest
/// yields an empty list; parse trouble is logged and treated the same way.
pub fn resolve_dependencies(source: &Path, parser: &dyn ManifestParser) -> Vec<DependencyInfo> {
    let Some(manifest) = find_manifest(source, parser) else {
        return Vec::new();
    };

    match parser.parse(&manifest) {
        Ok(deps) => deps,
        Err(e) => {
            tracing::warn!("ignoring manifest {}: {}", manifest.display(), e);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_find_manifest_walks_up() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("package.json"), "{}").unwrap();
        let nested = dir.path().join("src").join("deep");
        fs::create_dir_all(&nested).unwrap();
        let source = nested.join("app.ts");
        fs::write(&source, "").unwrap();

        let found = find_manifest(&source, &NpmManifest::new()).unwrap();
        assert_eq!(found, dir.path().join("package.json"));
    }

    #[test]
    fn test_find_manifest_prefers_nearest() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("package.json"), "{}").unwrap();
        let nested = dir.path().join("pkg");
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join("package.json"), "{}").unwrap();
        let source = nested.join("index.js");
        fs::write(&source, "").unwrap();

        let found = find_manifest(&source, &NpmManifest::new()).unwrap();
        assert_eq!(found, nested.join("package.json"));
    }

    #[test]
    fn test_resolve_without_manifest_is_empty() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("app.ts");
        fs::write(&source, "").unwrap();

        let deps = resolve_dependencies(&source, &NpmManifest::new());
        assert!(deps.is_empty());
    }

    #[test]
    fn test_resolve_with_broken_manifest_is_empty() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("package.json"), "not json at all").unwrap();
        let source = dir.path().join("app.ts");
        fs::write(&source, "").unwrap();

        let deps = resolve_dependencies(&source, &NpmManifest::new());
        assert!(deps.is_empty());
    }
}
