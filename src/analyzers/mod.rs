//! Language engines and the extension-based dispatcher.
//!
//! Each engine implements [`Analyzer`] and fills the canonical model in
//! [`crate::model`]. Engines share nothing but that output contract: the
//! TypeScript engine walks an in-process tree-sitter tree, the Python engine
//! delegates to an external interpreter. The registry selects an engine by
//! file extension and performs no parsing of its own.

pub mod python;
pub mod typescript;

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::error::{AnalyzerError, Result};
use crate::model::CodeAnalysisResult;

pub use python::PythonAnalyzer;
pub use typescript::TypeScriptAnalyzer;

/// Capability contract every engine implements.
///
/// `analyze_file` recovers from anything scoped to the file itself (syntax
/// errors, bridge trouble) by returning a result with `error` set. Only an
/// unreadable target file escapes as `Err`.
pub trait Analyzer: Send + Sync {
    /// Tag written into [`CodeAnalysisResult::language`].
    fn language(&self) -> &'static str;

    /// File extensions this engine claims.
    fn supported_extensions(&self) -> &[&'static str];

    fn analyze_file(&self, path: &Path) -> Result<CodeAnalysisResult>;
}

/// Maps file extensions onto engines and exposes the single entry point.
pub struct AnalyzerRegistry {
    analyzers: Vec<Arc<dyn Analyzer>>,
    extension_map: HashMap<String, usize>,
}

impl AnalyzerRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            analyzers: Vec::new(),
            extension_map: HashMap::new(),
        };
        registry.register(Arc::new(TypeScriptAnalyzer::new()));
        registry.register(Arc::new(PythonAnalyzer::new()));
        registry
    }

    pub fn register(&mut self, analyzer: Arc<dyn Analyzer>) {
        let index = self.analyzers.len();
        for ext in analyzer.supported_extensions() {
            self.extension_map.insert(ext.to_string(), index);
        }
        self.analyzers.push(analyzer);
    }

    pub fn get_by_extension(&self, ext: &str) -> Option<Arc<dyn Analyzer>> {
        self.extension_map
            .get(ext)
            .map(|&index| self.analyzers[index].clone())
    }

    pub fn get_for_file(&self, path: &Path) -> Option<Arc<dyn Analyzer>> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| self.get_by_extension(ext))
    }

    /// Analyzes one file with the engine claiming its extension.
    ///
    /// An extension no engine claims is a caller-level configuration error
    /// and returns [`AnalyzerError::UnsupportedLanguage`].
    pub fn analyze_file(&self, path: &Path) -> Result<CodeAnalysisResult> {
        let analyzer = self
            .get_for_file(path)
            .ok_or_else(|| AnalyzerError::UnsupportedLanguage(path.display().to_string()))?;

        tracing::debug!(
            "analyzing {} with {} engine",
            path.display(),
            analyzer.language()
        );
        analyzer.analyze_file(path)
    }

    pub fn supported_extensions(&self) -> Vec<&str> {
        self.extension_map.keys().map(|s| s.as_str()).collect()
    }
}

impl Default for AnalyzerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Basename of the analyzed path, as recorded in every result.
pub(crate) fn file_basename(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
