pub mod analyzers;
pub mod error;
pub mod manifest;
pub mod model;

use once_cell::sync::Lazy;

pub use analyzers::{Analyzer, AnalyzerRegistry, PythonAnalyzer, TypeScriptAnalyzer};
pub use error::{AnalyzerError, Result};
pub use manifest::{ManifestParser, NpmManifest, PythonManifest};
pub use model::{
    ClassInfo, CodeAnalysisResult, DependencyInfo, FunctionInfo, ImportInfo, ParameterInfo,
    PropertyInfo,
};

/// Global analyzer registry instance (lazily initialized)
pub static REGISTRY: Lazy<AnalyzerRegistry> = Lazy::new(AnalyzerRegistry::new);
