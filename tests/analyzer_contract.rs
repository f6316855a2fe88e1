//! Integration tests for the shared analyzer contract.
//!
//! The properties here hold across engines: results always carry defined
//! sequences and a basename, malformed input degrades instead of faulting,
//! and — most importantly — structurally equivalent code scores the same
//! complexity whichever language it is written in.

use std::fs;
use std::path::Path;
use std::process::Command;

use tempfile::TempDir;

use code_analyzer::{AnalyzerError, CodeAnalysisResult, REGISTRY};

fn python_available() -> bool {
    Command::new("python3")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

fn analyze_in_temp(file_name: &str, source: &str) -> CodeAnalysisResult {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join(file_name);
    fs::write(&path, source).expect("Failed to write source");
    REGISTRY.analyze_file(&path).expect("analyzeFile failed")
}

// ============================================================================
// Shared result shape
// ============================================================================

#[test]
fn test_result_always_carries_basename_and_sequences() {
    let result = analyze_in_temp("widget.ts", "export const id = (x) => x;");
    assert_eq!(result.file_name, "widget.ts");
    // sequences are defined even when empty
    assert!(result.classes.is_empty());
    assert!(result.imports.is_empty());
    assert!(result.dependencies.is_empty());
    assert_eq!(result.functions.len(), 1);
}

#[test]
fn test_unexported_two_parameter_function() {
    let result = analyze_in_temp("math.ts", "function add(a, b) { return a + b; }");
    assert_eq!(result.functions.len(), 1);

    let add = &result.functions[0];
    assert_eq!(add.params.len(), 2);
    assert_eq!(add.complexity, 1);
    assert!(!add.is_exported);
}

#[test]
fn test_same_function_exported() {
    let result = analyze_in_temp("math.ts", "export function add(a, b) { return a + b; }");
    let add = &result.functions[0];
    assert_eq!(add.params.len(), 2);
    assert_eq!(add.complexity, 1);
    assert!(add.is_exported);
}

#[test]
fn test_malformed_source_never_faults() {
    let result = analyze_in_temp("broken.ts", "const s = \"unterminated\nfunction f() {}");
    assert!(result.error.is_some());
    assert!(!result.error.as_deref().unwrap().is_empty());
    assert!(result.functions.is_empty());
    assert!(result.classes.is_empty());
    assert!(result.dependencies.is_empty());
    assert!(result.imports.is_empty());
}

#[test]
fn test_dispatcher_rejects_unclaimed_extension() {
    let err = REGISTRY.analyze_file(Path::new("notes.adoc")).unwrap_err();
    assert!(matches!(err, AnalyzerError::UnsupportedLanguage(_)));
}

// ============================================================================
// Cross-engine complexity equivalence
// ============================================================================

#[test]
fn test_complexity_equivalence_straight_line() {
    let ts = analyze_in_temp("plain.ts", "function id(x) { return x; }");
    assert_eq!(ts.functions[0].complexity, 1);

    if !python_available() {
        eprintln!("skipping python half: python3 not found");
        return;
    }
    let py = analyze_in_temp("plain.py", "def id(x):\n    return x\n");
    assert_eq!(py.functions[0].complexity, ts.functions[0].complexity);
}

#[test]
fn test_complexity_equivalence_boolean_chain() {
    let ts = analyze_in_temp("chain.ts", "function all(a, b, c) { return a && b && c; }");
    assert_eq!(ts.functions[0].complexity, 3);

    if !python_available() {
        eprintln!("skipping python half: python3 not found");
        return;
    }
    let py = analyze_in_temp("chain.py", "def all_of(a, b, c):\n    return a and b and c\n");
    assert_eq!(py.functions[0].complexity, ts.functions[0].complexity);
}

#[test]
fn test_complexity_equivalence_mixed_branches() {
    // 1 base + loop + if + extra operand + 2 branch arms + handler = 7
    let ts_source = r#"
function score(flags, mode) {
    let total = 0;
    for (const flag of flags) {
        if (flag && mode) {
            total += 1;
        }
    }
    switch (mode) {
        case "fast":
            total += 2;
            break;
        case "slow":
            total -= 1;
            break;
        default:
            break;
    }
    try {
        publish(total);
    } catch (e) {
        report(e);
    }
    return total;
}
"#;
    let py_source = r#"
def score(flags, mode):
    total = 0
    for flag in flags:
        if flag and mode:
            total += 1
    if mode == "fast":
        total += 2
    elif mode == "slow":
        total -= 1
    try:
        publish(total)
    except ValueError:
        report(total)
    return total
"#;

    let ts = analyze_in_temp("score.ts", ts_source);
    assert_eq!(ts.functions[0].complexity, 7);

    if !python_available() {
        eprintln!("skipping python half: python3 not found");
        return;
    }
    let py = analyze_in_temp("score.py", py_source);
    assert_eq!(py.functions[0].complexity, ts.functions[0].complexity);
}

// ============================================================================
// Manifest tagging
// ============================================================================

#[test]
fn test_manifest_entries_tagged_by_section() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("package.json"),
        r#"{
  "name": "fixture",
  "dependencies": { "express": "^4.18.0" },
  "devDependencies": { "jest": "^29.0.0" }
}"#,
    )
    .unwrap();
    let path = dir.path().join("server.js");
    fs::write(&path, "module.exports = {};").unwrap();

    let result = REGISTRY.analyze_file(&path).unwrap();
    assert_eq!(result.dependencies.len(), 2);

    let express = result.dependencies.iter().find(|d| d.name == "express").unwrap();
    assert!(!express.is_dev_dependency);
    let jest = result.dependencies.iter().find(|d| d.name == "jest").unwrap();
    assert!(jest.is_dev_dependency);
}

#[test]
fn test_python_manifest_resolved_for_python_files() {
    if !python_available() {
        eprintln!("skipping: python3 not found");
        return;
    }
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("requirements.txt"),
        "# pinned\nrequests>=2.31.0\nflask\n",
    )
    .unwrap();
    let path = dir.path().join("app.py");
    fs::write(&path, "def main():\n    pass\n").unwrap();

    let result = REGISTRY.analyze_file(&path).unwrap();
    assert_eq!(result.dependencies.len(), 2);
    assert!(result.dependencies.iter().all(|d| !d.is_dev_dependency));
}

// ============================================================================
// Cross-engine structural parity
// ============================================================================

#[test]
fn test_engines_agree_on_structural_shape() {
    if !python_available() {
        eprintln!("skipping: python3 not found");
        return;
    }

    let ts = analyze_in_temp(
        "service.ts",
        r#"
export class Service {
    limit: number = 5;

    handle(request) {
        if (request) {
            return request;
        }
        return null;
    }
}
"#,
    );
    let py = analyze_in_temp(
        "service.py",
        r#"
class Service:
    limit: int = 5

    def handle(self, request):
        if request:
            return request
        return None
"#,
    );

    let ts_class = &ts.classes[0];
    let py_class = &py.classes[0];

    assert_eq!(ts_class.name, py_class.name);
    assert_eq!(ts_class.methods.len(), py_class.methods.len());
    assert_eq!(ts_class.properties.len(), py_class.properties.len());
    assert_eq!(
        ts_class.methods[0].complexity,
        py_class.methods[0].complexity
    );
    assert_eq!(ts_class.properties[0].ty, py_class.properties[0].ty);
    // methods are never individually exported, in either language
    assert!(!ts_class.methods[0].is_exported);
    assert!(!py_class.methods[0].is_exported);
}
