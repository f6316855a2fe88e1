//! TypeScript/JavaScript engine.
//!
//! Parses with tree-sitter and walks the tree once, dispatching on node
//! kind. Collected entities: top-level functions and variable-bound
//! closures, classes with their methods and fields, and import statements.
//! Export detection covers ES export statements and CommonJS assignments
//! onto `module.exports` / `exports.*`.

use std::collections::HashSet;
use std::path::Path;

use tree_sitter::Node;

use crate::error::Result;
use crate::manifest::{self, NpmManifest};
use crate::model::{
    ClassInfo, CodeAnalysisResult, FunctionInfo, ImportInfo, ParameterInfo, PropertyInfo,
};

use super::{file_basename, Analyzer};

const LANGUAGE: &str = "typescript";

pub struct TypeScriptAnalyzer {
    manifest: NpmManifest,
}

impl TypeScriptAnalyzer {
    pub fn new() -> Self {
        Self {
            manifest: NpmManifest::new(),
        }
    }

    fn grammar_for(path: &Path) -> tree_sitter::Language {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        if matches!(ext, "tsx" | "jsx") {
            tree_sitter_typescript::LANGUAGE_TSX.into()
        } else {
            tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into()
        }
    }

    fn analyze_source(&self, source: &str, path: &Path) -> CodeAnalysisResult {
        let file_name = file_basename(path);

        let mut parser = tree_sitter::Parser::new();
        if parser.set_language(&Self::grammar_for(path)).is_err() {
            return CodeAnalysisResult::parse_failure(file_name, LANGUAGE, "grammar unavailable");
        }
        let Some(tree) = parser.parse(source, None) else {
            return CodeAnalysisResult::parse_failure(
                file_name,
                LANGUAGE,
                "parser produced no tree",
            );
        };

        let root = tree.root_node();
        if root.has_error() {
            let line = first_error_line(root);
            return CodeAnalysisResult::parse_failure(
                file_name,
                LANGUAGE,
                format!("syntax error near line {}", line),
            );
        }

        let mut walk = ModuleWalk::new(source.as_bytes());
        walk.run(root);

        let mut result = CodeAnalysisResult::new(file_name, LANGUAGE);
        (result.functions, result.classes, result.imports) = walk.finish();
        result.dependencies = manifest::resolve_dependencies(path, &self.manifest);
        result
    }
}

impl Default for TypeScriptAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl Analyzer for TypeScriptAnalyzer {
    fn language(&self) -> &'static str {
        LANGUAGE
    }

    fn supported_extensions(&self) -> &[&'static str] {
        &["ts", "tsx", "js", "jsx"]
    }

    fn analyze_file(&self, path: &Path) -> Result<CodeAnalysisResult> {
        let source = std::fs::read_to_string(path)?;
        Ok(self.analyze_source(&source, path))
    }
}

/// Single-pass collector over a module's top-level statements.
struct ModuleWalk<'a> {
    source: &'a [u8],
    functions: Vec<FunctionInfo>,
    classes: Vec<ClassInfo>,
    imports: Vec<ImportInfo>,
    /// Names exported by clause (`export { a }`) or CommonJS assignment;
    /// applied to the collected entities once the walk is done.
    exported_names: HashSet<String>,
}

impl<'a> ModuleWalk<'a> {
    fn new(source: &'a [u8]) -> Self {
        Self {
            source,
            functions: Vec::new(),
            classes: Vec::new(),
            imports: Vec::new(),
            exported_names: HashSet::new(),
        }
    }

    fn text(&self, node: Node) -> &str {
        node.utf8_text(self.source).unwrap_or("")
    }

    fn run(&mut self, root: Node) {
        let mut cursor = root.walk();
        for statement in root.named_children(&mut cursor) {
            match statement.kind() {
                "function_declaration" | "generator_function_declaration" => {
                    let function = self.function_info(statement, false);
                    self.functions.push(function);
                }
                "lexical_declaration" | "variable_declaration" => {
                    self.collect_declarators(statement, false);
                }
                "class_declaration" => {
                    let class = self.class_info(statement, false);
                    self.classes.push(class);
                }
                "import_statement" => self.collect_import(statement),
                "export_statement" => self.collect_export(statement),
                "expression_statement" => self.note_commonjs_export(statement),
                _ => {}
            }
        }
    }

    fn finish(mut self) -> (Vec<FunctionInfo>, Vec<ClassInfo>, Vec<ImportInfo>) {
        let exported = std::mem::take(&mut self.exported_names);
        for function in &mut self.functions {
            if exported.contains(&function.name) {
                function.is_exported = true;
            }
        }
        for class in &mut self.classes {
            if exported.contains(&class.name) {
                class.is_exported = true;
            }
        }
        (self.functions, self.classes, self.imports)
    }

    fn collect_export(&mut self, node: Node) {
        if let Some(decl) = node.child_by_field_name("declaration") {
            match decl.kind() {
                "function_declaration" | "generator_function_declaration" => {
                    let function = self.function_info(decl, true);
                    self.functions.push(function);
                }
                "class_declaration" => {
                    let class = self.class_info(decl, true);
                    self.classes.push(class);
                }
                "lexical_declaration" | "variable_declaration" => {
                    self.collect_declarators(decl, true);
                }
                _ => {}
            }
            return;
        }

        // export default <expression>
        if let Some(value) = node.child_by_field_name("value") {
            match value.kind() {
                "arrow_function" | "function_expression" | "function" => {
                    let function = self.build_function("anonymous".to_string(), value, node, true);
                    self.functions.push(function);
                }
                "identifier" => {
                    self.exported_names.insert(self.text(value).to_string());
                }
                _ => {}
            }
            return;
        }

        // export { a, b as c }
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            if child.kind() != "export_clause" {
                continue;
            }
            let mut specs = child.walk();
            for spec in child.named_children(&mut specs) {
                if spec.kind() == "export_specifier" {
                    if let Some(local) = spec.child_by_field_name("name") {
                        self.exported_names.insert(self.text(local).to_string());
                    }
                }
            }
        }
    }

    /// `module.exports = name`, `exports.x = name`, and the shorthand-object
    /// form `module.exports = { a, b }` all export the named binding.
    fn note_commonjs_export(&mut self, statement: Node) {
        let Some(expr) = statement.named_child(0) else {
            return;
        };
        if expr.kind() != "assignment_expression" {
            return;
        }
        let (Some(left), Some(right)) = (
            expr.child_by_field_name("left"),
            expr.child_by_field_name("right"),
        ) else {
            return;
        };

        let target = self.text(left);
        if target != "module.exports"
            && !target.starts_with("module.exports.")
            && !target.starts_with("exports.")
        {
            return;
        }

        match right.kind() {
            "identifier" => {
                self.exported_names.insert(self.text(right).to_string());
            }
            "object" => {
                let mut cursor = right.walk();
                for entry in right.named_children(&mut cursor) {
                    match entry.kind() {
                        "shorthand_property_identifier" => {
                            self.exported_names.insert(self.text(entry).to_string());
                        }
                        "pair" => {
                            if let Some(value) = entry.child_by_field_name("value") {
                                if value.kind() == "identifier" {
                                    self.exported_names.insert(self.text(value).to_string());
                                }
                            }
                        }
                        _ => {}
                    }
                }
            }
            _ => {}
        }
    }

    /// Collects closures that are variable-declarator initializers. Closures
    /// used purely as arguments are not top-level entities (they still count
    /// toward the enclosing function's complexity).
    fn collect_declarators(&mut self, declaration: Node, exported: bool) {
        let mut cursor = declaration.walk();
        for declarator in declaration.named_children(&mut cursor) {
            if declarator.kind() != "variable_declarator" {
                continue;
            }
            let (Some(name_node), Some(value)) = (
                declarator.child_by_field_name("name"),
                declarator.child_by_field_name("value"),
            ) else {
                continue;
            };
            if !matches!(
                value.kind(),
                "arrow_function" | "function_expression" | "function"
            ) {
                continue;
            }
            let name = self.text(name_node).to_string();
            let function = self.build_function(name, value, declarator, exported);
            self.functions.push(function);
        }
    }

    fn function_info(&self, node: Node, exported: bool) -> FunctionInfo {
        let name = node
            .child_by_field_name("name")
            .map(|n| self.text(n).to_string())
            .unwrap_or_else(|| "anonymous".to_string());
        self.build_function(name, node, node, exported)
    }

    /// `span` delimits the reported lines; for bound closures that is the
    /// declarator rather than the closure node.
    fn build_function(&self, name: String, func: Node, span: Node, exported: bool) -> FunctionInfo {
        let params = func
            .child_by_field_name("parameters")
            .map(|p| self.parameters(p))
            .or_else(|| {
                // single-identifier arrow parameter, no parentheses
                func.child_by_field_name("parameter").map(|p| {
                    vec![ParameterInfo {
                        name: self.text(p).to_string(),
                        ty: None,
                        default_value: None,
                        is_required: true,
                    }]
                })
            })
            .unwrap_or_default();

        let return_type = func
            .child_by_field_name("return_type")
            .and_then(|t| self.canonical_type(t));
        let body = func.child_by_field_name("body");
        let docstring = body.and_then(|b| self.doc_comment(b));
        let complexity = body.map_or(1, |b| 1 + self.decision_points(b));

        FunctionInfo {
            name,
            params,
            return_type,
            docstring,
            complexity,
            start_line: span.start_position().row as u32 + 1,
            end_line: span.end_position().row as u32 + 1,
            is_async: has_keyword(func, "async"),
            is_exported: exported,
        }
    }

    fn class_info(&self, node: Node, exported: bool) -> ClassInfo {
        let name = node
            .child_by_field_name("name")
            .map(|n| self.text(n).to_string())
            .unwrap_or_else(|| "anonymous".to_string());

        let mut super_classes = Vec::new();
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            if child.kind() == "class_heritage" {
                self.collect_heritage(child, &mut super_classes);
            }
        }

        let body = node.child_by_field_name("body");
        let mut methods = Vec::new();
        let mut properties = Vec::new();
        if let Some(body) = body {
            let mut members = body.walk();
            for member in body.named_children(&mut members) {
                match member.kind() {
                    // methods are never individually exported
                    "method_definition" => methods.push(self.function_info(member, false)),
                    "public_field_definition" | "field_definition" => {
                        properties.push(self.property_info(member));
                    }
                    _ => {}
                }
            }
        }

        ClassInfo {
            name,
            methods,
            properties,
            super_classes,
            docstring: body.and_then(|b| self.doc_comment(b)),
            start_line: node.start_position().row as u32 + 1,
            end_line: node.end_position().row as u32 + 1,
            is_exported: exported,
        }
    }

    fn collect_heritage(&self, heritage: Node, out: &mut Vec<String>) {
        let mut cursor = heritage.walk();
        for clause in heritage.named_children(&mut cursor) {
            match clause.kind() {
                "extends_clause" | "implements_clause" => {
                    let mut inner = clause.walk();
                    for ty in clause.named_children(&mut inner) {
                        match ty.kind() {
                            "identifier" | "type_identifier" | "member_expression"
                            | "nested_type_identifier" => out.push(self.text(ty).to_string()),
                            "generic_type" => {
                                if let Some(name) = ty.child_by_field_name("name") {
                                    out.push(self.text(name).to_string());
                                }
                            }
                            _ => {}
                        }
                    }
                }
                // plain JS grammar puts the expression directly under class_heritage
                "identifier" | "member_expression" => out.push(self.text(clause).to_string()),
                _ => {}
            }
        }
    }

    fn property_info(&self, node: Node) -> PropertyInfo {
        let name = node
            .child_by_field_name("name")
            .or_else(|| node.child_by_field_name("property"))
            .map(|n| self.text(n).to_string())
            .unwrap_or_default();
        let ty = node
            .child_by_field_name("type")
            .and_then(|t| self.canonical_type(t));
        let default_value = node
            .child_by_field_name("value")
            .map(|v| self.text(v).to_string());
        let is_private =
            name.starts_with('#') || name.starts_with('_') || self.has_private_modifier(node);

        PropertyInfo {
            name,
            ty,
            default_value,
            is_private,
        }
    }

    fn has_private_modifier(&self, node: Node) -> bool {
        let mut cursor = node.walk();
        let result = node
            .children(&mut cursor)
            .any(|c| c.kind() == "accessibility_modifier" && self.text(c) == "private");
        result
    }

    fn parameters(&self, params: Node) -> Vec<ParameterInfo> {
        let mut out = Vec::new();
        let mut cursor = params.walk();
        for param in params.named_children(&mut cursor) {
            match param.kind() {
                "required_parameter" | "optional_parameter" => {
                    let Some(pattern) = param.child_by_field_name("pattern") else {
                        continue;
                    };
                    if pattern.kind() == "this" {
                        continue;
                    }
                    let ty = param
                        .child_by_field_name("type")
                        .and_then(|t| self.canonical_type(t));
                    let default_value = param
                        .child_by_field_name("value")
                        .map(|v| self.text(v).to_string());
                    out.push(ParameterInfo {
                        name: self.pattern_name(pattern),
                        ty,
                        is_required: default_value.is_none(),
                        default_value,
                    });
                }
                // plain JS parameter shapes
                "identifier" => out.push(ParameterInfo {
                    name: self.text(param).to_string(),
                    ty: None,
                    default_value: None,
                    is_required: true,
                }),
                "assignment_pattern" => {
                    let name = param
                        .child_by_field_name("left")
                        .map(|l| self.pattern_name(l))
                        .unwrap_or_default();
                    let default_value = param
                        .child_by_field_name("right")
                        .map(|r| self.text(r).to_string());
                    out.push(ParameterInfo {
                        name,
                        ty: None,
                        is_required: default_value.is_none(),
                        default_value,
                    });
                }
                "rest_pattern" | "object_pattern" | "array_pattern" => out.push(ParameterInfo {
                    name: self.pattern_name(param),
                    ty: None,
                    default_value: None,
                    is_required: true,
                }),
                _ => {}
            }
        }
        out
    }

    /// Display name for a binding pattern: identifiers verbatim, destructured
    /// patterns as "{a, b}" / "[a, b]", rest parameters as "...name".
    fn pattern_name(&self, pattern: Node) -> String {
        match pattern.kind() {
            "identifier"
            | "shorthand_property_identifier"
            | "shorthand_property_identifier_pattern"
            | "property_identifier" => self.text(pattern).to_string(),
            "rest_pattern" => {
                let inner = pattern
                    .named_child(0)
                    .map(|n| self.pattern_name(n))
                    .unwrap_or_default();
                format!("...{}", inner)
            }
            "object_pattern" => {
                let mut names = Vec::new();
                let mut cursor = pattern.walk();
                for entry in pattern.named_children(&mut cursor) {
                    match entry.kind() {
                        "shorthand_property_identifier"
                        | "shorthand_property_identifier_pattern" => {
                            names.push(self.text(entry).to_string());
                        }
                        "pair_pattern" => {
                            if let Some(key) = entry.child_by_field_name("key") {
                                names.push(self.text(key).to_string());
                            }
                        }
                        "object_assignment_pattern" => {
                            if let Some(left) = entry.child_by_field_name("left") {
                                names.push(self.pattern_name(left));
                            }
                        }
                        "rest_pattern" => names.push(self.pattern_name(entry)),
                        _ => {}
                    }
                }
                format!("{{{}}}", names.join(", "))
            }
            "array_pattern" => {
                let mut names = Vec::new();
                let mut cursor = pattern.walk();
                for entry in pattern.named_children(&mut cursor) {
                    match entry.kind() {
                        "identifier" => names.push(self.text(entry).to_string()),
                        "assignment_pattern" => {
                            if let Some(left) = entry.child_by_field_name("left") {
                                names.push(self.pattern_name(left));
                            }
                        }
                        "object_pattern" | "array_pattern" | "rest_pattern" => {
                            names.push(self.pattern_name(entry));
                        }
                        _ => {}
                    }
                }
                format!("[{}]", names.join(", "))
            }
            _ => self.text(pattern).to_string(),
        }
    }

    fn collect_import(&mut self, node: Node) {
        let Some(source_node) = node.child_by_field_name("source") else {
            return;
        };
        let path = self
            .text(source_node)
            .trim_matches(|c| c == '"' || c == '\'' || c == '`')
            .to_string();

        let mut default_name = None;
        let mut namespace_name = None;
        let mut named = Vec::new();

        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            if child.kind() != "import_clause" {
                continue;
            }
            let mut bindings = child.walk();
            for binding in child.named_children(&mut bindings) {
                match binding.kind() {
                    "identifier" => default_name = Some(self.text(binding).to_string()),
                    "namespace_import" => {
                        let mut inner = binding.walk();
                        let id = binding
                            .named_children(&mut inner)
                            .find(|n| n.kind() == "identifier");
                        if let Some(id) = id {
                            namespace_name = Some(self.text(id).to_string());
                        }
                    }
                    "named_imports" => {
                        let mut specs = binding.walk();
                        for spec in binding.named_children(&mut specs) {
                            if spec.kind() != "import_specifier" {
                                continue;
                            }
                            let local = spec
                                .child_by_field_name("alias")
                                .or_else(|| spec.child_by_field_name("name"));
                            if let Some(local) = local {
                                named.push(self.text(local).to_string());
                            }
                        }
                    }
                    _ => {}
                }
            }
        }

        let is_default = default_name.is_some();
        let is_namespace = namespace_name.is_some();
        let name = default_name
            .or(namespace_name)
            .or_else(|| named.first().cloned())
            .unwrap_or_else(|| path.clone());

        self.imports.push(ImportInfo {
            name,
            path,
            is_default,
            is_namespace,
            named_imports: (!named.is_empty()).then_some(named),
        });
    }

    /// Leading block comment of a function/class body, delimiters stripped.
    fn doc_comment(&self, body: Node) -> Option<String> {
        let first = body.named_child(0)?;
        if first.kind() != "comment" {
            return None;
        }
        let raw = self.text(first);
        if !raw.starts_with("/*") {
            return None;
        }
        strip_block_comment(raw)
    }

    /// Decision points under `node` per the shared counting rule: +1 per
    /// conditional, loop, case clause, and exception handler; +1 per
    /// short-circuit operator beyond a chain's first operand. Nested
    /// closures count toward the enclosing body.
    fn decision_points(&self, node: Node) -> u32 {
        let mut count = match node.kind() {
            "if_statement" | "ternary_expression" | "for_statement" | "for_in_statement"
            | "while_statement" | "do_statement" | "switch_case" | "catch_clause" => 1,
            "binary_expression" => node.child_by_field_name("operator").map_or(0, |op| {
                matches!(self.text(op), "&&" | "||") as u32
            }),
            _ => 0,
        };

        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            count += self.decision_points(child);
        }
        count
    }

    /// Canonical type string for an annotation node. The vocabulary is
    /// shared with the Python engine: primitives, `T[]`, reference names,
    /// unions, intersections, `unknown` for anything else.
    fn canonical_type(&self, node: Node) -> Option<String> {
        let ty = if node.kind() == "type_annotation" {
            node.named_child(0)?
        } else {
            node
        };
        Some(self.canonicalize(ty))
    }

    fn canonicalize(&self, ty: Node) -> String {
        match ty.kind() {
            "predefined_type" => match self.text(ty) {
                t @ ("string" | "number" | "boolean" | "any" | "void" | "unknown") => t.to_string(),
                _ => "unknown".to_string(),
            },
            "type_identifier" | "nested_type_identifier" => self.text(ty).to_string(),
            "array_type" => {
                let element = ty
                    .named_child(0)
                    .map(|e| self.canonicalize(e))
                    .unwrap_or_else(|| "unknown".to_string());
                format!("{}[]", element)
            }
            "union_type" => {
                let mut cursor = ty.walk();
                ty.named_children(&mut cursor)
                    .map(|part| self.canonicalize(part))
                    .collect::<Vec<_>>()
                    .join(" | ")
            }
            "intersection_type" => {
                let mut cursor = ty.walk();
                ty.named_children(&mut cursor)
                    .map(|part| self.canonicalize(part))
                    .collect::<Vec<_>>()
                    .join(" & ")
            }
            "parenthesized_type" => ty
                .named_child(0)
                .map(|inner| self.canonicalize(inner))
                .unwrap_or_else(|| "unknown".to_string()),
            "generic_type" => ty
                .child_by_field_name("name")
                .map(|n| self.text(n).to_string())
                .unwrap_or_else(|| "unknown".to_string()),
            _ => "unknown".to_string(),
        }
    }
}

fn has_keyword(node: Node, keyword: &str) -> bool {
    let mut cursor = node.walk();
    let result = node.children(&mut cursor).any(|c| c.kind() == keyword);
    result
}

fn first_error_line(node: Node) -> u32 {
    if node.is_error() || node.is_missing() {
        return node.start_position().row as u32 + 1;
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.has_error() || child.is_missing() {
            return first_error_line(child);
        }
    }
    node.start_position().row as u32 + 1
}

fn strip_block_comment(raw: &str) -> Option<String> {
    let inner = raw
        .strip_prefix("/**")
        .or_else(|| raw.strip_prefix("/*"))?;
    let inner = inner.strip_suffix("*/").unwrap_or(inner);
    let cleaned = inner
        .lines()
        .map(|line| line.trim().trim_start_matches('*').trim())
        .collect::<Vec<_>>()
        .join("\n");
    let cleaned = cleaned.trim().to_string();
    (!cleaned.is_empty()).then_some(cleaned)
}
