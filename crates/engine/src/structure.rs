//! Structure probes: a rough count of declarations in submitted code.
//!
//! Rust is parsed with tree-sitter. Other languages get naive line
//! matching. Reports are only logged; they never feed the review and a
//! failing probe never fails a check.

use tracing::{debug, info, warn};
use tree_sitter::{Node, Parser};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructureReport {
    pub functions: usize,
    /// Classes, structs, enums, traits.
    pub types: usize,
    /// Declared function names, when the probe can see them.
    pub function_names: Vec<String>,
    /// `let` bindings, when the probe can see them.
    pub variable_names: Vec<String>,
    pub syntax_errors: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("Parser setup failed: {0}")]
    Setup(String),

    #[error("Source could not be parsed")]
    Unparseable,
}

pub trait StructureProbe: Send + Sync {
    fn language(&self) -> &str;

    fn probe(&self, code: &str) -> Result<StructureReport, ProbeError>;
}

/// The probe for a (case-folded) language name, if there is one.
pub fn probe_for(language: &str) -> Option<Box<dyn StructureProbe>> {
    let dialect = match language {
        "rust" => return Some(Box::new(RustSyntaxProbe)),
        "python" => Dialect::Python,
        "javascript" | "typescript" => Dialect::JavaScript,
        "c" | "cpp" => Dialect::CFamily,
        "go" => Dialect::Go,
        "java" => Dialect::Java,
        _ => return None,
    };
    Some(Box::new(LineHeuristicProbe::new(language, dialect)))
}

/// Probe `code` and log what was found.
pub fn log_structure(language: &str, code: &str) {
    let Some(probe) = probe_for(language) else {
        debug!(language, "No structure probe for language");
        return;
    };
    match probe.probe(code) {
        Ok(report) => info!(
            language = probe.language(),
            functions = report.functions,
            types = report.types,
            names = ?report.function_names,
            variables = ?report.variable_names,
            syntax_errors = report.syntax_errors,
            "Structure probe"
        ),
        Err(e) => warn!(language = probe.language(), error = %e, "Structure probe failed"),
    }
}

/// Full syntax tree walk for Rust.
pub struct RustSyntaxProbe;

impl StructureProbe for RustSyntaxProbe {
    fn language(&self) -> &str {
        "rust"
    }

    fn probe(&self, code: &str) -> Result<StructureReport, ProbeError> {
        let mut parser = Parser::new();
        parser
            .set_language(tree_sitter_rust::language())
            .map_err(|e| ProbeError::Setup(e.to_string()))?;
        let tree = parser.parse(code, None).ok_or(ProbeError::Unparseable)?;

        let root = tree.root_node();
        let mut report = StructureReport {
            syntax_errors: root.has_error(),
            ..StructureReport::default()
        };
        visit(root, code.as_bytes(), &mut report);
        report.functions = report.function_names.len();
        Ok(report)
    }
}

fn visit(node: Node, source: &[u8], report: &mut StructureReport) {
    match node.kind() {
        "function_item" | "function_signature_item" => {
            if let Some(name) = field_text(node, "name", source) {
                report.function_names.push(name);
            }
        }
        "let_declaration" => {
            if let Some(pattern) = field_text(node, "pattern", source) {
                report.variable_names.push(pattern);
            }
        }
        "struct_item" | "enum_item" | "trait_item" | "union_item" => report.types += 1,
        _ => {}
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        visit(child, source, report);
    }
}

fn field_text(node: Node, field: &str, source: &[u8]) -> Option<String> {
    node.child_by_field_name(field)?
        .utf8_text(source)
        .ok()
        .map(str::to_string)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dialect {
    Python,
    JavaScript,
    CFamily,
    Go,
    Java,
}

/// Counts functions and types by looking at one line at a time.
pub struct LineHeuristicProbe {
    language: String,
    dialect: Dialect,
}

impl LineHeuristicProbe {
    fn new(language: &str, dialect: Dialect) -> Self {
        Self {
            language: language.to_string(),
            dialect,
        }
    }

    fn is_function(&self, line: &str) -> bool {
        let trimmed = line.trim_start();
        match self.dialect {
            Dialect::Python => trimmed.starts_with("def ") || trimmed.starts_with("async def "),
            Dialect::JavaScript => trimmed.starts_with("function ") || line.contains("=>"),
            Dialect::CFamily | Dialect::Java => {
                line.contains('(')
                    && line.contains(')')
                    && line.contains('{')
                    && !["if", "for", "while", "switch", "catch", "else"]
                        .iter()
                        .any(|kw| trimmed.starts_with(kw))
            }
            Dialect::Go => trimmed.starts_with("func "),
        }
    }

    fn is_type(&self, line: &str) -> bool {
        let trimmed = line.trim_start();
        match self.dialect {
            Dialect::Go => trimmed.starts_with("type ") && line.contains("struct"),
            Dialect::CFamily => trimmed.starts_with("class ") || trimmed.starts_with("struct "),
            Dialect::Java => ["class ", "interface ", "enum ", "record "]
                .iter()
                .any(|kw| trimmed.starts_with(kw) || line.contains(&format!(" {kw}"))),
            Dialect::Python | Dialect::JavaScript => trimmed.starts_with("class "),
        }
    }
}

impl StructureProbe for LineHeuristicProbe {
    fn language(&self) -> &str {
        &self.language
    }

    fn probe(&self, code: &str) -> Result<StructureReport, ProbeError> {
        let mut report = StructureReport::default();
        for line in code.lines() {
            if self.is_function(line) {
                report.functions += 1;
            }
            if self.is_type(line) {
                report.types += 1;
            }
        }
        Ok(report)
    }
}
