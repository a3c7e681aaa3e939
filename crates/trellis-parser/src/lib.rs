//! # Trellis Parser
//!
//! The language front-end for Trellis diagrams: lexing, parsing,
//! structural validation, and elaboration into the
//! [`trellis_core::document`] model.
//!
//! ## Usage
//!
//! ```
//! # use trellis_parser::{parse, ParseOptions};
//! let source = r#"
//!     profile flowchart {
//!         node start: rounded [label: "Start"];
//!         node stop;
//!         start -> stop;
//!     }
//! "#;
//!
//! let document = parse(source, &ParseOptions::default()).unwrap();
//! assert_eq!(document.profiles.len(), 1);
//! ```

mod elaborate;
pub mod error;
mod lexer;
mod parser;
mod parser_types;
mod span;
mod tokens;
mod validate;

pub use error::{Diagnostic, DiagnosticCollector, ErrorCode, ParseError};
pub use span::{Span, Spanned};
pub use validate::ValidateOptions;

use log::{debug, info};
use trellis_core::document::Document;

/// Options for the front-end pipeline.
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// Structural validation limits.
    pub validate: ValidateOptions,
}

/// Parse source text into a validated document.
///
/// Orchestrates the front half of the pipeline:
///
/// 1. **Tokenize**: source text to positioned tokens, with error
///    recovery
/// 2. **Parse**: tokens to a spanned parse tree, recovering at
///    statement boundaries
/// 3. **Validate**: structural invariants (unique ids, resolved
///    references, containment forest, nesting depth)
/// 4. **Elaborate**: lower into the span-free document model
///
/// Each phase accumulates every diagnostic it can find before failing,
/// so one call reports all problems at once. On success the returned
/// [`Document`] satisfies the structural invariants the converter and
/// layout stages rely on.
pub fn parse(source: &str, options: &ParseOptions) -> Result<Document, ParseError> {
    info!(source_len = source.len(); "Parsing document");

    let tokens = lexer::tokenize(source)?;
    debug!(tokens = tokens.len(); "Tokenized");

    let ast = parser::parse_tokens(&tokens, source.len())?;
    debug!(profiles = ast.profiles.len(); "Parsed");

    validate::validate(&ast, &options.validate)?;
    debug!("Validated");

    let document = elaborate::Builder::new().build(&ast);
    debug!("Elaborated");

    Ok(document)
}

/// Re-validate an already elaborated document.
///
/// Used after template expansion, which can introduce new ids and
/// edges: duplicate-id and unresolved-reference checks run again over
/// the expanded document. Diagnostics carry ids instead of source
/// spans, since expanded entities have no single source location.
pub fn revalidate(document: &Document) -> Result<(), ParseError> {
    use std::collections::HashSet;

    use crate::error::{Diagnostic, DiagnosticCollector, ErrorCode};

    let mut collector = DiagnosticCollector::new();

    for profile in &document.profiles {
        let mut seen = HashSet::new();
        for node in &profile.nodes {
            if !seen.insert(node.id) {
                collector.emit(
                    Diagnostic::error(format!("`{}` is declared more than once", node.id))
                        .with_code(ErrorCode::E200),
                );
            }
        }
        for container in &profile.containers {
            if !seen.insert(container.id) {
                collector.emit(
                    Diagnostic::error(format!("`{}` is declared more than once", container.id))
                        .with_code(ErrorCode::E200),
                );
            }
        }

        for edge in &profile.edges {
            for endpoint in [&edge.source, &edge.target] {
                if !seen.contains(&endpoint.id) {
                    collector.emit(
                        Diagnostic::error(format!(
                            "edge endpoint names undeclared entity `{}`",
                            endpoint.id
                        ))
                        .with_code(ErrorCode::E201),
                    );
                }
            }
        }
        for container in &profile.containers {
            for child in &container.children {
                if !seen.contains(child) {
                    collector.emit(
                        Diagnostic::error(format!(
                            "container `{}` references undeclared child `{}`",
                            container.id, child
                        ))
                        .with_code(ErrorCode::E201),
                    );
                }
            }
        }
    }

    collector.finish()
}
