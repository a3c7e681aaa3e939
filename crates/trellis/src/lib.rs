//! Trellis is a diagram language compiler.
//!
//! Trellis compiles a textual diagram-description language into a
//! positioned, renderable model across several diagram kinds
//! (flowcharts, schematics, digital logic, P&ID, sequence, timeline,
//! wardley, railroad). The pipeline runs: parse → validate → expand
//! templates → convert per profile → lay out. Rendering the positioned
//! model is left to external consumers; the only geometry the core
//! needs from the outside comes through the
//! [`ShapeCatalog`](trellis_core::catalog::ShapeCatalog) seam, and the
//! only data through [`DataResolver`](trellis_core::data::DataResolver).
//!
//! # Example
//!
//! ```
//! use trellis::{Compiler, config::CompileOptions};
//! use trellis_core::{catalog::BasicCatalog, data::MemoryResolver};
//!
//! let source = r#"
//!     profile flowchart {
//!         node start: rounded [label: "Start"];
//!         node stop;
//!         start -> stop;
//!     }
//! "#;
//!
//! let compiler = Compiler::new(CompileOptions::default());
//! let output = compiler
//!     .compile(source, &MemoryResolver::new(), &BasicCatalog::new())
//!     .unwrap();
//! assert_eq!(output.profiles.len(), 1);
//! ```

pub mod config;
pub mod convert;
pub mod expand;
pub mod layout;

mod error;

pub use error::TrellisError;
pub use expand::DocumentData;

pub use trellis_core::{catalog, data, geometry, identifier, positioned, value};

use log::{debug, info};

use trellis_core::{
    catalog::ShapeCatalog,
    data::DataResolver,
    document::{Document, ProfileKind},
    positioned::PositionedProfile,
};

use convert::DomainModel;

/// One compiled profile: its domain semantics plus final geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledProfile {
    pub domain: DomainModel,
    pub layout: PositionedProfile,
}

/// A profile that failed conversion or layout. Sibling profiles in the
/// same document still compile.
#[derive(Debug)]
pub struct ProfileFailure {
    /// Index of the profile within the document.
    pub index: usize,
    pub kind: ProfileKind,
    pub error: TrellisError,
}

/// The pipeline's output: per-profile results plus contained
/// per-profile failures.
#[derive(Debug, Default)]
pub struct PositionedDocument {
    pub profiles: Vec<CompiledProfile>,
    pub failures: Vec<ProfileFailure>,
}

/// The Trellis pipeline facade.
///
/// Stages can be driven individually (`parse`, `resolve_data`,
/// `expand`, `layout_document`) or end to end with [`Compiler::compile`].
#[derive(Debug, Default)]
pub struct Compiler {
    options: config::CompileOptions,
}

impl Compiler {
    pub fn new(options: config::CompileOptions) -> Self {
        Self { options }
    }

    /// Parse and structurally validate source text.
    pub fn parse(&self, source: &str) -> Result<Document, TrellisError> {
        trellis_parser::parse(source, &self.options.parse_options())
            .map_err(TrellisError::from_front_end)
    }

    /// Materialize every data source of a document through the
    /// embedder's resolver.
    pub fn resolve_data(
        &self,
        document: &Document,
        resolver: &dyn DataResolver,
    ) -> Result<DocumentData, TrellisError> {
        expand::resolve_data(document, resolver)
    }

    /// Expand templates against materialized data and re-validate the
    /// result.
    pub fn expand(
        &self,
        document: &Document,
        data: &DocumentData,
    ) -> Result<Document, TrellisError> {
        let expanded = expand::expand(document, data).map_err(TrellisError::Expansion)?;
        trellis_parser::revalidate(&expanded).map_err(TrellisError::Structural)?;
        Ok(expanded)
    }

    /// Convert and lay out every profile of an expanded document.
    ///
    /// Domain and layout errors block only their own profile; the
    /// remaining profiles still produce geometry.
    pub fn layout_document(
        &self,
        document: &Document,
        catalog: &dyn ShapeCatalog,
    ) -> PositionedDocument {
        let engine = layout::Engine::new(catalog, &self.options.layout);
        let mut output = PositionedDocument::default();

        for (index, profile) in document.profiles.iter().enumerate() {
            let domain = match convert::convert(profile) {
                Ok(domain) => domain,
                Err(err) => {
                    output.failures.push(ProfileFailure {
                        index,
                        kind: profile.kind,
                        error: TrellisError::Domain(err),
                    });
                    continue;
                }
            };

            match engine.layout(&domain, profile.title.as_deref()) {
                Ok(layout) => {
                    debug!(
                        index = index,
                        kind = profile.kind.as_str(),
                        nodes = layout.nodes.len(),
                        edges = layout.edges.len();
                        "Profile laid out",
                    );
                    output.profiles.push(CompiledProfile { domain, layout });
                }
                Err(err) => {
                    output.failures.push(ProfileFailure {
                        index,
                        kind: profile.kind,
                        error: TrellisError::Layout(err),
                    });
                }
            }
        }

        output
    }

    /// Run the whole pipeline on one source text.
    pub fn compile(
        &self,
        source: &str,
        resolver: &dyn DataResolver,
        catalog: &dyn ShapeCatalog,
    ) -> Result<PositionedDocument, TrellisError> {
        info!("Compiling document");

        let document = self.parse(source)?;
        debug!(profiles = document.profiles.len(); "Parsed and validated");

        let data = self.resolve_data(&document, resolver)?;
        let expanded = self.expand(&document, &data)?;
        debug!("Templates expanded");

        let output = self.layout_document(&expanded, catalog);
        info!(
            compiled = output.profiles.len(),
            failed = output.failures.len();
            "Document compiled",
        );
        Ok(output)
    }
}

/// Convenience re-export of the document model.
pub mod document {
    pub use trellis_core::document::*;
}
