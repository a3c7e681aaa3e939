//! The data-resolver seam for template expansion.
//!
//! Template declarations bind to data sources. Inline sources carry
//! their records in the document; `load "path"` sources carry only a
//! [`SourceDescriptor`] which the embedder resolves through a
//! [`DataResolver`] *before* expansion runs. The core never suspends on
//! file or network reads.

use indexmap::IndexMap;

use crate::{identifier::Id, value::Record};

/// Descriptor for an externally loaded data source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDescriptor {
    /// Opaque locator (a path, URL, query; the core does not
    /// interpret it).
    pub locator: String,
}

impl SourceDescriptor {
    pub fn new(locator: impl Into<String>) -> Self {
        Self {
            locator: locator.into(),
        }
    }
}

/// Error returned by a resolver that cannot materialize a descriptor.
#[derive(Debug, thiserror::Error)]
#[error("cannot resolve data source `{locator}`: {reason}")]
pub struct ResolveError {
    pub locator: String,
    pub reason: String,
}

/// External loader for data-source descriptors.
///
/// Returns the ordered record sequence for a descriptor. Record order
/// is semantic: expansion synthesizes one node per record in this
/// order.
pub trait DataResolver {
    fn resolve(&self, descriptor: &SourceDescriptor) -> Result<Vec<Record>, ResolveError>;
}

/// Records for every external source of a document, keyed by source
/// name, materialized before expansion.
pub type ResolvedData = IndexMap<Id, Vec<Record>>;

/// A resolver over pre-registered in-memory record sets, keyed by
/// locator.
///
/// This is the batteries-included implementation for embedders that
/// already hold their data, and the one the test suites use.
#[derive(Debug, Default)]
pub struct MemoryResolver {
    sources: IndexMap<String, Vec<Record>>,
}

impl MemoryResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers records under a locator.
    pub fn insert(&mut self, locator: impl Into<String>, records: Vec<Record>) -> &mut Self {
        self.sources.insert(locator.into(), records);
        self
    }
}

impl DataResolver for MemoryResolver {
    fn resolve(&self, descriptor: &SourceDescriptor) -> Result<Vec<Record>, ResolveError> {
        self.sources
            .get(&descriptor.locator)
            .cloned()
            .ok_or_else(|| ResolveError {
                locator: descriptor.locator.clone(),
                reason: "no records registered".into(),
            })
    }
}
