//! Template expansion.
//!
//! Each [`Template`](trellis_core::document::Template) bound to a data
//! source is replaced by one synthesized node (and any declared edges)
//! per record, with `${path}` placeholders substituted from the record.
//! Placeholders are restricted to dotted-path field access; there is no
//! computation. Record order is preserved, and an id produced by
//! substitution must be globally fresh: a collision with a static or
//! previously expanded id is a hard error, never a silent overwrite.
//!
//! Data for `load` sources is materialized by the caller (through
//! [`DataResolver`]) before expansion runs; inline sources carry their
//! records in the document. Expansion output is re-validated before
//! conversion.

use std::collections::HashSet;

use log::debug;

use trellis_core::{
    data::{DataResolver, ResolvedData},
    document::{DataOrigin, Document, EdgeAst, Endpoint, NodeAst, Profile, Template},
    identifier::Id,
    value::{Record, Value, ValueMap},
};
use trellis_parser::{Diagnostic, DiagnosticCollector, ErrorCode, ParseError};

use crate::error::TrellisError;

/// Materialized records for every profile of a document, in profile
/// order.
pub type DocumentData = Vec<ResolvedData>;

/// Materialize every data source of a document.
///
/// Inline sources are taken from the document itself; `load`
/// descriptors go through the resolver. This is the only point where
/// the embedder's I/O runs; expansion itself never suspends.
pub fn resolve_data(
    document: &Document,
    resolver: &dyn DataResolver,
) -> Result<DocumentData, TrellisError> {
    let mut data = DocumentData::new();
    for profile in &document.profiles {
        let mut resolved = ResolvedData::new();
        for source in &profile.sources {
            let records = match &source.origin {
                DataOrigin::Inline(records) => records.clone(),
                DataOrigin::External(descriptor) => resolver.resolve(descriptor)?,
            };
            resolved.insert(source.name, records);
        }
        data.push(resolved);
    }
    Ok(data)
}

/// Expand every template of a document against materialized data.
///
/// Returns a new document with templates consumed; the input document
/// is not mutated. All expansion problems (unknown sources, missing
/// fields, id collisions) are accumulated before failing.
pub fn expand(document: &Document, data: &DocumentData) -> Result<Document, ParseError> {
    let mut collector = DiagnosticCollector::new();
    let empty = ResolvedData::new();

    let profiles = document
        .profiles
        .iter()
        .enumerate()
        .map(|(index, profile)| {
            let resolved = data.get(index).unwrap_or(&empty);
            expand_profile(profile, resolved, &mut collector)
        })
        .collect();

    collector.finish_with(Document { profiles })
}

fn expand_profile(
    profile: &Profile,
    data: &ResolvedData,
    collector: &mut DiagnosticCollector,
) -> Profile {
    let mut expanded = profile.clone();
    expanded.templates.clear();

    // Ids already taken by static declarations.
    let mut taken: HashSet<Id> = profile.nodes.iter().map(|n| n.id).collect();
    taken.extend(profile.containers.iter().map(|c| c.id));

    for template in &profile.templates {
        let Some(records) = data.get(&template.source) else {
            collector.emit(
                Diagnostic::error(format!(
                    "template `{}` is bound to unknown data source `{}`",
                    template.name, template.source
                ))
                .with_code(ErrorCode::E302)
                .with_help("declare the source or register records for it"),
            );
            continue;
        };

        expand_template(template, records, &mut taken, &mut expanded, collector);
    }

    expanded
}

fn expand_template(
    template: &Template,
    records: &[Record],
    taken: &mut HashSet<Id>,
    expanded: &mut Profile,
    collector: &mut DiagnosticCollector,
) {
    debug!(
        template = template.name.to_string(),
        records = records.len();
        "Expanding template",
    );

    for record in records {
        for node_rule in &template.nodes {
            let Some(id_text) = substitute(&node_rule.id, record, template, collector) else {
                continue;
            };
            let id = Id::new(&id_text);

            if !taken.insert(id) {
                collector.emit(
                    Diagnostic::error(format!(
                        "template `{}` expanded id `{id_text}` which already exists",
                        template.name
                    ))
                    .with_code(ErrorCode::E300)
                    .with_help("make the id pattern unique per record"),
                );
                continue;
            }

            let mut node = NodeAst::new(id);
            node.shape = node_rule.shape;
            node.style = node_rule.style;
            node.label = match &node_rule.label {
                Some(label) => substitute(label, record, template, collector),
                None => None,
            };
            node.data = substitute_map(&node_rule.data, record, template, collector);
            expanded.nodes.push(node);
        }

        for edge_rule in &template.edges {
            let source = substitute(&edge_rule.source, record, template, collector);
            let target = substitute(&edge_rule.target, record, template, collector);
            let (Some(source), Some(target)) = (source, target) else {
                continue;
            };

            let mut edge = EdgeAst::new(
                Endpoint {
                    id: Id::new(&source),
                    port: edge_rule.source_port,
                },
                Endpoint {
                    id: Id::new(&target),
                    port: edge_rule.target_port,
                },
            );
            edge.kind = edge_rule.kind;
            edge.style = edge_rule.style;
            edge.route = edge_rule.route;
            edge.label = match &edge_rule.label {
                Some(label) => substitute(label, record, template, collector),
                None => None,
            };
            expanded.edges.push(edge);
        }
    }
}

/// Substitute every `${path}` placeholder in `input` from `record`,
/// left to right. Paths are dotted field access only.
///
/// Returns `None` (with diagnostics emitted) when a placeholder is
/// malformed or names a missing field.
fn substitute(
    input: &str,
    record: &Record,
    template: &Template,
    collector: &mut DiagnosticCollector,
) -> Option<String> {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    let mut ok = true;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];

        let Some(end) = after.find('}') else {
            collector.emit(
                Diagnostic::error(format!(
                    "template `{}`: unterminated placeholder in `{input}`",
                    template.name
                ))
                .with_code(ErrorCode::E303)
                .with_help("close the placeholder with `}`"),
            );
            return None;
        };

        let path = after[..end].trim();
        if path.is_empty() {
            collector.emit(
                Diagnostic::error(format!(
                    "template `{}`: empty placeholder in `{input}`",
                    template.name
                ))
                .with_code(ErrorCode::E303),
            );
            ok = false;
        } else {
            match Value::lookup_path(record, path) {
                Some(value) => out.push_str(&value.display_text()),
                None => {
                    collector.emit(
                        Diagnostic::error(format!(
                            "template `{}`: record has no field `{path}`",
                            template.name
                        ))
                        .with_code(ErrorCode::E301)
                        .with_help("check the data source's record fields"),
                    );
                    ok = false;
                }
            }
        }

        rest = &after[end + 1..];
    }
    out.push_str(rest);

    ok.then_some(out)
}

/// Substitute placeholders in every string value of a data bag,
/// recursing into nested maps.
fn substitute_map(
    map: &ValueMap,
    record: &Record,
    template: &Template,
    collector: &mut DiagnosticCollector,
) -> ValueMap {
    map.iter()
        .map(|(key, value)| {
            let substituted = match value {
                Value::String(s) => match substitute(s, record, template, collector) {
                    Some(out) => Value::String(out),
                    None => value.clone(),
                },
                Value::Map(inner) => {
                    Value::Map(substitute_map(inner, record, template, collector))
                }
                other => other.clone(),
            };
            (key.clone(), substituted)
        })
        .collect()
}
