//! Structural validation of the parse tree.
//!
//! Runs between parsing and elaboration and checks the invariants the
//! rest of the pipeline relies on:
//!
//! - every node/container id is unique within its profile (`E200`)
//! - every edge endpoint, member reference, and style reference names a
//!   declared entity (`E201`)
//! - container membership forms a forest: no entity has two parents
//!   (`E203`) and no container is its own transitive ancestor (`E202`)
//! - nesting depth stays within the configured maximum (`E204`)
//!
//! All diagnostics are accumulated in one pass over the document;
//! validation never mutates the tree. Template bodies are skipped here:
//! their ids carry `${...}` placeholders and are re-checked after
//! expansion.

use indexmap::IndexMap;

use crate::{
    error::{Diagnostic, DiagnosticCollector, ErrorCode, ParseError},
    parser_types::{Attr, AttrValue, DocumentAst, ProfileAst, Statement},
    span::Span,
};

/// Options for structural validation.
#[derive(Debug, Clone)]
pub struct ValidateOptions {
    /// Maximum container nesting depth. Deeper nesting is an error,
    /// not a silent truncation.
    pub max_nesting_depth: usize,
}

impl Default for ValidateOptions {
    fn default() -> Self {
        Self {
            max_nesting_depth: 10,
        }
    }
}

/// A declared node or container in one profile.
#[derive(Debug, Clone, Copy)]
struct Declared {
    span: Span,
    is_container: bool,
}

/// A claim that `child` belongs to `parent`, either by lexical nesting
/// or by a member reference.
#[derive(Debug, Clone)]
struct ParentClaim {
    parent: String,
    span: Span,
}

/// A reference that must resolve to a declared entity.
#[derive(Debug, Clone)]
struct Reference {
    id: String,
    span: Span,
    role: &'static str,
}

#[derive(Debug, Default)]
struct ProfileIndex {
    declared: IndexMap<String, Declared>,
    styles: IndexMap<String, Span>,
    /// All parent claims, in declaration order.
    claims: Vec<(String, ParentClaim)>,
    references: Vec<Reference>,
    style_refs: Vec<Reference>,
}

/// Validates every profile of a parsed document.
pub fn validate(document: &DocumentAst<'_>, options: &ValidateOptions) -> Result<(), ParseError> {
    let mut collector = DiagnosticCollector::new();
    for profile in &document.profiles {
        validate_profile(profile, options, &mut collector);
    }
    collector.finish()
}

fn validate_profile(
    profile: &ProfileAst<'_>,
    options: &ValidateOptions,
    collector: &mut DiagnosticCollector,
) {
    let mut index = ProfileIndex::default();

    // Style names are profile-level only; collect them first so style
    // references resolve regardless of declaration order.
    for statement in &profile.statements {
        if let Statement::Style(style) = statement {
            index.styles.insert((*style.name.inner()).to_string(), style.name.span());
        }
    }

    collect(&profile.statements, None, &mut index, collector);

    resolve_references(&index, collector);
    let parents = resolve_parents(&index, collector);
    check_forest(&index, &parents, options, collector);
}

/// Recursive collection pass: registers declarations, records parent
/// claims and references, and reports duplicates as it goes.
fn collect(
    statements: &[Statement<'_>],
    parent: Option<&str>,
    index: &mut ProfileIndex,
    collector: &mut DiagnosticCollector,
) {
    for statement in statements {
        match statement {
            Statement::Node(node) => {
                declare(index, collector, node.id.inner(), node.id.span(), false);
                claim_lexical_parent(index, parent, node.id.inner(), node.id.span());
                record_style_ref(&node.attrs, index);
            }
            Statement::Container(container) => {
                declare(index, collector, container.id.inner(), container.id.span(), true);
                claim_lexical_parent(index, parent, container.id.inner(), container.id.span());
                record_style_ref(&container.attrs, index);
                check_container_attrs(&container.attrs, collector);
                collect(&container.body, Some(container.id.inner()), index, collector);
            }
            Statement::Member(member) => {
                let Some(parent) = parent else {
                    // The parser only produces members inside containers.
                    continue;
                };
                index.references.push(Reference {
                    id: member.inner().clone(),
                    span: member.span(),
                    role: "member reference",
                });
                index.claims.push((
                    member.inner().clone(),
                    ParentClaim {
                        parent: parent.to_string(),
                        span: member.span(),
                    },
                ));
            }
            Statement::Edge(edge) => {
                index.references.push(Reference {
                    id: edge.source.id.inner().clone(),
                    span: edge.source.id.span(),
                    role: "edge endpoint",
                });
                index.references.push(Reference {
                    id: edge.target.id.inner().clone(),
                    span: edge.target.id.span(),
                    role: "edge endpoint",
                });
                record_style_ref(&edge.attrs, index);
                check_route_attr(&edge.attrs, collector);
            }
            // Template bodies are validated after expansion.
            Statement::Template(_) => {}
            Statement::Direction(_)
            | Statement::Style(_)
            | Statement::Let(_)
            | Statement::Source(_) => {}
        }
    }
}

fn declare(
    index: &mut ProfileIndex,
    collector: &mut DiagnosticCollector,
    id: &str,
    span: Span,
    is_container: bool,
) {
    if let Some(first) = index.declared.get(id) {
        // One diagnostic per duplicate pair, pointing at both sites.
        collector.emit(
            Diagnostic::error(format!("`{id}` is declared more than once"))
                .with_code(ErrorCode::E200)
                .with_label(span, "duplicate declaration")
                .with_secondary_label(first.span, "first declared here")
                .with_help("rename one of the declarations"),
        );
        return;
    }
    index.declared.insert(
        id.to_string(),
        Declared {
            span,
            is_container,
        },
    );
}

fn claim_lexical_parent(index: &mut ProfileIndex, parent: Option<&str>, id: &str, span: Span) {
    if let Some(parent) = parent {
        index.claims.push((
            id.to_string(),
            ParentClaim {
                parent: parent.to_string(),
                span,
            },
        ));
    }
}

fn record_style_ref(attrs: &[Attr<'_>], index: &mut ProfileIndex) {
    for attr in attrs {
        if *attr.name.inner() == "style" {
            if let AttrValue::Ident(name) = &attr.value {
                index.style_refs.push(Reference {
                    id: (*name.inner()).to_string(),
                    span: name.span(),
                    role: "style reference",
                });
            }
        }
    }
}

/// Direction and padding overrides on containers are language-level
/// attributes, checked here rather than degraded later.
fn check_container_attrs(attrs: &[Attr<'_>], collector: &mut DiagnosticCollector) {
    for attr in attrs {
        if *attr.name.inner() == "direction" {
            if let AttrValue::Ident(name) = &attr.value {
                if trellis_core::document::Direction::parse(name.inner()).is_none() {
                    collector.emit(
                        Diagnostic::error(format!("unknown direction `{}`", name.inner()))
                            .with_code(ErrorCode::E103)
                            .with_label(name.span(), ErrorCode::E103.description())
                            .with_help("use one of `TB`, `LR`, `BT`, `RL`"),
                    );
                }
            }
        }
    }
}

fn check_route_attr(attrs: &[Attr<'_>], collector: &mut DiagnosticCollector) {
    for attr in attrs {
        if *attr.name.inner() == "route" {
            if let AttrValue::Ident(name) = &attr.value {
                if trellis_core::document::RouteHint::parse(name.inner()).is_none() {
                    collector.emit(
                        Diagnostic::error(format!("unknown routing hint `{}`", name.inner()))
                            .with_code(ErrorCode::E104)
                            .with_label(name.span(), ErrorCode::E104.description())
                            .with_help("use `straight`, `orthogonal`, or `curved`"),
                    );
                }
            }
        }
    }
}

/// Reference resolution: a single pass over the id index, reporting
/// every unresolved id individually rather than short-circuiting.
fn resolve_references(index: &ProfileIndex, collector: &mut DiagnosticCollector) {
    for reference in &index.references {
        if !index.declared.contains_key(&reference.id) {
            collector.emit(
                Diagnostic::error(format!(
                    "{} names undeclared entity `{}`",
                    reference.role, reference.id
                ))
                .with_code(ErrorCode::E201)
                .with_label(reference.span, "not declared in this profile"),
            );
        }
    }

    for style_ref in &index.style_refs {
        if !index.styles.contains_key(&style_ref.id) {
            collector.emit(
                Diagnostic::error(format!(
                    "{} names undeclared style `{}`",
                    style_ref.role, style_ref.id
                ))
                .with_code(ErrorCode::E201)
                .with_label(style_ref.span, "no such style in this profile"),
            );
        }
    }
}

/// Resolves the final parent of every declared entity, reporting
/// entities claimed by more than one container.
fn resolve_parents(
    index: &ProfileIndex,
    collector: &mut DiagnosticCollector,
) -> IndexMap<String, String> {
    let mut parents: IndexMap<String, String> = IndexMap::new();
    let mut first_claim: IndexMap<String, Span> = IndexMap::new();

    for (child, claim) in &index.claims {
        // Claims on undeclared ids were already reported as E201.
        if !index.declared.contains_key(child) {
            continue;
        }
        match parents.get(child) {
            None => {
                parents.insert(child.clone(), claim.parent.clone());
                first_claim.insert(child.clone(), claim.span);
            }
            Some(existing) if *existing == claim.parent => {
                // The same containment stated twice is redundant, not
                // conflicting.
            }
            Some(existing) => {
                collector.emit(
                    Diagnostic::error(format!(
                        "`{child}` cannot belong to both `{existing}` and `{}`",
                        claim.parent
                    ))
                    .with_code(ErrorCode::E203)
                    .with_label(claim.span, "second parent claimed here")
                    .with_secondary_label(first_claim[child], "first parent claimed here"),
                );
            }
        }
    }

    parents
}

/// Cycle and depth detection over the containment forest.
///
/// For each container, walk upward following parent links until a root
/// or a revisit; a revisit is a cycle, reported with the full cycle
/// path. The walk length to the root is the nesting depth.
fn check_forest(
    index: &ProfileIndex,
    parents: &IndexMap<String, String>,
    options: &ValidateOptions,
    collector: &mut DiagnosticCollector,
) {
    let mut in_reported_cycle: Vec<String> = Vec::new();

    for (id, declared) in &index.declared {
        if !declared.is_container {
            continue;
        }
        if in_reported_cycle.contains(id) {
            continue;
        }

        let mut path = vec![id.clone()];
        let mut current = id.clone();
        let mut hit_cycle = false;
        loop {
            let Some(parent) = parents.get(&current) else {
                break; // reached a root
            };
            if path.contains(parent) {
                // Trim the path to the cycle itself before reporting.
                let start = path
                    .iter()
                    .position(|p| p == parent)
                    .expect("revisited parent is on the walk path");
                let mut cycle: Vec<String> = path[start..].to_vec();
                cycle.push(parent.clone());
                in_reported_cycle.extend(cycle.iter().cloned());

                collector.emit(
                    Diagnostic::error(format!(
                        "container membership cycle: {}",
                        cycle.join(" -> ")
                    ))
                    .with_code(ErrorCode::E202)
                    .with_label(declared.span, "participates in this cycle")
                    .with_help("a container cannot be its own ancestor"),
                );
                hit_cycle = true;
                break;
            }
            path.push(parent.clone());
            current = parent.clone();
        }
        if hit_cycle {
            continue;
        }

        // Depth of this container is the number of ancestors above it.
        let depth = path.len() - 1;
        if depth > options.max_nesting_depth {
            collector.emit(
                Diagnostic::error(format!(
                    "`{id}` is nested {depth} levels deep (maximum is {})",
                    options.max_nesting_depth
                ))
                .with_code(ErrorCode::E204)
                .with_label(declared.span, ErrorCode::E204.description()),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{lexer::tokenize, parser::parse_tokens};

    fn validate_source(source: &str) -> Result<(), ParseError> {
        let tokens = tokenize(source).unwrap();
        let document = parse_tokens(&tokens, source.len()).unwrap();
        validate(&document, &ValidateOptions::default())
    }

    fn codes(err: &ParseError) -> Vec<ErrorCode> {
        err.diagnostics().iter().filter_map(|d| d.code()).collect()
    }

    #[test]
    fn test_valid_document() {
        assert!(
            validate_source(
                r##"
                profile flowchart {
                    style warn [fill: "#fdd"];
                    node a [style: warn];
                    node b;
                    a -> b;
                    container c { node inner; }
                    c -> b;
                }
                "##,
            )
            .is_ok()
        );
    }

    #[test]
    fn test_duplicate_id_reported_once() {
        let err = validate_source(
            "profile flowchart { node x; node x; }",
        )
        .unwrap_err();
        // One diagnostic per duplicate pair, not one per occurrence.
        assert_eq!(codes(&err), vec![ErrorCode::E200]);
        assert!(err.diagnostics()[0].message().contains("`x`"));
        assert_eq!(err.diagnostics()[0].labels().len(), 2);
    }

    #[test]
    fn test_duplicate_across_node_and_container() {
        let err = validate_source(
            "profile flowchart { node x; container x { } }",
        )
        .unwrap_err();
        assert_eq!(codes(&err), vec![ErrorCode::E200]);
    }

    #[test]
    fn test_unresolved_endpoint() {
        let err = validate_source(
            "profile flowchart { node a; a -> zz; }",
        )
        .unwrap_err();
        assert_eq!(codes(&err), vec![ErrorCode::E201]);
        assert!(err.diagnostics()[0].message().contains("`zz`"));
    }

    #[test]
    fn test_all_unresolved_reported() {
        let err = validate_source(
            "profile flowchart { aa -> bb; cc -> dd; }",
        )
        .unwrap_err();
        assert_eq!(codes(&err).len(), 4);
    }

    #[test]
    fn test_unresolved_style() {
        let err = validate_source(
            "profile flowchart { node a [style: missing]; }",
        )
        .unwrap_err();
        assert_eq!(codes(&err), vec![ErrorCode::E201]);
    }

    #[test]
    fn test_self_containment_cycle() {
        let err = validate_source(
            "profile flowchart { container c { c; } }",
        )
        .unwrap_err();
        assert_eq!(codes(&err), vec![ErrorCode::E202]);
        assert!(err.diagnostics()[0].message().contains("c -> c"));
    }

    #[test]
    fn test_indirect_cycle_reported_once() {
        let err = validate_source(
            r#"
            profile flowchart {
                container a { b; }
                container b { a; }
            }
            "#,
        )
        .unwrap_err();
        assert_eq!(codes(&err), vec![ErrorCode::E202]);
    }

    #[test]
    fn test_multiple_parents() {
        let err = validate_source(
            r#"
            profile flowchart {
                node shared;
                container a { shared; }
                container b { shared; }
            }
            "#,
        )
        .unwrap_err();
        assert_eq!(codes(&err), vec![ErrorCode::E203]);
    }

    #[test]
    fn test_redundant_same_parent_is_ok() {
        assert!(
            validate_source(
                r#"
                profile flowchart {
                    container a { node inner; inner; }
                }
                "#,
            )
            .is_ok()
        );
    }

    #[test]
    fn test_nesting_depth_limit() {
        let mut source = String::from("profile flowchart {\n");
        for i in 0..12 {
            source.push_str(&format!("container c{i} {{\n"));
        }
        source.push_str("node leaf;\n");
        source.push_str(&"}\n".repeat(12));
        source.push('}');

        let err = validate_source(&source).unwrap_err();
        assert!(codes(&err).contains(&ErrorCode::E204));
    }

    #[test]
    fn test_unknown_route_hint() {
        let err = validate_source(
            "profile flowchart { node a; node b; a -> b [route: zigzag]; }",
        )
        .unwrap_err();
        assert_eq!(codes(&err), vec![ErrorCode::E104]);
    }

    #[test]
    fn test_unknown_container_direction() {
        let err = validate_source(
            "profile flowchart { container c [direction: XY] { } }",
        )
        .unwrap_err();
        assert_eq!(codes(&err), vec![ErrorCode::E103]);
    }

    #[test]
    fn test_template_bodies_skipped() {
        // Placeholder ids inside templates are not statically resolvable
        // and must not produce unresolved-reference errors here.
        assert!(
            validate_source(
                r#"
                profile flowchart {
                    source items = [ { sku: "a" } ];
                    template t from items {
                        node "n_${sku}";
                        "n_${sku}" -> "n_${sku}";
                    }
                }
                "#,
            )
            .is_ok()
        );
    }
}
