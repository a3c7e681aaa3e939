//! Elaboration: lowering the validated parse tree into the
//! `trellis_core` document model.
//!
//! Elaboration is a total, deterministic function of the parse tree.
//! String unescaping and numeric parsing already happened in the lexer;
//! this phase interns identifiers, substitutes defaults (direction
//! defaults to top-to-bottom, routing to the engine default), separates
//! the reserved attributes (`label`, `style`, `data`, `route`,
//! `direction`, `padding`) from the open data bag, and preserves
//! declaration order everywhere. It never invents structure: malformed
//! input was rejected by the parser and validator before this phase.

use log::debug;

use trellis_core::{
    data::SourceDescriptor,
    document::{
        ContainerDecl, DataOrigin, DataSource, Direction, Document, EdgeAst, EdgeKind, Endpoint,
        NodeAst, Profile, RouteHint, Style, Template, TemplateEdge, TemplateNode,
    },
    identifier::Id,
    value::{Record, Value, ValueMap},
};

use crate::parser_types::{
    ArrowAst, Attr, AttrValue, ContainerStmt, DocumentAst, EdgeStmt, NodeStmt, ProfileAst,
    Statement, TemplateStmt,
};

/// Lowers parse trees into documents.
#[derive(Debug, Default)]
pub struct Builder;

impl Builder {
    pub fn new() -> Self {
        Self
    }

    /// Build the document model from a validated parse tree.
    pub fn build(&self, ast: &DocumentAst<'_>) -> Document {
        let profiles = ast.profiles.iter().map(|p| self.build_profile(p)).collect();
        Document { profiles }
    }

    fn build_profile(&self, ast: &ProfileAst<'_>) -> Profile {
        let mut profile = Profile::new(*ast.kind.inner());
        profile.title = ast.title.as_ref().map(|t| (*t.inner()).to_string());

        self.build_statements(&ast.statements, None, &mut profile);

        // Member references may point at declarations lowered later, so
        // parent links are fixed up once all children lists exist.
        link_parents(&mut profile);

        debug!(
            kind = profile.kind.as_str(),
            nodes = profile.nodes.len(),
            edges = profile.edges.len(),
            containers = profile.containers.len();
            "Elaborated profile",
        );
        profile
    }

    fn build_statements(
        &self,
        statements: &[Statement<'_>],
        parent: Option<Id>,
        profile: &mut Profile,
    ) {
        for statement in statements {
            match statement {
                Statement::Direction(direction) => {
                    profile.direction = *direction.inner();
                }
                Statement::Style(style) => {
                    let name = Id::new(style.name.inner());
                    profile.styles.insert(
                        name,
                        Style {
                            name,
                            attrs: lower_attrs(&style.attrs),
                        },
                    );
                }
                Statement::Let(binding) => {
                    profile
                        .variables
                        .insert(Id::new(binding.name.inner()), lower_value(&binding.value));
                }
                Statement::Node(node) => {
                    let lowered = self.build_node(node, parent);
                    profile.nodes.push(lowered);
                }
                Statement::Edge(edge) => {
                    profile.edges.push(self.build_edge(edge));
                }
                Statement::Container(container) => {
                    let id = Id::new(container.id.inner());
                    let lowered = self.build_container(container, parent);
                    profile.containers.push(lowered);
                    self.build_statements(&container.body, Some(id), profile);
                }
                Statement::Member(_) => {
                    // Members only contribute to their container's
                    // children list, handled in build_container.
                }
                Statement::Template(template) => {
                    profile.templates.push(self.build_template(template));
                }
                Statement::Source(source) => {
                    profile.sources.push(build_source(source));
                }
            }
        }
    }

    fn build_node(&self, ast: &NodeStmt<'_>, parent: Option<Id>) -> NodeAst {
        let mut node = NodeAst::new(Id::new(ast.id.inner()));
        node.shape = ast.shape.as_ref().map(|s| Id::new(s.inner()));
        node.parent = parent;

        for attr in &ast.attrs {
            match (*attr.name.inner(), &attr.value) {
                ("label", AttrValue::String(label)) => node.label = Some(label.inner().clone()),
                ("style", AttrValue::Ident(style)) => node.style = Some(Id::new(style.inner())),
                ("data", AttrValue::Object(object)) => {
                    for inner in object.inner() {
                        node.data
                            .insert((*inner.name.inner()).to_string(), lower_value(&inner.value));
                    }
                }
                (name, value) => {
                    node.data.insert(name.to_string(), lower_value(value));
                }
            }
        }
        node
    }

    fn build_edge(&self, ast: &EdgeStmt<'_>) -> EdgeAst {
        let source = Endpoint {
            id: Id::new(ast.source.id.inner()),
            port: ast.source.port.as_ref().map(|p| Id::new(p.inner())),
        };
        let target = Endpoint {
            id: Id::new(ast.target.id.inner()),
            port: ast.target.port.as_ref().map(|p| Id::new(p.inner())),
        };

        // `a <- b` is the same edge as `b -> a`; normalize so layout
        // only ever sees forward direction.
        let (source, target, kind) = match ast.arrow.inner() {
            ArrowAst::Right => (source, target, EdgeKind::Directed),
            ArrowAst::Left => (target, source, EdgeKind::Directed),
            ArrowAst::Both => (source, target, EdgeKind::Bidirectional),
            ArrowAst::Plain => (source, target, EdgeKind::Undirected),
        };

        let mut edge = EdgeAst::new(source, target);
        edge.kind = kind;
        edge.label = ast.label.as_ref().map(|l| l.inner().clone());

        for attr in &ast.attrs {
            match (*attr.name.inner(), &attr.value) {
                ("label", AttrValue::String(label)) if edge.label.is_none() => {
                    edge.label = Some(label.inner().clone());
                }
                ("style", AttrValue::Ident(style)) => edge.style = Some(Id::new(style.inner())),
                ("route", AttrValue::Ident(route)) => {
                    edge.route = RouteHint::parse(route.inner()).unwrap_or_default();
                }
                ("data", AttrValue::Object(object)) => {
                    for inner in object.inner() {
                        edge.data
                            .insert((*inner.name.inner()).to_string(), lower_value(&inner.value));
                    }
                }
                (name, value) => {
                    edge.data.insert(name.to_string(), lower_value(value));
                }
            }
        }
        edge
    }

    fn build_container(&self, ast: &ContainerStmt<'_>, parent: Option<Id>) -> ContainerDecl {
        let mut container = ContainerDecl::new(Id::new(ast.id.inner()));
        container.parent = parent;

        for attr in &ast.attrs {
            match (*attr.name.inner(), &attr.value) {
                ("label", AttrValue::String(label)) => {
                    container.label = Some(label.inner().clone())
                }
                ("direction", AttrValue::Ident(direction)) => {
                    container.direction = Direction::parse(direction.inner());
                }
                ("padding", AttrValue::Number(padding)) => {
                    container.padding = Some(*padding.inner() as f32);
                }
                ("style", AttrValue::Ident(style)) => {
                    container.style = Some(Id::new(style.inner()))
                }
                (name, _) => {
                    debug!(attr = name; "Ignoring unknown container attribute");
                }
            }
        }

        // Children in declaration order: lexically nested declarations
        // first-come, member references in place.
        for statement in &ast.body {
            match statement {
                Statement::Node(node) => container.children.push(Id::new(node.id.inner())),
                Statement::Container(nested) => {
                    container.children.push(Id::new(nested.id.inner()))
                }
                Statement::Member(member) => container.children.push(Id::new(member.inner())),
                _ => {}
            }
        }

        container
    }

    fn build_template(&self, ast: &TemplateStmt<'_>) -> Template {
        let mut template = Template {
            name: Id::new(ast.name.inner()),
            source: Id::new(ast.source.inner()),
            nodes: Vec::new(),
            edges: Vec::new(),
        };

        for statement in &ast.body {
            match statement {
                Statement::Node(node) => {
                    let mut lowered = TemplateNode {
                        id: node.id.inner().clone(),
                        shape: node.shape.as_ref().map(|s| Id::new(s.inner())),
                        label: None,
                        style: None,
                        data: ValueMap::new(),
                    };
                    for attr in &node.attrs {
                        match (*attr.name.inner(), &attr.value) {
                            ("label", AttrValue::String(label)) => {
                                lowered.label = Some(label.inner().clone())
                            }
                            ("style", AttrValue::Ident(style)) => {
                                lowered.style = Some(Id::new(style.inner()))
                            }
                            ("data", AttrValue::Object(object)) => {
                                for inner in object.inner() {
                                    lowered.data.insert(
                                        (*inner.name.inner()).to_string(),
                                        lower_value(&inner.value),
                                    );
                                }
                            }
                            (name, value) => {
                                lowered.data.insert(name.to_string(), lower_value(value));
                            }
                        }
                    }
                    template.nodes.push(lowered);
                }
                Statement::Edge(edge) => {
                    let (source, source_port, target, target_port, kind) =
                        match edge.arrow.inner() {
                            ArrowAst::Left => (
                                &edge.target,
                                &edge.target.port,
                                &edge.source,
                                &edge.source.port,
                                EdgeKind::Directed,
                            ),
                            arrow => (
                                &edge.source,
                                &edge.source.port,
                                &edge.target,
                                &edge.target.port,
                                match arrow {
                                    ArrowAst::Both => EdgeKind::Bidirectional,
                                    ArrowAst::Plain => EdgeKind::Undirected,
                                    _ => EdgeKind::Directed,
                                },
                            ),
                        };

                    let mut lowered = TemplateEdge {
                        source: source.id.inner().clone(),
                        source_port: source_port.as_ref().map(|p| Id::new(p.inner())),
                        target: target.id.inner().clone(),
                        target_port: target_port.as_ref().map(|p| Id::new(p.inner())),
                        kind,
                        label: edge.label.as_ref().map(|l| l.inner().clone()),
                        style: None,
                        route: RouteHint::default(),
                    };
                    for attr in &edge.attrs {
                        match (*attr.name.inner(), &attr.value) {
                            ("style", AttrValue::Ident(style)) => {
                                lowered.style = Some(Id::new(style.inner()))
                            }
                            ("route", AttrValue::Ident(route)) => {
                                lowered.route =
                                    RouteHint::parse(route.inner()).unwrap_or_default();
                            }
                            _ => {}
                        }
                    }
                    template.edges.push(lowered);
                }
                _ => {}
            }
        }

        template
    }
}

fn build_source(ast: &crate::parser_types::SourceStmt<'_>) -> DataSource {
    let origin = match &ast.origin {
        crate::parser_types::SourceOriginAst::Load(locator) => {
            DataOrigin::External(SourceDescriptor::new(locator.inner().clone()))
        }
        crate::parser_types::SourceOriginAst::Inline(objects) => {
            let records: Vec<Record> = objects
                .iter()
                .map(|object| {
                    object
                        .inner()
                        .iter()
                        .map(|attr| ((*attr.name.inner()).to_string(), lower_value(&attr.value)))
                        .collect()
                })
                .collect();
            DataOrigin::Inline(records)
        }
    };
    DataSource {
        name: Id::new(ast.name.inner()),
        origin,
    }
}

fn lower_attrs(attrs: &[Attr<'_>]) -> ValueMap {
    attrs
        .iter()
        .map(|attr| ((*attr.name.inner()).to_string(), lower_value(&attr.value)))
        .collect()
}

fn lower_value(value: &AttrValue<'_>) -> Value {
    match value {
        AttrValue::String(s) => Value::String(s.inner().clone()),
        AttrValue::Number(n) => Value::Number(*n.inner()),
        AttrValue::Bool(b) => Value::Bool(*b.inner()),
        AttrValue::Ident(i) => Value::Ref(Id::new(i.inner())),
        AttrValue::Object(o) => Value::Map(lower_attrs(o.inner())),
    }
}

/// Ensures node/container parent links agree with container children
/// lists, including member references resolved out of order.
fn link_parents(profile: &mut Profile) {
    let memberships: Vec<(Id, Id)> = profile
        .containers
        .iter()
        .flat_map(|c| c.children.iter().map(move |child| (*child, c.id)))
        .collect();

    for (child, parent) in memberships {
        if let Some(node) = profile.nodes.iter_mut().find(|n| n.id == child) {
            node.parent = Some(parent);
        } else if let Some(container) = profile.containers.iter_mut().find(|c| c.id == child) {
            container.parent = Some(parent);
        }
    }
}
