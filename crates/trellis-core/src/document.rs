//! The document model produced by the language front-end.
//!
//! A [`Document`] owns an ordered sequence of [`Profile`]s; a profile
//! owns its declarations. Nodes, edges, and containers reference each
//! other exclusively by [`Id`], so the structural graph stays acyclic at
//! the storage level even though it logically encodes a general graph.
//!
//! The model is immutable once produced by the pipeline: validation
//! never mutates it, and expansion produces a new document.

use indexmap::IndexMap;

use crate::{
    data::SourceDescriptor,
    identifier::Id,
    value::{Record, Value, ValueMap},
};

/// The top-level compilation unit: one source text, many diagrams.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    /// Profiles in declaration order.
    pub profiles: Vec<Profile>,
}

/// The closed set of diagram kinds.
///
/// One converter and one layout mapping exist per variant; the set is
/// fixed and finite, so dispatch is a single exhaustive `match`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProfileKind {
    Flowchart,
    Schematic,
    Logic,
    Pid,
    Sequence,
    Timeline,
    Wardley,
    Railroad,
}

impl ProfileKind {
    /// Parses a profile-kind keyword from source text.
    pub fn parse(name: &str) -> Option<Self> {
        Some(match name {
            "flowchart" => ProfileKind::Flowchart,
            "schematic" => ProfileKind::Schematic,
            "logic" => ProfileKind::Logic,
            "pid" => ProfileKind::Pid,
            "sequence" => ProfileKind::Sequence,
            "timeline" => ProfileKind::Timeline,
            "wardley" => ProfileKind::Wardley,
            "railroad" => ProfileKind::Railroad,
            _ => return None,
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ProfileKind::Flowchart => "flowchart",
            ProfileKind::Schematic => "schematic",
            ProfileKind::Logic => "logic",
            ProfileKind::Pid => "pid",
            ProfileKind::Sequence => "sequence",
            ProfileKind::Timeline => "timeline",
            ProfileKind::Wardley => "wardley",
            ProfileKind::Railroad => "railroad",
        }
    }
}

impl std::fmt::Display for ProfileKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Primary flow direction of a profile or container.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Direction {
    /// Top to bottom (the default).
    #[default]
    TopToBottom,
    LeftToRight,
    BottomToTop,
    RightToLeft,
}

impl Direction {
    /// Parses a direction keyword (`TB`, `LR`, `BT`, `RL`).
    pub fn parse(name: &str) -> Option<Self> {
        Some(match name {
            "TB" => Direction::TopToBottom,
            "LR" => Direction::LeftToRight,
            "BT" => Direction::BottomToTop,
            "RL" => Direction::RightToLeft,
            _ => return None,
        })
    }

    /// Whether the primary flow axis is vertical (`TB`/`BT`).
    pub fn is_vertical(self) -> bool {
        matches!(self, Direction::TopToBottom | Direction::BottomToTop)
    }

    /// Whether the primary axis runs against coordinate growth
    /// (`BT`/`RL`).
    pub fn is_reversed(self) -> bool {
        matches!(self, Direction::BottomToTop | Direction::RightToLeft)
    }
}

/// One diagram declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub kind: ProfileKind,
    /// Optional title following the kind keyword.
    pub title: Option<String>,
    pub direction: Direction,
    /// Named styles in declaration order.
    pub styles: IndexMap<Id, Style>,
    /// `let` bindings in declaration order.
    pub variables: IndexMap<Id, Value>,
    /// Nodes in declaration order (layout order is declaration order).
    pub nodes: Vec<NodeAst>,
    /// Edges in declaration order.
    pub edges: Vec<EdgeAst>,
    /// Containers in declaration order, outermost first.
    pub containers: Vec<ContainerDecl>,
    pub templates: Vec<Template>,
    pub sources: Vec<DataSource>,
}

impl Profile {
    pub fn new(kind: ProfileKind) -> Self {
        Self {
            kind,
            title: None,
            direction: Direction::default(),
            styles: IndexMap::new(),
            variables: IndexMap::new(),
            nodes: Vec::new(),
            edges: Vec::new(),
            containers: Vec::new(),
            templates: Vec::new(),
            sources: Vec::new(),
        }
    }

    pub fn node(&self, id: Id) -> Option<&NodeAst> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn container(&self, id: Id) -> Option<&ContainerDecl> {
        self.containers.iter().find(|c| c.id == id)
    }

    /// Whether `id` names a declared node or container.
    pub fn declares(&self, id: Id) -> bool {
        self.node(id).is_some() || self.container(id).is_some()
    }

    pub fn source(&self, name: Id) -> Option<&DataSource> {
        self.sources.iter().find(|s| s.name == name)
    }
}

/// A node declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeAst {
    /// Unique within the owning profile (across nodes and containers).
    pub id: Id,
    /// Reference into the external shape catalog. Optional at the
    /// syntax level; some profiles require it (a schematic part with no
    /// shape has no part kind).
    pub shape: Option<Id>,
    pub label: Option<String>,
    /// Reference into the profile's style map.
    pub style: Option<Id>,
    /// Open attribute bag.
    pub data: ValueMap,
    /// Owning container, if nested.
    pub parent: Option<Id>,
}

impl NodeAst {
    pub fn new(id: Id) -> Self {
        Self {
            id,
            shape: None,
            label: None,
            style: None,
            data: ValueMap::new(),
            parent: None,
        }
    }

    /// Display text: the label when present, the id otherwise.
    pub fn display_text(&self) -> String {
        self.label.clone().unwrap_or_else(|| self.id.to_string())
    }
}

/// Directionality of an edge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EdgeKind {
    /// `->` (and `<-`, normalized by swapping endpoints).
    #[default]
    Directed,
    /// `<->`.
    Bidirectional,
    /// `--`.
    Undirected,
}

/// Routing hint for an edge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RouteHint {
    /// Engine decides (straight).
    #[default]
    Default,
    Straight,
    Orthogonal,
    Curved,
}

impl RouteHint {
    pub fn parse(name: &str) -> Option<Self> {
        Some(match name {
            "straight" => RouteHint::Straight,
            "orthogonal" => RouteHint::Orthogonal,
            "curved" => RouteHint::Curved,
            _ => return None,
        })
    }
}

/// One end of an edge: a node or container id plus an optional named
/// anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    pub id: Id,
    pub port: Option<Id>,
}

impl Endpoint {
    pub fn new(id: Id) -> Self {
        Self { id, port: None }
    }

    pub fn with_port(id: Id, port: Id) -> Self {
        Self {
            id,
            port: Some(port),
        }
    }
}

/// An edge declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeAst {
    pub source: Endpoint,
    pub target: Endpoint,
    pub kind: EdgeKind,
    pub label: Option<String>,
    pub style: Option<Id>,
    pub route: RouteHint,
    pub data: ValueMap,
}

impl EdgeAst {
    pub fn new(source: Endpoint, target: Endpoint) -> Self {
        Self {
            source,
            target,
            kind: EdgeKind::default(),
            label: None,
            style: None,
            route: RouteHint::default(),
            data: ValueMap::new(),
        }
    }
}

/// A container (group) declaration.
///
/// A container is itself addressable as an edge endpoint and is laid
/// out as a nested bounding box.
#[derive(Debug, Clone, PartialEq)]
pub struct ContainerDecl {
    pub id: Id,
    pub label: Option<String>,
    /// Direct children (node or container ids) in declaration order.
    pub children: Vec<Id>,
    /// Owning container, if nested.
    pub parent: Option<Id>,
    /// Overrides the profile direction for the container's interior.
    pub direction: Option<Direction>,
    /// Overrides the engine's container padding.
    pub padding: Option<f32>,
    pub style: Option<Id>,
}

impl ContainerDecl {
    pub fn new(id: Id) -> Self {
        Self {
            id,
            label: None,
            children: Vec::new(),
            parent: None,
            direction: None,
            padding: None,
            style: None,
        }
    }
}

/// A named bag of visual attributes. Purely data; the core never
/// interprets it.
#[derive(Debug, Clone, PartialEq)]
pub struct Style {
    pub name: Id,
    pub attrs: ValueMap,
}

/// A node rule inside a template; id and label may carry `${...}`
/// placeholders that expansion substitutes per record.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateNode {
    pub id: String,
    pub shape: Option<Id>,
    pub label: Option<String>,
    pub style: Option<Id>,
    pub data: ValueMap,
}

/// An edge rule inside a template; endpoint ids may carry placeholders.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateEdge {
    pub source: String,
    pub source_port: Option<Id>,
    pub target: String,
    pub target_port: Option<Id>,
    pub kind: EdgeKind,
    pub label: Option<String>,
    pub style: Option<Id>,
    pub route: RouteHint,
}

/// A template declaration bound to a data source.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    pub name: Id,
    /// Name of the bound [`DataSource`].
    pub source: Id,
    pub nodes: Vec<TemplateNode>,
    pub edges: Vec<TemplateEdge>,
}

/// Where a data source's records come from.
#[derive(Debug, Clone, PartialEq)]
pub enum DataOrigin {
    /// Records written inline in the source text.
    Inline(Vec<Record>),
    /// A descriptor for the embedder's loader to resolve before
    /// expansion runs; the core performs no I/O.
    External(SourceDescriptor),
}

/// A named data source declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct DataSource {
    pub name: Id,
    pub origin: DataOrigin,
}
