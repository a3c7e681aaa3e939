//! Profile conversion: from the validated generic document to
//! domain-specific semantic models.
//!
//! [`convert`] is the single dispatch point over the closed
//! [`ProfileKind`] set, one converter per kind. Converters reshape
//! semantics only; they never compute geometry. Unknown or malformed
//! per-domain attributes degrade gracefully (the value is omitted),
//! while a missing *required* field (a schematic part with no shape)
//! is a domain error that blocks conversion of that profile, and only
//! that profile.

pub mod parts;
pub mod sequence;
pub mod timeline;
pub mod wardley;

use indexmap::IndexMap;
use log::debug;

use trellis_core::{
    document::{ContainerDecl, Direction, EdgeAst, NodeAst, Profile, ProfileKind, Style},
    identifier::Id,
};
use trellis_parser::ParseError;

pub use parts::{Net, Part, PartModel, PinAssignment, PinRef};
pub use sequence::{Lifeline, Message, SequenceModel};
pub use timeline::{TimelineEvent, TimelineModel, Track};
pub use wardley::{WardleyComponent, WardleyModel};

/// The generic projection every domain model carries into layout:
/// nodes, edges, and containers in declaration order, plus the
/// resolved flow direction and style table.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphModel {
    pub direction: Direction,
    pub nodes: Vec<NodeAst>,
    pub edges: Vec<EdgeAst>,
    pub containers: Vec<ContainerDecl>,
    pub styles: IndexMap<Id, Style>,
}

impl GraphModel {
    pub fn from_profile(profile: &Profile) -> Self {
        Self {
            direction: profile.direction,
            nodes: profile.nodes.clone(),
            edges: profile.edges.clone(),
            containers: profile.containers.clone(),
            styles: profile.styles.clone(),
        }
    }

    pub fn node(&self, id: Id) -> Option<&NodeAst> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn container(&self, id: Id) -> Option<&ContainerDecl> {
        self.containers.iter().find(|c| c.id == id)
    }
}

/// One domain model per diagram kind.
///
/// The kind set is fixed and finite; downstream dispatch is an
/// exhaustive `match`, never an open-ended lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum DomainModel {
    Flowchart(GraphModel),
    Schematic(PartModel),
    Logic(PartModel),
    Pid(PartModel),
    Sequence(SequenceModel),
    Timeline(TimelineModel),
    Wardley(WardleyModel),
    Railroad(GraphModel),
}

impl DomainModel {
    /// The generic graph projection behind this model.
    pub fn graph(&self) -> &GraphModel {
        match self {
            DomainModel::Flowchart(graph) | DomainModel::Railroad(graph) => graph,
            DomainModel::Schematic(parts)
            | DomainModel::Logic(parts)
            | DomainModel::Pid(parts) => &parts.graph,
            DomainModel::Sequence(sequence) => &sequence.graph,
            DomainModel::Timeline(timeline) => &timeline.graph,
            DomainModel::Wardley(wardley) => &wardley.graph,
        }
    }

    pub fn kind(&self) -> ProfileKind {
        match self {
            DomainModel::Flowchart(_) => ProfileKind::Flowchart,
            DomainModel::Schematic(_) => ProfileKind::Schematic,
            DomainModel::Logic(_) => ProfileKind::Logic,
            DomainModel::Pid(_) => ProfileKind::Pid,
            DomainModel::Sequence(_) => ProfileKind::Sequence,
            DomainModel::Timeline(_) => ProfileKind::Timeline,
            DomainModel::Wardley(_) => ProfileKind::Wardley,
            DomainModel::Railroad(_) => ProfileKind::Railroad,
        }
    }
}

/// Convert one validated profile into its domain model.
pub fn convert(profile: &Profile) -> Result<DomainModel, ParseError> {
    debug!(kind = profile.kind.as_str(); "Converting profile");

    match profile.kind {
        ProfileKind::Flowchart => Ok(DomainModel::Flowchart(GraphModel::from_profile(profile))),
        ProfileKind::Schematic => parts::convert_parts(profile).map(DomainModel::Schematic),
        ProfileKind::Logic => parts::convert_parts(profile).map(DomainModel::Logic),
        ProfileKind::Pid => parts::convert_parts(profile).map(DomainModel::Pid),
        ProfileKind::Sequence => Ok(DomainModel::Sequence(sequence::convert_sequence(profile))),
        ProfileKind::Timeline => Ok(DomainModel::Timeline(timeline::convert_timeline(profile))),
        ProfileKind::Wardley => Ok(DomainModel::Wardley(wardley::convert_wardley(profile))),
        ProfileKind::Railroad => Ok(DomainModel::Railroad(GraphModel::from_profile(profile))),
    }
}
