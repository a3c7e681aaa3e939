//! Positioned output model.
//!
//! The layout engine's output vocabulary: absolute boxes for nodes and
//! containers, resolved anchor points, and routed edge paths. Renderers
//! and exporters consume these types and never reach back into
//! pre-layout state.

use crate::{
    document::{Direction, ProfileKind},
    geometry::{Bounds, Point},
    identifier::Id,
};

/// A resolved, absolutely positioned anchor on a node boundary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnchorPoint {
    pub name: Id,
    pub position: Point,
}

/// A node with final geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedNode {
    pub id: Id,
    pub bounds: Bounds,
    /// Named anchor points in catalog order, in absolute coordinates.
    pub anchors: Vec<AnchorPoint>,
}

impl PositionedNode {
    /// Looks up an anchor by name.
    pub fn anchor(&self, name: Id) -> Option<AnchorPoint> {
        self.anchors.iter().copied().find(|a| a.name == name)
    }
}

/// A container with final geometry (children's union plus padding).
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedContainer {
    pub id: Id,
    pub label: Option<String>,
    pub bounds: Bounds,
    /// Nesting depth, zero for top-level containers.
    pub depth: usize,
}

/// The concrete geometry of a routed edge.
#[derive(Debug, Clone, PartialEq)]
pub enum EdgePath {
    /// Straight segments through the listed points (two points for a
    /// straight edge, up to four for an orthogonal route).
    Polyline(Vec<Point>),
    /// A cubic segment between the two anchors.
    Cubic {
        from: Point,
        control1: Point,
        control2: Point,
        to: Point,
    },
}

impl EdgePath {
    /// First point of the path.
    pub fn start(&self) -> Point {
        match self {
            EdgePath::Polyline(points) => points.first().copied().unwrap_or_default(),
            EdgePath::Cubic { from, .. } => *from,
        }
    }

    /// Last point of the path.
    pub fn end(&self) -> Point {
        match self {
            EdgePath::Polyline(points) => points.last().copied().unwrap_or_default(),
            EdgePath::Cubic { to, .. } => *to,
        }
    }
}

/// An edge with resolved anchors and a routed path.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutedEdge {
    /// Index of the source declaration this edge came from.
    pub index: usize,
    pub source: Id,
    pub target: Id,
    /// The anchor actually used at the source end, when the endpoint
    /// shape declared any.
    pub source_anchor: Option<Id>,
    pub target_anchor: Option<Id>,
    pub label: Option<String>,
    pub path: EdgePath,
}

/// One fully laid out profile.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedProfile {
    pub kind: ProfileKind,
    pub title: Option<String>,
    pub direction: Direction,
    pub nodes: Vec<PositionedNode>,
    pub containers: Vec<PositionedContainer>,
    pub edges: Vec<RoutedEdge>,
    /// Overall bounding box of the diagram content.
    pub bounds: Bounds,
}

impl PositionedProfile {
    pub fn node(&self, id: Id) -> Option<&PositionedNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn container(&self, id: Id) -> Option<&PositionedContainer> {
        self.containers.iter().find(|c| c.id == id)
    }
}
