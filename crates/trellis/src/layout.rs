//! The layout engine: from domain models to positioned geometry.
//!
//! Graph-shaped models (flowchart, schematic, logic, pid, railroad) go
//! through the layered pipeline in [`layered`]: recursive container
//! layout, longest-path ranking, barycenter ordering, and
//! direction-mapped coordinates. Sequence, timeline, and wardley
//! models have direct coordinate mappings in [`direct`]. Edge anchor
//! resolution and routing live in [`route`].
//!
//! Layout is deterministic for identical input and options: every
//! iteration runs over ordered collections, and no randomness is
//! involved anywhere.

mod direct;
mod layered;
mod order;
mod rank;
mod route;

use log::debug;

use trellis_core::{
    catalog::{NodeContext, ShapeCatalog},
    document::{Direction, NodeAst},
    geometry::{Bounds, Point, Size},
    identifier::Id,
    positioned::{
        AnchorPoint, EdgePath, PositionedContainer, PositionedNode, PositionedProfile,
        RoutedEdge,
    },
};
use trellis_parser::ParseError;

use crate::{config::LayoutOptions, convert::DomainModel};

/// The layout engine, borrowing the shape catalog and options.
pub struct Engine<'a> {
    catalog: &'a dyn ShapeCatalog,
    options: &'a LayoutOptions,
}

impl<'a> Engine<'a> {
    pub fn new(catalog: &'a dyn ShapeCatalog, options: &'a LayoutOptions) -> Self {
        Self { catalog, options }
    }

    /// Lay out one converted profile.
    ///
    /// Fails only when a layout unit's directed edges form a cycle
    /// (`E500`); an empty profile lays out to an empty,
    /// minimum-margin box.
    pub fn layout(
        &self,
        model: &DomainModel,
        title: Option<&str>,
    ) -> Result<PositionedProfile, ParseError> {
        debug!(kind = model.kind().as_str(); "Laying out profile");

        let (nodes, containers, edges) = match model {
            DomainModel::Flowchart(graph) | DomainModel::Railroad(graph) => {
                layered::layout_graph(graph, self.catalog, self.options)?
            }
            DomainModel::Schematic(parts)
            | DomainModel::Logic(parts)
            | DomainModel::Pid(parts) => {
                layered::layout_graph(&parts.graph, self.catalog, self.options)?
            }
            DomainModel::Sequence(sequence) => {
                direct::layout_sequence(sequence, self.catalog, self.options)
            }
            DomainModel::Timeline(timeline) => {
                direct::layout_timeline(timeline, self.catalog, self.options)
            }
            DomainModel::Wardley(wardley) => {
                direct::layout_wardley(wardley, self.catalog, self.options)
            }
        };

        Ok(finish_profile(
            model,
            title,
            nodes,
            containers,
            edges,
            self.options.margin,
        ))
    }
}

/// Map a flow-space point to diagram coordinates.
///
/// Flow space: `p` grows along the primary flow axis, `c` along the
/// cross axis. `total_p` is the full primary extent of the space, used
/// to flip reversed directions (`BT`, `RL`).
pub(crate) fn flow_point(direction: Direction, p: f32, c: f32, total_p: f32) -> Point {
    let p = if direction.is_reversed() { total_p - p } else { p };
    if direction.is_vertical() {
        Point::new(c, p)
    } else {
        Point::new(p, c)
    }
}

/// Map a flow-space box (min corner plus extents) to diagram bounds.
pub(crate) fn flow_bounds(
    direction: Direction,
    p: f32,
    c: f32,
    p_extent: f32,
    c_extent: f32,
    total_p: f32,
) -> Bounds {
    let p = if direction.is_reversed() {
        total_p - p - p_extent
    } else {
        p
    };
    if direction.is_vertical() {
        Bounds::new(Point::new(c, p), Size::new(c_extent, p_extent))
    } else {
        Bounds::new(Point::new(p, c), Size::new(p_extent, c_extent))
    }
}

/// A member box's extent along the primary flow axis.
pub(crate) fn primary_extent(direction: Direction, size: Size) -> f32 {
    if direction.is_vertical() {
        size.height()
    } else {
        size.width()
    }
}

/// A member box's extent across the primary flow axis.
pub(crate) fn cross_extent(direction: Direction, size: Size) -> f32 {
    if direction.is_vertical() {
        size.width()
    } else {
        size.height()
    }
}

/// Resolve a node's size through the shape catalog.
pub(crate) fn node_size(node: &NodeAst, catalog: &dyn ShapeCatalog) -> Size {
    let label = node.display_text();
    catalog.bounds(
        shape_of(node),
        &NodeContext {
            label: &label,
            data: &node.data,
        },
    )
}

/// Build a positioned node: absolute bounds plus the catalog's anchors
/// scaled onto them.
pub(crate) fn positioned_node(
    node: &NodeAst,
    bounds: Bounds,
    catalog: &dyn ShapeCatalog,
) -> PositionedNode {
    let label = node.display_text();
    let anchors = catalog
        .anchors(
            shape_of(node),
            &NodeContext {
                label: &label,
                data: &node.data,
            },
        )
        .into_iter()
        .map(|anchor| AnchorPoint {
            name: anchor.name,
            position: Point::new(
                bounds.min_x() + anchor.offset.x() * bounds.size().width(),
                bounds.min_y() + anchor.offset.y() * bounds.size().height(),
            ),
        })
        .collect();

    PositionedNode {
        id: node.id,
        bounds,
        anchors,
    }
}

/// Compass anchors on a plain box; used for containers, which have no
/// catalog shape.
pub(crate) fn compass_anchors(bounds: Bounds) -> Vec<AnchorPoint> {
    let center = bounds.center();
    vec![
        AnchorPoint {
            name: Id::new("north"),
            position: Point::new(center.x(), bounds.min_y()),
        },
        AnchorPoint {
            name: Id::new("east"),
            position: Point::new(bounds.max_x(), center.y()),
        },
        AnchorPoint {
            name: Id::new("south"),
            position: Point::new(center.x(), bounds.max_y()),
        },
        AnchorPoint {
            name: Id::new("west"),
            position: Point::new(bounds.min_x(), center.y()),
        },
    ]
}

/// The catalog shape a node resolves to; unshaped nodes fall back to a
/// plain box.
pub(crate) fn shape_of(node: &NodeAst) -> Id {
    node.shape.unwrap_or_else(|| Id::new("box"))
}

/// Translate every produced coordinate so content starts at `margin`,
/// and compute the overall profile bounds.
fn finish_profile(
    model: &DomainModel,
    title: Option<&str>,
    mut nodes: Vec<PositionedNode>,
    mut containers: Vec<PositionedContainer>,
    mut edges: Vec<RoutedEdge>,
    margin: f32,
) -> PositionedProfile {
    let mut union: Option<Bounds> = None;
    let mut merge = |bounds: Bounds| {
        union = Some(match union {
            None => bounds,
            Some(current) => current.union(bounds),
        });
    };
    for node in &nodes {
        merge(node.bounds);
    }
    for container in &containers {
        merge(container.bounds);
    }
    for edge in &edges {
        for point in path_points(&edge.path) {
            merge(Bounds::new(point, Size::default()));
        }
    }

    let content = union.unwrap_or_default();
    let offset = Point::new(margin - content.min_x(), margin - content.min_y());

    for node in &mut nodes {
        node.bounds = node.bounds.translate(offset);
        for anchor in &mut node.anchors {
            anchor.position = anchor.position.add_point(offset);
        }
    }
    for container in &mut containers {
        container.bounds = container.bounds.translate(offset);
    }
    for edge in &mut edges {
        translate_path(&mut edge.path, offset);
    }

    let bounds = Bounds::new(
        Point::new(0.0, 0.0),
        Size::new(
            content.size().width() + 2.0 * margin,
            content.size().height() + 2.0 * margin,
        ),
    );

    PositionedProfile {
        kind: model.kind(),
        title: title.map(str::to_string),
        direction: model.graph().direction,
        nodes,
        containers,
        edges,
        bounds,
    }
}

fn path_points(path: &EdgePath) -> Vec<Point> {
    match path {
        EdgePath::Polyline(points) => points.clone(),
        EdgePath::Cubic {
            from,
            control1,
            control2,
            to,
        } => vec![*from, *control1, *control2, *to],
    }
}

fn translate_path(path: &mut EdgePath, offset: Point) {
    match path {
        EdgePath::Polyline(points) => {
            for point in points {
                *point = point.add_point(offset);
            }
        }
        EdgePath::Cubic {
            from,
            control1,
            control2,
            to,
        } => {
            *from = from.add_point(offset);
            *control1 = control1.add_point(offset);
            *control2 = control2.add_point(offset);
            *to = to.add_point(offset);
        }
    }
}
