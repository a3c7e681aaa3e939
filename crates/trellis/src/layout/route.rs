//! Anchor resolution and edge routing.
//!
//! An edge with an explicit `node.port` endpoint uses that named
//! anchor; otherwise the anchor nearest the straight line between the
//! endpoint centers wins, ties preferring the primary-flow side.
//! Routing hints select the path shape: straight (the default), an
//! orthogonal L/Z polyline with at most two bends, or a cubic curve.
//! Self-loops and parallel edges between the same ordered pair are
//! offset laterally by index. There is no obstacle avoidance: overlap
//! with unrelated nodes is an accepted approximation.

use std::collections::HashMap;

use log::debug;

use trellis_core::{
    document::{Direction, EdgeAst, RouteHint},
    geometry::{Bounds, Point},
    identifier::Id,
    positioned::{AnchorPoint, EdgePath, PositionedContainer, PositionedNode, RoutedEdge},
};

use crate::{config::LayoutOptions, convert::GraphModel, layout::compass_anchors};

/// Route every edge of a graph model against absolute geometry.
pub(crate) fn route_edges(
    graph: &GraphModel,
    nodes: &[PositionedNode],
    containers: &[PositionedContainer],
    options: &LayoutOptions,
) -> Vec<RoutedEdge> {
    let geometry = Geometry { nodes, containers };

    // Parallel-edge bookkeeping: edges sharing an ordered endpoint
    // pair fan out laterally by their index within the group.
    let mut group_sizes: HashMap<(Id, Id), usize> = HashMap::new();
    for edge in &graph.edges {
        *group_sizes
            .entry((edge.source.id, edge.target.id))
            .or_default() += 1;
    }
    let mut group_seen: HashMap<(Id, Id), usize> = HashMap::new();

    let mut routed = Vec::with_capacity(graph.edges.len());
    for (index, edge) in graph.edges.iter().enumerate() {
        let key = (edge.source.id, edge.target.id);
        let group_index = {
            let seen = group_seen.entry(key).or_default();
            let current = *seen;
            *seen += 1;
            current
        };
        let group_size = group_sizes[&key];

        let Some(result) = route_edge(
            edge,
            index,
            group_index,
            group_size,
            &geometry,
            graph.direction,
            options,
        ) else {
            debug!(
                source = edge.source.id.to_string(),
                target = edge.target.id.to_string();
                "Skipping edge with unplaced endpoint",
            );
            continue;
        };
        routed.push(result);
    }
    routed
}

/// Absolute geometry lookup for edge endpoints.
struct Geometry<'a> {
    nodes: &'a [PositionedNode],
    containers: &'a [PositionedContainer],
}

impl Geometry<'_> {
    /// Bounds and anchor set for an endpoint. Containers expose the
    /// four compass anchors of their box.
    fn endpoint(&self, id: Id) -> Option<(Bounds, Vec<AnchorPoint>)> {
        if let Some(node) = self.nodes.iter().find(|n| n.id == id) {
            return Some((node.bounds, node.anchors.clone()));
        }
        self.containers
            .iter()
            .find(|c| c.id == id)
            .map(|c| (c.bounds, compass_anchors(c.bounds)))
    }
}

fn route_edge(
    edge: &EdgeAst,
    index: usize,
    group_index: usize,
    group_size: usize,
    geometry: &Geometry<'_>,
    direction: Direction,
    options: &LayoutOptions,
) -> Option<RoutedEdge> {
    let (source_bounds, source_anchors) = geometry.endpoint(edge.source.id)?;
    let (target_bounds, target_anchors) = geometry.endpoint(edge.target.id)?;

    if edge.source.id == edge.target.id {
        return Some(self_loop(
            edge,
            index,
            group_index,
            source_bounds,
            &source_anchors,
            options,
        ));
    }

    let source_center = source_bounds.center();
    let target_center = target_bounds.center();

    let source_anchor = pick_anchor(
        edge.source.port,
        &source_anchors,
        source_center,
        target_center,
        target_center,
    );
    let target_anchor = pick_anchor(
        edge.target.port,
        &target_anchors,
        source_center,
        target_center,
        source_center,
    );

    let from = source_anchor.map(|a| a.position).unwrap_or(source_center);
    let to = target_anchor.map(|a| a.position).unwrap_or(target_center);

    // Fan parallel edges out symmetrically around the center line.
    let lateral = (group_index as f32 - (group_size as f32 - 1.0) / 2.0)
        * options.parallel_edge_offset;
    let perp = perpendicular(from, to);

    let path = match edge.route {
        RouteHint::Default | RouteHint::Straight => {
            let shift = Point::new(perp.x() * lateral, perp.y() * lateral);
            EdgePath::Polyline(vec![from.add_point(shift), to.add_point(shift)])
        }
        RouteHint::Orthogonal => orthogonal_path(from, to, direction, lateral),
        RouteHint::Curved => curved_path(from, to, perp, lateral, options),
    };

    Some(RoutedEdge {
        index,
        source: edge.source.id,
        target: edge.target.id,
        source_anchor: source_anchor.map(|a| a.name),
        target_anchor: target_anchor.map(|a| a.name),
        label: edge.label.clone(),
        path,
    })
}

/// Choose the anchor for one end of an edge.
///
/// A named port wins when the shape declares it (an unknown port name
/// degrades to the nearest anchor). Otherwise: smallest distance to
/// the line between the endpoint centers; ties go to the anchor
/// nearest the far endpoint, so the chosen face is the one the flow
/// actually crosses; remaining ties keep catalog order.
fn pick_anchor(
    port: Option<Id>,
    anchors: &[AnchorPoint],
    line_a: Point,
    line_b: Point,
    other_center: Point,
) -> Option<AnchorPoint> {
    if anchors.is_empty() {
        return None;
    }

    if let Some(port) = port {
        if let Some(anchor) = anchors.iter().find(|a| a.name == port) {
            return Some(*anchor);
        }
        debug!(port = port.to_string(); "Unknown port name, using nearest anchor");
    }

    let mut best: Option<(AnchorPoint, f32, f32)> = None;
    for anchor in anchors {
        let distance = anchor.position.distance_to_line_sq(line_a, line_b);
        let reach = anchor.position.distance(other_center);
        let better = match &best {
            None => true,
            Some((_, best_distance, best_reach)) => {
                distance + f32::EPSILON < *best_distance
                    || ((distance - best_distance).abs() <= f32::EPSILON
                        && reach + f32::EPSILON < *best_reach)
            }
        };
        if better {
            best = Some((*anchor, distance, reach));
        }
    }
    best.map(|(anchor, _, _)| anchor)
}

/// Unit vector perpendicular to the segment `a -> b`.
fn perpendicular(a: Point, b: Point) -> Point {
    let dx = b.x() - a.x();
    let dy = b.y() - a.y();
    let length = (dx * dx + dy * dy).sqrt();
    if length == 0.0 {
        return Point::new(0.0, 0.0);
    }
    Point::new(-dy / length, dx / length)
}

/// An L/Z-shaped polyline with at most two bends, running along the
/// primary flow axis first.
fn orthogonal_path(from: Point, to: Point, direction: Direction, lateral: f32) -> EdgePath {
    if direction.is_vertical() {
        if (from.x() - to.x()).abs() < f32::EPSILON {
            return EdgePath::Polyline(vec![from, to]);
        }
        let mid_y = (from.y() + to.y()) / 2.0 + lateral;
        EdgePath::Polyline(vec![
            from,
            Point::new(from.x(), mid_y),
            Point::new(to.x(), mid_y),
            to,
        ])
    } else {
        if (from.y() - to.y()).abs() < f32::EPSILON {
            return EdgePath::Polyline(vec![from, to]);
        }
        let mid_x = (from.x() + to.x()) / 2.0 + lateral;
        EdgePath::Polyline(vec![
            from,
            Point::new(mid_x, from.y()),
            Point::new(mid_x, to.y()),
            to,
        ])
    }
}

/// A cubic with control points offset perpendicular to the segment by
/// a fixed fraction of its length, plus the parallel-edge fan-out.
fn curved_path(
    from: Point,
    to: Point,
    perp: Point,
    lateral: f32,
    options: &LayoutOptions,
) -> EdgePath {
    let span = from.distance(to);
    let offset = options.curve_tension * span + lateral;
    let bulge = Point::new(perp.x() * offset, perp.y() * offset);

    let third = Point::new((to.x() - from.x()) / 3.0, (to.y() - from.y()) / 3.0);
    EdgePath::Cubic {
        from,
        control1: from.add_point(third).add_point(bulge),
        control2: to.sub_point(third).add_point(bulge),
        to,
    }
}

/// A self-loop: a cubic leaving and re-entering the node's boundary,
/// bulging outward; successive loops on the same node grow by index.
fn self_loop(
    edge: &EdgeAst,
    index: usize,
    group_index: usize,
    bounds: Bounds,
    anchors: &[AnchorPoint],
    options: &LayoutOptions,
) -> RoutedEdge {
    let anchor_named = |name: &str| anchors.iter().find(|a| a.name == Id::new(name)).copied();

    let from = anchor_named("east")
        .or_else(|| anchors.first().copied())
        .map(|a| a.position)
        .unwrap_or_else(|| bounds.center());
    let to = anchor_named("south")
        .or_else(|| anchors.get(1).copied())
        .map(|a| a.position)
        .unwrap_or(from);

    let extent = options.node_spacing * 0.6 + group_index as f32 * options.parallel_edge_offset;
    let path = EdgePath::Cubic {
        from,
        control1: Point::new(from.x() + extent, from.y()),
        control2: Point::new(to.x() + extent, to.y() + extent),
        to,
    };

    RoutedEdge {
        index,
        source: edge.source.id,
        target: edge.target.id,
        source_anchor: anchor_named("east").map(|a| a.name),
        target_anchor: anchor_named("south").map(|a| a.name),
        label: edge.label.clone(),
        path,
    }
}
