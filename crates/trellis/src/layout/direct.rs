//! Direct coordinate layouts for the non-graph profiles.
//!
//! Sequence diagrams place lifelines across the flow axis and messages
//! at successive steps along it; timelines place tracks as bands and
//! events by their scaled time value; wardley maps place components
//! straight onto the evolution/visibility canvas.

use indexmap::IndexMap;

use trellis_core::{
    catalog::ShapeCatalog,
    geometry::{Bounds, Insets, Point, Size},
    identifier::Id,
    positioned::{EdgePath, PositionedContainer, PositionedNode, RoutedEdge},
};

use crate::{
    config::LayoutOptions,
    convert::{GraphModel, SequenceModel, TimelineModel, WardleyModel},
    layout::{cross_extent, flow_bounds, flow_point, node_size, positioned_node, primary_extent, route},
};

type LayoutParts = (Vec<PositionedNode>, Vec<PositionedContainer>, Vec<RoutedEdge>);

/// Sequence layout: lifeline heads on the cross axis in declaration
/// order, messages at successive primary-axis steps in message order.
pub(crate) fn layout_sequence(
    model: &SequenceModel,
    catalog: &dyn ShapeCatalog,
    options: &LayoutOptions,
) -> LayoutParts {
    let graph = &model.graph;
    let direction = graph.direction;

    // Measure every lifeline head first; the header band is as deep as
    // the deepest head.
    let mut sizes = Vec::with_capacity(model.lifelines.len());
    for lifeline in &model.lifelines {
        let node = graph.node(lifeline.id).expect("lifelines are nodes");
        sizes.push(node_size(node, catalog));
    }
    let header_depth = sizes
        .iter()
        .map(|s| primary_extent(direction, *s))
        .fold(0.0, f32::max);

    let message_area = options.rank_spacing * (model.messages.len() + 1) as f32;
    let total_primary = header_depth + message_area;

    let mut nodes = Vec::with_capacity(model.lifelines.len());
    let mut centers: IndexMap<Id, f32> = IndexMap::new();
    let mut c = 0.0;
    for (lifeline, size) in model.lifelines.iter().zip(&sizes) {
        let p_ext = primary_extent(direction, *size);
        let c_ext = cross_extent(direction, *size);
        let bounds = flow_bounds(
            direction,
            (header_depth - p_ext) / 2.0,
            c,
            p_ext,
            c_ext,
            total_primary,
        );
        let node = graph.node(lifeline.id).expect("lifelines are nodes");
        nodes.push(positioned_node(node, bounds, catalog));
        centers.insert(lifeline.id, c + c_ext / 2.0);
        c += c_ext + options.node_spacing;
    }

    let mut edges = Vec::with_capacity(model.messages.len());
    for message in &model.messages {
        let p = header_depth + options.rank_spacing * (message.index + 1) as f32;
        let from_c = centers[&message.from];
        let to_c = centers[&message.to];

        let path = if message.from == message.to {
            // Self-message: a small bump beside the lifeline.
            let at = flow_point(direction, p, from_c, total_primary);
            let out = options.node_spacing * 0.5;
            EdgePath::Cubic {
                from: at,
                control1: Point::new(at.x() + out, at.y()),
                control2: Point::new(at.x() + out, at.y() + out * 0.5),
                to: Point::new(at.x(), at.y() + out * 0.5),
            }
        } else {
            EdgePath::Polyline(vec![
                flow_point(direction, p, from_c, total_primary),
                flow_point(direction, p, to_c, total_primary),
            ])
        };

        edges.push(RoutedEdge {
            index: message.index,
            source: message.from,
            target: message.to,
            source_anchor: None,
            target_anchor: None,
            label: message.label.clone(),
            path,
        });
    }

    let containers = container_boxes(graph, &nodes, options);
    (nodes, containers, edges)
}

/// Timeline layout: one band per track across the flow axis, events
/// along it at their scaled time position. Untimed events queue after
/// the last timed one in declaration order.
pub(crate) fn layout_timeline(
    model: &TimelineModel,
    catalog: &dyn ShapeCatalog,
    options: &LayoutOptions,
) -> LayoutParts {
    let graph = &model.graph;
    let direction = graph.direction;

    let event_count: usize = model.tracks.iter().map(|t| t.events.len()).sum();
    let axis_length = options.rank_spacing * (event_count.max(2)) as f32;
    let range = model.time_range();

    let position_of = |at: f64| -> f32 {
        match range {
            Some((min, max)) if max > min => {
                ((at - min) / (max - min)) as f32 * axis_length
            }
            _ => 0.0,
        }
    };

    let mut nodes = Vec::new();
    let mut untimed_seen = 0usize;
    let mut band_c = 0.0;
    let mut total_primary = axis_length;

    // First pass sizes everything so the primary extent is known
    // before reversed directions are mapped.
    let mut placements: Vec<(Id, f32, f32, Size)> = Vec::new();
    for track in &model.tracks {
        let band_extent = track
            .events
            .iter()
            .filter_map(|e| graph.node(e.id))
            .map(|n| cross_extent(direction, node_size(n, catalog)))
            .fold(0.0, f32::max)
            .max(options.node_spacing);

        for event in &track.events {
            let Some(node) = graph.node(event.id) else {
                continue;
            };
            let size = node_size(node, catalog);
            let p_center = match event.at {
                Some(at) => position_of(at),
                None => {
                    untimed_seen += 1;
                    axis_length + options.rank_spacing * untimed_seen as f32
                }
            };
            total_primary = total_primary.max(p_center + primary_extent(direction, size));
            let c_center = band_c + band_extent / 2.0;
            placements.push((event.id, p_center, c_center, size));
        }

        band_c += band_extent + options.node_spacing;
    }

    for (id, p_center, c_center, size) in placements {
        let p_ext = primary_extent(direction, size);
        let c_ext = cross_extent(direction, size);
        let bounds = flow_bounds(
            direction,
            p_center - p_ext / 2.0,
            c_center - c_ext / 2.0,
            p_ext,
            c_ext,
            total_primary,
        );
        let node = graph.node(id).expect("placements come from nodes");
        nodes.push(positioned_node(node, bounds, catalog));
    }

    let containers = container_boxes(graph, &nodes, options);
    let edges = route::route_edges(graph, &nodes, &containers, options);
    (nodes, containers, edges)
}

/// Wardley layout: evolution maps to x, visibility to y (visible at
/// the top). The canvas is fixed; direction has no meaning here.
pub(crate) fn layout_wardley(
    model: &WardleyModel,
    catalog: &dyn ShapeCatalog,
    options: &LayoutOptions,
) -> LayoutParts {
    let graph = &model.graph;

    let mut nodes = Vec::with_capacity(model.components.len());
    for component in &model.components {
        let Some(node) = graph.node(component.id) else {
            continue;
        };
        let size = node_size(node, catalog);
        let center = Point::new(
            component.evolution as f32 * options.canvas_width,
            (1.0 - component.visibility as f32) * options.canvas_height,
        );
        nodes.push(positioned_node(node, Bounds::from_center(center, size), catalog));
    }

    let containers = container_boxes(graph, &nodes, options);
    let edges = route::route_edges(graph, &nodes, &containers, options);
    (nodes, containers, edges)
}

/// Container boxes for directly laid out profiles: each container's
/// box is the union of its (already placed) children plus padding,
/// computed innermost-first.
fn container_boxes(
    graph: &GraphModel,
    nodes: &[PositionedNode],
    options: &LayoutOptions,
) -> Vec<PositionedContainer> {
    let mut boxes: IndexMap<Id, Bounds> = IndexMap::new();

    fn resolve(
        id: Id,
        graph: &GraphModel,
        nodes: &[PositionedNode],
        options: &LayoutOptions,
        boxes: &mut IndexMap<Id, Bounds>,
    ) -> Bounds {
        if let Some(bounds) = boxes.get(&id) {
            return *bounds;
        }
        let container = graph.container(id).expect("resolve is called on containers");

        let mut union: Option<Bounds> = None;
        for &child in &container.children {
            let child_bounds = if graph.container(child).is_some() {
                Some(resolve(child, graph, nodes, options, boxes))
            } else {
                nodes.iter().find(|n| n.id == child).map(|n| n.bounds)
            };
            if let Some(child_bounds) = child_bounds {
                union = Some(match union {
                    None => child_bounds,
                    Some(current) => current.union(child_bounds),
                });
            }
        }

        let padding = Insets::uniform(container.padding.unwrap_or(options.container_padding));
        let bounds = union.unwrap_or_default().expand(padding);
        boxes.insert(id, bounds);
        bounds
    }

    let mut containers = Vec::with_capacity(graph.containers.len());
    for container in &graph.containers {
        let bounds = resolve(container.id, graph, nodes, options, &mut boxes);

        let mut depth = 0;
        let mut current = container.parent;
        while let Some(parent) = current {
            depth += 1;
            current = graph.container(parent).and_then(|c| c.parent);
        }

        containers.push(PositionedContainer {
            id: container.id,
            label: container.label.clone(),
            bounds,
            depth,
        });
    }
    containers
}
