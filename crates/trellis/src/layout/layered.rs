//! Layered layout for graph-shaped profiles.
//!
//! Containers are processed depth-first, children before parents: each
//! container's interior is laid out in its own local coordinate space,
//! and the container then participates in its parent's layout as a
//! single box sized to its content plus padding. Within one unit,
//! members are ranked by longest-path layering, ordered by the
//! barycenter heuristic, and placed along the unit's flow direction.
//!
//! Only edges whose endpoints are both direct members of a unit
//! constrain that unit's ranks; cross-container edges are routed
//! afterwards from absolute positions.

use indexmap::IndexMap;
use petgraph::{
    graph::{DiGraph, NodeIndex},
    visit::{DfsPostOrder, Walker},
};

use trellis_core::{
    catalog::ShapeCatalog,
    document::{ContainerDecl, EdgeKind},
    geometry::{Bounds, Insets, Point, Size},
    identifier::Id,
    positioned::{PositionedContainer, PositionedNode, RoutedEdge},
};
use trellis_parser::{Diagnostic, DiagnosticCollector, ErrorCode, ParseError};

use crate::{
    config::LayoutOptions,
    convert::GraphModel,
    layout::{cross_extent, flow_bounds, node_size, positioned_node, primary_extent, route},
};

/// One member's final box in its unit's local coordinate space.
#[derive(Debug, Clone)]
struct PlacedMember {
    id: Id,
    bounds: Bounds,
    is_container: bool,
}

/// A fully laid out unit: its members in local coordinates and the
/// union extent of their boxes.
#[derive(Debug, Clone, Default)]
struct UnitResult {
    content_size: Size,
    members: Vec<PlacedMember>,
}

/// Lay out a graph model into absolute node/container boxes and routed
/// edges.
pub(crate) fn layout_graph(
    graph: &GraphModel,
    catalog: &dyn ShapeCatalog,
    options: &LayoutOptions,
) -> Result<(Vec<PositionedNode>, Vec<PositionedContainer>, Vec<RoutedEdge>), ParseError> {
    // Containment forest, processed in post-order so every container
    // is sized before its parent needs it.
    let mut forest: DiGraph<Option<Id>, ()> = DiGraph::new();
    let root = forest.add_node(None);
    let mut container_nodes: IndexMap<Id, NodeIndex> = IndexMap::new();
    for container in &graph.containers {
        container_nodes.insert(container.id, forest.add_node(Some(container.id)));
    }
    for container in &graph.containers {
        let parent = match container.parent {
            Some(parent) => container_nodes[&parent],
            None => root,
        };
        forest.add_edge(parent, container_nodes[&container.id], ());
    }

    let mut collector = DiagnosticCollector::new();
    let mut results: IndexMap<Id, UnitResult> = IndexMap::new();
    let mut top_level = UnitResult::default();

    for index in DfsPostOrder::new(&forest, root).iter(&forest) {
        match forest[index] {
            Some(container_id) => {
                let container = graph
                    .container(container_id)
                    .expect("forest nodes come from the container list");
                let result =
                    layout_unit(graph, Some(container), &results, catalog, options, &mut collector);
                results.insert(container_id, result);
            }
            None => {
                top_level = layout_unit(graph, None, &results, catalog, options, &mut collector);
            }
        }
    }
    collector.finish()?;

    // Flatten local coordinate spaces into absolute positions.
    let mut nodes = Vec::new();
    let mut containers = Vec::new();
    flatten(
        graph,
        &top_level,
        Point::new(0.0, 0.0),
        0,
        &results,
        catalog,
        options,
        &mut nodes,
        &mut containers,
    );

    let edges = route::route_edges(graph, &nodes, &containers, options);
    Ok((nodes, containers, edges))
}

/// Lay out the direct members of one unit (the profile's top level, or
/// one container's interior) in local coordinates.
fn layout_unit(
    graph: &GraphModel,
    unit: Option<&ContainerDecl>,
    results: &IndexMap<Id, UnitResult>,
    catalog: &dyn ShapeCatalog,
    options: &LayoutOptions,
    collector: &mut DiagnosticCollector,
) -> UnitResult {
    let direction = unit
        .and_then(|c| c.direction)
        .unwrap_or(graph.direction);

    let member_ids = direct_members(graph, unit);
    if member_ids.is_empty() {
        return UnitResult::default();
    }

    let mut member_index: IndexMap<Id, usize> = IndexMap::new();
    let mut sizes = Vec::with_capacity(member_ids.len());
    let mut is_container = Vec::with_capacity(member_ids.len());
    for (index, &id) in member_ids.iter().enumerate() {
        member_index.insert(id, index);
        if let Some(node) = graph.node(id) {
            sizes.push(node_size(node, catalog));
            is_container.push(false);
        } else {
            let container = graph
                .container(id)
                .expect("member ids are declared entities");
            let padding = container_padding(container, options);
            sizes.push(
                results
                    .get(&id)
                    .map(|r| r.content_size)
                    .unwrap_or_default()
                    .grow(padding),
            );
            is_container.push(true);
        }
    }

    // Edges internal to this unit: both endpoints direct members.
    let mut rank_edges = Vec::new();
    let mut neighbor_edges = Vec::new();
    for edge in &graph.edges {
        let (Some(&source), Some(&target)) = (
            member_index.get(&edge.source.id),
            member_index.get(&edge.target.id),
        ) else {
            continue;
        };
        neighbor_edges.push((source, target));
        if edge.kind == EdgeKind::Directed {
            rank_edges.push((source, target));
        }
    }

    let ranks = match super::rank::assign_ranks(&member_ids, &rank_edges) {
        Ok(ranks) => ranks,
        Err(stuck) => {
            let unit_name = unit
                .map(|c| format!("container `{}`", c.id))
                .unwrap_or_else(|| "the profile's top level".to_string());
            let members: Vec<String> = stuck.iter().map(|id| format!("`{id}`")).collect();
            collector.emit(
                Diagnostic::error(format!(
                    "cyclic flow in {unit_name} among {}",
                    members.join(", ")
                ))
                .with_code(ErrorCode::E500)
                .with_help("break the cycle, or mark the return edge as undirected (`--`)"),
            );
            return UnitResult::default();
        }
    };

    let layers = super::order::order_ranks(&ranks, &neighbor_edges, options.ordering_passes);

    // Flow-space placement: ranks advance the primary axis, order
    // within a rank advances the cross axis, each rank centered.
    let rank_extents: Vec<f32> = layers
        .iter()
        .map(|layer| {
            layer
                .iter()
                .map(|&m| primary_extent(direction, sizes[m]))
                .fold(0.0, f32::max)
        })
        .collect();
    let cross_totals: Vec<f32> = layers
        .iter()
        .map(|layer| {
            let extent: f32 = layer
                .iter()
                .map(|&m| cross_extent(direction, sizes[m]))
                .sum();
            extent + options.node_spacing * layer.len().saturating_sub(1) as f32
        })
        .collect();
    let max_cross = cross_totals.iter().copied().fold(0.0, f32::max);

    let total_primary: f32 = rank_extents.iter().sum::<f32>()
        + options.rank_spacing * layers.len().saturating_sub(1) as f32;

    let mut placed: Vec<Option<PlacedMember>> = vec![None; member_ids.len()];
    let mut p = 0.0;
    for (rank, layer) in layers.iter().enumerate() {
        let mut c = (max_cross - cross_totals[rank]) / 2.0;
        for &member in layer {
            let size = sizes[member];
            let p_ext = primary_extent(direction, size);
            let c_ext = cross_extent(direction, size);
            // Center the member within its rank band.
            let member_p = p + (rank_extents[rank] - p_ext) / 2.0;
            let bounds = flow_bounds(direction, member_p, c, p_ext, c_ext, total_primary);
            placed[member] = Some(PlacedMember {
                id: member_ids[member],
                bounds,
                is_container: is_container[member],
            });
            c += c_ext + options.node_spacing;
        }
        p += rank_extents[rank] + options.rank_spacing;
    }

    let mut members: Vec<PlacedMember> = placed
        .into_iter()
        .map(|m| m.expect("every member is placed exactly once"))
        .collect();

    // Normalize the local space to start at the origin.
    let union = members
        .iter()
        .map(|m| m.bounds)
        .reduce(Bounds::union)
        .unwrap_or_default();
    let shift = Point::new(-union.min_x(), -union.min_y());
    for member in &mut members {
        member.bounds = member.bounds.translate(shift);
    }

    UnitResult {
        content_size: union.size(),
        members,
    }
}

/// The direct members of a unit, in declaration order.
fn direct_members(graph: &GraphModel, unit: Option<&ContainerDecl>) -> Vec<Id> {
    match unit {
        Some(container) => container.children.clone(),
        None => {
            let mut members: Vec<Id> = graph
                .nodes
                .iter()
                .filter(|n| n.parent.is_none())
                .map(|n| n.id)
                .collect();
            members.extend(
                graph
                    .containers
                    .iter()
                    .filter(|c| c.parent.is_none())
                    .map(|c| c.id),
            );
            members
        }
    }
}

fn container_padding(container: &ContainerDecl, options: &LayoutOptions) -> Insets {
    Insets::uniform(container.padding.unwrap_or(options.container_padding))
}

/// Walk the unit tree, converting local member boxes into absolute
/// node and container geometry.
#[allow(clippy::too_many_arguments)]
fn flatten(
    graph: &GraphModel,
    unit: &UnitResult,
    offset: Point,
    depth: usize,
    results: &IndexMap<Id, UnitResult>,
    catalog: &dyn ShapeCatalog,
    options: &LayoutOptions,
    nodes: &mut Vec<PositionedNode>,
    containers: &mut Vec<PositionedContainer>,
) {
    for member in &unit.members {
        let bounds = member.bounds.translate(offset);

        if !member.is_container {
            let node = graph
                .node(member.id)
                .expect("placed members are declared entities");
            nodes.push(positioned_node(node, bounds, catalog));
            continue;
        }

        let container = graph
            .container(member.id)
            .expect("placed members are declared entities");
        containers.push(PositionedContainer {
            id: container.id,
            label: container.label.clone(),
            bounds,
            depth,
        });

        if let Some(result) = results.get(&member.id) {
            let padding = container_padding(container, options);
            let inner_offset = Point::new(
                bounds.min_x() + padding.left(),
                bounds.min_y() + padding.top(),
            );
            flatten(
                graph,
                result,
                inner_offset,
                depth + 1,
                results,
                catalog,
                options,
                nodes,
                containers,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_core::catalog::BasicCatalog;
    use trellis_parser::ParseOptions;

    fn layout_source(
        source: &str,
    ) -> Result<(Vec<PositionedNode>, Vec<PositionedContainer>, Vec<RoutedEdge>), ParseError>
    {
        let document = trellis_parser::parse(source, &ParseOptions::default()).unwrap();
        let graph = GraphModel::from_profile(&document.profiles[0]);
        layout_graph(&graph, &BasicCatalog::new(), &LayoutOptions::default())
    }

    fn node_bounds<'a>(nodes: &'a [PositionedNode], id: &str) -> Bounds {
        nodes
            .iter()
            .find(|n| n.id == Id::new(id))
            .unwrap_or_else(|| panic!("node `{id}` missing"))
            .bounds
    }

    #[test]
    fn test_rank_monotonic_top_to_bottom() {
        let (nodes, _, _) =
            layout_source("profile flowchart { node a; node b; a -> b; }").unwrap();
        assert!(node_bounds(&nodes, "a").max_y() < node_bounds(&nodes, "b").min_y());
    }

    #[test]
    fn test_rank_monotonic_all_directions() {
        for (direction, check) in [
            ("TB", (|a: Bounds, b: Bounds| a.center().y() < b.center().y())
                as fn(Bounds, Bounds) -> bool),
            ("BT", |a, b| a.center().y() > b.center().y()),
            ("LR", |a, b| a.center().x() < b.center().x()),
            ("RL", |a, b| a.center().x() > b.center().x()),
        ] {
            let source = format!(
                "profile flowchart {{ direction: {direction}; node a; node b; node c; a -> b; b -> c; }}"
            );
            let (nodes, _, _) = layout_source(&source).unwrap();
            let (a, b, c) = (
                node_bounds(&nodes, "a"),
                node_bounds(&nodes, "b"),
                node_bounds(&nodes, "c"),
            );
            assert!(check(a, b), "{direction}: a vs b");
            assert!(check(b, c), "{direction}: b vs c");
        }
    }

    #[test]
    fn test_same_rank_nodes_side_by_side() {
        let (nodes, _, _) = layout_source(
            "profile flowchart { node root; node l; node r; root -> l; root -> r; }",
        )
        .unwrap();
        let l = node_bounds(&nodes, "l");
        let r = node_bounds(&nodes, "r");
        assert_eq!(l.center().y(), r.center().y());
        assert!(l.max_x() < r.min_x() || r.max_x() < l.min_x());
    }

    #[test]
    fn test_container_wraps_children() {
        let (nodes, containers, _) = layout_source(
            r#"
            profile flowchart {
                container c {
                    node x;
                    node y;
                    x -> y;
                }
            }
            "#,
        )
        .unwrap();

        let c = containers[0].bounds;
        for id in ["x", "y"] {
            let inner = node_bounds(&nodes, id);
            assert!(c.min_x() < inner.min_x());
            assert!(c.min_y() < inner.min_y());
            assert!(c.max_x() > inner.max_x());
            assert!(c.max_y() > inner.max_y());
        }
    }

    #[test]
    fn test_nested_containers() {
        let (_, containers, _) = layout_source(
            r#"
            profile flowchart {
                container outer {
                    container inner { node deep; }
                }
            }
            "#,
        )
        .unwrap();

        let outer = containers.iter().find(|c| c.id == Id::new("outer")).unwrap();
        let inner = containers.iter().find(|c| c.id == Id::new("inner")).unwrap();
        assert_eq!(outer.depth, 0);
        assert_eq!(inner.depth, 1);
        assert!(outer.bounds.min_x() < inner.bounds.min_x());
        assert!(outer.bounds.max_y() > inner.bounds.max_y());
    }

    #[test]
    fn test_empty_container_minimal_box() {
        let (_, containers, _) =
            layout_source("profile flowchart { container empty { } }").unwrap();
        let bounds = containers[0].bounds;
        // Zero content plus padding on both sides.
        assert_eq!(bounds.size().width(), 2.0 * LayoutOptions::default().container_padding);
    }

    #[test]
    fn test_cycle_is_layout_error() {
        let err = layout_source(
            "profile flowchart { node a; node b; a -> b; b -> a; }",
        )
        .unwrap_err();
        assert_eq!(err.diagnostics()[0].code(), Some(ErrorCode::E500));
        assert!(err.diagnostics()[0].message().contains("`a`"));
    }

    #[test]
    fn test_cross_container_cycle_is_not_an_error() {
        // Each unit's internal edges are acyclic; the cycle only closes
        // across the container boundary, which is legal and routed from
        // absolute positions.
        let (_, _, edges) = layout_source(
            r#"
            profile flowchart {
                node outside;
                container c { node inside; }
                outside -> inside;
                inside -> outside;
            }
            "#,
        )
        .unwrap();
        assert_eq!(edges.len(), 2);
    }

    #[test]
    fn test_undirected_edges_do_not_rank() {
        // An undirected "cycle" must not trigger E500.
        let (nodes, _, _) = layout_source(
            "profile flowchart { node a; node b; a -- b; b -- a; }",
        )
        .unwrap();
        assert_eq!(nodes.len(), 2);
    }

    #[test]
    fn test_self_loop_is_routed_not_ranked() {
        let (_, _, edges) =
            layout_source("profile flowchart { node a; a -> a; }").unwrap();
        assert_eq!(edges.len(), 1);
    }

    #[test]
    fn test_deterministic_layout() {
        let source = r#"
        profile flowchart {
            node a; node b; node c; node d;
            a -> b; a -> c; b -> d; c -> d;
            container g { node e; node f; e -> f; }
            d -> e;
        }
        "#;
        let first = layout_source(source).unwrap();
        let second = layout_source(source).unwrap();
        assert_eq!(first.0, second.0);
        assert_eq!(first.1, second.1);
        assert_eq!(first.2, second.2);
    }
}
