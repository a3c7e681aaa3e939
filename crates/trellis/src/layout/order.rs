//! Crossing reduction: barycenter ordering within ranks.
//!
//! The heuristic sweeps the layers a bounded number of times,
//! alternating downward and upward. In each sweep a member's
//! barycenter is the mean position of its neighbors in the adjacent
//! fixed layer; members are then stably re-sorted by barycenter, so
//! members without neighbors (and ties) keep their relative order.
//! The sweep stops early when an iteration changes nothing. Exact
//! crossing minimality is not a contract; only determinism is.

/// Order members within each rank.
///
/// `ranks[i]` is member `i`'s rank; `neighbors` are undirected
/// adjacency pairs (all edge kinds inform ordering, even those that do
/// not constrain ranks). Returns, per rank, member indices in final
/// order.
pub(crate) fn order_ranks(
    ranks: &[usize],
    neighbors: &[(usize, usize)],
    passes: usize,
) -> Vec<Vec<usize>> {
    let rank_count = ranks.iter().copied().max().map_or(0, |max| max + 1);
    let mut layers: Vec<Vec<usize>> = vec![Vec::new(); rank_count];
    for (member, &rank) in ranks.iter().enumerate() {
        layers[rank].push(member);
    }

    if rank_count < 2 || neighbors.is_empty() {
        return layers;
    }

    // position[member] = index within its layer
    let mut position = vec![0usize; ranks.len()];
    let update_positions = |layers: &[Vec<usize>], position: &mut [usize]| {
        for layer in layers {
            for (index, &member) in layer.iter().enumerate() {
                position[member] = index;
            }
        }
    };
    update_positions(&layers, &mut position);

    let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); ranks.len()];
    for &(a, b) in neighbors {
        if a != b {
            adjacency[a].push(b);
            adjacency[b].push(a);
        }
    }

    for _ in 0..passes {
        let mut changed = false;

        // Downward sweep: order each layer by the one above it.
        for rank in 1..rank_count {
            changed |= sort_layer(&mut layers, rank, rank - 1, &adjacency, ranks, &mut position);
        }
        // Upward sweep: order each layer by the one below it.
        for rank in (0..rank_count - 1).rev() {
            changed |= sort_layer(&mut layers, rank, rank + 1, &adjacency, ranks, &mut position);
        }

        if !changed {
            break;
        }
    }

    layers
}

/// Stable-sorts one layer by barycenter against a fixed adjacent
/// layer. Returns whether the order changed.
fn sort_layer(
    layers: &mut [Vec<usize>],
    rank: usize,
    fixed_rank: usize,
    adjacency: &[Vec<usize>],
    ranks: &[usize],
    position: &mut [usize],
) -> bool {
    let layer = &layers[rank];

    let barycenters: Vec<(usize, f64)> = layer
        .iter()
        .map(|&member| {
            let mut sum = 0.0;
            let mut count = 0usize;
            for &neighbor in &adjacency[member] {
                if ranks[neighbor] == fixed_rank {
                    sum += position[neighbor] as f64;
                    count += 1;
                }
            }
            let barycenter = if count == 0 {
                // No pull from the fixed layer: stay where you are.
                position[member] as f64
            } else {
                sum / count as f64
            };
            (member, barycenter)
        })
        .collect();

    let mut sorted = barycenters.clone();
    sorted.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

    let new_layer: Vec<usize> = sorted.iter().map(|(member, _)| *member).collect();
    if new_layer == layers[rank] {
        return false;
    }

    layers[rank] = new_layer;
    for (index, &member) in layers[rank].iter().enumerate() {
        position[member] = index;
    }
    true
}
