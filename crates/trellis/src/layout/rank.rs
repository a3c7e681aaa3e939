//! Rank assignment: longest-path layering.
//!
//! Every directed edge inside one layout unit must point from a lower
//! to a strictly higher rank. Members with no incoming edges sit at
//! rank 0; every other member sits one past its highest-ranked
//! predecessor. Self-loops never constrain ranks (they are routed with
//! lateral offsets instead), and only `Directed` edges participate.
//!
//! A cycle among the unit's directed edges makes ranking impossible
//! and is reported to the caller with the members still involved.

use trellis_core::identifier::Id;

/// Assign a rank to every member.
///
/// `edges` are `(source_index, target_index)` pairs into `members`.
/// Returns member ranks in input order, or the ids of members caught
/// in a cycle.
pub(crate) fn assign_ranks(
    members: &[Id],
    edges: &[(usize, usize)],
) -> Result<Vec<usize>, Vec<Id>> {
    let count = members.len();
    let mut in_degree = vec![0usize; count];
    let mut successors: Vec<Vec<usize>> = vec![Vec::new(); count];

    for &(source, target) in edges {
        if source == target {
            continue; // self-loops are a routing concern
        }
        in_degree[target] += 1;
        successors[source].push(target);
    }

    let mut ranks = vec![0usize; count];
    // Plain index-ordered worklist; iteration order is deterministic.
    let mut queue: Vec<usize> = (0..count).filter(|&i| in_degree[i] == 0).collect();
    let mut head = 0;
    let mut visited = 0;

    while head < queue.len() {
        let current = queue[head];
        head += 1;
        visited += 1;

        for &next in &successors[current] {
            ranks[next] = ranks[next].max(ranks[current] + 1);
            in_degree[next] -= 1;
            if in_degree[next] == 0 {
                queue.push(next);
            }
        }
    }

    if visited < count {
        let stuck: Vec<Id> = (0..count)
            .filter(|&i| in_degree[i] > 0)
            .map(|i| members[i])
            .collect();
        return Err(stuck);
    }

    Ok(ranks)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(names: &[&str]) -> Vec<Id> {
        names.iter().map(|n| Id::new(n)).collect()
    }

    #[test]
    fn test_chain() {
        let members = ids(&["a", "b", "c"]);
        let ranks = assign_ranks(&members, &[(0, 1), (1, 2)]).unwrap();
        assert_eq!(ranks, vec![0, 1, 2]);
    }

    #[test]
    fn test_longest_path_wins() {
        // a -> b -> d and a -> d: d must sit below b, not beside it.
        let members = ids(&["a", "b", "d"]);
        let ranks = assign_ranks(&members, &[(0, 1), (1, 2), (0, 2)]).unwrap();
        assert_eq!(ranks, vec![0, 1, 2]);
    }

    #[test]
    fn test_sources_at_rank_zero() {
        let members = ids(&["x", "y", "z"]);
        let ranks = assign_ranks(&members, &[(0, 2), (1, 2)]).unwrap();
        assert_eq!(ranks, vec![0, 0, 1]);
    }

    #[test]
    fn test_no_edges() {
        let members = ids(&["a", "b"]);
        assert_eq!(assign_ranks(&members, &[]).unwrap(), vec![0, 0]);
    }

    #[test]
    fn test_self_loop_ignored() {
        let members = ids(&["a", "b"]);
        let ranks = assign_ranks(&members, &[(0, 0), (0, 1)]).unwrap();
        assert_eq!(ranks, vec![0, 1]);
    }

    #[test]
    fn test_cycle_reported() {
        let members = ids(&["a", "b", "c"]);
        let stuck = assign_ranks(&members, &[(0, 1), (1, 0)]).unwrap_err();
        assert_eq!(stuck, ids(&["a", "b"]));
    }

    #[test]
    fn test_monotonic_over_random_dag() {
        // Edges always point from lower to higher index, so ranking
        // must succeed and be strictly monotone along every edge.
        let members = ids(&["n0", "n1", "n2", "n3", "n4", "n5"]);
        let edges = [(0, 2), (0, 3), (1, 3), (2, 4), (3, 4), (4, 5), (1, 5)];
        let ranks = assign_ranks(&members, &edges).unwrap();
        for (s, t) in edges {
            assert!(ranks[t] > ranks[s], "edge {s}->{t} not monotone: {ranks:?}");
        }
    }
}
