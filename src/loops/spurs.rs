use crate::street_graph::{EdgeId, NodeId, StreetGraph};
use ahash::AHashSet;
use std::collections::VecDeque;

/// Edges a walk may traverse more than once: everything on the non-branching
/// chains leading away from home, up to the first junction.
///
/// Breadth first from home; nodes of degree > 2 are reached but never expanded.
pub fn repeatable_edges(graph: &StreetGraph, home: NodeId) -> AHashSet<EdgeId> {
    let mut repeatable = AHashSet::new();
    if !graph.contains_node(home) {
        return repeatable;
    }

    let mut discovered: AHashSet<NodeId> = AHashSet::from_iter([home]);
    let mut queue = VecDeque::from([home]);

    while let Some(current) = queue.pop_front() {
        if graph.degree(current) > 2 {
            continue;
        }
        for &(neighbor, edge) in graph.neighbors(current) {
            if discovered.insert(neighbor) {
                repeatable.insert(edge);
                queue.push_back(neighbor);
            }
        }
    }

    repeatable
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(edges: &[(NodeId, NodeId)]) -> StreetGraph {
        let mut graph = StreetGraph::new();
        for &(a, b) in edges {
            graph.add_node(a, 0.0, a as f64 * 0.001);
            graph.add_node(b, 0.0, b as f64 * 0.001);
            graph.add_edge(a, b, 100.0, None);
        }
        graph
    }

    fn ids(graph: &StreetGraph, pairs: &[(NodeId, NodeId)]) -> AHashSet<EdgeId> {
        pairs
            .iter()
            .map(|&(a, b)| graph.edge_between(a, b).expect("edge exists"))
            .collect()
    }

    #[test]
    fn test_stem_up_to_first_junction() {
        // 1 - 2 - 3 < (4, 5), with 3 a junction.
        let g = graph(&[(1, 2), (2, 3), (3, 4), (3, 5), (4, 5)]);
        assert_eq!(repeatable_edges(&g, 1), ids(&g, &[(1, 2), (2, 3)]));
    }

    #[test]
    fn test_home_in_the_middle_of_a_street() {
        // 10 - 1 - 20, both ends junctions of a larger block.
        let g = graph(&[(10, 1), (1, 20), (10, 11), (10, 12), (20, 21), (20, 22)]);
        assert_eq!(repeatable_edges(&g, 1), ids(&g, &[(10, 1), (1, 20)]));
    }

    #[test]
    fn test_home_on_a_junction_has_no_spur() {
        let g = graph(&[(1, 2), (1, 3), (1, 4), (2, 3)]);
        assert!(repeatable_edges(&g, 1).is_empty());
    }

    #[test]
    fn test_pure_chain_is_fully_repeatable() {
        let g = graph(&[(1, 2), (2, 3), (3, 4)]);
        assert_eq!(repeatable_edges(&g, 1), ids(&g, &[(1, 2), (2, 3), (3, 4)]));
    }

    #[test]
    fn test_unknown_or_isolated_home() {
        let mut g = graph(&[(1, 2)]);
        g.add_node(9, 0.0, 0.0);
        assert!(repeatable_edges(&g, 42).is_empty());
        assert!(repeatable_edges(&g, 9).is_empty());
    }
}
