use super::StreetGraph;
use crate::errors::DataError;
use crate::geometry::{geodesic_distance, is_valid_coordinate};
use crate::ways::Way;
use itertools::Itertools;
use tracing::debug;

/// Builds the fine grained street graph: one edge per consecutive node pair of
/// every way, weighted by the geodesic distance between the two nodes.
///
/// The whole input is validated before the graph is touched.
pub fn build_graph(ways: &[Way]) -> Result<StreetGraph, DataError> {
    validate_ways(ways)?;

    let mut graph = StreetGraph::new();

    for way in ways {
        for node in &way.nodes {
            graph.add_node(node.id, node.lat, node.lon);
        }

        for (prev, next) in way.nodes.iter().tuple_windows() {
            if prev.id == next.id || graph.edge_between(prev.id, next.id).is_some() {
                continue;
            }
            // Coordinates come from the graph so a node listed twice with
            // slightly different positions is measured consistently.
            let weight = match graph.straight_line_distance(prev.id, next.id) {
                Some(d) => d,
                None => geodesic_distance(prev.lat, prev.lon, next.lat, next.lon),
            };
            graph.add_edge(prev.id, next.id, weight, None);
        }
    }

    debug!(
        "Built street graph from {} ways: {} nodes, {} edges",
        ways.len(),
        graph.node_count(),
        graph.edge_count()
    );

    Ok(graph)
}

fn validate_ways(ways: &[Way]) -> Result<(), DataError> {
    if ways.is_empty() {
        return Err(DataError::NoWays);
    }

    for way in ways {
        if way.nodes.len() < 2 {
            return Err(DataError::DegenerateWay {
                way: way.id,
                len: way.nodes.len(),
            });
        }
        if let Some(bad) = way
            .nodes
            .iter()
            .find(|n| !is_valid_coordinate(n.lat, n.lon))
        {
            return Err(DataError::InvalidCoordinate {
                node: bad.id,
                lat: bad.lat,
                lon: bad.lon,
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ways::WayNode;

    fn node(id: i64, lat: f64, lon: f64) -> WayNode {
        WayNode { id, lat, lon }
    }

    #[test]
    fn test_consecutive_pairs_become_weighted_edges() {
        let ways = vec![
            Way::new(1, vec![node(1, 0.0, 0.0), node(2, 0.0, 0.001), node(3, 0.0, 0.002)]),
            Way::new(2, vec![node(2, 0.0, 0.001), node(4, 0.001, 0.001)]),
        ];
        let graph = build_graph(&ways).expect("valid ways");

        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.edge_count(), 3);
        assert_eq!(graph.degree(2), 3);

        let e12 = graph.edge_between(1, 2).and_then(|e| graph.edge(e)).expect("edge 1-2");
        let expected = geodesic_distance(0.0, 0.0, 0.0, 0.001);
        assert!((e12.weight - expected).abs() < 1e-9);
        assert!(e12.inner_path.is_none());
    }

    #[test]
    fn test_shared_segments_and_repeated_nodes_are_merged() {
        let ways = vec![
            Way::new(1, vec![node(1, 0.0, 0.0), node(2, 0.0, 0.001)]),
            Way::new(2, vec![node(2, 0.0, 0.001), node(1, 0.0, 0.0)]),
            Way::new(3, vec![node(2, 0.0, 0.001), node(2, 0.0, 0.001), node(3, 0.0, 0.002)]),
        ];
        let graph = build_graph(&ways).expect("valid ways");

        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);
        assert!(graph.edge_between(2, 2).is_none());
    }

    #[test]
    fn test_rejects_empty_input() {
        assert_eq!(build_graph(&[]), Err(DataError::NoWays));
    }

    #[test]
    fn test_rejects_degenerate_way() {
        let ways = vec![Way::new(9, vec![node(1, 0.0, 0.0)])];
        assert_eq!(
            build_graph(&ways),
            Err(DataError::DegenerateWay { way: 9, len: 1 })
        );
    }

    #[test]
    fn test_rejects_invalid_coordinates() {
        let ways = vec![Way::new(1, vec![node(1, 0.0, 0.0), node(2, 95.0, 0.0)])];
        assert!(matches!(
            build_graph(&ways),
            Err(DataError::InvalidCoordinate { node: 2, .. })
        ));
    }
}
