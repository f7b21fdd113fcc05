use super::{EdgeId, NodeId, StreetGraph};
use crate::errors::DataError;
use itertools::Itertools;

/// Expands a reduced node sequence into every node actually walked, resolving
/// the edge for each step by its endpoints.
pub fn expand_path(graph: &StreetGraph, nodes: &[NodeId]) -> Result<Vec<NodeId>, DataError> {
    let edges = nodes
        .iter()
        .tuple_windows()
        .map(|(&from, &to)| {
            graph
                .edge_between(from, to)
                .ok_or(DataError::NotAdjacent { from, to })
        })
        .collect::<Result<Vec<_>, _>>()?;

    expand_steps(graph, nodes, &edges)
}

/// Expands a reduced walk given the node sequence and the edge taken at each step.
///
/// Inner paths are inserted in travel direction.
pub fn expand_steps(
    graph: &StreetGraph,
    nodes: &[NodeId],
    edges: &[EdgeId],
) -> Result<Vec<NodeId>, DataError> {
    let Some(&first) = nodes.first() else {
        return Ok(Vec::new());
    };

    let mut expanded = vec![first];
    for (step, &edge_id) in edges.iter().enumerate() {
        let (from, to) = match (nodes.get(step), nodes.get(step + 1)) {
            (Some(&from), Some(&to)) => (from, to),
            _ => break,
        };
        let edge = graph.edge(edge_id).ok_or(DataError::UnknownEdge(edge_id))?;
        if !edge.connects(from, to) {
            return Err(DataError::EdgeMismatch {
                edge: edge_id,
                from,
                to,
            });
        }
        let walked = edge.nodes_from(from).ok_or(DataError::EdgeMismatch {
            edge: edge_id,
            from,
            to,
        })?;
        expanded.extend(walked.into_iter().skip(1));
    }

    Ok(expanded)
}

/// (lon, lat) for every node of an expanded sequence.
pub fn path_coordinates(
    graph: &StreetGraph,
    nodes: &[NodeId],
) -> Result<Vec<(f64, f64)>, DataError> {
    nodes
        .iter()
        .map(|&id| {
            graph
                .location(id)
                .map(|n| (n.lon, n.lat))
                .ok_or(DataError::UnknownNode(id))
        })
        .collect()
}

/// Node query listing every node of a walk, used to fetch visualisation-only map data.
pub fn node_visualisation_query(nodes: &[NodeId]) -> String {
    let body = nodes.iter().map(|id| format!("node({id});")).join("\n  ");
    format!("(\n  {body}\n);\nout;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::street_graph::{build_graph, simplify_graph};
    use crate::ways::{Way, WayNode};

    fn graph() -> StreetGraph {
        let n = |id, lon| WayNode { id, lat: 0.0, lon };
        let ways = vec![
            Way::new(1, vec![n(1, 0.0), n(2, 0.001), n(3, 0.002), n(4, 0.003)]),
            Way::new(2, vec![n(4, 0.003), n(5, 0.004)]),
            Way::new(3, vec![n(4, 0.003), n(6, 0.0035)]),
        ];
        let mut graph = build_graph(&ways).expect("valid ways");
        simplify_graph(&mut graph, &ways, 1);
        graph
    }

    #[test]
    fn test_expand_inserts_inner_path_in_travel_direction() {
        let graph = graph();

        assert_eq!(expand_path(&graph, &[1, 4, 5]), Ok(vec![1, 2, 3, 4, 5]));
        assert_eq!(expand_path(&graph, &[5, 4, 1]), Ok(vec![5, 4, 3, 2, 1]));
        assert_eq!(expand_path(&graph, &[1, 4, 1]), Ok(vec![1, 2, 3, 4, 3, 2, 1]));
    }

    #[test]
    fn test_expand_rejects_unconnected_steps() {
        let graph = graph();
        assert!(matches!(
            expand_path(&graph, &[1, 5]),
            Err(DataError::NotAdjacent { from: 1, to: 5 })
        ));

        let e45 = graph.edge_between(4, 5).expect("edge 4-5");
        assert!(matches!(
            expand_steps(&graph, &[1, 4], &[e45]),
            Err(DataError::EdgeMismatch { .. })
        ));
    }

    #[test]
    fn test_coordinates_resolve_retired_nodes() {
        let graph = graph();
        let coords = path_coordinates(&graph, &[1, 2, 3]).expect("known nodes");
        assert_eq!(coords, vec![(0.0, 0.0), (0.001, 0.0), (0.002, 0.0)]);
        assert_eq!(path_coordinates(&graph, &[77]), Err(DataError::UnknownNode(77)));
    }

    #[test]
    fn test_node_visualisation_query_format() {
        assert_eq!(
            node_visualisation_query(&[10, 11]),
            "(\n  node(10);\n  node(11);\n);\nout;"
        );
    }
}
