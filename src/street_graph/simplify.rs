// ===========================================================================
// Segment reduction
// ===========================================================================
//
// Collapses chains of pass-through (degree 2) nodes along each way into one
// aggregate edge so the walk search only branches where a walker can actually
// choose: at junctions, dead ends and home.
//
// Rules:
// - The home node is never collapsed, whatever its degree.
// - Closed ways are rotated to start and end at an entry point (a junction,
//   otherwise home) so the reduction has a concrete anchor.
// - An aggregate that would duplicate an existing edge or close a self loop is
//   shortened until it doesn't. Parallel streets stay distinct loops.
// - Ways are first projected onto the live topology, which makes a second
//   pass over already reduced ways a no-op.
// ===========================================================================

use super::{NodeId, StreetGraph};
use crate::ways::Way;
use itertools::Itertools;
use tracing::info;

/// Reduces the graph in place and returns the number of aggregate edges created.
pub fn simplify_graph(graph: &mut StreetGraph, ways: &[Way], home: NodeId) -> usize {
    let nodes_before = graph.node_count();
    let edges_before = graph.edge_count();
    let mut collapsed = 0;

    for way in ways {
        for piece in live_pieces(graph, &way.node_ids()) {
            let sequence = anchor_cycle(graph, piece, home);
            collapsed += reduce_sequence(graph, &sequence, home);
        }
    }

    info!(
        "Simplified street graph: {} -> {} nodes, {} -> {} edges ({} chains collapsed)",
        nodes_before,
        graph.node_count(),
        edges_before,
        graph.edge_count(),
        collapsed
    );

    collapsed
}

/// Splits a way's node list into runs of live nodes joined by live edges.
fn live_pieces(graph: &StreetGraph, node_ids: &[NodeId]) -> Vec<Vec<NodeId>> {
    let mut pieces = Vec::new();
    let mut current: Vec<NodeId> = Vec::new();

    for &id in node_ids {
        if !graph.contains_node(id) {
            continue;
        }
        match current.last() {
            Some(&last) if last == id => continue,
            Some(&last) if graph.edge_between(last, id).is_none() => {
                pieces.push(std::mem::take(&mut current));
            }
            _ => {}
        }
        current.push(id);
    }
    pieces.push(current);

    pieces.retain(|p| p.len() >= 2);
    pieces
}

/// Rotates a closed sequence so it starts and ends at its entry point.
///
/// Without a junction or home on the ring the closing node is simply dropped.
fn anchor_cycle(graph: &StreetGraph, mut sequence: Vec<NodeId>, home: NodeId) -> Vec<NodeId> {
    if sequence.len() < 4 || sequence.first() != sequence.last() {
        return sequence;
    }
    sequence.pop();

    let anchor = sequence
        .iter()
        .position(|&n| graph.degree(n) > 2)
        .or_else(|| sequence.iter().position(|&n| n == home));

    if let Some(start) = anchor {
        sequence.rotate_left(start);
        sequence.push(sequence[0]);
    }
    sequence
}

fn reduce_sequence(graph: &mut StreetGraph, sequence: &[NodeId], home: NodeId) -> usize {
    let last = sequence.len() - 1;
    let mut collapsed = 0;
    let mut start = 0;

    while start < last {
        let mut end = start + 1;
        while end < last && graph.degree(sequence[end]) == 2 && sequence[end] != home {
            end += 1;
        }
        if collapse_run(graph, &sequence[start..=end]) {
            collapsed += 1;
        }
        start = end;
    }

    collapsed
}

/// Replaces the edges along `run` by a single aggregate edge.
fn collapse_run(graph: &mut StreetGraph, run: &[NodeId]) -> bool {
    let mut run = run;
    loop {
        if run.len() < 3 {
            return false;
        }
        let (first, last) = (run[0], run[run.len() - 1]);
        if first != last && graph.edge_between(first, last).is_none() {
            break;
        }
        run = &run[..run.len() - 1];
    }

    // A way passing over itself can list nodes retired earlier in the same
    // pass; the run is left alone unless every step is still a live edge.
    let Some(steps) = run
        .iter()
        .tuple_windows()
        .map(|(&from, &to)| graph.edge_between(from, to).map(|edge| (from, edge)))
        .collect::<Option<Vec<_>>>()
    else {
        return false;
    };

    let mut weight = 0.0;
    let mut inner_path = vec![run[0]];

    for (from, edge_id) in steps {
        if let Some(edge) = graph.remove_edge(edge_id) {
            weight += edge.weight;
            if let Some(nodes) = edge.nodes_from(from) {
                inner_path.extend(nodes.into_iter().skip(1));
            }
        }
    }

    for &interior in &run[1..run.len() - 1] {
        graph.retire_node(interior);
    }

    graph
        .add_edge(run[0], run[run.len() - 1], weight, Some(inner_path))
        .is_some()
}
