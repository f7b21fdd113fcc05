// ===========================================================================
// Street graph
// ===========================================================================
//
// Undirected, simple, weighted graph over OSM node ids.
//
// - Every edge lives in an arena and is addressed by a stable `EdgeId`.
//   Removing an edge leaves a vacant slot, ids are never handed out twice.
// - Adjacency lists are kept sorted by neighbour id so that every traversal
//   over the graph is deterministic.
// - Nodes collapsed into an edge's inner path are "retired": they leave the
//   topology but keep their coordinates so walks can be drawn in full.
// ===========================================================================

pub mod builder;
pub mod expand;
pub mod simplify;

pub use builder::build_graph;
pub use expand::{expand_path, expand_steps, node_visualisation_query, path_coordinates};
pub use simplify::simplify_graph;

use ahash::AHashMap;

/// OSM node identifier.
pub type NodeId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeId(pub u32);

impl EdgeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    pub a: NodeId,
    pub b: NodeId,
    /// Length in meters.
    pub weight: f64,
    /// Full node list from one endpoint to the other, endpoints included.
    /// `None` for edges that were never collapsed.
    pub inner_path: Option<Vec<NodeId>>,
}

impl Edge {
    /// The endpoint opposite to `node`, if `node` is an endpoint at all.
    pub fn other(&self, node: NodeId) -> Option<NodeId> {
        if node == self.a {
            Some(self.b)
        } else if node == self.b {
            Some(self.a)
        } else {
            None
        }
    }

    pub fn connects(&self, x: NodeId, y: NodeId) -> bool {
        (self.a == x && self.b == y) || (self.a == y && self.b == x)
    }

    /// Every node passed when walking this edge starting at `from`, both ends included.
    pub fn nodes_from(&self, from: NodeId) -> Option<Vec<NodeId>> {
        let to = self.other(from)?;
        match &self.inner_path {
            Some(inner) if inner.first() == Some(&from) => Some(inner.clone()),
            Some(inner) => Some(inner.iter().rev().copied().collect()),
            None => Some(vec![from, to]),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StreetGraph {
    nodes: AHashMap<NodeId, Node>,
    retired: AHashMap<NodeId, Node>,
    edges: Vec<Option<Edge>>,
    adjacency: AHashMap<NodeId, Vec<(NodeId, EdgeId)>>,
}

impl StreetGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a node. Returns `false` when the id is already known, in which case
    /// the stored coordinates are kept.
    pub fn add_node(&mut self, id: NodeId, lat: f64, lon: f64) -> bool {
        if self.nodes.contains_key(&id) || self.retired.contains_key(&id) {
            return false;
        }
        self.nodes.insert(id, Node { id, lat, lon });
        self.adjacency.insert(id, Vec::new());
        true
    }

    /// Connects two live nodes. An existing edge between the pair is returned
    /// untouched; self loops and unknown endpoints yield `None`.
    pub fn add_edge(
        &mut self,
        a: NodeId,
        b: NodeId,
        weight: f64,
        inner_path: Option<Vec<NodeId>>,
    ) -> Option<EdgeId> {
        if a == b || !self.nodes.contains_key(&a) || !self.nodes.contains_key(&b) {
            return None;
        }
        if let Some(existing) = self.edge_between(a, b) {
            return Some(existing);
        }

        let id = EdgeId(self.edges.len() as u32);
        self.edges.push(Some(Edge {
            id,
            a,
            b,
            weight,
            inner_path,
        }));
        Self::link(self.adjacency.entry(a).or_default(), b, id);
        Self::link(self.adjacency.entry(b).or_default(), a, id);
        Some(id)
    }

    fn link(list: &mut Vec<(NodeId, EdgeId)>, neighbor: NodeId, edge: EdgeId) {
        let pos = list.partition_point(|(n, _)| *n < neighbor);
        list.insert(pos, (neighbor, edge));
    }

    pub fn remove_edge(&mut self, id: EdgeId) -> Option<Edge> {
        let edge = self.edges.get_mut(id.index())?.take()?;
        if let Some(list) = self.adjacency.get_mut(&edge.a) {
            list.retain(|(_, e)| *e != id);
        }
        if let Some(list) = self.adjacency.get_mut(&edge.b) {
            list.retain(|(_, e)| *e != id);
        }
        Some(edge)
    }

    /// Moves an isolated node out of the topology, keeping its coordinates.
    pub fn retire_node(&mut self, id: NodeId) -> bool {
        if self.degree(id) != 0 {
            return false;
        }
        match self.nodes.remove(&id) {
            Some(node) => {
                self.adjacency.remove(&id);
                self.retired.insert(id, node);
                true
            }
            None => false,
        }
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Live node lookup.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Coordinates of a live or retired node.
    pub fn location(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id).or_else(|| self.retired.get(&id))
    }

    pub fn degree(&self, id: NodeId) -> usize {
        self.adjacency.get(&id).map_or(0, |list| list.len())
    }

    /// Neighbours of a node with the connecting edge, ordered by neighbour id.
    pub fn neighbors(&self, id: NodeId) -> &[(NodeId, EdgeId)] {
        self.adjacency
            .get(&id)
            .map(|list| list.as_slice())
            .unwrap_or(&[])
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id.index()).and_then(|slot| slot.as_ref())
    }

    pub fn edge_between(&self, a: NodeId, b: NodeId) -> Option<EdgeId> {
        self.neighbors(a)
            .iter()
            .find(|(n, _)| *n == b)
            .map(|(_, e)| *e)
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter_map(|slot| slot.as_ref())
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn min_edge_weight(&self) -> Option<f64> {
        self.edges().map(|e| e.weight).min_by(|a, b| a.total_cmp(b))
    }

    /// Geodesic distance between two nodes (live or retired), in meters.
    pub fn straight_line_distance(&self, from: NodeId, to: NodeId) -> Option<f64> {
        let a = self.location(from)?;
        let b = self.location(to)?;
        Some(crate::geometry::geodesic_distance(a.lat, a.lon, b.lat, b.lon))
    }

    /// Heading in radians of the straight line between two nodes.
    pub fn heading(&self, from: NodeId, to: NodeId) -> Option<f64> {
        let a = self.location(from)?;
        let b = self.location(to)?;
        Some(crate::geometry::heading(a.lat, a.lon, b.lat, b.lon))
    }
}
