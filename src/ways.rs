use crate::street_graph::NodeId;
use std::collections::BTreeMap;

/// A node as delivered by the map data provider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WayNode {
    pub id: NodeId,
    pub lat: f64,
    pub lon: f64,
}

/// One path or road segment: an ordered node sequence plus its OSM tags.
///
/// Ways reaching the core are already vetted; tags are carried so that the
/// filtering collaborator and exports can look at them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Way {
    pub id: i64,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
    pub nodes: Vec<WayNode>,
}

impl Way {
    pub fn new(id: i64, nodes: Vec<WayNode>) -> Self {
        Self {
            id,
            tags: BTreeMap::new(),
            nodes,
        }
    }

    pub fn with_tag(mut self, key: &str, value: &str) -> Self {
        self.tags.insert(key.to_string(), value.to_string());
        self
    }

    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(|v| v.as_str())
    }

    pub fn node_ids(&self) -> Vec<NodeId> {
        self.nodes.iter().map(|n| n.id).collect()
    }

    pub fn is_closed(&self) -> bool {
        self.nodes.len() > 2 && self.nodes.first().map(|n| n.id) == self.nodes.last().map(|n| n.id)
    }
}
