use crate::street_graph::{EdgeId, NodeId};
use thiserror::Error;

/// Problems with the walk settings or with how they relate to the loaded graph.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    #[error("home node '{0}' is not a numeric OSM node id")]
    InvalidHomeNode(String),
    #[error("home node {0} is not part of the street graph")]
    HomeNotInGraph(NodeId),
    #[error("maximum walk distance must be a positive number of meters, got {0}")]
    InvalidMaxDistance(f64),
    #[error("number of walks must be positive, got {0}")]
    InvalidWalkCount(i64),
    #[error("could not parse settings: {0}")]
    Unparsable(String),
}

/// Structural problems with the way input or with walk data handed back to the graph.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DataError {
    #[error("no ways were supplied")]
    NoWays,
    #[error("way {way} has {len} node(s), at least 2 are required")]
    DegenerateWay { way: i64, len: usize },
    #[error("node {node} has an invalid coordinate ({lat}, {lon})")]
    InvalidCoordinate { node: NodeId, lat: f64, lon: f64 },
    #[error("node {0} is unknown to the street graph")]
    UnknownNode(NodeId),
    #[error("edge {0:?} is unknown to the street graph")]
    UnknownEdge(EdgeId),
    #[error("nodes {from} and {to} are not adjacent")]
    NotAdjacent { from: NodeId, to: NodeId },
    #[error("edge {edge:?} does not connect {from} and {to}")]
    EdgeMismatch {
        edge: EdgeId,
        from: NodeId,
        to: NodeId,
    },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LoopError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    Data(#[from] DataError),
}
