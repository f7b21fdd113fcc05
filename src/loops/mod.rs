pub mod enumerate;
pub mod select;
pub mod spurs;

pub use enumerate::{
    Enumeration, NoopObserver, SearchLimits, SearchObserver, WalkEnumerator, enumerate_walks,
};
pub use select::{SelectionOrder, select_walks};
pub use spurs::repeatable_edges;

use crate::errors::DataError;
use crate::street_graph::{EdgeId, NodeId, StreetGraph, expand_steps};
use std::fmt;
use std::str::FromStr;

/// How walks are ranked. Lower scores are better under both policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringPolicy {
    /// Total distance walked, favours short walks.
    Distance,
    /// Accumulated turning (radians) per meter, favours straight walks.
    #[default]
    TurningPerDistance,
}

impl ScoringPolicy {
    pub fn score(self, walk: &Walk) -> f64 {
        match self {
            ScoringPolicy::Distance => walk.distance,
            ScoringPolicy::TurningPerDistance => {
                if walk.distance > 0.0 {
                    walk.turning / walk.distance
                } else {
                    0.0
                }
            }
        }
    }
}

impl FromStr for ScoringPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "distance" => Ok(ScoringPolicy::Distance),
            "turning" | "turning_per_distance" => Ok(ScoringPolicy::TurningPerDistance),
            other => Err(format!(
                "unknown scoring policy '{other}', expected 'distance' or 'turning'"
            )),
        }
    }
}

impl fmt::Display for ScoringPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoringPolicy::Distance => write!(f, "distance"),
            ScoringPolicy::TurningPerDistance => write!(f, "turning"),
        }
    }
}

/// A round trip on the reduced graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Walk {
    /// Reduced node sequence, starting and ending at home.
    pub nodes: Vec<NodeId>,
    /// Edge taken for each step, `nodes.len() - 1` entries.
    pub edges: Vec<EdgeId>,
    /// Sum of edge weights in meters.
    pub distance: f64,
    /// Sum of absolute heading changes in radians.
    pub turning: f64,
}

impl Walk {
    /// Every node walked, with collapsed edges re-expanded.
    pub fn expand(&self, graph: &StreetGraph) -> Result<Vec<NodeId>, DataError> {
        expand_steps(graph, &self.nodes, &self.edges)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredWalk {
    pub walk: Walk,
    pub score: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn walk(distance: f64, turning: f64) -> Walk {
        Walk {
            nodes: vec![1, 2, 1],
            edges: vec![EdgeId(0), EdgeId(0)],
            distance,
            turning,
        }
    }

    #[test]
    fn test_scoring_policies() {
        let w = walk(400.0, std::f64::consts::PI);
        assert_eq!(ScoringPolicy::Distance.score(&w), 400.0);
        assert!((ScoringPolicy::TurningPerDistance.score(&w) - std::f64::consts::PI / 400.0).abs() < 1e-15);
        assert_eq!(ScoringPolicy::TurningPerDistance.score(&walk(0.0, 1.0)), 0.0);
    }

    #[test]
    fn test_scoring_policy_parsing() {
        assert_eq!("distance".parse(), Ok(ScoringPolicy::Distance));
        assert_eq!("turning".parse(), Ok(ScoringPolicy::TurningPerDistance));
        assert_eq!(
            "turning_per_distance".parse(),
            Ok(ScoringPolicy::TurningPerDistance)
        );
        assert!("zigzag".parse::<ScoringPolicy>().is_err());
        assert_eq!(ScoringPolicy::default(), ScoringPolicy::TurningPerDistance);
    }
}
