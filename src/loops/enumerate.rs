// ===========================================================================
// Round trip enumeration
// ===========================================================================
//
// Depth first search over the reduced street graph for every walk that leaves
// home, never immediately doubles back, never reuses a street except on the
// home spur, and returns home within the distance budget.
//
// The search runs on an explicit stack. Each frame owns the state of one
// branch (node, edge arrived on, distance, turning, heading, ordered
// candidates); the shared path and consumed-edge stacks are unwound as frames
// are popped, so nothing leaks from one branch into its siblings.
//
// Pruning:
// - a branch keeps expanding only while distance so far plus the straight line
//   back home is under the budget (the straight line never overestimates);
// - a walk cannot have more steps than budget / shortest edge;
// - a branch that reaches home stops there.
// ===========================================================================

use super::spurs::repeatable_edges;
use super::{ScoredWalk, ScoringPolicy, Walk};
use crate::errors::ConfigurationError;
use crate::geometry::turning_magnitude;
use crate::street_graph::{EdgeId, NodeId, StreetGraph};
use ahash::AHashSet;
use std::ops::ControlFlow;
use std::time::Instant;
use tracing::info;

/// Cooperative stopping points for long searches.
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchLimits {
    /// Maximum number of branch expansions.
    pub max_expansions: Option<usize>,
    /// Wall clock deadline, checked before every expansion.
    pub deadline: Option<Instant>,
}

/// Breakpoint between expansions, for step-through debugging.
///
/// Receives the reduced path so far and the neighbours about to be explored.
/// Returning `ControlFlow::Break` ends the search with the walks found so far.
pub trait SearchObserver {
    fn on_expand(&mut self, path: &[NodeId], candidates: &[NodeId]) -> ControlFlow<()>;
}

pub struct NoopObserver;

impl SearchObserver for NoopObserver {
    fn on_expand(&mut self, _path: &[NodeId], _candidates: &[NodeId]) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Enumeration {
    /// Ascending by score.
    pub walks: Vec<ScoredWalk>,
    pub expansions: usize,
    /// The search was stopped by a limit or the observer before finishing.
    pub truncated: bool,
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    neighbor: NodeId,
    edge: EdgeId,
    weight: f64,
    cost: f64,
}

struct Frame {
    node: NodeId,
    via: Option<EdgeId>,
    distance: f64,
    turning: f64,
    heading: Option<f64>,
    consumed_via: bool,
    candidates: Vec<Candidate>,
    next: usize,
}

/// A step being entered, before we know whether it expands or terminates.
struct Step {
    node: NodeId,
    via: Option<EdgeId>,
    distance: f64,
    turning: f64,
    heading: Option<f64>,
}

pub struct WalkEnumerator<'a> {
    graph: &'a StreetGraph,
    home: NodeId,
    max_distance: f64,
    scoring: ScoringPolicy,
    limits: SearchLimits,
}

impl<'a> WalkEnumerator<'a> {
    pub fn new(
        graph: &'a StreetGraph,
        home: NodeId,
        max_distance: f64,
    ) -> Result<Self, ConfigurationError> {
        if !max_distance.is_finite() || max_distance <= 0.0 {
            return Err(ConfigurationError::InvalidMaxDistance(max_distance));
        }
        if !graph.contains_node(home) {
            return Err(ConfigurationError::HomeNotInGraph(home));
        }

        Ok(Self {
            graph,
            home,
            max_distance,
            scoring: ScoringPolicy::default(),
            limits: SearchLimits::default(),
        })
    }

    pub fn with_scoring(mut self, scoring: ScoringPolicy) -> Self {
        self.scoring = scoring;
        self
    }

    pub fn with_limits(mut self, limits: SearchLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn run(&self) -> Enumeration {
        self.run_with(&mut NoopObserver)
    }

    pub fn run_with<O: SearchObserver + ?Sized>(&self, observer: &mut O) -> Enumeration {
        let mut search = Search {
            enumerator: self,
            repeatable: repeatable_edges(self.graph, self.home),
            depth_limit: self
                .graph
                .min_edge_weight()
                .filter(|w| *w > 0.0)
                .map(|w| (self.max_distance / w).floor() as usize),
            path: Vec::new(),
            taken: Vec::new(),
            consumed: Vec::new(),
            stack: Vec::new(),
            walks: Vec::new(),
            expansions: 0,
            truncated: false,
        };

        info!(
            "Searching walks from {} within {} m: {} repeatable edges, depth limit {:?}",
            self.home,
            self.max_distance,
            search.repeatable.len(),
            search.depth_limit
        );

        if self.graph.degree(self.home) > 0 {
            search.explore(observer);
        }

        let mut walks = search.walks;
        walks.sort_by(|a, b| {
            a.score
                .total_cmp(&b.score)
                .then(a.walk.distance.total_cmp(&b.walk.distance))
                .then_with(|| a.walk.nodes.cmp(&b.walk.nodes))
        });

        info!(
            "Found {} walks from {} ({} expansions{})",
            walks.len(),
            self.home,
            search.expansions,
            if search.truncated { ", truncated" } else { "" }
        );

        Enumeration {
            walks,
            expansions: search.expansions,
            truncated: search.truncated,
        }
    }

    fn straight_home(&self, node: NodeId) -> f64 {
        self.graph
            .straight_line_distance(node, self.home)
            .unwrap_or(0.0)
    }
}

struct Search<'e, 'a> {
    enumerator: &'e WalkEnumerator<'a>,
    repeatable: AHashSet<EdgeId>,
    depth_limit: Option<usize>,
    path: Vec<NodeId>,
    taken: Vec<EdgeId>,
    consumed: Vec<EdgeId>,
    stack: Vec<Frame>,
    walks: Vec<ScoredWalk>,
    expansions: usize,
    truncated: bool,
}

impl Search<'_, '_> {
    fn explore<O: SearchObserver + ?Sized>(&mut self, observer: &mut O) {
        let root = Step {
            node: self.enumerator.home,
            via: None,
            distance: 0.0,
            turning: 0.0,
            heading: None,
        };
        if self.enter(root, observer).is_break() {
            return;
        }

        while let Some(frame) = self.stack.last_mut() {
            let Some(candidate) = frame.candidates.get(frame.next).copied() else {
                if let Some(done) = self.stack.pop() {
                    self.leave(done.via.is_some(), done.consumed_via);
                }
                continue;
            };
            frame.next += 1;

            let graph = self.enumerator.graph;
            let heading = graph.heading(frame.node, candidate.neighbor);
            // Turning around at the end of the home spur is forced, not chosen.
            let forced_reversal = frame.via == Some(candidate.edge);
            let turn = match (frame.heading, heading) {
                (Some(h_in), Some(h_out)) if !forced_reversal => turning_magnitude(h_in, h_out),
                _ => 0.0,
            };

            let step = Step {
                node: candidate.neighbor,
                via: Some(candidate.edge),
                distance: frame.distance + candidate.weight,
                turning: frame.turning + turn,
                heading,
            };
            if self.enter(step, observer).is_break() {
                return;
            }
        }
    }

    /// Pushes a step onto the path and either expands it into a frame or
    /// settles it right away.
    fn enter<O: SearchObserver + ?Sized>(&mut self, step: Step, observer: &mut O) -> ControlFlow<()> {
        self.path.push(step.node);
        let mut consumed_via = false;
        if let Some(edge) = step.via {
            self.taken.push(edge);
            if !self.repeatable.contains(&edge) {
                self.consumed.push(edge);
                consumed_via = true;
            }
        }

        if !self.continues(&step) {
            self.settle(&step);
            self.leave(step.via.is_some(), consumed_via);
            return ControlFlow::Continue(());
        }

        if self.limit_reached() {
            self.truncated = true;
            return ControlFlow::Break(());
        }
        self.expansions += 1;

        let candidates = self.candidates(&step);
        let neighbors: Vec<NodeId> = candidates.iter().map(|c| c.neighbor).collect();
        if observer.on_expand(&self.path, &neighbors).is_break() {
            self.truncated = true;
            return ControlFlow::Break(());
        }

        self.stack.push(Frame {
            node: step.node,
            via: step.via,
            distance: step.distance,
            turning: step.turning,
            heading: step.heading,
            consumed_via,
            candidates,
            next: 0,
        });
        ControlFlow::Continue(())
    }

    fn leave(&mut self, took_edge: bool, consumed_via: bool) {
        self.path.pop();
        if took_edge {
            self.taken.pop();
        }
        if consumed_via {
            self.consumed.pop();
        }
    }

    fn continues(&self, step: &Step) -> bool {
        let steps = self.path.len() - 1;
        if steps < 1 {
            return true;
        }
        if step.node == self.enumerator.home {
            return false;
        }
        if self.depth_limit.is_some_and(|limit| steps >= limit) {
            return false;
        }
        step.distance + self.enumerator.straight_home(step.node) < self.enumerator.max_distance
    }

    /// Records the branch as a walk when it ended at home within budget.
    fn settle(&mut self, step: &Step) {
        let enumerator = self.enumerator;
        if step.node != enumerator.home || self.path.len() < 2 {
            return;
        }
        // Summed edge weights are the exact length; the look-ahead above only
        // bounds it from below.
        if step.distance > enumerator.max_distance {
            return;
        }

        let walk = Walk {
            nodes: self.path.clone(),
            edges: self.taken.clone(),
            distance: step.distance,
            turning: step.turning,
        };
        let score = enumerator.scoring.score(&walk);
        self.walks.push(ScoredWalk { walk, score });
    }

    fn candidates(&self, step: &Step) -> Vec<Candidate> {
        let graph = self.enumerator.graph;
        let dead_end = graph.degree(step.node) == 1;

        let mut candidates: Vec<Candidate> = graph
            .neighbors(step.node)
            .iter()
            .filter(|(_, edge)| {
                if step.via == Some(*edge) {
                    return dead_end && self.repeatable.contains(edge);
                }
                !(self.consumed.contains(edge) && !self.repeatable.contains(edge))
            })
            .filter_map(|&(neighbor, edge)| {
                let weight = graph.edge(edge)?.weight;
                Some(Candidate {
                    neighbor,
                    edge,
                    weight,
                    cost: weight + self.enumerator.straight_home(neighbor),
                })
            })
            .collect();

        candidates.sort_by(|a, b| a.cost.total_cmp(&b.cost).then(a.neighbor.cmp(&b.neighbor)));
        candidates
    }

    fn limit_reached(&self) -> bool {
        let limits = &self.enumerator.limits;
        if limits
            .max_expansions
            .is_some_and(|max| self.expansions >= max)
        {
            return true;
        }
        limits
            .deadline
            .is_some_and(|deadline| Instant::now() >= deadline)
    }
}

/// Every admissible walk from `home` within `max_distance`, best score first.
pub fn enumerate_walks(
    graph: &StreetGraph,
    home: NodeId,
    max_distance: f64,
    scoring: ScoringPolicy,
) -> Result<Vec<ScoredWalk>, ConfigurationError> {
    Ok(WalkEnumerator::new(graph, home, max_distance)?
        .with_scoring(scoring)
        .run()
        .walks)
}
